pub mod driver;
pub mod registry;
pub mod step;
pub mod steps;

pub use driver::{MigrationDriver, MigrationOutcome};
pub use registry::MigrationRegistry;
pub use step::{MigrationStep, StepContext, StepMigrationFn};
pub use steps::{LEGACY_FILTER_FILE, schema_0_to_1};

use crate::core::Result;

/// Schema version produced by the newest built-in upgrade.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Builds the registry of built-in schema upgrades.
pub fn builtin_registry() -> Result<MigrationRegistry> {
    MigrationRegistry::new(CURRENT_SCHEMA_VERSION).with_step(schema_0_to_1())
}
