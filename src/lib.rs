// ============================================================================
// Confmig Library
// ============================================================================

pub mod core;
pub mod document;
pub mod filter;
pub mod migration;
pub mod storage;

// Re-export main types for convenience
pub use crate::core::{MigrationError, Result, SideEffects, StepError, StepResult, Value};
pub use document::{SCHEMA_VERSION_KEY, VersionedDocument};
pub use filter::{Filter, FilterId, FilterIdAllocator};
pub use migration::{
    CURRENT_SCHEMA_VERSION, LEGACY_FILTER_FILE, MigrationDriver, MigrationOutcome,
    MigrationRegistry, MigrationStep, StepContext, StepMigrationFn, builtin_registry,
    schema_0_to_1,
};
pub use storage::write_atomic;

use std::path::PathBuf;

// ============================================================================
// High-level Upgrade API
// ============================================================================

/// Upgrades the config file at `config_path` to the current schema version.
///
/// Builds the built-in migration registry and runs every step between the
/// file's recorded schema version and [`CURRENT_SCHEMA_VERSION`]. The file is
/// rewritten atomically once, after the whole chain has succeeded. A missing
/// file is not an error.
///
/// # Examples
///
/// ```
/// use confmig::{FilterIdAllocator, MigrationOutcome, upgrade_config};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut filters = Vec::new();
/// let mut ids = FilterIdAllocator::new(1);
///
/// let outcome = upgrade_config("config.yaml", &mut filters, &mut ids)?;
/// assert_eq!(outcome, MigrationOutcome::NoConfig);
/// # Ok(())
/// # }
/// ```
pub fn upgrade_config(
    config_path: impl Into<PathBuf>,
    filters: &mut [Box<dyn Filter>],
    ids: &mut FilterIdAllocator,
) -> Result<MigrationOutcome> {
    let registry = builtin_registry()?;
    MigrationDriver::new(&registry, config_path).run(filters, ids)
}
