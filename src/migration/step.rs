use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::core::StepResult;
use crate::document::VersionedDocument;
use crate::filter::{Filter, FilterIdAllocator};

/// Resources a migration step may touch besides the document itself.
pub struct StepContext<'a> {
    /// Live filter collection, in the host's listed order.
    pub filters: &'a mut [Box<dyn Filter>],
    /// Identifier source for filters that do not have one yet.
    pub ids: &'a mut FilterIdAllocator,
    /// Directory holding the configuration file and legacy artifacts.
    pub config_dir: &'a Path,
}

/// Function applying one schema upgrade to an in-memory document.
pub type StepMigrationFn =
    Arc<dyn Fn(&mut VersionedDocument, &mut StepContext<'_>) -> StepResult + Send + Sync>;

/// A single upgrade between two schema versions.
#[derive(Clone)]
pub struct MigrationStep {
    pub from_version: u32,
    pub to_version: u32,
    migrate: StepMigrationFn,
}

impl fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationStep")
            .field("from_version", &self.from_version)
            .field("to_version", &self.to_version)
            .finish()
    }
}

impl MigrationStep {
    pub fn new<F>(from_version: u32, to_version: u32, migrate: F) -> Self
    where
        F: Fn(&mut VersionedDocument, &mut StepContext<'_>) -> StepResult + Send + Sync + 'static,
    {
        Self {
            from_version,
            to_version,
            migrate: Arc::new(migrate),
        }
    }

    /// Runs the step's migration function against an in-memory document.
    pub fn apply(&self, document: &mut VersionedDocument, ctx: &mut StepContext<'_>) -> StepResult {
        (self.migrate)(document, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_elides_closure() {
        let step = MigrationStep::new(0, 1, |_, _| Ok(()));
        let rendered = format!("{:?}", step);
        assert!(rendered.contains("from_version: 0"));
        assert!(rendered.contains("to_version: 1"));
    }
}
