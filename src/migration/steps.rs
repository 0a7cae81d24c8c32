//! Built-in schema upgrade steps.

use std::fs;

use log::{info, warn};

use crate::core::{MigrationError, StepError};
use crate::migration::step::MigrationStep;

/// Combined filter file from schema 0. Filters moved to per-filter storage
/// in schema 1, so the upgrade removes it.
pub const LEGACY_FILTER_FILE: &str = "dnsfilter.txt";

/// Builds the 0 -> 1 upgrade: every filter gets a numeric ID and a forced
/// refresh-and-save, then the legacy combined filter file is dropped.
pub fn schema_0_to_1() -> MigrationStep {
    MigrationStep::new(0, 1, |document, ctx| {
        for filter in ctx.filters.iter_mut() {
            let id = ctx.ids.allocate();
            info!("Setting ID={} for filter {}", id, filter.url());
            filter.set_id(id);

            // Failures past this point leave allocated IDs and already
            // saved filters behind.
            filter.force_update().map_err(|e| {
                StepError::partial(MigrationError::FilterUpdate(format!(
                    "Filter {}: {}",
                    filter.url(),
                    e
                )))
            })?;

            filter.save().map_err(|e| {
                StepError::partial(MigrationError::FilterSave(format!(
                    "Filter {}: {}",
                    filter.url(),
                    e
                )))
            })?;
        }

        let legacy_path = ctx.config_dir.join(LEGACY_FILTER_FILE);
        if legacy_path.exists() {
            info!("Deleting {} as we don't need it anymore", legacy_path.display());
            if let Err(e) = fs::remove_file(&legacy_path) {
                // Not fatal, the stale file just lingers.
                warn!("Cannot remove {} due to {}", legacy_path.display(), e);
            }
        }

        document.set_schema_version(1);

        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::VersionedDocument;
    use crate::filter::{Filter, FilterIdAllocator};
    use crate::migration::step::StepContext;
    use tempfile::TempDir;

    #[test]
    fn test_versions() {
        let step = schema_0_to_1();
        assert_eq!(step.from_version, 0);
        assert_eq!(step.to_version, 1);
    }

    #[test]
    fn test_removes_legacy_filter_file() {
        let temp_dir = TempDir::new().unwrap();
        let legacy = temp_dir.path().join(LEGACY_FILTER_FILE);
        fs::write(&legacy, "||blocked.example^\n").unwrap();

        let mut document = VersionedDocument::new();
        let mut filters: Vec<Box<dyn Filter>> = Vec::new();
        let mut ids = FilterIdAllocator::new(1);
        let mut ctx = StepContext {
            filters: &mut filters,
            ids: &mut ids,
            config_dir: temp_dir.path(),
        };

        schema_0_to_1().apply(&mut document, &mut ctx).unwrap();

        assert!(!legacy.exists());
        assert_eq!(document.schema_version().unwrap(), 1);
    }

    #[test]
    fn test_no_legacy_file_is_fine() {
        let temp_dir = TempDir::new().unwrap();

        let mut document = VersionedDocument::new();
        let mut filters: Vec<Box<dyn Filter>> = Vec::new();
        let mut ids = FilterIdAllocator::new(1);
        let mut ctx = StepContext {
            filters: &mut filters,
            ids: &mut ids,
            config_dir: temp_dir.path(),
        };

        schema_0_to_1().apply(&mut document, &mut ctx).unwrap();
        assert_eq!(document.schema_version().unwrap(), 1);
    }
}
