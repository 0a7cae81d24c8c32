//! Drives registered migration steps against an on-disk document.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::core::{MigrationError, Result};
use crate::document::VersionedDocument;
use crate::filter::{Filter, FilterIdAllocator};
use crate::migration::registry::MigrationRegistry;
use crate::migration::step::StepContext;
use crate::storage::write_atomic;

/// What a migration run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// No configuration file on disk, nothing to upgrade.
    NoConfig,
    /// The document already carries the target version, nothing written.
    AlreadyCurrent,
    /// The document was upgraded and rewritten.
    Migrated {
        from_version: u32,
        to_version: u32,
        steps_applied: u32,
    },
}

#[derive(Debug)]
pub struct MigrationDriver<'a> {
    registry: &'a MigrationRegistry,
    config_path: PathBuf,
}

impl<'a> MigrationDriver<'a> {
    pub fn new(registry: &'a MigrationRegistry, config_path: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Upgrades the document at the configured path to the registry's
    /// target version.
    ///
    /// The step chain is resolved before anything runs, every step is
    /// applied in memory, and the file is rewritten once, atomically, after
    /// the whole chain succeeded. A failure leaves the on-disk file as it
    /// was; a step failure additionally reports whether external resources
    /// were already mutated.
    pub fn run(
        &self,
        filters: &mut [Box<dyn Filter>],
        ids: &mut FilterIdAllocator,
    ) -> Result<MigrationOutcome> {
        let mut document = match VersionedDocument::load(&self.config_path)? {
            Some(document) => document,
            None => {
                info!(
                    "Config file {} does not exist, nothing to upgrade",
                    self.config_path.display()
                );
                return Ok(MigrationOutcome::NoConfig);
            }
        };

        let from_version = document.schema_version()?;
        if from_version == self.registry.current_version() {
            debug!("Config file is already at schema version {}", from_version);
            return Ok(MigrationOutcome::AlreadyCurrent);
        }

        let chain = self.registry.resolve_chain(from_version)?;

        let config_dir = match self.config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut ctx = StepContext {
            filters,
            ids,
            config_dir: &config_dir,
        };

        let mut steps_applied = 0u32;
        for step in chain {
            info!(
                "Upgrading config schema v{} -> v{}",
                step.from_version, step.to_version
            );
            step.apply(&mut document, &mut ctx)
                .map_err(|e| MigrationError::StepFailed {
                    from_version: step.from_version,
                    to_version: step.to_version,
                    side_effects: e.side_effects,
                    source: Box::new(e.error),
                })?;
            document.set_schema_version(step.to_version);
            steps_applied += 1;
        }

        let body = document.to_yaml()?;
        write_atomic(&self.config_path, body.as_bytes())?;

        Ok(MigrationOutcome::Migrated {
            from_version,
            to_version: self.registry.current_version(),
            steps_applied,
        })
    }
}
