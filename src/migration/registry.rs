use std::collections::BTreeMap;

use crate::core::{MigrationError, Result};
use crate::migration::step::MigrationStep;

/// Registered migration steps, keyed by the version they upgrade from.
///
/// Dispatch is data-driven: a document's version selects its step by exact
/// lookup, and the ordered key set makes the upgrade path auditable.
#[derive(Debug, Clone)]
pub struct MigrationRegistry {
    current_version: u32,
    steps: BTreeMap<u32, MigrationStep>,
}

impl MigrationRegistry {
    /// Creates an empty registry targeting `current_version`.
    pub fn new(current_version: u32) -> Self {
        Self {
            current_version,
            steps: BTreeMap::new(),
        }
    }

    /// Returns the target schema version of this registry.
    pub fn current_version(&self) -> u32 {
        self.current_version
    }

    /// Returns the registered steps in source-version order.
    pub fn steps(&self) -> impl Iterator<Item = &MigrationStep> {
        self.steps.values()
    }

    /// Registers a step, validating it immediately.
    ///
    /// Steps must advance (`to > from`), must not pass the target version,
    /// and there can be only one step per source version.
    pub fn register(&mut self, step: MigrationStep) -> Result<()> {
        if step.to_version <= step.from_version {
            return Err(MigrationError::InvalidRegistry(format!(
                "Migration step {} -> {} is invalid",
                step.from_version, step.to_version
            )));
        }
        if step.to_version > self.current_version {
            return Err(MigrationError::InvalidRegistry(format!(
                "Migration step {} -> {} exceeds current schema version {}",
                step.from_version, step.to_version, self.current_version
            )));
        }
        if self.steps.contains_key(&step.from_version) {
            return Err(MigrationError::InvalidRegistry(format!(
                "Duplicate migration step starting at version {}",
                step.from_version
            )));
        }
        self.steps.insert(step.from_version, step);
        Ok(())
    }

    /// Fluent builder form of [`register`](Self::register).
    pub fn with_step(mut self, step: MigrationStep) -> Result<Self> {
        self.register(step)?;
        Ok(self)
    }

    /// Looks up the step that upgrades from `version`. Exact match only.
    pub fn step_for(&self, version: u32) -> Option<&MigrationStep> {
        self.steps.get(&version)
    }

    /// Resolves the ordered step chain from `from_version` to the target.
    ///
    /// The whole chain is resolved before anything runs, so a missing edge
    /// surfaces before any step had a chance to cause side effects. A
    /// version newer than the target has no chain; downgrades are
    /// unsupported.
    pub fn resolve_chain(&self, from_version: u32) -> Result<Vec<&MigrationStep>> {
        if from_version > self.current_version {
            return Err(MigrationError::UnregisteredVersion(from_version));
        }

        let mut cursor = from_version;
        let mut chain = Vec::new();
        while cursor < self.current_version {
            let step = self
                .steps
                .get(&cursor)
                .ok_or(MigrationError::UnregisteredVersion(cursor))?;
            chain.push(step);
            cursor = step.to_version;
        }

        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_step(from_version: u32, to_version: u32) -> MigrationStep {
        MigrationStep::new(from_version, to_version, |_, _| Ok(()))
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = MigrationRegistry::new(1).with_step(noop_step(0, 1)).unwrap();
        assert_eq!(registry.current_version(), 1);
        assert_eq!(registry.step_for(0).map(|s| s.to_version), Some(1));
        assert!(registry.step_for(1).is_none());
    }

    #[test]
    fn test_duplicate_step_rejected() {
        let err = MigrationRegistry::new(2)
            .with_step(noop_step(0, 1))
            .unwrap()
            .with_step(noop_step(0, 2))
            .unwrap_err();
        assert!(matches!(err, MigrationError::InvalidRegistry(_)));
    }

    #[test]
    fn test_non_advancing_step_rejected() {
        let err = MigrationRegistry::new(2).with_step(noop_step(1, 1)).unwrap_err();
        assert!(matches!(err, MigrationError::InvalidRegistry(_)));

        let err = MigrationRegistry::new(2).with_step(noop_step(2, 1)).unwrap_err();
        assert!(matches!(err, MigrationError::InvalidRegistry(_)));
    }

    #[test]
    fn test_step_beyond_target_rejected() {
        let err = MigrationRegistry::new(1).with_step(noop_step(1, 2)).unwrap_err();
        assert!(matches!(err, MigrationError::InvalidRegistry(_)));
    }

    #[test]
    fn test_resolve_chain_walks_to_target() {
        let registry = MigrationRegistry::new(2)
            .with_step(noop_step(0, 1))
            .unwrap()
            .with_step(noop_step(1, 2))
            .unwrap();

        let chain = registry.resolve_chain(0).unwrap();
        let edges: Vec<(u32, u32)> = chain.iter().map(|s| (s.from_version, s.to_version)).collect();
        assert_eq!(edges, [(0, 1), (1, 2)]);
    }

    #[test]
    fn test_resolve_chain_empty_when_current() {
        let registry = MigrationRegistry::new(1).with_step(noop_step(0, 1)).unwrap();
        assert!(registry.resolve_chain(1).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_chain_reports_missing_edge() {
        let registry = MigrationRegistry::new(2).with_step(noop_step(1, 2)).unwrap();
        let err = registry.resolve_chain(0).unwrap_err();
        assert!(matches!(err, MigrationError::UnregisteredVersion(0)));
    }

    #[test]
    fn test_resolve_chain_rejects_newer_document() {
        let registry = MigrationRegistry::new(1).with_step(noop_step(0, 1)).unwrap();
        let err = registry.resolve_chain(3).unwrap_err();
        assert!(matches!(err, MigrationError::UnregisteredVersion(3)));
    }
}
