use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("No migration step registered for schema version {0}")]
    UnregisteredVersion(u32),

    #[error("Invalid migration registry: {0}")]
    InvalidRegistry(String),

    #[error("Filter update failed: {0}")]
    FilterUpdate(String),

    #[error("Filter save failed: {0}")]
    FilterSave(String),

    #[error("Migration step {from_version} -> {to_version} failed: {source}")]
    StepFailed {
        from_version: u32,
        to_version: u32,
        side_effects: SideEffects,
        #[source]
        source: Box<MigrationError>,
    },
}

impl MigrationError {
    /// Side effects recorded for this error, if it came from a failed step.
    pub fn side_effects(&self) -> SideEffects {
        match self {
            Self::StepFailed { side_effects, .. } => *side_effects,
            _ => SideEffects::None,
        }
    }
}

/// Whether a failed migration step had already touched external resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffects {
    /// The step failed before mutating anything outside the in-memory
    /// document.
    None,
    /// The step had already mutated external resources (allocated IDs,
    /// saved filters, deleted files) when it failed.
    Partial,
}

/// Error raised inside a migration step, tagged with its side-effect state.
#[derive(Debug)]
pub struct StepError {
    pub error: MigrationError,
    pub side_effects: SideEffects,
}

impl StepError {
    pub fn clean(error: MigrationError) -> Self {
        Self {
            error,
            side_effects: SideEffects::None,
        }
    }

    pub fn partial(error: MigrationError) -> Self {
        Self {
            error,
            side_effects: SideEffects::Partial,
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;

/// Result type returned by migration step functions.
pub type StepResult = std::result::Result<(), StepError>;
