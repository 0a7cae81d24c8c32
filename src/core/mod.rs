pub mod error;
pub mod value;

pub use error::{MigrationError, Result, SideEffects, StepError, StepResult};
pub use value::Value;
