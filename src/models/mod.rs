pub mod analysis;
pub mod enums;
pub mod history;

pub use analysis::*;
pub use enums::*;
pub use history::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Severity must be between 1 and 4, got {0}")]
    InvalidSeverity(u8),

    #[error("Invalid value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
