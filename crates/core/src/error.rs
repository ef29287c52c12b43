// Central Error Type for the Engine

use thiserror::Error;

use crate::domain::Category;

/// Engine-level error type
///
/// Probe faults never surface here: the Executor converts them into
/// `CheckResult` values. Only registration and configuration problems
/// propagate to the caller.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Duplicate probe '{name}' in category {category}")]
    DuplicateProbe { category: Category, name: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
