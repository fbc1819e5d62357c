//! Error types for the momentum_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for momentum_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// User input rejected at the boundary (preferences, profile)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// A program references an exercise the catalog does not contain
    #[error("Exercise not found: {0}")]
    ExerciseNotFound(String),

    /// Illegal use of the session controller
    #[error("Session error: {0}")]
    Session(String),

    /// Persistence collaborator failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
