//! Error types for db-model-generator

use thiserror::Error;

/// Result type alias for db-model-generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Errors that can occur while resolving settings, reading the schema or writing output
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    ConfigError(String),

    #[error("{0}")]
    ConnectionError(String),

    #[error("Table '{0}' does not exist")]
    TableNotFound(String),

    #[error("{0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("{0}")]
    IoError(#[from] std::io::Error),
}

impl GeneratorError {
    /// Short label for the error category, printed before the message by the CLI
    pub fn kind(&self) -> &'static str {
        match self {
            GeneratorError::ValidationError(_) => "ValidationError",
            GeneratorError::ConfigError(_) => "ConfigError",
            GeneratorError::ConnectionError(_) => "ConnectionError",
            GeneratorError::TableNotFound(_) => "TableNotFound",
            GeneratorError::DatabaseError(_) => "DatabaseError",
            GeneratorError::IoError(_) => "IoError",
        }
    }
}

impl From<serde_json::Error> for GeneratorError {
    fn from(err: serde_json::Error) -> Self {
        GeneratorError::ConfigError(err.to_string())
    }
}

impl From<toml::de::Error> for GeneratorError {
    fn from(err: toml::de::Error) -> Self {
        GeneratorError::ConfigError(err.to_string())
    }
}

impl From<dotenvy::Error> for GeneratorError {
    fn from(err: dotenvy::Error) -> Self {
        GeneratorError::ConfigError(err.to_string())
    }
}
