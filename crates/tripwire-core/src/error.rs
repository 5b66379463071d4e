//! Error types for Tripwire

use thiserror::Error;

/// Result type alias using Tripwire's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Tripwire operations
#[derive(Error, Debug)]
pub enum Error {
    /// Target values could not be fetched
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Not found error
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity looked up
        entity: String,
        /// Identifier that matched nothing
        id: String,
    },

    /// Persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = Error::not_found("Check", "42");
        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(err.to_string(), "Check not found: 42");
    }

    #[test]
    fn test_fetch_message() {
        assert_eq!(
            Error::fetch("values file gone").to_string(),
            "Fetch error: values file gone"
        );
    }
}
