//! Error types for the hydration layer
//!
//! Every failure is propagated to the caller unchanged; nothing here retries
//! or recovers.

use std::fmt;

use strata_introspect::DescribeError;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// ORM error type alias
pub type OrmError = ModelError;

/// ORM result type alias
pub type OrmResult<T> = ModelResult<T>;

/// Error types for ORM operations
#[derive(Debug, Clone)]
pub enum ModelError {
    /// Database query error
    Database(String),
    /// No model registered for the derived name
    UnknownModel(String),
    /// Row does not expose the requested column
    ColumnNotFound(String),
    /// Table metadata could not be loaded
    Schema(String),
    /// Relationship resolution failed
    Relationship(String),
    /// Serialization/deserialization error
    Serialization(String),
    /// Connection pool error
    Connection(String),
    /// Query building error
    Query(String),
    /// Configuration error
    Configuration(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Database(msg) => write!(f, "Database error: {}", msg),
            ModelError::UnknownModel(name) => write!(f, "No model registered for '{}'", name),
            ModelError::ColumnNotFound(msg) => write!(f, "Column not found: {}", msg),
            ModelError::Schema(msg) => write!(f, "Schema error: {}", msg),
            ModelError::Relationship(msg) => write!(f, "Relationship error: {}", msg),
            ModelError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            ModelError::Connection(msg) => write!(f, "Connection error: {}", msg),
            ModelError::Query(msg) => write!(f, "Query error: {}", msg),
            ModelError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

// Convert from sqlx errors
impl From<sqlx::Error> for ModelError {
    fn from(err: sqlx::Error) -> Self {
        ModelError::Database(err.to_string())
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

// Convert from anyhow errors
impl From<anyhow::Error> for ModelError {
    fn from(err: anyhow::Error) -> Self {
        ModelError::Database(err.to_string())
    }
}

impl From<DescribeError> for ModelError {
    fn from(err: DescribeError) -> Self {
        match err {
            DescribeError::Database(e) => ModelError::Database(e.to_string()),
            other => ModelError::Schema(other.to_string()),
        }
    }
}

impl From<crate::config::ConfigError> for ModelError {
    fn from(err: crate::config::ConfigError) -> Self {
        ModelError::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ModelError::UnknownModel("Widget".to_string()).to_string(),
            "No model registered for 'Widget'"
        );
        assert_eq!(
            ModelError::ColumnNotFound("Column 'name' not found".to_string()).to_string(),
            "Column not found: Column 'name' not found"
        );
    }

    #[test]
    fn test_describe_error_maps_to_schema() {
        let err: ModelError = DescribeError::TableNotFound("users".to_string()).into();
        assert!(matches!(err, ModelError::Schema(ref msg) if msg.contains("users")));
    }
}
