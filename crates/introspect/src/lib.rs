//! # strata-introspect
//!
//! Table introspection for the strata hydration layer: ordered column
//! descriptors with foreign-key linkage, behind the [`TableDescriber`] trait.
//!
//! Two describers ship with the crate:
//!
//! - [`PostgresDescriber`] reads `information_schema` through sqlx
//! - [`StaticDescriber`] serves columns registered up front, for tests and
//!   schemas known at compile time

use async_trait::async_trait;

pub mod column;
pub mod postgres;
pub mod fixed;

pub use column::{Column, ForeignKeyReference};
pub use postgres::PostgresDescriber;
pub use fixed::StaticDescriber;

/// Result type alias for introspection operations
pub type DescribeResult<T> = Result<T, DescribeError>;

/// Errors raised while describing a table
#[derive(Debug, thiserror::Error)]
pub enum DescribeError {
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Invalid column metadata for table '{table}': {reason}")]
    InvalidMetadata { table: String, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Source of column metadata for a table
#[async_trait]
pub trait TableDescriber: Send + Sync {
    /// Return the table's columns in ordinal order
    async fn get_table(&self, table: &str) -> DescribeResult<Vec<Column>>;
}
