//! # strata-orm: row-to-model hydration
//!
//! Turns raw database rows into model instances and resolves their foreign
//! keys by looking up the referenced rows.
//!
//! - [`Hydrator`] builds one [`ModelInstance`] per row: it resolves the model
//!   registered for the table, copies the allowed columns, and attaches the
//!   referenced row of every foreign-key column.
//! - [`ResultMapper`] runs (or takes) a table query and hydrates every row of
//!   its result, in order.
//!
//! Table metadata comes from a [`TableDescriber`](strata_introspect::TableDescriber),
//! referenced rows from a [`RowFinder`]. Both have PostgreSQL implementations
//! and in-memory ones in [`memory`].

pub mod backends;
pub mod config;
pub mod error;
pub mod finder;
pub mod hydrator;
pub mod memory;
pub mod model;
pub mod query;
pub mod result;


// Re-export core traits and types
pub use backends::{DatabasePool, DatabaseRow, DatabaseRowExt, DatabaseValue, PostgresBackend, PostgresPool};
pub use config::{ConfigError, DatabaseConfig, HydrationConfig};
pub use error::*;
pub use finder::{Delimiters, PostgresRowFinder, RowFinder};
pub use hydrator::Hydrator;
pub use model::*;
pub use query::{PostgresTableQuery, QueryHandle, RowSource, TableQuery};
pub use result::{QueryResult, ResultMapper};

pub use strata_introspect::{Column, ForeignKeyReference, TableDescriber};
