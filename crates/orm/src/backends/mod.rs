//! Database Backend Abstractions
//!
//! Row, value and pool abstractions the hydrator and its collaborators share,
//! with the PostgreSQL implementation on top of sqlx.

pub mod core;
pub mod postgres;

// Re-export core traits and types
pub use core::*;
pub use postgres::{DatabaseConnectionConfig, PostgresBackend, PostgresPool, PostgresRow};
