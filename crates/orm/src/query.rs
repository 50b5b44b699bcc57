//! Row sources and "select everything from a table" queries
//!
//! A [`RowSource`] is a query that has been built but not necessarily run;
//! calling [`RowSource::result`] materializes its rows. [`TableQuery`] builds
//! row sources for a table, falling back to a default table when none is
//! given.

use std::sync::Arc;

use async_trait::async_trait;

use crate::backends::{DatabasePool, DatabaseRow, SqlDialect};
use crate::error::{ModelError, ModelResult};

/// A query whose rows can be materialized on demand
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn result(&self) -> ModelResult<Vec<Box<dyn DatabaseRow>>>;
}

/// A row source together with the table it reads
pub struct QueryHandle {
    pub table: String,
    pub source: Box<dyn RowSource>,
}

impl std::fmt::Debug for QueryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryHandle")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

/// Builds row sources selecting every row of a table
#[async_trait]
pub trait TableQuery: Send + Sync {
    /// `None` selects the collaborator's default table
    async fn get(&self, table: Option<&str>) -> ModelResult<QueryHandle>;
}

/// Lazily runs `SELECT * FROM <table>` on a pool
pub struct PostgresRowSource {
    pool: Arc<dyn DatabasePool>,
    sql: String,
}

impl PostgresRowSource {
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

#[async_trait]
impl RowSource for PostgresRowSource {
    async fn result(&self) -> ModelResult<Vec<Box<dyn DatabaseRow>>> {
        tracing::trace!("Fetching rows: {}", self.sql);
        self.pool.fetch_all(&self.sql, &[]).await
    }
}

/// [`TableQuery`] over a database pool
#[derive(Clone)]
pub struct PostgresTableQuery {
    pool: Arc<dyn DatabasePool>,
    default_table: Option<String>,
    dialect: SqlDialect,
}

impl PostgresTableQuery {
    pub fn new(pool: Arc<dyn DatabasePool>) -> Self {
        Self {
            pool,
            default_table: None,
            dialect: SqlDialect::PostgreSQL,
        }
    }

    /// Table selected by `get(None)`
    pub fn with_default_table(mut self, table: impl Into<String>) -> Self {
        self.default_table = Some(table.into());
        self
    }

    pub fn default_table(&self) -> Option<&str> {
        self.default_table.as_deref()
    }

    /// The row source `get` would return, without the async wrapper
    pub fn source_for(&self, table: &str) -> PostgresRowSource {
        PostgresRowSource {
            pool: Arc::clone(&self.pool),
            sql: format!("SELECT * FROM {}", self.dialect.quote_identifier(table)),
        }
    }
}

#[async_trait]
impl TableQuery for PostgresTableQuery {
    async fn get(&self, table: Option<&str>) -> ModelResult<QueryHandle> {
        let table = match table.or(self.default_table.as_deref()) {
            Some(table) if !table.is_empty() => table.to_string(),
            _ => {
                return Err(ModelError::Query(
                    "No table given and no default table configured".to_string(),
                ))
            }
        };

        let source = self.source_for(&table);
        Ok(QueryHandle {
            table,
            source: Box::new(source),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{DatabasePoolStats, DatabaseValue};

    struct EmptyPool;

    #[async_trait]
    impl DatabasePool for EmptyPool {
        async fn fetch_all(&self, _sql: &str, _params: &[DatabaseValue]) -> ModelResult<Vec<Box<dyn DatabaseRow>>> {
            Ok(Vec::new())
        }

        async fn fetch_optional(&self, _sql: &str, _params: &[DatabaseValue]) -> ModelResult<Option<Box<dyn DatabaseRow>>> {
            Ok(None)
        }

        async fn close(&self) -> ModelResult<()> {
            Ok(())
        }

        fn stats(&self) -> DatabasePoolStats {
            DatabasePoolStats {
                total_connections: 0,
                idle_connections: 0,
                active_connections: 0,
            }
        }
    }

    #[test]
    fn test_source_for_quotes_table() {
        let query = PostgresTableQuery::new(Arc::new(EmptyPool));

        assert_eq!(query.source_for("users").sql(), "SELECT * FROM \"users\"");
        assert_eq!(
            query.source_for("audit.events").sql(),
            "SELECT * FROM \"audit\".\"events\""
        );
    }

    #[tokio::test]
    async fn test_get_falls_back_to_default_table() {
        let query = PostgresTableQuery::new(Arc::new(EmptyPool)).with_default_table("users");

        let handle = query.get(None).await.unwrap();
        assert_eq!(handle.table, "users");
        assert!(handle.source.result().await.unwrap().is_empty());

        let handle = query.get(Some("roles")).await.unwrap();
        assert_eq!(handle.table, "roles");
    }

    #[tokio::test]
    async fn test_get_without_any_table() {
        let query = PostgresTableQuery::new(Arc::new(EmptyPool));

        assert!(matches!(query.get(None).await, Err(ModelError::Query(_))));
        assert!(matches!(query.get(Some("")).await, Err(ModelError::Query(_))));
    }
}
