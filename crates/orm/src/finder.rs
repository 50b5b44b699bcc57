//! Single-row lookups by equality filter
//!
//! The hydrator resolves every foreign key through a [`RowFinder`]. The
//! PostgreSQL implementation issues one `SELECT ... LIMIT 1` per call.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::backends::{DatabasePool, DatabaseRow, DatabaseValue, SqlDialect};
use crate::error::{ModelError, ModelResult};

/// Equality filter: column → value, all of which must match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delimiters {
    conditions: BTreeMap<String, DatabaseValue>,
}

impl Delimiters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on the `id` column
    pub fn by_id(id: impl Into<DatabaseValue>) -> Self {
        Self::new().with("id", id)
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<DatabaseValue>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&DatabaseValue> {
        self.conditions.get(field)
    }

    /// Conditions in column-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DatabaseValue)> {
        self.conditions.iter().map(|(field, value)| (field.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Whether any condition compares against NULL
    pub fn has_null(&self) -> bool {
        self.conditions.values().any(DatabaseValue::is_null)
    }

    /// Whether a row satisfies every condition
    ///
    /// Values are compared by [`DatabaseValue::key`], so integer width does
    /// not matter. As with SQL `=`, a NULL on either side never matches, and
    /// a row lacking a filtered column never matches.
    pub fn matches(&self, row: &dyn DatabaseRow) -> bool {
        self.conditions.iter().all(|(field, expected)| match row.get_by_name(field) {
            Ok(actual) if expected.is_null() || actual.is_null() => false,
            Ok(actual) => actual.key() == expected.key(),
            Err(_) => false,
        })
    }
}

impl<K, V> FromIterator<(K, V)> for Delimiters
where
    K: Into<String>,
    V: Into<DatabaseValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            conditions: iter
                .into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        }
    }
}

/// Fetch at most one row of `table` matching the delimiters
#[async_trait]
pub trait RowFinder: Send + Sync {
    /// `Ok(None)` means no row matched; that is not an error
    async fn find(&self, table: &str, delimiters: &Delimiters) -> ModelResult<Option<Box<dyn DatabaseRow>>>;
}

/// Row lookups against a database pool
#[derive(Clone)]
pub struct PostgresRowFinder {
    pool: Arc<dyn DatabasePool>,
    dialect: SqlDialect,
}

impl PostgresRowFinder {
    pub fn new(pool: Arc<dyn DatabasePool>) -> Self {
        Self {
            pool,
            dialect: SqlDialect::PostgreSQL,
        }
    }

    /// Build the lookup statement and its parameters
    pub fn build_query(&self, table: &str, delimiters: &Delimiters) -> ModelResult<(String, Vec<DatabaseValue>)> {
        if delimiters.is_empty() {
            return Err(ModelError::Query(format!(
                "Refusing to look up a row of '{}' without delimiters",
                table
            )));
        }

        let mut clauses = Vec::with_capacity(delimiters.len());
        let mut params = Vec::with_capacity(delimiters.len());

        for (index, (field, value)) in delimiters.iter().enumerate() {
            clauses.push(format!(
                "{} = {}",
                self.dialect.quote_identifier(field),
                self.dialect.parameter_placeholder(index)
            ));
            params.push(value.clone());
        }

        let sql = format!(
            "SELECT * FROM {} WHERE {} LIMIT 1",
            self.dialect.quote_identifier(table),
            clauses.join(" AND ")
        );

        Ok((sql, params))
    }
}

#[async_trait]
impl RowFinder for PostgresRowFinder {
    async fn find(&self, table: &str, delimiters: &Delimiters) -> ModelResult<Option<Box<dyn DatabaseRow>>> {
        // `= NULL` matches no row; skip the round trip
        if delimiters.has_null() {
            tracing::trace!("Row lookup on '{}' compares against NULL, no match", table);
            return Ok(None);
        }

        let (sql, params) = self.build_query(table, delimiters)?;
        tracing::trace!("Row lookup: {}", sql);

        self.pool.fetch_optional(&sql, &params).await
    }
}
