//! In-memory collaborators
//!
//! [`MemoryRow`] and [`MemoryDatabase`] stand in for a live database: the
//! database serves row lookups and table queries from rows held in memory and
//! records every lookup it answers.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::backends::{DatabaseRow, DatabaseValue};
use crate::error::{ModelError, ModelResult, OrmResult};
use crate::finder::{Delimiters, RowFinder};
use crate::query::{QueryHandle, RowSource, TableQuery};

/// Row with ordered, named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryRow {
    columns: Vec<(String, DatabaseValue)>,
}

impl MemoryRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: &str, value: impl Into<DatabaseValue>) -> Self {
        let value = value.into();
        match self.columns.iter_mut().find(|(existing, _)| existing == name) {
            Some(slot) => slot.1 = value,
            None => self.columns.push((name.to_string(), value)),
        }
        self
    }

    /// Build from a JSON object
    pub fn from_json(json: JsonValue) -> ModelResult<Self> {
        match json {
            JsonValue::Object(map) => Ok(map
                .into_iter()
                .fold(Self::new(), |row, (name, value)| {
                    row.with_column(&name, DatabaseValue::from_json(value))
                })),
            other => Err(ModelError::Serialization(format!(
                "Expected a JSON object for a row, got {}",
                other
            ))),
        }
    }
}

impl DatabaseRow for MemoryRow {
    fn get_by_name(&self, name: &str) -> OrmResult<DatabaseValue> {
        self.columns
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| ModelError::ColumnNotFound(format!("Column '{}' not found", name)))
    }

    fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }
}

/// Materialized rows of one table
#[derive(Debug, Clone)]
pub struct MemoryRowSource {
    rows: Vec<MemoryRow>,
}

#[async_trait]
impl RowSource for MemoryRowSource {
    async fn result(&self) -> ModelResult<Vec<Box<dyn DatabaseRow>>> {
        Ok(self
            .rows
            .iter()
            .cloned()
            .map(|row| Box::new(row) as Box<dyn DatabaseRow>)
            .collect())
    }
}

/// Tables of rows keyed by lower-cased table name
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    tables: HashMap<String, Vec<MemoryRow>>,
    default_table: Option<String>,
    lookups: Mutex<Vec<(String, Delimiters)>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, replacing any previous rows
    pub fn with_table<I>(mut self, table: &str, rows: I) -> Self
    where
        I: IntoIterator<Item = MemoryRow>,
    {
        self.tables.insert(table.to_lowercase(), rows.into_iter().collect());
        self
    }

    /// Add a table whose rows are JSON objects
    pub fn with_json_table<I>(self, table: &str, rows: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = JsonValue>,
    {
        let rows = rows
            .into_iter()
            .map(MemoryRow::from_json)
            .collect::<ModelResult<Vec<_>>>()?;
        Ok(self.with_table(table, rows))
    }

    /// Table selected by `get(None)`
    pub fn with_default_table(mut self, table: &str) -> Self {
        self.default_table = Some(table.to_string());
        self
    }

    pub fn rows(&self, table: &str) -> Option<&[MemoryRow]> {
        self.tables.get(&table.to_lowercase()).map(Vec::as_slice)
    }

    /// Lookups answered so far, in call order
    pub fn lookups(&self) -> Vec<(String, Delimiters)> {
        self.lookups
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn table(&self, table: &str) -> ModelResult<&Vec<MemoryRow>> {
        self.tables
            .get(&table.to_lowercase())
            .ok_or_else(|| ModelError::Query(format!("Table '{}' does not exist", table)))
    }
}

#[async_trait]
impl RowFinder for MemoryDatabase {
    async fn find(&self, table: &str, delimiters: &Delimiters) -> ModelResult<Option<Box<dyn DatabaseRow>>> {
        self.lookups
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((table.to_string(), delimiters.clone()));

        let found = self
            .table(table)?
            .iter()
            .find(|row| delimiters.matches(*row))
            .cloned();

        Ok(found.map(|row| Box::new(row) as Box<dyn DatabaseRow>))
    }
}

#[async_trait]
impl TableQuery for MemoryDatabase {
    async fn get(&self, table: Option<&str>) -> ModelResult<QueryHandle> {
        let table = table
            .or(self.default_table.as_deref())
            .filter(|table| !table.is_empty())
            .ok_or_else(|| {
                ModelError::Query("No table given and no default table configured".to_string())
            })?
            .to_string();

        let rows = self.table(&table)?.clone();

        Ok(QueryHandle {
            table,
            source: Box::new(MemoryRowSource { rows }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_row_from_json() {
        let row = MemoryRow::from_json(json!({"id": 1, "name": "Ann"})).unwrap();

        assert_eq!(row.get_by_name("id").unwrap(), DatabaseValue::Int32(1));
        assert_eq!(row.column_count(), 2);
        assert!(row.has_column("name"));
        assert!(matches!(row.get_by_name("email"), Err(ModelError::ColumnNotFound(_))));
        assert!(MemoryRow::from_json(json!([1, 2])).is_err());
    }

    #[tokio::test]
    async fn test_find_records_lookups() {
        let db = MemoryDatabase::new()
            .with_json_table("roles", vec![json!({"id": 5, "title": "Admin"})])
            .unwrap();

        let found = db.find("roles", &Delimiters::by_id(5)).await.unwrap();
        assert!(found.is_some());

        let missing = db.find("roles", &Delimiters::by_id(6)).await.unwrap();
        assert!(missing.is_none());

        assert_eq!(db.lookup_count(), 2);
        assert!(db.find("nope", &Delimiters::by_id(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_get_with_default_table() {
        let db = MemoryDatabase::new()
            .with_json_table("users", vec![json!({"id": 1}), json!({"id": 2})])
            .unwrap()
            .with_default_table("users");

        let handle = db.get(None).await.unwrap();
        assert_eq!(handle.table, "users");
        assert_eq!(handle.source.result().await.unwrap().len(), 2);

        let empty = MemoryDatabase::new();
        assert!(matches!(empty.get(None).await, Err(ModelError::Query(_))));
    }
}
