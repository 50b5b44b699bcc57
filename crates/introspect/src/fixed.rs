//! Describer backed by columns registered up front

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{Column, DescribeError, DescribeResult, TableDescriber};

/// In-memory describer keyed by lower-cased table name
///
/// Every `get_table` call is recorded so callers can assert how often
/// metadata was requested.
#[derive(Debug, Default)]
pub struct StaticDescriber {
    tables: HashMap<String, Vec<Column>>,
    calls: Mutex<Vec<String>>,
}

impl StaticDescriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the columns of a table, replacing any previous entry
    pub fn with_table(mut self, table: &str, columns: Vec<Column>) -> Self {
        self.tables.insert(table.to_lowercase(), columns);
        self
    }

    /// Tables requested so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of times `table` was requested
    pub fn calls_for(&self, table: &str) -> usize {
        let table = table.to_lowercase();
        self.calls().iter().filter(|t| **t == table).count()
    }
}

#[async_trait]
impl TableDescriber for StaticDescriber {
    async fn get_table(&self, table: &str) -> DescribeResult<Vec<Column>> {
        let key = table.to_lowercase();
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(key.clone());

        self.tables
            .get(&key)
            .cloned()
            .ok_or(DescribeError::TableNotFound(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let describer = StaticDescriber::new()
            .with_table("Users", vec![Column::new("id"), Column::new("name")]);

        let columns = describer.get_table("USERS").await.unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].field(), "id");
        assert_eq!(describer.calls_for("users"), 1);
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let describer = StaticDescriber::new();

        let err = describer.get_table("missing").await.unwrap_err();
        assert!(matches!(err, DescribeError::TableNotFound(ref t) if t == "missing"));
        assert_eq!(describer.calls(), vec!["missing".to_string()]);
    }
}
