//! Result Mapper - turn a query result into hydrated model instances
//!
//! A [`ResultMapper`] remembers the table of its most recent
//! [`get`](ResultMapper::get) and the query it produced. [`result`]
//! materializes the query's rows and hydrates each one, in order, through its
//! [`Hydrator`].
//!
//! [`result`]: ResultMapper::result

use std::sync::Arc;

use crate::backends::DatabaseRow;
use crate::error::ModelResult;
use crate::hydrator::Hydrator;
use crate::model::{Model, ModelInstance};
use crate::query::{QueryHandle, RowSource, TableQuery};

/// Rows attached to a mapper: a query still to run, or rows already fetched
pub enum QueryResult {
    Query(Box<dyn RowSource>),
    Rows(Vec<Box<dyn DatabaseRow>>),
}

impl std::fmt::Debug for QueryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryResult::Query(_) => f.write_str("QueryResult::Query(..)"),
            QueryResult::Rows(rows) => write!(f, "QueryResult::Rows({} rows)", rows.len()),
        }
    }
}

/// Hydrates the rows of a remembered table query
pub struct ResultMapper {
    hydrator: Hydrator,
    tables: Arc<dyn TableQuery>,
    query: Option<QueryResult>,
    table: String,
}

impl std::fmt::Debug for ResultMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultMapper")
            .field("hydrator", &self.hydrator)
            .field("query", &self.query)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl ResultMapper {
    pub fn new(hydrator: Hydrator, tables: Arc<dyn TableQuery>) -> Self {
        Self {
            hydrator,
            tables,
            query: None,
            table: String::new(),
        }
    }

    /// Select every row of `table` (or the default table for `None`),
    /// remembering the table and replacing the attached query
    pub async fn get(&mut self, table: Option<&str>) -> ModelResult<&mut Self> {
        let QueryHandle { table, source } = self.tables.get(table).await?;

        tracing::debug!("Selected table '{}'", table);
        self.table = table;
        self.query = Some(QueryResult::Query(source));

        Ok(self)
    }

    /// Attach already-fetched rows; the remembered table is kept
    pub fn set_rows(&mut self, rows: Vec<Box<dyn DatabaseRow>>) -> &mut Self {
        self.query = Some(QueryResult::Rows(rows));
        self
    }

    /// Attach a query to run on the next `result()`; the remembered table is kept
    pub fn set_query(&mut self, source: Box<dyn RowSource>) -> &mut Self {
        self.query = Some(QueryResult::Query(source));
        self
    }

    /// Table remembered from the last `get`, empty before the first one
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn hydrator(&self) -> &Hydrator {
        &self.hydrator
    }

    pub fn hydrator_mut(&mut self) -> &mut Hydrator {
        &mut self.hydrator
    }

    /// Hydrate every row of the attached query, preserving row order
    ///
    /// Without a remembered table this first falls back to `get(None)`. When
    /// rows or a query are already attached, that fallback only adopts the
    /// default table's name and the attached rows are the ones hydrated.
    pub async fn result(&mut self) -> ModelResult<Vec<ModelInstance>> {
        if self.table.is_empty() {
            let attached = self.query.take();
            let selected = self.get(None).await.map(|_| ());
            if attached.is_some() {
                self.query = attached;
            }
            selected?;
        }

        let fetched;
        let rows: &[Box<dyn DatabaseRow>] = match &self.query {
            Some(QueryResult::Query(source)) => {
                fetched = source.result().await?;
                &fetched
            }
            Some(QueryResult::Rows(rows)) => rows,
            None => &[],
        };

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let object = self.hydrator.create_object(&self.table, row.as_ref()).await?;
            result.push(object);
        }

        tracing::debug!("Hydrated {} rows of '{}'", result.len(), self.table);
        Ok(result)
    }

    /// [`result`](Self::result) converted into typed models
    pub async fn result_as<M: Model>(&mut self) -> ModelResult<Vec<M>> {
        self.result()
            .await?
            .iter()
            .map(ModelInstance::to_model::<M>)
            .collect()
    }
}
