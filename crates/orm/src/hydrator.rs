//! Object Builder - hydrate raw rows into model instances
//!
//! [`Hydrator::create_object`] resolves the model registered for a table,
//! copies the row's columns onto a fresh [`ModelInstance`] (restricted to the
//! model's allow-list, if it declares one) and resolves each foreign-key
//! column through the [`RowFinder`], hydrating the referenced row in turn.
//!
//! Table metadata is loaded through the [`TableDescriber`] on first use and
//! cached for the lifetime of the hydrator, keyed by lower-cased table name.
//!
//! Foreign-key resolution follows one lookup per foreign-key column, awaited
//! in column order. Descent stops with [`Relation::Unresolved`] when the
//! configured depth is exhausted or, with cycle detection on, when the same
//! `(table, field, value)` edge is already being followed further up.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use strata_introspect::{Column, ForeignKeyReference, TableDescriber};

use crate::backends::{DatabaseRow, DatabaseValue};
use crate::config::HydrationConfig;
use crate::error::ModelResult;
use crate::finder::{Delimiters, RowFinder};
use crate::model::{Model, ModelDefinition, ModelInstance, ModelRegistry, Relation};

type HydrateFuture<'a> = Pin<Box<dyn Future<Output = ModelResult<ModelInstance>> + Send + 'a>>;

/// One followed foreign key: the referenced table, field and looked-up value
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edge {
    table: String,
    field: String,
    value: String,
}

impl Edge {
    fn new(reference: &ForeignKeyReference, value: &DatabaseValue) -> Self {
        Self {
            table: reference.table.to_lowercase(),
            field: reference.field.clone(),
            value: value.key(),
        }
    }
}

/// Builds model instances from rows, caching table metadata per instance
pub struct Hydrator {
    registry: Arc<ModelRegistry>,
    describer: Arc<dyn TableDescriber>,
    finder: Arc<dyn RowFinder>,
    config: HydrationConfig,
    tables: HashMap<String, Arc<[Column]>>,
}

impl std::fmt::Debug for Hydrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hydrator")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("cached_tables", &self.cached_tables())
            .finish_non_exhaustive()
    }
}

impl Hydrator {
    pub fn new(
        registry: Arc<ModelRegistry>,
        describer: Arc<dyn TableDescriber>,
        finder: Arc<dyn RowFinder>,
    ) -> Self {
        Self {
            registry,
            describer,
            finder,
            config: HydrationConfig::default(),
            tables: HashMap::new(),
        }
    }

    /// Replace the default resolution settings, rejecting invalid ones
    pub fn with_config(mut self, config: HydrationConfig) -> ModelResult<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &HydrationConfig {
        &self.config
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Hydrate `row` as a row of `table`
    pub async fn create_object(&mut self, table: &str, row: &dyn DatabaseRow) -> ModelResult<ModelInstance> {
        let mut path = Vec::new();
        self.hydrate(table, row, &mut path).await
    }

    /// Hydrate `row` and convert the result into a typed model
    pub async fn create<M: Model>(&mut self, table: &str, row: &dyn DatabaseRow) -> ModelResult<M> {
        self.create_object(table, row).await?.to_model()
    }

    /// Columns of `table`, loaded through the describer on first request
    pub async fn table_metadata(&mut self, table: &str) -> ModelResult<Arc<[Column]>> {
        let key = table.to_lowercase();

        if let Some(columns) = self.tables.get(&key) {
            tracing::trace!("Table metadata cache hit for '{}'", key);
            return Ok(Arc::clone(columns));
        }

        tracing::debug!("Loading table metadata for '{}'", key);
        let columns: Arc<[Column]> = Arc::from(self.describer.get_table(&key).await?);
        self.tables.insert(key, Arc::clone(&columns));

        Ok(columns)
    }

    pub fn is_cached(&self, table: &str) -> bool {
        self.tables.contains_key(&table.to_lowercase())
    }

    /// Tables whose metadata has been loaded, sorted
    pub fn cached_tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        tables.sort_unstable();
        tables
    }

    fn hydrate<'a>(
        &'a mut self,
        table: &'a str,
        row: &'a dyn DatabaseRow,
        path: &'a mut Vec<Edge>,
    ) -> HydrateFuture<'a> {
        Box::pin(async move {
            let registry = Arc::clone(&self.registry);
            let resolved = registry.resolve(table)?;
            let definition = resolved.definition;
            let effective_table = resolved.effective_table(table);

            let newly_loaded = !self.is_cached(&effective_table);
            let columns = self.table_metadata(&effective_table).await?;
            if newly_loaded {
                warn_unknown_columns(definition, &effective_table, &columns);
            }

            let mut model = definition.instantiate(&effective_table);

            for column in columns.iter().filter(|column| definition.allows(column.field())) {
                let value = row.get_by_name(column.field())?;
                model.set(column.field(), value.clone());

                let Some(reference) = column.foreign_key() else {
                    continue;
                };

                let property = registry.naming().property_name(&reference.table);
                let relation = self.resolve_foreign(reference, value, path).await?;

                if model.set_relation(property.as_str(), relation).is_some() {
                    tracing::debug!(
                        "Relation '{}' on '{}' replaced by column '{}'",
                        property,
                        definition.name(),
                        column.field()
                    );
                }
            }

            Ok(model)
        })
    }

    async fn resolve_foreign(
        &mut self,
        reference: &ForeignKeyReference,
        value: DatabaseValue,
        path: &mut Vec<Edge>,
    ) -> ModelResult<Relation> {
        let edge = Edge::new(reference, &value);

        if path.len() >= self.config.max_depth {
            tracing::warn!(
                "Not resolving {}.{} = {}: depth limit {} reached",
                reference.table,
                reference.field,
                value,
                self.config.max_depth
            );
            return Ok(Relation::Unresolved);
        }

        if self.config.detect_cycles && path.contains(&edge) {
            tracing::warn!(
                "Not resolving {}.{} = {}: cycle detected",
                reference.table,
                reference.field,
                value
            );
            return Ok(Relation::Unresolved);
        }

        tracing::trace!(
            "Resolving foreign key {}.{} = {}",
            reference.table,
            reference.field,
            value
        );

        let delimiters = Delimiters::new().with(reference.field.as_str(), value);
        let Some(related_row) = self.finder.find(&reference.table, &delimiters).await? else {
            return Ok(Relation::Missing);
        };

        path.push(edge);
        let related = self.hydrate(&reference.table, related_row.as_ref(), path).await;
        path.pop();

        Ok(Relation::Loaded(Box::new(related?)))
    }
}

fn warn_unknown_columns(definition: &ModelDefinition, table: &str, columns: &[Column]) {
    let Some(allowed) = definition.columns() else {
        return;
    };

    for name in allowed {
        if !columns.iter().any(|column| column.field() == name) {
            tracing::warn!(
                "Model '{}' allows column '{}' which table '{}' does not have",
                definition.name(),
                name,
                table
            );
        }
    }
}
