//! Model Registry - explicit table → model resolution
//!
//! Models are registered up front; resolving a table name runs it through the
//! [`TableNaming`] rule and looks the result up case-insensitively. An
//! unregistered name is a [`ModelError::UnknownModel`], never a panic.

use std::collections::HashMap;
use std::sync::Arc;

use super::core_trait::Model;
use super::definition::ModelDefinition;
use super::naming::{InflectorNaming, TableNaming};
use crate::error::{ModelError, ModelResult};

/// A model definition resolved for a requested table
#[derive(Debug, Clone, Copy)]
pub struct ResolvedModel<'a> {
    pub definition: &'a ModelDefinition,
}

impl<'a> ResolvedModel<'a> {
    /// Lower-cased table whose metadata drives hydration
    pub fn effective_table(&self, requested: &str) -> String {
        self.definition.effective_table(requested)
    }
}

/// Registry of model definitions keyed by lower-cased model name
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: HashMap<String, ModelDefinition>,
    naming: Arc<dyn TableNaming>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRegistry {
    /// Empty registry using [`InflectorNaming`]
    pub fn new() -> Self {
        Self::with_naming(Arc::new(InflectorNaming))
    }

    pub fn with_naming(naming: Arc<dyn TableNaming>) -> Self {
        Self {
            models: HashMap::new(),
            naming,
        }
    }

    /// Register a definition after validating it
    pub fn register(&mut self, definition: ModelDefinition) -> ModelResult<()> {
        definition.validate()?;

        let key = definition.name().to_lowercase();
        if self.models.contains_key(&key) {
            return Err(ModelError::Configuration(format!(
                "Model '{}' is already registered",
                definition.name()
            )));
        }

        tracing::debug!("Registered model '{}'", definition.name());
        self.models.insert(key, definition);
        Ok(())
    }

    /// Register the definition of a typed model
    pub fn register_model<M: Model>(&mut self) -> ModelResult<()> {
        self.register(M::definition())
    }

    /// Builder form of [`register`](Self::register)
    pub fn with_model(mut self, definition: ModelDefinition) -> ModelResult<Self> {
        self.register(definition)?;
        Ok(self)
    }

    /// Resolve the model a table's rows hydrate into
    pub fn resolve(&self, table: &str) -> ModelResult<ResolvedModel<'_>> {
        let name = self.naming.model_name(table);

        self.models
            .get(&name.to_lowercase())
            .map(|definition| ResolvedModel { definition })
            .ok_or_else(|| {
                ModelError::UnknownModel(format!("{} (derived from table '{}')", name, table))
            })
    }

    /// Look a definition up by model name
    pub fn get(&self, model_name: &str) -> Option<&ModelDefinition> {
        self.models.get(&model_name.to_lowercase())
    }

    pub fn contains(&self, model_name: &str) -> bool {
        self.get(model_name).is_some()
    }

    pub fn naming(&self) -> &dyn TableNaming {
        self.naming.as_ref()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct PrefixNaming;

    impl TableNaming for PrefixNaming {
        fn model_name(&self, table: &str) -> String {
            format!("Tbl{}", table)
        }

        fn property_name(&self, table: &str) -> String {
            format!("rel_{}", table)
        }
    }

    #[test]
    fn test_resolve_by_derived_name() {
        let registry = ModelRegistry::new()
            .with_model(ModelDefinition::new("User"))
            .unwrap();

        let resolved = registry.resolve("USERS").unwrap();
        assert_eq!(resolved.definition.name(), "User");
        assert_eq!(resolved.effective_table("USERS"), "users");
    }

    #[test]
    fn test_resolve_unknown_model() {
        let registry = ModelRegistry::new();

        let err = registry.resolve("widgets").unwrap_err();
        assert!(matches!(err, ModelError::UnknownModel(ref msg) if msg.contains("Widget")));
    }

    #[test]
    fn test_register_rejects_duplicates_and_invalid() {
        let mut registry = ModelRegistry::new();
        registry.register(ModelDefinition::new("User")).unwrap();

        assert!(matches!(
            registry.register(ModelDefinition::new("user")),
            Err(ModelError::Configuration(_))
        ));
        assert!(registry
            .register(ModelDefinition::new("Role").with_columns(Vec::<String>::new()))
            .is_err());
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("USER"));
    }

    #[test]
    fn test_custom_naming() {
        let registry = ModelRegistry::with_naming(Arc::new(PrefixNaming))
            .with_model(ModelDefinition::new("Tblusers"))
            .unwrap();

        assert!(registry.resolve("users").is_ok());
        assert_eq!(registry.naming().property_name("roles"), "rel_roles");
    }
}
