//! Model definitions: the registered shape a table's rows hydrate into

use crate::error::{ModelError, ModelResult};
use super::instance::ModelInstance;

/// Declared model: its name, an optional table override and an optional
/// column allow-list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDefinition {
    name: String,
    table: Option<String>,
    columns: Option<Vec<String>>,
}

impl ModelDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            columns: None,
        }
    }

    /// Override the table the model reads its metadata from
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Restrict hydration to the given columns
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    /// Whether hydration copies `field`
    pub fn allows(&self, field: &str) -> bool {
        match &self.columns {
            Some(columns) => columns.iter().any(|column| column == field),
            None => true,
        }
    }

    /// Table whose metadata drives hydration, always lower-cased
    pub fn effective_table(&self, requested: &str) -> String {
        self.table.as_deref().unwrap_or(requested).to_lowercase()
    }

    /// Fresh, empty instance of this model
    pub fn instantiate(&self, table: &str) -> ModelInstance {
        ModelInstance::new(self.name.clone(), table)
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::Configuration("Model name cannot be empty".to_string()));
        }

        if let Some(table) = &self.table {
            if table.trim().is_empty() {
                return Err(ModelError::Configuration(format!(
                    "Model '{}' declares an empty table name",
                    self.name
                )));
            }
        }

        if let Some(columns) = &self.columns {
            if columns.is_empty() {
                return Err(ModelError::Configuration(format!(
                    "Model '{}' declares an empty column list",
                    self.name
                )));
            }

            for (index, column) in columns.iter().enumerate() {
                if columns[..index].contains(column) {
                    return Err(ModelError::Configuration(format!(
                        "Model '{}' lists column '{}' twice",
                        self.name, column
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_table() {
        let plain = ModelDefinition::new("User");
        assert_eq!(plain.effective_table("Users"), "users");

        let overridden = ModelDefinition::new("User").with_table("App_Users");
        assert_eq!(overridden.effective_table("users"), "app_users");
    }

    #[test]
    fn test_allows() {
        let open = ModelDefinition::new("User");
        assert!(open.allows("anything"));

        let restricted = ModelDefinition::new("User").with_columns(["id", "name"]);
        assert!(restricted.allows("name"));
        assert!(!restricted.allows("password"));
    }

    #[test]
    fn test_validate() {
        assert!(ModelDefinition::new("User").validate().is_ok());
        assert!(ModelDefinition::new(" ").validate().is_err());
        assert!(ModelDefinition::new("User").with_table("").validate().is_err());
        assert!(ModelDefinition::new("User")
            .with_columns(Vec::<String>::new())
            .validate()
            .is_err());
        assert!(ModelDefinition::new("User")
            .with_columns(["id", "id"])
            .validate()
            .is_err());
    }
}
