//! Core Model Trait - typed models that hydrated rows convert into
//!
//! Implementing [`Model`] lets a struct register itself with the
//! [`ModelRegistry`](super::ModelRegistry) and be produced directly by
//! [`Hydrator::create`](crate::hydrator::Hydrator::create).

use std::fmt::Debug;

use serde::Deserialize;

use super::definition::ModelDefinition;

/// Core trait for typed database models
pub trait Model: Send + Sync + Debug + for<'de> Deserialize<'de> {
    /// Name the naming rule resolves table names to (e.g. `User` for `users`)
    fn model_name() -> &'static str;

    /// Table name override; defaults to the table the row was requested for
    fn table_name() -> Option<&'static str> {
        None
    }

    /// Column allow-list; `None` hydrates every column of the table
    fn columns() -> Option<&'static [&'static str]> {
        None
    }

    /// Registry definition derived from the associated functions above
    fn definition() -> ModelDefinition
    where
        Self: Sized,
    {
        let mut definition = ModelDefinition::new(Self::model_name());

        if let Some(table) = Self::table_name() {
            definition = definition.with_table(table);
        }

        if let Some(columns) = Self::columns() {
            definition = definition.with_columns(columns.iter().copied());
        }

        definition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Account {
        #[allow(dead_code)]
        id: i64,
    }

    impl Model for Account {
        fn model_name() -> &'static str {
            "Account"
        }

        fn table_name() -> Option<&'static str> {
            Some("billing_accounts")
        }

        fn columns() -> Option<&'static [&'static str]> {
            Some(&["id", "owner_id"])
        }
    }

    #[test]
    fn test_definition_from_model() {
        let definition = Account::definition();

        assert_eq!(definition.name(), "Account");
        assert_eq!(definition.table(), Some("billing_accounts"));
        assert_eq!(
            definition.columns(),
            Some(&["id".to_string(), "owner_id".to_string()][..])
        );
    }
}
