//! Column descriptors

use serde::{Deserialize, Serialize};

/// Target of a foreign-key column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKeyReference {
    /// Referenced table name
    pub table: String,
    /// Referenced column on that table
    pub field: String,
}

/// Metadata describing one database column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    field: String,
    data_type: Option<String>,
    nullable: bool,
    primary_key: bool,
    foreign_key: Option<ForeignKeyReference>,
}

impl Column {
    /// Create a plain, nullable column
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            data_type: None,
            nullable: true,
            primary_key: false,
            foreign_key: None,
        }
    }

    /// Create a foreign-key column referencing `table.field`
    pub fn foreign(
        field: impl Into<String>,
        table: impl Into<String>,
        referenced_field: impl Into<String>,
    ) -> Self {
        Self::new(field).references(table, referenced_field)
    }

    /// Mark the column as a foreign key to `table.field`
    pub fn references(mut self, table: impl Into<String>, field: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKeyReference {
            table: table.into(),
            field: field.into(),
        });
        self
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark the column as (part of) the primary key
    pub fn primary(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn data_type(&self) -> Option<&str> {
        self.data_type.as_deref()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_foreign_key(&self) -> bool {
        self.foreign_key.is_some()
    }

    pub fn foreign_key(&self) -> Option<&ForeignKeyReference> {
        self.foreign_key.as_ref()
    }

    pub fn referenced_table(&self) -> Option<&str> {
        self.foreign_key.as_ref().map(|fk| fk.table.as_str())
    }

    pub fn referenced_field(&self) -> Option<&str> {
        self.foreign_key.as_ref().map(|fk| fk.field.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_column() {
        let column = Column::new("name").with_data_type("text");

        assert_eq!(column.field(), "name");
        assert_eq!(column.data_type(), Some("text"));
        assert!(column.is_nullable());
        assert!(!column.is_foreign_key());
        assert_eq!(column.referenced_table(), None);
        assert_eq!(column.referenced_field(), None);
    }

    #[test]
    fn test_foreign_column() {
        let column = Column::foreign("role_id", "roles", "id").not_null();

        assert!(column.is_foreign_key());
        assert!(!column.is_nullable());
        assert_eq!(column.referenced_table(), Some("roles"));
        assert_eq!(column.referenced_field(), Some("id"));
    }

    #[test]
    fn test_primary_column_is_not_nullable() {
        let column = Column::new("id").primary();

        assert!(column.is_primary_key());
        assert!(!column.is_nullable());
    }
}
