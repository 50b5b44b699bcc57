//! PostgreSQL describer reading `information_schema`

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::{Column, DescribeError, DescribeResult, TableDescriber};

const DESCRIBE_TABLE_SQL: &str = r#"
SELECT
    c.column_name::text AS column_name,
    c.data_type::text AS data_type,
    (c.is_nullable = 'YES') AS is_nullable,
    (pk.column_name IS NOT NULL) AS is_primary_key,
    fk.foreign_table::text AS foreign_table,
    fk.foreign_column::text AS foreign_column
FROM information_schema.columns c
LEFT JOIN (
    SELECT kcu.column_name
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
        ON tc.constraint_name = kcu.constraint_name
        AND tc.table_schema = kcu.table_schema
    WHERE tc.constraint_type = 'PRIMARY KEY'
        AND tc.table_schema = $1
        AND tc.table_name = $2
) pk ON pk.column_name = c.column_name
LEFT JOIN (
    SELECT
        kcu.column_name,
        ccu.table_name AS foreign_table,
        ccu.column_name AS foreign_column
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
        ON tc.constraint_name = kcu.constraint_name
        AND tc.table_schema = kcu.table_schema
    JOIN information_schema.constraint_column_usage ccu
        ON ccu.constraint_name = tc.constraint_name
        AND ccu.table_schema = tc.table_schema
    WHERE tc.constraint_type = 'FOREIGN KEY'
        AND tc.table_schema = $1
        AND tc.table_name = $2
) fk ON fk.column_name = c.column_name
WHERE c.table_schema = $1 AND c.table_name = $2
ORDER BY c.ordinal_position
"#;

/// Describes tables of one PostgreSQL schema
#[derive(Debug, Clone)]
pub struct PostgresDescriber {
    pool: PgPool,
    schema: String,
}

impl PostgresDescriber {
    /// Describer over the `public` schema
    pub fn new(pool: PgPool) -> Self {
        Self::with_schema(pool, "public")
    }

    pub fn with_schema(pool: PgPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }
}

#[async_trait]
impl TableDescriber for PostgresDescriber {
    async fn get_table(&self, table: &str) -> DescribeResult<Vec<Column>> {
        let rows = sqlx::query(DESCRIBE_TABLE_SQL)
            .bind(&self.schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Err(DescribeError::TableNotFound(format!("{}.{}", self.schema, table)));
        }

        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(rows.len());

        for row in rows {
            let field: String = row.try_get("column_name")?;

            // A column covered by several constraints shows up once per constraint
            if !seen.insert(field.clone()) {
                continue;
            }

            let data_type: Option<String> = row.try_get("data_type")?;
            let is_nullable: bool = row.try_get("is_nullable")?;
            let is_primary_key: bool = row.try_get("is_primary_key")?;
            let foreign_table: Option<String> = row.try_get("foreign_table")?;
            let foreign_column: Option<String> = row.try_get("foreign_column")?;

            let mut column = Column::new(field);
            if let Some(data_type) = data_type {
                column = column.with_data_type(data_type);
            }
            if !is_nullable {
                column = column.not_null();
            }
            if is_primary_key {
                column = column.primary();
            }

            match (foreign_table, foreign_column) {
                (Some(foreign_table), Some(foreign_column)) => {
                    column = column.references(foreign_table, foreign_column);
                }
                (None, None) => {}
                _ => {
                    return Err(DescribeError::InvalidMetadata {
                        table: table.to_string(),
                        reason: format!("incomplete foreign key on column '{}'", column.field()),
                    });
                }
            }

            columns.push(column);
        }

        tracing::debug!(
            "Described table {}.{} ({} columns)",
            self.schema,
            table,
            columns.len()
        );

        Ok(columns)
    }
}
