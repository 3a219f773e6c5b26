//! Schema sources
//!
//! The generator never talks to a database directly. It asks a
//! [`SchemaSource`] for the ordered column descriptions of one table.

use super::column::RawColumn;
use super::connection::ConnectionSettings;
use crate::error::{GenError, Result};
use async_trait::async_trait;
use sqlx::MySqlPool;
use std::collections::HashMap;
use tracing::debug;

/// Column query against `information_schema`
///
/// Every column is cast to `CHAR` so that servers reporting `BLOB`/`BINARY`
/// metadata still decode into strings.
const DESCRIBE_COLUMNS_SQL: &str = "\
SELECT CAST(COLUMN_NAME AS CHAR), CAST(COLUMN_TYPE AS CHAR), CAST(IS_NULLABLE AS CHAR), \
CAST(COLUMN_KEY AS CHAR), CAST(COLUMN_DEFAULT AS CHAR), CAST(EXTRA AS CHAR) \
FROM information_schema.COLUMNS \
WHERE TABLE_SCHEMA = COALESCE(?, DATABASE()) AND TABLE_NAME = ? \
ORDER BY ORDINAL_POSITION";

type ColumnRow = (String, String, String, String, Option<String>, String);

/// Provider of table column descriptions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Describe the columns of `table` in definition order
    ///
    /// # Errors
    ///
    /// Returns [`GenError::TableNotFound`] when the table has no columns and
    /// [`GenError::Connection`] or [`GenError::Query`] when the lookup fails.
    async fn describe_columns(&self, table: &str) -> Result<Vec<RawColumn>>;
}

/// Split `schema.table` into its parts
///
/// # Examples
///
/// ```
/// # use daogen::schema::split_qualified_name;
/// assert_eq!(split_qualified_name("shop.user"), (Some("shop"), "user"));
/// assert_eq!(split_qualified_name("user"), (None, "user"));
/// ```
#[must_use]
pub fn split_qualified_name(table: &str) -> (Option<&str>, &str) {
    match table.split_once('.') {
        Some((schema, name)) if !schema.is_empty() => (Some(schema), name),
        Some((_, name)) => (None, name),
        None => (None, table),
    }
}

/// Schema source backed by a MySQL pool
#[derive(Debug, Clone)]
pub struct MySqlSchemaSource {
    pool: MySqlPool,
}

impl MySqlSchemaSource {
    /// Connect to the database at `dsn`
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Connection`] if the pool cannot be established.
    pub async fn connect(dsn: &str, settings: &ConnectionSettings) -> Result<Self> {
        let pool = settings
            .pool_options()
            .connect(dsn)
            .await
            .map_err(GenError::Connection)?;
        Ok(Self { pool })
    }

    /// Close the underlying pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl SchemaSource for MySqlSchemaSource {
    async fn describe_columns(&self, table: &str) -> Result<Vec<RawColumn>> {
        let (schema, name) = split_qualified_name(table);
        debug!(schema = ?schema, table = %name, "describing table");

        let rows: Vec<ColumnRow> = sqlx::query_as(DESCRIBE_COLUMNS_SQL)
            .bind(schema)
            .bind(name)
            .fetch_all(&self.pool)
            .await
            .map_err(classify_sqlx_error)?;

        if rows.is_empty() {
            return Err(GenError::TableNotFound(table.to_string()));
        }

        Ok(rows.into_iter().map(column_from_row).collect())
    }
}

fn column_from_row((field, raw_type, nullable, key, default, extra): ColumnRow) -> RawColumn {
    RawColumn {
        field,
        raw_type,
        nullable: nullable.eq_ignore_ascii_case("YES"),
        key,
        default,
        extra,
    }
}

/// Separate lost connections from failing statements
fn classify_sqlx_error(err: sqlx::Error) -> GenError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => GenError::Connection(err),
        other => GenError::Query(other),
    }
}

/// In-memory schema source
///
/// Serves fixed column lists; used for offline generation and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSchemaSource {
    tables: HashMap<String, Vec<RawColumn>>,
}

impl StaticSchemaSource {
    /// Create an empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the columns of a table
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>, columns: Vec<RawColumn>) -> Self {
        self.tables.insert(table.into(), columns);
        self
    }
}

#[async_trait]
impl SchemaSource for StaticSchemaSource {
    async fn describe_columns(&self, table: &str) -> Result<Vec<RawColumn>> {
        let columns = self
            .tables
            .get(table)
            .or_else(|| self.tables.get(split_qualified_name(table).1))
            .filter(|columns| !columns.is_empty())
            .ok_or_else(|| GenError::TableNotFound(table.to_string()))?;
        Ok(columns.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_columns() -> Vec<RawColumn> {
        vec![
            RawColumn::new("id", "bigint unsigned")
                .primary()
                .with_extra("auto_increment"),
            RawColumn::new("user_name", "varchar(64)"),
        ]
    }

    #[test]
    fn test_split_qualified_name() {
        assert_eq!(split_qualified_name("shop.user"), (Some("shop"), "user"));
        assert_eq!(split_qualified_name("user"), (None, "user"));
        assert_eq!(split_qualified_name(".user"), (None, "user"));
    }

    #[test]
    fn test_column_from_row() {
        let column = column_from_row((
            "created_at".to_string(),
            "datetime".to_string(),
            "YES".to_string(),
            String::new(),
            None,
            String::new(),
        ));
        assert!(column.nullable);
        assert!(!column.is_primary_key());
        assert_eq!(column.raw_type, "datetime");
    }

    #[test]
    fn test_classify_sqlx_error() {
        assert!(matches!(
            classify_sqlx_error(sqlx::Error::PoolTimedOut),
            GenError::Connection(_)
        ));
        assert!(matches!(
            classify_sqlx_error(sqlx::Error::RowNotFound),
            GenError::Query(_)
        ));
    }

    #[tokio::test]
    async fn test_static_source_returns_columns_in_order() {
        let source = StaticSchemaSource::new().with_table("user", user_columns());
        let columns = source.describe_columns("user").await.unwrap();
        let names: Vec<_> = columns.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(names, vec!["id", "user_name"]);
    }

    #[tokio::test]
    async fn test_static_source_accepts_qualified_name() {
        let source = StaticSchemaSource::new().with_table("user", user_columns());
        assert_eq!(source.describe_columns("shop.user").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_static_source_missing_table() {
        let source = StaticSchemaSource::new().with_table("empty", Vec::new());
        assert!(matches!(
            source.describe_columns("missing").await,
            Err(GenError::TableNotFound(t)) if t == "missing"
        ));
        assert!(matches!(
            source.describe_columns("empty").await,
            Err(GenError::TableNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_source() {
        let mut mock = MockSchemaSource::new();
        mock.expect_describe_columns()
            .withf(|table: &str| table == "user")
            .times(1)
            .returning(|_| Ok(vec![RawColumn::new("id", "int").primary()]));

        let columns = mock.describe_columns("user").await.unwrap();
        assert_eq!(columns.len(), 1);
        assert!(columns[0].is_primary_key());
    }
}
