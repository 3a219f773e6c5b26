//! Raw column descriptions as reported by the database

use serde::{Deserialize, Serialize};

/// Key role reported for a primary-key column
pub const PRIMARY_KEY: &str = "PRI";

/// One column of a described table
///
/// Mirrors a row of MySQL's `DESCRIBE <table>` output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawColumn {
    /// Column name (`Field`)
    pub field: String,
    /// Raw column type, e.g. `bigint(20) unsigned` (`Type`)
    #[serde(rename = "type")]
    pub raw_type: String,
    /// Whether the column accepts `NULL` (`Null = YES`)
    pub nullable: bool,
    /// Key role: `PRI`, `UNI`, `MUL` or empty (`Key`)
    pub key: String,
    /// Default value (`Default`)
    pub default: Option<String>,
    /// Extra metadata such as `auto_increment` (`Extra`)
    pub extra: String,
}

impl RawColumn {
    /// Create a column with a name and raw type, everything else empty
    pub fn new(field: impl Into<String>, raw_type: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            raw_type: raw_type.into(),
            ..Self::default()
        }
    }

    /// Mark the column as the primary key
    #[must_use]
    pub fn primary(mut self) -> Self {
        self.key = PRIMARY_KEY.to_string();
        self
    }

    /// Mark the column as nullable
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Set the extra metadata
    #[must_use]
    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }

    /// Whether the column is the table's primary key
    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        self.key == PRIMARY_KEY
    }

    /// Whether the database generates the value on insert
    #[must_use]
    pub fn is_auto_increment(&self) -> bool {
        self.extra.to_lowercase().contains("auto_increment")
    }
}

/// Render a column list the way `DESCRIBE` output is dumped for inspection
#[must_use]
pub fn describe_as_json(columns: &[RawColumn]) -> String {
    serde_json::to_string_pretty(columns).unwrap_or_default()
}
