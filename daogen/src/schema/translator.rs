//! Translation of raw column descriptions into generated fields

use super::column::RawColumn;
use super::field_type::FieldType;
use crate::codegen::helpers::TemplateHelpers;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Serialization tag attached to a generated member
///
/// Carries the original column name for both the JSON key and the storage
/// column mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerializationTag {
    /// Key used by `serde`
    pub json_key: String,
    /// Column used by `sqlx`
    pub column: String,
}

impl SerializationTag {
    /// Tag mapping both JSON and storage to `column`
    pub fn for_column(column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            json_key: column.clone(),
            column,
        }
    }

    /// Attributes rendered above the member
    #[must_use]
    pub fn attributes(&self) -> Vec<String> {
        vec![
            format!("#[serde(rename = \"{}\")]", self.json_key),
            format!("#[sqlx(rename = \"{}\")]", self.column),
        ]
    }
}

impl fmt::Display for SerializationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.attributes().join(" "))
    }
}

/// A field of the generated model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Attribute name, e.g. `UserName`
    pub attr: String,
    /// Semantic type
    pub field_type: FieldType,
    /// Column type as reported by the database
    pub raw_type: String,
    /// Serialization tag
    pub tag: SerializationTag,
    /// Original column name
    pub column_name: String,
    /// Whether this is the primary key
    pub is_primary: bool,
    /// Whether the column accepts `NULL`
    pub nullable: bool,
    /// Whether the database assigns the value on insert
    pub auto_increment: bool,
}

impl Field {
    /// Build a field from one column description
    #[must_use]
    pub fn from_column(column: &RawColumn) -> (Self, bool) {
        let (field_type, needs_datetime) = FieldType::classify(&column.raw_type);
        let field = Self {
            attr: TemplateHelpers::to_attr_name(&column.field),
            field_type,
            raw_type: column.raw_type.clone(),
            tag: SerializationTag::for_column(&column.field),
            column_name: column.field.clone(),
            is_primary: column.is_primary_key(),
            nullable: column.nullable,
            auto_increment: column.is_auto_increment(),
        };
        (field, needs_datetime)
    }

    /// Member identifier in generated Rust code
    #[must_use]
    pub fn ident(&self) -> String {
        TemplateHelpers::to_rust_ident(&self.attr)
    }

    /// Rust type decoding the column, without the `Option` wrapper
    #[must_use]
    pub fn storage_type(&self) -> &'static str {
        self.field_type.storage_type(&self.raw_type)
    }

    /// Rust type of the member, `Option<T>` for nullable columns
    #[must_use]
    pub fn rust_type(&self) -> String {
        let base = self.storage_type();
        if self.nullable {
            format!("Option<{base}>")
        } else {
            base.to_string()
        }
    }
}

/// Translate the described columns of one table
///
/// Output order always equals input order. The returned flag is true when at
/// least one field needs the date-time import.
#[must_use]
pub fn translate(columns: &[RawColumn]) -> (Vec<Field>, bool) {
    let mut needs_datetime_import = false;
    let fields = columns
        .iter()
        .map(|column| {
            let (field, needs_datetime) = Field::from_column(column);
            debug!(
                column = %column.field,
                raw_type = %column.raw_type,
                field_type = ?field.field_type,
                primary = field.is_primary,
                "translated column"
            );
            needs_datetime_import |= needs_datetime;
            field
        })
        .collect();
    (fields, needs_datetime_import)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_varchar_column() {
        let column = RawColumn::new("user_name", "varchar(64)");
        let (fields, time) = translate(&[column]);

        assert!(!time);
        assert_eq!(fields.len(), 1);
        let field = &fields[0];
        assert_eq!(field.attr, "UserName");
        assert_eq!(field.field_type, FieldType::String);
        assert_eq!(field.column_name, "user_name");
        assert!(!field.is_primary);
        assert_eq!(field.ident(), "user_name");
        assert_eq!(field.rust_type(), "String");
    }

    #[test]
    fn test_primary_unsigned_bigint() {
        let column = RawColumn::new("id", "bigint unsigned")
            .primary()
            .with_extra("auto_increment");
        let (fields, _) = translate(&[column]);

        let field = &fields[0];
        assert_eq!(field.attr, "Id");
        assert_eq!(field.field_type, FieldType::UInt32);
        assert!(field.is_primary);
        assert!(field.auto_increment);
    }

    #[test]
    fn test_datetime_import_flag() {
        let columns = vec![
            RawColumn::new("id", "int").primary(),
            RawColumn::new("created_at", "datetime").nullable(),
        ];
        let (fields, time) = translate(&columns);

        assert!(time);
        assert_eq!(fields[1].field_type, FieldType::DateTime);
        assert_eq!(fields[1].rust_type(), "Option<NaiveDateTime>");
    }

    #[test]
    fn test_member_type_follows_raw_type() {
        let columns = vec![
            RawColumn::new("price", "decimal(10,2)"),
            RawColumn::new("ratio", "double").nullable(),
            RawColumn::new("created_at", "timestamp"),
            RawColumn::new("birthday", "date").nullable(),
            RawColumn::new("opens_at", "time"),
        ];
        let (fields, time) = translate(&columns);

        assert!(time);
        let types: Vec<String> = fields.iter().map(Field::rust_type).collect();
        assert_eq!(
            types,
            vec![
                "rust_decimal::Decimal",
                "Option<f64>",
                "DateTime<Utc>",
                "Option<NaiveDate>",
                "NaiveTime",
            ]
        );
        assert_eq!(fields[0].field_type, FieldType::Float);
        assert_eq!(fields[2].field_type, FieldType::DateTime);
    }

    #[test]
    fn test_tag_carries_column_name() {
        let (fields, _) = translate(&[RawColumn::new("userName", "varchar(10)")]);
        let field = &fields[0];
        assert_eq!(field.attr, "UserName");
        assert_eq!(field.ident(), "user_name");
        assert_eq!(
            field.tag.attributes(),
            vec![
                "#[serde(rename = \"userName\")]".to_string(),
                "#[sqlx(rename = \"userName\")]".to_string(),
            ]
        );
        assert_eq!(
            field.tag.to_string(),
            "#[serde(rename = \"userName\")] #[sqlx(rename = \"userName\")]"
        );
    }

    #[test]
    fn test_empty_input() {
        let (fields, time) = translate(&[]);
        assert!(fields.is_empty());
        assert!(!time);
    }

    proptest! {
        #[test]
        fn prop_order_is_preserved(names in proptest::collection::vec("[a-z][a-z0-9_]{0,12}", 0..24)) {
            let columns: Vec<RawColumn> = names
                .iter()
                .map(|name| RawColumn::new(name.clone(), "varchar(32)"))
                .collect();
            let (fields, _) = translate(&columns);
            let translated: Vec<&str> = fields.iter().map(|f| f.column_name.as_str()).collect();
            let original: Vec<&str> = names.iter().map(String::as_str).collect();
            prop_assert_eq!(translated, original);
        }
    }
}
