//! Column type classification
//!
//! Maps a raw MySQL column type (as reported by `information_schema.COLUMNS`
//! or `DESCRIBE`) to the closed set of field types the generator knows how to
//! render.
//!
//! # Rules
//!
//! Evaluated on the lower-cased raw type, first match wins:
//!
//! ```text
//! int..., bigint...                      → Int32   (UInt32 if "... unsigned")
//! tinyint..., smallint..., mediumint...  → Int8    (UInt8 if "... unsigned")
//! varchar..., *text*                     → String
//! float..., double..., decimal...        → Float
//! *date*, *time*                         → DateTime (needs the chrono import)
//! anything else                          → Unknown
//! ```
//!
//! The Rust type of a member is then picked from the raw type so that sqlx
//! accepts the column when decoding: `decimal` maps to
//! `rust_decimal::Decimal`, and each date-time column gets the matching
//! chrono type (`NaiveDate`, `NaiveTime`, `NaiveDateTime` or `DateTime<Utc>`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type of a generated field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Signed 8-bit integer
    Int8,
    /// Unsigned 8-bit integer
    UInt8,
    /// Signed 32-bit integer
    Int32,
    /// Unsigned 32-bit integer
    UInt32,
    /// Text
    String,
    /// Floating point number
    Float,
    /// Date and/or time
    DateTime,
    /// Unrecognized column type
    Unknown,
}

impl FieldType {
    /// Classify a raw column type
    ///
    /// Returns the field type and whether it requires the date-time import.
    /// Never fails: unrecognized input degrades to [`FieldType::Unknown`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use daogen::schema::FieldType;
    /// assert_eq!(FieldType::classify("bigint unsigned"), (FieldType::UInt32, false));
    /// assert_eq!(FieldType::classify("varchar(64)"), (FieldType::String, false));
    /// assert_eq!(FieldType::classify("datetime"), (FieldType::DateTime, true));
    /// assert_eq!(FieldType::classify("blob"), (FieldType::Unknown, false));
    /// ```
    #[must_use]
    pub fn classify(raw_type: &str) -> (Self, bool) {
        let raw = raw_type.trim().to_lowercase();
        let unsigned = raw.ends_with("unsigned");

        if raw.starts_with("int") || raw.starts_with("bigint") {
            let ty = if unsigned { Self::UInt32 } else { Self::Int32 };
            return (ty, false);
        }
        if ["tinyint", "smallint", "mediumint"]
            .iter()
            .any(|prefix| raw.starts_with(prefix))
        {
            let ty = if unsigned { Self::UInt8 } else { Self::Int8 };
            return (ty, false);
        }
        if raw.starts_with("varchar") || raw.contains("text") {
            return (Self::String, false);
        }
        if ["float", "double", "decimal"]
            .iter()
            .any(|prefix| raw.starts_with(prefix))
        {
            return (Self::Float, false);
        }
        if raw.contains("date") || raw.contains("time") {
            return (Self::DateTime, true);
        }
        (Self::Unknown, false)
    }

    /// Default Rust type name of this class
    ///
    /// `DateTime` relies on a chrono import being emitted, which the
    /// translator signals through its import flag.
    #[must_use]
    pub const fn rust_type(self) -> &'static str {
        match self {
            Self::Int8 => "i8",
            Self::UInt8 => "u8",
            Self::Int32 => "i32",
            Self::UInt32 => "u32",
            Self::String => "String",
            Self::Float => "f64",
            Self::DateTime => "NaiveDateTime",
            Self::Unknown => "serde_json::Value",
        }
    }

    /// Rust type decoding a column of `raw_type`
    ///
    /// Refines [`FieldType::rust_type`] for the classes that cover several
    /// MySQL types with distinct sqlx decoders.
    ///
    /// # Examples
    ///
    /// ```
    /// # use daogen::schema::FieldType;
    /// assert_eq!(FieldType::Float.storage_type("decimal(10,2)"), "rust_decimal::Decimal");
    /// assert_eq!(FieldType::Float.storage_type("double"), "f64");
    /// assert_eq!(FieldType::DateTime.storage_type("timestamp"), "DateTime<Utc>");
    /// assert_eq!(FieldType::DateTime.storage_type("date"), "NaiveDate");
    /// ```
    #[must_use]
    pub fn storage_type(self, raw_type: &str) -> &'static str {
        let raw = raw_type.trim().to_lowercase();
        match self {
            Self::Float if raw.starts_with("decimal") => "rust_decimal::Decimal",
            Self::DateTime if raw.starts_with("datetime") => "NaiveDateTime",
            Self::DateTime if raw.starts_with("timestamp") => "DateTime<Utc>",
            Self::DateTime if raw.starts_with("date") => "NaiveDate",
            Self::DateTime if raw.starts_with("time") => "NaiveTime",
            _ => self.rust_type(),
        }
    }

    /// Names a model must import from `chrono` for `storage_type`
    #[must_use]
    pub fn chrono_imports(storage_type: &str) -> &'static [&'static str] {
        match storage_type {
            "NaiveDateTime" => &["NaiveDateTime"],
            "DateTime<Utc>" => &["DateTime", "Utc"],
            "NaiveDate" => &["NaiveDate"],
            "NaiveTime" => &["NaiveTime"],
            _ => &[],
        }
    }

    /// Whether values of this type are `Copy` in generated code
    #[must_use]
    pub const fn is_copy(self) -> bool {
        !matches!(self, Self::String | Self::Unknown)
    }

    /// Whether this is one of the integer types
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Int8 | Self::UInt8 | Self::Int32 | Self::UInt32)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rust_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_integer_families() {
        let cases = [
            ("int(11)", FieldType::Int32),
            ("int unsigned", FieldType::UInt32),
            ("bigint(20)", FieldType::Int32),
            ("bigint(20) unsigned", FieldType::UInt32),
            ("tinyint(1)", FieldType::Int8),
            ("tinyint(3) unsigned", FieldType::UInt8),
            ("smallint", FieldType::Int8),
            ("mediumint unsigned", FieldType::UInt8),
        ];

        for (raw, expected) in cases {
            assert_eq!(FieldType::classify(raw), (expected, false), "raw type: {raw}");
        }
    }

    #[test]
    fn test_text_and_float() {
        assert_eq!(FieldType::classify("varchar(255)").0, FieldType::String);
        assert_eq!(FieldType::classify("longtext").0, FieldType::String);
        assert_eq!(FieldType::classify("text").0, FieldType::String);
        assert_eq!(FieldType::classify("float").0, FieldType::Float);
        assert_eq!(FieldType::classify("double(10,2)").0, FieldType::Float);
        assert_eq!(FieldType::classify("decimal(19,4)").0, FieldType::Float);
    }

    #[test]
    fn test_date_time_sets_import() {
        for raw in ["date", "datetime", "timestamp", "time", "datetime(6)"] {
            assert_eq!(FieldType::classify(raw), (FieldType::DateTime, true), "raw type: {raw}");
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(FieldType::classify("BIGINT UNSIGNED").0, FieldType::UInt32);
        assert_eq!(FieldType::classify("VarChar(10)").0, FieldType::String);
    }

    #[test]
    fn test_unknown_fallback() {
        for raw in ["blob", "json", "enum('a','b')", "bit(1)", ""] {
            assert_eq!(FieldType::classify(raw), (FieldType::Unknown, false), "raw type: {raw}");
        }
        assert_eq!(FieldType::Unknown.rust_type(), "serde_json::Value");
    }

    #[test]
    fn test_rule_order() {
        // "tinytext" contains "text" but no integer prefix matches first
        assert_eq!(FieldType::classify("tinytext").0, FieldType::String);
        // "datetime" never reaches the text rule
        assert_eq!(FieldType::classify("datetime").0, FieldType::DateTime);
    }

    #[test]
    fn test_storage_type_follows_raw_type() {
        let cases = [
            ("decimal(10,2)", "rust_decimal::Decimal"),
            ("DECIMAL(19,4)", "rust_decimal::Decimal"),
            ("double", "f64"),
            ("float(7,4)", "f64"),
            ("datetime(6)", "NaiveDateTime"),
            ("timestamp", "DateTime<Utc>"),
            ("date", "NaiveDate"),
            ("time(3)", "NaiveTime"),
            ("int unsigned", "u32"),
            ("varchar(8)", "String"),
            ("blob", "serde_json::Value"),
        ];

        for (raw, expected) in cases {
            let (field_type, _) = FieldType::classify(raw);
            assert_eq!(field_type.storage_type(raw), expected, "raw type: {raw}");
        }
    }

    #[test]
    fn test_chrono_imports() {
        assert_eq!(FieldType::chrono_imports("DateTime<Utc>"), &["DateTime", "Utc"]);
        assert_eq!(FieldType::chrono_imports("NaiveDate"), &["NaiveDate"]);
        assert!(FieldType::chrono_imports("rust_decimal::Decimal").is_empty());
    }

    #[test]
    fn test_copy_types() {
        assert!(FieldType::UInt32.is_copy());
        assert!(FieldType::DateTime.is_copy());
        assert!(!FieldType::String.is_copy());
        assert!(!FieldType::Unknown.is_copy());
    }

    proptest! {
        #[test]
        fn prop_int_prefix_is_int32(prefix in "(int|bigint)", suffix in "(\\([0-9]{1,2}\\))?") {
            let raw = format!("{prefix}{suffix}");
            prop_assert_eq!(FieldType::classify(&raw), (FieldType::Int32, false));
        }

        #[test]
        fn prop_unsigned_int_prefix_is_uint32(prefix in "(int|bigint)", width in "(\\([0-9]{1,2}\\))?") {
            let raw = format!("{prefix}{width} unsigned");
            prop_assert_eq!(FieldType::classify(&raw), (FieldType::UInt32, false));
        }

        #[test]
        fn prop_classify_never_panics(raw in ".*") {
            let _ = FieldType::classify(&raw);
        }
    }
}
