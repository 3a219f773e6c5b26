//! Table schema inspection and translation
//!
//! - [`FieldType`]: classification of raw column types
//! - [`translate`]: column descriptions to generated fields
//! - [`SchemaSource`]: where column descriptions come from

pub mod column;
pub mod connection;
pub mod field_type;
pub mod source;
pub mod translator;

pub use column::{describe_as_json, RawColumn, PRIMARY_KEY};
pub use connection::ConnectionSettings;
pub use field_type::FieldType;
pub use source::{split_qualified_name, MySqlSchemaSource, SchemaSource, StaticSchemaSource};
pub use translator::{translate, Field, SerializationTag};

#[cfg(test)]
pub use source::MockSchemaSource;
