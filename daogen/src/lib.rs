//! # daogen
//!
//! Generates Rust model, DAO and repository sources from the schema of one
//! MySQL table. Generated code targets `sqlx`, `serde`, `chrono` and
//! `async-trait`.
//!
//! ## Pipeline
//!
//! 1. A [`schema::SchemaSource`] describes the table's columns
//! 2. [`schema::translate`] maps each column to a typed [`schema::Field`]
//! 3. A [`codegen::ModelSpec`] collects names, directories and module paths
//! 4. [`codegen::CodeRenderer`] prints the sources from a syntax tree
//! 5. [`emit::Emitter`] writes them, honoring the overwrite policy
//!
//! ## Example
//!
//! ```rust,no_run
//! use daogen::config::GeneratorConfig;
//! use daogen::emit::LocalFileSystem;
//! use daogen::schema::{RawColumn, StaticSchemaSource};
//! use daogen::Generator;
//! use std::path::Path;
//!
//! # async fn example() -> daogen::Result<()> {
//! let source = StaticSchemaSource::new().with_table(
//!     "user",
//!     vec![
//!         RawColumn::new("id", "bigint unsigned").primary(),
//!         RawColumn::new("user_name", "varchar(64)"),
//!     ],
//! );
//! let config = GeneratorConfig {
//!     table: "user".to_string(),
//!     connection: "mysql://localhost/app".to_string(),
//!     model_directory: "src/models".to_string(),
//!     dao: "src/dao".to_string(),
//!     ..GeneratorConfig::default()
//! };
//!
//! let generator = Generator::new(config, Path::new("."))?;
//! generator.generate(&source, LocalFileSystem::new(".")).await?;
//! # Ok(())
//! # }
//! ```

pub mod codegen;
pub mod config;
pub mod emit;
pub mod error;
pub mod generator;
pub mod observability;
pub mod schema;

pub use error::{GenError, Result};
pub use generator::{run, GenerationReport, Generator};
