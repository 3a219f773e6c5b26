//! Source generation
//!
//! - [`ModelSpec`]: what to generate for one table
//! - [`ModulePathResolver`]: directories to `use` paths
//! - [`ast`]: the syntax tree generated files are printed from
//! - [`CodeRenderer`]: model, DAO, repository and connection sources

pub mod ast;
pub mod helpers;
pub mod model_spec;
pub mod paths;
pub mod renderer;
pub mod templates;

pub use helpers::TemplateHelpers;
pub use model_spec::{ModelSpec, ModulePaths, OutputDirectories, DEFAULT_PRIMARY_KEY};
pub use paths::ModulePathResolver;
pub use renderer::{render, ArtifactKind, CodeRenderer, GeneratedFile, CONN_FILE_NAME};
