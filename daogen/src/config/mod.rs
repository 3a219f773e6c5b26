//! Generator configuration
//!
//! Options come from four layers, highest priority first:
//!
//! 1. Command-line flags ([`ConfigOverrides`])
//! 2. Environment variables prefixed with `DAOGEN_`
//! 3. A YAML config file (`--config`, or `.yml` in the working directory)
//! 4. Defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use daogen::config::{ConfigOverrides, GeneratorConfig};
//! use std::path::Path;
//!
//! # fn example() -> daogen::Result<()> {
//! let overrides = ConfigOverrides {
//!     table: Some("user".to_string()),
//!     ..ConfigOverrides::default()
//! };
//! let config = GeneratorConfig::load(None, Path::new("."), &overrides)?;
//! assert_eq!(config.model_name(), "User");
//! # Ok(())
//! # }
//! ```

use crate::error::{GenError, Result};
use crate::schema::split_qualified_name;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use inflector::Inflector;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = ".yml";

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "DAOGEN_";

/// Keys accepted in the config file
pub const KNOWN_KEYS: &[&str] = &[
    "model_file",
    "model_directory",
    "model_name",
    "connection",
    "table",
    "dao",
    "repo",
    "conn",
    "module_root",
    "force",
];

/// Resolved generator options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Base name of the generated files (default: snake-cased table name)
    pub model_file: String,
    /// Model output directory; empty skips the model file
    pub model_directory: String,
    /// Generated type name (default: `PascalCase` table name)
    pub model_name: String,
    /// MySQL connection URL
    pub connection: String,
    /// Source table, optionally `schema.table`
    pub table: String,
    /// DAO output directory; empty skips the DAO
    pub dao: String,
    /// Repository output directory; empty skips the repository
    pub repo: String,
    /// Connection utility directory (default: DAO directory)
    pub conn: String,
    /// Root of generated `use` paths (default: working directory name)
    pub module_root: String,
    /// Overwrite existing model, DAO and repository files
    pub force: bool,
}

/// Command-line values layered over file and environment configuration
///
/// Unset options are left out of the merge so lower layers show through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigOverrides {
    /// `--model-file`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_file: Option<String>,
    /// `--model-directory`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_directory: Option<String>,
    /// `--model-name`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    /// `--connection`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    /// `--table`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// `--dao`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dao: Option<String>,
    /// `--repo`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    /// `--conn`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conn: Option<String>,
    /// `--module-root`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_root: Option<String>,
    /// `-f`; only a set flag overrides lower layers
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub force: bool,
}

impl GeneratorConfig {
    /// Load configuration from all layers
    ///
    /// Unknown keys in the config file are reported as warnings and
    /// otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Config`] if:
    /// - `explicit` is given but does not exist
    /// - The config file is not valid YAML
    /// - A value has the wrong type
    pub fn load(
        explicit: Option<&Path>,
        working_dir: &Path,
        overrides: &ConfigOverrides,
    ) -> Result<Self> {
        let config_path = resolve_config_path(explicit, working_dir)?;

        let mut figment = Figment::new();
        if let Some(path) = &config_path {
            debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Yaml::file(path));
        }
        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides))
            .extract()
            .map_err(|e| GenError::Config(e.to_string()))?;

        if let Some(path) = &config_path {
            if let Err(e) = check_unknown_keys(path) {
                warn!(path = %path.display(), "{e}");
            }
        }

        Ok(config)
    }

    /// Table name without surrounding whitespace
    #[must_use]
    pub fn table_name(&self) -> &str {
        self.table.trim()
    }

    /// Table name without its schema qualifier
    #[must_use]
    pub fn unqualified_table_name(&self) -> &str {
        split_qualified_name(self.table_name()).1
    }

    /// Base name of the generated files
    #[must_use]
    pub fn file_name(&self) -> String {
        let file = self.model_file.trim();
        if file.is_empty() {
            self.unqualified_table_name().to_snake_case()
        } else {
            file.to_string()
        }
    }

    /// Name of the generated model type
    #[must_use]
    pub fn model_name(&self) -> String {
        let name = self.model_name.trim();
        if name.is_empty() {
            self.unqualified_table_name().to_pascal_case()
        } else {
            name.to_string()
        }
    }

    /// Directory receiving the connection utility
    #[must_use]
    pub fn conn_directory(&self) -> &str {
        if self.conn.trim().is_empty() {
            &self.dao
        } else {
            &self.conn
        }
    }

    /// Check required options
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Validation`] if the connection or table is
    /// missing, or the model name is not a valid Rust type name.
    pub fn validate(&self) -> Result<()> {
        if self.connection.trim().is_empty() {
            return Err(GenError::Validation(
                "a connection string is required (--connection)".to_string(),
            ));
        }
        if self.unqualified_table_name().is_empty() {
            return Err(GenError::Validation(
                "a table name is required (--table)".to_string(),
            ));
        }

        let model_name = self.model_name();
        let starts_with_letter = model_name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic());
        if !starts_with_letter || !model_name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(GenError::Validation(format!(
                "'{model_name}' is not a valid model name"
            )));
        }

        let file_name = self.file_name();
        if file_name.contains(['/', '\\']) {
            return Err(GenError::Validation(format!(
                "model file '{file_name}' must not contain a path separator"
            )));
        }

        Ok(())
    }
}

/// Locate the config file to load
///
/// # Errors
///
/// Returns [`GenError::Config`] if an explicit path does not exist.
pub fn resolve_config_path(explicit: Option<&Path>, working_dir: &Path) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            working_dir.join(path)
        };
        if !path.is_file() {
            return Err(GenError::Config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        return Ok(Some(path));
    }

    let default = working_dir.join(DEFAULT_CONFIG_FILE);
    Ok(default.is_file().then_some(default))
}

/// Report config file keys the generator does not understand
///
/// # Errors
///
/// Returns [`GenError::Parse`] listing the unknown keys, or
/// [`GenError::Config`] if the file cannot be parsed.
pub fn check_unknown_keys(path: &Path) -> Result<()> {
    let keys: BTreeMap<String, IgnoredAny> = Figment::from(Yaml::file(path))
        .extract()
        .map_err(|e| GenError::Config(e.to_string()))?;

    let unknown: Vec<&str> = keys
        .keys()
        .map(String::as_str)
        .filter(|key| !KNOWN_KEYS.contains(key))
        .collect();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(GenError::Parse(format!("unknown keys: {}", unknown.join(", "))))
    }
}
