//! Per-invocation description of the model to generate

use super::helpers::TemplateHelpers;
use super::paths::ModulePathResolver;
use crate::config::GeneratorConfig;
use crate::error::{GenError, Result};
use crate::schema::{Field, FieldType};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Primary key name used when the table declares none
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Output directories; an empty string skips that artifact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputDirectories {
    /// Model directory
    pub model: String,
    /// DAO directory
    pub dao: String,
    /// Repository directory
    pub repo: String,
    /// Connection utility directory
    pub conn: String,
}

/// Module paths of the generated artifacts' parent modules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModulePaths {
    /// Module holding the model file
    pub model: String,
    /// Module holding the DAO file
    pub dao: String,
    /// Module holding the repository file
    pub repo: String,
    /// Module holding `conn.rs`
    pub conn: String,
}

/// Everything the renderer needs to know about one model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSpec {
    /// Source table, possibly schema-qualified; empty when unknown
    pub table_name: String,
    /// Generated type name
    pub model_name: String,
    /// Base name of the generated files
    pub file_name: String,
    /// Fields in column order
    pub fields: Vec<Field>,
    /// Whether the model needs a chrono import
    pub needs_datetime_import: bool,
    /// Overwrite existing files
    pub force: bool,
    /// Output directories
    pub directories: OutputDirectories,
    /// Root of generated `use` paths
    pub module_root: String,
    /// Resolved module paths
    pub modules: ModulePaths,
}

impl ModelSpec {
    /// Build the spec for a translated table
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Validation`] if two columns map to the same member
    /// identifier, e.g. `user_name` and `userName`.
    pub fn new(
        config: &GeneratorConfig,
        fields: Vec<Field>,
        needs_datetime_import: bool,
        resolver: &ModulePathResolver,
    ) -> Result<Self> {
        check_member_collisions(&fields)?;

        let directories = OutputDirectories {
            model: config.model_directory.trim().to_string(),
            dao: config.dao.trim().to_string(),
            repo: config.repo.trim().to_string(),
            conn: config.conn_directory().trim().to_string(),
        };
        let modules = ModulePaths {
            model: resolver.module_path(&directories.model),
            dao: resolver.module_path(&directories.dao),
            repo: resolver.module_path(&directories.repo),
            conn: resolver.module_path(&directories.conn),
        };

        Ok(Self {
            table_name: config.table_name().to_string(),
            model_name: config.model_name(),
            file_name: config.file_name(),
            fields,
            needs_datetime_import,
            force: config.force,
            directories,
            module_root: resolver.root().to_string(),
            modules,
        })
    }

    /// The primary-key field, if the table declares one
    #[must_use]
    pub fn primary_key_field(&self) -> Option<&Field> {
        self.fields.iter().find(|field| field.is_primary)
    }

    /// Column name of the primary key, `"id"` when none is declared
    #[must_use]
    pub fn primary_key(&self) -> &str {
        self.primary_key_field()
            .map_or(DEFAULT_PRIMARY_KEY, |field| field.column_name.as_str())
    }

    /// Type of the primary key, [`FieldType::Unknown`] when none is declared
    #[must_use]
    pub fn primary_key_type(&self) -> FieldType {
        self.primary_key_field()
            .map_or(FieldType::Unknown, |field| field.field_type)
    }

    /// Name of the DAO type
    #[must_use]
    pub fn dao_name(&self) -> String {
        TemplateHelpers::to_dao_name(&self.model_name)
    }

    /// Name of the repository trait
    #[must_use]
    pub fn repository_name(&self) -> String {
        TemplateHelpers::to_repository_name(&self.model_name)
    }

    /// Name of the model module
    #[must_use]
    pub fn model_package(&self) -> String {
        ModulePathResolver::module_name(&self.directories.model, "models")
    }

    /// Name of the DAO module
    #[must_use]
    pub fn dao_package(&self) -> String {
        ModulePathResolver::module_name(&self.directories.dao, "dao")
    }

    /// Name of the repository module
    #[must_use]
    pub fn repo_package(&self) -> String {
        ModulePathResolver::module_name(&self.directories.repo, "repo")
    }

    /// Table used in generated SQL
    ///
    /// Falls back to the snake-cased model name when no table is set.
    #[must_use]
    pub fn sql_table_name(&self) -> String {
        if self.table_name.is_empty() {
            TemplateHelpers::to_snake_case(&self.model_name)
        } else {
            self.table_name.clone()
        }
    }

    /// Whether a DAO is generated
    #[must_use]
    pub fn has_dao(&self) -> bool {
        !self.directories.dao.is_empty()
    }

    /// Sorted, de-duplicated names the model imports from `chrono`
    #[must_use]
    pub fn chrono_imports(&self) -> Vec<&'static str> {
        if !self.needs_datetime_import {
            return Vec::new();
        }
        self.fields
            .iter()
            .flat_map(|field| FieldType::chrono_imports(field.storage_type()).iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn check_member_collisions(fields: &[Field]) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for field in fields {
        if let Some(previous) = seen.insert(field.ident(), &field.column_name) {
            return Err(GenError::Validation(format!(
                "columns `{previous}` and `{}` both map to member `{}`",
                field.column_name,
                field.ident()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{translate, RawColumn};

    fn spec_for(columns: &[RawColumn], config: &GeneratorConfig) -> ModelSpec {
        let (fields, time) = translate(columns);
        ModelSpec::new(config, fields, time, &ModulePathResolver::new("shop")).unwrap()
    }

    fn base_config() -> GeneratorConfig {
        GeneratorConfig {
            table: "user".to_string(),
            connection: "mysql://localhost/shop".to_string(),
            model_directory: "src/models".to_string(),
            dao: "src/dao".to_string(),
            repo: "src/repo".to_string(),
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn test_primary_key_from_column() {
        let spec = spec_for(
            &[
                RawColumn::new("user_id", "bigint unsigned").primary(),
                RawColumn::new("user_name", "varchar(64)"),
            ],
            &base_config(),
        );
        assert_eq!(spec.primary_key(), "user_id");
        assert_eq!(spec.primary_key_type(), FieldType::UInt32);
    }

    #[test]
    fn test_primary_key_defaults() {
        let spec = spec_for(&[RawColumn::new("user_name", "varchar(64)")], &base_config());
        assert!(spec.primary_key_field().is_none());
        assert_eq!(spec.primary_key(), "id");
        assert_eq!(spec.primary_key_type(), FieldType::Unknown);
    }

    #[test]
    fn test_names_and_modules() {
        let spec = spec_for(&[RawColumn::new("id", "int").primary()], &base_config());
        assert_eq!(spec.model_name, "User");
        assert_eq!(spec.dao_name(), "UserDao");
        assert_eq!(spec.repository_name(), "UserRepository");
        assert_eq!(spec.modules.model, "shop::models");
        assert_eq!(spec.modules.dao, "shop::dao");
        assert_eq!(spec.modules.conn, "shop::dao");
        assert_eq!(spec.model_package(), "models");
        assert_eq!(spec.dao_package(), "dao");
        assert_eq!(spec.repo_package(), "repo");
        assert!(spec.has_dao());
    }

    #[test]
    fn test_package_defaults_for_empty_directories() {
        let config = GeneratorConfig {
            model_directory: String::new(),
            dao: String::new(),
            repo: String::new(),
            ..base_config()
        };
        let spec = spec_for(&[RawColumn::new("id", "int").primary()], &config);
        assert_eq!(spec.model_package(), "models");
        assert_eq!(spec.dao_package(), "dao");
        assert_eq!(spec.repo_package(), "repo");
        assert_eq!(spec.modules.model, "shop");
        assert!(!spec.has_dao());
    }

    #[test]
    fn test_sql_table_name_fallback() {
        let mut spec = spec_for(&[RawColumn::new("id", "int").primary()], &base_config());
        assert_eq!(spec.sql_table_name(), "user");
        spec.table_name = String::new();
        spec.model_name = "OrderItem".to_string();
        assert_eq!(spec.sql_table_name(), "order_item");
    }

    #[test]
    fn test_member_collision_is_rejected() {
        let (fields, time) = translate(&[
            RawColumn::new("id", "int").primary(),
            RawColumn::new("user_name", "varchar(64)"),
            RawColumn::new("userName", "varchar(64)"),
        ]);
        let err = ModelSpec::new(&base_config(), fields, time, &ModulePathResolver::new("shop"))
            .unwrap_err();

        assert!(matches!(err, GenError::Validation(_)));
        let message = err.to_string();
        assert!(message.contains("`user_name` and `userName`"), "{message}");
    }

    #[test]
    fn test_case_only_collision_is_rejected() {
        let (fields, time) = translate(&[RawColumn::new("id", "int"), RawColumn::new("Id", "int")]);
        let result = ModelSpec::new(&base_config(), fields, time, &ModulePathResolver::new("shop"));
        assert!(matches!(result, Err(GenError::Validation(_))));
    }

    #[test]
    fn test_chrono_imports_are_merged() {
        let spec = spec_for(
            &[
                RawColumn::new("id", "int").primary(),
                RawColumn::new("created_at", "timestamp"),
                RawColumn::new("updated_at", "timestamp").nullable(),
                RawColumn::new("birthday", "date"),
            ],
            &base_config(),
        );
        assert_eq!(spec.chrono_imports(), vec!["DateTime", "NaiveDate", "Utc"]);

        let plain = spec_for(&[RawColumn::new("id", "int").primary()], &base_config());
        assert!(plain.chrono_imports().is_empty());
    }
}
