//! Model, DAO and repository rendering
//!
//! Each artifact is built as a [`SourceFile`] tree from the [`ModelSpec`]
//! and printed; the connection utility comes from a fixed template.

use super::ast::{
    ConstDecl, FunctionDecl, ImplBlock, Item, Param, SourceFile, Stmt, StructDecl, StructField,
    TraitDecl,
};
use super::model_spec::ModelSpec;
use super::paths::join_path;
use super::templates::render_connection;
use crate::error::Result;
use crate::schema::{ConnectionSettings, Field, FieldType};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Header comment of rendered model, DAO and repository files
pub const GENERATED_HEADER: &str =
    "Generated by daogen. Regenerating with -f replaces local changes.";

/// File name of the connection utility
pub const CONN_FILE_NAME: &str = "conn.rs";

const UPDATES_TYPE: &str = "&HashMap<String, serde_json::Value>";
const SQLX_ERROR: &str = "sqlx::Error";

/// Kind of generated artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArtifactKind {
    /// Model struct
    Model,
    /// Data access object
    Dao,
    /// Repository trait
    Repository,
    /// Connection utility
    Connection,
}

/// A rendered file, not yet written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output root
    pub path: PathBuf,
    /// File content
    pub content: String,
    /// Human-readable description
    pub description: String,
    /// What the file contains
    pub kind: ArtifactKind,
}

/// Renders the source files for one [`ModelSpec`]
pub struct CodeRenderer<'a> {
    spec: &'a ModelSpec,
    settings: ConnectionSettings,
}

impl<'a> CodeRenderer<'a> {
    /// Renderer with default connection settings
    #[must_use]
    pub fn new(spec: &'a ModelSpec) -> Self {
        Self::with_settings(spec, ConnectionSettings::default())
    }

    /// Renderer with explicit connection settings
    #[must_use]
    pub const fn with_settings(spec: &'a ModelSpec, settings: ConnectionSettings) -> Self {
        Self { spec, settings }
    }

    /// Render every configured artifact
    ///
    /// The model needs a model directory; the DAO and connection utility
    /// need a DAO directory; the repository needs a repository directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection template fails to render.
    pub fn render_all(&self) -> Result<Vec<GeneratedFile>> {
        let dirs = &self.spec.directories;
        let mut files = Vec::new();

        if !dirs.model.is_empty() {
            files.push(self.model_file());
        }
        if !dirs.dao.is_empty() {
            files.push(self.dao_file());
        }
        if !dirs.repo.is_empty() {
            files.push(self.repository_file());
        }
        if !dirs.dao.is_empty() {
            files.push(self.connection_file()?);
        }

        debug!(count = files.len(), model = %self.spec.model_name, "rendered sources");
        Ok(files)
    }

    /// Model file
    #[must_use]
    pub fn model_file(&self) -> GeneratedFile {
        GeneratedFile {
            path: output_path(&self.spec.directories.model, &format!("{}.rs", self.spec.file_name)),
            content: self.model_source().to_source(),
            description: format!("Model for {}", self.spec.model_name),
            kind: ArtifactKind::Model,
        }
    }

    /// DAO file
    #[must_use]
    pub fn dao_file(&self) -> GeneratedFile {
        GeneratedFile {
            path: output_path(&self.spec.directories.dao, &format!("{}_dao.rs", self.spec.file_name)),
            content: self.dao_source().to_source(),
            description: format!("Data access for {}", self.spec.model_name),
            kind: ArtifactKind::Dao,
        }
    }

    /// Repository file
    #[must_use]
    pub fn repository_file(&self) -> GeneratedFile {
        GeneratedFile {
            path: output_path(
                &self.spec.directories.repo,
                &format!("{}_repo.rs", self.spec.file_name),
            ),
            content: self.repository_source().to_source(),
            description: format!("Repository for {}", self.spec.model_name),
            kind: ArtifactKind::Repository,
        }
    }

    /// Connection utility file
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn connection_file(&self) -> Result<GeneratedFile> {
        Ok(GeneratedFile {
            path: output_path(&self.spec.directories.conn, CONN_FILE_NAME),
            content: render_connection(&self.settings)?,
            description: "Shared connection pool".to_string(),
            kind: ArtifactKind::Connection,
        })
    }

    /// Syntax tree of the model file
    #[must_use]
    pub fn model_source(&self) -> SourceFile {
        let spec = self.spec;
        let mut imports = Vec::new();
        match spec.chrono_imports().as_slice() {
            [] => {}
            [name] => imports.push(format!("chrono::{name}")),
            names => imports.push(format!("chrono::{{{}}}", names.join(", "))),
        }
        imports.push("serde::{Deserialize, Serialize}".to_string());

        let docs = if spec.table_name.is_empty() {
            vec![format!("{} model", spec.model_name)]
        } else {
            vec![format!("Row of the `{}` table", spec.table_name)]
        };

        let fields = spec
            .fields
            .iter()
            .map(|field| StructField {
                docs: Vec::new(),
                attributes: field.tag.attributes(),
                name: field.ident(),
                ty: field.rust_type(),
            })
            .collect();

        let mut items = vec![Item::Struct(StructDecl {
            docs,
            attributes: vec![
                "#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]"
                    .to_string(),
            ],
            name: spec.model_name.clone(),
            fields,
        })];

        if !spec.table_name.is_empty() {
            items.push(Item::Impl(ImplBlock {
                target: spec.model_name.clone(),
                items: vec![
                    Item::Const(ConstDecl {
                        docs: vec!["Source table".to_string()],
                        public: true,
                        name: "TABLE_NAME".to_string(),
                        ty: "&'static str".to_string(),
                        value: format!("{:?}", spec.table_name),
                    }),
                    Item::Function(FunctionDecl {
                        docs: vec!["Name of the source table".to_string()],
                        public: true,
                        name: "table_name".to_string(),
                        returns: Some("&'static str".to_string()),
                        body: Some(vec![Stmt::line("Self::TABLE_NAME")]),
                        ..FunctionDecl::default()
                    }),
                ],
                ..ImplBlock::default()
            }));
        }

        SourceFile {
            header: vec![GENERATED_HEADER.to_string()],
            imports,
            items,
        }
    }

    /// Syntax tree of the DAO file
    #[must_use]
    pub fn dao_source(&self) -> SourceFile {
        let spec = self.spec;
        let pk = spec.primary_key_field();

        let mut imports = vec!["std::collections::HashMap".to_string()];
        if pk.is_some() {
            imports.push("sqlx::mysql::MySqlArguments".to_string());
            imports.push("sqlx::Arguments".to_string());
        }
        imports.push(self.model_import());
        imports.push(join_path(&spec.modules.conn, "conn::default_connection"));

        let mut items = Vec::new();
        if pk.is_some() {
            let columns: Vec<String> = spec
                .fields
                .iter()
                .map(|field| format!("{:?}", field.column_name))
                .collect();
            items.push(Item::Const(ConstDecl {
                docs: vec!["Columns accepted by `update`".to_string()],
                public: false,
                name: "COLUMNS".to_string(),
                ty: "&[&str]".to_string(),
                value: format!("&[{}]", columns.join(", ")),
            }));
        }

        items.push(Item::Struct(StructDecl {
            docs: vec![format!("Data access for the `{}` table", spec.sql_table_name())],
            attributes: vec!["#[derive(Debug, Clone, Copy, Default)]".to_string()],
            name: spec.dao_name(),
            fields: Vec::new(),
        }));

        items.push(Item::Impl(ImplBlock {
            target: spec.dao_name(),
            items: vec![
                Item::Function(self.dao_list()),
                Item::Function(self.dao_get_by_id()),
                Item::Function(self.dao_create()),
                Item::Function(self.dao_update()),
                Item::Function(self.dao_delete()),
            ],
            ..ImplBlock::default()
        }));

        if pk.is_some() {
            items.push(Item::Function(bind_json_fn()));
        }

        SourceFile {
            header: vec![GENERATED_HEADER.to_string()],
            imports,
            items,
        }
    }

    /// Syntax tree of the repository file
    #[must_use]
    pub fn repository_source(&self) -> SourceFile {
        let spec = self.spec;
        let model = &spec.model_name;
        let repository = spec.repository_name();
        let dao = spec.dao_name();

        let mut imports = vec![
            "async_trait::async_trait".to_string(),
            "std::collections::HashMap".to_string(),
            self.model_import(),
        ];
        if spec.has_dao() {
            imports.push(join_path(
                &spec.modules.dao,
                &format!("{}_dao::{dao}", spec.file_name),
            ));
        }

        let methods: Vec<FunctionDecl> = self
            .operation_signatures()
            .into_iter()
            .map(|(name, params, returns, _)| FunctionDecl {
                is_async: true,
                name: name.to_string(),
                params,
                returns: Some(returns),
                ..FunctionDecl::default()
            })
            .collect();

        let mut items = vec![Item::Trait(TraitDecl {
            docs: vec![format!("Storage operations for [`{model}`]")],
            attributes: vec!["#[async_trait]".to_string()],
            name: repository.clone(),
            supertraits: vec!["Send".to_string(), "Sync".to_string()],
            methods,
        })];

        if spec.has_dao() {
            let delegates = self
                .operation_signatures()
                .into_iter()
                .map(|(name, params, returns, args)| {
                    let call = std::iter::once("self")
                        .chain(args.iter().copied())
                        .collect::<Vec<_>>()
                        .join(", ");
                    Item::Function(FunctionDecl {
                        is_async: true,
                        name: name.to_string(),
                        params,
                        returns: Some(returns),
                        body: Some(vec![Stmt::line(format!("{dao}::{name}({call}).await"))]),
                        ..FunctionDecl::default()
                    })
                })
                .collect();

            items.push(Item::Impl(ImplBlock {
                attributes: vec!["#[async_trait]".to_string()],
                trait_name: Some(repository.clone()),
                target: dao.clone(),
                items: delegates,
            }));

            items.push(Item::Function(FunctionDecl {
                docs: vec![format!("Repository backed by [`{dao}`]")],
                public: true,
                name: format!("new_{}_repository", spec.file_name),
                returns: Some(format!("impl {repository}")),
                body: Some(vec![Stmt::line(dao)]),
                ..FunctionDecl::default()
            }));
        }

        SourceFile {
            header: vec![GENERATED_HEADER.to_string()],
            imports,
            items,
        }
    }

    fn model_import(&self) -> String {
        join_path(
            &self.spec.modules.model,
            &format!("{}::{}", self.spec.file_name, self.spec.model_name),
        )
    }

    /// Rust type of the primary key parameter
    fn pk_type(&self) -> String {
        self.spec
            .primary_key_field()
            .map_or_else(|| FieldType::Unknown.rust_type().to_string(), Field::rust_type)
    }

    /// Name, parameters, return type and forwarded arguments of the five
    /// storage operations
    fn operation_signatures(&self) -> Vec<(&'static str, Vec<Param>, String, Vec<&'static str>)> {
        let model = &self.spec.model_name;
        vec![
            (
                "list",
                vec![Param::SelfRef],
                format!("Result<Vec<{model}>, {SQLX_ERROR}>"),
                vec![],
            ),
            (
                "get_by_id",
                vec![Param::SelfRef, Param::named("id", self.pk_type())],
                format!("Result<Option<{model}>, {SQLX_ERROR}>"),
                vec!["id"],
            ),
            (
                "create",
                vec![Param::SelfRef, Param::named("m", model.as_str())],
                format!("Result<{model}, {SQLX_ERROR}>"),
                vec!["m"],
            ),
            (
                "update",
                vec![
                    Param::SelfRef,
                    Param::named("m", model.as_str()),
                    Param::named("updates", UPDATES_TYPE),
                ],
                format!("Result<{model}, {SQLX_ERROR}>"),
                vec!["m", "updates"],
            ),
            (
                "delete",
                vec![Param::SelfRef, Param::named("m", format!("&{model}"))],
                format!("Result<(), {SQLX_ERROR}>"),
                vec!["m"],
            ),
        ]
    }

    fn dao_method(&self, name: &str, docs: &[&str], params: Vec<Param>, body: Vec<Stmt>) -> FunctionDecl {
        let returns = self
            .operation_signatures()
            .into_iter()
            .find(|(op, ..)| *op == name)
            .map(|(_, _, returns, _)| returns);
        FunctionDecl {
            docs: docs.iter().map(ToString::to_string).collect(),
            public: true,
            is_async: true,
            name: name.to_string(),
            params,
            returns,
            body: Some(body),
        }
    }

    fn dao_list(&self) -> FunctionDecl {
        let sql = format!(
            "SELECT * FROM {} ORDER BY {} DESC",
            quote_table(&self.spec.sql_table_name()),
            quote_ident(self.spec.primary_key())
        );
        self.dao_method(
            "list",
            &["All rows, highest primary key first"],
            vec![Param::SelfRef],
            vec![
                Stmt::line("let pool = default_connection().await?;"),
                Stmt::chain(
                    format!("sqlx::query_as::<_, {}>({sql:?})", self.spec.model_name),
                    [".fetch_all(pool)", ".await"],
                    "",
                ),
            ],
        )
    }

    fn dao_get_by_id(&self) -> FunctionDecl {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?",
            quote_table(&self.spec.sql_table_name()),
            quote_ident(self.spec.primary_key())
        );
        self.dao_method(
            "get_by_id",
            &["Row with the given primary key, `None` when it does not exist"],
            vec![Param::SelfRef, Param::named("id", self.pk_type())],
            vec![
                Stmt::line("let pool = default_connection().await?;"),
                Stmt::chain(
                    format!("sqlx::query_as::<_, {}>({sql:?})", self.spec.model_name),
                    [".bind(id)", ".fetch_optional(pool)", ".await"],
                    "",
                ),
            ],
        )
    }

    fn dao_create(&self) -> FunctionDecl {
        let spec = self.spec;
        let generated_key = spec
            .primary_key_field()
            .filter(|pk| pk.auto_increment && pk.field_type.is_integer());

        let inserted: Vec<&Field> = spec
            .fields
            .iter()
            .filter(|field| !(field.is_primary && generated_key.is_some()))
            .collect();
        let columns: Vec<String> = inserted
            .iter()
            .map(|field| quote_ident(&field.column_name))
            .collect();
        let placeholders = vec!["?"; inserted.len()];
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_table(&spec.sql_table_name()),
            columns.join(", "),
            placeholders.join(", ")
        );

        let mut calls: Vec<String> = inserted
            .iter()
            .map(|field| format!(".bind(&m.{})", field.ident()))
            .collect();
        calls.push(".execute(pool)".to_string());
        calls.push(".await".to_string());

        let mut body = vec![Stmt::line("let pool = default_connection().await?;")];
        let model_param = if let Some(pk) = generated_key {
            body.push(Stmt::chain(format!("let result = sqlx::query({sql:?})"), calls, "?;"));
            let converted = format!(
                "{}::try_from(result.last_insert_id()).map_err(|e| sqlx::Error::Decode(Box::new(e)))?",
                pk.field_type.rust_type()
            );
            let assigned = if pk.nullable {
                format!("Some({converted})")
            } else {
                converted
            };
            body.push(Stmt::line(format!("m.{} = {assigned};", pk.ident())));
            "mut m"
        } else {
            body.push(Stmt::chain(format!("sqlx::query({sql:?})"), calls, "?;"));
            "m"
        };
        body.push(Stmt::line("Ok(m)"));

        self.dao_method(
            "create",
            &[
                "Insert `m` and return the stored value",
                "",
                "An auto-increment key is filled in from the insert result.",
            ],
            vec![Param::SelfRef, Param::named(model_param, spec.model_name.as_str())],
            body,
        )
    }

    fn dao_update(&self) -> FunctionDecl {
        let spec = self.spec;
        let params = vec![
            Param::SelfRef,
            Param::named("m", spec.model_name.as_str()),
            Param::named("updates", UPDATES_TYPE),
        ];
        let docs = [
            "Apply `updates` (column name to new value) and return the re-read row",
            "",
            "An empty map returns `m` unchanged without touching the database.",
        ];
        let early_return = Stmt::block("if updates.is_empty() {", vec![Stmt::line("return Ok(m);")]);

        let Some(pk) = spec.primary_key_field() else {
            return self.dao_method(
                "update",
                &docs,
                params,
                vec![early_return, Stmt::line(self.no_primary_key_error())],
            );
        };

        let pk_ident = pk.ident();
        let pk_value = if pk.field_type.is_copy() {
            format!("m.{pk_ident}")
        } else {
            format!("m.{pk_ident}.clone()")
        };
        let set_sql = format!("UPDATE {} SET ", quote_table(&spec.sql_table_name()));
        let where_sql = format!(" WHERE {} = ?", quote_ident(&pk.column_name));

        let body = vec![
            early_return,
            Stmt::Blank,
            Stmt::line(format!("let mut sql = String::from({set_sql:?});")),
            Stmt::line("let mut args = MySqlArguments::default();"),
            Stmt::block(
                "for (i, (column, value)) in updates.iter().enumerate() {",
                vec![
                    Stmt::block(
                        "if !COLUMNS.contains(&column.as_str()) {",
                        vec![Stmt::line(
                            "return Err(sqlx::Error::ColumnNotFound(column.clone()));",
                        )],
                    ),
                    Stmt::block("if i > 0 {", vec![Stmt::line("sql.push_str(\", \");")]),
                    Stmt::line("sql.push('`');"),
                    Stmt::line("sql.push_str(column);"),
                    Stmt::line("sql.push_str(\"` = ?\");"),
                    Stmt::line("bind_json(&mut args, value)?;"),
                ],
            ),
            Stmt::line(format!("sql.push_str({where_sql:?});")),
            Stmt::line(format!("args.add({pk_value}).map_err(sqlx::Error::Encode)?;")),
            Stmt::Blank,
            Stmt::line("let pool = default_connection().await?;"),
            Stmt::line("sqlx::query_with(&sql, args).execute(pool).await?;"),
            Stmt::chain(
                format!("self.get_by_id(m.{pk_ident})"),
                [".await?", ".ok_or(sqlx::Error::RowNotFound)"],
                "",
            ),
        ];
        self.dao_method("update", &docs, params, body)
    }

    fn dao_delete(&self) -> FunctionDecl {
        let spec = self.spec;
        let docs = ["Delete the row identified by the primary key of `m`"];
        let model_ref = format!("&{}", spec.model_name);

        let Some(pk) = spec.primary_key_field() else {
            return self.dao_method(
                "delete",
                &docs,
                vec![Param::SelfRef, Param::named("_m", model_ref)],
                vec![Stmt::line(self.no_primary_key_error())],
            );
        };

        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            quote_table(&spec.sql_table_name()),
            quote_ident(&pk.column_name)
        );
        self.dao_method(
            "delete",
            &docs,
            vec![Param::SelfRef, Param::named("m", model_ref)],
            vec![
                Stmt::line("let pool = default_connection().await?;"),
                Stmt::chain(
                    format!("sqlx::query({sql:?})"),
                    [
                        format!(".bind(&m.{})", pk.ident()),
                        ".execute(pool)".to_string(),
                        ".await".to_string(),
                    ],
                    "?;",
                ),
                Stmt::line("Ok(())"),
            ],
        )
    }

    fn no_primary_key_error(&self) -> String {
        let message = format!("table `{}` has no primary key", self.spec.sql_table_name());
        format!("Err(sqlx::Error::Protocol({message:?}.to_string()))")
    }
}

/// Render every configured artifact of `spec` with default settings
///
/// # Errors
///
/// Returns an error if the connection template fails to render.
pub fn render(spec: &ModelSpec) -> Result<Vec<GeneratedFile>> {
    CodeRenderer::new(spec).render_all()
}

/// Helper binding a JSON value as a positional SQL argument
fn bind_json_fn() -> FunctionDecl {
    let number_arm = Stmt::Block {
        open: "serde_json::Value::Number(number) => match (number.as_i64(), number.as_u64()) {"
            .to_string(),
        body: vec![
            Stmt::line("(Some(int), _) => args.add(int),"),
            Stmt::line("(None, Some(uint)) => args.add(uint),"),
            Stmt::line("(None, None) => args.add(number.as_f64()),"),
        ],
        close: "},".to_string(),
    };
    let match_value = Stmt::Block {
        open: "let added = match value {".to_string(),
        body: vec![
            Stmt::line("serde_json::Value::Null => args.add(None::<String>),"),
            Stmt::line("serde_json::Value::Bool(flag) => args.add(*flag),"),
            number_arm,
            Stmt::line("serde_json::Value::String(text) => args.add(text.clone()),"),
            Stmt::line("other => args.add(other.to_string()),"),
        ],
        close: "};".to_string(),
    };

    FunctionDecl {
        name: "bind_json".to_string(),
        params: vec![
            Param::named("args", "&mut MySqlArguments"),
            Param::named("value", "&serde_json::Value"),
        ],
        returns: Some(format!("Result<(), {SQLX_ERROR}>")),
        body: Some(vec![match_value, Stmt::line("added.map_err(sqlx::Error::Encode)")]),
        ..FunctionDecl::default()
    }
}

fn output_path(dir: &str, file: &str) -> PathBuf {
    Path::new(dir).join(file)
}

/// Quote an identifier with backticks
fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote a possibly schema-qualified table name
fn quote_table(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}
