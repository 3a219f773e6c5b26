//! Fixed source templates

use crate::error::Result;
use crate::schema::ConnectionSettings;
use minijinja::Environment;

/// Connection utility written once per connection directory
pub const CONN_TEMPLATE: &str = r#"// Generated by daogen. This file is never overwritten.

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tokio::sync::OnceCell;

/// Maximum lifetime of a pooled connection
pub const MAX_LIFETIME: Duration = Duration::from_secs({{ max_lifetime_secs }});

/// Maximum number of open connections
pub const MAX_OPEN_CONNECTIONS: u32 = {{ max_open_connections }};

/// Maximum number of idle connections
///
/// sqlx bounds idle connections by `MAX_OPEN_CONNECTIONS`; kept for tooling
/// that reads pool limits from here.
pub const MAX_IDLE_CONNECTIONS: u32 = {{ max_idle_connections }};

/// Foreign-key constraints are not created when migrating
///
/// Informational only: sqlx has no migration or table-naming hooks, so
/// nothing in this module reads it.
pub const DISABLE_FOREIGN_KEY_CONSTRAINTS: bool = {% if disable_foreign_key_constraints %}true{% else %}false{% endif %};

/// Table names are used as written, never pluralized
///
/// Informational only: generated SQL always uses the table name verbatim.
pub const SINGULAR_TABLE_NAMES: bool = {% if singular_table_names %}true{% else %}false{% endif %};

static POOL: OnceCell<MySqlPool> = OnceCell::const_new();

/// Shared connection pool
///
/// Created on first use from the `DATABASE_URL` environment variable.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset or the pool cannot connect.
pub async fn default_connection() -> Result<&'static MySqlPool, sqlx::Error> {
    POOL.get_or_try_init(|| async {
        let dsn = std::env::var("DATABASE_URL")
            .map_err(|e| sqlx::Error::Configuration(Box::new(e)))?;
        MySqlPoolOptions::new()
            .max_lifetime(MAX_LIFETIME)
            .max_connections(MAX_OPEN_CONNECTIONS)
            .connect(&dsn)
            .await
    })
    .await
}
"#;

/// Render the connection utility
///
/// # Errors
///
/// Returns [`crate::GenError::Template`] if rendering fails.
pub fn render_connection(settings: &ConnectionSettings) -> Result<String> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
    env.set_keep_trailing_newline(true);

    let context = minijinja::context! {
        max_lifetime_secs => settings.max_lifetime_secs(),
        max_open_connections => settings.max_open_connections,
        max_idle_connections => settings.max_idle_connections,
        disable_foreign_key_constraints => settings.disable_foreign_key_constraints,
        singular_table_names => settings.singular_table_names,
    };

    Ok(env.render_str(CONN_TEMPLATE, context)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_rendered() {
        let source = render_connection(&ConnectionSettings::default()).unwrap();
        assert!(source.contains("Duration::from_secs(300)"));
        assert!(source.contains("MAX_OPEN_CONNECTIONS: u32 = 200;"));
        assert!(source.contains("MAX_IDLE_CONNECTIONS: u32 = 50;"));
        assert!(source.contains("DISABLE_FOREIGN_KEY_CONSTRAINTS: bool = true;"));
        assert!(source.contains("SINGULAR_TABLE_NAMES: bool = true;"));
        assert!(source.contains("pub async fn default_connection()"));
        assert!(source.contains("DATABASE_URL"));
        assert!(source.ends_with("}\n"));
    }

    #[test]
    fn test_custom_limits_rendered() {
        let settings = ConnectionSettings {
            max_open_connections: 10,
            disable_foreign_key_constraints: false,
            ..ConnectionSettings::default()
        };
        let source = render_connection(&settings).unwrap();
        assert!(source.contains("MAX_OPEN_CONNECTIONS: u32 = 10;"));
        assert!(source.contains("DISABLE_FOREIGN_KEY_CONSTRAINTS: bool = false;"));
    }

    #[test]
    fn test_rendered_text_is_exact() {
        let expected = r##"// Generated by daogen. This file is never overwritten.

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tokio::sync::OnceCell;

/// Maximum lifetime of a pooled connection
pub const MAX_LIFETIME: Duration = Duration::from_secs(300);

/// Maximum number of open connections
pub const MAX_OPEN_CONNECTIONS: u32 = 200;

/// Maximum number of idle connections
///
/// sqlx bounds idle connections by `MAX_OPEN_CONNECTIONS`; kept for tooling
/// that reads pool limits from here.
pub const MAX_IDLE_CONNECTIONS: u32 = 50;

/// Foreign-key constraints are not created when migrating
///
/// Informational only: sqlx has no migration or table-naming hooks, so
/// nothing in this module reads it.
pub const DISABLE_FOREIGN_KEY_CONSTRAINTS: bool = true;

/// Table names are used as written, never pluralized
///
/// Informational only: generated SQL always uses the table name verbatim.
pub const SINGULAR_TABLE_NAMES: bool = true;

static POOL: OnceCell<MySqlPool> = OnceCell::const_new();

/// Shared connection pool
///
/// Created on first use from the `DATABASE_URL` environment variable.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset or the pool cannot connect.
pub async fn default_connection() -> Result<&'static MySqlPool, sqlx::Error> {
    POOL.get_or_try_init(|| async {
        let dsn = std::env::var("DATABASE_URL")
            .map_err(|e| sqlx::Error::Configuration(Box::new(e)))?;
        MySqlPoolOptions::new()
            .max_lifetime(MAX_LIFETIME)
            .max_connections(MAX_OPEN_CONNECTIONS)
            .connect(&dsn)
            .await
    })
    .await
}
"##;
        assert_eq!(render_connection(&ConnectionSettings::default()).unwrap(), expected);
    }
}
