//! Connection pool settings
//!
//! Shared by the generator's own schema connection and by the connection
//! utility written into generated projects.

use serde::Serialize;
use sqlx::mysql::MySqlPoolOptions;
use std::time::Duration;

/// Pool and schema-handling settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionSettings {
    /// Maximum lifetime of a pooled connection
    pub max_lifetime: Duration,
    /// Maximum number of open connections
    pub max_open_connections: u32,
    /// Maximum number of idle connections
    pub max_idle_connections: u32,
    /// Skip foreign-key constraint creation when migrating
    pub disable_foreign_key_constraints: bool,
    /// Use singular (non-pluralized) table names
    pub singular_table_names: bool,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            max_lifetime: Duration::from_secs(300),
            max_open_connections: 200,
            max_idle_connections: 50,
            disable_foreign_key_constraints: true,
            singular_table_names: true,
        }
    }
}

impl ConnectionSettings {
    /// Pool options carrying these limits
    ///
    /// sqlx has no idle-connection cap; idle connections are only bounded by
    /// `max_open_connections`.
    #[must_use]
    pub fn pool_options(&self) -> MySqlPoolOptions {
        MySqlPoolOptions::new()
            .max_lifetime(self.max_lifetime)
            .max_connections(self.max_open_connections)
    }

    /// Maximum lifetime in whole seconds
    #[must_use]
    pub const fn max_lifetime_secs(&self) -> u64 {
        self.max_lifetime.as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ConnectionSettings::default();
        assert_eq!(settings.max_lifetime_secs(), 300);
        assert_eq!(settings.max_open_connections, 200);
        assert_eq!(settings.max_idle_connections, 50);
        assert!(settings.disable_foreign_key_constraints);
        assert!(settings.singular_table_names);
    }

    #[test]
    fn test_pool_options_limits() {
        let options = ConnectionSettings::default().pool_options();
        assert_eq!(options.get_max_connections(), 200);
        assert_eq!(options.get_max_lifetime(), Some(Duration::from_secs(300)));
    }
}
