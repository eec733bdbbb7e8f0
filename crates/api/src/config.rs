//! Application configuration loaded from environment variables.

use card_store::MySqlSettings;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `MYSQL_HOST`, `MYSQL_USER`, `MYSQL_PASS`, `MYSQL_DBNAME`, `MYSQL_PORT` —
///   the card tester's database (defaults: `localhost`, `root`, empty,
///   `cards`, `3306`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub mysql: MySqlSettings,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let string_or = |key: &str, default: String| lookup(key).unwrap_or(default);
        let port_or = |key: &str, default: u16| {
            lookup(key)
                .and_then(|p| p.parse().ok())
                .unwrap_or(default)
        };

        Self {
            host: string_or("HOST", defaults.host),
            port: port_or("PORT", defaults.port),
            log_level: string_or("RUST_LOG", defaults.log_level),
            mysql: MySqlSettings {
                host: string_or("MYSQL_HOST", defaults.mysql.host),
                user: string_or("MYSQL_USER", defaults.mysql.user),
                password: string_or("MYSQL_PASS", defaults.mysql.password),
                database: string_or("MYSQL_DBNAME", defaults.mysql.database),
                port: port_or("MYSQL_PORT", defaults.mysql.port),
            },
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            mysql: MySqlSettings::default(),
        }
    }
}
