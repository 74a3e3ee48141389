//! User service configuration.

use std::env;

use common::{DatabaseConfig, ServiceConfig};
use domain::SYSTEM_AUDITOR;

/// User service configuration.
#[derive(Debug, Clone)]
pub struct UserServiceConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    /// Identity written to the audit columns
    pub auditor: String,
}

impl UserServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// `USER_SERVICE_*` variables win over the generic names.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            service: ServiceConfig {
                service_name: defaults.service.service_name,
                log_level: var("USER_SERVICE_LOG_LEVEL", "LOG_LEVEL")
                    .unwrap_or(defaults.service.log_level),
            },
            database: DatabaseConfig {
                url: var("USER_SERVICE_DATABASE_URL", "DATABASE_URL")
                    .unwrap_or(defaults.database.url),
                max_connections: parsed("USER_SERVICE_DB_MAX_CONNECTIONS", "DB_MAX_CONNECTIONS")
                    .unwrap_or(defaults.database.max_connections),
                min_connections: parsed("USER_SERVICE_DB_MIN_CONNECTIONS", "DB_MIN_CONNECTIONS")
                    .unwrap_or(defaults.database.min_connections),
                sqlx_logging: parsed("USER_SERVICE_SQL_LOGGING", "SQL_LOGGING")
                    .unwrap_or(defaults.database.sqlx_logging),
            },
            auditor: env::var("USER_SERVICE_AUDITOR").unwrap_or(defaults.auditor),
        }
    }
}

impl Default for UserServiceConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                service_name: "user-service".to_string(),
                log_level: "info".to_string(),
            },
            database: DatabaseConfig::default(),
            auditor: SYSTEM_AUDITOR.to_string(),
        }
    }
}

fn var(specific: &str, generic: &str) -> Option<String> {
    env::var(specific).or_else(|_| env::var(generic)).ok()
}

fn parsed<T: std::str::FromStr>(specific: &str, generic: &str) -> Option<T> {
    var(specific, generic).and_then(|v| v.parse().ok())
}
