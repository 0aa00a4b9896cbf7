//! Cloud server configuration

use std::time::Duration;

use crate::relay::RelaySettings;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Cloud server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port (REST API + relay WebSockets)
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HS256 secret for session and relay tokens
    pub jwt_secret: String,
    /// Relay tuning
    pub relay: RelaySettings,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let defaults = RelaySettings::default();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: Self::env_or("HTTP_PORT", 8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            environment,
            relay: RelaySettings {
                token_ttl: Duration::from_secs(Self::env_or(
                    "RELAY_TOKEN_TTL_SECS",
                    defaults.token_ttl.as_secs(),
                )),
                auth_timeout: Duration::from_secs(Self::env_or(
                    "RELAY_AUTH_TIMEOUT_SECS",
                    defaults.auth_timeout.as_secs(),
                )),
                max_connections_per_user: Self::env_or(
                    "RELAY_MAX_CONNECTIONS_PER_USER",
                    defaults.max_connections_per_user,
                ),
                queue_capacity: Self::env_or("RELAY_QUEUE_CAPACITY", defaults.queue_capacity)
                    .max(1),
                ping_interval: defaults.ping_interval,
            },
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
