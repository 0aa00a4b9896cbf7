//! Application state for tradedesk-cloud

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::relay::{RelayHub, RelaySettings};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Secret for session and relay JWTs
    pub jwt_secret: String,
    /// Live relay connections
    pub relay: RelayHub,
    pub relay_settings: RelaySettings,
}

impl AppState {
    /// Connect to PostgreSQL, run migrations and build the state
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self::with_pool(
            pool,
            config.jwt_secret.clone(),
            config.relay.clone(),
        ))
    }

    /// Build the state around an existing pool
    pub fn with_pool(pool: PgPool, jwt_secret: String, relay_settings: RelaySettings) -> Self {
        Self {
            pool,
            jwt_secret,
            relay: RelayHub::new(relay_settings.max_connections_per_user),
            relay_settings,
        }
    }
}
