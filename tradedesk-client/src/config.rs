//! Client configuration

use std::time::Duration;

use shared::realtime::Realm;

use crate::backoff::ReconnectPolicy;
use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::{ClientError, ClientResult};

/// Realtime client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// Session JWT used to request relay tokens
    pub session_token: String,

    /// Endpoint to connect to
    pub realm: Realm,

    /// Reconnect behavior, defaults per realm
    pub policy: ReconnectPolicy,

    /// Notification cache capacity
    pub cache_capacity: usize,

    /// Inbound frames buffered for the consumer
    pub event_buffer: usize,

    /// HTTP request timeout (token fetch)
    pub request_timeout: Duration,

    /// WebSocket keepalive ping interval
    pub ping_interval: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, session_token: impl Into<String>, realm: Realm) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_token: session_token.into(),
            realm,
            policy: ReconnectPolicy::for_realm(realm),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            event_buffer: 256,
            request_timeout: Duration::from_secs(10),
            ping_interval: Duration::from_secs(30),
        }
    }

    /// Chat client
    pub fn chat(base_url: impl Into<String>, session_token: impl Into<String>) -> Self {
        Self::new(base_url, session_token, Realm::Chat)
    }

    /// Super-admin notification client
    pub fn notifications(base_url: impl Into<String>, session_token: impl Into<String>) -> Self {
        Self::new(base_url, session_token, Realm::Notifications)
    }

    /// Set the reconnect policy
    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the notification cache capacity
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_event_buffer(mut self, size: usize) -> Self {
        self.event_buffer = size;
        self
    }

    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    /// Reject settings the driver cannot run with
    pub fn validate(&self) -> ClientResult<()> {
        if self.ping_interval.is_zero() {
            return Err(ClientError::Config(
                "ping interval must be greater than zero".into(),
            ));
        }
        self.ws_url().map(|_| ())
    }

    /// WebSocket URL of the configured realm (`http` → `ws`, `https` → `wss`)
    pub fn ws_url(&self) -> ClientResult<String> {
        let rest = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            return Err(ClientError::Config(format!(
                "base URL must start with http:// or https://: {}",
                self.base_url
            )));
        };
        Ok(format!("{rest}{}", self.realm.ws_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_url_follows_scheme() {
        let cfg = ClientConfig::chat("https://api.tradedesk.app/", "s");
        assert_eq!(cfg.ws_url().unwrap(), "wss://api.tradedesk.app/ws/chat");

        let cfg = ClientConfig::notifications("http://localhost:8080", "s");
        assert_eq!(
            cfg.ws_url().unwrap(),
            "ws://localhost:8080/ws/notifications"
        );

        let cfg = ClientConfig::chat("ftp://nope", "s");
        assert!(cfg.ws_url().is_err());
    }

    #[test]
    fn zero_ping_interval_is_rejected() {
        let cfg = ClientConfig::chat("http://localhost:8080", "s");
        assert!(cfg.validate().is_ok());

        let cfg = cfg.with_ping_interval(Duration::ZERO);
        assert!(matches!(cfg.validate(), Err(ClientError::Config(_))));
    }

    #[test]
    fn policy_defaults_per_realm() {
        assert!(matches!(
            ClientConfig::chat("http://x", "s").policy,
            ReconnectPolicy::Fixed { .. }
        ));
        assert!(matches!(
            ClientConfig::notifications("http://x", "s").policy,
            ReconnectPolicy::Exponential { .. }
        ));
    }
}
