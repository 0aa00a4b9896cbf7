//! Realtime relay: authenticated WebSocket fan-out
//!
//! ```text
//! POST /api/realtime/{realm}/token ──▶ short-lived relay token
//!                                            │
//! /ws/{realm} ── auth frame ── verify once ──┘
//!       │
//!       ▼
//! RelayHub
//!   ├── connections: id → identity + bounded outbound queue
//!   ├── channels:    (organization, channel) → member ids
//!   ├── users:       (realm, user) → connection ids
//!   └── broadcast(scope, frame) → try_send to each target queue
//!                                     │
//!                                     ▼
//!                           per-connection writer task
//! ```
//!
//! Unauthenticated sockets are never registered, so they cannot receive
//! broadcast traffic. A slow or dead member only loses its own frames.

mod hub;

use std::time::Duration;

pub use hub::{ChannelKey, ConnectionGuard, ConnectionId, RelayHub, Scope};
use shared::realtime::Realm;

/// Relay tuning knobs
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Lifetime of a relay connection token
    pub token_ttl: Duration,
    /// How long a socket may stay open without a valid auth frame
    pub auth_timeout: Duration,
    /// Concurrent authenticated connections per user and realm
    pub max_connections_per_user: usize,
    /// Outbound frames buffered per connection before drops
    pub queue_capacity: usize,
    pub ping_interval: Duration,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            token_ttl: Duration::from_secs(60),
            auth_timeout: Duration::from_secs(10),
            max_connections_per_user: 10,
            queue_capacity: 64,
            ping_interval: Duration::from_secs(30),
        }
    }
}

/// Identity bound to a connection after its token was verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayIdentity {
    pub user_id: String,
    pub organization_id: Option<String>,
    pub display_name: String,
    pub is_super_admin: bool,
    pub realm: Realm,
}
