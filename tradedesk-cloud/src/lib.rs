//! tradedesk-cloud: entitlement API and realtime relay
//!
//! - REST API for subscription state, entitlements, crew and chat (session JWT)
//! - Relay token issuance per realm
//! - WebSocket relay for organization chat and super-admin notifications

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod relay;
pub mod services;
pub mod state;

pub use config::Config;
pub use state::AppState;
