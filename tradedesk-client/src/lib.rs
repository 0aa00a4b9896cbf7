//! TradeDesk Client - realtime relay client
//!
//! Fetches relay tokens over HTTP, keeps a WebSocket to the chat or
//! notification relay open, and caches received notifications.

pub mod backoff;
pub mod cache;
pub mod config;
pub mod driver;
pub mod error;
pub mod session;
pub mod token;

pub use backoff::ReconnectPolicy;
pub use cache::{CacheStorage, JsonFileStorage, MemoryStorage, NotificationCache};
pub use config::ClientConfig;
pub use driver::{RealtimeClient, RealtimeHandle};
pub use error::{ClientError, ClientResult};
pub use session::{Action, Session, SessionEvent, SessionState, StopReason};
pub use token::{HttpTokenSource, TokenSource};

// Re-export shared types for convenience
pub use shared::realtime::{ChatMessage, DirectMessage, Notification, Realm, ServerFrame};
