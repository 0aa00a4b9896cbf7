//! Database access layer
//!
//! Functions take any `PgExecutor` so callers can run them on the pool or
//! inside a transaction.

pub mod chat_messages;
pub mod crew;
pub mod organizations;
pub mod users;
