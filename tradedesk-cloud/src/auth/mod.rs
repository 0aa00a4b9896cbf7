//! Authentication: session JWTs for the REST API, relay tokens for WebSockets

pub mod relay_token;
pub mod session;

pub use session::{SessionIdentity, session_auth_middleware};
