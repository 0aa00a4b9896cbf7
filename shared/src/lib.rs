//! Shared types for Tradedesk
//!
//! Types used by both the cloud server and the realtime client: the error
//! system, plan entitlements and the realtime wire protocol.

pub mod entitlement;
pub mod error;
pub mod realtime;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use entitlement::{Entitlement, OrganizationState, PlanTier, RequestingUser, resolve};
pub use realtime::{ClientFrame, Realm, ServerFrame};
