//! Business operations shared by the HTTP handlers

pub mod chat;
pub mod crew;
pub mod entitlement;
