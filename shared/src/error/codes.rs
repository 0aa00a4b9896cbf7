//! Unified error codes for Tradedesk
//!
//! This module defines all error codes used across the cloud server, the
//! realtime client and the frontend. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Organization / billing errors
//! - 4xxx: Chat and realtime errors
//! - 5xxx: Crew errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Token was issued for a different realtime realm
    TokenRealmMismatch = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Super-admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Organization ====================
    /// Requesting user has no organization yet
    OrganizationNotSelected = 3001,
    /// Organization not found
    OrganizationNotFound = 3002,
    /// Crew seat ceiling of the current plan reached
    CrewLimitReached = 3007,
    /// Feature not available in current subscription plan
    FeatureNotAvailable = 3010,

    // ==================== 4xxx: Chat / realtime ====================
    /// Direct message recipient not found
    RecipientNotFound = 4002,
    /// Too many concurrent realtime connections for this user
    ConnectionLimitReached = 4003,
    /// Message body is empty
    MessageEmpty = 4004,

    // ==================== 5xxx: Crew ====================
    /// Crew member email already exists in this organization
    CrewEmailExists = 5002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::RequiredField => "Required field is missing",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::TokenRealmMismatch => "Token was issued for a different realtime channel",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Super-admin role is required",

            // Organization
            ErrorCode::OrganizationNotSelected => "No organization selected",
            ErrorCode::OrganizationNotFound => "Organization not found",
            ErrorCode::CrewLimitReached => "Crew member limit reached for current plan",
            ErrorCode::FeatureNotAvailable => "Feature not available in current plan",

            // Chat
            ErrorCode::RecipientNotFound => "Recipient not found",
            ErrorCode::ConnectionLimitReached => "Too many realtime connections",
            ErrorCode::MessageEmpty => "Message body is empty",

            // Crew
            ErrorCode::CrewEmailExists => "Crew member email already exists",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            7 => Ok(ErrorCode::RequiredField),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1008 => Ok(ErrorCode::TokenRealmMismatch),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),

            // Organization
            3001 => Ok(ErrorCode::OrganizationNotSelected),
            3002 => Ok(ErrorCode::OrganizationNotFound),
            3007 => Ok(ErrorCode::CrewLimitReached),
            3010 => Ok(ErrorCode::FeatureNotAvailable),

            // Chat
            4002 => Ok(ErrorCode::RecipientNotFound),
            4003 => Ok(ErrorCode::ConnectionLimitReached),
            4004 => Ok(ErrorCode::MessageEmpty),

            // Crew
            5002 => Ok(ErrorCode::CrewEmailExists),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::RequiredField.code(), 7);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::TokenRealmMismatch.code(), 1008);
        assert_eq!(ErrorCode::AdminRequired.code(), 2003);
        assert_eq!(ErrorCode::CrewLimitReached.code(), 3007);
        assert_eq!(ErrorCode::FeatureNotAvailable.code(), 3010);
        assert_eq!(ErrorCode::RecipientNotFound.code(), 4002);
        assert_eq!(ErrorCode::CrewEmailExists.code(), 5002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_roundtrips_known_codes() {
        for code in [
            ErrorCode::Success,
            ErrorCode::TokenExpired,
            ErrorCode::OrganizationNotFound,
            ErrorCode::ConnectionLimitReached,
            ErrorCode::CrewEmailExists,
            ErrorCode::DatabaseError,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_unknown_code() {
        assert_eq!(ErrorCode::try_from(3), Err(InvalidErrorCode(3)));
        assert_eq!(ErrorCode::try_from(9301), Err(InvalidErrorCode(9301)));
        assert_eq!(ErrorCode::try_from(65535), Err(InvalidErrorCode(65535)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::CrewLimitReached).unwrap();
        assert_eq!(json, "3007");
        let code: ErrorCode = serde_json::from_str("4003").unwrap();
        assert_eq!(code, ErrorCode::ConnectionLimitReached);
    }
}
