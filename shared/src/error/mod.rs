//! Unified error system for Tradedesk
//!
//! This module provides the error handling system shared by the cloud server
//! and the realtime client:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: Unified API response format
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Organization / billing errors
//! - 4xxx: Chat and realtime errors
//! - 5xxx: Crew errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::CrewLimitReached)
//!     .with_detail("max_crew_members", 3);
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(3007));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError};
