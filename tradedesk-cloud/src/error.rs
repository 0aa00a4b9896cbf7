//! Service-layer error bridging storage failures and `AppError`
//!
//! Handlers return `AppError`; services return `ServiceError` so `?` works on
//! `sqlx` and `jsonwebtoken` results. Infrastructure failures are logged once
//! here and reach the client as a bare internal error.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("token signing error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    /// Business-rule error, passed through unchanged
    #[error(transparent)]
    App(#[from] AppError),
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::DatabaseError)
            }
            ServiceError::Token(jwt_err) => {
                tracing::error!(error = %jwt_err, "Token signing failed");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl From<ErrorCode> for ServiceError {
    fn from(code: ErrorCode) -> Self {
        ServiceError::App(AppError::new(code))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
