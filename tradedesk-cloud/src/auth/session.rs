//! Session JWT authentication for the REST API

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};

use crate::state::AppState;

/// Audience claim distinguishing session tokens from relay tokens
pub const SESSION_AUDIENCE: &str = "tradedesk:session";

const JWT_EXPIRY_HOURS: i64 = 24;

/// JWT claims for a signed-in user
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID
    pub sub: String,
    /// Active organization, absent before onboarding completes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub super_admin: bool,
    pub aud: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated user extracted from the session JWT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: String,
    pub organization_id: Option<String>,
    pub display_name: String,
    pub is_super_admin: bool,
}

impl SessionIdentity {
    /// Organization the request acts on
    pub fn require_organization(&self) -> Result<&str, AppError> {
        self.organization_id
            .as_deref()
            .ok_or_else(|| AppError::new(ErrorCode::OrganizationNotSelected))
    }

    pub fn require_super_admin(&self) -> Result<(), AppError> {
        if self.is_super_admin {
            Ok(())
        } else {
            Err(AppError::new(ErrorCode::AdminRequired))
        }
    }
}

impl From<SessionClaims> for SessionIdentity {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            organization_id: claims.org,
            display_name: claims.name,
            is_super_admin: claims.super_admin,
        }
    }
}

/// Create a session JWT
pub fn create_token(
    identity: &SessionIdentity,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = SessionClaims {
        sub: identity.user_id.clone(),
        org: identity.organization_id.clone(),
        name: identity.display_name.clone(),
        super_admin: identity.is_super_admin,
        aud: SESSION_AUDIENCE.to_string(),
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a session JWT and return its claims
pub fn verify_token(
    token: &str,
    secret: &str,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_audience(&[SESSION_AUDIENCE]);
    let data = jsonwebtoken::decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// Middleware that extracts and verifies the session JWT from the Authorization header
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::not_authenticated().into_response())?;

    let claims = verify_token(token, &state.jwt_secret).map_err(|e| {
        tracing::debug!("Session JWT validation failed: {e}");
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::token_expired().into_response()
            }
            _ => AppError::invalid_token("Invalid session token").into_response(),
        }
    })?;

    request
        .extensions_mut()
        .insert(SessionIdentity::from(claims));

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "session-test-secret";

    fn identity() -> SessionIdentity {
        SessionIdentity {
            user_id: "u1".into(),
            organization_id: Some("org-a".into()),
            display_name: "Sam".into(),
            is_super_admin: false,
        }
    }

    #[test]
    fn token_round_trip() {
        let token = create_token(&identity(), SECRET).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(SessionIdentity::from(claims), identity());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_token(&identity(), SECRET).unwrap();
        assert!(verify_token(&token, "other").is_err());
    }

    #[test]
    fn organization_and_admin_requirements() {
        let mut who = identity();
        assert_eq!(who.require_organization().unwrap(), "org-a");
        assert_eq!(
            who.require_super_admin().unwrap_err().code,
            ErrorCode::AdminRequired
        );

        who.organization_id = None;
        who.is_super_admin = true;
        assert_eq!(
            who.require_organization().unwrap_err().code,
            ErrorCode::OrganizationNotSelected
        );
        assert!(who.require_super_admin().is_ok());
    }
}
