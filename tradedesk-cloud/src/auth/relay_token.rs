//! Short-lived relay connection tokens
//!
//! A relay token is minted by an authenticated HTTP call and presented once,
//! in the first `auth` frame of a WebSocket. It is bound to one realm.

use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::ErrorCode;
use shared::realtime::Realm;

use super::session::SessionIdentity;
use crate::relay::RelayIdentity;

/// Audience claim distinguishing relay tokens from session tokens
pub const RELAY_AUDIENCE: &str = "tradedesk:relay";

#[derive(Debug, Serialize, Deserialize)]
pub struct RelayClaims {
    /// User ID
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    pub name: String,
    #[serde(default)]
    pub super_admin: bool,
    pub realm: Realm,
    pub aud: String,
    /// Unique token id
    pub jti: String,
    pub exp: usize,
    pub iat: usize,
}

/// Response body of the token endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub token: String,
    /// Seconds until the token can no longer be used to authenticate
    pub expires_in: u64,
}

/// Mint a relay token for `realm`
pub fn issue(
    identity: &SessionIdentity,
    realm: Realm,
    secret: &str,
    ttl: Duration,
) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let exp = now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX));
    let claims = RelayClaims {
        sub: identity.user_id.clone(),
        org: identity.organization_id.clone(),
        name: identity.display_name.clone(),
        super_admin: identity.is_super_admin,
        realm,
        aud: RELAY_AUDIENCE.to_string(),
        jti: shared::util::new_id(),
        exp: usize::try_from(exp).unwrap_or(usize::MAX),
        iat: usize::try_from(now).unwrap_or_default(),
    };

    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(IssuedToken {
        token,
        expires_in: ttl.as_secs(),
    })
}

/// Verify a relay token presented on the `expected` realm's endpoint.
///
/// The error is the code sent back in the `auth_error` frame.
pub fn verify(token: &str, expected: Realm, secret: &str) -> Result<RelayIdentity, ErrorCode> {
    let mut validation = Validation::default();
    validation.set_audience(&[RELAY_AUDIENCE]);
    // Expiry is exact for relay tokens
    validation.leeway = 0;

    let claims = jsonwebtoken::decode::<RelayClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("Relay token rejected: {e}");
        match e.kind() {
            ErrorKind::ExpiredSignature => ErrorCode::TokenExpired,
            _ => ErrorCode::TokenInvalid,
        }
    })?
    .claims;

    if claims.realm != expected {
        return Err(ErrorCode::TokenRealmMismatch);
    }

    match expected {
        Realm::Chat if claims.org.is_none() => return Err(ErrorCode::OrganizationNotSelected),
        Realm::Notifications if !claims.super_admin => return Err(ErrorCode::AdminRequired),
        _ => {}
    }

    Ok(RelayIdentity {
        user_id: claims.sub,
        organization_id: claims.org,
        display_name: claims.name,
        is_super_admin: claims.super_admin,
        realm: claims.realm,
    })
}
