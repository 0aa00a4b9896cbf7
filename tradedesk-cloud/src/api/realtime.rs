//! Relay token issuance
//!
//! POST /api/realtime/chat/token
//! POST /api/realtime/notifications/token

use axum::extract::State;
use axum::{Extension, Json};
use shared::error::AppError;
use shared::realtime::Realm;

use crate::auth::SessionIdentity;
use crate::auth::relay_token::{self, IssuedToken};
use crate::error::ServiceError;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, AppError>;

/// POST /api/realtime/chat/token
pub async fn issue_chat_token(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> ApiResult<IssuedToken> {
    identity.require_organization()?;
    issue(&state, &identity, Realm::Chat)
}

/// POST /api/realtime/notifications/token (super-admin only)
pub async fn issue_notifications_token(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> ApiResult<IssuedToken> {
    identity.require_super_admin()?;
    issue(&state, &identity, Realm::Notifications)
}

fn issue(state: &AppState, identity: &SessionIdentity, realm: Realm) -> ApiResult<IssuedToken> {
    let issued = relay_token::issue(
        identity,
        realm,
        &state.jwt_secret,
        state.relay_settings.token_ttl,
    )
    .map_err(ServiceError::from)?;

    tracing::debug!(user_id = %identity.user_id, realm = %realm, "Relay token issued");
    Ok(Json(issued))
}
