//! Super-admin system notifications
//!
//! POST /api/admin/notifications relays a notification to every
//! super-admin connected on /ws/notifications. Nothing is persisted.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::realtime::{Notification, ServerFrame};

use crate::auth::SessionIdentity;
use crate::relay::Scope;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, AppError>;

#[derive(Debug, Deserialize)]
pub struct PublishNotification {
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedNotification {
    pub notification: Notification,
    pub delivered: usize,
}

/// POST /api/admin/notifications
pub async fn publish_notification(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Json(req): Json<PublishNotification>,
) -> ApiResult<PublishedNotification> {
    identity.require_super_admin()?;

    if req.kind.trim().is_empty() || req.title.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "kind and title are required",
        ));
    }

    let notification = Notification {
        id: shared::util::new_id(),
        kind: req.kind,
        title: req.title,
        body: req.body,
        link: req.link,
        created_at: shared::util::now_millis(),
    };

    let delivered = state.relay.broadcast(
        &Scope::SuperAdmins,
        &ServerFrame::Notification(notification.clone()),
        None,
    );
    tracing::info!(kind = %notification.kind, delivered, "System notification published");

    Ok(Json(PublishedNotification {
        notification,
        delivered,
    }))
}
