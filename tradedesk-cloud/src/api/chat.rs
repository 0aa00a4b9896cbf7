//! Chat message endpoints
//!
//! Messages are persisted first, then relayed to live connections.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::realtime::{ChatMessage, DirectMessage};

use crate::auth::SessionIdentity;
use crate::db::chat_messages;
use crate::error::ServiceError;
use crate::services::{chat, entitlement};
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, AppError>;

const DEFAULT_HISTORY: i64 = 50;
const MAX_HISTORY: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct PostMessage {
    pub body: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedMessage<T> {
    pub message: T,
    /// Live connections the message was relayed to
    pub delivered: usize,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// POST /api/chat/channels/{channel_id}/messages
pub async fn post_channel_message(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(channel_id): Path<String>,
    Json(req): Json<PostMessage>,
) -> ApiResult<PostedMessage<ChatMessage>> {
    let posted = chat::post_channel_message(&state, &identity, &channel_id, &req.body).await?;
    Ok(Json(PostedMessage {
        message: posted.message,
        delivered: posted.delivered,
    }))
}

/// GET /api/chat/channels/{channel_id}/messages?limit=
pub async fn list_channel_messages(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(channel_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Vec<ChatMessage>> {
    let resolved = entitlement::load(&state.pool, &identity).await?;
    resolved.require_chat()?;

    let limit = query.limit.unwrap_or(DEFAULT_HISTORY).clamp(1, MAX_HISTORY);
    let messages =
        chat_messages::list_channel(&state.pool, &resolved.organization.id, &channel_id, limit)
            .await
            .map_err(ServiceError::from)?;
    Ok(Json(messages))
}

/// POST /api/chat/direct/{user_id}
pub async fn post_direct_message(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
    Path(recipient_id): Path<String>,
    Json(req): Json<PostMessage>,
) -> ApiResult<PostedMessage<DirectMessage>> {
    let posted = chat::send_direct_message(&state, &identity, &recipient_id, &req.body).await?;
    Ok(Json(PostedMessage {
        message: posted.message,
        delivered: posted.delivered,
    }))
}
