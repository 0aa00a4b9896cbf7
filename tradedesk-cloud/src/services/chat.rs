//! Chat message posting: persist, then fan out over the relay

use shared::error::{AppError, ErrorCode};
use shared::realtime::{ChatMessage, DirectMessage, ServerFrame};

use super::entitlement;
use crate::auth::SessionIdentity;
use crate::db::{chat_messages, users};
use crate::error::ServiceResult;
use crate::relay::{ChannelKey, Scope};
use crate::state::AppState;

pub const MAX_BODY_CHARS: usize = 4000;

/// A persisted message and the number of live connections it reached
pub struct Delivered<T> {
    pub message: T,
    pub delivered: usize,
}

fn validate_body(body: &str) -> Result<String, AppError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(AppError::new(ErrorCode::MessageEmpty));
    }
    if body.chars().count() > MAX_BODY_CHARS {
        return Err(AppError::validation(format!(
            "message exceeds {MAX_BODY_CHARS} characters"
        )));
    }
    Ok(body.to_string())
}

pub async fn post_channel_message(
    state: &AppState,
    identity: &SessionIdentity,
    channel_id: &str,
    body: &str,
) -> ServiceResult<Delivered<ChatMessage>> {
    let body = validate_body(body)?;
    let resolved = entitlement::load(&state.pool, identity).await?;
    resolved.require_chat()?;

    let message = ChatMessage {
        id: shared::util::new_id(),
        organization_id: resolved.organization.id.clone(),
        channel_id: channel_id.to_string(),
        sender_id: identity.user_id.clone(),
        sender_name: identity.display_name.clone(),
        body,
        created_at: shared::util::now_millis(),
    };
    chat_messages::insert_channel_message(&state.pool, &message).await?;

    let scope = Scope::Channel(ChannelKey::new(
        message.organization_id.clone(),
        message.channel_id.clone(),
    ));
    let delivered = state
        .relay
        .broadcast(&scope, &ServerFrame::NewMessage(message.clone()), None);

    tracing::debug!(
        channel_id,
        delivered,
        "Channel message relayed"
    );
    Ok(Delivered { message, delivered })
}

pub async fn send_direct_message(
    state: &AppState,
    identity: &SessionIdentity,
    recipient_id: &str,
    body: &str,
) -> ServiceResult<Delivered<DirectMessage>> {
    let body = validate_body(body)?;
    let resolved = entitlement::load(&state.pool, identity).await?;
    resolved.require_chat()?;

    let organization_id = resolved.organization.id;
    users::find_in_organization(&state.pool, &organization_id, recipient_id)
        .await?
        .ok_or(ErrorCode::RecipientNotFound)?;

    let message = DirectMessage {
        id: shared::util::new_id(),
        organization_id: organization_id.clone(),
        sender_id: identity.user_id.clone(),
        sender_name: identity.display_name.clone(),
        recipient_id: recipient_id.to_string(),
        body,
        created_at: shared::util::now_millis(),
    };
    chat_messages::insert_direct_message(&state.pool, &message).await?;

    let scope = Scope::DirectPair {
        organization_id,
        first: message.sender_id.clone(),
        second: message.recipient_id.clone(),
    };
    let delivered = state
        .relay
        .broadcast(&scope, &ServerFrame::NewDm(message.clone()), None);

    Ok(Delivered { message, delivered })
}
