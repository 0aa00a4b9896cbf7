//! Realtime relay wire protocol
//!
//! Every frame is JSON of shape `{ "type": <string>, "payload": <object> }`.
//!
//! Client → Relay: `auth`, `join_channel`, `leave_channel`, `typing`
//! Relay → Client: `new_message`, `new_dm`, `typing`, `notification`, `auth_error`

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

/// Realtime endpoint a token is issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Realm {
    /// Organization chat: channels, direct messages, typing
    Chat,
    /// Privileged system notifications for super-admins
    Notifications,
}

impl Realm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Notifications => "notifications",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "chat" => Some(Self::Chat),
            "notifications" => Some(Self::Notifications),
            _ => None,
        }
    }

    /// WebSocket path served by the relay
    pub fn ws_path(&self) -> &'static str {
        match self {
            Self::Chat => "/ws/chat",
            Self::Notifications => "/ws/notifications",
        }
    }

    /// HTTP path issuing a connection token
    pub fn token_path(&self) -> &'static str {
        match self {
            Self::Chat => "/api/realtime/chat/token",
            Self::Notifications => "/api/realtime/notifications/token",
        }
    }
}

impl std::fmt::Display for Realm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client → Relay frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ClientFrame {
    /// Must be the first frame on a connection
    Auth { token: String },
    JoinChannel { channel_id: String },
    LeaveChannel { channel_id: String },
    Typing { channel_id: String },
}

/// Relay → Client frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ServerFrame {
    NewMessage(ChatMessage),
    NewDm(DirectMessage),
    Typing(TypingPayload),
    Notification(Notification),
    /// Sent right before the relay closes a connection it refused
    AuthError { code: ErrorCode, message: String },
}

impl ServerFrame {
    pub fn auth_error(code: ErrorCode) -> Self {
        Self::AuthError {
            code,
            message: code.message().to_string(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::NewMessage(_) => "new_message",
            Self::NewDm(_) => "new_dm",
            Self::Typing(_) => "typing",
            Self::Notification(_) => "notification",
            Self::AuthError { .. } => "auth_error",
        }
    }
}

/// Message posted to an organization channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub organization_id: String,
    pub channel_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub body: String,
    /// Unix millis
    pub created_at: i64,
}

/// Message between two users of the same organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectMessage {
    pub id: String,
    pub organization_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub recipient_id: String,
    pub body: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub channel_id: String,
    pub user_id: String,
    pub user_name: String,
}

/// System notification for the super-admin audience
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    /// Free-form category, e.g. `signup`, `payment_failed`
    pub kind: String,
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub created_at: i64,
}
