//! Relay WebSocket endpoints
//!
//! GET /ws/chat, GET /ws/notifications
//!
//! Browsers cannot set headers on a WebSocket, so the client authenticates
//! in-band: the first text frame must be `auth` carrying a relay token.
//!
//! - Client → Relay: ClientFrame (Auth, JoinChannel, LeaveChannel, Typing)
//! - Relay → Client: ServerFrame (NewMessage, NewDm, Typing, Notification, AuthError)

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use shared::error::ErrorCode;
use shared::realtime::{ClientFrame, Realm, ServerFrame};
use tokio::sync::mpsc;

use crate::auth::relay_token;
use crate::relay::{ConnectionGuard, ConnectionId, RelayIdentity};
use crate::state::AppState;

type WsSink = SplitSink<WebSocket, Message>;
type WsStream = SplitStream<WebSocket>;

/// GET /ws/chat
pub async fn handle_chat_ws(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| relay_session(socket, state, Realm::Chat))
}

/// GET /ws/notifications
pub async fn handle_notifications_ws(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| relay_session(socket, state, Realm::Notifications))
}

enum AuthOutcome {
    Authenticated(RelayIdentity),
    Rejected(ErrorCode),
    TimedOut,
    Disconnected,
}

async fn relay_session(socket: WebSocket, state: AppState, realm: Realm) {
    let (mut sink, mut stream) = socket.split();

    let identity = match tokio::time::timeout(
        state.relay_settings.auth_timeout,
        await_auth(&mut stream, &state, realm),
    )
    .await
    .unwrap_or(AuthOutcome::TimedOut)
    {
        AuthOutcome::Authenticated(identity) => identity,
        AuthOutcome::Rejected(code) => {
            tracing::info!(realm = %realm, code = %code, "Relay auth rejected");
            let _ = send_frame(&mut sink, &ServerFrame::auth_error(code)).await;
            let _ = sink.close().await;
            return;
        }
        AuthOutcome::TimedOut => {
            tracing::info!(realm = %realm, "Relay auth timed out, closing");
            let _ = sink.close().await;
            return;
        }
        AuthOutcome::Disconnected => return,
    };

    let (tx, rx) = mpsc::channel(state.relay_settings.queue_capacity);
    let guard = match state.relay.register(identity.clone(), tx) {
        Ok(guard) => guard,
        Err(code) => {
            let _ = send_frame(&mut sink, &ServerFrame::auth_error(code)).await;
            let _ = sink.close().await;
            return;
        }
    };

    tracing::info!(
        connection_id = guard.id(),
        user_id = %identity.user_id,
        realm = %realm,
        "Relay connection authenticated"
    );

    run_connection(&state, &guard, sink, stream, rx).await;

    tracing::info!(
        connection_id = guard.id(),
        user_id = %identity.user_id,
        realm = %realm,
        "Relay connection closed"
    );
    // guard dropped here: connection leaves every channel
}

/// Wait for the first `auth` frame. Anything else is dropped.
async fn await_auth(stream: &mut WsStream, state: &AppState, realm: Realm) -> AuthOutcome {
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientFrame>(&text) {
                Ok(ClientFrame::Auth { token }) => {
                    return match relay_token::verify(&token, realm, &state.jwt_secret) {
                        Ok(identity) => AuthOutcome::Authenticated(identity),
                        Err(code) => AuthOutcome::Rejected(code),
                    };
                }
                Ok(_) => {
                    tracing::debug!(realm = %realm, "Frame before auth dropped");
                }
                Err(e) => {
                    tracing::debug!(realm = %realm, "Malformed frame before auth: {e}");
                }
            },
            Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return AuthOutcome::Disconnected,
            Some(Ok(_)) => {}
        }
    }
}

async fn run_connection(
    state: &AppState,
    guard: &ConnectionGuard,
    mut sink: WsSink,
    mut stream: WsStream,
    mut rx: mpsc::Receiver<ServerFrame>,
) {
    let connection_id = guard.id();
    let mut ping_interval = tokio::time::interval(state.relay_settings.ping_interval);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(Default::default())).await.is_err() {
                    break;
                }
            }

            outbound = rx.recv() => {
                let Some(frame) = outbound else { break };
                if send_frame(&mut sink, &frame).await.is_err() {
                    break;
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientFrame>(&text) {
                            Ok(frame) => handle_client_frame(state, connection_id, frame),
                            Err(e) => {
                                tracing::warn!(connection_id, "Invalid relay frame ignored: {e}");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(connection_id, "Relay socket error: {e}");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    let _ = sink.close().await;
}

fn handle_client_frame(state: &AppState, connection_id: ConnectionId, frame: ClientFrame) {
    match frame {
        ClientFrame::Auth { .. } => {
            tracing::warn!(connection_id, "Duplicate auth frame ignored");
        }
        ClientFrame::JoinChannel { channel_id } => {
            if channel_id.is_empty() {
                return;
            }
            if state.relay.join(connection_id, &channel_id) {
                tracing::debug!(connection_id, channel_id = %channel_id, "Joined channel");
            }
        }
        ClientFrame::LeaveChannel { channel_id } => {
            if state.relay.leave(connection_id, &channel_id) {
                tracing::debug!(connection_id, channel_id = %channel_id, "Left channel");
            }
        }
        ClientFrame::Typing { channel_id } => {
            state.relay.relay_typing(connection_id, &channel_id);
        }
    }
}

async fn send_frame(sink: &mut WsSink, frame: &ServerFrame) -> Result<(), axum::Error> {
    let json = serde_json::to_string(frame).map_err(axum::Error::new)?;
    sink.send(Message::Text(json.into())).await
}
