//! RealtimeClient: drives a [`Session`] over a real WebSocket
//!
//! 1. Fetch a relay token (HTTP)
//! 2. Open the realm's WebSocket and send `auth`
//! 3. Re-announce joined channels, then pump frames both ways
//! 4. On drop, back off per policy and start over; on `auth_error`, stop

use std::collections::VecDeque;

use futures::{SinkExt, StreamExt};
use shared::realtime::{ClientFrame, Notification, Realm, ServerFrame};
use tokio::net::TcpStream;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::cache::{CacheStorage, MemoryStorage, NotificationCache};
use crate::session::{Action, Session, SessionEvent, SessionState};
use crate::token::{HttpTokenSource, TokenSource};
use crate::{ClientConfig, ClientResult};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug)]
enum Command {
    Join(String),
    Leave(String),
    Typing(String),
}

/// Realtime client, not yet started
pub struct RealtimeClient<T, S = MemoryStorage> {
    config: ClientConfig,
    tokens: T,
    cache: NotificationCache<S>,
}

impl RealtimeClient<HttpTokenSource, MemoryStorage> {
    /// Client fetching tokens from `config.base_url` with the session token
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        let tokens = HttpTokenSource::new(
            config.base_url.clone(),
            config.session_token.clone(),
            config.request_timeout,
        )?;
        Ok(Self::new(config, tokens))
    }
}

impl<T: TokenSource> RealtimeClient<T, MemoryStorage> {
    pub fn new(config: ClientConfig, tokens: T) -> Self {
        let cache = NotificationCache::load(MemoryStorage::new(), config.cache_capacity);
        Self {
            config,
            tokens,
            cache,
        }
    }
}

impl<T: TokenSource, S: CacheStorage> RealtimeClient<T, S> {
    /// Persist received notifications to `storage` (loaded immediately)
    pub fn with_storage<S2: CacheStorage>(self, storage: S2) -> RealtimeClient<T, S2> {
        RealtimeClient {
            cache: NotificationCache::load(storage, self.config.cache_capacity),
            config: self.config,
            tokens: self.tokens,
        }
    }

    /// Start the connection task.
    ///
    /// Returns the control handle and the stream of inbound relay frames.
    pub fn spawn(self) -> ClientResult<(RealtimeHandle, mpsc::Receiver<ServerFrame>)> {
        self.config.validate()?;
        let url = self.config.ws_url()?;
        let (events_tx, events_rx) = mpsc::channel(self.config.event_buffer.max(1));
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);
        let (notifications_tx, notifications_rx) = watch::channel(self.cache.items());
        let shutdown = CancellationToken::new();

        let mut ping = tokio::time::interval(self.config.ping_interval);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let driver = Driver {
            realm: self.config.realm,
            url,
            session: Session::new(self.config.policy.clone()),
            tokens: self.tokens,
            cache: self.cache,
            events: events_tx,
            commands: commands_rx,
            state_tx,
            notifications_tx,
            shutdown: shutdown.clone(),
            ws: None,
            ping,
            pending: VecDeque::new(),
        };
        let task = tokio::spawn(driver.run());

        let handle = RealtimeHandle {
            commands: commands_tx,
            state: state_rx,
            notifications: notifications_rx,
            _guard: shutdown.clone().drop_guard(),
            shutdown,
            task,
        };
        Ok((handle, events_rx))
    }
}

/// Control handle of a running client. Dropping it stops the client.
pub struct RealtimeHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<SessionState>,
    notifications: watch::Receiver<Vec<Notification>>,
    shutdown: CancellationToken,
    _guard: DropGuard,
    task: JoinHandle<()>,
}

impl RealtimeHandle {
    /// Join a channel now and after every reconnect
    pub fn join(&self, channel_id: impl Into<String>) -> bool {
        self.commands.send(Command::Join(channel_id.into())).is_ok()
    }

    pub fn leave(&self, channel_id: impl Into<String>) -> bool {
        self.commands.send(Command::Leave(channel_id.into())).is_ok()
    }

    pub fn typing(&self, channel_id: impl Into<String>) -> bool {
        self.commands.send(Command::Typing(channel_id.into())).is_ok()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Wait until the session reaches a state matching `pred`
    pub async fn wait_for_state(
        &mut self,
        pred: impl Fn(&SessionState) -> bool,
    ) -> SessionState {
        if let Ok(state) = self.state.wait_for(|s| pred(s)).await {
            return (*state).clone();
        }
        // driver gone; the last published state is final
        self.state.borrow().clone()
    }

    /// Cached notifications, newest first
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.borrow().clone()
    }

    /// Stop the client and wait for the socket to close
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        let _ = self.task.await;
    }
}

struct Driver<T, S> {
    realm: Realm,
    url: String,
    session: Session,
    tokens: T,
    cache: NotificationCache<S>,
    events: mpsc::Sender<ServerFrame>,
    commands: mpsc::UnboundedReceiver<Command>,
    state_tx: watch::Sender<SessionState>,
    notifications_tx: watch::Sender<Vec<Notification>>,
    shutdown: CancellationToken,
    ws: Option<WsStream>,
    ping: Interval,
    pending: VecDeque<Action>,
}

enum Wake {
    Shutdown,
    Command(Option<Command>),
    Ping,
    Inbound(Option<Result<Message, tungstenite::Error>>),
}

impl<T: TokenSource, S: CacheStorage> Driver<T, S> {
    async fn run(mut self) {
        tracing::info!(realm = %self.realm, "Realtime client started");
        self.dispatch(SessionEvent::Start);

        loop {
            self.publish_state();
            if self.session.is_stopped() {
                break;
            }

            let event = match self.pending.pop_front() {
                Some(action) => self.execute(action).await,
                None => self.pump().await,
            };
            if let Some(event) = event {
                self.dispatch(event);
            }
        }

        if let Some(mut ws) = self.ws.take() {
            let _ = ws.close(None).await;
        }
        tracing::info!(realm = %self.realm, state = ?self.session.state(), "Realtime client stopped");
    }

    fn dispatch(&mut self, event: SessionEvent) {
        if matches!(event, SessionEvent::Closed | SessionEvent::AuthRejected(_)) {
            self.ws = None;
        }
        let actions = self.session.handle(event);
        self.pending.extend(actions);
    }

    fn publish_state(&self) {
        let current = self.session.state();
        self.state_tx.send_if_modified(|s| {
            if *s != *current {
                *s = current.clone();
                true
            } else {
                false
            }
        });
    }

    async fn execute(&mut self, action: Action) -> Option<SessionEvent> {
        let shutdown = self.shutdown.clone();
        match action {
            Action::FetchToken => tokio::select! {
                _ = shutdown.cancelled() => Some(SessionEvent::Shutdown),
                result = self.tokens.fetch(self.realm) => match result {
                    Ok(token) => Some(SessionEvent::TokenFetched(token)),
                    Err(e) => {
                        tracing::warn!(realm = %self.realm, "Relay token fetch failed: {e}");
                        Some(SessionEvent::TokenFailed)
                    }
                },
            },

            Action::OpenSocket => {
                let url = self.url.clone();
                tokio::select! {
                    _ = shutdown.cancelled() => Some(SessionEvent::Shutdown),
                    result = tokio_tungstenite::connect_async(url) => match result {
                        Ok((ws, _)) => {
                            self.ws = Some(ws);
                            self.ping.reset();
                            Some(SessionEvent::SocketOpened)
                        }
                        Err(e) => {
                            tracing::warn!(realm = %self.realm, "Relay connection failed: {e}");
                            Some(SessionEvent::SocketFailed)
                        }
                    },
                }
            }

            Action::SendAuth { token } => {
                if self.send(ClientFrame::Auth { token }).await {
                    Some(SessionEvent::AuthSent)
                } else {
                    Some(SessionEvent::Closed)
                }
            }

            Action::Send(frame) => {
                if self.send(frame).await {
                    None
                } else {
                    Some(SessionEvent::Closed)
                }
            }

            Action::Sleep(delay) => {
                tracing::info!(
                    realm = %self.realm,
                    delay_ms = delay.as_millis() as u64,
                    "Reconnecting after backoff"
                );
                tokio::select! {
                    _ = shutdown.cancelled() => Some(SessionEvent::Shutdown),
                    _ = tokio::time::sleep(delay) => Some(SessionEvent::BackoffElapsed),
                }
            }

            Action::GiveUp => {
                tracing::warn!(realm = %self.realm, state = ?self.session.state(), "Realtime client giving up");
                None
            }
        }
    }

    /// Wait for the next thing to happen on an open connection
    async fn pump(&mut self) -> Option<SessionEvent> {
        let wake = {
            let Some(ws) = self.ws.as_mut() else {
                return Some(SessionEvent::Closed);
            };
            tokio::select! {
                _ = self.shutdown.cancelled() => Wake::Shutdown,
                command = self.commands.recv() => Wake::Command(command),
                _ = self.ping.tick() => Wake::Ping,
                message = ws.next() => Wake::Inbound(message),
            }
        };

        match wake {
            Wake::Shutdown => Some(SessionEvent::Shutdown),
            // every handle dropped
            Wake::Command(None) => Some(SessionEvent::Shutdown),
            Wake::Command(Some(command)) => {
                let actions = match command {
                    Command::Join(channel_id) => self.session.join(&channel_id),
                    Command::Leave(channel_id) => self.session.leave(&channel_id),
                    Command::Typing(channel_id) => self.session.typing(&channel_id),
                };
                self.pending.extend(actions);
                None
            }
            Wake::Ping => {
                let alive = match self.ws.as_mut() {
                    Some(ws) => ws.send(Message::Ping(Default::default())).await.is_ok(),
                    None => false,
                };
                if alive {
                    None
                } else {
                    tracing::warn!(realm = %self.realm, "Relay ping failed, reconnecting");
                    Some(SessionEvent::Closed)
                }
            }
            Wake::Inbound(message) => self.on_inbound(message),
        }
    }

    fn on_inbound(
        &mut self,
        message: Option<Result<Message, tungstenite::Error>>,
    ) -> Option<SessionEvent> {
        match message {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<ServerFrame>(&text) {
                Ok(frame) => {
                    let event = match &frame {
                        ServerFrame::AuthError { code, message } => {
                            tracing::warn!(realm = %self.realm, code = %code, "Relay rejected authentication: {message}");
                            Some(SessionEvent::AuthRejected(*code))
                        }
                        ServerFrame::Notification(notification) => {
                            if self.cache.push(notification.clone()) {
                                self.notifications_tx.send_replace(self.cache.items());
                            }
                            None
                        }
                        _ => None,
                    };
                    self.deliver(frame);
                    event
                }
                Err(e) => {
                    tracing::warn!(realm = %self.realm, "Malformed relay frame dropped: {e}");
                    None
                }
            },
            Some(Ok(Message::Close(_))) | None => {
                tracing::info!(realm = %self.realm, "Relay connection closed by server");
                Some(SessionEvent::Closed)
            }
            Some(Err(e)) => {
                tracing::warn!(realm = %self.realm, "Relay socket error: {e}");
                Some(SessionEvent::Closed)
            }
            Some(Ok(_)) => None,
        }
    }

    fn deliver(&self, frame: ServerFrame) {
        match self.events.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(frame)) => {
                tracing::warn!(frame = frame.type_name(), "Event consumer lagging, frame dropped");
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }

    async fn send(&mut self, frame: ClientFrame) -> bool {
        let Some(ws) = self.ws.as_mut() else {
            return false;
        };
        let json = match serde_json::to_string(&frame) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to encode relay frame: {e}");
                return true;
            }
        };
        match ws.send(Message::Text(json.into())).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(realm = %self.realm, "Relay send failed: {e}");
                false
            }
        }
    }
}
