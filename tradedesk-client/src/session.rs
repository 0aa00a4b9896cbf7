//! Connection lifecycle as a pure state machine
//!
//! ```text
//!            Start                TokenFetched           SocketOpened
//!   Idle ───────────▶ Connecting ─────────────▶ (OpenSocket) ─────────▶ Authenticating
//!                        ▲  │ TokenFailed / SocketFailed                    │ AuthSent
//!                        │  ▼                                               ▼
//!   BackoffElapsed ── Backoff { attempt } ◀──────────── Closed ──────────  Open
//!                        │ policy exhausted                                 │ AuthRejected
//!                        ▼                                                  ▼
//!                     Stopped(RetriesExhausted)               Stopped(AuthRejected)
//! ```
//!
//! `Session` performs no I/O. The driver feeds it events and executes the
//! returned actions, which keeps retry limits and rejoin behavior testable.

use std::time::Duration;

use shared::error::ErrorCode;
use shared::realtime::ClientFrame;

use crate::backoff::ReconnectPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Fetching a token and opening the socket
    Connecting,
    /// Socket open, auth frame not sent yet
    Authenticating,
    Open,
    /// Waiting before the next attempt; `attempt` counts consecutive failures
    Backoff { attempt: u32 },
    Stopped(StopReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Relay refused the token; not retried
    AuthRejected(ErrorCode),
    /// Reconnect policy ran out of attempts
    RetriesExhausted,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    TokenFetched(String),
    TokenFailed,
    SocketOpened,
    SocketFailed,
    AuthSent,
    AuthRejected(ErrorCode),
    Closed,
    BackoffElapsed,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    FetchToken,
    OpenSocket,
    SendAuth { token: String },
    Send(ClientFrame),
    Sleep(Duration),
    GiveUp,
}

#[derive(Debug)]
pub struct Session {
    state: SessionState,
    policy: ReconnectPolicy,
    failures: u32,
    token: Option<String>,
    /// Channels the user wants to be in, in join order
    channels: Vec<String>,
}

impl Session {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            state: SessionState::Idle,
            policy,
            failures: 0,
            token: None,
            channels: Vec::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self.state, SessionState::Stopped(_))
    }

    pub fn joined_channels(&self) -> &[String] {
        &self.channels
    }

    /// Advance the machine. Events that make no sense in the current state
    /// are ignored.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<Action> {
        use SessionEvent as E;
        use SessionState as S;

        if self.is_stopped() {
            return Vec::new();
        }

        match (&self.state, event) {
            (_, E::Shutdown) => {
                self.token = None;
                self.state = S::Stopped(StopReason::Shutdown);
                Vec::new()
            }

            (S::Idle, E::Start) | (S::Backoff { .. }, E::BackoffElapsed) => {
                self.state = S::Connecting;
                vec![Action::FetchToken]
            }

            (S::Connecting, E::TokenFetched(token)) => {
                self.token = Some(token);
                vec![Action::OpenSocket]
            }
            (S::Connecting, E::SocketOpened) => match self.token.take() {
                Some(token) => {
                    self.state = S::Authenticating;
                    vec![Action::SendAuth { token }]
                }
                None => self.fail(),
            },
            (S::Connecting, E::TokenFailed | E::SocketFailed) => self.fail(),

            (S::Authenticating, E::AuthSent) => {
                self.state = S::Open;
                self.failures = 0;
                self.channels
                    .iter()
                    .map(|channel_id| {
                        Action::Send(ClientFrame::JoinChannel {
                            channel_id: channel_id.clone(),
                        })
                    })
                    .collect()
            }

            (S::Authenticating | S::Open, E::AuthRejected(code)) => {
                self.state = S::Stopped(StopReason::AuthRejected(code));
                vec![Action::GiveUp]
            }
            (S::Authenticating | S::Open, E::Closed) => self.fail(),

            _ => Vec::new(),
        }
    }

    /// Remember a channel; announce it now if the connection is open.
    pub fn join(&mut self, channel_id: &str) -> Vec<Action> {
        if self.channels.iter().any(|c| c == channel_id) {
            return Vec::new();
        }
        self.channels.push(channel_id.to_string());
        self.send_if_open(ClientFrame::JoinChannel {
            channel_id: channel_id.to_string(),
        })
    }

    pub fn leave(&mut self, channel_id: &str) -> Vec<Action> {
        let before = self.channels.len();
        self.channels.retain(|c| c != channel_id);
        if self.channels.len() == before {
            return Vec::new();
        }
        self.send_if_open(ClientFrame::LeaveChannel {
            channel_id: channel_id.to_string(),
        })
    }

    /// Typing indicators are only meaningful for joined channels on a live socket
    pub fn typing(&self, channel_id: &str) -> Vec<Action> {
        if !self.channels.iter().any(|c| c == channel_id) {
            return Vec::new();
        }
        self.send_if_open(ClientFrame::Typing {
            channel_id: channel_id.to_string(),
        })
    }

    fn send_if_open(&self, frame: ClientFrame) -> Vec<Action> {
        if self.state == SessionState::Open {
            vec![Action::Send(frame)]
        } else {
            Vec::new()
        }
    }

    fn fail(&mut self) -> Vec<Action> {
        self.token = None;
        self.failures = self.failures.saturating_add(1);
        match self.policy.delay_for(self.failures) {
            Some(delay) => {
                self.state = SessionState::Backoff {
                    attempt: self.failures,
                };
                vec![Action::Sleep(delay)]
            }
            None => {
                self.state = SessionState::Stopped(StopReason::RetriesExhausted);
                vec![Action::GiveUp]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed() -> Session {
        Session::new(ReconnectPolicy::Fixed {
            delay: Duration::from_secs(3),
        })
    }

    fn open(session: &mut Session) -> Vec<Action> {
        assert_eq!(session.handle(SessionEvent::Start), vec![Action::FetchToken]);
        assert_eq!(
            session.handle(SessionEvent::TokenFetched("t".into())),
            vec![Action::OpenSocket]
        );
        assert_eq!(
            session.handle(SessionEvent::SocketOpened),
            vec![Action::SendAuth { token: "t".into() }]
        );
        session.handle(SessionEvent::AuthSent)
    }

    fn join_frame(channel: &str) -> Action {
        Action::Send(ClientFrame::JoinChannel {
            channel_id: channel.into(),
        })
    }

    #[test]
    fn happy_path_reaches_open() {
        let mut session = fixed();
        assert!(open(&mut session).is_empty());
        assert_eq!(session.state(), &SessionState::Open);
    }

    #[test]
    fn joins_are_sent_when_open_and_deduplicated() {
        let mut session = fixed();
        open(&mut session);
        assert_eq!(session.join("general"), vec![join_frame("general")]);
        assert!(session.join("general").is_empty());
        assert_eq!(session.joined_channels(), ["general".to_string()]);
    }

    #[test]
    fn joins_before_open_are_announced_after_auth() {
        let mut session = fixed();
        assert!(session.join("general").is_empty());
        assert!(session.join("ops").is_empty());
        assert_eq!(open(&mut session), vec![join_frame("general"), join_frame("ops")]);
    }

    #[test]
    fn reconnect_reannounces_joined_channels() {
        let mut session = fixed();
        open(&mut session);
        session.join("general");
        session.join("ops");
        session.leave("ops");

        assert_eq!(
            session.handle(SessionEvent::Closed),
            vec![Action::Sleep(Duration::from_secs(3))]
        );
        assert_eq!(session.state(), &SessionState::Backoff { attempt: 1 });
        assert_eq!(
            session.handle(SessionEvent::BackoffElapsed),
            vec![Action::FetchToken]
        );
        session.handle(SessionEvent::TokenFetched("t2".into()));
        session.handle(SessionEvent::SocketOpened);
        assert_eq!(
            session.handle(SessionEvent::AuthSent),
            vec![join_frame("general")]
        );
    }

    #[test]
    fn auth_rejection_stops_without_retry() {
        let mut session = fixed();
        session.handle(SessionEvent::Start);
        session.handle(SessionEvent::TokenFetched("t".into()));
        session.handle(SessionEvent::SocketOpened);
        assert_eq!(
            session.handle(SessionEvent::AuthRejected(ErrorCode::TokenExpired)),
            vec![Action::GiveUp]
        );
        assert_eq!(
            session.state(),
            &SessionState::Stopped(StopReason::AuthRejected(ErrorCode::TokenExpired))
        );
        assert!(session.handle(SessionEvent::Start).is_empty());
        assert!(session.handle(SessionEvent::Closed).is_empty());
    }

    #[test]
    fn auth_error_after_open_also_stops() {
        let mut session = fixed();
        open(&mut session);
        session.handle(SessionEvent::AuthRejected(ErrorCode::ConnectionLimitReached));
        assert!(session.is_stopped());
    }

    #[test]
    fn token_failure_backs_off_and_retries_forever_for_chat() {
        let mut session = fixed();
        session.handle(SessionEvent::Start);
        for attempt in 1..=20 {
            assert_eq!(
                session.handle(SessionEvent::TokenFailed),
                vec![Action::Sleep(Duration::from_secs(3))]
            );
            assert_eq!(session.state(), &SessionState::Backoff { attempt });
            session.handle(SessionEvent::BackoffElapsed);
        }
    }

    #[test]
    fn exponential_policy_gives_up() {
        let mut session = Session::new(ReconnectPolicy::Exponential {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(4),
            max_attempts: 3,
        });
        session.handle(SessionEvent::Start);

        let mut sleeps = Vec::new();
        loop {
            match session.handle(SessionEvent::SocketFailed).as_slice() {
                [Action::Sleep(d)] => sleeps.push(d.as_secs()),
                [Action::GiveUp] => break,
                other => panic!("unexpected actions {other:?}"),
            }
            session.handle(SessionEvent::BackoffElapsed);
        }
        assert_eq!(sleeps, vec![1, 2, 4]);
        assert_eq!(
            session.state(),
            &SessionState::Stopped(StopReason::RetriesExhausted)
        );
    }

    #[test]
    fn successful_open_resets_failure_count() {
        let mut session = Session::new(ReconnectPolicy::Exponential {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(60),
            max_attempts: 2,
        });
        session.handle(SessionEvent::Start);
        session.handle(SessionEvent::TokenFailed);
        session.handle(SessionEvent::BackoffElapsed);
        session.handle(SessionEvent::TokenFetched("t".into()));
        session.handle(SessionEvent::SocketOpened);
        session.handle(SessionEvent::AuthSent);

        assert_eq!(
            session.handle(SessionEvent::Closed),
            vec![Action::Sleep(Duration::from_secs(1))]
        );
    }

    #[test]
    fn shutdown_wins_from_any_state() {
        let mut session = fixed();
        session.handle(SessionEvent::Start);
        session.handle(SessionEvent::TokenFailed);
        assert!(session.handle(SessionEvent::Shutdown).is_empty());
        assert_eq!(
            session.state(),
            &SessionState::Stopped(StopReason::Shutdown)
        );
        assert!(session.handle(SessionEvent::BackoffElapsed).is_empty());
    }

    #[test]
    fn typing_requires_open_and_membership() {
        let mut session = fixed();
        session.join("general");
        assert!(session.typing("general").is_empty());
        open(&mut session);
        assert!(session.typing("random").is_empty());
        assert_eq!(
            session.typing("general"),
            vec![Action::Send(ClientFrame::Typing {
                channel_id: "general".into()
            })]
        );
    }
}
