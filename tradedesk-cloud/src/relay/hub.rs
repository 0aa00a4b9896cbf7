//! RelayHub: connection registry, channel membership and fan-out
//!
//! All maps are keyed so that organizations never share state: a channel id
//! is only meaningful together with its organization id.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::{DashMap, DashSet};
use shared::error::ErrorCode;
use shared::realtime::{Realm, ServerFrame, TypingPayload};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::RelayIdentity;

pub type ConnectionId = u64;

/// Channel identity scoped to its organization
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelKey {
    pub organization_id: String,
    pub channel_id: String,
}

impl ChannelKey {
    pub fn new(organization_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            channel_id: channel_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct UserKey {
    realm: Realm,
    user_id: String,
}

/// Audience of a broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Current members of one organization channel
    Channel(ChannelKey),
    /// Every chat connection of both participants of a direct conversation
    DirectPair {
        organization_id: String,
        first: String,
        second: String,
    },
    /// Super-admin connections on the notifications endpoint
    SuperAdmins,
}

impl Scope {
    fn admits(&self, identity: &RelayIdentity) -> bool {
        match self {
            Scope::Channel(_) => true,
            Scope::DirectPair {
                organization_id, ..
            } => identity.organization_id.as_deref() == Some(organization_id.as_str()),
            Scope::SuperAdmins => identity.is_super_admin,
        }
    }
}

struct Connection {
    identity: RelayIdentity,
    tx: mpsc::Sender<ServerFrame>,
    /// Channel ids joined by this connection (within its organization)
    channels: HashSet<String>,
}

#[derive(Default)]
struct HubInner {
    next_id: AtomicU64,
    connections: DashMap<ConnectionId, Connection>,
    channels: DashMap<ChannelKey, HashSet<ConnectionId>>,
    users: DashMap<UserKey, HashSet<ConnectionId>>,
    super_admins: DashSet<ConnectionId>,
}

/// Process-wide relay registry, cheap to clone
#[derive(Clone)]
pub struct RelayHub {
    inner: Arc<HubInner>,
    max_connections_per_user: usize,
}

impl RelayHub {
    pub fn new(max_connections_per_user: usize) -> Self {
        Self {
            inner: Arc::new(HubInner::default()),
            max_connections_per_user: max_connections_per_user.max(1),
        }
    }

    /// Register an authenticated connection.
    ///
    /// The returned guard unregisters the connection when dropped, so every
    /// exit path of the socket task cleans up.
    pub fn register(
        &self,
        identity: RelayIdentity,
        tx: mpsc::Sender<ServerFrame>,
    ) -> Result<ConnectionGuard, ErrorCode> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let key = UserKey {
            realm: identity.realm,
            user_id: identity.user_id.clone(),
        };

        {
            // The entry guard keeps check + insert atomic for this user
            let mut ids = self.inner.users.entry(key).or_default();
            if ids.len() >= self.max_connections_per_user {
                tracing::warn!(
                    user_id = %identity.user_id,
                    realm = %identity.realm,
                    open = ids.len(),
                    "Relay connection limit reached"
                );
                return Err(ErrorCode::ConnectionLimitReached);
            }
            ids.insert(id);
        }

        if identity.realm == Realm::Notifications && identity.is_super_admin {
            self.inner.super_admins.insert(id);
        }

        self.inner.connections.insert(
            id,
            Connection {
                identity,
                tx,
                channels: HashSet::new(),
            },
        );

        Ok(ConnectionGuard {
            hub: self.clone(),
            id,
        })
    }

    /// Add a connection to a channel of its own organization.
    ///
    /// Returns `false` when nothing changed (already a member, unknown
    /// connection, or a connection without chat access).
    pub fn join(&self, id: ConnectionId, channel_id: &str) -> bool {
        let organization_id = {
            let Some(mut conn) = self.inner.connections.get_mut(&id) else {
                return false;
            };
            if conn.identity.realm != Realm::Chat {
                return false;
            }
            let Some(org) = conn.identity.organization_id.clone() else {
                return false;
            };
            if !conn.channels.insert(channel_id.to_string()) {
                return false;
            }
            org
        };

        self.inner
            .channels
            .entry(ChannelKey::new(organization_id, channel_id))
            .or_default()
            .insert(id);
        true
    }

    /// Remove a connection from a channel. Leaving a channel that was never
    /// joined is a no-op.
    pub fn leave(&self, id: ConnectionId, channel_id: &str) -> bool {
        let organization_id = {
            let Some(mut conn) = self.inner.connections.get_mut(&id) else {
                return false;
            };
            if !conn.channels.remove(channel_id) {
                return false;
            }
            conn.identity.organization_id.clone()
        };

        if let Some(org) = organization_id {
            self.remove_member(&ChannelKey::new(org, channel_id), id);
        }
        true
    }

    pub fn is_member(&self, id: ConnectionId, channel_id: &str) -> bool {
        self.inner
            .connections
            .get(&id)
            .is_some_and(|conn| conn.channels.contains(channel_id))
    }

    /// Drop every trace of a connection and prune channels left empty.
    pub fn unregister(&self, id: ConnectionId) {
        let Some((_, conn)) = self.inner.connections.remove(&id) else {
            return;
        };

        if let Some(org) = &conn.identity.organization_id {
            for channel_id in &conn.channels {
                self.remove_member(&ChannelKey::new(org.clone(), channel_id.clone()), id);
            }
        }

        let key = UserKey {
            realm: conn.identity.realm,
            user_id: conn.identity.user_id.clone(),
        };
        if let Some(mut ids) = self.inner.users.get_mut(&key) {
            ids.remove(&id);
        }
        self.inner.users.remove_if(&key, |_, ids| ids.is_empty());
        self.inner.super_admins.remove(&id);

        tracing::debug!(
            connection_id = id,
            user_id = %conn.identity.user_id,
            realm = %conn.identity.realm,
            "Relay connection unregistered"
        );
    }

    /// Deliver a frame to every connection in scope, except `except`.
    ///
    /// Never blocks: a full or closed queue skips that member only.
    /// Returns the number of connections the frame was queued for.
    pub fn broadcast(
        &self,
        scope: &Scope,
        frame: &ServerFrame,
        except: Option<ConnectionId>,
    ) -> usize {
        let mut delivered = 0;

        for id in self.targets(scope) {
            if except == Some(id) {
                continue;
            }
            let tx = match self.inner.connections.get(&id) {
                Some(conn) if scope.admits(&conn.identity) => conn.tx.clone(),
                _ => continue,
            };

            match tx.try_send(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        connection_id = id,
                        frame = frame.type_name(),
                        "Relay queue full, frame dropped for this connection"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(connection_id = id, "Relay queue closed, skipping");
                }
            }
        }

        delivered
    }

    /// Relay a typing indicator from a channel member to the other members.
    /// Ignored (returns 0) when the sender has not joined the channel.
    pub fn relay_typing(&self, id: ConnectionId, channel_id: &str) -> usize {
        let (key, payload) = {
            let Some(conn) = self.inner.connections.get(&id) else {
                return 0;
            };
            if !conn.channels.contains(channel_id) {
                return 0;
            }
            let Some(org) = conn.identity.organization_id.clone() else {
                return 0;
            };
            (
                ChannelKey::new(org, channel_id),
                TypingPayload {
                    channel_id: channel_id.to_string(),
                    user_id: conn.identity.user_id.clone(),
                    user_name: conn.identity.display_name.clone(),
                },
            )
        };

        self.broadcast(&Scope::Channel(key), &ServerFrame::Typing(payload), Some(id))
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    pub fn channel_count(&self) -> usize {
        self.inner.channels.len()
    }

    pub fn channel_members(&self, key: &ChannelKey) -> usize {
        self.inner.channels.get(key).map(|m| m.len()).unwrap_or(0)
    }

    pub fn user_connections(&self, realm: Realm, user_id: &str) -> usize {
        let key = UserKey {
            realm,
            user_id: user_id.to_string(),
        };
        self.inner.users.get(&key).map(|ids| ids.len()).unwrap_or(0)
    }

    /// Snapshot target ids so no map guard is held while sending
    fn targets(&self, scope: &Scope) -> Vec<ConnectionId> {
        match scope {
            Scope::Channel(key) => self
                .inner
                .channels
                .get(key)
                .map(|members| members.iter().copied().collect())
                .unwrap_or_default(),
            Scope::DirectPair { first, second, .. } => {
                let mut ids: Vec<ConnectionId> = Vec::new();
                for user_id in [first, second] {
                    let key = UserKey {
                        realm: Realm::Chat,
                        user_id: user_id.clone(),
                    };
                    if let Some(set) = self.inner.users.get(&key) {
                        ids.extend(set.iter().copied());
                    }
                }
                ids.sort_unstable();
                ids.dedup();
                ids
            }
            Scope::SuperAdmins => self.inner.super_admins.iter().map(|id| *id).collect(),
        }
    }

    fn remove_member(&self, key: &ChannelKey, id: ConnectionId) {
        if let Some(mut members) = self.inner.channels.get_mut(key) {
            members.remove(&id);
        }
        self.inner.channels.remove_if(key, |_, members| members.is_empty());
    }
}

/// Registration handle owned by the socket task
pub struct ConnectionGuard {
    hub: RelayHub,
    id: ConnectionId,
}

impl ConnectionGuard {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.hub.unregister(self.id);
    }
}
