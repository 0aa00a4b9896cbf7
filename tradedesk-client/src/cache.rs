//! Bounded, persisted cache of received notifications
//!
//! A read cache only: it survives restarts so the operator sees recent
//! notifications immediately, but the server never replays from it.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use shared::realtime::Notification;

use crate::ClientResult;

pub const DEFAULT_CACHE_CAPACITY: usize = 50;

/// Fixed file name used by [`JsonFileStorage::in_dir`]
pub const NOTIFICATION_CACHE_FILE: &str = "tradedesk_notifications.json";

/// Where the cache persists its entries (newest first)
pub trait CacheStorage: Send + 'static {
    fn load(&self) -> ClientResult<Vec<Notification>>;
    fn save(&mut self, items: &[Notification]) -> ClientResult<()>;
}

/// In-memory storage; clones share the same backing list
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<Notification>) -> Self {
        Self {
            items: Arc::new(Mutex::new(items)),
        }
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl CacheStorage for MemoryStorage {
    fn load(&self) -> ClientResult<Vec<Notification>> {
        Ok(self.snapshot())
    }

    fn save(&mut self, items: &[Notification]) -> ClientResult<()> {
        *self
            .items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = items.to_vec();
        Ok(())
    }
}

/// JSON file storage, written through a temp file and renamed into place
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at `dir/` + [`NOTIFICATION_CACHE_FILE`]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(NOTIFICATION_CACHE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStorage for JsonFileStorage {
    fn load(&self) -> ClientResult<Vec<Notification>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, items: &[Notification]) -> ClientResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec(items)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Newest-first notification list holding at most `capacity` entries
#[derive(Debug)]
pub struct NotificationCache<S> {
    storage: S,
    items: VecDeque<Notification>,
    capacity: usize,
}

impl<S: CacheStorage> NotificationCache<S> {
    /// Load from storage. Unreadable storage starts an empty cache.
    pub fn load(storage: S, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut items: VecDeque<Notification> = match storage.load() {
            Ok(items) => items.into(),
            Err(e) => {
                tracing::warn!("Notification cache unreadable, starting empty: {e}");
                VecDeque::new()
            }
        };
        items.truncate(capacity);
        Self {
            storage,
            items,
            capacity,
        }
    }

    /// Insert a notification at the front, evicting the oldest beyond
    /// capacity. Duplicates (same id) are ignored. Returns whether the
    /// cache changed.
    pub fn push(&mut self, notification: Notification) -> bool {
        if self.items.iter().any(|n| n.id == notification.id) {
            return false;
        }
        self.items.push_front(notification);
        self.items.truncate(self.capacity);
        self.persist();
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    pub fn items(&self) -> Vec<Notification> {
        self.items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn persist(&mut self) {
        let items: Vec<Notification> = self.items.iter().cloned().collect();
        if let Err(e) = self.storage.save(&items) {
            tracing::warn!("Failed to persist notification cache: {e}");
        }
    }
}
