use nanoid::nanoid;
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use super::MemoryStore;

struct Entry {
    store: Arc<MemoryStore>,
    last_seen: Instant,
}

/// One in-memory note collection per client session.
///
/// Sessions idle for longer than `idle_timeout` are dropped, together with
/// their notes.
pub struct SessionStores {
    sessions: Mutex<HashMap<String, Entry>>,
    idle_timeout: Duration,
}

/// A collection handed out for a request that carried no live session. It is
/// only registered once it holds notes.
pub struct PendingSession {
    pub id: String,
    pub store: Arc<MemoryStore>,
}

impl SessionStores {
    pub fn new(idle_timeout: Duration) -> Self {
        SessionStores {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// The live collection for `session_id`, refreshing its idle timer.
    pub fn lookup(&self, session_id: &str) -> Option<Arc<MemoryStore>> {
        let mut sessions = self.sessions.lock();
        let expired = match sessions.get_mut(session_id) {
            Some(entry) if entry.last_seen.elapsed() < self.idle_timeout => {
                entry.last_seen = Instant::now();
                return Some(entry.store.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            sessions.remove(session_id);
            log::debug!("note session {} expired", session_id);
        }
        None
    }

    /// An unregistered collection under a fresh session id.
    pub fn pending(&self) -> PendingSession {
        let sessions = self.sessions.lock();
        let id = loop {
            let candidate = nanoid!();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };

        PendingSession {
            id,
            store: Arc::new(MemoryStore::default()),
        }
    }

    /// Registers `pending` if it holds notes, sweeping expired sessions on the
    /// way. Returns whether the client has to be told the session id.
    pub fn register(&self, pending: PendingSession) -> bool {
        if pending.store.is_empty() {
            return false;
        }

        let mut sessions = self.sessions.lock();
        let idle_timeout = self.idle_timeout;
        sessions.retain(|_, entry| entry.last_seen.elapsed() < idle_timeout);
        sessions.insert(
            pending.id.clone(),
            Entry {
                store: pending.store,
                last_seen: Instant::now(),
            },
        );
        log::debug!("opened note session {}", pending.id);
        true
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}
