//! Session state kept on the server, keyed by the id of the session
//! cookie (which `rouille::session` takes care of).
//!
//! Entries expire like the cookie does: after `SESSION_TIMEOUT_SECS`
//! without a request.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

/// Lifetime of the session cookie and of unused server side entries.
pub const SESSION_TIMEOUT_SECS: u64 = 3600;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionData {
    /// Logged in user name.
    pub user: Option<String>,
    /// Language preference, a language code.
    pub lang: Option<String>,
}

impl SessionData {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Debug)]
struct Entry {
    data: SessionData,
    last_seen: Instant,
}

#[derive(Debug)]
pub struct SessionStore {
    timeout: Duration,
    sessions: Mutex<HashMap<String, Entry>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        SessionStore::with_timeout(Duration::from_secs(SESSION_TIMEOUT_SECS))
    }
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        SessionStore { timeout, sessions: Mutex::new(HashMap::new()) }
    }

    /// A copy of the session's data (empty for unknown or expired
    /// ids). Counts as use of the session.
    pub fn snapshot(&self, id: &str) -> SessionData {
        self.snapshot_at(id, Instant::now())
    }

    pub fn snapshot_at(&self, id: &str, now: Instant) -> SessionData {
        let mut m = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        match m.get_mut(id) {
            Some(entry) if now.saturating_duration_since(entry.last_seen) <= self.timeout => {
                entry.last_seen = now;
                entry.data.clone()
            }
            Some(_) => {
                m.remove(id);
                SessionData::default()
            }
            None => SessionData::default(),
        }
    }

    /// Store the data; an empty session is removed. Drops expired
    /// entries.
    pub fn store(&self, id: &str, data: SessionData) {
        self.store_at(id, data, Instant::now())
    }

    pub fn store_at(&self, id: &str, data: SessionData, now: Instant) {
        let mut m = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let before = m.len();
        m.retain(|_, entry| now.saturating_duration_since(entry.last_seen) <= self.timeout);
        if m.len() < before {
            debug!("dropped {} expired sessions", before - m.len());
        }
        if data == SessionData::default() {
            m.remove(id);
        } else {
            m.insert(id.to_string(), Entry { data, last_seen: now });
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
