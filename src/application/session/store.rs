//! Session store: server-side state behind the session cookie

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{debug, info};

use crate::infrastructure::crypto::session_token::{generate_session_token, hash_session_token};

/// What a logged-in session knows about its user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub user_id: String,
    pub username: String,
    pub email: String,
}

struct SessionEntry {
    data: SessionData,
    expires_at: DateTime<Utc>,
}

impl SessionEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Thread-safe session store keyed by the SHA-256 of the cookie token
pub struct SessionStore {
    sessions: DashMap<String, SessionEntry>,
    ttl: Duration,
}

/// Shared, reference-counted session store
pub type SharedSessionStore = Arc<SessionStore>;

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Wrap in `Arc` for shared ownership
    pub fn shared(ttl: Duration) -> SharedSessionStore {
        Arc::new(Self::new(ttl))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session and return the raw token for the cookie.
    ///
    /// A TTL reaching past the representable range never expires.
    pub fn create(&self, data: SessionData) -> String {
        let token = generate_session_token();
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        debug!(user_id = %data.user_id, "Session created");
        self.sessions
            .insert(hash_session_token(&token), SessionEntry { data, expires_at });
        token
    }

    /// Look up a live session. Expired entries are dropped on sight.
    pub fn get(&self, token: &str) -> Option<SessionData> {
        let key = hash_session_token(token);
        let now = Utc::now();
        {
            let entry = self.sessions.get(&key)?;
            if !entry.is_expired(now) {
                return Some(entry.data.clone());
            }
        }
        self.sessions.remove_if(&key, |_, e| e.is_expired(now));
        None
    }

    /// End a session. Returns whether one existed.
    pub fn destroy(&self, token: &str) -> bool {
        self.sessions.remove(&hash_session_token(token)).is_some()
    }

    /// Remove every expired session, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, e| !e.is_expired(now));
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            info!(purged, "Expired sessions purged");
        }
        purged
    }

    /// Number of sessions currently held, including not-yet-swept expired ones
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> SessionData {
        SessionData {
            user_id: "u-1".into(),
            username: "john_doe".into(),
            email: "john.doe@example.com".into(),
        }
    }

    #[test]
    fn create_then_get() {
        let store = SessionStore::new(Duration::hours(1));
        let token = store.create(data());
        assert_eq!(store.get(&token), Some(data()));
        assert_eq!(store.active_count(), 1);
    }

    #[test]
    fn unknown_token_has_no_session() {
        let store = SessionStore::new(Duration::hours(1));
        store.create(data());
        assert_eq!(store.get("not-a-token"), None);
    }

    #[test]
    fn raw_token_is_not_a_key() {
        let store = SessionStore::new(Duration::hours(1));
        let token = store.create(data());
        assert!(!store.sessions.contains_key(&token));
        assert!(store.sessions.contains_key(&hash_session_token(&token)));
    }

    #[test]
    fn destroy_ends_session() {
        let store = SessionStore::new(Duration::hours(1));
        let token = store.create(data());
        assert!(store.destroy(&token));
        assert!(!store.destroy(&token));
        assert_eq!(store.get(&token), None);
    }

    #[test]
    fn expired_sessions_are_invisible_and_purged() {
        let store = SessionStore::new(Duration::seconds(-1));
        let a = store.create(data());
        store.create(data());

        assert_eq!(store.get(&a), None);
        assert_eq!(store.active_count(), 1);
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn huge_ttl_does_not_overflow() {
        // ~287k years, beyond the largest representable date
        let store = SessionStore::new(Duration::weeks(15_000_000));
        let token = store.create(data());
        assert_eq!(store.get(&token), Some(data()));
        assert_eq!(store.purge_expired(), 0);
    }

    #[test]
    fn purge_keeps_live_sessions() {
        let store = SessionStore::new(Duration::hours(1));
        let token = store.create(data());
        assert_eq!(store.purge_expired(), 0);
        assert!(store.get(&token).is_some());
    }
}
