use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use thiserror::Error;
use tracing::debug;

use super::session::Session;

pub const DEFAULT_MAX_SESSIONS: usize = 256;
const MAX_SESSION_ID_LEN: usize = 64;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionIdError {
    #[error("session id must not be empty")]
    Empty,
    #[error("session id must be at most 64 characters")]
    TooLong,
    #[error("session id may only contain ASCII letters, digits, '-' and '_'")]
    InvalidCharacter,
}

/// Client-chosen key for one dashboard tab.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn parse(raw: &str) -> Result<Self, SessionIdError> {
        if raw.is_empty() {
            return Err(SessionIdError::Empty);
        }
        if raw.len() > MAX_SESSION_ID_LEN {
            return Err(SessionIdError::TooLong);
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(SessionIdError::InvalidCharacter);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug)]
struct TrackedSession {
    session: Session,
    last_seen: u64,
}

/// Independent dashboard sessions keyed by client id. Once `max_sessions`
/// is reached, the least recently used session is dropped to admit a new one.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<SessionId, TrackedSession>,
    clock: AtomicU64,
    history_capacity: usize,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(history_capacity: usize, max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            clock: AtomicU64::new(0),
            history_capacity,
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Runs `f` against the session for `id`, creating it on first use.
    /// The entry stays locked for the whole call.
    pub fn with_session<R>(&self, id: &SessionId, f: impl FnOnce(&mut Session) -> R) -> R {
        if !self.sessions.contains_key(id) {
            self.evict_if_full();
        }
        let tick = self.clock.fetch_add(1, Ordering::Relaxed);
        let mut entry = self
            .sessions
            .entry(id.clone())
            .or_insert_with(|| TrackedSession {
                session: Session::new(self.history_capacity),
                last_seen: tick,
            });
        entry.last_seen = tick;
        f(&mut entry.session)
    }

    fn evict_if_full(&self) {
        while self.sessions.len() >= self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|entry| entry.value().last_seen)
                .map(|entry| entry.key().clone());
            let Some(oldest) = oldest else {
                return;
            };
            self.sessions.remove(&oldest);
            debug!(session = oldest.as_str(), "evicted idle session");
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(super::DEFAULT_HISTORY_CAPACITY, DEFAULT_MAX_SESSIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PresetName, default_inputs};

    fn id(raw: &str) -> SessionId {
        SessionId::parse(raw).expect("valid session id")
    }

    #[test]
    fn session_id_accepts_uuid_like_values() {
        let parsed = id("3f2b8c1e-9d4a-4c6e-8f00-1a2b3c4d5e6f");
        assert_eq!(parsed.as_str(), "3f2b8c1e-9d4a-4c6e-8f00-1a2b3c4d5e6f");
        assert_eq!(id("tab_1").as_str(), "tab_1");
    }

    #[test]
    fn session_id_rejects_bad_values() {
        assert_eq!(SessionId::parse(""), Err(SessionIdError::Empty));
        assert_eq!(
            SessionId::parse(&"a".repeat(65)),
            Err(SessionIdError::TooLong)
        );
        assert_eq!(
            SessionId::parse("../etc"),
            Err(SessionIdError::InvalidCharacter)
        );
        assert_eq!(
            SessionId::parse("a b"),
            Err(SessionIdError::InvalidCharacter)
        );
    }

    #[test]
    fn clients_keep_independent_sessions() {
        let store = SessionStore::default();
        let alice = id("alice");
        let bob = id("bob");

        store.with_session(&alice, |s| {
            s.on_input_changed(crate::core::StressInputs {
                rate_shock_pct: 6.0,
                ..default_inputs()
            });
        });
        let (bob_inputs, bob_history) =
            store.with_session(&bob, |s| (s.inputs(), s.history().len()));
        let (alice_inputs, alice_history) =
            store.with_session(&alice, |s| (s.inputs(), s.history().len()));

        assert_eq!(bob_inputs, default_inputs());
        assert_eq!(bob_history, 1);
        assert_eq!(alice_inputs.rate_shock_pct, 6.0);
        assert_eq!(alice_history, 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn sessions_use_configured_history_capacity() {
        let store = SessionStore::new(5, 4);
        let tab = id("tab");
        for _ in 0..10 {
            store.with_session(&tab, |s| {
                s.apply_preset(PresetName::Run);
            });
        }
        let (len, capacity) = store.with_session(&tab, |s| (s.history().len(), s.history().capacity()));
        assert_eq!(len, 5);
        assert_eq!(capacity, 5);
    }

    #[test]
    fn full_store_evicts_least_recently_used() {
        let store = SessionStore::new(30, 2);
        let a = id("a");
        let b = id("b");
        let c = id("c");

        store.with_session(&a, |_| ());
        store.with_session(&b, |_| ());
        store.with_session(&a, |_| ());
        store.with_session(&c, |_| ());

        assert_eq!(store.len(), 2);
        assert!(store.contains(&a));
        assert!(!store.contains(&b));
        assert!(store.contains(&c));
    }
}
