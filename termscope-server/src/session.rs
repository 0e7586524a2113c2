//! Conversation session store
//!
//! Process-local, bounded map from opaque session id to turn history.
//! Bounded two ways: sessions idle past the TTL are pruned on access, and
//! inserting beyond `max_sessions` evicts the least-recently-used session.
//!
//! The lock is only held for map bookkeeping, never across a gateway call.
//! Concurrent exchanges on the same session are not serialized.

use std::collections::HashMap;
use std::time::Duration;
use termscope_common::config::SessionConfig;
use termscope_common::Turn;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

/// Turns kept per session after each append (10 exchanges)
pub const MAX_STORED_TURNS: usize = 20;

/// Turns replayed to the model per request
pub const REPLAY_TURNS: usize = 10;

#[derive(Debug)]
struct Session {
    turns: Vec<Turn>,
    last_access: Instant,
}

impl Session {
    fn new(now: Instant) -> Self {
        Self {
            turns: Vec::new(),
            last_access: now,
        }
    }
}

/// Session opened for one chatbot exchange
#[derive(Debug, Clone)]
pub struct OpenedSession {
    pub id: String,
    /// At most the last [`REPLAY_TURNS`] turns, oldest first
    pub recent_turns: Vec<Turn>,
    /// True when the id was minted for this request
    pub created: bool,
}

/// Bounded in-memory session store
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    max_sessions: usize,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_sessions: config.max_sessions.max(1),
            idle_ttl: Duration::from_secs(config.idle_ttl_secs),
        }
    }

    /// Look up a live session or mint a fresh one.
    ///
    /// An absent, empty, unknown or expired id yields a new random id with an
    /// empty history.
    pub async fn open(&self, session_id: Option<&str>) -> OpenedSession {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        self.prune_expired(&mut sessions, now);

        if let Some(id) = session_id.filter(|id| !id.is_empty()) {
            if let Some(session) = sessions.get_mut(id) {
                session.last_access = now;
                let start = session.turns.len().saturating_sub(REPLAY_TURNS);
                return OpenedSession {
                    id: id.to_string(),
                    recent_turns: session.turns[start..].to_vec(),
                    created: false,
                };
            }
            tracing::debug!(session_id = %id, "Unknown session id, minting a new session");
        }

        let id = Uuid::new_v4().to_string();
        if sessions.len() >= self.max_sessions {
            evict_least_recent(&mut sessions);
        }
        sessions.insert(id.clone(), Session::new(now));

        OpenedSession {
            id,
            recent_turns: Vec::new(),
            created: true,
        }
    }

    /// Record one successful exchange: user turn, then assistant turn, then
    /// truncate to the most recent [`MAX_STORED_TURNS`].
    ///
    /// Returns false when the session was reset or evicted mid-exchange; the
    /// exchange is then discarded.
    pub async fn append_exchange(&self, session_id: &str, user: Turn, assistant: Turn) -> bool {
        let mut sessions = self.sessions.lock().await;
        let Some(session) = sessions.get_mut(session_id) else {
            tracing::debug!(session_id = %session_id, "Session gone before append, discarding exchange");
            return false;
        };

        session.turns.push(user);
        session.turns.push(assistant);
        let excess = session.turns.len().saturating_sub(MAX_STORED_TURNS);
        if excess > 0 {
            session.turns.drain(..excess);
        }
        session.last_access = Instant::now();
        true
    }

    /// Full stored history; empty for unknown or expired ids
    pub async fn history(&self, session_id: &str) -> Vec<Turn> {
        let mut sessions = self.sessions.lock().await;
        self.prune_expired(&mut sessions, Instant::now());
        sessions
            .get(session_id)
            .map(|s| s.turns.clone())
            .unwrap_or_default()
    }

    /// Remove a session; no-op for unknown ids
    pub async fn reset(&self, session_id: &str) -> bool {
        self.sessions.lock().await.remove(session_id).is_some()
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        self.prune_expired(&mut sessions, Instant::now());
        sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn prune_expired(&self, sessions: &mut HashMap<String, Session>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, s| now.duration_since(s.last_access) < self.idle_ttl);
        let expired = before - sessions.len();
        if expired > 0 {
            tracing::debug!(expired, "Pruned idle sessions");
        }
    }
}

fn evict_least_recent(sessions: &mut HashMap<String, Session>) {
    let oldest = sessions
        .iter()
        .min_by_key(|(_, s)| s.last_access)
        .map(|(id, _)| id.clone());
    if let Some(id) = oldest {
        sessions.remove(&id);
        tracing::debug!(session_id = %id, "Evicted least-recently-used session");
    }
}
