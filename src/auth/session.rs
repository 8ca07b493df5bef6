//! Per-login-attempt OAuth state, keyed by browser session id

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use super::models::SocialLoginType;

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "BOARD_SESSION";

/// Pending login attempts held at once before the oldest are evicted
pub const DEFAULT_MAX_PENDING_STATES: usize = 10_000;

/// Anti-forgery state bound to one login attempt
#[derive(Debug, Clone)]
pub struct OAuthState {
    pub value: String,
    pub login_type: SocialLoginType,
    pub issued_at: DateTime<Utc>,
}

impl OAuthState {
    pub fn generate(login_type: SocialLoginType) -> Self {
        Self {
            value: Uuid::new_v4().to_string(),
            login_type,
            issued_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.issued_at);
        age.to_std().map(|age| age > ttl).unwrap_or(false)
    }
}

pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Storage for OAuth state
///
/// A session holds at most one live state: `put` replaces whatever was there,
/// `take` hands it out once and forgets it.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(&self, session_id: &str, state: OAuthState);

    async fn take(&self, session_id: &str) -> Option<OAuthState>;
}

/// Process-local session store
///
/// Bounded: once `max_entries` attempts are pending, storing a new session
/// evicts the oldest one.
#[derive(Debug)]
pub struct InMemorySessionStore {
    states: RwLock<HashMap<String, OAuthState>>,
    ttl: Duration,
    max_entries: usize,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self::with_max_entries(ttl, DEFAULT_MAX_PENDING_STATES)
    }

    pub fn with_max_entries(ttl: Duration, max_entries: usize) -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put(&self, session_id: &str, state: OAuthState) {
        let mut states = self.states.write().await;
        // abandoned attempts never reach `take`; sweep them here
        let ttl = self.ttl;
        states.retain(|_, s| !s.is_stale(ttl));

        if !states.contains_key(session_id) && states.len() >= self.max_entries {
            let oldest = states
                .iter()
                .min_by_key(|(_, s)| s.issued_at)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                warn!(max_entries = self.max_entries, "OAuth state store full, evicting oldest");
                states.remove(&oldest);
            }
        }

        states.insert(session_id.to_string(), state);
        debug!(sessions = states.len(), "Stored OAuth state");
    }

    async fn take(&self, session_id: &str) -> Option<OAuthState> {
        let state = self.states.write().await.remove(session_id)?;
        if state.is_stale(self.ttl) {
            debug!("Discarding stale OAuth state");
            return None;
        }
        Some(state)
    }
}
