//! In-memory store of refund wizard sessions.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::refund::RefundWorkflow;

/// One browser's wizard run
#[derive(Debug, Clone)]
pub struct Session {
    pub workflow: RefundWorkflow,
    /// When the in-flight email lookup or submission started
    pub busy_since: Option<DateTime<Utc>>,
    pub last_touched: DateTime<Utc>,
}

impl Session {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            workflow: RefundWorkflow::new(),
            busy_since: None,
            last_touched: now,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy_since.is_some()
    }

    pub fn mark_busy(&mut self, now: DateTime<Utc>) {
        self.busy_since = Some(now);
    }

    pub fn clear_busy(&mut self) {
        self.busy_since = None;
    }

    /// Idle longer than `ttl`, or stuck busy longer than `ttl`
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match self.busy_since {
            Some(since) => now - since > ttl,
            None => now - self.last_touched > ttl,
        }
    }
}

/// Sessions keyed by id
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<Uuid, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh session
    pub fn create(&mut self, now: DateTime<Utc>) -> (Uuid, &mut Session) {
        let id = Uuid::new_v4();
        let session = self.sessions.entry(id).or_insert_with(|| Session::new(now));
        (id, session)
    }

    /// Get a session that has not expired, refreshing its idle timer.
    /// An expired session is dropped and reported as missing.
    pub fn live_mut(&mut self, id: Uuid, ttl: Duration, now: DateTime<Utc>) -> Option<&mut Session> {
        let expired = self.sessions.get(&id)?.is_expired(ttl, now);
        if expired {
            self.sessions.remove(&id);
            tracing::debug!(%id, "refund session expired");
            return None;
        }

        let session = self.sessions.get_mut(&id)?;
        session.last_touched = now;
        Some(session)
    }

    /// Get a session without expiry checks or touching it
    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Session> {
        self.sessions.remove(&id)
    }

    /// Drop every expired session, returning how many were dropped
    pub fn purge_expired(&mut self, ttl: Duration, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.is_expired(ttl, now));
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
