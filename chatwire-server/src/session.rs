//! In-memory chat sessions

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use chatwire_protocol::{HistoryEntry, SessionInfo};
use chatwire_utils::{ChatwireError, Result};

/// One conversation and its history
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
    /// Creation order within the manager, stable even when timestamps tie
    ordinal: u64,
    history: Vec<HistoryEntry>,
}

impl Session {
    fn new(name: impl Into<String>, ordinal: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
            ordinal,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// The last `limit` entries, or everything when `limit` is `None`
    pub fn recent(&self, limit: Option<usize>) -> &[HistoryEntry] {
        match limit {
            Some(limit) if limit < self.history.len() => &self.history[self.history.len() - limit..],
            _ => &self.history,
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Wire summary of this session
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            name: self.name.clone(),
            created_at: self.created_at.timestamp(),
            message_count: self.history.len(),
        }
    }
}

/// Manages all sessions
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<Uuid, Session>,
    next_ordinal: u64,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new session, naming it `session-N` if no name is given
    pub fn create_session(&mut self, name: Option<String>) -> &Session {
        self.next_ordinal += 1;
        let ordinal = self.next_ordinal;
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("session-{}", ordinal));

        let session = Session::new(name, ordinal);
        let id = session.id;
        self.sessions.entry(id).or_insert(session)
    }

    /// Get session by ID
    pub fn get_session(&self, session_id: Uuid) -> Option<&Session> {
        self.sessions.get(&session_id)
    }

    /// Get mutable session by ID
    pub fn get_session_mut(&mut self, session_id: Uuid) -> Option<&mut Session> {
        self.sessions.get_mut(&session_id)
    }

    /// Look up a session, failing with `SessionNotFound`
    pub fn require(&self, session_id: Uuid) -> Result<&Session> {
        self.sessions
            .get(&session_id)
            .ok_or_else(|| ChatwireError::SessionNotFound(session_id.to_string()))
    }

    /// Mutable variant of [`require`](Self::require)
    pub fn require_mut(&mut self, session_id: Uuid) -> Result<&mut Session> {
        self.sessions
            .get_mut(&session_id)
            .ok_or_else(|| ChatwireError::SessionNotFound(session_id.to_string()))
    }

    /// Remove a session
    pub fn remove_session(&mut self, session_id: Uuid) -> Result<Session> {
        self.sessions
            .remove(&session_id)
            .ok_or_else(|| ChatwireError::SessionNotFound(session_id.to_string()))
    }

    /// List all sessions, oldest first
    pub fn list_sessions(&self) -> Vec<&Session> {
        let mut sessions: Vec<&Session> = self.sessions.values().collect();
        sessions.sort_by_key(|s| s.ordinal);
        sessions
    }

    /// Get session count
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Most recently created session
    pub fn latest_session_id(&self) -> Option<Uuid> {
        self.sessions.values().max_by_key(|s| s.ordinal).map(|s| s.id)
    }

    /// Return `preferred` if it still exists, else the latest session,
    /// creating one when there are none
    pub fn resolve_active(&mut self, preferred: Option<Uuid>) -> Uuid {
        if let Some(id) = preferred.filter(|id| self.sessions.contains_key(id)) {
            return id;
        }
        match self.latest_session_id() {
            Some(id) => id,
            None => self.create_session(None).id,
        }
    }
}
