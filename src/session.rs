//! Survey session state
//!
//! Each rater gets one in-process session keyed by participant id. The
//! session is nothing more than a forward-only cursor over the instance
//! dataset: -1 is the welcome screen, [0, N) is an active instance, and
//! anything past the end is the completion screen. Progress is deliberately
//! not persisted; a process restart starts every rater over, and the UI
//! warns about this up front.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

/// Which screen a session should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Welcome,
    /// Index of the instance currently under review
    Active(usize),
    Complete,
}

/// Per-participant session state, process-local and never persisted
#[derive(Debug, Clone)]
pub struct SessionState {
    pub participant_id: String,
    /// -1 before the survey starts; monotonically non-decreasing after
    pub current_index: i64,
}

impl SessionState {
    pub fn new(participant_id: String) -> Self {
        Self {
            participant_id,
            current_index: -1,
        }
    }

    /// Screen to show for a dataset of `total` instances
    pub fn phase(&self, total: usize) -> Phase {
        if self.current_index < 0 {
            Phase::Welcome
        } else if (self.current_index as usize) < total {
            Phase::Active(self.current_index as usize)
        } else {
            Phase::Complete
        }
    }

    /// Welcome -> Active(0); already-started sessions are left alone
    pub fn start(&mut self) {
        if self.current_index < 0 {
            self.current_index = 0;
        }
    }

    /// Active(i) -> Active(i+1) or Complete; Complete is terminal
    pub fn advance(&mut self, total: usize) {
        if matches!(self.phase(total), Phase::Active(_)) {
            self.current_index += 1;
        }
    }
}

/// Shared map of live sessions, keyed by participant id
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, SessionState>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the session for an identity hint, creating it on first
    /// contact. A missing hint gets a generated participant id.
    pub async fn get_or_create(&self, identity_hint: Option<String>) -> SessionState {
        let participant_id =
            identity_hint.unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut sessions = self.inner.write().await;
        sessions
            .entry(participant_id.clone())
            .or_insert_with(|| SessionState::new(participant_id))
            .clone()
    }

    /// Snapshot of an existing session, if any
    pub async fn get(&self, participant_id: &str) -> Option<SessionState> {
        self.inner.read().await.get(participant_id).cloned()
    }

    /// Start the session (creating it on first contact) and return the
    /// updated snapshot.
    pub async fn start(&self, participant_id: &str) -> SessionState {
        let mut sessions = self.inner.write().await;
        let session = sessions
            .entry(participant_id.to_string())
            .or_insert_with(|| SessionState::new(participant_id.to_string()));
        session.start();
        session.clone()
    }

    /// Advance the session past `expected_index`, but only if that instance
    /// is still the one under review. Returns the updated snapshot, or None
    /// when the index is stale (a repeated or out-of-order submission).
    pub async fn advance_from(
        &self,
        participant_id: &str,
        expected_index: usize,
        total: usize,
    ) -> Option<SessionState> {
        let mut sessions = self.inner.write().await;
        let session = sessions.get_mut(participant_id)?;
        if session.phase(total) != Phase::Active(expected_index) {
            return None;
        }
        session.advance(total);
        Some(session.clone())
    }
}
