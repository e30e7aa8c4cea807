use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use super::Session;

pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("session limit of {0} reached")]
pub struct SessionLimitReached(pub usize);

/// Live sessions keyed by id. Each session sits behind its own lock, so two
/// sessions never contend and never see each other's data.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
        }
    }

    pub async fn create(&self) -> Result<Uuid, SessionLimitReached> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_sessions {
            warn!(max = self.max_sessions, "session limit reached");
            return Err(SessionLimitReached(self.max_sessions));
        }
        let id = Uuid::new_v4();
        sessions.insert(id, Arc::new(Mutex::new(Session::new(id))));
        info!(session_id = %id, live = sessions.len(), "session created");
        Ok(id)
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(&id).is_some();
        if removed {
            info!(session_id = %id, live = sessions.len(), "session ended");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
