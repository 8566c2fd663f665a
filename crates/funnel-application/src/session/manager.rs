use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use funnel_core::flow::FlowRenderer;
use funnel_core::{FunnelError, Result};

use super::factory::SessionFactory;
use super::runner::FunnelSession;

/// Listing entry for a live session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInfo {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub current_step: usize,
}

/// Keeps the live sessions of one process.
///
/// `SessionManager` is responsible for:
/// - Creating sessions through a [`SessionFactory`]
/// - Looking sessions up by id
/// - Closing sessions, which stops their animations
pub struct SessionManager {
    /// In-memory sessions by id
    sessions: Arc<RwLock<HashMap<String, FunnelSession>>>,
    factory: SessionFactory,
}

impl SessionManager {
    pub fn new(factory: SessionFactory) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            factory,
        }
    }

    pub fn factory(&self) -> &SessionFactory {
        &self.factory
    }

    /// Creates and registers a new session.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial address is invalid.
    pub async fn create_session(&self, renderer: Arc<dyn FlowRenderer>, address: Option<&str>) -> Result<FunnelSession> {
        let session = self.factory.create_session(renderer, address)?;

        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id().to_string(), session.clone());

        Ok(session)
    }

    pub async fn get(&self, session_id: &str) -> Option<FunnelSession> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Closes and forgets a session.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no session has this id.
    pub async fn close_session(&self, session_id: &str) -> Result<()> {
        let session = self
            .sessions
            .write()
            .await
            .remove(session_id)
            .ok_or_else(|| FunnelError::not_found("session", session_id))?;
        session.close();
        Ok(())
    }

    /// Live sessions, oldest first.
    pub async fn list_sessions(&self) -> Vec<SessionInfo> {
        let sessions = self.sessions.read().await;
        let mut infos: Vec<SessionInfo> = sessions
            .values()
            .map(|session| SessionInfo {
                id: session.id().to_string(),
                created_at: session.created_at(),
                current_step: session.current_index(),
            })
            .collect();
        infos.sort_by_key(|info| info.created_at);
        infos
    }

    /// Closes every session.
    pub async fn shutdown(&self) {
        let mut sessions = self.sessions.write().await;
        for (_, session) in sessions.drain() {
            session.close();
        }
    }
}
