//! Cookie session lifecycle over a [`SessionStore`].

use std::sync::Arc;
use std::time::Duration;

use domains::{DomainError, Result, Session, SessionStore, User};
use tracing::{debug, info};

use crate::utils::generate_session_id;

pub struct SessionService {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Sliding lifetime applied on creation and on every touch.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn create(&self, user: &User) -> Result<Session> {
        let session = Session {
            id: generate_session_id()?,
            user_id: user.id.clone(),
            username: user.username.clone(),
        };
        self.store.put(session.clone(), self.ttl).await?;
        info!(user_id = %session.user_id, "session created");
        Ok(session)
    }

    /// Resolves the id carried by the request cookie.
    pub async fn check(&self, session_id: Option<&str>) -> Result<Session> {
        let id = session_id.ok_or(DomainError::NoSession)?;
        self.store.get(id).await?.ok_or(DomainError::NoSession)
    }

    /// Slides the expiry forward. `Ok(false)` if the session no longer exists.
    pub async fn touch(&self, session_id: &str) -> Result<bool> {
        let alive = self.store.touch(session_id, self.ttl).await?;
        debug!(alive, "session touched");
        Ok(alive)
    }

    pub async fn destroy(&self, session_id: &str) -> Result<()> {
        self.store.remove(session_id).await?;
        info!("session destroyed");
        Ok(())
    }
}
