use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use domains::{Result, Session, SessionStore};

struct Entry {
    session: Session,
    expires_at: Instant,
}

/// Process-local sessions. Expired entries are dropped when looked up and
/// swept out on every `put`.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<String, Entry>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, session: Session, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        self.sessions.retain(|_, entry| entry.expires_at > now);

        let entry = Entry {
            expires_at: now + ttl,
            session,
        };
        self.sessions.insert(entry.session.id.clone(), entry);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Session>> {
        let now = Instant::now();
        self.sessions.remove_if(id, |_, entry| entry.expires_at <= now);
        Ok(self.sessions.get(id).map(|entry| entry.session.clone()))
    }

    async fn touch(&self, id: &str, ttl: Duration) -> Result<bool> {
        let now = Instant::now();
        match self.sessions.get_mut(id) {
            Some(mut entry) if entry.expires_at > now => {
                entry.expires_at = now + ttl;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.sessions.remove(id);
        Ok(())
    }
}
