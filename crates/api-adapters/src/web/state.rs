use std::sync::Arc;

use services::{AccountService, PostService, SessionService};

use crate::metrics::Metrics;

/// Which credential a deployment accepts. Only one is ever active.
#[derive(Clone)]
pub enum Credentials {
    /// `Authorization: Bearer <jwt>`, verified statelessly.
    Bearer,
    /// `session_id` cookie backed by a session store.
    Cookie(Arc<SessionService>),
}

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub accounts: Arc<AccountService>,
    pub credentials: Credentials,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(posts: PostService, accounts: AccountService, credentials: Credentials) -> Self {
        Self {
            posts: Arc::new(posts),
            accounts: Arc::new(accounts),
            credentials,
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn sessions(&self) -> Option<&Arc<SessionService>> {
        match &self.credentials {
            Credentials::Cookie(sessions) => Some(sessions),
            Credentials::Bearer => None,
        }
    }
}
