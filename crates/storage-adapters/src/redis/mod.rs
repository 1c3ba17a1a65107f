//! # Redis session store
//!
//! Sessions are JSON blobs under `session:<id>` with a native TTL, so expiry
//! is enforced by Redis itself.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Connection, Pool, Runtime};
use domains::{Result, Session, SessionStore};
use tracing::{debug, info};

use crate::deadline::{store_error, with_deadline, DEFAULT_OP_TIMEOUT};

pub struct RedisSessionStore {
    pool: Pool,
    op_timeout: Duration,
}

impl RedisSessionStore {
    pub fn connect(redis_url: &str) -> anyhow::Result<Self> {
        let pool = Config::from_url(redis_url).create_pool(Some(Runtime::Tokio1))?;
        info!("redis pool ready");
        Ok(Self {
            pool,
            op_timeout: DEFAULT_OP_TIMEOUT,
        })
    }

    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    async fn conn(&self, op: &'static str) -> Result<Connection> {
        self.pool.get().await.map_err(store_error(op))
    }
}

fn key(id: &str) -> String {
    format!("session:{id}")
}

/// Redis rejects a zero expiry, so anything shorter than a second rounds up.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, session: Session, ttl: Duration) -> Result<()> {
        with_deadline(self.op_timeout, "put_session", async {
            let payload = serde_json::to_string(&session).map_err(store_error("put_session"))?;
            let mut conn = self.conn("put_session").await?;
            conn.set_ex::<_, _, ()>(key(&session.id), payload, ttl_secs(ttl))
                .await
                .map_err(store_error("put_session"))?;
            debug!(user_id = %session.user_id, "session stored");
            Ok(())
        })
        .await
    }

    async fn get(&self, id: &str) -> Result<Option<Session>> {
        with_deadline(self.op_timeout, "get_session", async {
            let mut conn = self.conn("get_session").await?;
            let payload: Option<String> = conn.get(key(id)).await.map_err(store_error("get_session"))?;
            payload
                .map(|raw| serde_json::from_str(&raw))
                .transpose()
                .map_err(store_error("get_session"))
        })
        .await
    }

    async fn touch(&self, id: &str, ttl: Duration) -> Result<bool> {
        with_deadline(self.op_timeout, "touch_session", async {
            let mut conn = self.conn("touch_session").await?;
            let seconds = i64::try_from(ttl_secs(ttl)).unwrap_or(i64::MAX);
            conn.expire::<_, bool>(key(id), seconds)
                .await
                .map_err(store_error("touch_session"))
        })
        .await
    }

    async fn remove(&self, id: &str) -> Result<()> {
        with_deadline(self.op_timeout, "remove_session", async {
            let mut conn = self.conn("remove_session").await?;
            conn.del::<_, ()>(key(id))
                .await
                .map_err(store_error("remove_session"))
        })
        .await
    }
}
