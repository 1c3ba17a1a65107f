//! # Postgres adapters
//!
//! Accounts live in a relational `users` table. Posts are stored as JSONB
//! documents, with the scalar columns needed for filtering kept alongside.

mod posts;
mod users;

pub use posts::PgPostRepository;
pub use users::PgUserRepository;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

/// Opens a bounded pool and applies pending migrations.
pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!(max_connections, "postgres pool ready");

    Ok(pool)
}
