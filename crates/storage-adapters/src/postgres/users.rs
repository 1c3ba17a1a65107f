use std::time::Duration;

use async_trait::async_trait;
use domains::{DomainError, Result, User, UserRepository};
use sqlx::{
    postgres::{PgPool, PgRow},
    Row,
};
use tracing::debug;

use crate::deadline::{store_error, with_deadline, DEFAULT_OP_TIMEOUT};

pub struct PgUserRepository {
    pool: PgPool,
    op_timeout: Duration,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }
}

fn user_from_row(row: &PgRow) -> std::result::Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl UserRepository for PgUserRepository {
    /// Pre-checks the username, then inserts. Two processes racing past the
    /// pre-check are still separated by the UNIQUE constraint.
    async fn create(&self, user: User) -> Result<User> {
        with_deadline(self.op_timeout, "create_user", async {
            let taken: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                    .bind(&user.username)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(store_error("create_user"))?;
            if taken {
                return Err(DomainError::AlreadyExists(user.username.clone()));
            }

            let inserted = sqlx::query("INSERT INTO users (id, username, password_hash) VALUES ($1, $2, $3)")
                .bind(&user.id)
                .bind(&user.username)
                .bind(&user.password_hash)
                .execute(&self.pool)
                .await;

            match inserted {
                Ok(_) => {
                    debug!(user_id = %user.id, "user inserted");
                    Ok(())
                }
                Err(err) if is_unique_violation(&err) => {
                    Err(DomainError::AlreadyExists(user.username.clone()))
                }
                Err(err) => Err(store_error("create_user")(err)),
            }
        })
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        with_deadline(self.op_timeout, "find_user", async {
            let row = sqlx::query("SELECT id, username, password_hash FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(store_error("find_user"))?;

            row.as_ref()
                .map(user_from_row)
                .transpose()
                .map_err(store_error("find_user"))
        })
        .await
    }
}
