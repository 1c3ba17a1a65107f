//! Document-style post storage.
//!
//! Each mutation runs in one transaction that locks the row with
//! `SELECT … FOR UPDATE`, applies the domain rule in Rust and writes the
//! whole document back.

use std::time::Duration;

use async_trait::async_trait;
use domains::{Comment, DomainError, Post, PostRepository, Result, VoteDirection};
use sqlx::{postgres::PgPool, types::Json};
use tracing::debug;

use crate::deadline::{store_error, with_deadline, DEFAULT_OP_TIMEOUT};

const SELECT_ALL: &str = "SELECT document FROM posts ORDER BY created_at DESC";
const SELECT_BY_CATEGORY: &str =
    "SELECT document FROM posts WHERE category = $1 ORDER BY created_at DESC";
const SELECT_BY_AUTHOR: &str =
    "SELECT document FROM posts WHERE author_username = $1 ORDER BY created_at DESC";

pub struct PgPostRepository {
    pool: PgPool,
    op_timeout: Duration,
}

impl PgPostRepository {
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

    async fn fetch_many(&self, op: &'static str, sql: &'static str, filter: Option<&str>) -> Result<Vec<Post>> {
        with_deadline(self.op_timeout, op, async {
            let mut query = sqlx::query_scalar::<_, Json<Post>>(sql);
            if let Some(value) = filter {
                query = query.bind(value);
            }
            let rows = query.fetch_all(&self.pool).await.map_err(store_error(op))?;
            debug!(op, count = rows.len(), "fetched posts");
            Ok(rows.into_iter().map(|Json(post)| post).collect())
        })
        .await
    }

    /// Locks the document, lets `change` edit it and persists the result.
    async fn mutate<F>(&self, op: &'static str, post_id: &str, change: F) -> Result<Post>
    where
        F: FnOnce(&mut Post) -> Result<()> + Send,
    {
        with_deadline(self.op_timeout, op, async {
            let mut tx = self.pool.begin().await.map_err(store_error(op))?;

            let Json(mut post) = sqlx::query_scalar::<_, Json<Post>>(
                "SELECT document FROM posts WHERE id = $1 FOR UPDATE",
            )
            .bind(post_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_error(op))?
            .ok_or_else(|| DomainError::PostNotFound(post_id.to_owned()))?;

            // An Err here drops `tx`, which rolls back.
            change(&mut post)?;

            sqlx::query("UPDATE posts SET document = $2 WHERE id = $1")
                .bind(post_id)
                .bind(Json(&post))
                .execute(&mut *tx)
                .await
                .map_err(store_error(op))?;

            tx.commit().await.map_err(store_error(op))?;
            debug!(op, post_id, "post updated");
            Ok(post)
        })
        .await
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn insert(&self, post: Post) -> Result<Post> {
        with_deadline(self.op_timeout, "insert_post", async {
            sqlx::query(
                "INSERT INTO posts (id, category, author_username, created_at, document) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&post.id)
            .bind(&post.category)
            .bind(&post.author.username)
            .bind(post.created)
            .bind(Json(&post))
            .execute(&self.pool)
            .await
            .map_err(store_error("insert_post"))?;
            debug!(post_id = %post.id, "post inserted");
            Ok(())
        })
        .await?;
        Ok(post)
    }

    async fn get(&self, id: &str) -> Result<Post> {
        with_deadline(self.op_timeout, "get_post", async {
            sqlx::query_scalar::<_, Json<Post>>("SELECT document FROM posts WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(store_error("get_post"))?
                .map(|Json(post)| post)
                .ok_or_else(|| DomainError::PostNotFound(id.to_owned()))
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Post>> {
        self.fetch_many("list_posts", SELECT_ALL, None).await
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Post>> {
        self.fetch_many("list_posts_by_category", SELECT_BY_CATEGORY, Some(category))
            .await
    }

    async fn list_by_author(&self, username: &str) -> Result<Vec<Post>> {
        self.fetch_many("list_posts_by_author", SELECT_BY_AUTHOR, Some(username))
            .await
    }

    async fn add_comment(&self, post_id: &str, comment: Comment) -> Result<Post> {
        self.mutate("add_comment", post_id, |post| {
            post.add_comment(comment);
            Ok(())
        })
        .await
    }

    async fn delete_comment(&self, post_id: &str, comment_id: &str, requester_id: &str) -> Result<Post> {
        self.mutate("delete_comment", post_id, |post| {
            post.remove_comment(comment_id, requester_id)
        })
        .await
    }

    async fn vote(&self, post_id: &str, user_id: &str, direction: VoteDirection) -> Result<Post> {
        self.mutate("vote_post", post_id, |post| {
            post.apply_vote(user_id, direction);
            Ok(())
        })
        .await
    }

    async fn delete(&self, post_id: &str, requester_id: &str) -> Result<()> {
        with_deadline(self.op_timeout, "delete_post", async {
            let mut tx = self.pool.begin().await.map_err(store_error("delete_post"))?;

            let author_id: String = sqlx::query_scalar(
                "SELECT document->'author'->>'id' FROM posts WHERE id = $1 FOR UPDATE",
            )
            .bind(post_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_error("delete_post"))?
            .ok_or_else(|| DomainError::PostNotFound(post_id.to_owned()))?;

            if author_id != requester_id {
                return Err(DomainError::Unauthorized(format!(
                    "user {requester_id} is not the author of post {post_id}"
                )));
            }

            sqlx::query("DELETE FROM posts WHERE id = $1")
                .bind(post_id)
                .execute(&mut *tx)
                .await
                .map_err(store_error("delete_post"))?;

            tx.commit().await.map_err(store_error("delete_post"))?;
            debug!(post_id, "post deleted");
            Ok(())
        })
        .await
    }
}
