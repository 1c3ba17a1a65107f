//! In-memory `PostRepository`. One `RwLock` guards the whole map: every
//! mutation is a read-modify-write under the write half, reads share the lock.

use std::collections::HashMap;

use async_trait::async_trait;
use domains::{Comment, DomainError, Post, PostRepository, Result, VoteDirection};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryPostRepository {
    posts: RwLock<HashMap<String, Post>>,
}

impl MemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filtered<F>(&self, keep: F) -> Vec<Post>
    where
        F: Fn(&Post) -> bool,
    {
        self.posts
            .read()
            .await
            .values()
            .filter(|post| keep(post))
            .cloned()
            .collect()
    }

    /// Runs `change` on one post while holding the write lock.
    async fn mutate<F>(&self, post_id: &str, change: F) -> Result<Post>
    where
        F: FnOnce(&mut Post) -> Result<()>,
    {
        let mut posts = self.posts.write().await;
        let post = posts
            .get_mut(post_id)
            .ok_or_else(|| DomainError::PostNotFound(post_id.to_owned()))?;
        change(post)?;
        Ok(post.clone())
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn insert(&self, post: Post) -> Result<Post> {
        self.posts.write().await.insert(post.id.clone(), post.clone());
        Ok(post)
    }

    async fn get(&self, id: &str) -> Result<Post> {
        self.posts
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::PostNotFound(id.to_owned()))
    }

    async fn list(&self) -> Result<Vec<Post>> {
        Ok(self.filtered(|_| true).await)
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Post>> {
        Ok(self.filtered(|post| post.category == category).await)
    }

    async fn list_by_author(&self, username: &str) -> Result<Vec<Post>> {
        Ok(self.filtered(|post| post.author.username == username).await)
    }

    async fn add_comment(&self, post_id: &str, comment: Comment) -> Result<Post> {
        self.mutate(post_id, |post| {
            post.add_comment(comment);
            Ok(())
        })
        .await
    }

    async fn delete_comment(&self, post_id: &str, comment_id: &str, requester_id: &str) -> Result<Post> {
        self.mutate(post_id, |post| post.remove_comment(comment_id, requester_id))
            .await
    }

    async fn vote(&self, post_id: &str, user_id: &str, direction: VoteDirection) -> Result<Post> {
        self.mutate(post_id, |post| {
            post.apply_vote(user_id, direction);
            Ok(())
        })
        .await
    }

    async fn delete(&self, post_id: &str, requester_id: &str) -> Result<()> {
        let mut posts = self.posts.write().await;
        let post = posts
            .get(post_id)
            .ok_or_else(|| DomainError::PostNotFound(post_id.to_owned()))?;
        post.ensure_author(requester_id)?;
        posts.remove(post_id);
        Ok(())
    }
}
