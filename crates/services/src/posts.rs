//! Post use-cases: creation, listing, comments, votes and deletion.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    Comment, DomainError, NewPostRequest, Post, PostRepository, Principal, Result, VoteDirection,
};
use tracing::{info, instrument};

use crate::utils::generate_id;

pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, request), fields(author = %author.username))]
    pub async fn create(&self, request: NewPostRequest, author: &Principal) -> Result<Post> {
        request.validate()?;
        let post = Post::new(generate_id()?, author.as_author(), request, Utc::now());
        let post = self.repo.insert(post).await?;
        info!(post_id = %post.id, category = %post.category, "post created");
        Ok(post)
    }

    pub async fn get(&self, id: &str) -> Result<Post> {
        self.repo.get(id).await
    }

    pub async fn list(&self) -> Result<Vec<Post>> {
        self.repo.list().await.map(newest_first)
    }

    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Post>> {
        self.repo.list_by_category(category).await.map(newest_first)
    }

    pub async fn list_by_user(&self, username: &str) -> Result<Vec<Post>> {
        self.repo.list_by_author(username).await.map(newest_first)
    }

    #[instrument(skip(self, body), fields(author = %author.username))]
    pub async fn add_comment(&self, post_id: &str, author: &Principal, body: &str) -> Result<Post> {
        if body.trim().is_empty() {
            return Err(DomainError::Validation("comment must not be empty".into()));
        }
        let comment = Comment {
            id: generate_id()?,
            author: author.as_author(),
            body: body.to_owned(),
            created: Utc::now(),
        };
        let comment_id = comment.id.clone();
        let post = self.repo.add_comment(post_id, comment).await?;
        info!(%comment_id, "comment added");
        Ok(post)
    }

    #[instrument(skip(self), fields(requester = %requester.username))]
    pub async fn delete_comment(&self, post_id: &str, comment_id: &str, requester: &Principal) -> Result<Post> {
        let post = self
            .repo
            .delete_comment(post_id, comment_id, &requester.user_id)
            .await?;
        info!("comment deleted");
        Ok(post)
    }

    #[instrument(skip(self), fields(voter = %voter.username))]
    pub async fn vote(&self, post_id: &str, voter: &Principal, direction: VoteDirection) -> Result<Post> {
        let post = self.repo.vote(post_id, &voter.user_id, direction).await?;
        info!(score = post.score, action = direction.as_str(), "post voted");
        Ok(post)
    }

    #[instrument(skip(self), fields(requester = %requester.username))]
    pub async fn delete(&self, post_id: &str, requester: &Principal) -> Result<()> {
        self.repo.delete(post_id, &requester.user_id).await?;
        info!("post deleted");
        Ok(())
    }
}

fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.created.cmp(&a.created));
    posts
}
