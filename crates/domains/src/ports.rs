//! # Ports
//!
//! Any adapter must implement these traits to be wired into the binary.
//! Handlers and services only ever see `Arc<dyn Port>`.

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::{Comment, Post, Principal, Session, User, VoteDirection};

/// Persistence contract for posts and everything embedded in them.
///
/// Mutations are read-modify-write on a single post; implementations must
/// make each call atomic with respect to other calls on the same post.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: Post) -> Result<Post>;
    async fn get(&self, id: &str) -> Result<Post>;
    async fn list(&self) -> Result<Vec<Post>>;
    async fn list_by_category(&self, category: &str) -> Result<Vec<Post>>;
    async fn list_by_author(&self, username: &str) -> Result<Vec<Post>>;

    /// Appends `comment` and returns the updated post.
    async fn add_comment(&self, post_id: &str, comment: Comment) -> Result<Post>;

    /// See [`Post::remove_comment`] for the ownership rule.
    async fn delete_comment(&self, post_id: &str, comment_id: &str, requester_id: &str) -> Result<Post>;

    /// See [`Post::apply_vote`] for the tallying rules.
    async fn vote(&self, post_id: &str, user_id: &str, direction: VoteDirection) -> Result<Post>;

    /// Removes the post if `requester_id` is its author.
    async fn delete(&self, post_id: &str, requester_id: &str) -> Result<()>;
}

/// Account storage. Usernames are unique.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts `user`, failing with `AlreadyExists` if the username is taken.
    async fn create(&self, user: User) -> Result<User>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
}

/// Key-value storage for cookie sessions with expiry.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(&self, session: Session, ttl: Duration) -> Result<()>;
    /// `None` when the id is unknown or expired.
    async fn get(&self, id: &str) -> Result<Option<Session>>;
    /// Pushes the expiry `ttl` into the future. Returns `false` if the session is gone.
    async fn touch(&self, id: &str, ttl: Duration) -> Result<bool>;
    async fn remove(&self, id: &str) -> Result<()>;
}

/// Issues and verifies self-contained bearer credentials.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &User) -> Result<String>;
    /// Fails with `Unauthorized` on a bad signature, expiry or malformed claims.
    fn verify(&self, token: &str) -> Result<Principal>;
}

/// One-way password storage.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;
    fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}
