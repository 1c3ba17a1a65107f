//! Account use-cases: registration, login and bearer token verification.

use std::sync::Arc;

use domains::{DomainError, PasswordHasher, Principal, Result, TokenIssuer, User, UserRepository};
use tracing::{info, instrument, warn};

use crate::utils::generate_id;

/// A user together with the signed token handed back to the client.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub user: User,
    pub token: String,
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self { users, hasher, tokens }
    }

    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<AuthOutcome> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(DomainError::Validation("username and password are required".into()));
        }
        if self.users.find_by_username(username).await?.is_some() {
            return Err(DomainError::AlreadyExists(username.to_owned()));
        }

        let user = User {
            id: generate_id()?,
            username: username.to_owned(),
            password_hash: self.hasher.hash(password)?,
        };
        // The store re-checks uniqueness; the lookup above only avoids hashing for nothing.
        let user = self.users.create(user).await?;
        info!(user_id = %user.id, "user registered");

        self.outcome(user)
    }

    #[instrument(skip(self, password))]
    pub async fn authorize(&self, username: &str, password: &str) -> Result<AuthOutcome> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::NoSuchUser(username.to_owned()))?;

        if !self.hasher.verify(password, &user.password_hash)? {
            warn!("password mismatch");
            return Err(DomainError::BadPassword);
        }
        info!(user_id = %user.id, "user logged in");

        self.outcome(user)
    }

    pub fn verify_token(&self, token: &str) -> Result<Principal> {
        self.tokens.verify(token)
    }

    fn outcome(&self, user: User) -> Result<AuthOutcome> {
        let token = self.tokens.issue(&user)?;
        Ok(AuthOutcome { user, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{MockPasswordHasher, MockTokenIssuer, MockUserRepository};

    fn stored_bob() -> User {
        User {
            id: "id-bob".into(),
            username: "bob".into(),
            password_hash: "hash(hunter2)".into(),
        }
    }

    fn plain_hasher() -> MockPasswordHasher {
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_hash().returning(|p| Ok(format!("hash({p})")));
        hasher
            .expect_verify()
            .returning(|p, h| Ok(h == format!("hash({p})")));
        hasher
    }

    fn tokens() -> MockTokenIssuer {
        let mut tokens = MockTokenIssuer::new();
        tokens
            .expect_issue()
            .returning(|u| Ok(format!("token-for-{}", u.username)));
        tokens
    }

    #[tokio::test]
    async fn register_hashes_password_and_issues_token() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));
        users
            .expect_create()
            .withf(|u| u.username == "bob" && u.password_hash == "hash(hunter2)")
            .returning(|u| Ok(u));

        let service = AccountService::new(Arc::new(users), Arc::new(plain_hasher()), Arc::new(tokens()));
        let outcome = service.register("bob", "hunter2").await.unwrap();

        assert_eq!(outcome.token, "token-for-bob");
        assert_eq!(outcome.user.id.len(), 24);
    }

    #[tokio::test]
    async fn register_duplicate_is_rejected() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|_| Ok(Some(stored_bob())));
        users.expect_create().never();

        let service = AccountService::new(Arc::new(users), Arc::new(plain_hasher()), Arc::new(tokens()));
        let err = service.register("bob", "other").await.unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists(name) if name == "bob"));
    }

    #[tokio::test]
    async fn authorize_distinguishes_unknown_user_and_bad_password() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|name| {
            Ok((name == "bob").then(stored_bob))
        });

        let service = AccountService::new(Arc::new(users), Arc::new(plain_hasher()), Arc::new(tokens()));

        assert!(matches!(
            service.authorize("carol", "x").await,
            Err(DomainError::NoSuchUser(_))
        ));
        assert!(matches!(
            service.authorize("bob", "wrong").await,
            Err(DomainError::BadPassword)
        ));
        let outcome = service.authorize("bob", "hunter2").await.unwrap();
        assert_eq!(outcome.user.id, "id-bob");
    }

    #[tokio::test]
    async fn blank_credentials_are_invalid() {
        let users = MockUserRepository::new();
        let service = AccountService::new(Arc::new(users), Arc::new(plain_hasher()), Arc::new(tokens()));
        assert!(matches!(
            service.register("  ", "pw").await,
            Err(DomainError::Validation(_))
        ));
    }
}
