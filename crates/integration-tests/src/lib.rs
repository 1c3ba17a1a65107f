//! Shared fixtures: a fully wired app over the in-memory adapters with real
//! password hashing and JWT signing.

use std::sync::Arc;
use std::time::Duration;

use auth_adapters::{Argon2PasswordHasher, JwtTokenIssuer};
use domains::Principal;
use services::{AccountService, PostService, SessionService};
use storage_adapters::memory::{MemoryPostRepository, MemorySessionStore, MemoryUserRepository};

pub const JWT_SECRET: &[u8] = b"integration-secret";

pub fn post_service() -> PostService {
    PostService::new(Arc::new(MemoryPostRepository::new()))
}

pub fn account_service() -> AccountService {
    AccountService::new(
        Arc::new(MemoryUserRepository::new()),
        Arc::new(Argon2PasswordHasher::new()),
        Arc::new(JwtTokenIssuer::new(JWT_SECRET, Duration::from_secs(3600))),
    )
}

pub fn principal(id: &str) -> Principal {
    Principal {
        user_id: format!("id-{id}"),
        username: id.to_owned(),
    }
}

#[cfg(feature = "web-axum")]
pub use web::*;

#[cfg(feature = "web-axum")]
mod web {
    use super::*;

    use api_adapters::web::{router, AppState, Credentials};
    use axum::{
        body::{to_bytes, Body},
        http::{header, HeaderMap, Method, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    /// How a test request proves who it is.
    #[derive(Debug, Clone)]
    pub enum Auth {
        Anonymous,
        Bearer(String),
        Cookie(String),
    }

    pub struct TestResponse {
        pub status: StatusCode,
        pub headers: HeaderMap,
        pub body: Value,
    }

    impl TestResponse {
        /// `session_id` value from `Set-Cookie`, if any.
        pub fn session_cookie(&self) -> Option<String> {
            self.headers
                .get(header::SET_COOKIE)?
                .to_str()
                .ok()?
                .split(';')
                .next()?
                .strip_prefix("session_id=")
                .map(str::to_owned)
        }
    }

    pub struct TestApp {
        router: Router,
    }

    impl TestApp {
        pub fn bearer() -> Self {
            Self::with_credentials(Credentials::Bearer)
        }

        pub fn cookie(ttl: Duration) -> Self {
            let sessions = SessionService::new(Arc::new(MemorySessionStore::new()), ttl);
            Self::with_credentials(Credentials::Cookie(Arc::new(sessions)))
        }

        fn with_credentials(credentials: Credentials) -> Self {
            let state = AppState::new(post_service(), account_service(), credentials);
            Self { router: router(state) }
        }

        pub async fn send(&self, method: Method, uri: &str, body: Option<Value>, auth: &Auth) -> TestResponse {
            let mut builder = Request::builder().method(method).uri(uri);
            builder = match auth {
                Auth::Anonymous => builder,
                Auth::Bearer(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
                Auth::Cookie(id) => builder.header(header::COOKIE, format!("session_id={id}")),
            };
            let request = match body {
                Some(json) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json.to_string())),
                None => builder.body(Body::empty()),
            }
            .expect("valid request");

            let response = self.router.clone().oneshot(request).await.expect("infallible router");
            let status = response.status();
            let headers = response.headers().clone();
            let bytes = to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("readable body");
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

            TestResponse { status, headers, body }
        }

        pub async fn get(&self, uri: &str, auth: &Auth) -> TestResponse {
            self.send(Method::GET, uri, None, auth).await
        }

        pub async fn post(&self, uri: &str, body: Value, auth: &Auth) -> TestResponse {
            self.send(Method::POST, uri, Some(body), auth).await
        }

        pub async fn delete(&self, uri: &str, auth: &Auth) -> TestResponse {
            self.send(Method::DELETE, uri, None, auth).await
        }

        /// Registers `username` and returns the credential the deployment accepts.
        pub async fn sign_up(&self, username: &str, password: &str) -> Auth {
            let response = self
                .post(
                    "/api/register",
                    serde_json::json!({ "username": username, "password": password }),
                    &Auth::Anonymous,
                )
                .await;
            assert_eq!(response.status, StatusCode::CREATED, "register {username}");

            match response.session_cookie() {
                Some(id) => Auth::Cookie(id),
                None => Auth::Bearer(
                    response.body["token"]
                        .as_str()
                        .expect("token in register response")
                        .to_owned(),
                ),
            }
        }
    }
}
