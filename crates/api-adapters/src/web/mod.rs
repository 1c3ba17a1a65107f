//! # web
//!
//! The axum JSON API. Handlers only see services and `AppState`; storage and
//! credential backends are chosen by the binary.

pub mod cookies;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use extract::CurrentUser;
pub use routes::router;
pub use state::{AppState, Credentials};
