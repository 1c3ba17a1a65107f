//! # services
//!
//! Use-case orchestration between the HTTP layer and the domain ports.

pub mod accounts;
pub mod posts;
pub mod sessions;
pub mod utils;

pub use accounts::{AccountService, AuthOutcome};
pub use posts::PostService;
pub use sessions::SessionService;
