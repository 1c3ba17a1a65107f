pub mod accounts;
pub mod posts;
pub mod system;
