//! Lock-guarded in-process stores. Nothing survives a restart.

mod posts;
mod sessions;
mod users;

pub use posts::MemoryPostRepository;
pub use sessions::MemorySessionStore;
pub use users::MemoryUserRepository;
