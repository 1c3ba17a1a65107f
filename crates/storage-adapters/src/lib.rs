//! # storage-adapters
//!
//! Implementations of the persistence ports.
//!
//! - `memory`: always compiled; lock-guarded maps.
//! - `postgres` (feature `db-postgres`): users table + JSONB post documents.
//! - `redis` (feature `redis`): session store with native expiry.

#[cfg(any(feature = "db-postgres", feature = "redis", test))]
mod deadline;

pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

#[cfg(feature = "redis")]
pub mod redis;
