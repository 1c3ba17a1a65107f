//! # api-adapters
//!
//! Driving adapters: the JSON HTTP surface and the Prometheus registry it
//! exposes. Only `web-axum` exists today.

pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod web;

pub use metrics::Metrics;
