//! HTTP health-check daemon library.
//!
//! Polls a fixed set of HTTP targets on an interval, keeps the latest result
//! per target, and serves `/health` (JSON) and `/metrics` (Prometheus text).

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::SyscheckConfig;
pub use health::{CheckLoop, ResultStore};
pub use http::HttpServer;
pub use lifecycle::{Daemon, Shutdown};
