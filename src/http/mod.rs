//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → handlers.rs (snapshot → JSON or counter text)
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use handlers::HealthReport;
pub use request::UuidRequestId;
pub use server::{AppState, HttpServer};
