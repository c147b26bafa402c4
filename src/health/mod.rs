//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! check_loop.rs:
//!     Immediate pass, then periodic timer
//!     → probe.rs (one GET per target)
//!     → store.rs (latest result + lifetime counters)
//!
//! HTTP handlers:
//!     store.rs snapshot
//!     → status.rs (healthy / degraded)
//! ```
//!
//! # Design Decisions
//! - The store is the only shared mutable state
//! - One writer (the check loop), any number of readers
//! - Health is binary; no percentages

pub mod check_loop;
pub mod probe;
pub mod status;
pub mod store;

pub use check_loop::CheckLoop;
pub use probe::{HttpProbe, Probe, ProbeError};
pub use status::{derive_status, OverallStatus};
pub use store::{CheckResult, ResultStore, Snapshot};
