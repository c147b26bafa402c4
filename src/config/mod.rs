//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → optional TOML file (loader.rs)
//!     → command-line overrides (cli.rs)
//!     → validation.rs (semantic checks)
//!     → SyscheckConfig (validated, immutable for the process lifetime)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the target set never changes at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::{load_config, resolve_config, ConfigError};
pub use schema::{CheckConfig, ListenerConfig, MetricsBackend, ObservabilityConfig, SyscheckConfig};
pub use validation::ValidationError;
