//! Configuration validation.
//!
//! Serde handles syntax; this module checks the values make sense before the
//! daemon starts. All violations are reported at once.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::SyscheckConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("at least one target URL is required")]
    NoTargets,

    #[error("duplicate target: {0}")]
    DuplicateTarget(String),

    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    #[error("interval must be greater than zero")]
    ZeroInterval,

    #[error("invalid listen address {address:?}: {reason}")]
    InvalidListenAddress { address: String, reason: String },
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &SyscheckConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.targets.is_empty() {
        errors.push(ValidationError::NoTargets);
    }

    for (i, target) in config.targets.iter().enumerate() {
        if config.targets[..i].contains(target) {
            errors.push(ValidationError::DuplicateTarget(target.clone()));
        }
    }

    if config.check.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.check.interval_ms == 0 {
        errors.push(ValidationError::ZeroInterval);
    }

    if let Err(e) = config.listener.bind_address.parse::<SocketAddr>() {
        errors.push(ValidationError::InvalidListenAddress {
            address: config.listener.bind_address.clone(),
            reason: e.to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
