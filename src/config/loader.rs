//! Configuration loading from disk and the command line.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::cli::Cli;
use crate::config::schema::SyscheckConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML config file without validating it.
pub fn read_config(path: &Path) -> Result<SyscheckConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<SyscheckConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Build the effective configuration: defaults, then the optional config
/// file, then command-line overrides. The result is validated.
pub fn resolve_config(cli: &Cli) -> Result<SyscheckConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => SyscheckConfig::default(),
    };

    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Split a comma-separated target list.
///
/// Entries are trimmed and empty entries dropped. Repeated URLs keep their
/// first position.
pub fn parse_targets(raw: &str) -> Vec<String> {
    let mut targets: Vec<String> = Vec::new();

    for part in raw.split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !targets.iter().any(|t| t == trimmed) {
            targets.push(trimmed.to_string());
        }
    }

    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_targets_trims_and_dedupes() {
        let targets = parse_targets(" http://a.test, ,http://b.test,http://a.test ,");
        assert_eq!(targets, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn parse_targets_empty_input() {
        assert!(parse_targets(" , ,").is_empty());
    }

    #[test]
    fn load_config_rejects_empty_targets() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "targets = []").unwrap();

        let err = load_config(file.path()).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec![ValidationError::NoTargets]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_config_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "targets = \"not a list\"").unwrap();

        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/syscheck.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn validation_message_lists_all_errors() {
        let err = ConfigError::Validation(vec![ValidationError::NoTargets, ValidationError::ZeroTimeout]);
        assert_eq!(
            err.to_string(),
            "Validation failed: at least one target URL is required, timeout must be greater than zero"
        );
    }
}
