//! Overall health verdict.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::health::store::CheckResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Degraded,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Healthy => "healthy",
            OverallStatus::Degraded => "degraded",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Degraded as soon as one target has an error, an error status, or has
/// never answered.
pub fn derive_status(results: &BTreeMap<String, CheckResult>) -> OverallStatus {
    if results.values().any(CheckResult::is_degraded) {
        OverallStatus::Degraded
    } else {
        OverallStatus::Healthy
    }
}
