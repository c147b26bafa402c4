//! Last-known check results per target.
//!
//! # Responsibilities
//! - Hold exactly one result per configured target
//! - Count successes and failures for the process lifetime
//! - Hand out independent snapshots to concurrent readers
//!
//! # Design Decisions
//! - Readers-writer lock: `/health` readers never block each other
//! - Result and counter change under one write guard, so snapshots are never torn
//! - No await points while a guard is held

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of the most recent probe of one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub target: String,
    /// HTTP status received, 0 when no response was obtained.
    pub status_code: u16,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_error: String,
    /// `None` until the target has been probed once.
    pub checked_at: Option<DateTime<Utc>>,
}

impl CheckResult {
    /// Placeholder held before the first probe completes.
    pub fn pending(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            status_code: 0,
            last_error: String::new(),
            checked_at: None,
        }
    }

    /// Whether this result counts against overall health: an error, no
    /// response yet, or a status outside 200..=399.
    pub fn is_degraded(&self) -> bool {
        !self.last_error.is_empty() || !(200..400).contains(&self.status_code)
    }
}

/// Independent copy of the store at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub results: BTreeMap<String, CheckResult>,
    pub success_count: u64,
    pub failure_count: u64,
}

#[derive(Debug)]
struct Inner {
    results: BTreeMap<String, CheckResult>,
    success_count: u64,
    failure_count: u64,
}

/// Thread-safe result store shared by the check loop and HTTP handlers.
#[derive(Debug)]
pub struct ResultStore {
    inner: RwLock<Inner>,
}

impl ResultStore {
    /// Create a store with a pending entry for every target.
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let results = targets
            .into_iter()
            .map(|t| {
                let target = t.into();
                (target.clone(), CheckResult::pending(target))
            })
            .collect();

        Self {
            inner: RwLock::new(Inner {
                results,
                success_count: 0,
                failure_count: 0,
            }),
        }
    }

    /// Replace the result for `result.target` and bump one counter.
    pub fn update(&self, result: CheckResult, success: bool) {
        let mut inner = self.write();
        inner.results.insert(result.target.clone(), result);
        if success {
            inner.success_count += 1;
        } else {
            inner.failure_count += 1;
        }
    }

    /// Copy the current state.
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.read();
        Snapshot {
            results: inner.results.clone(),
            success_count: inner.success_count,
            failure_count: inner.failure_count,
        }
    }

    /// Counters only; avoids cloning the result map for `/metrics`.
    pub fn counters(&self) -> (u64, u64) {
        let inner = self.read();
        (inner.success_count, inner.failure_count)
    }

    pub fn len(&self) -> usize {
        self.read().results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the guard cannot leave `Inner` half-written:
    // every mutation is a single insert plus a single increment.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn ok(target: &str) -> CheckResult {
        CheckResult {
            target: target.to_string(),
            status_code: 200,
            last_error: String::new(),
            checked_at: Some(Utc::now()),
        }
    }

    fn failed(target: &str, error: &str) -> CheckResult {
        CheckResult {
            target: target.to_string(),
            status_code: 0,
            last_error: error.to_string(),
            checked_at: Some(Utc::now()),
        }
    }

    #[test]
    fn starts_with_pending_entry_per_target() {
        let store = ResultStore::new(["http://ok.test", "http://bad.test"]);
        let snap = store.snapshot();

        assert_eq!(snap.results.len(), 2);
        assert_eq!(snap.results["http://ok.test"], CheckResult::pending("http://ok.test"));
        assert_eq!(snap.success_count, 0);
        assert_eq!(snap.failure_count, 0);
    }

    #[test]
    fn update_replaces_result_and_counts() {
        let store = ResultStore::new(["http://ok.test", "http://bad.test"]);

        store.update(ok("http://ok.test"), true);
        store.update(failed("http://bad.test", "timeout"), false);

        let snap = store.snapshot();
        assert_eq!(snap.results["http://ok.test"].status_code, 200);
        assert!(snap.results["http://ok.test"].last_error.is_empty());
        assert_eq!(snap.results["http://bad.test"].status_code, 0);
        assert_eq!(snap.results["http://bad.test"].last_error, "timeout");
        assert_eq!(snap.success_count, 1);
        assert_eq!(snap.failure_count, 1);
        assert_eq!(snap.results.len(), 2);
    }

    #[test]
    fn snapshot_is_detached_from_store() {
        let store = ResultStore::new(["http://ok.test"]);
        let before = store.snapshot();

        store.update(ok("http://ok.test"), true);

        assert_eq!(before.success_count, 0);
        assert_eq!(before.results["http://ok.test"].status_code, 0);
        assert_eq!(store.snapshot().success_count, 1);
    }

    #[test]
    fn repeated_snapshots_are_equal() {
        let store = ResultStore::new(["http://ok.test"]);
        store.update(ok("http://ok.test"), true);
        assert_eq!(store.snapshot(), store.snapshot());
    }

    #[test]
    fn last_error_omitted_from_json_when_empty() {
        let json = serde_json::to_value(ok("http://ok.test")).unwrap();
        assert!(json.get("last_error").is_none());
        assert_eq!(json["status_code"], 200);

        let json = serde_json::to_value(failed("http://bad.test", "timeout")).unwrap();
        assert_eq!(json["last_error"], "timeout");
    }

    #[test]
    fn snapshots_never_torn_under_concurrent_updates() {
        // Every update writes a status code equal to the new success count, so
        // a consistent snapshot always has `status_code == success_count`.
        let store = Arc::new(ResultStore::new(["t"]));
        let writer_store = store.clone();

        let writer = thread::spawn(move || {
            for i in 1..=5_000u16 {
                let result = CheckResult {
                    target: "t".into(),
                    status_code: i,
                    last_error: String::new(),
                    checked_at: None,
                };
                writer_store.update(result, true);
            }
        });

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    let mut last = 0;
                    for _ in 0..2_000 {
                        let snap = store.snapshot();
                        assert_eq!(u64::from(snap.results["t"].status_code), snap.success_count);
                        assert!(snap.success_count >= last, "counter went backwards");
                        last = snap.success_count;
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(store.counters(), (5_000, 0));
    }
}
