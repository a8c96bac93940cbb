//! Domain types for the kubescope status store.
//!
//! These types represent the health of each monitored check: the
//! Kubernetes API, internet connectivity, and the tracked workloads.
//! All types are serializable to JSON for the `/json` endpoint.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Reason text a record carries before its first check completes.
pub const INITIALIZING_REASON: &str = "Initializing";

/// Reason shown for workloads while the Kubernetes API itself is down.
pub const STATUS_UNAVAILABLE_REASON: &str =
    "Status is unavailable. Please check the Kubernetes Connection";

/// Health state of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    /// Never checked, or unknowable (workloads during an API outage).
    #[default]
    Unknown,
    /// The last check passed.
    Ok,
    /// The last check failed.
    Error,
}

/// The result of one probe execution: state, reason, and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: CheckState,
    /// Human-readable explanation; empty when `status` is `Ok`.
    pub reason: String,
    /// Unix seconds when this record was produced; `0` means never checked.
    pub observed_at: u64,
}

impl StatusRecord {
    /// The pre-first-check record (epoch timestamp sentinel).
    pub fn initial() -> Self {
        Self {
            status: CheckState::Unknown,
            reason: INITIALIZING_REASON.to_string(),
            observed_at: 0,
        }
    }

    /// A passing record stamped with the current time.
    pub fn ok() -> Self {
        Self {
            status: CheckState::Ok,
            reason: String::new(),
            observed_at: epoch_secs(),
        }
    }

    /// A failing record stamped with the current time.
    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            status: CheckState::Error,
            reason: reason.into(),
            observed_at: epoch_secs(),
        }
    }
}

/// A named workload whose replica count is monitored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkloadId {
    pub namespace: String,
    pub name: String,
}

impl WorkloadId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Flat key used in the store and the JSON view: `{namespace}.{name}`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

impl fmt::Display for WorkloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Stable identifier for one monitored check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckId {
    /// Kubernetes API reachability.
    Kubernetes,
    /// General internet reachability.
    Internet,
    /// Replica health of one workload.
    Workload(WorkloadId),
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckId::Kubernetes => f.write_str("kubernetes"),
            CheckId::Internet => f.write_str("internet"),
            CheckId::Workload(w) => f.write_str(&w.key()),
        }
    }
}

/// Read-only snapshot of the store with the masking rule applied.
///
/// Serializes to a flat object keyed by check identifier, matching the
/// shape the HTML page and `/json` endpoint render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    pub kubernetes: StatusRecord,
    pub internet: StatusRecord,
    #[serde(flatten)]
    pub workloads: BTreeMap<String, StatusRecord>,
}

/// Current wall-clock time in unix seconds.
pub fn epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
