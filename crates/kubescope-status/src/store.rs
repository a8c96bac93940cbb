//! StatusStore — shared in-memory state for all check loops.
//!
//! One record per check identifier, fixed at construction. Writes replace
//! a whole record atomically under a write lock; `view()` deep-copies the
//! contents under a read lock and applies the Kubernetes-dependency
//! masking, so HTTP readers never see internal mutable state.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StatusError, StatusResult};
use crate::types::*;

struct Inner {
    kubernetes: StatusRecord,
    internet: StatusRecord,
    /// Keyed by `WorkloadId::key()`; the key set never changes.
    workloads: HashMap<String, StatusRecord>,
}

/// Thread-safe status store shared by the check loops and HTTP handlers.
#[derive(Clone)]
pub struct StatusStore {
    inner: Arc<RwLock<Inner>>,
}

impl StatusStore {
    /// Create a store tracking the given workloads, all records `unknown`.
    pub fn new(workloads: &[WorkloadId]) -> Self {
        let workloads = workloads
            .iter()
            .map(|w| (w.key(), StatusRecord::initial()))
            .collect();
        Self {
            inner: Arc::new(RwLock::new(Inner {
                kubernetes: StatusRecord::initial(),
                internet: StatusRecord::initial(),
                workloads,
            })),
        }
    }

    /// Atomically replace the record for `id`.
    ///
    /// Fails with [`StatusError::UnknownIdentifier`] for a workload that
    /// was not part of the initial set; the store is left unchanged.
    pub async fn set(&self, id: &CheckId, record: StatusRecord) -> StatusResult<()> {
        let mut inner = self.inner.write().await;
        match id {
            CheckId::Kubernetes => inner.kubernetes = record,
            CheckId::Internet => inner.internet = record,
            CheckId::Workload(w) => {
                let slot = inner
                    .workloads
                    .get_mut(&w.key())
                    .ok_or_else(|| StatusError::UnknownIdentifier(w.key()))?;
                *slot = record;
            }
        }
        debug!(check = %id, "status record updated");
        Ok(())
    }

    /// Deep-copied snapshot with the masking rule applied.
    ///
    /// Workload health is unknowable without a working API connection, so
    /// whenever the Kubernetes record is not `ok` every workload is
    /// projected as `unknown` with a fixed unavailable reason. The
    /// internet check deliberately masks nothing.
    pub async fn view(&self) -> StatusView {
        let inner = self.inner.read().await;
        let kubernetes_down = inner.kubernetes.status != CheckState::Ok;

        let workloads: BTreeMap<String, StatusRecord> = inner
            .workloads
            .iter()
            .map(|(key, rec)| {
                let projected = if kubernetes_down {
                    StatusRecord {
                        status: CheckState::Unknown,
                        reason: STATUS_UNAVAILABLE_REASON.to_string(),
                        observed_at: rec.observed_at,
                    }
                } else {
                    rec.clone()
                };
                (key.clone(), projected)
            })
            .collect();

        StatusView {
            kubernetes: inner.kubernetes.clone(),
            internet: inner.internet.clone(),
            workloads,
        }
    }
}
