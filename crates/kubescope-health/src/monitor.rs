//! Run-forever check loops and the background launcher.
//!
//! Each check identifier gets its own tokio task running
//! [`run_check_loop`]: probe, publish the record, wait out the rest of
//! the interval, repeat. The loops never terminate; they die with the
//! process.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use kubescope_status::{CheckId, StatusRecord, StatusStore, WorkloadId};

use crate::checker::{KubeClient, check_internet, connectivity_client};

/// Connection settings shared by every check loop.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Base URL of the Kubernetes API, e.g. `https://10.0.0.1:443`.
    pub kubernetes_url: String,
    /// Bearer token for the API; absent is a valid, expected state.
    pub token: Option<String>,
    /// URL fetched by the internet connectivity check.
    pub connectivity_url: String,
    /// Workloads whose replica counts are tracked. Fixed at startup.
    pub workloads: Vec<WorkloadId>,
    /// Delay between check iterations.
    pub interval: Duration,
}

/// Run one probe forever, publishing each result under `id`.
///
/// The delay timer is created before the probe runs, so the iteration
/// period is `max(interval, probe duration)` rather than their sum. The
/// probe runs in its own task: if it panics, the loop logs the fault,
/// publishes a generic `error` record, and carries on. Failures are
/// retried every interval indefinitely, with no backoff growth.
pub async fn run_check_loop<F, Fut>(
    store: StatusStore,
    id: CheckId,
    interval: Duration,
    probe: F,
) where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = StatusRecord> + Send + 'static,
{
    debug!(check = %id, interval_secs = interval.as_secs(), "check loop starting");

    loop {
        // Deadline captured now; awaited after the probe completes.
        let delay = tokio::time::sleep(interval);

        let record = match tokio::spawn(probe()).await {
            Ok(record) => record,
            Err(e) => {
                error!(check = %id, error = %e, "probe failed unexpectedly");
                StatusRecord::error(format!("Unexpected check failure: {e}"))
            }
        };

        if let Err(e) = store.set(&id, record).await {
            error!(check = %id, error = %e, "failed to publish status record");
        }

        delay.await;
    }
}

/// Spawn one check loop per identifier and return immediately.
///
/// The returned handles are fire-and-forget: the caller's runtime drives
/// the tasks for the life of the process, and nothing ever joins them.
pub fn start_background_checks(
    config: &CheckConfig,
    store: &StatusStore,
) -> anyhow::Result<Vec<JoinHandle<()>>> {
    let client = KubeClient::new(&config.kubernetes_url, config.token.clone())?;
    let internet = connectivity_client()?;
    let mut handles = Vec::with_capacity(config.workloads.len() + 2);

    let kube = client.clone();
    handles.push(tokio::spawn(run_check_loop(
        store.clone(),
        CheckId::Kubernetes,
        config.interval,
        move || {
            let kube = kube.clone();
            async move { kube.check_kubernetes().await }
        },
    )));

    for workload in &config.workloads {
        let kube = client.clone();
        let workload = workload.clone();
        handles.push(tokio::spawn(run_check_loop(
            store.clone(),
            CheckId::Workload(workload.clone()),
            config.interval,
            move || {
                let kube = kube.clone();
                let workload = workload.clone();
                async move { kube.check_workload(&workload).await }
            },
        )));
    }

    let url = config.connectivity_url.clone();
    handles.push(tokio::spawn(run_check_loop(
        store.clone(),
        CheckId::Internet,
        config.interval,
        move || {
            let internet = internet.clone();
            let url = url.clone();
            async move { check_internet(&internet, &url).await }
        },
    )));

    info!(
        workloads = config.workloads.len(),
        interval_secs = config.interval.as_secs(),
        "background checks started"
    );
    Ok(handles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubescope_status::CheckState;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Poll the store until `pred` holds for the kubernetes record.
    async fn wait_for(store: &StatusStore, pred: impl Fn(&StatusRecord) -> bool) -> StatusRecord {
        loop {
            let view = store.view().await;
            if pred(&view.kubernetes) {
                return view.kubernetes;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn loop_publishes_probe_results() {
        let store = StatusStore::new(&[]);
        tokio::spawn(run_check_loop(
            store.clone(),
            CheckId::Kubernetes,
            Duration::from_secs(30),
            || async { StatusRecord::ok() },
        ));

        let rec = wait_for(&store, |r| r.status == CheckState::Ok).await;
        assert!(rec.reason.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn loop_survives_panicking_probe() {
        let store = StatusStore::new(&[]);
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        tokio::spawn(run_check_loop(
            store.clone(),
            CheckId::Kubernetes,
            Duration::from_secs(30),
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        panic!("first iteration blows up");
                    }
                    StatusRecord::ok()
                }
            },
        ));

        // Iteration 1: the panic is caught and surfaces as an error record.
        let rec = wait_for(&store, |r| r.status == CheckState::Error).await;
        assert!(rec.reason.starts_with("Unexpected check failure:"));

        // Iteration 2 still runs after the interval and recovers.
        let rec = wait_for(&store, |r| r.status == CheckState::Ok).await;
        assert!(rec.reason.is_empty());
        assert!(calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn iteration_period_is_max_of_interval_and_probe_duration() {
        // A 45 s probe against a 30 s interval: the delay timer runs
        // concurrently with the probe, so iterations start every 45 s,
        // not every 75 s.
        let store = StatusStore::new(&[]);
        let starts = Arc::new(std::sync::Mutex::new(Vec::new()));
        let log = starts.clone();

        tokio::spawn(run_check_loop(
            store.clone(),
            CheckId::Kubernetes,
            Duration::from_secs(30),
            move || {
                log.lock().unwrap().push(tokio::time::Instant::now());
                async {
                    tokio::time::sleep(Duration::from_secs(45)).await;
                    StatusRecord::ok()
                }
            },
        ));

        while starts.lock().unwrap().len() < 3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let starts = starts.lock().unwrap();
        for gap in starts.windows(2) {
            let period = gap[1] - gap[0];
            assert!(
                period >= Duration::from_secs(45) && period < Duration::from_secs(46),
                "iteration period was {period:?}"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fast_probe_iterates_once_per_interval() {
        let store = StatusStore::new(&[]);
        let starts = Arc::new(std::sync::Mutex::new(Vec::new()));
        let log = starts.clone();

        tokio::spawn(run_check_loop(
            store.clone(),
            CheckId::Kubernetes,
            Duration::from_secs(30),
            move || {
                log.lock().unwrap().push(tokio::time::Instant::now());
                async { StatusRecord::ok() }
            },
        ));

        while starts.lock().unwrap().len() < 3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let starts = starts.lock().unwrap();
        for gap in starts.windows(2) {
            let period = gap[1] - gap[0];
            assert!(
                period >= Duration::from_secs(30) && period < Duration::from_secs(31),
                "iteration period was {period:?}"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn loop_logs_and_continues_on_unknown_identifier() {
        // A loop keyed on a workload the store does not know keeps
        // running; publishing just fails each time.
        let store = StatusStore::new(&[]);
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        tokio::spawn(run_check_loop(
            store.clone(),
            CheckId::Workload(WorkloadId::new("default", "ghost")),
            Duration::from_secs(30),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { StatusRecord::ok() }
            },
        ));

        while calls.load(Ordering::SeqCst) < 3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(store.view().await.workloads.is_empty());
    }

    #[tokio::test]
    async fn launcher_spawns_one_task_per_check() {
        let workloads = vec![
            WorkloadId::new("kube-system", "heapster"),
            WorkloadId::new("kube-system", "kube-dns"),
        ];
        let store = StatusStore::new(&workloads);
        let config = CheckConfig {
            kubernetes_url: "http://127.0.0.1:1".to_string(),
            token: None,
            connectivity_url: "http://127.0.0.1:1".to_string(),
            workloads,
            interval: Duration::from_secs(30),
        };

        let handles = start_background_checks(&config, &store).unwrap();
        // kubernetes + internet + two workloads.
        assert_eq!(handles.len(), 4);
        for handle in handles {
            handle.abort();
        }
    }
}
