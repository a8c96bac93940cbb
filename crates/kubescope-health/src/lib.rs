//! kubescope-health — health checking for the kubescope sidecar.
//!
//! Provides the three probe kinds (Kubernetes API, workload replicas,
//! internet connectivity) and the run-forever loops that publish their
//! results into the status store.
//!
//! # Architecture
//!
//! ```text
//! start_background_checks()
//!   ├── kubernetes loop ── KubeClient::check_kubernetes() → StatusRecord
//!   ├── one loop per workload ── KubeClient::check_workload()
//!   └── internet loop ── check_internet()
//! ```
//!
//! Each loop is an independent tokio task that runs its probe once per
//! interval, forever. Expected failures (transport, non-200, malformed
//! payload) are classified into `error` records by the probe itself; a
//! probe that panics is caught at the loop boundary and replaced with a
//! generic `error` record, so a single bad check can never kill its loop.

pub mod checker;
pub mod monitor;

pub use checker::{KubeClient, ProbeError, check_internet};
pub use monitor::{CheckConfig, start_background_checks};
