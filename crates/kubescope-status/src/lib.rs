//! kubescope-status — in-memory status store for the kubescope sidecar.
//!
//! Holds the latest [`StatusRecord`] for each monitored check: the
//! Kubernetes API, internet connectivity, and one record per tracked
//! workload. The store is created once at process start with every record
//! in the `unknown` state, mutated in place by the check loops, and read
//! by the HTTP layer through [`StatusStore::view`].
//!
//! # Architecture
//!
//! The `StatusStore` is `Clone` + `Send` + `Sync` (backed by
//! `Arc<RwLock<_>>`) and can be shared across async tasks. Each check
//! identifier has exactly one writing task; `view()` takes a read lock,
//! deep-copies every record, and applies the Kubernetes-dependency
//! masking before releasing it, so readers never observe a partial write
//! and can never mutate the store.

pub mod error;
pub mod store;
pub mod types;

pub use error::{StatusError, StatusResult};
pub use store::StatusStore;
pub use types::*;
