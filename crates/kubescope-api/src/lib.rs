//! kubescope-api — HTTP read surface for the kubescope sidecar.
//!
//! Both representations are derived from the same [`StatusStore::view`]
//! snapshot; there are no mutation endpoints.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/` | HTML diagnostics page |
//! | GET | `/json` | Status view as JSON |

pub mod handlers;
pub mod pages;

use axum::Router;
use axum::routing::get;
use kubescope_status::StatusStore;

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: StatusStore,
}

/// Build the diagnostics router.
pub fn build_router(store: StatusStore) -> Router {
    let state = ApiState { store };
    Router::new()
        .route("/", get(pages::diagnostics_page))
        .route("/json", get(handlers::diagnostics_json))
        .with_state(state)
}
