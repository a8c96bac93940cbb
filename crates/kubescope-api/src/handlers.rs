//! JSON handler for the diagnostics view.

use axum::Json;
use axum::extract::State;

use kubescope_status::StatusView;

use crate::ApiState;

/// GET /json
pub async fn diagnostics_json(State(state): State<ApiState>) -> Json<StatusView> {
    Json(state.store.view().await)
}
