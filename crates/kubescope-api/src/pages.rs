//! HTML diagnostics page.
//!
//! Builds one row per check from the status view and renders an Askama
//! template.

use askama::Template;
use axum::extract::State;
use axum::response::Html;
use chrono::DateTime;

use kubescope_status::{CheckState, StatusRecord, StatusView};

use crate::ApiState;

fn render<T: Template>(tmpl: T) -> Html<String> {
    Html(
        tmpl.render()
            .unwrap_or_else(|e| format!("<pre>Template error: {e}</pre>")),
    )
}

#[derive(Template)]
#[template(path = "diagnostics.html")]
struct DiagnosticsTemplate {
    rows: Vec<StatusRow>,
}

/// One rendered table row.
struct StatusRow {
    title: String,
    state_label: &'static str,
    state_class: &'static str,
    reason: String,
    checked_at: String,
}

impl StatusRow {
    fn new(title: impl Into<String>, record: &StatusRecord) -> Self {
        let (state_label, state_class) = match record.status {
            CheckState::Ok => ("OK", "ok"),
            CheckState::Error => ("Failing", "error"),
            CheckState::Unknown => ("Unknown", "unknown"),
        };
        Self {
            title: title.into(),
            state_label,
            state_class,
            reason: record.reason.clone(),
            checked_at: format_checked_at(record.observed_at),
        }
    }
}

fn format_checked_at(observed_at: u64) -> String {
    if observed_at == 0 {
        return "never".to_string();
    }
    match DateTime::from_timestamp(observed_at as i64, 0) {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "never".to_string(),
    }
}

fn build_rows(view: &StatusView) -> Vec<StatusRow> {
    let mut rows = vec![
        StatusRow::new("Kubernetes API", &view.kubernetes),
        StatusRow::new("Internet connectivity", &view.internet),
    ];
    for (key, record) in &view.workloads {
        rows.push(StatusRow::new(key.clone(), record));
    }
    rows
}

/// GET /
pub async fn diagnostics_page(State(state): State<ApiState>) -> Html<String> {
    let view = state.store.view().await;
    render(DiagnosticsTemplate {
        rows: build_rows(&view),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubescope_status::*;

    #[tokio::test]
    async fn page_renders_every_check() {
        let workloads = vec![WorkloadId::new("kube-system", "heapster")];
        let store = StatusStore::new(&workloads);
        let state = ApiState { store };

        let Html(body) = diagnostics_page(State(state)).await;
        assert!(body.contains("Kubernetes API"));
        assert!(body.contains("Internet connectivity"));
        assert!(body.contains("kube-system.heapster"));
    }

    #[tokio::test]
    async fn page_shows_failure_reason() {
        let store = StatusStore::new(&[]);
        store
            .set(
                &CheckId::Kubernetes,
                StatusRecord::error("Missing /api/v1 in \"paths\""),
            )
            .await
            .unwrap();
        let state = ApiState { store };

        let Html(body) = diagnostics_page(State(state)).await;
        assert!(body.contains("Failing"));
        assert!(body.contains("Missing /api/v1 in"));
    }

    #[test]
    fn checked_at_uses_never_sentinel() {
        assert_eq!(format_checked_at(0), "never");
        assert!(format_checked_at(1_700_000_000).ends_with("UTC"));
    }

    #[test]
    fn rows_order_kubernetes_first() {
        let view = StatusView {
            kubernetes: StatusRecord::initial(),
            internet: StatusRecord::initial(),
            workloads: Default::default(),
        };
        let rows = build_rows(&view);
        assert_eq!(rows[0].title, "Kubernetes API");
        assert_eq!(rows[1].title, "Internet connectivity");
    }
}
