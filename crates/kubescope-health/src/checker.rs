//! Probe logic for the three check kinds.
//!
//! Each probe performs a single outbound request and classifies the
//! outcome into a [`StatusRecord`]. Expected failures — transport errors,
//! timeouts, non-200 responses, malformed payloads — are converted into
//! `error` records here and never propagate to the caller.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use kubescope_status::{StatusRecord, WorkloadId};

/// Connect and request timeout for every outbound probe call,
/// independent of the inter-iteration delay.
const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure classification for one fetch against the Kubernetes API.
///
/// The display strings double as operator-facing reasons.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Connection refused, DNS failure, timeout.
    #[error("Requesting \"{url}\" failed: \"{message}\"")]
    Transport { url: String, message: String },

    /// The API answered with a non-200 status.
    #[error("Invalid status \"{code}\" when communicating to Kubernetes")]
    Status { code: u16 },

    /// The response body was not parseable as JSON.
    #[error("Response not a valid json document")]
    InvalidJson,
}

/// HTTP client for the Kubernetes API.
///
/// Certificate validation is disabled: the sidecar talks to the in-cluster
/// API endpoint over the service network. The bearer token is attached
/// when configured; running without one is a valid state that only
/// surfaces in failure reasons.
#[derive(Clone)]
pub struct KubeClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl KubeClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .connect_timeout(PROBE_TIMEOUT)
            .timeout(PROBE_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a path under the API base URL and parse the body as JSON.
    async fn fetch_json(&self, path: &str) -> Result<Value, ProbeError> {
        let url = self.url(path);
        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| ProbeError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let code = response.status().as_u16();
        if code != 200 {
            return Err(ProbeError::Status { code });
        }

        response.json().await.map_err(|e| {
            debug!(%url, error = %e, "response body was not valid json");
            ProbeError::InvalidJson
        })
    }

    /// Probe the Kubernetes API root.
    ///
    /// `ok` only when the root answers 200 with a JSON body whose `paths`
    /// list contains `/api/v1`. When no token is configured, fetch
    /// failures name the missing token as the likely cause.
    pub async fn check_kubernetes(&self) -> StatusRecord {
        let data = match self.fetch_json("").await {
            Ok(data) => data,
            Err(e) => {
                let reason = if self.token.is_none() {
                    format!("Missing Kubernetes API token, request to API failed. {e}")
                } else {
                    e.to_string()
                };
                return StatusRecord::error(reason);
            }
        };

        api_root_status(&data)
    }

    /// Probe one workload's replica health.
    pub async fn check_workload(&self, workload: &WorkloadId) -> StatusRecord {
        let path = format!(
            "/api/v1/namespaces/{}/replicationcontrollers/{}",
            workload.namespace, workload.name
        );
        match self.fetch_json(&path).await {
            Ok(document) => replica_status(&document),
            Err(e) => StatusRecord::error(e.to_string()),
        }
    }
}

/// Classify the API root document: the `/api/v1` path entry is the
/// capability marker the rest of the checks depend on.
fn api_root_status(data: &Value) -> StatusRecord {
    let has_v1 = data
        .get("paths")
        .and_then(Value::as_array)
        .is_some_and(|paths| paths.iter().any(|p| p == "/api/v1"));

    if has_v1 {
        StatusRecord::ok()
    } else {
        StatusRecord::error("Missing /api/v1 in \"paths\"")
    }
}

/// Classify a replication controller document by comparing observed
/// against desired replicas. Missing fields each get a distinct reason.
fn replica_status(document: &Value) -> StatusRecord {
    let Some(spec) = document.get("spec") else {
        return StatusRecord::error("Wrong replication controller document, missing \"spec\"");
    };
    let Some(desired) = spec.get("replicas") else {
        return StatusRecord::error(
            "Wrong replication controller document, missing \"spec.replicas\"",
        );
    };

    let Some(status) = document.get("status") else {
        return StatusRecord::error("Wrong replication controller document, missing \"status\"");
    };
    let Some(current) = status.get("replicas") else {
        return StatusRecord::error(
            "Wrong replication controller document, missing \"status.replicas\"",
        );
    };

    if replica_counts_match(current, desired) {
        StatusRecord::ok()
    } else {
        StatusRecord::error(format!("Current pods {current}, desired {desired}"))
    }
}

/// Numeric fields compare by value, so an integer count matches its
/// float spelling; anything non-numeric falls back to raw equality.
fn replica_counts_match(current: &Value, desired: &Value) -> bool {
    match (current.as_f64(), desired.as_f64()) {
        (Some(current), Some(desired)) => current == desired,
        _ => current == desired,
    }
}

/// Plain client for the connectivity check: no bearer header, certificate
/// validation left on, same timeouts as the API probes.
pub fn connectivity_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(PROBE_TIMEOUT)
        .timeout(PROBE_TIMEOUT)
        .build()
}

/// Probe general internet reachability by fetching the configured URL.
pub async fn check_internet(http: &reqwest::Client, url: &str) -> StatusRecord {
    let response = match http.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            return StatusRecord::error(format!("Requesting \"{url}\" failed: \"{e}\""));
        }
    };

    let code = response.status().as_u16();
    if code != 200 {
        return StatusRecord::error(format!("\"{url}\" responded error ({code}) status code"));
    }

    StatusRecord::ok()
}
