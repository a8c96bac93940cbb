//! Connection settings resolved from the environment.
//!
//! The sidecar runs inside the cluster and picks up the API endpoint
//! from the service-account environment Kubernetes injects:
//! `KUBERNETES_SERVICE_HOST` and `KUBERNETES_SERVICE_PORT`, plus an
//! optional token file at `KUBE_API_TOKEN_PATH` and an overridable
//! connectivity-check URL.

use std::collections::HashMap;

use thiserror::Error;

/// Fallback target for the internet connectivity check.
pub const DEFAULT_CONNECTIVITY_URL: &str = "http://google.com";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("failed to read token file {path}: {source}")]
    TokenFile {
        path: String,
        source: std::io::Error,
    },
}

/// Resolved connection settings for the check loops.
#[derive(Debug, Clone)]
pub struct Settings {
    pub kubernetes_url: String,
    /// Absent token is a valid state; it only surfaces in probe reasons.
    pub token: Option<String>,
    pub connectivity_url: String,
}

impl Settings {
    /// Resolve settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Resolve settings from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, SettingsError> {
        let host = vars
            .get("KUBERNETES_SERVICE_HOST")
            .ok_or(SettingsError::MissingVar("KUBERNETES_SERVICE_HOST"))?;
        let port = vars
            .get("KUBERNETES_SERVICE_PORT")
            .ok_or(SettingsError::MissingVar("KUBERNETES_SERVICE_PORT"))?;

        let scheme = if port == "443" { "https" } else { "http" };
        let kubernetes_url = format!("{scheme}://{host}:{port}");

        let token = match vars.get("KUBE_API_TOKEN_PATH") {
            Some(path) => {
                let contents =
                    std::fs::read_to_string(path).map_err(|source| SettingsError::TokenFile {
                        path: path.clone(),
                        source,
                    })?;
                Some(contents.trim_end().to_string())
            }
            None => None,
        };

        let connectivity_url = vars
            .get("CHECK_CONNECTIVITY_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CONNECTIVITY_URL.to_string());

        Ok(Self {
            kubernetes_url,
            token,
            connectivity_url,
        })
    }
}
