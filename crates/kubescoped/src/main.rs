//! kubescoped — the kubescope diagnostics sidecar.
//!
//! Single binary that assembles the sidecar:
//! - Status store (in-memory)
//! - Background check loops (Kubernetes API, workloads, internet)
//! - HTTP surface (HTML page + JSON view)
//!
//! # Usage
//!
//! ```text
//! kubescoped --port 8080 \
//!     --workload kube-system/heapster \
//!     --workload kube-system/kube-dns
//! ```
//!
//! Connection settings come from the in-cluster environment
//! (`KUBERNETES_SERVICE_HOST`, `KUBERNETES_SERVICE_PORT`,
//! `KUBE_API_TOKEN_PATH`, `CHECK_CONNECTIVITY_URL`).

mod settings;

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use kubescope_health::CheckConfig;
use kubescope_status::{StatusStore, WorkloadId};

use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "kubescoped", about = "Cluster diagnostics sidecar")]
struct Cli {
    /// Port to serve the diagnostics pages on.
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Delay between check iterations, in seconds.
    #[arg(long, default_value = "30")]
    interval: u64,

    /// Workload to track, as NAMESPACE/NAME. Repeatable.
    #[arg(long = "workload", value_name = "NAMESPACE/NAME", value_parser = parse_workload)]
    workloads: Vec<WorkloadId>,
}

fn parse_workload(s: &str) -> Result<WorkloadId, String> {
    match s.split_once('/') {
        Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => {
            Ok(WorkloadId::new(namespace, name))
        }
        _ => Err(format!("expected NAMESPACE/NAME, got {s:?}")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,kubescope=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    info!(kubernetes_url = %settings.kubernetes_url, "settings loaded");

    let store = StatusStore::new(&cli.workloads);

    let config = CheckConfig {
        kubernetes_url: settings.kubernetes_url,
        token: settings.token,
        connectivity_url: settings.connectivity_url,
        workloads: cli.workloads,
        interval: Duration::from_secs(cli.interval),
    };

    // Fire-and-forget: the loops run for the life of the process.
    let _handles = kubescope_health::start_background_checks(&config, &store)?;

    let router = kubescope_api::build_router(store);
    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    info!(%addr, "diagnostics server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutdown signal received");
        })
        .await?;

    info!("diagnostics server stopped");
    Ok(())
}
