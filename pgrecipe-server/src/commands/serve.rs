use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use pgrecipe_orchestrations::backends::simulated::Simulation;
use pgrecipe_orchestrations::{LocalHost, OrchestrationHost};
use tokio::net::TcpListener;

use crate::api::{self, AppState};
use crate::cli::HostKind;
use crate::config::Config;

/// Run the API and the selected orchestration host until Ctrl+C
pub async fn run(port: Option<u16>, host_kind: HostKind) -> Result<()> {
    let config = Config::load()?;
    let port = port.unwrap_or(config.server_port);

    tracing::info!("Starting pgrecipe server ({:?} host)", host_kind);

    let simulation = Simulation::new(config.simulated_latency);
    let backends = simulation.backends();

    let (host, runtime) = match host_kind {
        HostKind::Duroxide => {
            let (runtime, client) = crate::duroxide::initialize(&config, backends).await?;
            let host: Arc<dyn OrchestrationHost> = Arc::new(crate::duroxide::DuroxideHost::new(client));
            (host, Some(runtime))
        }
        HostKind::Memory => {
            tracing::warn!("In-memory host: workflow state is lost when the server exits");
            let host: Arc<dyn OrchestrationHost> = Arc::new(LocalHost::new(backends));
            (host, None)
        }
    };

    let addr = format!("{}:{}", config.server_host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("✓ API server listening on {}", addr);
    tracing::info!("  Press Ctrl+C to stop");

    api::serve(listener, AppState { host }, shutdown_signal()).await?;

    if let Some(runtime) = runtime {
        tracing::info!("Shutting down Duroxide runtime");
        runtime.shutdown(None).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    wait_for_signal(tokio::signal::ctrl_c()).await
}

/// Resolve once `signal` fires. If the listener cannot be installed, never resolve.
async fn wait_for_signal(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal, running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down, draining in-flight requests");
}
