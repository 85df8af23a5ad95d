//! HTTP bridge binary: Gemini in front, MCP tool server behind.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use sqlbridge::api::{self, AppState};
use sqlbridge::config::BridgeConfig;
use sqlbridge::gemini::GeminiClient;
use sqlbridge::mcp::ChildProcessConnector;
use sqlbridge::options::{ModelOptions, TransportOptions};
use sqlbridge::orchestrator::Orchestrator;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("bridge failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = BridgeConfig::from_env()?;

    let gemini_configured = config.gemini_api_key.is_some();
    if !gemini_configured {
        warn!("GEMINI_API_KEY not set, /chat will reject requests");
    }

    let client = GeminiClient::new(
        config.gemini_api_key.clone().unwrap_or_default(),
        ModelOptions::new(config.gemini_model.clone()),
        TransportOptions::new(),
    );
    let connector = ChildProcessConnector::new(config.tool_server_bin.clone());
    let orchestrator = Arc::new(Orchestrator::new(client, Box::new(connector)));

    // Startup connect is best effort; requests reconnect on demand.
    if let Err(e) = orchestrator.connect().await {
        warn!("initial MCP connect failed: {e}");
    }

    let state = AppState {
        orchestrator,
        gemini_configured,
    };
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("bridge listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("bridge shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C"),
        _ = terminate => info!("received SIGTERM"),
    }
}
