//! Logsage REST API entry point.
//!
//! Binary name: `logsage`
//!
//! Resolves configuration from the environment, wires the orchestrator to
//! its Azure adapters, and serves the chat API until Ctrl+C or SIGTERM.

mod http;
mod state;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use state::AppState;

#[derive(Debug, Parser)]
#[command(name = "logsage", about = "Natural-language analytics over email telemetry logs")]
struct Cli {
    /// Address to bind the API server to.
    #[arg(long, env = "LOGSAGE_BIND", default_value = "0.0.0.0:8080")]
    bind: String,

    /// Directory holding the optional config.toml with orchestrator tunables.
    #[arg(long, env = "LOGSAGE_CONFIG_DIR", default_value = ".")]
    config_dir: PathBuf,

    /// Export spans through the OpenTelemetry stdout pipeline.
    #[arg(long)]
    otel: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logsage_observe::tracing_setup::init_tracing(cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let config = logsage_infra::config::AppConfig::from_env(&cli.config_dir).await?;
    let state = AppState::init(config);

    let listener = tokio::net::TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;
    tracing::info!(addr = %cli.bind, "Logsage API listening");

    let router = http::router::build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    logsage_observe::tracing_setup::shutdown_tracing();
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
