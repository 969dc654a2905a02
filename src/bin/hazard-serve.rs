use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use hazard_classifier::config::AppConfig;
use hazard_classifier::http::{run_http_server, AppState, GateRegistry};

#[derive(Parser, Debug)]
#[command(name = "hazard-serve", about = "HTTP inference server for hazard classifiers")]
struct Cli {
    /// JSON configuration file (defaults to config/hazard.json, then built-in defaults)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the configured bind address
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port
    #[arg(long)]
    port: Option<u16>,
}

fn main() -> ExitCode {
    hazard_classifier::init_logging();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::load(),
    };

    let host = cli.host.unwrap_or_else(|| config.server.host.clone());
    let port = cli.port.unwrap_or(config.server.port);
    let ip: IpAddr = host
        .parse()
        .with_context(|| format!("parsing bind address {}", host))?;
    let addr = SocketAddr::new(ip, port);

    // models load once, before the listener accepts requests
    let registry = GateRegistry::from_config(&config);
    for gate in registry.gates() {
        if gate.is_loaded() {
            tracing::info!("[Serve] {} ready", gate.domain());
        } else {
            tracing::warn!("[Serve] {} has no model; requests will fail", gate.domain());
        }
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    runtime.block_on(run_http_server(
        AppState::new(registry),
        addr,
        shutdown_signal(),
    ))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("[Serve] Ctrl-C received, shutting down"),
        Err(err) => {
            tracing::error!("[Serve] Failed to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await
        }
    }
}
