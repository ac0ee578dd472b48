//! Health endpoint for a reverse-proxy worker.
//!
//! # Architecture Overview
//!
//! ```text
//!   orchestrator                 proxy-healthz                         worker
//!   ────────────   GET /healthz  ┌──────────────────────────────┐
//!        ─────────────────────────▶ http::healthz                 │
//!                                │   └▶ ProxyChecker             │
//!                                │        1. read pid file ──────┼──▶ /run/nginx.pid
//!                                │        2. kill(pid, 0) ───────┼──▶ worker process
//!                                │        3. GET status port ────┼──▶ 127.0.0.1:<status_port>
//!        ◀─────────────────────────  200 "ok" | 500 + cause      │
//!                                └──────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use proxy_healthz::config::{load_config, watcher::ConfigWatcher, HealthzConfig};
use proxy_healthz::fs::OsFilesystem;
use proxy_healthz::health::{Dependencies, HealthzCheck, OsProcessProbe, ProxyChecker, SwappableCheck};
use proxy_healthz::lifecycle::{signals, Shutdown};
use proxy_healthz::observability::logging;
use proxy_healthz::HttpServer;

#[derive(Parser)]
#[command(name = "proxy-healthz")]
#[command(about = "Serves /healthz for a reverse-proxy worker", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => HealthzConfig::default(),
    };

    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        service = %config.service,
        status_port = config.status_port,
        pid_file = %config.pid_file_path().display(),
        bind_address = %config.listener.bind_address,
        "Configuration loaded"
    );

    let checker = ProxyChecker::new(Dependencies::new(
        config.clone(),
        Arc::new(OsFilesystem),
        Arc::new(OsProcessProbe),
    ));
    let check = Arc::new(SwappableCheck::new(checker));

    // Keep the watcher alive for the lifetime of the server.
    let _watcher = match &cli.config {
        Some(path) => {
            let (watcher, mut updates) = ConfigWatcher::new(path);
            let watcher = watcher.run()?;
            let reloadable = check.clone();
            tokio::spawn(async move {
                while let Some(next) = updates.recv().await {
                    reloadable.reload(next);
                }
            });
            Some(watcher)
        }
        None => None,
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            signals::wait_for_termination().await;
            shutdown.trigger();
        }
    });

    let checks: Vec<Arc<dyn HealthzCheck>> = vec![check];
    HttpServer::new(&config.listener, checks)
        .run(listener, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
