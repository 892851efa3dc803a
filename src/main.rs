//! Fan-out gateway.
//!
//! Answers each client request by racing several calls to one slow,
//! unreliable upstream endpoint.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                    FANOUT GATEWAY                    │
//!                      │                                                      │
//!   GET /api/<policy>  │  ┌──────────┐   ┌──────────────┐   ┌─────────────┐   │
//!   ───────────────────┼─▶│  http    │──▶│   fanout     │──▶│  upstream   │───┼──▶ Upstream
//!                      │  │ gateway  │   │ orchestrator │   │ caller × N  │   │    endpoint
//!   ◀──────────────────┼──│ (status) │◀──│  (reduce)    │◀──│  + decode   │◀──┼───
//!                      │  └──────────┘   └──────────────┘   └─────────────┘   │
//!                      │                                                      │
//!                      │  config · observability · lifecycle                  │
//!                      └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use fanout_gateway::config::load_config;
use fanout_gateway::http::GatewayServer;
use fanout_gateway::lifecycle::{wait_for_signal, Shutdown};
use fanout_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "fanout-gateway")]
#[command(about = "Races concurrent upstream calls per request", long_about = None)]
struct Args {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("fanout-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        upstream = %config.upstream.url,
        batch_size = config.fanout.batch_size,
        max_timeout_secs = config.fanout.max_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let server = GatewayServer::new(config.clone())?;

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signals = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            wait_for_signal().await;
            if shutdown.trigger() {
                tracing::info!("Graceful shutdown requested");
            }
        }
    });

    server.run(listener, server_shutdown).await?;
    signals.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}
