//! ATM Ledger HTTP server
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (127.0.0.1:6000)
//! atm-server
//!
//! # Custom bind address and JSON logs
//! ATM_PORT=8080 atm-server --host 0.0.0.0 --log-format json
//! ```
//!
//! `RUST_LOG` takes precedence over `--log-level` when set.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use atm_ledger::api::create_router;
use atm_ledger::utils::MemoryStorage;
use atm_ledger::{Ledger, LedgerConfig};

/// ATM Ledger - PIN-gated pseudo-bank accounts over HTTP
#[derive(Parser, Debug)]
#[command(name = "atm-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(long, env = "ATM_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "ATM_PORT", default_value_t = 6000)]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ATM_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (json, pretty)
    #[arg(long, env = "ATM_LOG_FORMAT", default_value = "pretty")]
    log_format: String,

    /// Compare-and-swap attempts before a balance update gives up
    #[arg(long, env = "ATM_MAX_UPDATE_ATTEMPTS", default_value_t = 64)]
    max_update_attempts: usize,
}

impl Args {
    fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, &args.log_format);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting ATM ledger server");

    let config = LedgerConfig {
        max_update_attempts: args.max_update_attempts,
    };
    let ledger = Arc::new(Ledger::with_config(MemoryStorage::new(), config));
    let app = create_router(ledger);

    let addr = args.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(host = %args.host, port = args.port, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_logging(level: &str, format: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    match format {
        "json" => subscriber.with(fmt::layer().json().with_target(true)).init(),
        _ => subscriber.with(fmt::layer().pretty()).init(),
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
