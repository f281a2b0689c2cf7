use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use northwind_rest::{build_router, logging, AppState};
use northwind_service::{bootstrap, seed_from_csv, Config};
use tokio::net::TcpListener;

/// Northwind customer and order lookup server.
#[derive(Debug, Parser)]
#[command(name = "northwind-rest", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "NORTHWIND_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Copy the CSV files into the database and exit.
    #[arg(long)]
    seed_from_csv: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(Some(cli.config.as_path()))
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    config.validate()?;

    logging::init_logging(&config.logging)?;

    if cli.seed_from_csv {
        let (customers, orders) = seed_from_csv(&config).await?;
        tracing::info!(customers, orders, "Seeding complete");
        return Ok(());
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;

    // Health check and backend selection complete before the listener binds.
    let ctx = bootstrap(config).await?;
    let app = build_router(AppState::from(&ctx));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, source = ctx.northwind.source_name(), "REST server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(store) = &ctx.sqlite_store {
        store.pool().close().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}
