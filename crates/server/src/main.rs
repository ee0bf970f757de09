use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use pixelwall_server::config::get_config;
use pixelwall_server::logging::init_tracing;
use pixelwall_server::{app, open_store};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(about = "Serves the shared pixel wall over HTTP")]
struct Arguments {
    /// YAML configuration file; `./pixelwall.yaml` is used when present
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Arguments::parse();

    let config = get_config(args.config.as_deref()).context("loading configuration")?;
    info!("Backing store: {}", config.storage.backing_store);

    let start = Instant::now();
    let store = open_store(&config.storage).context("opening pixel store")?;
    let descriptor = store.describe()?;
    info!(
        "{} backing store ready with {} pixels in {:?}",
        descriptor.kind,
        descriptor.pixels,
        start.elapsed()
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("listening http://{}", addr);

    axum::serve(listener, app(store))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
