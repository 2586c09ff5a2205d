use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use netdiag_rs::{buildinfo, config::Config, server};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    if let Some(text) = buildinfo::build_info() {
        info!("build info:\n{text}");
    }
    if let Some(url) = &config.reporter_url {
        // Exporter wiring lives in a sidecar; the service only records where
        // spans are expected to land.
        info!("trace collector endpoint configured: {url}");
    }
    info!(
        instance = %config.instance_label(),
        port = config.port,
        metrics_port = config.metrics_port,
        "starting diagnostic service"
    );

    server::serve(config).await
}
