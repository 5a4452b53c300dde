mod config;
mod error;
mod protocol;
mod registry;
mod server;
mod store;
mod util;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use config::Config;
use registry::Registry;
use server::Server;

/// Line-oriented key-value and set store served over HTTP
#[derive(Debug, Parser)]
#[command(name = "linedb", version)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listening address, overrides `server_addr`
    #[arg(long)]
    addr: Option<String>,

    /// Log level, overrides `log.level`
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config '{}'", path.display()))?,
        None => Config::default(),
    };
    if let Some(addr) = args.addr {
        config.server_addr = addr;
    }
    if let Some(level) = args.log_level {
        config.log.level = level;
    }

    util::logging::init(&config.log);

    info!("Starting LineDB - line protocol key-value store");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // a table that cannot be loaded must never be served
    let registry = Registry::from_config(&config.tables).context("failed to build tables")?;
    registry.load_all().context("failed to load tables")?;

    let server = Server::bind(&config, registry)
        .await
        .with_context(|| format!("failed to bind {}", config.server_addr))?;
    info!("Server listening on: {}", server.local_addr());

    server.run().await?;

    Ok(())
}
