//! rsyncwatch binary entrypoint.
//!
//! Follows an rsyncd log file and serves Prometheus metrics for the
//! completed transfers found in it.

use std::io;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rsyncwatch::{Cli, Pipeline, WatchError};
use rsyncwatch_metrics::{MetricsRegistry, MetricsServer};
use rsyncwatch_tail::LogFollower;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), WatchError> {
    let registry = MetricsRegistry::new();
    let server = MetricsServer::new(registry.clone());

    let mut follower = LogFollower::open(&cli.log_file, cli.poll_interval()).await?;
    let mut pipeline = Pipeline::new(registry.transfers().clone());

    info!(
        log_file = %cli.log_file.display(),
        listen = %cli.listen,
        "watching rsyncd log"
    );

    // Both loops run until a fatal error; whichever fails first wins.
    tokio::select! {
        result = server.serve(cli.listen) => result?,
        result = pipeline.run(&mut follower) => result?,
    }
    Ok(())
}
