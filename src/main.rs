mod anonymize;
mod archive;
mod cli;
mod context;
mod error;
mod events;
mod health;
mod kubernetes;
mod snapshot;
mod types;
mod utils;

use clap::Parser;
use tracing::{error, info, warn};

use archive::{write_archive, write_stream};
use cli::Cli;
use context::CallContext;
use snapshot::{CollectorConfig, SnapshotCollector, gather_cluster_version};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Records go to stdout, so logs stay on stderr
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let collector = SnapshotCollector::new(CollectorConfig {
        namespace: cli.namespace.clone(),
        interval: cli.interval,
        ..Default::default()
    });

    let (mut ctx, cancel) = CallContext::cancellable();
    if let Some(timeout) = cli.timeout {
        ctx = ctx.with_timeout(timeout);
    }
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling snapshot");
            cancel.cancel();
        }
    });

    let snapshot = gather_cluster_version(cli.context.as_deref(), &collector, &ctx).await;

    for warning in &snapshot.warnings {
        warn!("Snapshot degraded at {}: {}", warning.step, warning.message);
    }

    match &cli.output {
        Some(dir) => {
            let written = write_archive(dir, &snapshot.records, cli.format)?;
            info!("Wrote {} records to {}", written.len(), dir.display());
        }
        None => write_stream(&mut std::io::stdout().lock(), &snapshot.records)?,
    }

    if !snapshot.errors.is_empty() {
        for err in &snapshot.errors {
            error!("{:#}", err);
        }
        anyhow::bail!(
            "Snapshot incomplete: {} fatal error(s)",
            snapshot.errors.len()
        );
    }
    Ok(())
}
