use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::archive::Format;
use crate::snapshot::DEFAULT_NAMESPACE;
use crate::utils::parse_duration;

#[derive(Parser)]
#[command(name = "kubectl-snapshot")]
#[command(about = "Collect an anonymized diagnostic snapshot of the cluster version operator")]
pub struct Cli {
    /// Context
    #[arg(long)]
    pub context: Option<String>,

    /// Namespace of the cluster version operator
    #[arg(short = 'n', long, default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// How far back to collect events when pods are unhealthy (e.g. 30m, 1h, 1h30m)
    #[arg(short = 'i', long, default_value = "1h", value_parser = parse_duration)]
    pub interval: Duration,

    /// Abort the snapshot if it takes longer than this
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Write records into this directory instead of printing them
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Archive format for structured records
    #[arg(short = 'f', long, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}
