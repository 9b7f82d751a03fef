use std::path::PathBuf;

use clap::Parser;
use common::logger::LogOptions;

/// Proactive memory reclaim for one cgroup, driven by memory pressure
/// and refault feedback.
#[derive(Debug, Parser)]
#[clap(name = "memreclaimd", version)]
pub struct Cli {
    /// cgroup v2 directory to manage (e.g. /sys/fs/cgroup/workload.slice)
    #[clap(short = 'g', long = "cgroup")]
    pub cgroup: PathBuf,

    /// KEY=VALUE configuration file; built-in defaults when omitted
    #[clap(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Enable debug level logs
    #[clap(short = 'v', long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[clap(long)]
    pub log_json: bool,
}

impl Cli {
    pub(crate) fn log_options(&self) -> LogOptions {
        LogOptions {
            verbose: self.verbose,
            json: self.log_json,
        }
    }
}
