pub mod cli;

use std::sync::Arc;

use anyhow::Context;
use cgroup::CgroupFs;
use clap::Parser;
use controller::metrics::Counters;
use controller::{ControlLoop, ControllerConfig, load_config};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::cli::Cli;

fn load(cli: &Cli) -> anyhow::Result<ControllerConfig> {
    match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => {
            info!("no config file given, using built-in defaults");
            Ok(ControllerConfig::default())
        }
    }
}

fn log_config(cgroup: &CgroupFs, cfg: &ControllerConfig) {
    info!(
        cgroup = %cgroup.root().display(),
        psi_threshold = cfg.psi_threshold,
        reclaim_ratio = cfg.reclaim_ratio,
        reclaim_accuracy_target = cfg.reclaim_accuracy_target,
        scan_efficiency_target = cfg.scan_efficiency_target,
        min_size = cfg.min_size,
        iterate_min_size = cfg.iterate_min_size,
        iterate_max_size = cfg.iterate_max_size,
        interval_s = cfg.interval.as_secs(),
        "effective configuration"
    );
}

/// Cancel `stop` on SIGINT or SIGTERM.
fn spawn_signal_listener(stop: CancellationToken) -> anyhow::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate()).context("installing SIGTERM handler")?;

    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!(signal = "SIGINT", "shutdown signal received"),
            _ = sigterm.recv() => info!(signal = "SIGTERM", "shutdown signal received"),
        }
        stop.cancel();
    });

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    common::logger::init_logger("memreclaimd", cli.log_options());

    let cfg = load(&cli)?;
    let cgroup = Arc::new(CgroupFs::new(&cli.cgroup));
    log_config(&cgroup, &cfg);

    let stop = CancellationToken::new();
    spawn_signal_listener(stop.clone())?;

    let counters = Counters::default();
    let mut control = ControlLoop::new(
        cli.cgroup.display().to_string(),
        cfg,
        cgroup.clone(),
        cgroup,
    )
    .with_counters(counters.clone());

    let result = control.run(&stop).await;

    let stats = counters.snapshot();
    info!(
        ticks = stats.ticks,
        below_min_size = stats.below_min_size,
        saturated = stats.saturated,
        suppressed = stats.suppressed,
        reclaim_requests = stats.reclaim_requests,
        reclaim_failures = stats.reclaim_failures,
        reclaimed_kb = stats.reclaimed_bytes >> 10,
        "controller exited"
    );

    if let Err(e) = &result {
        error!(error = %e, "controller stopped on fatal error");
    }
    result.context("control loop failed")
}
