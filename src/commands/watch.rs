//! Watch command implementation.
//!
//! Runs the process poller and logs every refresh until Ctrl-C.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tracing::info;

use crate::config::Config;
use herakles_target_tracker::process::should_include_process;
use herakles_target_tracker::{ProcessPoller, ProcessRegistry, ProcessSnapshot, ProcfsSource};

/// Keeps the process list refreshed. `iterations == 0` runs until interrupted.
pub async fn command_watch(iterations: u64, config: &Config) -> Result<()> {
    let registry = Arc::new(RwLock::new(
        ProcessRegistry::new().with_max_processes(config.max_processes),
    ));
    let source = Arc::new(ProcfsSource::new(config.proc_root()));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);

    let include = config.include_names().to_vec();
    let exclude = config.exclude_names().to_vec();
    let refreshes = Arc::new(AtomicU64::new(0));
    let stop = Arc::clone(&shutdown_tx);
    let counter = Arc::clone(&refreshes);

    let poller = ProcessPoller::new(
        registry,
        source,
        config.refresh_interval(),
        config.refresh_timeout(),
    )
    .with_listener(Box::new(move |processes: &[ProcessSnapshot]| {
        let shown: Vec<_> = processes
            .iter()
            .filter(|p| should_include_process(&p.name, &include, &exclude))
            .collect();
        let busiest = shown
            .iter()
            .max_by(|a, b| a.cpu_usage.total_cmp(&b.cpu_usage));
        match busiest {
            Some(p) => info!(
                "{} processes ({} matching), busiest: {} (pid {}) at {:.1}%",
                processes.len(),
                shown.len(),
                p.name,
                p.pid,
                p.cpu_usage * 100.0
            ),
            None => info!("{} processes, none matching", processes.len()),
        }

        let done = counter.fetch_add(1, Ordering::Relaxed) + 1;
        if iterations > 0 && done >= iterations {
            let _ = stop.send(true);
        }
    }));
    let stats = poller.stats();

    let mut task = tokio::spawn(poller.run(shutdown_rx));
    let interrupted = tokio::select! {
        joined = &mut task => {
            joined.context("Poller task failed")?;
            false
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            true
        }
    };
    if interrupted {
        info!("Shutdown requested");
        let _ = shutdown_tx.send(true);
        task.await.context("Poller task failed")?;
    }

    println!(
        "✅ {} refreshes, {} failed, {} timed out, {} processes skipped",
        stats.refreshes_ok.load(Ordering::Relaxed),
        stats.refreshes_failed.load(Ordering::Relaxed),
        stats.timeouts.load(Ordering::Relaxed),
        stats.skipped_processes.load(Ordering::Relaxed)
    );
    Ok(())
}
