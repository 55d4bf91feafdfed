// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `unitq drain`: the composition root for background delivery.
//!
//! Opens the queue (taking the storage lock for the whole run), wires a
//! connectivity provider into it, and drives the [`Drainer`].

use std::sync::Arc;

use tokio::sync::watch;

use super::Context;
use crate::config::DRAIN_LOG_NAME;
use crate::drain::{
    initialize_network_listener, lock, share, DrainReport, Drainer, HttpDeliverer,
    ManualConnectivity, NetworkState, ProbeConnectivity, SkipReason,
};
use crate::error::Result;
use crate::logging;

pub fn run(ctx: &Context, once: bool, assume_online: bool) -> Result<()> {
    let log_path = ctx.state_dir.join(DRAIN_LOG_NAME);
    let to_file = logging::init(&log_path);

    let queue = share(ctx.open_queue()?);
    let deliverer = Arc::new(HttpDeliverer::new(&ctx.config.api)?);
    let drainer = Arc::new(Drainer::new(
        queue.clone(),
        deliverer,
        ctx.config.drain_config(),
    ));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let listener = if assume_online {
            let provider = Arc::new(ManualConnectivity::new(NetworkState::online()));
            initialize_network_listener(provider, queue.clone()).await
        } else {
            let provider = Arc::new(ProbeConnectivity::new(&ctx.config.network));
            if !once {
                tokio::spawn(provider.clone().run(shutdown_rx.clone()));
            }
            initialize_network_listener(provider, queue.clone()).await
        };

        if once {
            let report = drainer.process_queued_events().await;
            if report.delivered > 0 {
                tokio::time::sleep(ctx.config.drain_config().completed_retention).await;
                drainer.sweep_completed();
            }
            print_report(&report);
        } else {
            println!("Draining to {}", ctx.config.api.url);
            if to_file {
                println!("Logging to {}", log_path.display());
            }
            println!("Press Ctrl-C to stop");

            let loop_task = {
                let drainer = drainer.clone();
                tokio::spawn(async move { drainer.run(shutdown_rx).await })
            };
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("shutdown requested"),
                Err(e) => tracing::warn!(error = %e, "failed to listen for ctrl-c"),
            }
            let _ = shutdown_tx.send(true);
            if let Err(e) = loop_task.await {
                tracing::warn!(error = %e, "drain loop ended abnormally");
            }
        }

        listener.abort();
    });

    let stats = lock(&queue).stats();
    tracing::info!(
        pending = stats.pending_events,
        failed = stats.failed_events,
        "drainer exited"
    );
    Ok(())
}

fn print_report(report: &DrainReport) {
    match report.skipped {
        Some(SkipReason::Offline) => println!("Skipped: network is offline"),
        Some(SkipReason::NothingReady) => println!("Nothing to deliver"),
        Some(SkipReason::AlreadyRunning) => println!("Skipped: a cycle is already running"),
        None => println!(
            "Attempted {}, delivered {}, failed {}",
            report.attempted, report.delivered, report.failed
        ),
    }
}
