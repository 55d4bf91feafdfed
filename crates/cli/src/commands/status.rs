// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;
use unitq_core::QueueStats;

use super::{print_json, Context};
use crate::cli::OutputFormat;
use crate::display::format_stats;
use crate::drain::{ConnectivityProvider, NetworkState, ProbeConnectivity};
use crate::error::{Error, Result};

#[derive(Debug, Serialize)]
struct StatusReport<'a> {
    network: &'a NetworkState,
    /// `None` while a drainer holds the queue.
    queue: Option<QueueStats>,
}

/// Probes connectivity once and summarizes the queue.
pub fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let queue = match ctx.open_queue() {
        Ok(queue) => Some(queue.stats()),
        Err(Error::Locked(_)) => None,
        Err(e) => return Err(e),
    };

    let probe = ProbeConnectivity::new(&ctx.config.network);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let network = runtime.block_on(probe.fetch());

    match output {
        OutputFormat::Json => print_json(&StatusReport {
            network: &network,
            queue,
        })?,
        OutputFormat::Text | OutputFormat::Id => {
            println!("Network: {}", describe(&network));
            match queue {
                Some(stats) => println!("{}", format_stats(&stats)),
                None => println!("Queue: locked by a running drainer"),
            }
        }
    }
    Ok(())
}

fn describe(state: &NetworkState) -> String {
    let summary = match (state.is_connected, state.is_reachable()) {
        (true, true) => "online",
        (true, false) => "connected, internet unreachable",
        (false, _) => "offline",
    };
    match &state.details {
        Some(details) => format!("{} ({})", summary, details),
        None => summary.to_string(),
    }
}
