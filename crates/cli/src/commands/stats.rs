// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use unitq_core::OfflineQueue;

use super::print_json;
use crate::cli::OutputFormat;
use crate::display::format_stats;
use crate::error::Result;

pub fn run(queue: &OfflineQueue, output: OutputFormat) -> Result<()> {
    let stats = queue.stats();
    match output {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Text | OutputFormat::Id => println!("{}", format_stats(&stats)),
    }
    Ok(())
}
