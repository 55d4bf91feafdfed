// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use unitq_core::OfflineQueue;

use super::print_json;
use crate::cli::OutputFormat;
use crate::display::format_event_detail;
use crate::error::{Error, Result};

pub fn run(queue: &OfflineQueue, id: &str, output: OutputFormat) -> Result<()> {
    let event = queue
        .event_by_id(id)
        .ok_or_else(|| Error::EventNotFound(id.to_string()))?;

    match output {
        OutputFormat::Text => println!("{}", format_event_detail(event, queue.now_ms())),
        OutputFormat::Id => println!("{}", event.id),
        OutputFormat::Json => print_json(event)?,
    }
    Ok(())
}
