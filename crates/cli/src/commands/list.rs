// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use unitq_core::{EventType, OfflineQueue, QueuedEvent};

use super::print_json;
use crate::cli::OutputFormat;
use crate::display::format_event_line;
use crate::error::Result;

/// Which subset of the queue to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    /// Ready for delivery now.
    Pending,
    /// Retries exhausted.
    Failed,
}

/// Events matching `selection` and `event_type`, in insertion order.
pub fn select(
    queue: &OfflineQueue,
    selection: Selection,
    event_type: Option<EventType>,
) -> Vec<&QueuedEvent> {
    let events = match selection {
        Selection::All => queue.events().iter().collect(),
        Selection::Pending => queue.pending_events(),
        Selection::Failed => queue.failed_events(),
    };
    events
        .into_iter()
        .filter(|e| event_type.map_or(true, |t| t == e.event_type))
        .collect()
}

pub fn run(
    queue: &OfflineQueue,
    selection: Selection,
    event_type: Option<EventType>,
    output: OutputFormat,
) -> Result<()> {
    let events = select(queue, selection, event_type);

    match output {
        OutputFormat::Json => print_json(&events)?,
        OutputFormat::Id => {
            for event in &events {
                println!("{}", event.id);
            }
        }
        OutputFormat::Text => {
            if events.is_empty() {
                println!("No events");
            }
            let now = queue.now_ms();
            for event in &events {
                println!("{}", format_event_line(event, now));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
