// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text rendering for queue listings.

use chrono::{DateTime, Utc};
use unitq_core::{QueueStats, QueuedEvent};

/// Maximum line width for wrapped text content (excluding 4-space indent).
const WRAP_WIDTH: usize = 96;

/// Wrap text at word boundaries if it's a single line.
///
/// Multi-line content is returned as-is.
pub fn wrap_text(content: &str, width: usize) -> String {
    if content.contains('\n') || content.len() <= width {
        return content.to_string();
    }

    let mut result = String::new();
    let mut current_line = String::new();

    for word in content.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.len() + 1 + word.len() <= width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            if !result.is_empty() {
                result.push('\n');
            }
            result.push_str(&current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        if !result.is_empty() {
            result.push('\n');
        }
        result.push_str(&current_line);
    }

    result
}

/// Epoch milliseconds as `YYYY-MM-DD HH:MM:SS` UTC.
pub fn format_ms(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// How far `at` lies after `now`, e.g. `in 4s`, `in 2m 5s`, or `due`.
pub fn format_until(at: u64, now: u64) -> String {
    let Some(delta) = at.checked_sub(now).filter(|d| *d > 0) else {
        return "due".to_string();
    };
    let secs = delta.div_ceil(1000);
    if secs < 60 {
        format!("in {}s", secs)
    } else {
        format!("in {}m {}s", secs / 60, secs % 60)
    }
}

/// One-line summary: `- [unit_status] evt-1a2b3c4d: failed (1/3, retry in 2s)`.
pub fn format_event_line(event: &QueuedEvent, now: u64) -> String {
    let mut detail = format!("{}/{}", event.retry_count, event.max_retries);
    if let Some(at) = event.next_retry_at {
        detail.push_str(&format!(", retry {}", format_until(at, now)));
    } else if event.is_dead() {
        detail.push_str(", retries exhausted");
    }

    format!(
        "- [{}] {}: {} ({})",
        event.event_type, event.id, event.status, detail
    )
}

/// Full event view with metadata and the data object.
pub fn format_event_detail(event: &QueuedEvent, now: u64) -> String {
    let mut lines = vec![
        format!("[{}] {}", event.event_type, event.id),
        format!("Status: {}", event.status),
        format!("Retries: {}/{}", event.retry_count, event.max_retries),
        format!("Created: {}", format_ms(event.created_at)),
    ];

    if let Some(at) = event.last_attempt_at {
        lines.push(format!("Last attempt: {}", format_ms(at)));
    }
    if let Some(at) = event.next_retry_at {
        lines.push(format!(
            "Next retry: {} ({})",
            format_ms(at),
            format_until(at, now)
        ));
    }
    if let Some(error) = &event.error {
        lines.push(String::new());
        lines.push("Error:".to_string());
        for line in wrap_text(error, WRAP_WIDTH).lines() {
            lines.push(format!("    {}", line));
        }
    }

    if !event.data.is_empty() {
        lines.push(String::new());
        lines.push("Data:".to_string());
        let mut keys: Vec<&String> = event.data.keys().collect();
        keys.sort();
        for key in keys {
            let value = &event.data[key.as_str()];
            let rendered = match value.as_str() {
                Some(s) => s.to_string(),
                None => value.to_string(),
            };
            lines.push(format!("    {}: {}", key, rendered));
        }
    }

    lines.join("\n")
}

/// Stats block for `unitq stats`.
pub fn format_stats(stats: &QueueStats) -> String {
    [
        format!("Total events:     {}", stats.total_events),
        format!("Pending events:   {}", stats.pending_events),
        format!("Failed events:    {}", stats.failed_events),
        format!("Completed events: {}", stats.completed_events),
        format!(
            "Processing:       {}",
            if stats.is_processing { "yes" } else { "no" }
        ),
    ]
    .join("\n")
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
