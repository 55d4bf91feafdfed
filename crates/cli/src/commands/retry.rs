// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use unitq_core::{EventStatus, OfflineQueue};

use crate::error::{Error, Result};

/// Resets one failed event to pending.
///
/// The retry count is kept, so an event that already spent its budget gets
/// exactly one more automatic attempt.
pub fn run_one(queue: &mut OfflineQueue, id: &str) -> Result<()> {
    let status = queue
        .event_by_id(id)
        .map(|e| e.status)
        .ok_or_else(|| Error::EventNotFound(id.to_string()))?;
    if status != EventStatus::Failed {
        return Err(Error::NotRetryable {
            id: id.to_string(),
            status: status.to_string(),
        });
    }

    queue.retry_event(id);
    println!("Marked {} for retry", id);
    Ok(())
}

/// Resets every failed event to pending.
pub fn run_all(queue: &mut OfflineQueue) -> Result<usize> {
    let count = queue.retry_all_failed_events();
    match count {
        0 => println!("No failed events"),
        1 => println!("Marked 1 failed event for retry"),
        n => println!("Marked {} failed events for retry", n),
    }
    Ok(count)
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
