// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use unitq_core::OfflineQueue;

use crate::error::Result;

pub fn run(queue: &mut OfflineQueue, all: bool) -> Result<()> {
    if all {
        let count = queue.events().len();
        queue.clear_all_events();
        println!("Cleared {} event(s) and reset counters", count);
    } else {
        let removed = queue.clear_completed_events();
        println!("Removed {} completed event(s)", removed);
    }
    Ok(())
}

#[cfg(test)]
#[path = "clear_tests.rs"]
mod tests;
