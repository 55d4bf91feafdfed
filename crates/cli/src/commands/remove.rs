// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use unitq_core::OfflineQueue;

use crate::error::{Error, Result};

pub fn run(queue: &mut OfflineQueue, id: &str) -> Result<()> {
    let removed = queue
        .remove_event(id)
        .ok_or_else(|| Error::EventNotFound(id.to_string()))?;
    println!("Removed {} event {}", removed.event_type, removed.id);
    Ok(())
}
