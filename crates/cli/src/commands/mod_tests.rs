// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for command tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use unitq_core::{
    EventStatus, LocationUpdateData, ManualClock, MemoryStorage, OfflineQueue, RetryPolicy,
};

pub const T0: u64 = 1_700_000_000_000;

/// A queue over in-memory storage, plus the clock driving it.
pub fn test_queue() -> (OfflineQueue, ManualClock) {
    let clock = ManualClock::new(T0);
    let queue = OfflineQueue::open_with(
        MemoryStorage::new(),
        Arc::new(clock.clone()),
        RetryPolicy::default(),
    )
    .unwrap();
    (queue, clock)
}

pub fn add_location(queue: &mut OfflineQueue, unit_id: &str) -> String {
    queue
        .add_payload(&LocationUpdateData {
            unit_id: unit_id.to_string(),
            latitude: 1.0,
            longitude: 2.0,
            accuracy: None,
            heading: None,
            speed: None,
            timestamp: "2023-11-14T22:13:20.000Z".to_string(),
        })
        .unwrap()
}

/// Fails `id` until its retries are exhausted.
pub fn exhaust(queue: &mut OfflineQueue, id: &str) {
    while !queue.event_by_id(id).unwrap().retries_exhausted() {
        queue.update_event_status(id, EventStatus::Failed, Some("boom"));
    }
}
