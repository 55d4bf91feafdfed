// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The offline event queue.
//!
//! [`OfflineQueue`] owns the ordered list of [`QueuedEvent`]s, the history
//! counters, and the transient network/processing flags. Every operation is
//! synchronous and runs to completion; callers that share a queue between
//! tasks wrap it in a mutex and never hold the guard across an await.
//!
//! After each mutation the persisted subset is written through the
//! [`Storage`] backend. Write failures are logged and otherwise ignored so a
//! flaky disk never blocks a producer.

use std::sync::Arc;

use serde::Serialize;

use crate::clock::{ClockSource, SystemClock};
use crate::error::Result;
use crate::event::{EventData, EventStatus, EventType, Payload, QueuedEvent};
use crate::id::generate_unique_event_id;
use crate::retry::RetryPolicy;
use crate::storage::{PersistedQueue, Storage};

/// Point-in-time summary of the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    /// A drain cycle is running.
    pub is_processing: bool,
    /// Events ever added (since the last full clear).
    pub total_events: u64,
    /// Events a drainer could pick up right now.
    pub pending_events: usize,
    /// Events that exhausted their retries.
    pub failed_events: usize,
    /// Successful deliveries recorded (since the last full clear).
    pub completed_events: u64,
}

/// Durable outbox of client actions awaiting delivery.
pub struct OfflineQueue {
    events: Vec<QueuedEvent>,
    total_events: u64,
    failed_events: u64,
    completed_events: u64,
    is_connected: bool,
    is_network_reachable: bool,
    is_processing: bool,
    processing_event_id: Option<String>,
    seq: u64,
    policy: RetryPolicy,
    clock: Arc<dyn ClockSource>,
    storage: Box<dyn Storage>,
}

impl OfflineQueue {
    /// Opens a queue over `storage` with the system clock and default policy.
    pub fn open(storage: impl Storage + 'static) -> Result<Self> {
        Self::open_with(storage, Arc::new(SystemClock), RetryPolicy::default())
    }

    /// Opens a queue with an explicit clock and retry policy.
    ///
    /// Persisted events and counters are rehydrated; network state starts as
    /// online and nothing is marked as processing. Events left `Processing` by
    /// a drainer that died mid-delivery go back to `Pending`, since the storage
    /// lock means no other drainer can still own them.
    pub fn open_with(
        storage: impl Storage + 'static,
        clock: Arc<dyn ClockSource>,
        policy: RetryPolicy,
    ) -> Result<Self> {
        let mut state = storage.load()?.unwrap_or_default();

        let mut interrupted = 0;
        for event in state
            .queued_events
            .iter_mut()
            .filter(|e| e.status == EventStatus::Processing)
        {
            tracing::warn!(event_id = %event.id, "interrupted delivery reset to pending");
            reset_for_retry(event);
            interrupted += 1;
        }

        tracing::debug!(
            events = state.queued_events.len(),
            total = state.total_events,
            interrupted,
            "offline queue rehydrated"
        );

        let queue = OfflineQueue {
            seq: state.sequence.max(state.total_events),
            events: state.queued_events,
            total_events: state.total_events,
            failed_events: state.failed_events,
            completed_events: state.completed_events,
            is_connected: true,
            is_network_reachable: true,
            is_processing: false,
            processing_event_id: None,
            policy,
            clock,
            storage: Box::new(storage),
        };
        if interrupted > 0 {
            queue.persist();
        }
        Ok(queue)
    }

    /// Current time according to the queue's clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Adds an event with the policy's default retry ceiling. Returns its id.
    pub fn add_event(&mut self, event_type: EventType, data: EventData) -> String {
        let max_retries = self.policy.default_max_retries;
        self.add_event_with_max_retries(event_type, data, max_retries)
    }

    /// Adds an event with an explicit retry ceiling. Returns its id.
    pub fn add_event_with_max_retries(
        &mut self,
        event_type: EventType,
        data: EventData,
        max_retries: u32,
    ) -> String {
        let now = self.clock.now_ms();
        let events = &self.events;
        let id = generate_unique_event_id(event_type, now, self.seq, |candidate| {
            events.iter().any(|e| e.id == candidate)
        });
        self.seq += 1;

        let data_keys: Vec<&str> = data.keys().map(String::as_str).collect();
        tracing::info!(
            event_id = %id,
            event_type = %event_type,
            data_keys = ?data_keys,
            "event added to offline queue"
        );

        self.events.push(QueuedEvent::new(
            id.clone(),
            event_type,
            data,
            max_retries,
            now,
        ));
        self.total_events += 1;
        self.persist();

        id
    }

    /// Encodes a typed payload and adds it with the default retry ceiling.
    pub fn add_payload<P: Payload>(&mut self, payload: &P) -> Result<String> {
        let data = payload.to_data()?;
        Ok(self.add_event(P::EVENT_TYPE, data))
    }

    /// Records a status transition for `id`.
    ///
    /// On `Failed` with retries left, the retry count is bumped and the next
    /// attempt is scheduled with exponential backoff; the failure that spends
    /// the last retry schedules nothing. Returns `false` if no event has this
    /// id or the event is already completed.
    pub fn update_event_status(
        &mut self,
        id: &str,
        status: EventStatus,
        error: Option<&str>,
    ) -> bool {
        let now = self.clock.now_ms();
        let policy = self.policy;

        let Some(event) = self.events.iter_mut().find(|e| e.id == id) else {
            tracing::debug!(event_id = %id, %status, "status update for unknown event ignored");
            return false;
        };
        if event.status.is_terminal() {
            tracing::debug!(event_id = %id, %status, "status update for completed event ignored");
            return false;
        }

        event.status = status;
        event.last_attempt_at = Some(now);
        event.error = error.map(str::to_string);

        if status == EventStatus::Failed {
            if event.retry_count < event.max_retries {
                let attempt = event.retry_count;
                event.retry_count += 1;
                event.next_retry_at = if event.retries_exhausted() {
                    None
                } else {
                    Some(policy.next_retry_at(now, attempt))
                };
            } else {
                event.next_retry_at = None;
            }
        }

        match status {
            EventStatus::Failed => self.failed_events += 1,
            EventStatus::Completed => self.completed_events += 1,
            EventStatus::Pending | EventStatus::Processing => {}
        }

        tracing::info!(event_id = %id, %status, error = ?error, "event status updated");
        self.persist();
        true
    }

    /// Removes an event. Counters are left untouched.
    pub fn remove_event(&mut self, id: &str) -> Option<QueuedEvent> {
        let index = self.events.iter().position(|e| e.id == id)?;
        let removed = self.events.remove(index);

        tracing::debug!(event_id = %id, "event removed from queue");
        self.persist();
        Some(removed)
    }

    /// All events in insertion order.
    pub fn events(&self) -> &[QueuedEvent] {
        &self.events
    }

    /// Looks up one event.
    pub fn event_by_id(&self, id: &str) -> Option<&QueuedEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Events of one type, in insertion order.
    pub fn events_by_type(&self, event_type: EventType) -> Vec<&QueuedEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Events ready for delivery now: never tried, or failed and due for retry.
    pub fn pending_events(&self) -> Vec<&QueuedEvent> {
        let now = self.clock.now_ms();
        self.events.iter().filter(|e| e.is_ready(now)).collect()
    }

    /// Events that failed and exhausted their retries.
    pub fn failed_events(&self) -> Vec<&QueuedEvent> {
        self.events.iter().filter(|e| e.is_dead()).collect()
    }

    /// Drops completed events. Returns how many were removed.
    pub fn clear_completed_events(&mut self) -> usize {
        let before = self.events.len();
        self.events.retain(|e| e.status != EventStatus::Completed);
        let removed = before - self.events.len();

        tracing::debug!(removed, "completed events cleared from queue");
        self.persist();
        removed
    }

    /// Drops every event and resets counters and processing flags. The id
    /// sequence keeps counting so new ids never repeat old ones.
    pub fn clear_all_events(&mut self) {
        self.events.clear();
        self.total_events = 0;
        self.failed_events = 0;
        self.completed_events = 0;
        self.is_processing = false;
        self.processing_event_id = None;

        tracing::info!("all events cleared from queue");
        self.persist();
    }

    /// Puts a failed event back to pending.
    ///
    /// The retry count is kept, so the event resumes its budget where it left
    /// off. Returns `false` if the event is missing or not failed.
    pub fn retry_event(&mut self, id: &str) -> bool {
        let Some(event) = self
            .events
            .iter_mut()
            .find(|e| e.id == id && e.status == EventStatus::Failed)
        else {
            return false;
        };
        reset_for_retry(event);

        tracing::info!(event_id = %id, "event marked for retry");
        self.persist();
        true
    }

    /// Puts every failed event back to pending. Returns how many were reset.
    pub fn retry_all_failed_events(&mut self) -> usize {
        let mut count = 0;
        for event in self
            .events
            .iter_mut()
            .filter(|e| e.status == EventStatus::Failed)
        {
            reset_for_retry(event);
            count += 1;
        }

        tracing::info!(count, "all failed events marked for retry");
        self.persist();
        count
    }

    /// Records the latest connectivity observation.
    pub fn set_network_state(&mut self, is_connected: bool, is_reachable: bool) {
        self.is_connected = is_connected;
        self.is_network_reachable = is_reachable;
    }

    /// Marks whether a drain cycle is running, and optionally which event.
    pub fn set_processing(&mut self, is_processing: bool, event_id: Option<&str>) {
        self.is_processing = is_processing;
        self.processing_event_id = if is_processing {
            event_id.map(str::to_string)
        } else {
            None
        };
    }

    /// Any network transport is up.
    pub fn is_connected(&self) -> bool {
        self.is_connected
    }

    /// The internet is actually reachable.
    pub fn is_network_reachable(&self) -> bool {
        self.is_network_reachable
    }

    /// Both connected and reachable.
    pub fn is_online(&self) -> bool {
        self.is_connected && self.is_network_reachable
    }

    /// A drain cycle is running.
    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    /// The single event currently being delivered, if the drainer named one.
    pub fn processing_event_id(&self) -> Option<&str> {
        self.processing_event_id.as_deref()
    }

    /// Events ever added (since the last full clear).
    pub fn total_events(&self) -> u64 {
        self.total_events
    }

    /// `Failed` transitions recorded, retried ones included.
    pub fn failed_event_count(&self) -> u64 {
        self.failed_events
    }

    /// `Completed` transitions recorded.
    pub fn completed_event_count(&self) -> u64 {
        self.completed_events
    }

    /// Summary used by status displays.
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            is_processing: self.is_processing,
            total_events: self.total_events,
            pending_events: self.pending_events().len(),
            failed_events: self.failed_events().len(),
            completed_events: self.completed_events,
        }
    }

    fn persist(&self) {
        let state = PersistedQueue {
            queued_events: self.events.clone(),
            total_events: self.total_events,
            failed_events: self.failed_events,
            completed_events: self.completed_events,
            sequence: self.seq,
        };
        if let Err(e) = self.storage.save(&state) {
            tracing::warn!(error = %e, "failed to persist offline queue");
        }
    }
}

fn reset_for_retry(event: &mut QueuedEvent) {
    event.status = EventStatus::Pending;
    event.error = None;
    event.next_retry_at = None;
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
