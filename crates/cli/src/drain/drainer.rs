// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The drain loop.
//!
//! Each cycle takes up to `batch_size` ready events, marks them processing,
//! delivers them concurrently, and records the outcome. Completed events stay
//! visible for `completed_retention` and are then swept from the queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use unitq_core::{EventStatus, QueueStats, QueuedEvent};

use super::{lock, Deliverer, SharedQueue};

/// Drain loop tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainConfig {
    pub interval: Duration,
    pub batch_size: usize,
    pub completed_retention: Duration,
}

impl Default for DrainConfig {
    fn default() -> Self {
        DrainConfig {
            interval: Duration::from_secs(10),
            batch_size: 3,
            completed_retention: Duration::from_secs(1),
        }
    }
}

/// Why a cycle did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    AlreadyRunning,
    Offline,
    NothingReady,
}

/// Outcome of one drain cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
    /// Completed events swept at the end of the cycle.
    pub swept: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
}

impl DrainReport {
    fn skipped(reason: SkipReason) -> Self {
        DrainReport {
            skipped: Some(reason),
            ..DrainReport::default()
        }
    }
}

/// Delivers queued events through a [`Deliverer`].
pub struct Drainer<D> {
    queue: SharedQueue,
    deliverer: Arc<D>,
    config: DrainConfig,
    running: AtomicBool,
}

/// Clears the running flag when a cycle ends, however it ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<D: Deliverer> Drainer<D> {
    pub fn new(queue: SharedQueue, deliverer: Arc<D>, config: DrainConfig) -> Self {
        Drainer {
            queue,
            deliverer,
            config,
            running: AtomicBool::new(false),
        }
    }

    /// Runs cycles every `interval`, the first immediately, until `shutdown`
    /// flips to true or its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            batch_size = self.config.batch_size,
            "offline event processing started"
        );

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.process_queued_events().await;
                }
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("offline event processing stopped");
    }

    /// Runs one cycle. A call made while another cycle is running returns
    /// immediately with [`SkipReason::AlreadyRunning`].
    pub async fn process_queued_events(&self) -> DrainReport {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::debug!("drain cycle already running, skipping");
            return DrainReport::skipped(SkipReason::AlreadyRunning);
        }
        let _guard = RunningGuard(&self.running);

        let mut report = self.deliver_ready().await;
        report.swept = self.sweep_completed();
        report
    }

    /// Resets every failed event to pending and runs a cycle right away.
    pub async fn retry_failed_events(&self) -> DrainReport {
        let count = lock(&self.queue).retry_all_failed_events();
        tracing::info!(count, "retrying failed events");
        self.process_queued_events().await
    }

    /// Removes completed events older than the retention window.
    pub fn sweep_completed(&self) -> usize {
        let mut queue = lock(&self.queue);
        let now = queue.now_ms();
        let retention =
            u64::try_from(self.config.completed_retention.as_millis()).unwrap_or(u64::MAX);

        let due: Vec<String> = queue
            .events()
            .iter()
            .filter(|e| {
                e.status == EventStatus::Completed
                    && e.last_attempt_at
                        .map_or(true, |at| now.saturating_sub(at) >= retention)
            })
            .map(|e| e.id.clone())
            .collect();

        for id in &due {
            queue.remove_event(id);
        }
        if !due.is_empty() {
            tracing::debug!(count = due.len(), "completed events swept");
        }
        due.len()
    }

    /// Queue stats, with `is_processing` reflecting this drainer.
    pub fn stats(&self) -> QueueStats {
        let mut stats = lock(&self.queue).stats();
        stats.is_processing = self.running.load(Ordering::SeqCst);
        stats
    }

    async fn deliver_ready(&self) -> DrainReport {
        let batch: Vec<QueuedEvent> = {
            let mut queue = lock(&self.queue);
            if !queue.is_online() {
                tracing::debug!(
                    is_connected = queue.is_connected(),
                    is_network_reachable = queue.is_network_reachable(),
                    "offline, skipping drain cycle"
                );
                return DrainReport::skipped(SkipReason::Offline);
            }

            let ready = queue.pending_events();
            if ready.is_empty() {
                return DrainReport::skipped(SkipReason::NothingReady);
            }
            tracing::info!(
                ready = ready.len(),
                batch_size = self.config.batch_size,
                "processing queued events"
            );
            let batch: Vec<QueuedEvent> = ready
                .into_iter()
                .take(self.config.batch_size)
                .cloned()
                .collect();

            let single = match batch.as_slice() {
                [only] => Some(only.id.as_str()),
                _ => None,
            };
            queue.set_processing(true, single);
            batch
        };

        let outcomes = join_all(batch.iter().map(|event| self.process_event(event))).await;

        lock(&self.queue).set_processing(false, None);

        let delivered = outcomes.iter().filter(|ok| **ok).count();
        DrainReport {
            attempted: outcomes.len(),
            delivered,
            failed: outcomes.len() - delivered,
            swept: 0,
            skipped: None,
        }
    }

    async fn process_event(&self, event: &QueuedEvent) -> bool {
        lock(&self.queue).update_event_status(&event.id, EventStatus::Processing, None);
        tracing::debug!(event_id = %event.id, event_type = %event.event_type, "delivering event");

        match self.deliverer.deliver(event).await {
            Ok(()) => {
                lock(&self.queue).update_event_status(&event.id, EventStatus::Completed, None);
                tracing::info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    "event delivered"
                );
                true
            }
            Err(e) => {
                let message = e.to_string();
                lock(&self.queue).update_event_status(
                    &event.id,
                    EventStatus::Failed,
                    Some(&message),
                );
                tracing::error!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    error = %message,
                    "event delivery failed"
                );
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "drainer_tests.rs"]
mod tests;
