// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential backoff for failed deliveries.
//!
//! `delay(n) = min(base * 2^n, max)` where `n` is the event's retry count
//! before the failure is recorded. No jitter.

use serde::{Deserialize, Serialize};

/// Default number of delivery attempts before an event is dead.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default base delay (1 second).
pub const RETRY_DELAY_BASE_MS: u64 = 1_000;
/// Default backoff ceiling (5 minutes).
pub const RETRY_DELAY_MAX_MS: u64 = 300_000;

/// Backoff schedule used by the queue store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound on any single delay, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Retry ceiling given to events that don't specify one.
    #[serde(default = "default_max_retries")]
    pub default_max_retries: u32,
}

fn default_base_delay_ms() -> u64 {
    RETRY_DELAY_BASE_MS
}

fn default_max_delay_ms() -> u64 {
    RETRY_DELAY_MAX_MS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            base_delay_ms: RETRY_DELAY_BASE_MS,
            max_delay_ms: RETRY_DELAY_MAX_MS,
            default_max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry attempt `attempt` (0-based).
    pub fn delay_ms(&self, attempt: u32) -> u64 {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        self.base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms)
    }

    /// Earliest time a retry may run after failing attempt `attempt` at `now_ms`.
    pub fn next_retry_at(&self, now_ms: u64, attempt: u32) -> u64 {
        now_ms.saturating_add(self.delay_ms(attempt))
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
