// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for unitq-core operations.

use thiserror::Error;

/// All possible errors that can occur in unitq-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid event type: '{0}'\n  hint: valid types are: unit_status, location_update, call_image_upload")]
    InvalidEventType(String),

    #[error("invalid event status: '{0}'\n  hint: valid statuses are: pending, processing, failed, completed")]
    InvalidEventStatus(String),

    #[error("payload mismatch: event is {actual}, expected {expected}")]
    PayloadMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("queue storage is locked by another process: {0}\n  hint: stop the running drainer first")]
    Locked(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted queue storage: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for unitq-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
