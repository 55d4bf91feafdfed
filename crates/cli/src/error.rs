// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::drain::DeliveryError;

/// All possible errors that can occur in the unitq CLI.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("already initialized at {0}\n  hint: pass --force to overwrite config.toml")]
    AlreadyInitialized(String),

    #[error("event not found: {0}")]
    EventNotFound(String),

    #[error("event {id} is {status}\n  hint: only failed events can be retried")]
    NotRetryable { id: String, status: String },

    #[error("invalid event type: '{0}'\n  hint: valid types are: unit_status, location_update, call_image_upload")]
    InvalidEventType(String),

    #[error("invalid event status: '{0}'\n  hint: valid statuses are: pending, processing, failed, completed")]
    InvalidEventStatus(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("{0}")]
    Locked(String),

    #[error("corrupted queue storage: {0}")]
    CorruptedData(String),

    #[error("event payload does not match its type: {0}")]
    Payload(String),

    #[error("no state directory: set UNITQ_STATE_DIR or pass --state-dir")]
    NoStateDir,

    #[error("delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// A specialized Result type for unitq CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<unitq_core::Error> for Error {
    fn from(e: unitq_core::Error) -> Self {
        match e {
            unitq_core::Error::InvalidEventType(s) => Error::InvalidEventType(s),
            unitq_core::Error::InvalidEventStatus(s) => Error::InvalidEventStatus(s),
            e @ unitq_core::Error::PayloadMismatch { .. } => Error::Payload(e.to_string()),
            e @ unitq_core::Error::Locked(_) => Error::Locked(e.to_string()),
            unitq_core::Error::Io(e) => Error::Io(e),
            unitq_core::Error::Json(e) => Error::Json(e),
            unitq_core::Error::CorruptedData(s) => Error::CorruptedData(s),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
