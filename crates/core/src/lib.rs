// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! unitq-core: the offline event queue for field units.
//!
//! This crate provides the event model, retry policy, persistence backends,
//! and the [`OfflineQueue`] store shared by the `unitq` CLI and its drainer.

pub mod clock;
pub mod error;
pub mod event;
pub mod id;
pub mod retry;
pub mod storage;
pub mod store;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use event::{
    CallImageUploadData, EventData, EventStatus, EventType, LocationUpdateData, Payload,
    QueuedEvent, RoleAssignment, UnitStatusData,
};
pub use retry::{RetryPolicy, DEFAULT_MAX_RETRIES};
pub use storage::{FileStorage, MemoryStorage, PersistedQueue, Storage, STORAGE_NAME};
pub use store::{OfflineQueue, QueueStats};
