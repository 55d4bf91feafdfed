// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background delivery of queued events.
//!
//! This module provides:
//! - Connectivity providers and the listener that feeds them into the queue
//! - The [`Deliverer`] seam and its HTTP implementation
//! - The [`Drainer`] that processes ready events in small concurrent batches

mod drainer;
mod network;
mod transport;

use std::sync::{Arc, Mutex, MutexGuard};

use unitq_core::OfflineQueue;

pub use drainer::{DrainConfig, DrainReport, Drainer, SkipReason};
pub use network::{
    initialize_network_listener, ConnectivityProvider, ManualConnectivity, NetworkKind,
    NetworkState, ProbeConnectivity,
};
pub use transport::{
    Deliverer, DeliveryError, DeliveryResult, HttpDeliverer, SaveCallFileInput,
    SaveUnitLocationInput, SaveUnitStatusInput, SaveUnitStatusRoleInput,
};

/// Queue shared between the drainer, the network listener and producers.
pub type SharedQueue = Arc<Mutex<OfflineQueue>>;

/// Wraps a queue for sharing.
pub fn share(queue: OfflineQueue) -> SharedQueue {
    Arc::new(Mutex::new(queue))
}

/// Locks a shared queue, recovering from poisoning.
///
/// Queue operations never leave the store half-updated, so a panic in
/// another holder does not invalidate it.
pub fn lock(queue: &SharedQueue) -> MutexGuard<'_, OfflineQueue> {
    queue.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
pub(crate) mod test_helpers;
