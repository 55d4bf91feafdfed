// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network awareness.
//!
//! A [`ConnectivityProvider`] reports the current [`NetworkState`] and a
//! stream of changes. [`initialize_network_listener`] mirrors that stream into
//! the queue's `is_connected` / `is_network_reachable` flags, which the
//! drainer consults before each cycle.

use std::future::Future;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{lock, SharedQueue};
use crate::config::NetworkConfig;

/// Kind of link the device is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkKind {
    None,
    Unknown,
    Wifi,
    Cellular,
    Other,
}

/// One connectivity observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkState {
    /// Some network transport is up.
    pub is_connected: bool,
    /// The internet is reachable; `None` while unknown.
    pub is_internet_reachable: Option<bool>,
    pub kind: NetworkKind,
    /// Free-form detail from the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl NetworkState {
    /// Connected and reachable.
    pub fn online() -> Self {
        NetworkState {
            is_connected: true,
            is_internet_reachable: Some(true),
            kind: NetworkKind::Other,
            details: None,
        }
    }

    /// No transport at all.
    pub fn offline() -> Self {
        NetworkState {
            is_connected: false,
            is_internet_reachable: Some(false),
            kind: NetworkKind::None,
            details: None,
        }
    }

    /// Reachability with "unknown" treated as unreachable.
    pub fn is_reachable(&self) -> bool {
        self.is_internet_reachable.unwrap_or(false)
    }
}

/// Source of connectivity observations.
pub trait ConnectivityProvider: Send + Sync + 'static {
    /// Returns the current state.
    fn fetch(&self) -> Pin<Box<dyn Future<Output = NetworkState> + Send + '_>>;

    /// Returns a receiver that is notified on every state change.
    fn subscribe(&self) -> watch::Receiver<NetworkState>;
}

/// Subscribes the queue to `provider`.
///
/// The current state is fetched and applied before this returns. Later
/// changes are applied by the returned task, which runs until the provider's
/// channel closes or the handle is aborted.
pub async fn initialize_network_listener<P: ConnectivityProvider>(
    provider: Arc<P>,
    queue: SharedQueue,
) -> JoinHandle<()> {
    let mut changes = provider.subscribe();

    let state = provider.fetch().await;
    lock(&queue).set_network_state(state.is_connected, state.is_reachable());

    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let state = changes.borrow_and_update().clone();
            tracing::info!(
                is_connected = state.is_connected,
                is_internet_reachable = ?state.is_internet_reachable,
                kind = ?state.kind,
                details = ?state.details,
                "network state changed"
            );
            lock(&queue).set_network_state(state.is_connected, state.is_reachable());
        }
    })
}

/// Provider whose state is set by hand.
///
/// Used for `drain --assume-online` and in tests. Clones share the channel.
#[derive(Clone)]
pub struct ManualConnectivity {
    tx: Arc<watch::Sender<NetworkState>>,
}

impl ManualConnectivity {
    pub fn new(initial: NetworkState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        ManualConnectivity { tx: Arc::new(tx) }
    }

    /// Publishes a new state. Subscribers are only woken if it changed.
    pub fn set(&self, state: NetworkState) {
        publish(&self.tx, state);
    }
}

impl ConnectivityProvider for ManualConnectivity {
    fn fetch(&self) -> Pin<Box<dyn Future<Output = NetworkState> + Send + '_>> {
        let state = self.tx.borrow().clone();
        Box::pin(async move { state })
    }

    fn subscribe(&self) -> watch::Receiver<NetworkState> {
        self.tx.subscribe()
    }
}

/// Provider that probes the host's networking.
///
/// "Connected" means the OS has a route toward the probe address; "reachable"
/// means a TCP connection to it succeeds within the timeout.
pub struct ProbeConnectivity {
    probe_addr: SocketAddr,
    interval: Duration,
    timeout: Duration,
    tx: watch::Sender<NetworkState>,
}

impl ProbeConnectivity {
    pub fn new(config: &NetworkConfig) -> Self {
        let (tx, _rx) = watch::channel(NetworkState {
            is_connected: false,
            is_internet_reachable: None,
            kind: NetworkKind::Unknown,
            details: None,
        });
        ProbeConnectivity {
            probe_addr: config.probe_addr,
            interval: Duration::from_secs(config.probe_interval_secs.max(1)),
            timeout: Duration::from_millis(config.probe_timeout_ms),
            tx,
        }
    }

    /// Probes once.
    pub async fn probe(&self) -> NetworkState {
        if let Err(e) = self.route().await {
            return NetworkState {
                details: Some(format!("no route to {}: {}", self.probe_addr, e)),
                ..NetworkState::offline()
            };
        }

        let reachable = matches!(
            tokio::time::timeout(self.timeout, TcpStream::connect(self.probe_addr)).await,
            Ok(Ok(_))
        );
        NetworkState {
            is_connected: true,
            is_internet_reachable: Some(reachable),
            kind: NetworkKind::Other,
            details: (!reachable).then(|| format!("{} unreachable", self.probe_addr)),
        }
    }

    /// Probes on an interval, publishing changes, until `shutdown` flips.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let state = self.probe().await;
                    publish(&self.tx, state);
                }
                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }

    // Connecting a UDP socket sends nothing; it only asks the OS for a route.
    async fn route(&self) -> std::io::Result<()> {
        let local: SocketAddr = match self.probe_addr {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(self.probe_addr).await
    }
}

impl ConnectivityProvider for ProbeConnectivity {
    fn fetch(&self) -> Pin<Box<dyn Future<Output = NetworkState> + Send + '_>> {
        Box::pin(async move {
            let state = self.probe().await;
            publish(&self.tx, state.clone());
            state
        })
    }

    fn subscribe(&self) -> watch::Receiver<NetworkState> {
        self.tx.subscribe()
    }
}

/// Stores `state`, waking subscribers only if it differs from the last one.
fn publish(tx: &watch::Sender<NetworkState>, state: NetworkState) -> bool {
    tx.send_if_modified(|current| {
        if *current == state {
            return false;
        }
        *current = state;
        true
    })
}

#[cfg(test)]
#[path = "network_tests.rs"]
mod tests;
