// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for drain module tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use unitq_core::{
    LocationUpdateData, ManualClock, MemoryStorage, OfflineQueue, QueuedEvent, RetryPolicy,
    UnitStatusData,
};

use super::{share, Deliverer, DeliveryError, DeliveryResult, SharedQueue};

/// Fixed start time for queue tests.
pub const T0: u64 = 1_700_000_000_000;

/// A shared queue over in-memory storage and a manual clock.
pub struct QueueFixture {
    pub queue: SharedQueue,
    pub clock: ManualClock,
    pub storage: MemoryStorage,
}

impl QueueFixture {
    pub fn new() -> Self {
        let clock = ManualClock::new(T0);
        let storage = MemoryStorage::new();
        let queue = OfflineQueue::open_with(
            storage.clone(),
            Arc::new(clock.clone()),
            RetryPolicy::default(),
        )
        .unwrap();
        QueueFixture {
            queue: share(queue),
            clock,
            storage,
        }
    }

    pub fn add_unit_status(&self, unit_id: &str) -> String {
        super::lock(&self.queue)
            .add_payload(&unit_status(unit_id))
            .unwrap()
    }

    pub fn add_location(&self, unit_id: &str) -> String {
        super::lock(&self.queue)
            .add_payload(&location(unit_id))
            .unwrap()
    }

    pub fn event(&self, id: &str) -> Option<QueuedEvent> {
        super::lock(&self.queue).event_by_id(id).cloned()
    }
}

pub fn unit_status(unit_id: &str) -> UnitStatusData {
    UnitStatusData {
        unit_id: unit_id.to_string(),
        status_type: "2".to_string(),
        timestamp: "2023-11-14T22:13:20.000Z".to_string(),
        timestamp_utc: "Tue, 14 Nov 2023 22:13:20 GMT".to_string(),
        ..UnitStatusData::default()
    }
}

pub fn location(unit_id: &str) -> LocationUpdateData {
    LocationUpdateData {
        unit_id: unit_id.to_string(),
        latitude: 39.7392,
        longitude: -104.9903,
        accuracy: Some(5.0),
        heading: None,
        speed: None,
        timestamp: "2023-11-14T22:13:20.000Z".to_string(),
    }
}

/// Deliverer that records attempts and fails on demand.
#[derive(Clone, Default)]
pub struct MockDeliverer {
    attempts: Arc<Mutex<Vec<String>>>,
    failures: Arc<Mutex<HashMap<String, String>>>,
    fail_all: Arc<Mutex<Option<String>>>,
    delay: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockDeliverer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each delivery sleeps this long before answering.
    pub fn with_delay(delay: Duration) -> Self {
        MockDeliverer {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Makes deliveries of `id` fail with `message`.
    pub fn fail_event(&self, id: &str, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(id.to_string(), message.to_string());
    }

    /// Makes every delivery fail with `message`, or none when `None`.
    pub fn fail_all(&self, message: Option<&str>) {
        *self.fail_all.lock().unwrap() = message.map(str::to_string);
    }

    /// Ids of every event a delivery was attempted for, in call order.
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    /// Highest number of deliveries seen running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Deliverer for MockDeliverer {
    fn deliver<'a>(
        &'a self,
        event: &'a QueuedEvent,
    ) -> Pin<Box<dyn Future<Output = DeliveryResult<()>> + Send + 'a>> {
        Box::pin(async move {
            self.attempts.lock().unwrap().push(event.id.clone());
            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(running, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let failure = self
                .fail_all
                .lock()
                .unwrap()
                .clone()
                .or_else(|| self.failures.lock().unwrap().get(&event.id).cloned());
            match failure {
                Some(message) => Err(DeliveryError::Request(message)),
                None => Ok(()),
            }
        })
    }
}

/// A request captured by [`StubServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Minimal HTTP/1.1 server that records requests and answers with the
/// status chosen by `respond` for each path.
pub struct StubServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub async fn start(respond: fn(&str) -> u16) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(handle_connection(stream, respond, recorded.clone()));
            }
        });

        StubServer { addr, requests }
    }

    /// Base URL to configure the deliverer with.
    pub fn url(&self) -> String {
        format!("http://{}/api/v4", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    respond: fn(&str) -> u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();
    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    let status = respond(&path);
    requests.lock().unwrap().push(RecordedRequest {
        method,
        path,
        headers,
        body,
    });

    let reply = if (200..300).contains(&status) {
        String::new()
    } else {
        "rejected".to_string()
    };
    let response = format!(
        "HTTP/1.1 {status} Stub\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
        reply.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}
