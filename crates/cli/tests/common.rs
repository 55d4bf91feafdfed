// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::unwrap_used)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// `unitq --state-dir <temp>` with queue-related env vars cleared.
pub fn unitq(state: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("unitq");
    cmd.arg("--state-dir")
        .arg(state.path())
        .env_remove("UNITQ_STATE_DIR")
        .env_remove("UNITQ_API_URL")
        .env_remove("UNITQ_API_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

/// Runs a command that prints an event id (`-o id`) and returns it.
pub fn queued_id(cmd: &mut Command) -> String {
    let output = cmd.arg("-o").arg("id").output().unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub fn queue_location(state: &TempDir, unit: &str) -> String {
    queued_id(
        unitq(state)
            .arg("location")
            .arg("--unit")
            .arg(unit)
            .arg("--lat")
            .arg("39.7392")
            .arg("--lon")
            .arg("-104.9903"),
    )
}

pub fn queue_unit_status(state: &TempDir, unit: &str, status: &str) -> String {
    queued_id(
        unitq(state)
            .arg("unit-status")
            .arg("--unit")
            .arg(unit)
            .arg("--status")
            .arg(status),
    )
}

/// The persisted queue blob.
pub fn read_blob(state: &TempDir) -> serde_json::Value {
    let content =
        std::fs::read_to_string(state.path().join("offline-queue-storage.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

/// Events from `unitq list -o json`.
pub fn list_json(state: &TempDir) -> Vec<serde_json::Value> {
    let output = unitq(state).args(["list", "-o", "json"]).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

pub fn write_config(state: &TempDir, content: &str) {
    std::fs::write(state.path().join("config.toml"), content).unwrap();
}

/// A local URL nothing is listening on.
pub fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api/v4", addr)
}

/// Blocking HTTP server answering every request with `status`. Returns the
/// base URL and a counter of requests served.
pub fn serve(status: u16) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let served = Arc::new(AtomicUsize::new(0));

    let counter = served.clone();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut buf = Vec::new();
            let mut chunk = [0u8; 8192];
            let mut expected = None;
            loop {
                let n = match stream.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => n,
                };
                buf.extend_from_slice(&chunk[..n]);
                if expected.is_none() {
                    if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                        let length = head
                            .lines()
                            .find_map(|l| l.strip_prefix("content-length:"))
                            .and_then(|v| v.trim().parse::<usize>().ok())
                            .unwrap_or(0);
                        expected = Some(end + 4 + length);
                    }
                }
                if expected.is_some_and(|total| buf.len() >= total) {
                    break;
                }
            }
            counter.fetch_add(1, Ordering::SeqCst);
            let response = format!(
                "HTTP/1.1 {} Stub\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    (format!("http://{}/api/v4", addr), served)
}
