// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use sha2::{Digest, Sha256};

use crate::event::EventType;

/// Prefix shared by every queued event id.
pub const EVENT_ID_PREFIX: &str = "evt";

/// Generate an event ID from type, creation time, and a per-store sequence.
/// Format: evt-{hash} where hash is first 8 hex chars of SHA256(type + created_at + seq)
pub fn generate_event_id(event_type: EventType, created_at_ms: u64, seq: u64) -> String {
    let input = format!("{}{}{}", event_type, created_at_ms, seq);
    let hash = Sha256::digest(input.as_bytes());
    let short_hash = hex::encode(&hash[..4]);
    format!("{}-{}", EVENT_ID_PREFIX, short_hash)
}

/// Generate a unique event ID, handling collisions by appending incrementing suffix.
pub fn generate_unique_event_id<F>(
    event_type: EventType,
    created_at_ms: u64,
    seq: u64,
    exists: F,
) -> String
where
    F: Fn(&str) -> bool,
{
    let base_id = generate_event_id(event_type, created_at_ms, seq);

    if !exists(&base_id) {
        return base_id;
    }

    let mut suffix = 2;
    loop {
        let id = format!("{}-{}", base_id, suffix);
        if !exists(&id) {
            return id;
        }
        suffix += 1;
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
