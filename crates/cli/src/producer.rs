// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Producers: build typed payloads for client actions and enqueue them.
//!
//! Producers stamp the capture time; delivery may happen much later, and the
//! backend records the moment the action happened, not when it arrived.

use chrono::{DateTime, SecondsFormat, Utc};
use unitq_core::{
    CallImageUploadData, LocationUpdateData, OfflineQueue, Payload, RoleAssignment,
    UnitStatusData,
};

/// Optional GPS reading attached to a status change. Values are kept as
/// the strings the device reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GpsReading {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub accuracy: Option<String>,
    pub altitude: Option<String>,
    pub altitude_accuracy: Option<String>,
    pub speed: Option<String>,
    pub heading: Option<String>,
}

/// A unit status change as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitStatusChange {
    pub unit_id: String,
    pub status_type: String,
    pub note: Option<String>,
    pub responding_to: Option<String>,
    pub roles: Option<Vec<RoleAssignment>>,
    pub gps: GpsReading,
}

/// A position fix for a unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationFix {
    pub unit_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
}

/// ISO-8601 timestamp with milliseconds and a `Z` suffix.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// RFC 1123 style timestamp in GMT, e.g. `Tue, 14 Nov 2023 22:13:20 GMT`.
pub fn utc_timestamp(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

pub fn unit_status_payload(change: UnitStatusChange, at: DateTime<Utc>) -> UnitStatusData {
    let UnitStatusChange {
        unit_id,
        status_type,
        note,
        responding_to,
        roles,
        gps,
    } = change;

    UnitStatusData {
        unit_id,
        status_type,
        note,
        responding_to,
        timestamp: iso_timestamp(at),
        timestamp_utc: utc_timestamp(at),
        roles,
        latitude: gps.latitude,
        longitude: gps.longitude,
        accuracy: gps.accuracy,
        altitude: gps.altitude,
        altitude_accuracy: gps.altitude_accuracy,
        speed: gps.speed,
        heading: gps.heading,
    }
}

pub fn location_payload(fix: LocationFix, at: DateTime<Utc>) -> LocationUpdateData {
    LocationUpdateData {
        unit_id: fix.unit_id,
        latitude: fix.latitude,
        longitude: fix.longitude,
        accuracy: fix.accuracy,
        heading: fix.heading,
        speed: fix.speed,
        timestamp: iso_timestamp(at),
    }
}

/// Enqueues a unit status change. Returns the event id.
pub fn queue_unit_status_event(
    queue: &mut OfflineQueue,
    change: UnitStatusChange,
    at: DateTime<Utc>,
    max_retries: Option<u32>,
) -> unitq_core::Result<String> {
    enqueue(queue, &unit_status_payload(change, at), max_retries)
}

/// Enqueues a location fix. Returns the event id.
pub fn queue_location_update_event(
    queue: &mut OfflineQueue,
    fix: LocationFix,
    at: DateTime<Utc>,
    max_retries: Option<u32>,
) -> unitq_core::Result<String> {
    enqueue(queue, &location_payload(fix, at), max_retries)
}

/// Enqueues an image attachment for a call. Returns the event id.
///
/// Only the file path is stored; the file is read at delivery time.
pub fn queue_call_image_upload_event(
    queue: &mut OfflineQueue,
    upload: CallImageUploadData,
    max_retries: Option<u32>,
) -> unitq_core::Result<String> {
    enqueue(queue, &upload, max_retries)
}

fn enqueue<P: Payload>(
    queue: &mut OfflineQueue,
    payload: &P,
    max_retries: Option<u32>,
) -> unitq_core::Result<String> {
    match max_retries {
        Some(n) => Ok(queue.add_event_with_max_retries(P::EVENT_TYPE, payload.to_data()?, n)),
        None => queue.add_payload(payload),
    }
}

#[cfg(test)]
#[path = "producer_tests.rs"]
mod tests;
