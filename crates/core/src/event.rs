// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queued event records.
//!
//! A [`QueuedEvent`] is one client-side side effect (a status change, a
//! location fix, an image upload) waiting for reliable delivery. The `data`
//! field is a free-form JSON object; each [`EventType`] has a typed
//! refinement implementing [`Payload`] that can be decoded from it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Free-form payload object stored on every event.
pub type EventData = Map<String, Value>;

/// Kind of action an event carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Unit status change (available, responding, on scene, ...).
    UnitStatus,
    /// AVL position report for a unit.
    LocationUpdate,
    /// Image attached to an active call.
    CallImageUpload,
}

impl EventType {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::UnitStatus => "unit_status",
            EventType::LocationUpdate => "location_update",
            EventType::CallImageUpload => "call_image_upload",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "unit_status" => Ok(EventType::UnitStatus),
            "location_update" => Ok(EventType::LocationUpdate),
            "call_image_upload" => Ok(EventType::CallImageUpload),
            _ => Err(Error::InvalidEventType(s.to_string())),
        }
    }
}

/// Delivery state of a queued event.
///
/// ```text
/// pending ──► processing ──► completed
///    ▲            │
///    │            ▼
///    └──────── failed   (retry, or permanent once retries are exhausted)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Waiting for its first delivery attempt.
    Pending,
    /// A drainer is delivering it right now.
    Processing,
    /// Last attempt failed.
    Failed,
    /// Delivered. Terminal.
    Completed,
}

impl EventStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "pending",
            EventStatus::Processing => "processing",
            EventStatus::Failed => "failed",
            EventStatus::Completed => "completed",
        }
    }

    /// Returns true for states that accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventStatus::Completed)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(EventStatus::Pending),
            "processing" => Ok(EventStatus::Processing),
            "failed" => Ok(EventStatus::Failed),
            "completed" => Ok(EventStatus::Completed),
            _ => Err(Error::InvalidEventStatus(s.to_string())),
        }
    }
}

/// One pending side effect awaiting delivery.
///
/// Field names serialize in camelCase so the persisted blob keeps the
/// `offline-queue-storage` layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub status: EventStatus,
    pub data: EventData,
    pub retry_count: u32,
    pub max_retries: u32,
    /// Creation time, epoch millis.
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_retry_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueuedEvent {
    /// Creates a fresh pending event.
    pub fn new(
        id: String,
        event_type: EventType,
        data: EventData,
        max_retries: u32,
        created_at: u64,
    ) -> Self {
        QueuedEvent {
            id,
            event_type,
            status: EventStatus::Pending,
            data,
            retry_count: 0,
            max_retries,
            created_at,
            last_attempt_at: None,
            next_retry_at: None,
            error: None,
        }
    }

    /// Returns true once the retry budget is spent.
    pub fn retries_exhausted(&self) -> bool {
        self.retry_count >= self.max_retries
    }

    /// Returns true if a drainer may pick this event up at `now_ms`.
    pub fn is_ready(&self, now_ms: u64) -> bool {
        match self.status {
            EventStatus::Pending => true,
            EventStatus::Failed => {
                !self.retries_exhausted() && self.next_retry_at.map_or(true, |at| at <= now_ms)
            }
            EventStatus::Processing | EventStatus::Completed => false,
        }
    }

    /// Returns true if the event failed and will not be retried automatically.
    pub fn is_dead(&self) -> bool {
        self.status == EventStatus::Failed && self.retries_exhausted()
    }

    /// Decodes the generic `data` object into a typed payload.
    pub fn payload<P: Payload>(&self) -> Result<P> {
        if self.event_type != P::EVENT_TYPE {
            return Err(Error::PayloadMismatch {
                expected: P::EVENT_TYPE.as_str(),
                actual: self.event_type.as_str(),
            });
        }
        Ok(serde_json::from_value(Value::Object(self.data.clone()))?)
    }
}

/// A typed refinement of [`QueuedEvent::data`] for one [`EventType`].
pub trait Payload: Serialize + DeserializeOwned {
    /// The event type this payload belongs to.
    const EVENT_TYPE: EventType;

    /// Encodes the payload as a generic data object.
    fn to_data(&self) -> Result<EventData> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(Error::CorruptedData(format!(
                "{} payload encoded as non-object: {}",
                Self::EVENT_TYPE,
                other
            ))),
        }
    }
}

/// Role assignment reported alongside a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    pub role_id: String,
    pub user_id: String,
}

/// Payload for [`EventType::UnitStatus`].
///
/// GPS fields are strings because the status screen captures them as text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitStatusData {
    pub unit_id: String,
    pub status_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responding_to: Option<String>,
    pub timestamp: String,
    pub timestamp_utc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<RoleAssignment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude_accuracy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
}

impl Payload for UnitStatusData {
    const EVENT_TYPE: EventType = EventType::UnitStatus;
}

/// Payload for [`EventType::LocationUpdate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdateData {
    pub unit_id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    pub timestamp: String,
}

impl Payload for LocationUpdateData {
    const EVENT_TYPE: EventType = EventType::LocationUpdate;
}

/// Payload for [`EventType::CallImageUpload`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallImageUploadData {
    pub call_id: String,
    pub user_id: String,
    pub note: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub file_path: String,
}

impl Payload for CallImageUploadData {
    const EVENT_TYPE: EventType = EventType::CallImageUpload;
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
