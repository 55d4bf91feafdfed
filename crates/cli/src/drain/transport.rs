// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery of queued events to the backend.
//!
//! [`Deliverer`] is the seam the drainer talks to; [`HttpDeliverer`] is the
//! production implementation that posts each event type to its endpoint.

use std::future::Future;
use std::pin::Pin;

use base64::Engine;
use serde::Serialize;
use unitq_core::{
    CallImageUploadData, EventType, LocationUpdateData, QueuedEvent, RoleAssignment,
    UnitStatusData,
};

use crate::config::ApiConfig;

/// Endpoint for unit status changes.
pub const SAVE_UNIT_STATUS_PATH: &str = "UnitStatus/SaveUnitStatus";
/// Endpoint for location fixes.
pub const SET_UNIT_LOCATION_PATH: &str = "UnitLocation/SetUnitLocation";
/// Endpoint for call attachments.
pub const SAVE_CALL_FILE_PATH: &str = "CallFiles/SaveCallFile";

/// Call file type code for images.
const CALL_FILE_TYPE_IMAGE: u32 = 2;

/// Error type for delivery attempts.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The request could not be built or sent.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The stored data does not decode as the event's payload.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// A file referenced by the event could not be read.
    #[error("cannot read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for delivery operations.
pub type DeliveryResult<T> = Result<T, DeliveryError>;

/// Something that can deliver one queued event.
///
/// Implementations must be shareable: the drainer delivers a batch
/// concurrently through a single instance.
pub trait Deliverer: Send + Sync {
    /// Delivers `event`. An `Err` marks the attempt as failed.
    fn deliver<'a>(
        &'a self,
        event: &'a QueuedEvent,
    ) -> Pin<Box<dyn Future<Output = DeliveryResult<()>> + Send + 'a>>;
}

/// Role entry in a unit status request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SaveUnitStatusRoleInput {
    pub role_id: String,
    pub user_id: String,
}

/// Body of a unit status request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SaveUnitStatusInput {
    pub id: String,
    #[serde(rename = "Type")]
    pub status_type: String,
    pub note: String,
    pub responding_to: String,
    pub timestamp: String,
    pub timestamp_utc: String,
    pub latitude: String,
    pub longitude: String,
    pub accuracy: String,
    pub altitude: String,
    pub altitude_accuracy: String,
    pub speed: String,
    pub heading: String,
    pub roles: Vec<SaveUnitStatusRoleInput>,
}

impl From<&UnitStatusData> for SaveUnitStatusInput {
    fn from(data: &UnitStatusData) -> Self {
        // Position fields only make sense together; with a fix the optional
        // ones default to "0", without one everything is blank.
        let has_fix = present(&data.latitude) && present(&data.longitude);
        let gps = |value: &Option<String>| match (has_fix, value) {
            (false, _) => String::new(),
            (true, Some(v)) if !v.is_empty() => v.clone(),
            (true, _) => "0".to_string(),
        };

        SaveUnitStatusInput {
            id: data.unit_id.clone(),
            status_type: data.status_type.clone(),
            note: data.note.clone().unwrap_or_default(),
            responding_to: data
                .responding_to
                .clone()
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| "0".to_string()),
            timestamp: data.timestamp.clone(),
            timestamp_utc: data.timestamp_utc.clone(),
            latitude: gps(&data.latitude),
            longitude: gps(&data.longitude),
            accuracy: gps(&data.accuracy),
            altitude: gps(&data.altitude),
            altitude_accuracy: gps(&data.altitude_accuracy),
            speed: gps(&data.speed),
            heading: gps(&data.heading),
            roles: data
                .roles
                .iter()
                .flatten()
                .map(|RoleAssignment { role_id, user_id }| SaveUnitStatusRoleInput {
                    role_id: role_id.clone(),
                    user_id: user_id.clone(),
                })
                .collect(),
        }
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Body of a location request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SaveUnitLocationInput {
    pub unit_id: String,
    pub latitude: String,
    pub longitude: String,
    pub accuracy: String,
    pub heading: String,
    pub speed: String,
    pub timestamp: String,
}

impl From<&LocationUpdateData> for SaveUnitLocationInput {
    fn from(data: &LocationUpdateData) -> Self {
        let text = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
        SaveUnitLocationInput {
            unit_id: data.unit_id.clone(),
            latitude: data.latitude.to_string(),
            longitude: data.longitude.to_string(),
            accuracy: text(data.accuracy),
            heading: text(data.heading),
            speed: text(data.speed),
            timestamp: data.timestamp.clone(),
        }
    }
}

/// Body of a call file upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SaveCallFileInput {
    pub call_id: String,
    pub user_id: String,
    #[serde(rename = "Type")]
    pub file_type: u32,
    pub name: String,
    pub note: String,
    /// Base64 file contents.
    pub data: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl SaveCallFileInput {
    /// Builds the upload body from event data and the raw file bytes.
    pub fn new(data: &CallImageUploadData, contents: &[u8]) -> Self {
        SaveCallFileInput {
            call_id: data.call_id.clone(),
            user_id: data.user_id.clone(),
            file_type: CALL_FILE_TYPE_IMAGE,
            name: data.name.clone(),
            note: data.note.clone(),
            data: base64::engine::general_purpose::STANDARD.encode(contents),
            latitude: data.latitude,
            longitude: data.longitude,
        }
    }
}

/// Posts events to the backend's REST API.
pub struct HttpDeliverer {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpDeliverer {
    /// Builds a client for `api`.
    pub fn new(api: &ApiConfig) -> DeliveryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(api.timeout())
            .user_agent(concat!("unitq/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DeliveryError::Request(e.to_string()))?;

        Ok(HttpDeliverer {
            client,
            base_url: api.url.trim_end_matches('/').to_string(),
            token: api.token.clone(),
        })
    }

    /// Full URL for an endpoint path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post<T: Serialize + Sync>(&self, path: &str, body: &T) -> DeliveryResult<()> {
        let mut request = self.client.post(self.endpoint(path)).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DeliveryError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    async fn deliver_event(&self, event: &QueuedEvent) -> DeliveryResult<()> {
        match event.event_type {
            EventType::UnitStatus => {
                let data: UnitStatusData = decode(event)?;
                self.post(SAVE_UNIT_STATUS_PATH, &SaveUnitStatusInput::from(&data))
                    .await
            }
            EventType::LocationUpdate => {
                let data: LocationUpdateData = decode(event)?;
                self.post(SET_UNIT_LOCATION_PATH, &SaveUnitLocationInput::from(&data))
                    .await
            }
            EventType::CallImageUpload => {
                let data: CallImageUploadData = decode(event)?;
                let contents = tokio::fs::read(&data.file_path).await.map_err(|source| {
                    DeliveryError::File {
                        path: data.file_path.clone(),
                        source,
                    }
                })?;
                self.post(SAVE_CALL_FILE_PATH, &SaveCallFileInput::new(&data, &contents))
                    .await
            }
        }
    }
}

impl Deliverer for HttpDeliverer {
    fn deliver<'a>(
        &'a self,
        event: &'a QueuedEvent,
    ) -> Pin<Box<dyn Future<Output = DeliveryResult<()>> + Send + 'a>> {
        Box::pin(self.deliver_event(event))
    }
}

fn decode<P: unitq_core::Payload>(event: &QueuedEvent) -> DeliveryResult<P> {
    event
        .payload::<P>()
        .map_err(|e| DeliveryError::InvalidPayload(e.to_string()))
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
