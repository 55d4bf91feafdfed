// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `unit-status`, `location` and `call-image`.

use std::path::Path;

use chrono::{DateTime, Utc};
use unitq_core::{CallImageUploadData, OfflineQueue};

use super::print_json;
use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use crate::producer::{
    queue_call_image_upload_event, queue_location_update_event, queue_unit_status_event,
    LocationFix, UnitStatusChange,
};

pub fn unit_status(
    queue: &mut OfflineQueue,
    change: UnitStatusChange,
    max_retries: Option<u32>,
    output: OutputFormat,
) -> Result<String> {
    let at = capture_time(queue);
    let id = queue_unit_status_event(queue, change, at, max_retries)?;
    print_queued(queue, &id, output)?;
    Ok(id)
}

pub fn location(
    queue: &mut OfflineQueue,
    fix: LocationFix,
    max_retries: Option<u32>,
    output: OutputFormat,
) -> Result<String> {
    let at = capture_time(queue);
    let id = queue_location_update_event(queue, fix, at, max_retries)?;
    print_queued(queue, &id, output)?;
    Ok(id)
}

/// Image attachment as given on the command line.
pub struct CallImageArgs<'a> {
    pub call_id: String,
    pub user_id: String,
    pub file: &'a Path,
    pub name: Option<String>,
    pub note: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub fn call_image(
    queue: &mut OfflineQueue,
    args: CallImageArgs<'_>,
    max_retries: Option<u32>,
    output: OutputFormat,
) -> Result<String> {
    // The drainer may run from another directory, so store an absolute path.
    let file_path = args
        .file
        .canonicalize()
        .ok()
        .filter(|p| p.is_file())
        .ok_or_else(|| Error::FileNotFound(args.file.display().to_string()))?;

    let name = match args.name {
        Some(name) => name,
        None => file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let upload = CallImageUploadData {
        call_id: args.call_id,
        user_id: args.user_id,
        note: args.note,
        name,
        latitude: args.latitude,
        longitude: args.longitude,
        file_path: file_path.display().to_string(),
    };
    let id = queue_call_image_upload_event(queue, upload, max_retries)?;
    print_queued(queue, &id, output)?;
    Ok(id)
}

fn capture_time(queue: &OfflineQueue) -> DateTime<Utc> {
    i64::try_from(queue.now_ms())
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or_else(Utc::now)
}

fn print_queued(queue: &OfflineQueue, id: &str, output: OutputFormat) -> Result<()> {
    let event = queue
        .event_by_id(id)
        .ok_or_else(|| Error::EventNotFound(id.to_string()))?;

    match output {
        OutputFormat::Text => println!("Queued {} event {}", event.event_type, event.id),
        OutputFormat::Id => println!("{}", event.id),
        OutputFormat::Json => print_json(event)?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "enqueue_tests.rs"]
mod tests;
