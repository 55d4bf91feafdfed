// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::testing::{add_location, exhaust, test_queue};

#[test]
fn retry_one_resets_failed_event() {
    let (mut queue, _clock) = test_queue();
    let id = add_location(&mut queue, "U1");
    exhaust(&mut queue, &id);

    run_one(&mut queue, &id).unwrap();

    let event = queue.event_by_id(&id).unwrap();
    assert_eq!(event.status, EventStatus::Pending);
    assert_eq!(event.retry_count, 3);
    assert_eq!(event.error, None);
    assert_eq!(queue.pending_events().len(), 1);
}

#[test]
fn retry_one_rejects_pending_event() {
    let (mut queue, _clock) = test_queue();
    let id = add_location(&mut queue, "U1");

    let err = run_one(&mut queue, &id).unwrap_err();
    assert!(matches!(err, Error::NotRetryable { ref status, .. } if status == "pending"));
}

#[test]
fn retry_one_unknown_id() {
    let (mut queue, _clock) = test_queue();
    let err = run_one(&mut queue, "evt-missing").unwrap_err();
    assert!(matches!(err, Error::EventNotFound(_)));
}

#[test]
fn retry_all_counts_failed_only() {
    let (mut queue, _clock) = test_queue();
    add_location(&mut queue, "U1");
    let a = add_location(&mut queue, "U2");
    let b = add_location(&mut queue, "U3");
    exhaust(&mut queue, &a);
    queue.update_event_status(&b, EventStatus::Failed, Some("503"));

    assert_eq!(run_all(&mut queue).unwrap(), 2);
    assert!(queue.failed_events().is_empty());
    assert_eq!(run_all(&mut queue).unwrap(), 0);
}
