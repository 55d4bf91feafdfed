// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::TempDir;

#[test]
fn init_writes_default_config() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("state");

    run(&dir, false).unwrap();

    assert!(config_path(&dir).exists());
    assert_eq!(Config::read(&dir).unwrap(), Config::default());
}

#[test]
fn init_refuses_to_overwrite() {
    let temp = TempDir::new().unwrap();
    run(temp.path(), false).unwrap();

    let err = run(temp.path(), false).unwrap_err();
    assert!(matches!(err, Error::AlreadyInitialized(_)));
}

#[test]
fn init_force_resets_config() {
    let temp = TempDir::new().unwrap();
    std::fs::write(config_path(temp.path()), "[drain]\nbatch_size = 9\n").unwrap();

    run(temp.path(), true).unwrap();

    assert_eq!(Config::read(temp.path()).unwrap().drain.batch_size, 3);
}
