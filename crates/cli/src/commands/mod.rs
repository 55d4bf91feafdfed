// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod clear;
pub mod config;
pub mod drain;
pub mod enqueue;
pub mod init;
pub mod list;
pub mod remove;
pub mod retry;
pub mod show;
pub mod stats;
pub mod status;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use unitq_core::{FileStorage, OfflineQueue, SystemClock};

use crate::config::{resolve_state_dir, Config};
use crate::error::Result;

/// Resolved state directory and configuration for one invocation.
pub struct Context {
    pub state_dir: PathBuf,
    pub config: Config,
}

impl Context {
    /// Resolves the state directory and loads its config.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let state_dir = resolve_state_dir(explicit)?;
        let config = Config::load(&state_dir)?;
        Ok(Context { state_dir, config })
    }

    /// Opens the queue stored in the state directory.
    ///
    /// Fails with a lock error while another process (usually a running
    /// drainer) owns it.
    pub fn open_queue(&self) -> Result<OfflineQueue> {
        let storage = FileStorage::open(&self.state_dir)?;
        let queue = OfflineQueue::open_with(storage, Arc::new(SystemClock), self.config.retry)?;
        Ok(queue)
    }
}

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
