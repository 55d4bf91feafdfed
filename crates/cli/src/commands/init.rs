// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use crate::config::{config_path, Config};
use crate::error::{Error, Result};

/// Writes a default `config.toml` into `state_dir`.
pub fn run(state_dir: &Path, force: bool) -> Result<()> {
    let path = config_path(state_dir);
    if path.exists() && !force {
        return Err(Error::AlreadyInitialized(state_dir.display().to_string()));
    }

    Config::default().save(state_dir)?;
    println!("Initialized unitq in {}", state_dir.display());
    println!("Edit {} to set the API url and token", path.display());
    Ok(())
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
