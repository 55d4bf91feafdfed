// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::Context;
use crate::config::config_path;
use crate::error::{Error, Result};

const REDACTED: &str = "********";

/// Prints the effective configuration, with the API token masked.
pub fn run(ctx: &Context) -> Result<()> {
    let mut config = ctx.config.clone();
    if config.api.token.is_some() {
        config.api.token = Some(REDACTED.to_string());
    }

    let content = toml::to_string_pretty(&config)
        .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;

    let path = config_path(&ctx.state_dir);
    let source = if path.exists() { "" } else { " (not present, defaults)" };
    println!("# {}{}", path.display(), source);
    print!("{}", content);
    Ok(())
}
