// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use unitq_core::{EventType, RoleAssignment};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

fn parse_event_type(s: &str) -> Result<EventType, String> {
    EventType::from_str(s).map_err(|e| e.to_string())
}

/// Parse `ROLE_ID:USER_ID`.
fn parse_role(s: &str) -> Result<RoleAssignment, String> {
    match s.split_once(':') {
        Some((role, user)) if !role.trim().is_empty() && !user.trim().is_empty() => {
            Ok(RoleAssignment {
                role_id: role.trim().to_string(),
                user_id: user.trim().to_string(),
            })
        }
        _ => Err("expected ROLE_ID:USER_ID".to_string()),
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    /// Event ids only, one per line.
    Id,
}

#[derive(Parser)]
#[command(name = "unitq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline outbox for field unit actions")]
#[command(
    long_about = "Offline outbox for field unit actions.\n\n\
    Status changes, location fixes and call images are queued locally and \
    delivered to the dispatch API once the network is back."
)]
pub struct Cli {
    /// Directory holding the queue and config.toml
    #[arg(long, global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Optional GPS reading attached to a status change.
#[derive(Args, Debug, Clone, Default)]
pub struct GpsArgs {
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    pub lat: Option<String>,
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lon: Option<String>,
    #[arg(long)]
    pub accuracy: Option<String>,
    #[arg(long)]
    pub altitude: Option<String>,
    #[arg(long)]
    pub altitude_accuracy: Option<String>,
    #[arg(long)]
    pub speed: Option<String>,
    #[arg(long)]
    pub heading: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a default config.toml into the state directory
    Init {
        /// Overwrite an existing config.toml
        #[arg(long)]
        force: bool,
    },

    /// Queue a unit status change
    #[command(after_help = "\
Examples:
  unitq unit-status --unit 12 --status 3
  unitq unit-status --unit 12 --status 5 --responding-to 1041 --role 7:user-2
  unitq unit-status --unit 12 --status 2 --lat 39.74 --lon -104.99 --speed 12")]
    UnitStatus {
        /// Unit id
        #[arg(long, value_parser = non_empty_string)]
        unit: String,

        /// Status type code
        #[arg(long, value_parser = non_empty_string)]
        status: String,

        #[arg(long)]
        note: Option<String>,

        /// Call or station the unit is responding to
        #[arg(long)]
        responding_to: Option<String>,

        /// Role assignment as ROLE_ID:USER_ID (repeatable)
        #[arg(long, value_parser = parse_role)]
        role: Vec<RoleAssignment>,

        #[command(flatten)]
        gps: GpsArgs,

        /// Retry ceiling for this event
        #[arg(long)]
        max_retries: Option<u32>,

        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Queue a unit location fix
    #[command(after_help = "\
Examples:
  unitq location --unit 12 --lat 39.7392 --lon -104.9903
  unitq location --unit 12 --lat 39.7392 --lon -104.9903 --heading 270 --speed 15")]
    Location {
        #[arg(long, value_parser = non_empty_string)]
        unit: String,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        #[arg(long)]
        accuracy: Option<f64>,

        #[arg(long)]
        heading: Option<f64>,

        #[arg(long)]
        speed: Option<f64>,

        #[arg(long)]
        max_retries: Option<u32>,

        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Queue an image attachment for a call
    #[command(after_help = "\
Examples:
  unitq call-image --call 1041 --user user-2 --file ./scene.jpg
  unitq call-image --call 1041 --user user-2 --file ./door.jpg --note \"rear entry\"")]
    CallImage {
        /// Call id
        #[arg(long, value_parser = non_empty_string)]
        call: String,

        /// Uploading user id
        #[arg(long, value_parser = non_empty_string)]
        user: String,

        /// Image file; read when the event is delivered
        #[arg(long)]
        file: PathBuf,

        /// Display name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,

        #[arg(long, default_value = "")]
        note: String,

        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,

        #[arg(long)]
        max_retries: Option<u32>,

        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List queued events
    #[command(after_help = "\
Examples:
  unitq list                         All events, oldest first
  unitq list --pending               Events ready for delivery now
  unitq list --failed                Events that exhausted their retries
  unitq list --type location_update -o json")]
    List {
        /// Only events of this type (unit_status, location_update, call_image_upload)
        #[arg(long = "type", short = 't', value_parser = parse_event_type)]
        event_type: Option<EventType>,

        /// Only events ready for delivery now
        #[arg(long, conflicts_with = "failed")]
        pending: bool,

        /// Only events that exhausted their retries
        #[arg(long)]
        failed: bool,

        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show one event
    Show {
        id: String,

        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Remove an event from the queue
    Remove { id: String },

    /// Put failed events back to pending
    #[command(arg_required_else_help = true)]
    Retry {
        /// Event to retry
        #[arg(conflicts_with = "all", required_unless_present = "all")]
        id: Option<String>,

        /// Retry every failed event
        #[arg(long)]
        all: bool,
    },

    /// Remove completed events, or everything with --all
    Clear {
        /// Remove every event and reset the counters
        #[arg(long)]
        all: bool,
    },

    /// Show connectivity and queue statistics
    Status {
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show queue statistics
    Stats {
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Deliver queued events to the API
    #[command(after_help = "\
Examples:
  unitq drain                        Run until interrupted
  unitq drain --once                 Run a single cycle and exit
  unitq drain --once --assume-online Skip the connectivity probe")]
    Drain {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,

        /// Treat the network as connected and reachable
        #[arg(long)]
        assume_online: bool,
    },

    /// Print the effective configuration
    Config,

    /// Generate shell completions
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
