// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! unitq - an offline outbox for field unit actions.
//!
//! This crate provides the `unitq` CLI on top of [`unitq_core`]:
//!
//! - [`producer`] - build and enqueue status, location and image events
//! - [`drain`] - connectivity tracking and background delivery
//! - [`Config`] - `config.toml` in the state directory
//! - [`Error`] - Error types for all CLI operations

mod cli;
mod commands;
mod display;
mod logging;

pub mod config;
pub mod drain;
pub mod env;
pub mod error;
pub mod producer;

pub use cli::{Cli, Command, GpsArgs, OutputFormat};
pub use config::Config;
pub use error::{Error, Result};

use clap::CommandFactory;

use commands::enqueue::CallImageArgs;
use commands::list::Selection;
use commands::Context;
use producer::{GpsReading, LocationFix, UnitStatusChange};

/// Runs one parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let state_dir = cli.state_dir.as_deref();
    match cli.command {
        Command::Init { force } => {
            commands::init::run(&config::resolve_state_dir(state_dir)?, force)
        }
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "unitq", &mut std::io::stdout());
            Ok(())
        }
        command => {
            let ctx = Context::load(state_dir)?;
            dispatch(&ctx, command)
        }
    }
}

fn dispatch(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::UnitStatus {
            unit,
            status,
            note,
            responding_to,
            role,
            gps,
            max_retries,
            output,
        } => {
            let change = UnitStatusChange {
                unit_id: unit,
                status_type: status,
                note,
                responding_to,
                roles: (!role.is_empty()).then_some(role),
                gps: GpsReading {
                    latitude: gps.lat,
                    longitude: gps.lon,
                    accuracy: gps.accuracy,
                    altitude: gps.altitude,
                    altitude_accuracy: gps.altitude_accuracy,
                    speed: gps.speed,
                    heading: gps.heading,
                },
            };
            let mut queue = ctx.open_queue()?;
            commands::enqueue::unit_status(&mut queue, change, max_retries, output).map(drop)
        }
        Command::Location {
            unit,
            lat,
            lon,
            accuracy,
            heading,
            speed,
            max_retries,
            output,
        } => {
            let fix = LocationFix {
                unit_id: unit,
                latitude: lat,
                longitude: lon,
                accuracy,
                heading,
                speed,
            };
            let mut queue = ctx.open_queue()?;
            commands::enqueue::location(&mut queue, fix, max_retries, output).map(drop)
        }
        Command::CallImage {
            call,
            user,
            file,
            name,
            note,
            lat,
            lon,
            max_retries,
            output,
        } => {
            let args = CallImageArgs {
                call_id: call,
                user_id: user,
                file: &file,
                name,
                note,
                latitude: lat,
                longitude: lon,
            };
            let mut queue = ctx.open_queue()?;
            commands::enqueue::call_image(&mut queue, args, max_retries, output).map(drop)
        }
        Command::List {
            event_type,
            pending,
            failed,
            output,
        } => {
            let selection = if pending {
                Selection::Pending
            } else if failed {
                Selection::Failed
            } else {
                Selection::All
            };
            commands::list::run(&ctx.open_queue()?, selection, event_type, output)
        }
        Command::Show { id, output } => commands::show::run(&ctx.open_queue()?, &id, output),
        Command::Remove { id } => commands::remove::run(&mut ctx.open_queue()?, &id),
        Command::Retry { id, all } => {
            let mut queue = ctx.open_queue()?;
            match id {
                Some(id) if !all => commands::retry::run_one(&mut queue, &id),
                _ => commands::retry::run_all(&mut queue).map(drop),
            }
        }
        Command::Clear { all } => commands::clear::run(&mut ctx.open_queue()?, all),
        Command::Stats { output } => commands::stats::run(&ctx.open_queue()?, output),
        Command::Status { output } => commands::status::run(ctx, output),
        Command::Drain {
            once,
            assume_online,
        } => commands::drain::run(ctx, once, assume_online),
        Command::Config => commands::config::run(ctx),
        Command::Init { .. } | Command::Completion { .. } => Ok(()),
    }
}
