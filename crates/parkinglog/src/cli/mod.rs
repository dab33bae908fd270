//! Command-line interface for parkinglog.
//!
//! This module provides the CLI structure for the `parklog` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DeleteCommand, FloorArg, HistoryCommand, OutputFormat, ParkCommand,
    ShowCommand, VehicleArg,
};

/// parklog - Remember where the car is parked
///
/// Records the floor and slot number each time you park, keeping the ten
/// most recent locations per vehicle.
#[derive(Debug, Parser)]
#[command(name = "parklog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show where each car is parked and the recent history
    Show(ShowCommand),

    /// Record a new parking location
    Park(ParkCommand),

    /// Delete a recorded location
    Delete(DeleteCommand),

    /// List recent parking locations
    History(HistoryCommand),

    /// Print this installation's user id
    Whoami,

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
