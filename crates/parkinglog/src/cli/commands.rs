//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::record::{Floor, Vehicle};

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Park command arguments.
#[derive(Debug, Args)]
pub struct ParkCommand {
    /// Floor designator (B1, B2, Y, G, V, P)
    #[arg(value_enum, ignore_case = true)]
    pub floor: FloorArg,

    /// Slot number, up to 3 digits (prompted for if omitted)
    pub number: Option<String>,

    /// Vehicle to record the location for
    #[arg(long, value_enum, ignore_case = true)]
    pub car: Option<VehicleArg>,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Identifier of the record to delete
    pub id: String,
}

/// History command arguments.
#[derive(Debug, Args)]
pub struct HistoryCommand {
    /// Only show records for this vehicle
    #[arg(long, value_enum, ignore_case = true)]
    pub car: Option<VehicleArg>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Floor argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FloorArg {
    /// Basement level 1
    B1,
    /// Basement level 2
    B2,
    /// Yellow zone (basement 1)
    Y,
    /// Green zone (basement 1)
    G,
    /// Violet zone (basement 2)
    V,
    /// Pink zone (basement 2)
    P,
}

impl From<FloorArg> for Floor {
    fn from(arg: FloorArg) -> Self {
        match arg {
            FloorArg::B1 => Self::B1,
            FloorArg::B2 => Self::B2,
            FloorArg::Y => Self::Y,
            FloorArg::G => Self::G,
            FloorArg::V => Self::V,
            FloorArg::P => Self::P,
        }
    }
}

/// Vehicle argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VehicleArg {
    /// The G80
    G80,
    /// The G90
    G90,
}

impl From<VehicleArg> for Vehicle {
    fn from(arg: VehicleArg) -> Self {
        match arg {
            VehicleArg::G80 => Self::G80,
            VehicleArg::G90 => Self::G90,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}
