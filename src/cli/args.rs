//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::orbit::units::DisplayInput;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "orbcompare", version)]
#[command(about = "Compare a physics trajectory with a learned prediction")]
pub struct Args {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Request one simulation and play it back headlessly
    Run(RunArgs),
    /// Print the effective configuration as YAML
    Config {
        /// Configuration file to load
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Initial state and output options for `run`.
///
/// Values are taken as typed, like form fields: text that does not parse
/// becomes NaN in the request.
#[derive(Debug, Clone, PartialEq, Eq, clap::Args)]
pub struct RunArgs {
    /// Initial x position (AU)
    #[arg(long, default_value = "1.0", allow_hyphen_values = true)]
    pub x: String,

    /// Initial y position (AU)
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    pub y: String,

    /// Initial x velocity (km/s)
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    pub vx: String,

    /// Initial y velocity (km/s)
    #[arg(long, default_value = "29.78", allow_hyphen_values = true)]
    pub vy: String,

    /// Number of integration steps
    #[arg(long, default_value = "365")]
    pub steps: String,

    /// Configuration file to load
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the prediction service endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Write every composed frame as JSON Lines
    #[arg(long)]
    pub export: Option<PathBuf>,
}

impl RunArgs {
    /// The arguments as form input.
    #[must_use]
    pub fn display_input(&self) -> DisplayInput {
        DisplayInput::new(&*self.x, &*self.y, &*self.vx, &*self.vy, &*self.steps)
    }
}
