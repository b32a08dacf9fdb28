//! Root CLI structure for scrollrig

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::commands::sample::SampleArgs;
use crate::commands::simulate::SimulateArgs;

#[derive(Parser)]
#[command(name = "scrollrig")]
#[command(about = "Drive the scroll-rig animation controller from the command line", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (.yaml, .yml or .json); defaults are used when omitted
    #[arg(short, long, global = true, env = "SCROLLRIG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the phase table
    Phases {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: PathBuf,

        /// Rig description to check clip bindings against
        #[arg(long)]
        rig: Option<PathBuf>,
    },

    /// Evaluate the rig at one scroll progress and print the snapshot
    Sample(SampleArgs),

    /// Replay a scroll trace frame by frame
    Simulate(SimulateArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
