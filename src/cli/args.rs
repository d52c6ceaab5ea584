//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Compute financial facts for a report from its ledger
#[derive(Parser, Debug)]
#[command(name = "ledgerfacts")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Report file (default: <config dir>/ledgerfacts/report.yaml)
    #[arg(short, long, global = true, env = "LEDGERFACTS_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate computations and show their breakdown
    Compute {
        /// Named accounting period
        #[arg(short, long)]
        period: String,

        /// Computation ids (default: all top-level computations)
        ids: Vec<String>,
    },

    /// Print computed values
    Get {
        /// Named accounting period
        #[arg(short, long)]
        period: String,

        /// Computation ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// List configured accounting periods
    Periods,

    /// Load the report and validate its computations
    Check,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
