//! CLI argument definitions using clap
//!
//! Commands:
//! - rivoli-records address encode --file-id <N> --row <N>
//! - rivoli-records address decode --address <N>
//! - rivoli-records address range --file-id <N>
//! - rivoli-records plan --file-id <N> [filters]
//! - rivoli-records check-revert --from <CODE> --to <CODE>

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Record addressing, query planning and revert checks for the Rivoli
/// file pipeline
#[derive(Parser, Debug)]
#[command(name = "rivoli-records")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to an engine configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record address arithmetic
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },

    /// Compile a list request and print its pipelines
    Plan(PlanArgs),

    /// Check whether a status transition is a legal revert
    CheckRevert {
        /// Current record status code
        #[arg(long)]
        from: String,

        /// Target record status code
        #[arg(long)]
        to: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AddressAction {
    /// Encode a (file id, row number) pair
    Encode {
        #[arg(long)]
        file_id: i64,

        /// 1-based row number
        #[arg(long)]
        row: i64,
    },

    /// Decode an address into file id and row number
    Decode {
        #[arg(long)]
        address: u64,
    },

    /// Print the address range reserved for a file
    Range {
        #[arg(long)]
        file_id: i64,
    },
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[arg(long)]
    pub file_id: i64,

    /// Record status code
    #[arg(long)]
    pub status: Option<String>,

    /// Free-text search
    #[arg(long)]
    pub search: Option<String>,

    /// Function id of a recent error (repeatable)
    #[arg(long = "recent-error")]
    pub recent_errors: Vec<String>,

    #[arg(long)]
    pub start: Option<String>,

    #[arg(long)]
    pub length: Option<String>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
