//! Command-line interface
//!
//! - address: encode, decode and range arithmetic
//! - plan: compile a list request and print its pipelines
//! - check-revert: revert legality for a status pair

mod args;
mod commands;
mod errors;
mod io;

pub use args::{AddressAction, Cli, Command, PlanArgs};
pub use commands::{run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
