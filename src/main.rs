//! rivoli-records CLI entry point
//!
//! Parses arguments and delegates to `cli::run`; exits non-zero on failure.

use rivoli_records::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
