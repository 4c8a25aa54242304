//! orbcompare CLI
//!
//! Headless runs against the prediction service and configuration output.

use std::process::ExitCode;

use clap::Parser;
use orbcompare::cli::{run_cli, Args};

fn main() -> ExitCode {
    orbcompare::init_logging();
    run_cli(Args::parse())
}
