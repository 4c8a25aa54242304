//! CLI module for orbcompare.
//!
//! Argument parsing and command handlers live here so `main.rs` stays a
//! thin entry point and the logic can be tested directly.

mod args;
mod commands;

pub use args::{Args, Command, RunArgs};
pub use commands::{load_config, play, print_config, run_cli, run_headless, RunSummary, StderrNotifier};
