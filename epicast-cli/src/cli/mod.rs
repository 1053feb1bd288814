//! Command-line interface orchestration for the epicast simulator.
//!
//! Offers a `run` command that loads a contact network and epidemic
//! definitions from text files, executes the cascade trials, and renders a
//! summary.

mod commands;

pub use commands::{
    Cli, CliError, Command, RunCommand, RunSummary, render_summary, run_cli,
};

#[cfg(test)]
mod tests;
