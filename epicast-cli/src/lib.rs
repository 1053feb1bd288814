//! Library surface of the epicast command-line interface.
//!
//! Exposes the command definitions and logging bootstrap so integration
//! tests can drive the CLI without spawning a process.

pub mod cli;
pub mod logging;
