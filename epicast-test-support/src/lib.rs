//! Shared test scaffolding for the epicast workspace.
//!
//! Deterministic contact-network fixtures and recording sinks used by the
//! core and CLI test suites. Not intended for production use.

pub mod network;
pub mod sink;
