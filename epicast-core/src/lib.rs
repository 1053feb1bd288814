//! Epicast core library: stochastic SIR cascade simulation over a fixed
//! contact network.
//!
//! Starting from a set of initially infected nodes, infection spreads
//! probabilistically along arcs; each newly infected node is infectious for
//! exactly one discrete time step, and every trial halts under a configurable
//! bound on elapsed time or total infected count. The product is the complete
//! event trace of transmission attempts, including attempts directed at
//! already-recovered nodes.

mod active_set;
mod builder;
mod condition;
mod engine;
mod epicast;
mod error;
mod network;
mod report;
mod sink;
mod state;

pub use crate::{
    active_set::ActiveSet,
    builder::EpicastBuilder,
    condition::{InitialCondition, StopCriterion},
    engine::CascadeEngine,
    epicast::{Epicast, Sinks},
    error::{EpicastError, EpicastErrorCode, NetworkError, NetworkErrorCode, Result},
    network::ContactNetwork,
    report::{TrialReport, TrialStart},
    sink::{LineTraceSink, SinkError, StatusSink, TextStatusSink, TraceEvent, TraceSink},
    state::CascadeState,
};
