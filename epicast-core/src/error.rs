//! Error types for the epicast core library.
//!
//! Defines the error enums exposed by the public API, their stable
//! machine-readable codes, and a convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::sink::SinkError;

/// An error produced by [`crate::ContactNetwork`] operations.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum NetworkError {
    /// Requested node was outside the network's bounds.
    #[error("node {node} is out of bounds")]
    OutOfBounds {
        /// The requested node id that exceeded the network bounds.
        node: usize,
    },
}

/// Stable codes describing [`NetworkError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum NetworkErrorCode {
    /// Requested node was outside the network's bounds.
    OutOfBounds,
}

impl NetworkErrorCode {
    /// Return the stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OutOfBounds => "NETWORK_OUT_OF_BOUNDS",
        }
    }
}

impl fmt::Display for NetworkErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NetworkError {
    /// Retrieve the stable [`NetworkErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> NetworkErrorCode {
        match self {
            Self::OutOfBounds { .. } => NetworkErrorCode::OutOfBounds,
        }
    }
}

/// Error type produced when configuring or running [`crate::Epicast`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EpicastError {
    /// No transmission probability was supplied to the builder.
    #[error("transmission probability was not set")]
    ProbabilityNotSet,
    /// Transmission probability must lie in `(0, 1]`.
    #[error("transmission probability must lie in (0, 1] (got {got})")]
    InvalidProbability {
        /// The invalid probability supplied by the caller.
        got: f64,
    },
    /// At least one trial must run per initial condition.
    #[error("samples must be at least 1 (got {got})")]
    InvalidSamples {
        /// The invalid sample count supplied by the caller.
        got: usize,
    },
    /// A configured worker count must be at least one.
    #[error("threads must be at least 1 (got {got})")]
    InvalidThreads {
        /// The invalid thread count supplied by the caller.
        got: usize,
    },
    /// The supplied [`crate::ContactNetwork`] contained no nodes.
    #[error("contact network `{network}` contains no nodes")]
    EmptyNetwork {
        /// Identifier for the empty network.
        network: Arc<str>,
    },
    /// An initial condition listed no seed nodes.
    #[error("epidemic {epidemic} lists no seed nodes")]
    NoSeeds {
        /// Epidemic id of the offending initial condition.
        epidemic: u32,
    },
    /// An initial condition seeded a node outside the network.
    #[error("epidemic {epidemic} seeds node {node} but the network has {nodes} nodes")]
    SeedOutOfRange {
        /// Epidemic id of the offending initial condition.
        epidemic: u32,
        /// Seed node id that fell outside the network.
        node: usize,
        /// Number of nodes in the network.
        nodes: usize,
    },
    /// An initial condition listed the same seed node twice.
    #[error("epidemic {epidemic} seeds node {node} more than once")]
    DuplicateSeed {
        /// Epidemic id of the offending initial condition.
        epidemic: u32,
        /// Seed node id that was repeated.
        node: usize,
    },
    /// Initially infected nodes must be strictly fewer than network nodes.
    #[error("epidemic {epidemic} seeds {seeds} nodes but the network has only {nodes}")]
    TooManySeeds {
        /// Epidemic id of the offending initial condition.
        epidemic: u32,
        /// Number of seed nodes listed.
        seeds: usize,
        /// Number of nodes in the network.
        nodes: usize,
    },
    /// A [`crate::ContactNetwork`] operation failed while a trial was running.
    #[error("contact network `{network}` failed: {error}")]
    Network {
        /// Identifier for the network that produced the error.
        network: Arc<str>,
        #[source]
        /// Underlying network error bubbled up by the engine.
        error: NetworkError,
    },
    /// A trace or status sink rejected an appended record.
    #[error("sink append failed: {error}")]
    Sink {
        #[source]
        /// Underlying sink failure.
        error: SinkError,
    },
    /// The dedicated worker pool could not be constructed.
    #[error("failed to build worker pool: {source}")]
    ThreadPool {
        #[source]
        /// Error raised by the thread-pool builder.
        source: rayon::ThreadPoolBuildError,
    },
}

/// Stable codes describing [`EpicastError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum EpicastErrorCode {
    /// No transmission probability was supplied to the builder.
    ProbabilityNotSet,
    /// Transmission probability must lie in `(0, 1]`.
    InvalidProbability,
    /// At least one trial must run per initial condition.
    InvalidSamples,
    /// A configured worker count must be at least one.
    InvalidThreads,
    /// The supplied [`crate::ContactNetwork`] contained no nodes.
    EmptyNetwork,
    /// An initial condition listed no seed nodes.
    NoSeeds,
    /// An initial condition seeded a node outside the network.
    SeedOutOfRange,
    /// An initial condition listed the same seed node twice.
    DuplicateSeed,
    /// Initially infected nodes must be strictly fewer than network nodes.
    TooManySeeds,
    /// A [`crate::ContactNetwork`] operation failed while a trial was running.
    NetworkFailure,
    /// A trace or status sink rejected an appended record.
    SinkFailure,
    /// The dedicated worker pool could not be constructed.
    ThreadPool,
}

impl EpicastErrorCode {
    /// Return the stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProbabilityNotSet => "EPICAST_PROBABILITY_NOT_SET",
            Self::InvalidProbability => "EPICAST_INVALID_PROBABILITY",
            Self::InvalidSamples => "EPICAST_INVALID_SAMPLES",
            Self::InvalidThreads => "EPICAST_INVALID_THREADS",
            Self::EmptyNetwork => "EPICAST_EMPTY_NETWORK",
            Self::NoSeeds => "EPICAST_NO_SEEDS",
            Self::SeedOutOfRange => "EPICAST_SEED_OUT_OF_RANGE",
            Self::DuplicateSeed => "EPICAST_DUPLICATE_SEED",
            Self::TooManySeeds => "EPICAST_TOO_MANY_SEEDS",
            Self::NetworkFailure => "EPICAST_NETWORK_FAILURE",
            Self::SinkFailure => "EPICAST_SINK_FAILURE",
            Self::ThreadPool => "EPICAST_THREAD_POOL",
        }
    }
}

impl fmt::Display for EpicastErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EpicastError {
    /// Retrieve the stable [`EpicastErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> EpicastErrorCode {
        match self {
            Self::ProbabilityNotSet => EpicastErrorCode::ProbabilityNotSet,
            Self::InvalidProbability { .. } => EpicastErrorCode::InvalidProbability,
            Self::InvalidSamples { .. } => EpicastErrorCode::InvalidSamples,
            Self::InvalidThreads { .. } => EpicastErrorCode::InvalidThreads,
            Self::EmptyNetwork { .. } => EpicastErrorCode::EmptyNetwork,
            Self::NoSeeds { .. } => EpicastErrorCode::NoSeeds,
            Self::SeedOutOfRange { .. } => EpicastErrorCode::SeedOutOfRange,
            Self::DuplicateSeed { .. } => EpicastErrorCode::DuplicateSeed,
            Self::TooManySeeds { .. } => EpicastErrorCode::TooManySeeds,
            Self::Network { .. } => EpicastErrorCode::NetworkFailure,
            Self::Sink { .. } => EpicastErrorCode::SinkFailure,
            Self::ThreadPool { .. } => EpicastErrorCode::ThreadPool,
        }
    }

    /// Retrieve the inner [`NetworkErrorCode`] when the error originated in a
    /// [`crate::ContactNetwork`].
    #[must_use]
    pub const fn network_code(&self) -> Option<NetworkErrorCode> {
        match self {
            Self::Network { error, .. } => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, EpicastError>;
