//! Shared trace and status sinks fed by concurrent trials.
//!
//! Sinks are the only mutable resources shared across workers: every append
//! must be serialized so each record lands as one self-contained line.
//! Records from different workers may interleave at line granularity.

use std::{
    io::{self, Write},
    sync::Mutex,
};

use thiserror::Error;

use crate::report::{TrialReport, TrialStart};

/// One transmission attempt, realized or directed at an already-infected
/// node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent {
    /// Infection time of the provider when the attempt was made.
    pub time: u32,
    /// Node attempting transmission.
    pub provider: usize,
    /// Node targeted by the attempt.
    pub client: usize,
    /// Epidemic the attempt belongs to.
    pub epidemic: u32,
}

/// Errors raised while appending a record to a sink.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SinkError {
    /// The underlying writer rejected the append.
    #[error("failed to append record: {source}")]
    Write {
        /// Operating-system error raised by the writer.
        #[source]
        source: io::Error,
    },
    /// A writer panicked while holding the sink lock.
    #[error("sink lock poisoned by a panicking writer")]
    Poisoned,
}

impl From<io::Error> for SinkError {
    fn from(source: io::Error) -> Self {
        Self::Write { source }
    }
}

/// Append-only sink receiving one record per transmission attempt.
///
/// Implementations must serialize appends internally; trials on different
/// workers share one sink.
pub trait TraceSink: Sync {
    /// Appends one attempt record.
    ///
    /// # Errors
    /// Returns [`SinkError`] when the record cannot be appended.
    fn record(&self, event: TraceEvent) -> Result<(), SinkError>;
}

/// Sink receiving human-readable per-trial lifecycle records.
pub trait StatusSink: Sync {
    /// Reports a trial about to run.
    ///
    /// # Errors
    /// Returns [`SinkError`] when the record cannot be appended.
    fn trial_started(&self, start: &TrialStart) -> Result<(), SinkError>;

    /// Reports a completed trial.
    ///
    /// # Errors
    /// Returns [`SinkError`] when the record cannot be appended.
    fn trial_finished(&self, report: &TrialReport) -> Result<(), SinkError>;
}

/// [`TraceSink`] writing `time provider client epidemicId` lines.
///
/// # Examples
/// ```
/// use epicast_core::{LineTraceSink, TraceEvent, TraceSink};
///
/// let sink = LineTraceSink::new(Vec::new());
/// sink.record(TraceEvent { time: 1, provider: 0, client: 4, epidemic: 2 })?;
/// let written = sink.into_inner()?;
/// assert_eq!(written, b"1 0 4 2\n");
/// # Ok::<(), epicast_core::SinkError>(())
/// ```
#[derive(Debug)]
pub struct LineTraceSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> LineTraceSink<W> {
    /// Wraps `writer` in an append-serialized trace sink.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Unwraps the sink, returning the underlying writer.
    ///
    /// # Errors
    /// Returns [`SinkError::Poisoned`] when a writer panicked mid-append.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer.into_inner().map_err(|_| SinkError::Poisoned)
    }
}

impl<W: Write + Send> TraceSink for LineTraceSink<W> {
    fn record(&self, event: TraceEvent) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().map_err(|_| SinkError::Poisoned)?;
        writeln!(
            writer,
            "{} {} {} {}",
            event.time, event.provider, event.client, event.epidemic
        )?;
        Ok(())
    }
}

/// [`StatusSink`] rendering started/stopped lines for human consumption.
///
/// # Examples
/// ```
/// use epicast_core::{StatusSink, TextStatusSink, TrialStart};
///
/// let sink = TextStatusSink::new(Vec::new());
/// sink.trial_started(&TrialStart::new(0, 1, 1, 1, 4))?;
/// let written = String::from_utf8(sink.into_inner()?).expect("utf8");
/// assert_eq!(
///     written,
///     "Epidemic 0 #1: started at t = 1 with 1 / 4 ( 25.00% ) infected nodes\n"
/// );
/// # Ok::<(), epicast_core::SinkError>(())
/// ```
#[derive(Debug)]
pub struct TextStatusSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> TextStatusSink<W> {
    /// Wraps `writer` in an append-serialized status sink.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Unwraps the sink, returning the underlying writer.
    ///
    /// # Errors
    /// Returns [`SinkError::Poisoned`] when a writer panicked mid-append.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer.into_inner().map_err(|_| SinkError::Poisoned)
    }
}

impl<W: Write + Send> StatusSink for TextStatusSink<W> {
    fn trial_started(&self, start: &TrialStart) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().map_err(|_| SinkError::Poisoned)?;
        writeln!(
            writer,
            "Epidemic {} #{}: started at t = {} with {} / {} ( {:.2}% ) infected nodes",
            start.epidemic(),
            start.trial(),
            start.time(),
            start.infected_count(),
            start.node_count(),
            100.0 * start.infected_fraction(),
        )?;
        Ok(())
    }

    fn trial_finished(&self, report: &TrialReport) -> Result<(), SinkError> {
        let mut writer = self.writer.lock().map_err(|_| SinkError::Poisoned)?;
        writeln!(
            writer,
            "Epidemic {} #{}: stopped at t = {} with {} / {} ( {:.2}% ) infected nodes and {} links",
            report.epidemic(),
            report.trial(),
            report.time(),
            report.infected_count(),
            report.node_count(),
            100.0 * report.infected_fraction(),
            report.cascade_links(),
        )?;
        Ok(())
    }
}
