//! Recording sinks capturing emitted records for assertions.

use std::sync::Mutex;

use epicast_core::{SinkError, StatusSink, TraceEvent, TraceSink, TrialReport, TrialStart};

/// [`TraceSink`] that stores every record in memory.
#[derive(Debug, Default)]
pub struct RecordingTraceSink {
    events: Mutex<Vec<TraceEvent>>,
}

impl RecordingTraceSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events in append order.
    ///
    /// # Panics
    /// Panics when a recording writer panicked mid-append.
    #[must_use]
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().expect("recording lock poisoned").clone()
    }
}

impl TraceSink for RecordingTraceSink {
    fn record(&self, event: TraceEvent) -> Result<(), SinkError> {
        self.events
            .lock()
            .map_err(|_| SinkError::Poisoned)?
            .push(event);
        Ok(())
    }
}

/// [`StatusSink`] that stores start and finish records in memory.
#[derive(Debug, Default)]
pub struct RecordingStatusSink {
    starts: Mutex<Vec<TrialStart>>,
    reports: Mutex<Vec<TrialReport>>,
}

impl RecordingStatusSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded start records.
    ///
    /// # Panics
    /// Panics when a recording writer panicked mid-append.
    #[must_use]
    pub fn starts(&self) -> Vec<TrialStart> {
        self.starts.lock().expect("recording lock poisoned").clone()
    }

    /// Returns a copy of the recorded finish records.
    ///
    /// # Panics
    /// Panics when a recording writer panicked mid-append.
    #[must_use]
    pub fn reports(&self) -> Vec<TrialReport> {
        self.reports
            .lock()
            .expect("recording lock poisoned")
            .clone()
    }
}

impl StatusSink for RecordingStatusSink {
    fn trial_started(&self, start: &TrialStart) -> Result<(), SinkError> {
        self.starts
            .lock()
            .map_err(|_| SinkError::Poisoned)?
            .push(*start);
        Ok(())
    }

    fn trial_finished(&self, report: &TrialReport) -> Result<(), SinkError> {
        self.reports
            .lock()
            .map_err(|_| SinkError::Poisoned)?
            .push(*report);
        Ok(())
    }
}
