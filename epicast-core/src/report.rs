//! Per-trial lifecycle records.

/// Snapshot taken when a trial is about to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialStart {
    epidemic: u32,
    trial: usize,
    time: u32,
    infected: u32,
    nodes: usize,
}

impl TrialStart {
    /// Builds a start record from its raw fields.
    #[must_use]
    pub fn new(epidemic: u32, trial: usize, time: u32, infected: u32, nodes: usize) -> Self {
        Self {
            epidemic,
            trial,
            time,
            infected,
            nodes,
        }
    }

    /// Returns the epidemic id.
    #[must_use]
    pub fn epidemic(&self) -> u32 {
        self.epidemic
    }

    /// Returns the 1-based trial index within its epidemic.
    #[must_use]
    pub fn trial(&self) -> usize {
        self.trial
    }

    /// Returns the simulation clock at the start of the trial.
    #[must_use]
    pub fn time(&self) -> u32 {
        self.time
    }

    /// Returns the number of initially infected nodes.
    #[must_use]
    pub fn infected_count(&self) -> u32 {
        self.infected
    }

    /// Returns the number of nodes in the network.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes
    }

    /// Returns the infected share of the network in `[0, 1]`.
    #[must_use]
    pub fn infected_fraction(&self) -> f64 {
        f64::from(self.infected) / self.nodes as f64
    }
}

/// Outcome of one completed trial.
///
/// # Examples
/// ```
/// use epicast_core::TrialReport;
///
/// let report = TrialReport::new(0, 1, 2, 4, 4, 3);
/// assert_eq!(report.infected_count(), 4);
/// assert!((report.infected_fraction() - 1.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialReport {
    epidemic: u32,
    trial: usize,
    time: u32,
    infected: u32,
    nodes: usize,
    cascade_links: u32,
}

impl TrialReport {
    /// Builds a report from its raw fields.
    #[must_use]
    pub fn new(
        epidemic: u32,
        trial: usize,
        time: u32,
        infected: u32,
        nodes: usize,
        cascade_links: u32,
    ) -> Self {
        Self {
            epidemic,
            trial,
            time,
            infected,
            nodes,
            cascade_links,
        }
    }

    /// Returns the epidemic id.
    #[must_use]
    pub fn epidemic(&self) -> u32 {
        self.epidemic
    }

    /// Returns the 1-based trial index within its epidemic.
    #[must_use]
    pub fn trial(&self) -> usize {
        self.trial
    }

    /// Returns the last productive time step of the trial.
    #[must_use]
    pub fn time(&self) -> u32 {
        self.time
    }

    /// Returns the total number of infected nodes at termination.
    #[must_use]
    pub fn infected_count(&self) -> u32 {
        self.infected
    }

    /// Returns the number of nodes in the network.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes
    }

    /// Returns the number of arcs in the infection cascade.
    #[must_use]
    pub fn cascade_links(&self) -> u32 {
        self.cascade_links
    }

    /// Returns the infected share of the network in `[0, 1]`.
    #[must_use]
    pub fn infected_fraction(&self) -> f64 {
        f64::from(self.infected) / self.nodes as f64
    }
}
