//! Trial orchestration: parallel fan-out over initial conditions.
//!
//! Provides the [`Epicast`] runtime entry point that validates every epidemic
//! definition up front, distributes the outer condition loop across Rayon
//! workers, and drives sequential trials on the owning worker.

use std::{fmt, num::NonZeroUsize};

use rand::{SeedableRng, rngs::SmallRng};
use rayon::prelude::*;
use tracing::{info, instrument};

use crate::{
    condition::InitialCondition,
    engine::{CascadeEngine, validate_condition},
    error::{EpicastError, Result},
    network::ContactNetwork,
    report::{TrialReport, TrialStart},
    sink::{StatusSink, TraceSink},
};

/// SplitMix64 increment (the 64-bit golden ratio) spacing per-trial seeds.
const TRIAL_SEED_SPACING: u64 = 0x9E37_79B9_7F4A_7C15;
const SPLITMIX_MULT_A: u64 = 0xBF58_476D_1CE4_E5B9;
const SPLITMIX_MULT_B: u64 = 0x94D0_49BB_1331_11EB;

#[inline]
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(TRIAL_SEED_SPACING);
    state = (state ^ (state >> 30)).wrapping_mul(SPLITMIX_MULT_A);
    state = (state ^ (state >> 27)).wrapping_mul(SPLITMIX_MULT_B);
    state ^ (state >> 31)
}

/// Derives the seed for trial `trial` of the condition at `index`.
///
/// The derivation depends only on the base seed and the (condition, trial)
/// pair, never on worker identity, so traces are reproducible for any thread
/// count.
#[inline]
fn mix_trial_seed(base_seed: u64, index: usize, trial: usize) -> u64 {
    let per_condition =
        splitmix64(base_seed ^ ((index as u64 + 1).wrapping_mul(TRIAL_SEED_SPACING)));
    splitmix64(per_condition ^ ((trial as u64).wrapping_mul(TRIAL_SEED_SPACING)))
}

/// Shared output sinks for one run.
///
/// Both sinks are optional; a disabled sink costs nothing per event.
#[derive(Clone, Copy, Default)]
pub struct Sinks<'a> {
    /// Receives one record per transmission attempt.
    pub trace: Option<&'a dyn TraceSink>,
    /// Receives per-trial started/stopped records.
    pub status: Option<&'a dyn StatusSink>,
}

impl fmt::Debug for Sinks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sinks")
            .field("trace", &self.trace.is_some())
            .field("status", &self.status.is_some())
            .finish()
    }
}

impl<'a> Sinks<'a> {
    /// Disables both sinks.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

/// Entry point for running epidemic cascades over a contact network.
///
/// # Examples
/// ```
/// use epicast_core::{
///     ContactNetwork, EpicastBuilder, InitialCondition, NetworkError, Sinks, StopCriterion,
/// };
///
/// struct Pair;
///
/// impl ContactNetwork for Pair {
///     fn node_count(&self) -> usize { 2 }
///     fn edge_count(&self) -> usize { 1 }
///     fn name(&self) -> &str { "pair" }
///     fn neighbours(&self, node: usize) -> Result<&[usize], NetworkError> {
///         match node {
///             0 => Ok(&[1]),
///             1 => Ok(&[]),
///             _ => Err(NetworkError::OutOfBounds { node }),
///         }
///     }
/// }
///
/// let epicast = EpicastBuilder::new()
///     .with_probability(1.0)
///     .build()
///     .expect("builder must succeed");
/// let conditions = vec![InitialCondition::singleton(StopCriterion::MaxTime(3))];
/// let reports = epicast
///     .run(&Pair, conditions, Sinks::none())
///     .expect("run must succeed");
/// assert_eq!(reports.len(), 1);
/// assert_eq!(reports[0].infected_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Epicast {
    probability: f64,
    samples: NonZeroUsize,
    rng_seed: u64,
    threads: Option<NonZeroUsize>,
}

impl Epicast {
    pub(crate) fn new(
        probability: f64,
        samples: NonZeroUsize,
        rng_seed: u64,
        threads: Option<NonZeroUsize>,
    ) -> Self {
        Self {
            probability,
            samples,
            rng_seed,
            threads,
        }
    }

    /// Returns the per-edge transmission probability.
    #[must_use]
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Returns the number of trials run per initial condition.
    #[must_use]
    pub fn samples(&self) -> NonZeroUsize {
        self.samples
    }

    /// Returns the base seed of the random stream.
    #[must_use]
    pub fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Returns the dedicated worker count, if one was configured.
    #[must_use]
    pub fn threads(&self) -> Option<NonZeroUsize> {
        self.threads
    }

    /// Runs every condition to completion and returns the trial reports in
    /// (condition, trial) order.
    ///
    /// All conditions are validated before the first trial starts; a failure
    /// aborts the whole run. The outer loop over conditions is distributed
    /// across workers with work stealing, because epidemic run time is highly
    /// variable; trials within one condition run sequentially on the owning
    /// worker. Each condition is consumed once its trials complete, releasing
    /// its seed storage.
    ///
    /// # Errors
    /// Returns [`EpicastError::EmptyNetwork`], [`EpicastError::NoSeeds`],
    /// [`EpicastError::TooManySeeds`], [`EpicastError::SeedOutOfRange`], or
    /// [`EpicastError::DuplicateSeed`] for precondition violations,
    /// [`EpicastError::ThreadPool`] when a dedicated pool cannot be built,
    /// and the engine's [`EpicastError::Network`] / [`EpicastError::Sink`]
    /// failures from running trials.
    #[instrument(
        name = "core.run",
        err,
        skip_all,
        fields(
            network = %network.name(),
            conditions = conditions.len(),
            samples = self.samples.get(),
            probability = self.probability,
        ),
    )]
    pub fn run<N>(
        &self,
        network: &N,
        conditions: Vec<InitialCondition>,
        sinks: Sinks<'_>,
    ) -> Result<Vec<TrialReport>>
    where
        N: ContactNetwork + Sync + ?Sized,
    {
        for condition in &conditions {
            validate_condition(network, condition)?;
        }
        let reports = match self.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads.get())
                .build()
                .map_err(|source| EpicastError::ThreadPool { source })?
                .install(|| self.run_conditions(network, conditions, sinks)),
            None => self.run_conditions(network, conditions, sinks),
        }?;
        info!(trials = reports.len(), "run completed");
        Ok(reports)
    }

    fn run_conditions<N>(
        &self,
        network: &N,
        conditions: Vec<InitialCondition>,
        sinks: Sinks<'_>,
    ) -> Result<Vec<TrialReport>>
    where
        N: ContactNetwork + Sync + ?Sized,
    {
        let nested = conditions
            .into_par_iter()
            .enumerate()
            .map(|(index, condition)| self.run_condition(network, index, condition, sinks))
            .collect::<Result<Vec<_>>>()?;
        Ok(nested.into_iter().flatten().collect())
    }

    /// Runs all trials of one condition sequentially on the owning worker,
    /// consuming the condition afterwards.
    fn run_condition<N>(
        &self,
        network: &N,
        index: usize,
        condition: InitialCondition,
        sinks: Sinks<'_>,
    ) -> Result<Vec<TrialReport>>
    where
        N: ContactNetwork + Sync + ?Sized,
    {
        info!(
            epidemic = condition.id(),
            probability = self.probability,
            criterion = condition.stop().label(),
            bound = condition.stop().bound(),
            "running epidemic"
        );
        let mut reports = Vec::with_capacity(self.samples.get());
        for trial in 1..=self.samples.get() {
            let seed = mix_trial_seed(self.rng_seed, index, trial);
            reports.push(self.run_trial(network, &condition, trial, seed, sinks)?);
        }
        Ok(reports)
    }

    fn run_trial<N>(
        &self,
        network: &N,
        condition: &InitialCondition,
        trial: usize,
        seed: u64,
        sinks: Sinks<'_>,
    ) -> Result<TrialReport>
    where
        N: ContactNetwork + ?Sized,
    {
        let rng = SmallRng::seed_from_u64(seed);
        let mut engine =
            CascadeEngine::new(network, self.probability, condition, rng, sinks.trace)?;
        if let Some(status) = sinks.status {
            let start = TrialStart::new(
                condition.id(),
                trial,
                engine.state().time(),
                engine.state().infected_count(),
                network.node_count(),
            );
            status
                .trial_started(&start)
                .map_err(|error| EpicastError::Sink { error })?;
        }
        engine.run()?;
        let state = engine.state();
        let report = TrialReport::new(
            condition.id(),
            trial,
            state.time(),
            state.infected_count(),
            network.node_count(),
            state.cascade_links(),
        );
        if let Some(status) = sinks.status {
            status
                .trial_finished(&report)
                .map_err(|error| EpicastError::Sink { error })?;
        }
        Ok(report)
    }
}
