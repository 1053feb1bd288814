//! Builder utilities for configuring cascade runs.

use std::num::NonZeroUsize;

use crate::{
    epicast::Epicast,
    error::{EpicastError, Result},
};

const DEFAULT_RNG_SEED: u64 = 0xCA5C_ADE5;

/// Configures and constructs [`Epicast`] instances.
///
/// # Examples
/// ```
/// use epicast_core::EpicastBuilder;
///
/// let epicast = EpicastBuilder::new()
///     .with_probability(0.25)
///     .with_samples(3)
///     .with_rng_seed(42)
///     .build()
///     .expect("configuration is valid");
/// assert_eq!(epicast.samples().get(), 3);
/// assert_eq!(epicast.rng_seed(), 42);
/// ```
#[derive(Debug, Clone)]
pub struct EpicastBuilder {
    probability: Option<f64>,
    samples: usize,
    rng_seed: u64,
    threads: Option<usize>,
}

impl Default for EpicastBuilder {
    fn default() -> Self {
        Self {
            probability: None,
            samples: 1,
            rng_seed: DEFAULT_RNG_SEED,
            threads: None,
        }
    }
}

impl EpicastBuilder {
    /// Creates a builder with one sample per condition and a fixed default
    /// seed; the transmission probability must still be supplied.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-edge transmission probability, required, in `(0, 1]`.
    #[must_use]
    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = Some(probability);
        self
    }

    /// Sets how many independent trials run per initial condition.
    #[must_use]
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Seeds the base random stream; per-trial streams derive from it, so a
    /// fixed seed reproduces a run exactly for any worker count.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Dedicates a worker pool of `threads` workers to the run instead of
    /// the global one.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Returns the configured probability, if set.
    #[must_use]
    pub fn probability(&self) -> Option<f64> {
        self.probability
    }

    /// Returns the configured number of trials per condition.
    #[must_use]
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Validates the configuration and constructs an [`Epicast`] instance.
    ///
    /// # Errors
    /// Returns [`EpicastError::ProbabilityNotSet`] when no probability was
    /// supplied, [`EpicastError::InvalidProbability`] when it lies outside
    /// `(0, 1]` (NaN included), [`EpicastError::InvalidSamples`] for a zero
    /// sample count, and [`EpicastError::InvalidThreads`] for a zero worker
    /// count.
    ///
    /// # Examples
    /// ```
    /// use epicast_core::{EpicastBuilder, EpicastError};
    ///
    /// let err = EpicastBuilder::new()
    ///     .with_probability(1.5)
    ///     .build()
    ///     .expect_err("probability above 1 is invalid");
    /// assert!(matches!(err, EpicastError::InvalidProbability { .. }));
    /// ```
    pub fn build(self) -> Result<Epicast> {
        let probability = self.probability.ok_or(EpicastError::ProbabilityNotSet)?;
        if !(probability > 0.0 && probability <= 1.0) {
            return Err(EpicastError::InvalidProbability { got: probability });
        }
        let samples = NonZeroUsize::new(self.samples)
            .ok_or(EpicastError::InvalidSamples { got: self.samples })?;
        let threads = match self.threads {
            None => None,
            Some(count) => Some(
                NonZeroUsize::new(count).ok_or(EpicastError::InvalidThreads { got: count })?,
            ),
        };
        Ok(Epicast::new(probability, samples, self.rng_seed, threads))
    }
}
