//! Epidemic definitions: seed sets and stop criteria.

use rand::Rng;

use crate::error::{EpicastError, Result};

/// Bound at which a running trial stops.
///
/// Exactly one criterion applies per [`InitialCondition`]; the two are never
/// combined. `MaxTime` caps the infection time of processed providers,
/// `MaxInfected` caps the total number of infected nodes.
///
/// # Examples
/// ```
/// use epicast_core::StopCriterion;
///
/// let stop = StopCriterion::MaxInfected(100);
/// assert_eq!(stop.bound(), 100);
/// assert_eq!(stop.label(), "maxsize");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCriterion {
    /// Stop once a provider infected later than this time step is due.
    MaxTime(u32),
    /// Stop the instant this many nodes are infected in total.
    MaxInfected(u32),
}

impl StopCriterion {
    /// Returns the numeric bound carried by the criterion.
    #[must_use]
    pub const fn bound(self) -> u32 {
        match self {
            Self::MaxTime(bound) | Self::MaxInfected(bound) => bound,
        }
    }

    /// Returns the stable name used to suffix trace output files.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MaxTime(_) => "maxdepth",
            Self::MaxInfected(_) => "maxsize",
        }
    }
}

/// One epidemic definition: an id, the initially infected nodes, and the
/// stop criterion bounding its evolution.
///
/// Constructed once from input (or synthesized via [`Self::singleton`]),
/// consumed by one or more trials, then released.
///
/// # Examples
/// ```
/// use epicast_core::{InitialCondition, StopCriterion};
///
/// let condition = InitialCondition::new(3, vec![0, 5], StopCriterion::MaxTime(4));
/// assert_eq!(condition.id(), 3);
/// assert_eq!(condition.seeds(), &[0, 5]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialCondition {
    id: u32,
    seeds: Vec<usize>,
    stop: StopCriterion,
}

impl InitialCondition {
    /// Creates an epidemic definition from explicit seed nodes.
    ///
    /// Seeds are validated against the network when a run starts, not here.
    #[must_use]
    pub fn new(id: u32, seeds: Vec<usize>, stop: StopCriterion) -> Self {
        Self { id, seeds, stop }
    }

    /// Creates the default definition: epidemic 0 seeded at node 0.
    ///
    /// # Examples
    /// ```
    /// use epicast_core::{InitialCondition, StopCriterion};
    ///
    /// let condition = InitialCondition::singleton(StopCriterion::MaxTime(10));
    /// assert_eq!(condition.id(), 0);
    /// assert_eq!(condition.seeds(), &[0]);
    /// ```
    #[must_use]
    pub fn singleton(stop: StopCriterion) -> Self {
        Self::new(0, vec![0], stop)
    }

    /// Creates a definition seeded with `count` distinct random nodes drawn
    /// from `[0, node_count)`.
    ///
    /// The drawn seeds are sorted, so the listing is stable for a given
    /// random stream.
    ///
    /// # Errors
    /// Returns [`EpicastError::NoSeeds`] when `count` is zero and
    /// [`EpicastError::TooManySeeds`] unless `count < node_count`.
    ///
    /// # Examples
    /// ```
    /// use epicast_core::{InitialCondition, StopCriterion};
    /// use rand::{SeedableRng, rngs::SmallRng};
    ///
    /// let mut rng = SmallRng::seed_from_u64(11);
    /// let condition =
    ///     InitialCondition::sample(1, 3, 10, StopCriterion::MaxInfected(5), &mut rng)?;
    /// assert_eq!(condition.seeds().len(), 3);
    /// assert!(condition.seeds().iter().all(|&node| node < 10));
    /// # Ok::<(), epicast_core::EpicastError>(())
    /// ```
    pub fn sample<R: Rng>(
        id: u32,
        count: usize,
        node_count: usize,
        stop: StopCriterion,
        rng: &mut R,
    ) -> Result<Self> {
        if count == 0 {
            return Err(EpicastError::NoSeeds { epidemic: id });
        }
        if count >= node_count {
            return Err(EpicastError::TooManySeeds {
                epidemic: id,
                seeds: count,
                nodes: node_count,
            });
        }
        let mut seeds = rand::seq::index::sample(rng, node_count, count).into_vec();
        seeds.sort_unstable();
        Ok(Self::new(id, seeds, stop))
    }

    /// Returns the epidemic id used to match bound records and trace lines.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the initially infected node ids.
    #[must_use]
    pub fn seeds(&self) -> &[usize] {
        &self.seeds
    }

    /// Returns the stop criterion bounding this epidemic.
    #[must_use]
    pub fn stop(&self) -> StopCriterion {
        self.stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{SeedableRng, rngs::SmallRng};
    use rstest::rstest;

    #[rstest]
    #[case(StopCriterion::MaxTime(7), 7, "maxdepth")]
    #[case(StopCriterion::MaxInfected(42), 42, "maxsize")]
    fn criterion_exposes_bound_and_label(
        #[case] stop: StopCriterion,
        #[case] bound: u32,
        #[case] label: &str,
    ) {
        assert_eq!(stop.bound(), bound);
        assert_eq!(stop.label(), label);
    }

    #[test]
    fn sample_draws_distinct_sorted_seeds() {
        let mut rng = SmallRng::seed_from_u64(5);
        let condition =
            InitialCondition::sample(9, 4, 20, StopCriterion::MaxTime(2), &mut rng)
                .expect("4 of 20 is sampleable");
        assert_eq!(condition.id(), 9);
        assert_eq!(condition.seeds().len(), 4);
        assert!(condition.seeds().windows(2).all(|pair| pair[0] < pair[1]));
        assert!(condition.seeds().iter().all(|&node| node < 20));
    }

    #[test]
    fn sample_rejects_zero_seeds() {
        let mut rng = SmallRng::seed_from_u64(5);
        let err = InitialCondition::sample(2, 0, 10, StopCriterion::MaxTime(1), &mut rng)
            .expect_err("zero seeds is invalid");
        assert!(matches!(err, EpicastError::NoSeeds { epidemic: 2 }));
    }

    #[test]
    fn sample_requires_strictly_fewer_seeds_than_nodes() {
        let mut rng = SmallRng::seed_from_u64(5);
        let err = InitialCondition::sample(2, 10, 10, StopCriterion::MaxTime(1), &mut rng)
            .expect_err("a fully seeded network is invalid");
        assert!(matches!(
            err,
            EpicastError::TooManySeeds {
                epidemic: 2,
                seeds: 10,
                nodes: 10,
            }
        ));
    }
}
