//! The cascade engine: drives one epidemic instance to completion.

use std::{collections::HashSet, sync::Arc};

use rand::{Rng, distributions::Standard, rngs::SmallRng};
use tracing::{debug, instrument};

use crate::{
    condition::{InitialCondition, StopCriterion},
    error::{EpicastError, Result},
    network::ContactNetwork,
    sink::{TraceEvent, TraceSink},
    state::CascadeState,
};

/// Checks an initial condition against the network it will run on.
///
/// Violations are fatal precondition failures surfaced before any trial
/// starts: a network with no nodes, an empty seed set, a seed outside
/// `[0, node_count)`, a repeated seed, or a seed set covering every node.
pub(crate) fn validate_condition<N>(network: &N, condition: &InitialCondition) -> Result<()>
where
    N: ContactNetwork + ?Sized,
{
    let nodes = network.node_count();
    if nodes == 0 {
        return Err(EpicastError::EmptyNetwork {
            network: Arc::from(network.name()),
        });
    }
    let seeds = condition.seeds();
    if seeds.is_empty() {
        return Err(EpicastError::NoSeeds {
            epidemic: condition.id(),
        });
    }
    if seeds.len() >= nodes {
        return Err(EpicastError::TooManySeeds {
            epidemic: condition.id(),
            seeds: seeds.len(),
            nodes,
        });
    }
    let mut seen = HashSet::with_capacity(seeds.len());
    for &node in seeds {
        if node >= nodes {
            return Err(EpicastError::SeedOutOfRange {
                epidemic: condition.id(),
                node,
                nodes,
            });
        }
        if !seen.insert(node) {
            return Err(EpicastError::DuplicateSeed {
                epidemic: condition.id(),
                node,
            });
        }
    }
    Ok(())
}

/// One epidemic instance running to its natural stop condition.
///
/// The engine owns its random stream and per-trial [`CascadeState`], borrows
/// the shared read-only network, and appends one record per successful
/// transmission draw to the optional trace sink, including attempts directed
/// at already-infected or recovered nodes. It is the unit of concurrency: an
/// entire trial runs on one worker without migration.
///
/// # Examples
/// ```
/// use epicast_core::{
///     CascadeEngine, ContactNetwork, InitialCondition, NetworkError, StopCriterion,
/// };
/// use rand::{SeedableRng, rngs::SmallRng};
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
/// let condition = InitialCondition::singleton(StopCriterion::MaxTime(5));
/// let rng = SmallRng::seed_from_u64(1);
/// let mut engine = CascadeEngine::new(&Pair, 1.0, &condition, rng, None)?;
/// engine.run()?;
/// assert_eq!(engine.state().infected_count(), 2);
/// # Ok::<(), epicast_core::EpicastError>(())
/// ```
pub struct CascadeEngine<'a, N: ?Sized> {
    network: &'a N,
    probability: f64,
    epidemic: u32,
    stop: StopCriterion,
    state: CascadeState,
    rng: SmallRng,
    trace: Option<&'a dyn TraceSink>,
}

impl<N: ContactNetwork + ?Sized> std::fmt::Debug for CascadeEngine<'_, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeEngine")
            .field("network", &self.network.name())
            .field("probability", &self.probability)
            .field("epidemic", &self.epidemic)
            .field("stop", &self.stop)
            .field("state", &self.state)
            .field("rng", &self.rng)
            .field("trace", &self.trace.is_some())
            .finish()
    }
}

impl<'a, N: ContactNetwork + ?Sized> CascadeEngine<'a, N> {
    /// Seeds an engine for one trial of `condition` on `network`.
    ///
    /// Every node in the seed set is marked infected at time 1 and scheduled
    /// as a provider. The engine accepts any `probability` in `[0, 1]`; the
    /// `(0, 1]` configuration constraint is enforced by
    /// [`crate::EpicastBuilder::build`].
    ///
    /// # Errors
    /// Returns the precondition failures described on
    /// [`crate::Epicast::run`] when `condition` does not fit `network`.
    pub fn new(
        network: &'a N,
        probability: f64,
        condition: &InitialCondition,
        rng: SmallRng,
        trace: Option<&'a dyn TraceSink>,
    ) -> Result<Self> {
        validate_condition(network, condition)?;
        let mut state = CascadeState::new(network.node_count());
        for &node in condition.seeds() {
            state.seed(node);
        }
        Ok(Self {
            network,
            probability,
            epidemic: condition.id(),
            stop: condition.stop(),
            state,
            rng,
            trace,
        })
    }

    /// Returns the epidemic id this engine runs.
    #[must_use]
    pub fn epidemic(&self) -> u32 {
        self.epidemic
    }

    /// Returns the trial state (counts, clock, infection times).
    #[must_use]
    pub fn state(&self) -> &CascadeState {
        &self.state
    }

    /// Runs the epidemic until a stop criterion fires or no providers remain.
    ///
    /// Providers are serviced strictly in infection order. Each provider gets
    /// one pass over its neighbour list and is then spent, matching the
    /// one-time-step infectious window. Under `MaxTime`, popping a provider
    /// infected later than the bound ends the trial before any of its
    /// attempts. Under `MaxInfected`, the trial ends the instant the target
    /// count is reached, mid-scan, leaving the provider's remaining
    /// neighbours untested.
    ///
    /// # Errors
    /// Returns [`EpicastError::Network`] when the network rejects a neighbour
    /// query and [`EpicastError::Sink`] when the trace sink rejects a record.
    #[instrument(
        name = "core.trial",
        level = "debug",
        skip_all,
        fields(epidemic = self.epidemic),
    )]
    pub fn run(&mut self) -> Result<()> {
        while let Some(provider) = self.state.next_provider() {
            let provider_time = self.state.infection_time(provider);
            if let StopCriterion::MaxTime(bound) = self.stop {
                if bound < provider_time {
                    debug!(provider, provider_time, bound, "time horizon exceeded");
                    return Ok(());
                }
            }
            let clients = self
                .network
                .neighbours(provider)
                .map_err(|error| EpicastError::Network {
                    network: Arc::from(self.network.name()),
                    error,
                })?;
            for &client in clients {
                let draw: f64 = self.rng.sample(Standard);
                if draw >= self.probability {
                    continue;
                }
                if self.state.try_infect(client, provider_time + 1) {
                    self.state.credit_link();
                    self.state.note_productive_step(provider_time);
                    self.emit(provider_time, provider, client)?;
                    if let StopCriterion::MaxInfected(bound) = self.stop {
                        if self.state.infected_count() == bound {
                            debug!(provider, client, bound, "size target reached");
                            return Ok(());
                        }
                    }
                } else {
                    if self.state.infection_time(client) == provider_time + 1 {
                        // The receiver joined the cascade in this very step
                        // through another provider; the attempt is still a
                        // cascade arc.
                        self.state.credit_link();
                    }
                    self.emit(provider_time, provider, client)?;
                }
            }
        }
        Ok(())
    }

    fn emit(&self, time: u32, provider: usize, client: usize) -> Result<()> {
        if let Some(sink) = self.trace {
            sink.record(TraceEvent {
                time,
                provider,
                client,
                epidemic: self.epidemic,
            })
            .map_err(|error| EpicastError::Sink { error })?;
        }
        Ok(())
    }
}
