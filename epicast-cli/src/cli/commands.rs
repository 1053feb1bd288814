//! Command implementations and argument parsing for the epicast CLI.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{ArgGroup, Args, Parser, Subcommand};
use epicast_core::{
    ContactNetwork, EpicastBuilder, EpicastError, InitialCondition, LineTraceSink, Sinks,
    StatusSink, StopCriterion, TextStatusSink, TraceSink, TrialReport,
};
use epicast_providers_edgelist::{AdjacencyNetwork, EdgeListError, Orientation};
use epicast_providers_seedlist::{self as seedlist, SeedListError};
use rand::{SeedableRng, rngs::SmallRng};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

const DEFAULT_SAMPLES: usize = 1;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "epicast",
    about = "Simulate stochastic epidemic cascades over a contact network."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run epidemic cascade trials.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
#[command(group(
    ArgGroup::new("bound")
        .required(true)
        .args(["max_time", "time_bounds", "size_bounds"])
))]
pub struct RunCommand {
    /// Per-edge transmission probability in (0, 1].
    #[arg(long, short = 'p')]
    pub probability: f64,

    /// Path to the contact-network edge list (`n m` header, then arcs).
    #[arg(long, short = 'g')]
    pub graph: PathBuf,

    /// Treat each arc record as an undirected edge.
    #[arg(long)]
    pub undirected: bool,

    /// Override name for the network (defaults to the file name).
    #[arg(long)]
    pub name: Option<String>,

    /// Path to the initial-condition list; absent means one epidemic seeded
    /// at node 0.
    #[arg(long, short = 'i')]
    pub seeds: Option<PathBuf>,

    /// Draw seed nodes randomly; the seed list then carries counts only.
    #[arg(long, requires = "seeds")]
    pub random_seeds: bool,

    /// Global elapsed-time bound applied to every epidemic.
    #[arg(long, short = 't')]
    pub max_time: Option<u32>,

    /// Per-epidemic elapsed-time bound list.
    #[arg(long)]
    pub time_bounds: Option<PathBuf>,

    /// Per-epidemic infected-count bound list.
    #[arg(long)]
    pub size_bounds: Option<PathBuf>,

    /// Number of independent trials per epidemic.
    #[arg(long, short = 's', default_value_t = DEFAULT_SAMPLES)]
    pub samples: usize,

    /// Worker threads for the outer epidemic loop.
    #[arg(long, short = 'w')]
    pub threads: Option<usize>,

    /// Base seed for the random stream; drawn and logged when absent.
    #[arg(long)]
    pub rng_seed: Option<u64>,

    /// Prefix for the trace output file
    /// (written to `<prefix>-<criterion>.trace`).
    #[arg(long, short = 'o')]
    pub trace: Option<PathBuf>,

    /// Write per-trial status records to this path, or to stdout when the
    /// flag is given bare.
    #[arg(long, num_args = 0..=1)]
    pub status: Option<Option<PathBuf>>,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while opening an input or output path.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Contact-network loading failed.
    #[error(transparent)]
    EdgeList(#[from] EdgeListError),
    /// Seed-list or bound-list parsing failed.
    #[error(transparent)]
    SeedList(#[from] SeedListError),
    /// Core configuration or simulation failed.
    #[error(transparent)]
    Core(#[from] EpicastError),
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Name reported for the loaded network.
    pub network: String,
    /// Number of nodes in the network.
    pub nodes: usize,
    /// Number of arcs in the network.
    pub edges: usize,
    /// Number of epidemic definitions that ran.
    pub epidemics: usize,
    /// Path of the trace output file, when tracing was enabled.
    pub trace: Option<PathBuf>,
    /// Per-trial reports in (epidemic, trial) order.
    pub reports: Vec<TrialReport>,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading inputs or running trials fails.
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<RunSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(probability = field::Empty, samples = field::Empty, rng_seed = field::Empty),
)]
pub(super) fn run_command(command: RunCommand) -> Result<RunSummary, CliError> {
    let rng_seed = command.rng_seed.unwrap_or_else(rand::random);
    let span = Span::current();
    span.record("probability", field::display(command.probability));
    span.record("samples", field::display(command.samples));
    // Always on record so any run can be reproduced with --rng-seed.
    span.record("rng_seed", field::display(rng_seed));

    let mut builder = EpicastBuilder::new()
        .with_probability(command.probability)
        .with_samples(command.samples)
        .with_rng_seed(rng_seed);
    if let Some(threads) = command.threads {
        builder = builder.with_threads(threads);
    }
    let epicast = builder.build()?;

    let network = load_network(&command)?;
    let conditions = load_conditions(&command, &network, rng_seed)?;
    let epidemics = conditions.len();

    let trace_path = command
        .trace
        .as_ref()
        .map(|prefix| trace_output_path(prefix, criterion_label(&command)));
    let trace_sink = match &trace_path {
        Some(path) => Some(LineTraceSink::new(BufWriter::new(create_file(path)?))),
        None => None,
    };
    let status_sink: Option<TextStatusSink<Box<dyn Write + Send>>> = match &command.status {
        None => None,
        Some(None) => Some(TextStatusSink::new(Box::new(io::stdout()))),
        Some(Some(path)) => Some(TextStatusSink::new(Box::new(create_file(path)?))),
    };

    let sinks = Sinks {
        trace: trace_sink.as_ref().map(|sink| sink as &dyn TraceSink),
        status: status_sink.as_ref().map(|sink| sink as &dyn StatusSink),
    };
    let reports = epicast.run(&network, conditions, sinks)?;

    if let (Some(sink), Some(path)) = (trace_sink, &trace_path) {
        let mut writer = sink
            .into_inner()
            .map_err(|error| EpicastError::Sink { error })?;
        writer.flush().map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        })?;
    }

    info!(
        network = network.name(),
        epidemics,
        trials = reports.len(),
        "command completed"
    );
    Ok(RunSummary {
        network: network.name().to_owned(),
        nodes: network.node_count(),
        edges: network.edge_count(),
        epidemics,
        trace: trace_path,
        reports,
    })
}

#[instrument(
    name = "cli.load_network",
    err,
    skip(command),
    fields(path = field::Empty, orientation = field::Empty),
)]
fn load_network(command: &RunCommand) -> Result<AdjacencyNetwork, CliError> {
    let span = Span::current();
    span.record("path", field::display(command.graph.display()));
    let orientation = if command.undirected {
        Orientation::Undirected
    } else {
        Orientation::Directed
    };
    span.record("orientation", field::debug(orientation));
    let chosen_name = derive_network_name(&command.graph, command.name.as_deref());
    let reader = open_reader(&command.graph)?;
    let network = AdjacencyNetwork::try_from_reader(chosen_name, reader, orientation)?;
    info!(
        network = network.name(),
        nodes = network.node_count(),
        arcs = network.edge_count(),
        "network loaded"
    );
    Ok(network)
}

/// How the seed nodes of one epidemic are obtained.
enum SeedSet {
    Explicit(Vec<usize>),
    Drawn(usize),
}

#[instrument(name = "cli.load_conditions", err, skip_all, fields(source = field::Empty))]
fn load_conditions(
    command: &RunCommand,
    network: &AdjacencyNetwork,
    rng_seed: u64,
) -> Result<Vec<InitialCondition>, CliError> {
    let span = Span::current();
    let (ids, seed_sets): (Vec<u32>, Vec<SeedSet>) = match &command.seeds {
        None => {
            span.record("source", field::display("default"));
            (vec![0], vec![SeedSet::Explicit(vec![0])])
        }
        Some(path) => {
            span.record("source", field::display(path.display()));
            let reader = open_reader(path)?;
            if command.random_seeds {
                let counts = seedlist::seed_counts_from_reader(reader)?;
                (
                    counts.iter().map(|record| record.id).collect(),
                    counts
                        .iter()
                        .map(|record| SeedSet::Drawn(record.count))
                        .collect(),
                )
            } else {
                let records = seedlist::seeds_from_reader(reader)?;
                (
                    records.iter().map(|record| record.id).collect(),
                    records
                        .into_iter()
                        .map(|record| SeedSet::Explicit(record.seeds))
                        .collect(),
                )
            }
        }
    };

    let stops = resolve_stops(command, &ids)?;
    let mut rng = SmallRng::seed_from_u64(rng_seed);
    ids.into_iter()
        .zip(seed_sets)
        .zip(stops)
        .map(|((id, seed_set), stop)| match seed_set {
            SeedSet::Explicit(seeds) => Ok(InitialCondition::new(id, seeds, stop)),
            SeedSet::Drawn(count) => {
                InitialCondition::sample(id, count, network.node_count(), stop, &mut rng)
                    .map_err(CliError::Core)
            }
        })
        .collect()
}

/// Resolves one stop criterion per epidemic from the bound arguments.
fn resolve_stops(command: &RunCommand, ids: &[u32]) -> Result<Vec<StopCriterion>, CliError> {
    if let Some(bound) = command.max_time {
        return Ok(vec![StopCriterion::MaxTime(bound); ids.len()]);
    }
    let (path, make): (&Path, fn(u32) -> StopCriterion) =
        match (&command.time_bounds, &command.size_bounds) {
            (Some(path), _) => (path.as_path(), StopCriterion::MaxTime),
            (None, Some(path)) => (path.as_path(), StopCriterion::MaxInfected),
            (None, None) => unreachable!("clap requires exactly one bound argument"),
        };
    let bounds = seedlist::bounds_from_reader(open_reader(path)?)?;
    Ok(seedlist::apply_bounds(ids, &bounds, make)?)
}

/// Stable criterion name used to suffix the trace output file.
fn criterion_label(command: &RunCommand) -> &'static str {
    if command.size_bounds.is_some() {
        "maxsize"
    } else {
        "maxdepth"
    }
}

fn trace_output_path(prefix: &Path, label: &str) -> PathBuf {
    PathBuf::from(format!("{}-{label}.trace", prefix.display()))
}

#[instrument(name = "cli.open_reader", err, fields(path = field::Empty))]
fn open_reader(path: &Path) -> Result<BufReader<File>, CliError> {
    Span::current().record("path", field::display(path.display()));
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

fn create_file(path: &Path) -> Result<File, CliError> {
    File::create(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(super) fn derive_network_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| "network".to_owned())
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// One tab-separated line per trial follows the header:
/// `epidemic trial time infected links`.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &RunSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(
        writer,
        "network: {} ({} nodes, {} arcs)",
        summary.network, summary.nodes, summary.edges
    )?;
    writeln!(writer, "epidemics: {}", summary.epidemics)?;
    writeln!(writer, "trials: {}", summary.reports.len())?;
    if let Some(path) = &summary.trace {
        writeln!(writer, "trace: {}", path.display())?;
    }
    for report in &summary.reports {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}",
            report.epidemic(),
            report.trial(),
            report.time(),
            report.infected_count(),
            report.cascade_links(),
        )?;
    }
    Ok(())
}
