//! Unit tests for the CLI commands and input wiring.

use super::commands::{derive_network_name, run_command};
use super::{Cli, CliError, Command, RunCommand, RunSummary, render_summary, run_cli};

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use epicast_core::{EpicastError, TrialReport};
use epicast_providers_seedlist::SeedListError;
use rstest::rstest;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn temp_dir() -> TempDir {
    TempDir::new().expect("temporary directory must be creatable")
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("fixture file must be writable");
    path
}

/// A 4-node directed ring: 0 -> 1 -> 2 -> 3 -> 0.
fn directed_ring(dir: &TempDir) -> PathBuf {
    write_file(dir, "ring.graph", "4 4\n0 1\n1 2\n2 3\n3 0\n")
}

fn base_command(graph: PathBuf) -> RunCommand {
    RunCommand {
        probability: 1.0,
        graph,
        undirected: false,
        name: None,
        seeds: None,
        random_seeds: false,
        max_time: Some(10),
        time_bounds: None,
        size_bounds: None,
        samples: 1,
        threads: None,
        rng_seed: Some(7),
        trace: None,
        status: None,
    }
}

fn run_cli_expecting_error(cli: Cli, message: &str) -> CliError {
    run_cli(cli).map(|_| ()).expect_err(message)
}

#[rstest]
#[case::override_name("/tmp/contacts.graph", Some("override"), "override")]
#[case::stem_with_extension("/tmp/contacts.graph", None, "contacts")]
#[case::stem_without_extension("/tmp/contacts", None, "contacts")]
#[case::missing_stem("", None, "network")]
fn derive_network_name_selects_expected_name(
    #[case] raw_path: &str,
    #[case] override_name: Option<&'static str>,
    #[case] expected: &str,
) {
    let path = Path::new(raw_path);
    let name = derive_network_name(path, override_name);
    assert_eq!(name, expected);
}

#[rstest]
fn run_spreads_over_a_directed_ring() -> TestResult {
    let dir = temp_dir();
    let command = base_command(directed_ring(&dir));

    let summary = run_command(command)?;

    assert_eq!(summary.network, "ring");
    assert_eq!(summary.nodes, 4);
    assert_eq!(summary.edges, 4);
    assert_eq!(summary.epidemics, 1);
    assert_eq!(summary.reports.len(), 1);
    assert_eq!(summary.reports[0].infected_count(), 4);
    Ok(())
}

#[rstest]
fn run_expands_undirected_records() -> TestResult {
    let dir = temp_dir();
    let path = write_file(&dir, "path.graph", "3 2\n0 1\n1 2\n");
    let mut command = base_command(path);
    command.undirected = true;

    let summary = run_command(command)?;

    assert_eq!(summary.edges, 4);
    assert_eq!(summary.reports[0].infected_count(), 3);
    Ok(())
}

#[rstest]
fn run_matches_per_epidemic_size_bounds() -> TestResult {
    let dir = temp_dir();
    let graph = directed_ring(&dir);
    let seeds = write_file(&dir, "seeds.list", "2\n1 1 0\n2 1 2\n");
    let bounds = write_file(&dir, "bounds.list", "1 2\n2 2\n");
    let mut command = base_command(graph);
    command.seeds = Some(seeds);
    command.max_time = None;
    command.size_bounds = Some(bounds);

    let summary = run_command(command)?;

    assert_eq!(summary.epidemics, 2);
    assert_eq!(summary.reports.len(), 2);
    // Every trial stops the instant its second node is infected.
    assert!(summary
        .reports
        .iter()
        .all(|report| report.infected_count() == 2));
    Ok(())
}

#[rstest]
fn run_writes_the_trace_with_criterion_suffix() -> TestResult {
    let dir = temp_dir();
    let mut command = base_command(directed_ring(&dir));
    command.trace = Some(dir.path().join("out"));

    let summary = run_command(command)?;

    let trace_path = summary.trace.clone().expect("tracing was enabled");
    assert!(trace_path.to_string_lossy().ends_with("out-maxdepth.trace"));
    // Certain transmission around a directed ring is fully deterministic,
    // including the final attempt on the recovered seed node.
    let contents = fs::read_to_string(&trace_path)?;
    assert_eq!(contents, "1 0 1 0\n2 1 2 0\n3 2 3 0\n4 3 0 0\n");
    Ok(())
}

#[rstest]
fn run_streams_status_records_to_a_file() -> TestResult {
    let dir = temp_dir();
    let status_path = dir.path().join("status.log");
    let mut command = base_command(directed_ring(&dir));
    command.status = Some(Some(status_path.clone()));

    run_command(command)?;

    let contents = fs::read_to_string(&status_path)?;
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "Epidemic 0 #1: started at t = 1 with 1 / 4 ( 25.00% ) infected nodes"
    );
    assert_eq!(
        lines[1],
        "Epidemic 0 #1: stopped at t = 3 with 4 / 4 ( 100.00% ) infected nodes and 3 links"
    );
    Ok(())
}

#[rstest]
fn runs_with_the_same_seed_are_reproducible() -> TestResult {
    let dir = temp_dir();
    let graph = directed_ring(&dir);
    let mut first = base_command(graph.clone());
    first.probability = 0.5;
    first.samples = 4;
    let mut second = base_command(graph);
    second.probability = 0.5;
    second.samples = 4;

    let first_summary = run_command(first)?;
    let second_summary = run_command(second)?;

    assert_eq!(first_summary.reports, second_summary.reports);
    Ok(())
}

#[rstest]
fn run_draws_random_seeds_from_counts() -> TestResult {
    let dir = temp_dir();
    let graph = write_file(&dir, "big.graph", "6 5\n0 1\n1 2\n2 3\n3 4\n4 5\n");
    let seeds = write_file(&dir, "counts.list", "1\n3 2\n");
    let mut command = base_command(graph);
    command.seeds = Some(seeds);
    command.random_seeds = true;
    command.max_time = Some(1);

    let summary = run_command(command)?;

    assert_eq!(summary.epidemics, 1);
    assert_eq!(summary.reports[0].epidemic(), 3);
    assert!(summary.reports[0].infected_count() >= 2);
    Ok(())
}

#[rstest]
fn run_rejects_missing_graph_files() {
    let dir = temp_dir();
    let command = base_command(dir.path().join("absent.graph"));
    let cli = Cli {
        command: Command::Run(command),
    };
    let err = run_cli_expecting_error(cli, "run must fail for a missing graph");
    assert!(matches!(err, CliError::Io { .. }));
}

#[rstest]
fn run_rejects_malformed_graph_headers() {
    let dir = temp_dir();
    let graph = write_file(&dir, "bad.graph", "not a header\n");
    let cli = Cli {
        command: Command::Run(base_command(graph)),
    };
    let err = run_cli_expecting_error(cli, "run must fail for a malformed header");
    assert!(matches!(err, CliError::EdgeList(_)));
}

#[rstest]
fn run_rejects_bound_lists_out_of_order() {
    let dir = temp_dir();
    let graph = directed_ring(&dir);
    let seeds = write_file(&dir, "seeds.list", "2\n1 1 0\n2 1 2\n");
    let bounds = write_file(&dir, "bounds.list", "2 2\n1 2\n");
    let mut command = base_command(graph);
    command.seeds = Some(seeds);
    command.max_time = None;
    command.size_bounds = Some(bounds);

    let err = run_command(command).map(|_| ()).expect_err("ids are reordered");
    assert!(matches!(
        err,
        CliError::SeedList(SeedListError::BoundIdMismatch { index: 0, .. })
    ));
}

#[rstest]
fn run_rejects_out_of_range_probability() {
    let dir = temp_dir();
    let mut command = base_command(directed_ring(&dir));
    command.probability = 0.0;

    let err = run_command(command)
        .map(|_| ())
        .expect_err("probability 0 is invalid");
    assert!(matches!(
        err,
        CliError::Core(EpicastError::InvalidProbability { .. })
    ));
}

#[rstest]
fn run_rejects_random_seed_counts_covering_the_network() {
    let dir = temp_dir();
    let graph = directed_ring(&dir);
    let seeds = write_file(&dir, "counts.list", "1\n0 4\n");
    let mut command = base_command(graph);
    command.seeds = Some(seeds);
    command.random_seeds = true;

    let err = run_command(command)
        .map(|_| ())
        .expect_err("4 of 4 nodes cannot be drawn");
    assert!(matches!(
        err,
        CliError::Core(EpicastError::TooManySeeds { .. })
    ));
}

#[rstest]
fn parser_requires_exactly_one_bound_argument() {
    let missing = Cli::try_parse_from([
        "epicast", "run", "-p", "0.5", "-g", "contacts.graph",
    ]);
    assert!(missing.is_err());

    let conflicting = Cli::try_parse_from([
        "epicast",
        "run",
        "-p",
        "0.5",
        "-g",
        "contacts.graph",
        "--max-time",
        "3",
        "--size-bounds",
        "bounds.list",
    ]);
    assert!(conflicting.is_err());
}

#[rstest]
fn parser_accepts_a_bare_status_flag() {
    let cli = Cli::try_parse_from([
        "epicast",
        "run",
        "-p",
        "0.5",
        "-g",
        "contacts.graph",
        "--max-time",
        "3",
        "--status",
    ])
    .expect("bare --status is valid");
    let Command::Run(run) = cli.command;
    assert_eq!(run.status, Some(None));
}

#[rstest]
fn parser_accepts_a_status_path() {
    let cli = Cli::try_parse_from([
        "epicast",
        "run",
        "-p",
        "0.5",
        "-g",
        "contacts.graph",
        "--max-time",
        "3",
        "--status",
        "status.log",
    ])
    .expect("--status with a path is valid");
    let Command::Run(run) = cli.command;
    assert_eq!(run.status, Some(Some(PathBuf::from("status.log"))));
}

#[rstest]
fn render_summary_lists_reports() -> TestResult {
    let summary = RunSummary {
        network: "ring".into(),
        nodes: 4,
        edges: 4,
        epidemics: 1,
        trace: None,
        reports: vec![TrialReport::new(0, 1, 3, 4, 4, 3)],
    };
    let mut buffer = Vec::new();
    render_summary(&summary, &mut buffer)?;
    let rendered = String::from_utf8(buffer)?;
    assert_eq!(
        rendered,
        "network: ring (4 nodes, 4 arcs)\nepidemics: 1\ntrials: 1\n0\t1\t3\t4\t3\n"
    );
    Ok(())
}
