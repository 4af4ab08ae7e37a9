//! Madness Projection CLI
//!
//! Projects a field loaded from JSON, or runs the deterministic scenarios.

use anyhow::{Context, Result};
use clap::Parser;
use madness_core::{ProjectionConfig, SimulationConfig, TeamRecord, TournamentProjector};
use madness_env::{CancelToken, EntropyContext, RandomContext, RunId};
use madness_sim::{
    load_config, load_teams, ProjectionSummary, ScenarioId, ScenarioRunner, ScenarioSummary,
    SeededContext,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Default simulations per projection when neither flag nor config sets one
const DEFAULT_SIMULATIONS: u64 = 2000;

/// Tournament projection and deterministic scenario CLI
#[derive(Parser, Debug)]
#[command(name = "madness-sim")]
#[command(about = "Project tournament seeds and advancement probabilities", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Bracket simulations per projection
    #[arg(short = 'n', long)]
    simulations: Option<u64>,

    /// Scenario to run (full_field, short_field, chalk, coin_flip, two_region, tie_break, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Project a JSON array of team records instead of running scenarios
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON projection config (weights, regions, simulations, chunk size)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Draw from OS entropy instead of the seed (input mode only)
    #[arg(long)]
    entropy: bool,

    /// Abort simulation after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Teams listed in the projection summary
    #[arg(long, default_value = "16")]
    top: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_tracing(args.verbose) {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(2);
    }

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Logs go to stderr so that `--json` output on stdout stays parseable.
fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

fn run(args: &Args) -> Result<bool> {
    if !args.json {
        info!("Madness Projection Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Determine base seed
    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .context("System clock is before the Unix epoch")?
            .as_nanos() as u64
    } else {
        args.seed
    };

    let cancel = match args.timeout_ms {
        Some(ms) => CancelToken::new().with_deadline(Duration::from_millis(ms)),
        None => CancelToken::new(),
    };

    match &args.input {
        Some(path) => run_projection(args, path, base_seed, cancel),
        None => run_scenarios(args, base_seed, cancel),
    }
}

/// Projects a field from disk and prints its summary.
fn run_projection(args: &Args, path: &Path, seed: u64, cancel: CancelToken) -> Result<bool> {
    let teams = load_teams(path)?;
    let mut config = match &args.config {
        Some(config_path) => load_config(config_path)?,
        None => ProjectionConfig::default()
            .with_simulation(SimulationConfig::default().with_simulations(DEFAULT_SIMULATIONS)),
    };
    if let Some(simulations) = args.simulations {
        config.simulation.simulations = simulations;
    }

    let projector = TournamentProjector::new(config).with_cancel(cancel);
    let summary = if args.entropy {
        project(args, &projector, teams, &EntropyContext::new(), RunId::new())?
    } else {
        let ctx = SeededContext::new(seed);
        project(args, &projector, teams, &ctx, ctx.run_id())?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.log_table();
        if !summary.diagnostics.is_clean() {
            info!("Degenerate bracket: {:?}", summary.diagnostics);
        }
    }
    Ok(true)
}

fn project<C: RandomContext>(
    args: &Args,
    projector: &TournamentProjector,
    mut teams: Vec<TeamRecord>,
    ctx: &C,
    run_id: RunId,
) -> Result<ProjectionSummary> {
    info!("Projecting {} teams (run {})", teams.len(), run_id);
    let report = projector
        .project(&mut teams, ctx)
        .context("Projection failed")?;
    Ok(ProjectionSummary::new(run_id, &teams, &report, args.top))
}

/// Runs the selected scenarios over `args.seeds` consecutive seeds.
fn run_scenarios(args: &Args, base_seed: u64, cancel: CancelToken) -> Result<bool> {
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse::<ScenarioId>().map_err(anyhow::Error::msg).with_context(|| {
            let names: Vec<&str> = ScenarioId::all().iter().map(|s| s.name()).collect();
            format!("Available scenarios: {}, all", names.join(", "))
        })?]
    };

    let mut all_results = Vec::new();
    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);
        let runner = ScenarioRunner::new(seed)
            .with_simulations(args.simulations.unwrap_or(DEFAULT_SIMULATIONS))
            .with_cancel(cancel.clone());

        for scenario in &scenarios {
            let result = runner.run(*scenario);

            if !args.json {
                if result.passed {
                    info!("✓ {} (seed={}) PASSED", scenario.name(), seed);
                } else {
                    error!(
                        "✗ {} (seed={}) FAILED: {}",
                        scenario.name(),
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            all_results.push(result);
        }
    }

    let summary = ScenarioSummary::new(all_results);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if summary.failed == 0 {
            info!("✅ All {} scenario runs passed!", summary.total);
        } else {
            error!("❌ {}/{} scenario runs failed!", summary.failed, summary.total);

            for result in summary.failures() {
                error!(
                    "  - {} seed={}: {}",
                    result.scenario.name(),
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    Ok(summary.failed == 0)
}
