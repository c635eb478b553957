//! Blue Ridge Hot Tubs product-mix solver and resource sensitivity analysis
//!
//! ```bash
//! # Optimal plan for the baseline limits
//! blueridge solve
//!
//! # Marginal value of labor between 1566 and 1820 hours
//! blueridge sweep labor --start 1566 --stop 1820 --refine
//!
//! # Baseline plus every sweep from a scenario file, as JSON
//! blueridge --config scenario.toml analyze --format json
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use blueridge_model::{ModelBuilder, Reporter, Resource, ResourceLimits, RunError, Scenario, SweepPlan, SweepRange};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;
mod output;

use config::Config;
use output::{JsonReporter, TextReporter};

#[derive(Parser)]
#[command(name = "blueridge")]
#[command(version, about = "Product-mix LP and resource sensitivity analysis", long_about = None)]
struct Cli {
    /// Scenario file (TOML); the built-in scenario is used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve for the profit-maximizing production plan
    Solve {
        #[command(flatten)]
        limits: LimitArgs,
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Re-solve over a range of one resource's limit
    Sweep {
        /// Resource to vary (pumps, labor, tubing)
        resource: Resource,
        #[arg(long)]
        start: f64,
        #[arg(long)]
        stop: f64,
        #[arg(long, default_value_t = 1.0)]
        step: f64,
        /// Locate the breakpoint by bisection instead of the grid midpoint
        #[arg(long)]
        refine: bool,
        #[command(flatten)]
        limits: LimitArgs,
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Baseline plan followed by every sweep in the scenario
    Analyze {
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Show the effective scenario
    Config,
}

/// Overrides for the scenario's baseline limits
#[derive(Args)]
struct LimitArgs {
    #[arg(long)]
    pumps: Option<f64>,
    #[arg(long)]
    labor: Option<f64>,
    #[arg(long)]
    tubing: Option<f64>,
}

impl LimitArgs {
    fn apply(&self, base: ResourceLimits) -> Result<ResourceLimits> {
        let limits = ResourceLimits::new(
            self.pumps.unwrap_or(base.pumps),
            self.labor.unwrap_or(base.labor),
            self.tubing.unwrap_or(base.tubing),
        )?;
        Ok(limits)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blueridge=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Keep the underlying cause chain for both model and reporter failures
fn run_error<E: Into<anyhow::Error>>(err: RunError<E>) -> anyhow::Error {
    match err {
        RunError::Model(e) => anyhow::Error::from(e),
        RunError::Report(e) => e.into(),
    }
    .context("analysis failed")
}

fn run_scenario(scenario: &Scenario, format: Format) -> Result<()> {
    let stdout = std::io::stdout().lock();
    match format {
        Format::Text => scenario.run(&mut TextReporter::new(stdout)).map_err(run_error),
        Format::Json => scenario.run(&mut JsonReporter::new(stdout)).map_err(run_error),
    }
}

fn solve(config: &Config, limits: &LimitArgs, format: Format) -> Result<()> {
    let limits = limits.apply(config.limits()?)?;
    let plan = ModelBuilder::new().solve(&limits)?;

    let stdout = std::io::stdout().lock();
    match format {
        Format::Text => {
            let mut reporter = TextReporter::new(stdout);
            reporter.report_plan(&limits, &plan)?;
            reporter.finish()?;
        }
        Format::Json => {
            let mut reporter = JsonReporter::new(stdout);
            reporter.report_plan(&limits, &plan)?;
            reporter.finish()?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    debug!(config = ?cli.config, "scenario loaded");

    match cli.command {
        Commands::Solve { limits, format } => solve(&config, &limits, format),
        Commands::Sweep {
            resource,
            start,
            stop,
            step,
            refine,
            limits,
            format,
        } => {
            let mut scenario = config.to_scenario()?;
            scenario.limits = limits.apply(scenario.limits)?;
            scenario.options.refine |= refine;
            scenario.sweeps = vec![SweepPlan {
                resource,
                range: SweepRange::new(start, stop, step)?,
            }];
            run_scenario(&scenario, format)
        }
        Commands::Analyze { format } => run_scenario(&config.to_scenario()?, format),
        Commands::Config => {
            config::show(cli.config.as_deref())?;
            std::io::stdout().flush()?;
            Ok(())
        }
    }
}
