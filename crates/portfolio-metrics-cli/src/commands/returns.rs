use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use portfolio_metrics_core::solver::{solve_irr, SolverConfig};
use portfolio_metrics_core::statistics::{arithmetic_mean, geometric_mean};
use portfolio_metrics_core::twr::compute_time_weighted_return;
use portfolio_metrics_core::{CashFlowSeries, MetricOutcome};

use crate::input;

/// Arguments for the IRR solver
#[derive(Args)]
pub struct IrrArgs {
    /// Path to a JSON array of cash flows (overrides --cash-flows)
    #[arg(long)]
    pub input: Option<String>,

    /// Cash flows from the investor's perspective, terminal value last
    /// (comma-separated, e.g. "-100,30,30,130")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<Decimal>>,

    /// Starting rate for the iteration
    #[arg(long, allow_hyphen_values = true)]
    pub guess: Option<Decimal>,

    /// Hard cap on Newton steps
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Convergence threshold on the successive-guess delta
    #[arg(long)]
    pub tolerance: Option<Decimal>,

    /// Absolute rate beyond which the iteration counts as runaway
    #[arg(long)]
    pub divergence_bound: Option<Decimal>,
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let flows: Vec<Decimal> = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        args.cash_flows
            .ok_or("--cash-flows is required (or provide --input)")?
    };

    let mut config = SolverConfig::default();
    if let Some(guess) = args.guess {
        config.initial_guess = guess;
    }
    if let Some(cap) = args.max_iterations {
        config.max_iterations = cap;
    }
    if let Some(tolerance) = args.tolerance {
        config.tolerance = tolerance;
    }
    if let Some(bound) = args.divergence_bound {
        config.divergence_bound = bound;
    }

    let solution = solve_irr(&CashFlowSeries { flows }, &config)?;
    Ok(serde_json::to_value(solution)?)
}

/// Arguments for the time-weighted return
#[derive(Args)]
pub struct TwrArgs {
    /// Path to a JSON file with start_values, gains, and total_dividends
    #[arg(long)]
    pub input: Option<String>,

    /// Starting balance per period (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub start_values: Option<Vec<Decimal>>,

    /// Gain per period (comma-separated)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub gains: Option<Vec<Decimal>>,

    /// Total dividends per period (defaults to zeros)
    #[arg(long, value_delimiter = ',')]
    pub dividends: Option<Vec<Decimal>>,
}

#[derive(Deserialize)]
struct TwrSeriesInput {
    start_values: Vec<Decimal>,
    gains: Vec<Decimal>,
    #[serde(default)]
    total_dividends: Vec<Decimal>,
}

pub fn run_twr(args: TwrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let series: TwrSeriesInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        TwrSeriesInput {
            start_values: args
                .start_values
                .ok_or("--start-values is required (or provide --input)")?,
            gains: args.gains.ok_or("--gains is required (or provide --input)")?,
            total_dividends: args.dividends.unwrap_or_default(),
        }
    };

    let dividends = if series.total_dividends.is_empty() {
        vec![Decimal::ZERO; series.start_values.len()]
    } else {
        series.total_dividends
    };

    let solution = compute_time_weighted_return(&series.start_values, &series.gains, &dividends)?;
    Ok(serde_json::to_value(solution)?)
}

/// Arguments for mean period returns
#[derive(Args)]
pub struct MeansArgs {
    /// Path to a JSON array of period returns
    #[arg(long)]
    pub input: Option<String>,

    /// Period returns as decimals (comma-separated, e.g. "-0.5,0.35,0.27")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub returns: Option<Vec<Decimal>>,
}

pub fn run_means(args: MeansArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let returns: Vec<Decimal> = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        args.returns
            .ok_or("--returns is required (or provide --input)")?
    };

    let arithmetic: MetricOutcome = arithmetic_mean(&returns).into();
    let geometric: MetricOutcome = geometric_mean(&returns).into();

    Ok(serde_json::json!({
        "arithmetic_mean": arithmetic,
        "geometric_mean": geometric,
    }))
}
