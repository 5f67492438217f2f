use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use portfolio_metrics_core::metrics::{self, MetricsInput};
use portfolio_metrics_core::PeriodInput;

use crate::input;

/// Arguments for the full metrics pipeline
#[derive(Args)]
pub struct MetricsArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// New investment per period (comma-separated, e.g. "100,950,0")
    #[arg(long, value_delimiter = ',')]
    pub investments: Option<Vec<Decimal>>,

    /// Price return per period as decimals (e.g. "-0.5,0.35,0.27")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub returns: Option<Vec<Decimal>>,

    /// Dividends reinvested per period (defaults to zeros)
    #[arg(long, value_delimiter = ',')]
    pub dividends_reinvested: Option<Vec<Decimal>>,

    /// Dividends paid out per period (defaults to zeros)
    #[arg(long, value_delimiter = ',')]
    pub dividends_paid: Option<Vec<Decimal>>,

    /// Signed withdrawal per period; negative adds an extra contribution
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub withdrawals: Option<Vec<Decimal>>,
}

pub fn run_metrics(args: MetricsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let metrics_input: MetricsInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let investments = args
            .investments
            .ok_or("--investments is required (or provide --input)")?;
        let returns = args
            .returns
            .ok_or("--returns is required (or provide --input)")?;

        let periods = periods_from_vectors(
            investments,
            returns,
            args.dividends_reinvested.unwrap_or_default(),
            args.dividends_paid.unwrap_or_default(),
            args.withdrawals.unwrap_or_default(),
        )?;

        MetricsInput {
            periods,
            bounds: None,
            solver: None,
        }
    };

    let result = metrics::compute_portfolio_metrics(&metrics_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Zips the flag vectors into period inputs. The investment and return
/// vectors set the period count; the optional vectors may be empty (read as
/// zeros) but must otherwise match that count.
fn periods_from_vectors(
    investments: Vec<Decimal>,
    returns: Vec<Decimal>,
    dividends_reinvested: Vec<Decimal>,
    dividends_paid: Vec<Decimal>,
    withdrawals: Vec<Decimal>,
) -> Result<Vec<PeriodInput>, String> {
    let n = investments.len();
    if returns.len() != n {
        return Err(format!(
            "--returns has {} entries but --investments has {}",
            returns.len(),
            n
        ));
    }
    for (flag, vec) in [
        ("--dividends-reinvested", &dividends_reinvested),
        ("--dividends-paid", &dividends_paid),
        ("--withdrawals", &withdrawals),
    ] {
        if !vec.is_empty() && vec.len() != n {
            return Err(format!("{flag} has {} entries, expected {n}", vec.len()));
        }
    }

    let at = |vec: &Vec<Decimal>, i: usize| vec.get(i).copied().unwrap_or(Decimal::ZERO);

    Ok((0..n)
        .map(|i| PeriodInput {
            new_investment: investments[i],
            period_return: returns[i],
            dividend_reinvested: at(&dividends_reinvested, i),
            dividend_paid_out: at(&dividends_paid, i),
            withdrawal: at(&withdrawals, i),
        })
        .collect())
}
