use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::cashflow::build_cash_flows;
use crate::error::MetricsError;
use crate::projection::project_balances;
use crate::solver::{solve_irr, SolverConfig};
use crate::statistics::{arithmetic_mean, geometric_mean};
use crate::twr::compute_time_weighted_return;
use crate::types::{
    with_metadata, CashFlowSeries, ComputationOutput, MetricOutcome, PeriodInput,
    PeriodPerformance, PeriodState, Rate, ReturnMetrics,
};
use crate::validation::{validate_periods, InputBounds};
use crate::MetricsResult;

/// Input for a full metrics run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsInput {
    pub periods: Vec<PeriodInput>,
    /// Field domains; defaults apply when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<InputBounds>,
    /// IRR solver tuning; defaults apply when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverConfig>,
}

/// Run the whole pipeline for one set of period inputs: validate, project
/// balances, then derive IRR, TWR, and both mean returns.
///
/// Validation is fail-closed: any out-of-range value stops the run before a
/// single metric is computed. Past validation, each metric succeeds or fails
/// on its own; an IRR that cannot converge never blocks the TWR or the
/// means. A balance projection that leaves decimal range fails every
/// balance-derived figure while the means still compute.
pub fn compute_portfolio_metrics(
    input: &MetricsInput,
) -> MetricsResult<ComputationOutput<ReturnMetrics>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let bounds = input.bounds.clone().unwrap_or_default();
    let solver = input.solver.clone().unwrap_or_default();

    // --- Validate ---
    if input.periods.is_empty() {
        return Err(MetricsError::InsufficientData {
            reason: "at least one period is required".to_string(),
        });
    }
    let violations = validate_periods(&input.periods, &bounds);
    if !violations.is_empty() {
        return Err(MetricsError::InputOutOfRange { violations });
    }

    // --- Project balances ---
    let (period_states, projection_error) = match project_balances(&input.periods) {
        Ok(states) => (states, None),
        Err(error) => (Vec::new(), Some(error)),
    };

    // --- Money-weighted return ---
    let (cash_flows, irr) = if let Some(error) = &projection_error {
        (
            CashFlowSeries { flows: Vec::new() },
            MetricOutcome::Failed {
                error: error.clone(),
            },
        )
    } else {
        let terminal_value = period_states
            .last()
            .map(|s| s.end_value)
            .unwrap_or(Decimal::ZERO);
        match build_cash_flows(&input.periods, terminal_value) {
            Ok(series) => {
                let irr = solve_irr(&series, &solver).map(|sol| sol.rate).into();
                (series, irr)
            }
            Err(error) => (
                CashFlowSeries { flows: Vec::new() },
                MetricOutcome::Failed { error },
            ),
        }
    };

    // --- Time-weighted return ---
    let twr: MetricOutcome = if let Some(error) = &projection_error {
        MetricOutcome::Failed {
            error: error.clone(),
        }
    } else {
        let start_values: Vec<Decimal> = period_states.iter().map(|s| s.start_value).collect();
        let gains: Vec<Decimal> = period_states.iter().map(|s| s.gain).collect();
        let total_dividends: Option<Vec<Decimal>> = input
            .periods
            .iter()
            .map(|p| p.dividend_reinvested.checked_add(p.dividend_paid_out))
            .collect();

        match total_dividends {
            Some(dividends) => compute_time_weighted_return(&start_values, &gains, &dividends)
                .map(|sol| sol.rate)
                .into(),
            None => MetricOutcome::Failed {
                error: MetricsError::InvalidSeries {
                    reason: "total dividends overflowed decimal range".to_string(),
                },
            },
        }
    };

    // --- Mean returns ---
    let returns: Vec<Rate> = input.periods.iter().map(|p| p.period_return).collect();
    let arithmetic: MetricOutcome = arithmetic_mean(&returns).into();
    let geometric: MetricOutcome = geometric_mean(&returns).into();

    let period_performance = build_period_performance(&input.periods, &period_states);

    let excluded: Vec<usize> = period_performance
        .iter()
        .filter(|p| p.excluded)
        .map(|p| p.period)
        .collect();
    if !excluded.is_empty() {
        warnings.push(format!(
            "Periods {excluded:?} have no expressible per-period figures and display as 0%"
        ));
    }

    let result = ReturnMetrics {
        irr,
        twr,
        arithmetic_mean: arithmetic,
        geometric_mean: geometric,
        period_states,
        cash_flows,
        period_performance,
    };

    for (name, outcome) in [
        ("IRR", &result.irr),
        ("TWR", &result.twr),
        ("arithmetic mean", &result.arithmetic_mean),
        ("geometric mean", &result.geometric_mean),
    ] {
        if let MetricOutcome::Failed { error } = outcome {
            warnings.push(format!("{name} could not be determined: {error}"));
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Money-weighted (Newton-Raphson IRR) and time-weighted return",
        input,
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Per-period display figures. Periods that cannot express their ratios
/// report 0% and are flagged, mirroring the neutral-multiplier policy used
/// in compounding.
fn build_period_performance(
    periods: &[PeriodInput],
    states: &[PeriodState],
) -> Vec<PeriodPerformance> {
    periods
        .iter()
        .zip(states)
        .map(|(p, s)| match period_figures(p, s) {
            Some((dividend_yield, total_return)) => PeriodPerformance {
                period: s.period,
                dividend_yield,
                total_return,
                excluded: false,
            },
            None => PeriodPerformance {
                period: s.period,
                dividend_yield: Decimal::ZERO,
                total_return: Decimal::ZERO,
                excluded: true,
            },
        })
        .collect()
}

/// None when the opening balance is non-positive or a ratio leaves decimal
/// range.
fn period_figures(p: &PeriodInput, s: &PeriodState) -> Option<(Rate, Rate)> {
    if s.start_value <= dec!(0) {
        return None;
    }
    let dividends = p.dividend_reinvested.checked_add(p.dividend_paid_out)?;
    let dividend_yield = dividends.checked_div(s.start_value)?;
    let total_return = s.gain.checked_add(dividends)?.checked_div(s.start_value)?;
    Some((dividend_yield, total_return))
}
