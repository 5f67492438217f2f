use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MetricsError;
use crate::types::{CashFlowSeries, Money, Rate};
use crate::MetricsResult;

const DEFAULT_GUESS: Decimal = dec!(0.1);
const DEFAULT_TOLERANCE: Decimal = dec!(0.000001);
const DEFAULT_MAX_ITERATIONS: u32 = 100;
const DEFAULT_DIVERGENCE_BOUND: Decimal = dec!(10);

/// Tuning knobs for the Newton-Raphson iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Starting rate for the iteration
    pub initial_guess: Rate,
    /// Hard cap on Newton steps
    pub max_iterations: u32,
    /// Convergence threshold on the successive-guess delta; also the floor
    /// below which the NPV derivative counts as zero
    pub tolerance: Decimal,
    /// Absolute rate beyond which the iteration is abandoned as runaway
    pub divergence_bound: Rate,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: DEFAULT_GUESS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            divergence_bound: DEFAULT_DIVERGENCE_BOUND,
        }
    }
}

/// A converged internal rate of return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrSolution {
    pub rate: Rate,
    /// Newton steps taken to reach the accepted rate
    pub iterations: u32,
}

/// NPV and its derivative with respect to the rate, evaluated at `rate`.
///
/// Discount factors accumulate by repeated multiplication instead of a
/// fractional power, keeping integer exponents exact. Returns None when a
/// magnitude leaves decimal range or a factor underflows to zero, which only
/// happens at rates far outside any plausible root.
fn npv_and_derivative(rate: Rate, flows: &[Money]) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE.checked_add(rate)?;
    let mut npv = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, flow) in flows.iter().enumerate() {
        if t > 0 {
            discount = discount.checked_mul(one_plus_r)?;
        }
        if discount.is_zero() {
            return None;
        }
        npv = npv.checked_add(flow.checked_div(discount)?)?;

        if t > 0 {
            let next_discount = discount.checked_mul(one_plus_r)?;
            if next_discount.is_zero() {
                return None;
            }
            let numerator = Decimal::from(t as u64).checked_mul(*flow)?;
            dnpv = dnpv.checked_sub(numerator.checked_div(next_discount)?)?;
        }
    }

    Some((npv, dnpv))
}

/// Finds the rate that zeroes the net present value of the series, by
/// Newton-Raphson from `config.initial_guess`.
///
/// Converges when one step moves the guess by less than `config.tolerance`.
/// Every other outcome is a distinct failure: a vanished derivative (no step
/// possible), a rate escaping `config.divergence_bound`, or an exhausted
/// iteration budget. A rate of exactly -1 zeroes the discount base and is
/// reported as a vanished derivative before any division happens.
pub fn solve_irr(series: &CashFlowSeries, config: &SolverConfig) -> MetricsResult<IrrSolution> {
    let flows = &series.flows;
    if flows.len() < 2 {
        return Err(MetricsError::DegenerateCashFlows {
            reason: "fewer than 2 cash flows".to_string(),
        });
    }
    if flows.iter().all(|f| f.is_zero()) {
        return Err(MetricsError::DegenerateCashFlows {
            reason: "every cash flow is zero".to_string(),
        });
    }

    let mut rate = config.initial_guess;
    let mut last_delta = Decimal::ZERO;

    for i in 0..config.max_iterations {
        if rate == dec!(-1) {
            return Err(MetricsError::ZeroDerivative { iterations: i, rate });
        }

        let (npv, dnpv) = match npv_and_derivative(rate, flows) {
            Some(pair) => pair,
            None => return Err(MetricsError::Diverged { iterations: i, rate }),
        };

        if dnpv.abs() < config.tolerance {
            return Err(MetricsError::ZeroDerivative { iterations: i, rate });
        }

        let step = match npv.checked_div(dnpv) {
            Some(step) => step,
            None => return Err(MetricsError::Diverged { iterations: i, rate }),
        };
        let next = match rate.checked_sub(step) {
            Some(next) => next,
            None => return Err(MetricsError::Diverged { iterations: i, rate }),
        };

        last_delta = (next - rate).abs();
        if last_delta < config.tolerance {
            return Ok(IrrSolution {
                rate: next,
                iterations: i + 1,
            });
        }

        rate = next;
        if rate.abs() > config.divergence_bound {
            return Err(MetricsError::Diverged {
                iterations: i + 1,
                rate,
            });
        }
    }

    Err(MetricsError::NonConvergence {
        iterations: config.max_iterations,
        last_delta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn series(flows: Vec<Money>) -> CashFlowSeries {
        CashFlowSeries { flows }
    }

    #[test]
    fn test_single_period_ten_percent() {
        let sol = solve_irr(&series(vec![dec!(-100), dec!(110)]), &SolverConfig::default())
            .unwrap();
        assert!((sol.rate - dec!(0.10)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_two_period_known_root() {
        // -1000 + 500/x + 600/x^2 = 0 has the positive root x = 1.0639411...
        let sol = solve_irr(
            &series(vec![dec!(-1000), dec!(500), dec!(600)]),
            &SolverConfig::default(),
        )
        .unwrap();
        assert!((sol.rate - dec!(0.0639411)).abs() < dec!(0.0001));
        assert!(sol.iterations <= 10);
    }

    #[test]
    fn test_all_zero_flows_are_degenerate() {
        let err = solve_irr(&series(vec![dec!(0), dec!(0)]), &SolverConfig::default())
            .unwrap_err();
        assert!(matches!(err, MetricsError::DegenerateCashFlows { .. }));
    }

    #[test]
    fn test_too_short_series_is_degenerate() {
        let err = solve_irr(&series(vec![dec!(100)]), &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, MetricsError::DegenerateCashFlows { .. }));
    }

    #[test]
    fn test_flat_npv_reports_zero_derivative() {
        // Only the undiscounted t=0 flow is non-zero, so dnpv is exactly 0.
        let err = solve_irr(&series(vec![dec!(100), dec!(0)]), &SolverConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            MetricsError::ZeroDerivative {
                iterations: 0,
                rate: dec!(0.1),
            }
        );
    }

    #[test]
    fn test_guess_of_minus_one_short_circuits() {
        let config = SolverConfig {
            initial_guess: dec!(-1),
            ..Default::default()
        };
        let err = solve_irr(&series(vec![dec!(-100), dec!(110)]), &config).unwrap_err();
        assert_eq!(
            err,
            MetricsError::ZeroDerivative {
                iterations: 0,
                rate: dec!(-1),
            }
        );
    }

    #[test]
    fn test_runaway_rate_reports_divergence() {
        // The implied return is ~1e6x per period; Newton roughly doubles the
        // rate each step until it crosses the bound.
        let err = solve_irr(
            &series(vec![dec!(-1), dec!(1000000)]),
            &SolverConfig::default(),
        )
        .unwrap_err();
        match err {
            MetricsError::Diverged { rate, .. } => assert!(rate.abs() > dec!(10)),
            other => panic!("expected Diverged, got {other:?}"),
        }
    }

    #[test]
    fn test_exhausted_budget_reports_non_convergence() {
        let config = SolverConfig {
            max_iterations: 1,
            ..Default::default()
        };
        let err = solve_irr(&series(vec![dec!(-1000), dec!(500), dec!(600)]), &config)
            .unwrap_err();
        match err {
            MetricsError::NonConvergence {
                iterations,
                last_delta,
            } => {
                assert_eq!(iterations, 1);
                assert!(last_delta > Decimal::ZERO);
            }
            other => panic!("expected NonConvergence, got {other:?}"),
        }
    }

    #[test]
    fn test_convergence_reported_within_budget() {
        let sol = solve_irr(&series(vec![dec!(-100), dec!(110)]), &SolverConfig::default())
            .unwrap();
        assert_eq!(sol.iterations, 1);
    }

    #[test]
    fn test_npv_overflow_reports_divergence() {
        // Two flows of Decimal::MAX cannot be summed even undiscounted.
        let err = solve_irr(
            &series(vec![Decimal::MAX, Decimal::MAX]),
            &SolverConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MetricsError::Diverged { iterations: 0, .. }));
    }

    #[test]
    fn test_extreme_guess_reports_divergence() {
        // 1 + guess has no representation, so the first evaluation fails.
        let config = SolverConfig {
            initial_guess: Decimal::MAX,
            ..Default::default()
        };
        let err = solve_irr(&series(vec![dec!(-100), dec!(110)]), &config).unwrap_err();
        assert!(matches!(err, MetricsError::Diverged { iterations: 0, .. }));
    }
}
