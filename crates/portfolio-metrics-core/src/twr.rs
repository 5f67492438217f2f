use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MetricsError;
use crate::types::{Money, Rate};
use crate::MetricsResult;

/// A time-weighted return together with the chain it was compounded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwrSolution {
    pub rate: Rate,
    /// Growth multiplier per period, total-return basis (1.1 = +10%)
    pub sub_returns: Vec<Decimal>,
    /// Periods carried as a neutral multiplier because their starting
    /// balance was non-positive
    pub excluded_periods: Vec<usize>,
}

/// Chains per-period total returns into a single time-weighted rate.
///
/// Each period contributes `(start + gain + dividends) / start`. A period
/// opening at zero or below cannot express a ratio; it contributes a neutral
/// multiplier of exactly 1 and is listed in `excluded_periods` so callers can
/// surface the exclusion instead of silently absorbing it. The chained
/// product is reduced by its N-th root, geometric-mean style, to a
/// per-period rate. A sub-return or running product outside decimal range
/// reports `InvalidSeries`.
pub fn compute_time_weighted_return(
    start_values: &[Money],
    gains: &[Money],
    total_dividends: &[Money],
) -> MetricsResult<TwrSolution> {
    if start_values.len() != gains.len() || start_values.len() != total_dividends.len() {
        return Err(MetricsError::InvalidSeries {
            reason: format!(
                "series lengths differ: {} start values, {} gains, {} dividends",
                start_values.len(),
                gains.len(),
                total_dividends.len()
            ),
        });
    }
    if start_values.is_empty() {
        return Err(MetricsError::InvalidSeries {
            reason: "empty series".to_string(),
        });
    }

    let mut sub_returns = Vec::with_capacity(start_values.len());
    let mut excluded_periods = Vec::new();
    let mut product = Decimal::ONE;

    for i in 0..start_values.len() {
        let sub_return = if start_values[i] <= dec!(0) {
            excluded_periods.push(i);
            Decimal::ONE
        } else {
            start_values[i]
                .checked_add(gains[i])
                .and_then(|n| n.checked_add(total_dividends[i]))
                .and_then(|n| n.checked_div(start_values[i]))
                .ok_or_else(|| MetricsError::InvalidSeries {
                    reason: format!("sub-return overflowed decimal range at period {i}"),
                })?
        };

        product = match product.checked_mul(sub_return) {
            Some(p) => p,
            None => {
                return Err(MetricsError::InvalidSeries {
                    reason: "compounding product overflowed decimal range".to_string(),
                })
            }
        };
        sub_returns.push(sub_return);
    }

    if product <= dec!(0) {
        return Err(MetricsError::NonPositiveProduct { product });
    }

    let n = sub_returns.len();
    let rate = if n == 1 {
        product - Decimal::ONE
    } else {
        let exponent = Decimal::ONE / Decimal::from(n as u64);
        product.powd(exponent) - Decimal::ONE
    };

    Ok(TwrSolution {
        rate,
        sub_returns,
        excluded_periods,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_period_is_exact() {
        let twr =
            compute_time_weighted_return(&[dec!(100)], &[dec!(10)], &[dec!(0)]).unwrap();
        assert_eq!(twr.rate, dec!(0.10));
        assert_eq!(twr.sub_returns, vec![dec!(1.1)]);
        assert!(twr.excluded_periods.is_empty());
    }

    #[test]
    fn test_three_period_chain() {
        // Multipliers 0.55, 1.36, 1.27 compound to 0.94996; the cube root
        // puts the per-period rate near -1.70%.
        let twr = compute_time_weighted_return(
            &[dec!(100), dec!(1000), dec!(1010)],
            &[dec!(-50), dec!(350), dec!(272.7)],
            &[dec!(5), dec!(10), dec!(0)],
        )
        .unwrap();

        assert_eq!(
            twr.sub_returns,
            vec![dec!(0.55), dec!(1.36), dec!(1.27)]
        );
        assert!((twr.rate - dec!(-0.016965)).abs() < dec!(0.0005));
    }

    #[test]
    fn test_zero_start_contributes_neutral_multiplier() {
        let twr = compute_time_weighted_return(
            &[dec!(100), dec!(0), dec!(50)],
            &[dec!(10), dec!(99), dec!(5)],
            &[dec!(0), dec!(0), dec!(0)],
        )
        .unwrap();

        assert_eq!(twr.sub_returns[1], dec!(1));
        assert_eq!(twr.excluded_periods, vec![1]);
    }

    #[test]
    fn test_sole_zero_start_yields_zero_rate() {
        let twr = compute_time_weighted_return(&[dec!(0)], &[dec!(5)], &[dec!(0)]).unwrap();
        assert_eq!(twr.rate, dec!(0));
        assert_eq!(twr.excluded_periods, vec![0]);
    }

    #[test]
    fn test_length_mismatch_is_invalid() {
        let err = compute_time_weighted_return(&[dec!(100)], &[dec!(10), dec!(20)], &[dec!(0)])
            .unwrap_err();
        assert!(matches!(err, MetricsError::InvalidSeries { .. }));
    }

    #[test]
    fn test_empty_series_is_invalid() {
        let err = compute_time_weighted_return(&[], &[], &[]).unwrap_err();
        assert!(matches!(err, MetricsError::InvalidSeries { .. }));
    }

    #[test]
    fn test_total_loss_period_has_no_root() {
        let err = compute_time_weighted_return(&[dec!(100)], &[dec!(-100)], &[dec!(0)])
            .unwrap_err();
        assert_eq!(err, MetricsError::NonPositiveProduct { product: dec!(0) });
    }

    #[test]
    fn test_unrepresentable_sub_return_is_invalid_series() {
        // 10000 paid out against a 1e-28 opening balance: the ratio tops
        // the largest representable decimal.
        let err = compute_time_weighted_return(
            &[dec!(0.0000000000000000000000000001)],
            &[dec!(0)],
            &[dec!(10000)],
        )
        .unwrap_err();
        assert!(matches!(err, MetricsError::InvalidSeries { .. }));
    }

    #[test]
    fn test_product_overflow_is_invalid_series() {
        // Forty periods at +500% push the chained product past 6^38, beyond
        // decimal range.
        let starts = vec![dec!(100); 40];
        let gains = vec![dec!(500); 40];
        let dividends = vec![dec!(0); 40];
        let err = compute_time_weighted_return(&starts, &gains, &dividends).unwrap_err();
        assert!(matches!(err, MetricsError::InvalidSeries { .. }));
    }
}
