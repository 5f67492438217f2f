use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::MetricsError;
use crate::types::Rate;
use crate::MetricsResult;

/// Simple average of the period returns.
pub fn arithmetic_mean(returns: &[Rate]) -> MetricsResult<Rate> {
    if returns.is_empty() {
        return Err(MetricsError::InsufficientData {
            reason: "mean of an empty return series".to_string(),
        });
    }

    let sum = returns
        .iter()
        .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(*r))
        .ok_or_else(|| MetricsError::InvalidSeries {
            reason: "return total overflowed decimal range".to_string(),
        })?;
    Ok(sum / Decimal::from(returns.len() as u64))
}

/// Compounded average of the period returns: the N-th root of the product of
/// growth multipliers, minus one.
///
/// A return of exactly -100%, or any combination driving the product to zero
/// or below, leaves the root undefined.
pub fn geometric_mean(returns: &[Rate]) -> MetricsResult<Rate> {
    if returns.is_empty() {
        return Err(MetricsError::InsufficientData {
            reason: "mean of an empty return series".to_string(),
        });
    }

    let mut product = Decimal::ONE;
    for r in returns {
        product = Decimal::ONE
            .checked_add(*r)
            .and_then(|multiplier| product.checked_mul(multiplier))
            .ok_or_else(|| MetricsError::InvalidSeries {
                reason: "growth product overflowed decimal range".to_string(),
            })?;
    }

    if product <= dec!(0) {
        return Err(MetricsError::NonPositiveProduct { product });
    }

    let n = returns.len();
    if n == 1 {
        return Ok(product - Decimal::ONE);
    }
    let exponent = Decimal::ONE / Decimal::from(n as u64);
    Ok(product.powd(exponent) - Decimal::ONE)
}
