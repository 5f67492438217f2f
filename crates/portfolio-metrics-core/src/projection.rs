use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::MetricsError;
use crate::types::{PeriodInput, PeriodState};
use crate::MetricsResult;

/// One step of the recurrence. None when a balance leaves decimal range.
fn project_period(prior_end: Decimal, p: &PeriodInput) -> Option<(Decimal, Decimal, Decimal)> {
    let start = prior_end.checked_add(p.new_investment)?;
    let gain = start.checked_mul(p.period_return)?;
    let end = start
        .checked_add(gain)?
        .checked_add(p.dividend_reinvested)?
        .checked_add(p.withdrawal)?;
    Some((start, gain, end))
}

/// Runs the forward balance recurrence over the ordered period inputs.
///
/// `start[0] = new_investment[0]`, and each later period opens with the prior
/// close plus its own contribution. The gain applies the price return to the
/// opening balance only; reinvested dividends and the signed withdrawal then
/// settle into the closing balance. Paid-out dividends never touch balances.
///
/// A balance escaping decimal range reports `InvalidSeries`. Range checking
/// of the inputs themselves happens in the validation pre-pass, not here.
pub fn project_balances(periods: &[PeriodInput]) -> MetricsResult<Vec<PeriodState>> {
    let mut states = Vec::with_capacity(periods.len());
    let mut prior_end = dec!(0);

    for (i, p) in periods.iter().enumerate() {
        let (start_value, gain, end_value) =
            project_period(prior_end, p).ok_or_else(|| MetricsError::InvalidSeries {
                reason: format!("balance projection overflowed decimal range at period {i}"),
            })?;

        states.push(PeriodState {
            period: i,
            start_value,
            gain,
            end_value,
        });
        prior_end = end_value;
    }

    Ok(states)
}
