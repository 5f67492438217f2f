use rust_decimal_macros::dec;

use crate::error::MetricsError;
use crate::types::{CashFlowSeries, Money, PeriodInput};
use crate::MetricsResult;

/// Builds the investor-perspective cash-flow vector consumed by the IRR
/// solver.
///
/// Contributions leave the investor's pocket and are negative; paid-out
/// dividends and the signed withdrawal are credited as entered. The final
/// entry is the terminal liquidation of the closing balance, always a pure
/// inflow. A flow outside decimal range reports `InvalidSeries`.
pub fn build_cash_flows(
    periods: &[PeriodInput],
    terminal_value: Money,
) -> MetricsResult<CashFlowSeries> {
    let mut flows = Vec::with_capacity(periods.len() + 1);
    for (i, p) in periods.iter().enumerate() {
        let flow = p
            .dividend_paid_out
            .checked_sub(p.new_investment)
            .and_then(|f| f.checked_add(p.withdrawal))
            .ok_or_else(|| MetricsError::InvalidSeries {
                reason: format!("cash flow overflowed decimal range at period {i}"),
            })?;
        flows.push(flow);
    }
    flows.push(terminal_value);

    if flows.len() < 2 {
        return Err(MetricsError::DegenerateCashFlows {
            reason: "fewer than 2 cash flows".to_string(),
        });
    }
    if flows.iter().all(|f| *f == dec!(0)) {
        return Err(MetricsError::DegenerateCashFlows {
            reason: "every cash flow is zero".to_string(),
        });
    }

    Ok(CashFlowSeries { flows })
}
