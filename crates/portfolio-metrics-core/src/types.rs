use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MetricsError;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Caller-supplied figures for one period, ordered by index 0..N-1.
///
/// `withdrawal` is signed: a negative value represents an additional
/// external contribution on top of `new_investment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodInput {
    /// Contribution at period start (>= 0)
    pub new_investment: Money,
    /// Price-only return for the period as a decimal, may be negative
    pub period_return: Rate,
    /// Dividends received and reinvested into the balance (>= 0)
    #[serde(default)]
    pub dividend_reinvested: Money,
    /// Dividends received and paid out to the investor (>= 0)
    #[serde(default)]
    pub dividend_paid_out: Money,
    /// Signed external movement settled at period end
    #[serde(default)]
    pub withdrawal: Money,
}

/// Balances derived for one period by the forward recurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodState {
    pub period: usize,
    pub start_value: Money,
    pub gain: Money,
    pub end_value: Money,
}

/// External cash flows from the investor's perspective, one per period plus
/// a terminal liquidation entry, so `flows.len() == periods + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSeries {
    pub flows: Vec<Money>,
}

/// Per-period display figures derived alongside the headline metrics.
///
/// `excluded` marks a period whose ratios cannot be expressed, either from a
/// non-positive starting balance or a value outside decimal range; its yield
/// and return are reported as zero instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodPerformance {
    pub period: usize,
    pub dividend_yield: Rate,
    pub total_return: Rate,
    pub excluded: bool,
}

/// One metric's result: a rate, or the precise reason none could be produced.
///
/// Failure is first-class data rather than a sentinel value, so `0` always
/// means a genuine zero-percent return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetricOutcome {
    Computed { rate: Rate },
    Failed { error: MetricsError },
}

impl MetricOutcome {
    /// The computed rate, if any.
    pub fn rate(&self) -> Option<Rate> {
        match self {
            MetricOutcome::Computed { rate } => Some(*rate),
            MetricOutcome::Failed { .. } => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, MetricOutcome::Computed { .. })
    }
}

impl From<Result<Rate, MetricsError>> for MetricOutcome {
    fn from(result: Result<Rate, MetricsError>) -> Self {
        match result {
            Ok(rate) => MetricOutcome::Computed { rate },
            Err(error) => MetricOutcome::Failed { error },
        }
    }
}

/// The assembled result of one engine run.
///
/// Each headline metric reports independently: an IRR failure never blocks
/// TWR or the means. The derived series are included so a presentation layer
/// can render balances and flows without re-deriving them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnMetrics {
    pub irr: MetricOutcome,
    pub twr: MetricOutcome,
    pub arithmetic_mean: MetricOutcome,
    pub geometric_mean: MetricOutcome,
    pub period_states: Vec<PeriodState>,
    pub cash_flows: CashFlowSeries,
    pub period_performance: Vec<PeriodPerformance>,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
