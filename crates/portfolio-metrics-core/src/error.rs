use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single out-of-range input value, reported by the validation pre-pass.
///
/// Collected into a list rather than raised one at a time so a presentation
/// layer can annotate every offending field in one round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRangeError {
    /// Zero-based period index of the offending value
    pub period: usize,
    /// Field name in snake_case (e.g. "new_investment")
    pub field: String,
    /// The rejected value
    pub value: Decimal,
    /// Human-readable description of the violated bound
    pub message: String,
}

impl std::fmt::Display for InputRangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "period {}: {} = {} ({})",
            self.period, self.field, self.value, self.message
        )
    }
}

/// Every way a metric calculation can fail.
///
/// All variants carry plain data and serialize with a `kind` tag, so the same
/// enum serves both as the `Err` of a `MetricsResult` and as the tagged
/// failure embedded per metric in [`crate::types::MetricOutcome`]. A caller
/// can always distinguish "rate is 0%" from "rate could not be determined".
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricsError {
    /// One or more inputs failed the bounds pre-pass. Fail-closed: no metric
    /// is computed while any value is out of range.
    #[error("Invalid input: {} value(s) outside their declared bounds", violations.len())]
    InputOutOfRange { violations: Vec<InputRangeError> },

    /// Not enough data to attempt the calculation at all.
    #[error("Insufficient data: {reason}")]
    InsufficientData { reason: String },

    /// Cash-flow series too short or identically zero; no rate of return
    /// is meaningful for it.
    #[error("Degenerate cash flows: {reason}")]
    DegenerateCashFlows { reason: String },

    /// Newton step impossible: the NPV derivative vanished (or the discount
    /// base hit zero at rate = -1 exactly).
    #[error("Zero NPV derivative at rate {rate} after {iterations} iteration(s)")]
    ZeroDerivative { iterations: u32, rate: Decimal },

    /// The candidate rate left the plausible domain (|rate| beyond the
    /// configured bound, or the magnitudes overflowed decimal range).
    #[error("IRR diverged to rate {rate} after {iterations} iteration(s)")]
    Diverged { iterations: u32, rate: Decimal },

    /// Iteration cap exhausted without the step size meeting tolerance.
    #[error("IRR did not converge after {iterations} iterations (last step {last_delta})")]
    NonConvergence { iterations: u32, last_delta: Decimal },

    /// Structurally or numerically unusable series: a length mismatch, empty
    /// input, or a magnitude outside decimal range.
    #[error("Invalid series: {reason}")]
    InvalidSeries { reason: String },

    /// A compounding product came out non-positive; a fractional root of it
    /// is undefined (e.g. a period return of exactly -100%).
    #[error("Non-positive compounding product ({product}); geometric root undefined")]
    NonPositiveProduct { product: Decimal },
}

impl MetricsError {
    /// Short machine-friendly tag for the variant, matching the serialized
    /// `kind` field. Handy for presentation layers that key messages by tag.
    pub fn kind(&self) -> &'static str {
        match self {
            MetricsError::InputOutOfRange { .. } => "input_out_of_range",
            MetricsError::InsufficientData { .. } => "insufficient_data",
            MetricsError::DegenerateCashFlows { .. } => "degenerate_cash_flows",
            MetricsError::ZeroDerivative { .. } => "zero_derivative",
            MetricsError::Diverged { .. } => "diverged",
            MetricsError::NonConvergence { .. } => "non_convergence",
            MetricsError::InvalidSeries { .. } => "invalid_series",
            MetricsError::NonPositiveProduct { .. } => "non_positive_product",
        }
    }
}
