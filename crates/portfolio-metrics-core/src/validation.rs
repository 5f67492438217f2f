use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::InputRangeError;
use crate::types::{Money, PeriodInput, Rate};

/// Declared domains for each input field, supplied by the caller rather than
/// hardcoded so different entry surfaces can tighten or relax them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputBounds {
    /// Largest accepted contribution per period
    pub max_investment: Money,
    /// Smallest accepted price return (a total loss is -1)
    pub min_period_return: Rate,
    /// Largest accepted price return
    pub max_period_return: Rate,
    /// Optional cap applied to each dividend field
    pub max_dividend: Option<Money>,
    /// Optional cap on the absolute size of a withdrawal or extra contribution
    pub max_withdrawal_magnitude: Option<Money>,
}

impl Default for InputBounds {
    fn default() -> Self {
        Self {
            max_investment: dec!(10000),
            min_period_return: dec!(-1),
            max_period_return: dec!(5),
            max_dividend: None,
            max_withdrawal_magnitude: None,
        }
    }
}

/// Checks every period against the declared bounds and returns all
/// violations at once, so a form can annotate each offending field in a
/// single pass. An empty vector means the input is in range.
///
/// Emptiness of `periods` is not a range violation; the caller treats it as
/// insufficient data.
pub fn validate_periods(periods: &[PeriodInput], bounds: &InputBounds) -> Vec<InputRangeError> {
    let mut violations = Vec::new();

    for (i, p) in periods.iter().enumerate() {
        if p.new_investment < dec!(0) {
            violations.push(InputRangeError {
                period: i,
                field: "new_investment".into(),
                value: p.new_investment,
                message: "must be at least 0".into(),
            });
        } else if p.new_investment > bounds.max_investment {
            violations.push(InputRangeError {
                period: i,
                field: "new_investment".into(),
                value: p.new_investment,
                message: format!("must be at most {}", bounds.max_investment),
            });
        }

        if p.period_return < bounds.min_period_return {
            violations.push(InputRangeError {
                period: i,
                field: "period_return".into(),
                value: p.period_return,
                message: format!("must be at least {}", bounds.min_period_return),
            });
        } else if p.period_return > bounds.max_period_return {
            violations.push(InputRangeError {
                period: i,
                field: "period_return".into(),
                value: p.period_return,
                message: format!("must be at most {}", bounds.max_period_return),
            });
        }

        for (field, value) in [
            ("dividend_reinvested", p.dividend_reinvested),
            ("dividend_paid_out", p.dividend_paid_out),
        ] {
            if value < dec!(0) {
                violations.push(InputRangeError {
                    period: i,
                    field: field.into(),
                    value,
                    message: "must be at least 0".into(),
                });
            } else if let Some(max) = bounds.max_dividend {
                if value > max {
                    violations.push(InputRangeError {
                        period: i,
                        field: field.into(),
                        value,
                        message: format!("must be at most {}", max),
                    });
                }
            }
        }

        if let Some(max) = bounds.max_withdrawal_magnitude {
            if p.withdrawal.abs() > max {
                violations.push(InputRangeError {
                    period: i,
                    field: "withdrawal".into(),
                    value: p.withdrawal,
                    message: format!("magnitude must be at most {}", max),
                });
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn period(investment: Money, ret: Rate) -> PeriodInput {
        PeriodInput {
            new_investment: investment,
            period_return: ret,
            dividend_reinvested: dec!(0),
            dividend_paid_out: dec!(0),
            withdrawal: dec!(0),
        }
    }

    #[test]
    fn test_in_range_input_passes() {
        let periods = vec![period(dec!(100), dec!(-0.5)), period(dec!(950), dec!(0.35))];
        assert_eq!(validate_periods(&periods, &InputBounds::default()), vec![]);
    }

    #[test]
    fn test_all_violations_are_collected() {
        let mut bad = period(dec!(-5), dec!(7));
        bad.dividend_paid_out = dec!(-1);
        let violations = validate_periods(&[bad], &InputBounds::default());

        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["new_investment", "period_return", "dividend_paid_out"]
        );
    }

    #[test]
    fn test_violation_reports_period_index() {
        let periods = vec![period(dec!(100), dec!(0.1)), period(dec!(20000), dec!(0.1))];
        let violations = validate_periods(&periods, &InputBounds::default());

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].period, 1);
        assert_eq!(violations[0].value, dec!(20000));
        assert_eq!(violations[0].message, "must be at most 10000");
    }

    #[test]
    fn test_total_loss_return_is_in_range() {
        let periods = vec![period(dec!(100), dec!(-1))];
        assert!(validate_periods(&periods, &InputBounds::default()).is_empty());
    }

    #[test]
    fn test_custom_bounds_are_honoured() {
        let bounds = InputBounds {
            max_investment: dec!(500),
            max_withdrawal_magnitude: Some(dec!(200)),
            ..Default::default()
        };
        let mut p = period(dec!(100), dec!(0.1));
        p.withdrawal = dec!(-350);

        let violations = validate_periods(&[p], &bounds);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "withdrawal");
        assert_eq!(violations[0].message, "magnitude must be at most 200");
    }

    #[test]
    fn test_empty_periods_is_not_a_range_violation() {
        assert!(validate_periods(&[], &InputBounds::default()).is_empty());
    }
}
