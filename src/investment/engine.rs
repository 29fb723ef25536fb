//! Quote engine: plan rule validation and horizon projections

use std::fmt;

use thiserror::Error;

use super::plan::InvestmentPlan;
use super::quote::ProjectionQuote;

/// A plan rule broken by the requested amounts
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlanViolation {
    /// Opening amount below the plan minimum
    MinimumInitial { required: f64 },
    /// Monthly contribution below the plan minimum
    MinimumMonthly { required: f64 },
    /// Opening amount plus a year of contributions above the plan cap
    MaximumYearly { limit: f64 },
}

impl fmt::Display for PlanViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanViolation::MinimumInitial { required } => {
                write!(f, "Minimum initial investment: {}", format_gbp(*required))
            }
            PlanViolation::MinimumMonthly { required } => {
                write!(f, "Minimum monthly investment: {}", format_gbp(*required))
            }
            PlanViolation::MaximumYearly { limit } => {
                write!(f, "Maximum yearly investment: {}", format_gbp(*limit))
            }
        }
    }
}

impl std::error::Error for PlanViolation {}

/// Validation failures for a quote request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuoteError {
    /// Unknown plan identifier
    #[error("Invalid investment type")]
    InvalidPlan,

    /// Amount that is not a non-negative finite number
    #[error("Invalid amount")]
    InvalidAmount,

    /// Amounts that break a rule of the chosen plan
    #[error(transparent)]
    Constraint(#[from] PlanViolation),
}

/// Compute a projection quote for one request.
///
/// Pure function of its inputs and the plan terms table. The resulting quote
/// is handed back to the caller; persisting it is the caller's concern.
pub fn compute_quote(
    investment_type: &str,
    initial_amount: f64,
    monthly_contribution: f64,
    user_id: u64,
) -> Result<ProjectionQuote, QuoteError> {
    let plan: InvestmentPlan = investment_type.parse()?;

    // Amounts are checked before any plan rule runs; NaN covers wire values
    // that failed to parse as numbers.
    if !is_valid_amount(initial_amount) || !is_valid_amount(monthly_contribution) {
        return Err(QuoteError::InvalidAmount);
    }

    check_plan_rules(plan, initial_amount, monthly_contribution)?;

    Ok(ProjectionQuote {
        user_id,
        investment_type: plan,
        initial_amount,
        monthly_contribution,
        projected_value_1_year: project_value(plan, initial_amount, monthly_contribution, 1),
        projected_value_5_years: project_value(plan, initial_amount, monthly_contribution, 5),
        projected_value_10_years: project_value(plan, initial_amount, monthly_contribution, 10),
    })
}

/// Project the total value after `years` whole years.
///
/// Each projected year applies growth at the plan's average return, then adds
/// the year's twelve contributions, then applies the fee drag. The fee is
/// quoted monthly but charged as one annual adjustment after contributions,
/// so it hits principal, growth and the year's new money alike. Rounding
/// happens once, on the final total.
pub fn project_value(plan: InvestmentPlan, initial: f64, monthly: f64, years: u32) -> f64 {
    let terms = plan.terms();
    let growth = 1.0 + terms.average_return_pct() / 100.0;
    let fee_drag = 1.0 - terms.monthly_fee_pct / 100.0;

    let mut total = initial;
    for _ in 0..years {
        total *= growth;
        total += monthly * 12.0;
        total *= fee_drag;
    }

    round2(total)
}

/// Check the amounts against the plan's rules.
///
/// Rules run in the plan's documented order and the first broken rule wins.
fn check_plan_rules(plan: InvestmentPlan, initial: f64, monthly: f64) -> Result<(), PlanViolation> {
    let terms = plan.terms();

    if initial < terms.min_initial {
        return Err(PlanViolation::MinimumInitial {
            required: terms.min_initial,
        });
    }

    if monthly < terms.min_monthly {
        return Err(PlanViolation::MinimumMonthly {
            required: terms.min_monthly,
        });
    }

    if let Some(limit) = terms.max_yearly_contribution {
        if initial + monthly * 12.0 > limit {
            return Err(PlanViolation::MaximumYearly { limit });
        }
    }

    Ok(())
}

/// Amounts must be non-negative and finite
fn is_valid_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Round to 2 decimal places, halves away from zero
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a whole GBP amount with thousands separators, e.g. 20000 -> £20,000
fn format_gbp(amount: f64) -> String {
    let mut digits = format!("{}", amount.round() as i64);
    let mut grouped = String::new();
    while digits.len() > 3 {
        let split = digits.len() - 3;
        grouped = format!(",{}{}", &digits[split..], grouped);
        digits.truncate(split);
    }
    format!("£{digits}{grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_basic_savings_monthly_minimum_boundary() {
        assert!(compute_quote("BASIC_SAVINGS", 0.0, 50.0, 1).is_ok());

        let err = compute_quote("BASIC_SAVINGS", 0.0, 49.0, 1).unwrap_err();
        assert_eq!(err.to_string(), "Minimum monthly investment: £50");
    }

    #[test]
    fn test_savings_plus_initial_minimum_boundary() {
        let err = compute_quote("SAVINGS_PLUS", 299.0, 50.0, 1).unwrap_err();
        assert_eq!(err.to_string(), "Minimum initial investment: £300");

        assert!(compute_quote("SAVINGS_PLUS", 300.0, 50.0, 1).is_ok());
    }

    #[test]
    fn test_managed_stock_has_no_yearly_cap() {
        // A contribution level far past the other plans' caps is still valid.
        let quote = compute_quote("MANAGED_STOCK", 1_000.0, 10_000.0, 1).unwrap();
        assert_eq!(quote.initial_amount, 1_000.0);

        let err = compute_quote("MANAGED_STOCK", 999.0, 150.0, 1).unwrap_err();
        assert_eq!(err.to_string(), "Minimum initial investment: £1,000");

        let err = compute_quote("MANAGED_STOCK", 1_000.0, 149.0, 1).unwrap_err();
        assert_eq!(err.to_string(), "Minimum monthly investment: £150");
    }

    #[test]
    fn test_yearly_cap_is_inclusive() {
        // 14000 + 500 * 12 lands exactly on the 20000 cap
        assert!(compute_quote("BASIC_SAVINGS", 14_000.0, 500.0, 1).is_ok());

        // 14000 + 501 * 12 = 20012 crosses it
        let err = compute_quote("BASIC_SAVINGS", 14_000.0, 501.0, 1).unwrap_err();
        assert_eq!(err.to_string(), "Maximum yearly investment: £20,000");

        let err = compute_quote("SAVINGS_PLUS", 30_000.0, 50.0, 1).unwrap_err();
        assert_eq!(err.to_string(), "Maximum yearly investment: £30,000");
    }

    #[test]
    fn test_unknown_plan_is_rejected() {
        assert_eq!(
            compute_quote("CRYPTO", 1_000.0, 100.0, 1),
            Err(QuoteError::InvalidPlan)
        );
    }

    #[test]
    fn test_bad_amounts_fail_before_plan_rules() {
        // Negative opening amount on a plan it would otherwise violate anyway:
        // the amount check must win.
        assert_eq!(
            compute_quote("SAVINGS_PLUS", -1.0, 50.0, 1),
            Err(QuoteError::InvalidAmount)
        );
        assert_eq!(
            compute_quote("BASIC_SAVINGS", f64::NAN, 50.0, 1),
            Err(QuoteError::InvalidAmount)
        );
        assert_eq!(
            compute_quote("BASIC_SAVINGS", 0.0, f64::INFINITY, 1),
            Err(QuoteError::InvalidAmount)
        );
    }

    #[test]
    fn test_first_broken_rule_wins() {
        // Violates the initial minimum, the monthly minimum and the yearly cap
        // at once; the initial-minimum message surfaces.
        let err = compute_quote("SAVINGS_PLUS", 100.0, 10_000.0, 1).unwrap_err();
        assert_eq!(err.to_string(), "Minimum initial investment: £300");
    }

    #[test]
    fn test_one_year_projection_reference_value() {
        // 1000 * 1.018 = 1018; + 1200 = 2218; * 0.9975 = 2212.455 -> 2212.46
        let quote = compute_quote("BASIC_SAVINGS", 1_000.0, 100.0, 1).unwrap();
        assert_abs_diff_eq!(quote.projected_value_1_year, 2212.46, epsilon = 0.005);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let first = compute_quote("MANAGED_STOCK", 5_000.0, 200.0, 7).unwrap();
        let second = compute_quote("MANAGED_STOCK", 5_000.0, 200.0, 7).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_longer_horizons_grow_for_positive_net_return() {
        let quote = compute_quote("SAVINGS_PLUS", 1_000.0, 100.0, 1).unwrap();
        assert!(quote.projected_value_5_years > quote.projected_value_1_year);
        assert!(quote.projected_value_10_years > quote.projected_value_5_years);
    }

    #[test]
    fn test_projected_values_are_rounded_to_pennies() {
        let quote = compute_quote("MANAGED_STOCK", 1_234.56, 150.0, 1).unwrap();
        for value in [
            quote.projected_value_1_year,
            quote.projected_value_5_years,
            quote.projected_value_10_years,
        ] {
            assert_abs_diff_eq!(value * 100.0, (value * 100.0).round(), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_gbp_formatting() {
        assert_eq!(format_gbp(50.0), "£50");
        assert_eq!(format_gbp(1_000.0), "£1,000");
        assert_eq!(format_gbp(20_000.0), "£20,000");
        assert_eq!(format_gbp(1_234_567.0), "£1,234,567");
    }
}
