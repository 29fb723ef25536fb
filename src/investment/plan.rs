//! Investment plan definitions and their fixed terms

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::engine::QuoteError;

/// The three investment products offered by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvestmentPlan {
    /// Entry-level savings account
    BasicSavings,
    /// Savings account with a higher opening commitment and better returns
    SavingsPlus,
    /// Managed stock portfolio with uncapped contributions
    ManagedStock,
}

/// Fixed terms attached to one investment plan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanTerms {
    /// Display name used by clients
    pub label: &'static str,

    /// Minimum opening amount
    pub min_initial: f64,

    /// Minimum monthly contribution
    pub min_monthly: f64,

    /// Cap on the opening amount plus twelve contributions, if any
    pub max_yearly_contribution: Option<f64>,

    /// Lower bound of the advertised annual return (percent)
    pub min_return_pct: f64,

    /// Upper bound of the advertised annual return (percent)
    pub max_return_pct: f64,

    /// Platform fee (percent, quoted monthly)
    pub monthly_fee_pct: f64,
}

impl PlanTerms {
    /// Midpoint of the advertised return range, used for all projections
    pub fn average_return_pct(&self) -> f64 {
        (self.min_return_pct + self.max_return_pct) / 2.0
    }
}

const BASIC_SAVINGS_TERMS: PlanTerms = PlanTerms {
    label: "Basic Savings Plan",
    min_initial: 0.0,
    min_monthly: 50.0,
    max_yearly_contribution: Some(20_000.0),
    min_return_pct: 1.2,
    max_return_pct: 2.4,
    monthly_fee_pct: 0.25,
};

const SAVINGS_PLUS_TERMS: PlanTerms = PlanTerms {
    label: "Savings Plan Plus",
    min_initial: 300.0,
    min_monthly: 50.0,
    max_yearly_contribution: Some(30_000.0),
    min_return_pct: 3.0,
    max_return_pct: 5.5,
    monthly_fee_pct: 0.3,
};

const MANAGED_STOCK_TERMS: PlanTerms = PlanTerms {
    label: "Managed Stock Investments",
    min_initial: 1_000.0,
    min_monthly: 150.0,
    max_yearly_contribution: None,
    min_return_pct: 4.0,
    max_return_pct: 23.0,
    monthly_fee_pct: 1.3,
};

impl InvestmentPlan {
    /// All plans, in display order
    pub const ALL: [InvestmentPlan; 3] = [
        InvestmentPlan::BasicSavings,
        InvestmentPlan::SavingsPlus,
        InvestmentPlan::ManagedStock,
    ];

    /// The plan's fixed terms
    pub fn terms(&self) -> &'static PlanTerms {
        match self {
            InvestmentPlan::BasicSavings => &BASIC_SAVINGS_TERMS,
            InvestmentPlan::SavingsPlus => &SAVINGS_PLUS_TERMS,
            InvestmentPlan::ManagedStock => &MANAGED_STOCK_TERMS,
        }
    }

    /// The wire identifier for this plan
    pub fn as_str(&self) -> &'static str {
        match self {
            InvestmentPlan::BasicSavings => "BASIC_SAVINGS",
            InvestmentPlan::SavingsPlus => "SAVINGS_PLUS",
            InvestmentPlan::ManagedStock => "MANAGED_STOCK",
        }
    }
}

impl FromStr for InvestmentPlan {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BASIC_SAVINGS" => Ok(InvestmentPlan::BasicSavings),
            "SAVINGS_PLUS" => Ok(InvestmentPlan::SavingsPlus),
            "MANAGED_STOCK" => Ok(InvestmentPlan::ManagedStock),
            _ => Err(QuoteError::InvalidPlan),
        }
    }
}
