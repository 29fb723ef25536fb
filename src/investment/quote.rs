//! Quote output structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::plan::InvestmentPlan;
use crate::store::OwnedRecord;

/// The outcome of one projection computation, tied to its owner.
///
/// Immutable once produced by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionQuote {
    pub user_id: u64,
    pub investment_type: InvestmentPlan,
    pub initial_amount: f64,
    pub monthly_contribution: f64,
    pub projected_value_1_year: f64,
    pub projected_value_5_years: f64,
    pub projected_value_10_years: f64,
}

/// A quote as persisted and returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub quote: ProjectionQuote,
}

impl OwnedRecord for QuoteRecord {
    fn user_id(&self) -> u64 {
        self.quote.user_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
