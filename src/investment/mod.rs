//! Investment projection quoting

mod engine;
mod plan;
mod quote;

pub use engine::{compute_quote, project_value, PlanViolation, QuoteError};
pub use plan::{InvestmentPlan, PlanTerms};
pub use quote::{ProjectionQuote, QuoteRecord};
