//! Transfer pricing: bounds, tiered fee schedule and wire rounding

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rates::{Currency, ExchangeRates};
use crate::store::OwnedRecord;

/// Smallest transfer accepted
pub const MIN_TRANSFER: f64 = 300.0;

/// Largest transfer accepted
pub const MAX_TRANSFER: f64 = 5_000.0;

/// Conversion failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// Currency code outside the supported set
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    /// Transfer amount outside the accepted bounds
    #[error("Amount must be between 300 and 5000")]
    AmountOutOfRange,
}

/// Transfer fee percentage for an amount, tiered by size
pub fn fee_percentage(amount: f64) -> f64 {
    if amount <= 500.0 {
        3.5
    } else if amount <= 1_500.0 {
        2.7
    } else if amount <= 2_500.0 {
        2.0
    } else {
        1.5
    }
}

/// A priced conversion as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOutcome {
    pub user_id: u64,
    pub from_currency: Currency,
    pub to_currency: Currency,
    pub amount: f64,
    pub exchange_rate: f64,
    pub fee_percentage: f64,
    pub fee_amount: f64,
    pub final_amount: f64,
}

/// A conversion as persisted and listed in history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRecord {
    pub id: u64,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: ConversionOutcome,
}

impl OwnedRecord for ConversionRecord {
    fn user_id(&self) -> u64 {
        self.outcome.user_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Price a transfer: validate bounds, apply the rate, charge the tiered fee.
///
/// The fee is charged on the converted amount, and the wire values are
/// rounded the way clients expect: rate to 4 decimal places, fee percentage
/// to 1, amounts to 2.
pub fn convert(
    rates: &ExchangeRates,
    from: Currency,
    to: Currency,
    amount: f64,
    user_id: u64,
) -> Result<ConversionOutcome, ConvertError> {
    if !(MIN_TRANSFER..=MAX_TRANSFER).contains(&amount) {
        return Err(ConvertError::AmountOutOfRange);
    }

    let exchange_rate = rates.rate(from, to);
    let converted = amount * exchange_rate;
    let fee_pct = fee_percentage(amount);
    let fee_amount = converted * fee_pct / 100.0;
    let final_amount = converted - fee_amount;

    Ok(ConversionOutcome {
        user_id,
        from_currency: from,
        to_currency: to,
        amount,
        exchange_rate: round_dp(exchange_rate, 4),
        fee_percentage: round_dp(fee_pct, 1),
        fee_amount: round_dp(fee_amount, 2),
        final_amount: round_dp(final_amount, 2),
    })
}

/// Round to `places` decimal places, halves away from zero
fn round_dp(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
