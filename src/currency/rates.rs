//! Supported currencies and the fixed demo rate table

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::convert::ConvertError;

/// Currencies supported for transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Gbp,
    Usd,
    Eur,
    Brl,
    Jpy,
    Try,
}

impl Currency {
    /// All supported currencies, in display order
    pub const ALL: [Currency; 6] = [
        Currency::Gbp,
        Currency::Usd,
        Currency::Eur,
        Currency::Brl,
        Currency::Jpy,
        Currency::Try,
    ];

    /// ISO 4217 code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Gbp => "GBP",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Brl => "BRL",
            Currency::Jpy => "JPY",
            Currency::Try => "TRY",
        }
    }
}

impl FromStr for Currency {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GBP" => Ok(Currency::Gbp),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "BRL" => Ok(Currency::Brl),
            "JPY" => Ok(Currency::Jpy),
            "TRY" => Ok(Currency::Try),
            _ => Err(ConvertError::UnsupportedCurrency(s.to_string())),
        }
    }
}

/// Fixed exchange rate table for the demo deployment
#[derive(Debug, Clone)]
pub struct ExchangeRates {
    rates: HashMap<(Currency, Currency), f64>,
}

impl ExchangeRates {
    /// The pairs quoted by the platform
    pub fn fixed_table() -> Self {
        use Currency::*;

        let rates = HashMap::from([
            ((Gbp, Usd), 1.25),
            ((Gbp, Eur), 1.15),
            ((Gbp, Brl), 6.20),
            ((Gbp, Jpy), 185.50),
            ((Gbp, Try), 40.75),
            ((Usd, Gbp), 0.80),
            ((Usd, Eur), 0.92),
            ((Eur, Gbp), 0.87),
            ((Eur, Usd), 1.09),
            ((Brl, Gbp), 0.16),
            ((Jpy, Gbp), 0.0054),
            ((Try, Gbp), 0.0245),
        ]);

        Self { rates }
    }

    /// Rate from one currency to another.
    ///
    /// Identical and unlisted pairs settle at par.
    pub fn rate(&self, from: Currency, to: Currency) -> f64 {
        if from == to {
            return 1.0;
        }
        self.rates.get(&(from, to)).copied().unwrap_or(1.0)
    }
}

impl Default for ExchangeRates {
    fn default() -> Self {
        Self::fixed_table()
    }
}
