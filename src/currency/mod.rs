//! Currency conversion with a tiered transfer fee

mod convert;
mod rates;

pub use convert::{
    convert, fee_percentage, ConversionOutcome, ConversionRecord, ConvertError, MAX_TRANSFER,
    MIN_TRANSFER,
};
pub use rates::{Currency, ExchangeRates};
