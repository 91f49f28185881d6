//! # FX Money
//!
//! Pure monetary arithmetic shared by every other crate in the workspace:
//!
//! - [`rounding`] - deterministic 2-decimal rounding under [`RoundingMode`]
//! - [`amount`] - validation of typed amounts and of free-form input strings
//! - [`format`] - locale-aware and compact display strings
//!
//! All arithmetic is done on [`rust_decimal::Decimal`]; binary floats never
//! touch an amount.
//!
//! # Example
//! ```
//! use fx_money::{RoundingMode, format_compact, round, validate_amount_string};
//! use rust_decimal::Decimal;
//! use std::str::FromStr;
//!
//! let value = Decimal::from_str("2.005").unwrap();
//! assert_eq!(round(value, RoundingMode::Nearest).to_string(), "2.01");
//!
//! let normalized = validate_amount_string("00012.345", false).unwrap();
//! assert_eq!(normalized.as_str(), "12.34");
//!
//! let compact = format_compact(Decimal::from(1_500_000), "VND", RoundingMode::Nearest);
//! assert_eq!(compact, "1.5M VND");
//! ```

pub mod amount;
pub mod format;
pub mod rounding;

pub use amount::{
    MAX_DECIMAL_DIGITS, MAX_DIGITS, MAX_SAFE_MAGNITUDE, MonetaryAmount, NormalizedAmount,
    ValidationError, is_amount_in_range, validate_amount_string,
};
pub use format::{MAX_FRACTION_DIGITS, FormatOptions, Locale, format_compact, format_locale};
pub use rounding::{RoundingMode, round, round_to};
