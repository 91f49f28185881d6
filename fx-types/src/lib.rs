//! # FX Types
//!
//! Domain types and port traits for the FX conversion service.
//! This crate has ZERO IO dependencies - only data structures,
//! validation rules, and trait definitions.
//!
//! ## Architecture
//!
//! - `domain/` - Currency codes, override rows, provider rate tables
//! - `ports/` - Traits the adapters implement (rate store, rate provider)
//! - `dto/` - Request and response shapes of the HTTP API
//! - `error/` - Conversion, fetch, repository and application errors

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CacheState, Conversion, CurrencyCode, FetchedRates, KnownCurrencies, OverrideRecord,
    ProviderRateTable, RateOverride, RateSource,
};
pub use dto::*;
pub use error::{AppError, CacheError, ConversionError, FetchError, RepoError};
pub use fx_money::{MonetaryAmount, RoundingMode, ValidationError};
pub use ports::{RateProvider, RateRepository};
