//! Domain models for the FX conversion service.

pub mod currency;
pub mod rate;

pub use currency::{CurrencyCode, KnownCurrencies, normalize_code};
pub use rate::{
    CacheState, Conversion, FetchedRates, OverrideRecord, ProviderRateTable, RateOverride,
    RateSource,
};
