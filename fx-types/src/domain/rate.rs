//! Override rows and provider rate tables.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::currency::{CurrencyCode, normalize_code};
use crate::error::FetchError;

/// An admin-configured rate for one ordered currency pair.
///
/// `1 USD = 25000 VND` is stored as `from_value = 1`, `to_value = 25000`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateOverride {
    pub from_currency: CurrencyCode,
    pub to_currency: CurrencyCode,
    pub from_value: Decimal,
    pub to_value: Decimal,
}

impl RateOverride {
    /// Multiplier from `from_currency` to `to_currency`; `None` if `from_value` is zero.
    pub fn rate(&self) -> Option<Decimal> {
        self.to_value.checked_div(self.from_value)
    }
}

/// A stored override as listed by the admin surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OverrideRecord {
    #[schema(example = "USD")]
    pub from_currency: String,
    #[schema(example = "VND")]
    pub to_currency: String,
    #[schema(value_type = String, example = "1")]
    pub from_value: Decimal,
    #[schema(value_type = String, example = "25000")]
    pub to_value: Decimal,
    #[schema(value_type = String, example = "2024-01-01T00:00:00Z")]
    pub updated_at: DateTime<Utc>,
}

/// Raw payload returned by a rate provider, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedRates {
    pub base: String,
    pub rates: HashMap<String, Decimal>,
}

/// A complete, validated rate table for one base currency.
///
/// Tables are immutable once built; a refresh replaces the whole table.
/// The base is the cache key and is not stored in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRateTable {
    rates: HashMap<String, Decimal>,
    fetched_at: DateTime<Utc>,
}

impl ProviderRateTable {
    /// Validates a provider payload fetched for `requested`.
    ///
    /// The payload is rejected as a whole if its base differs from the
    /// requested one, if it carries no rates, or if any rate is not
    /// strictly positive.
    pub fn from_fetched(
        requested: &CurrencyCode,
        fetched: FetchedRates,
        fetched_at: DateTime<Utc>,
    ) -> Result<Self, FetchError> {
        let base = normalize_code(&fetched.base);
        if base != requested.as_str() {
            return Err(FetchError::InvalidPayload(format!(
                "requested base {} but provider returned {}",
                requested, fetched.base
            )));
        }

        let mut rates = HashMap::with_capacity(fetched.rates.len());
        for (code, rate) in fetched.rates {
            if rate <= Decimal::ZERO {
                return Err(FetchError::InvalidPayload(format!(
                    "non-positive rate {} for {}",
                    rate, code
                )));
            }
            rates.insert(normalize_code(&code), rate);
        }

        let table = Self {
            rates,
            fetched_at,
        };
        if table.is_empty() {
            return Err(FetchError::InvalidPayload(format!(
                "empty rate table for {}",
                requested
            )));
        }
        Ok(table)
    }

    /// Units of `target` per one unit of the base currency.
    pub fn rate_for(&self, target: &CurrencyCode) -> Option<Decimal> {
        self.rates.get(target.as_str()).copied()
    }

    pub fn rates(&self) -> &HashMap<String, Decimal> {
        &self.rates
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Lifecycle state of one cached base currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    Empty,
    Populating,
    Fresh,
    Stale,
}

/// Where the rate of a conversion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    /// Same currency on both sides; nothing was looked up.
    Identity,
    /// Admin-configured override row.
    Override,
    /// Cached provider table.
    Provider,
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub result: Decimal,
    pub rate: Decimal,
    pub source: RateSource,
}
