use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use fx_types::{CurrencyCode, FetchError, FetchedRates, RateProvider};

use crate::seed::usd_reference_rates;

const PROVIDER_ID: &str = "FIXED";

/// Decimal places kept on computed cross rates.
const CROSS_RATE_DP: u32 = 8;

/// Offline provider backed by the USD reference table in [`crate::seed`].
///
/// Cross rates are derived as `usd(base) / usd(target)`.
#[derive(Debug, Clone)]
pub struct FixedRateProvider {
    usd_values: HashMap<&'static str, Decimal>,
}

impl Default for FixedRateProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedRateProvider {
    /// Creates a provider over the reference currencies.
    pub fn new() -> Self {
        Self {
            usd_values: usd_reference_rates().into_iter().collect(),
        }
    }
}

#[async_trait]
impl RateProvider for FixedRateProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_rates(&self, base: &CurrencyCode) -> Result<FetchedRates, FetchError> {
        let base_usd = self
            .usd_values
            .get(base.as_str())
            .copied()
            .ok_or_else(|| FetchError::Status {
                status: 404,
                base: base.to_string(),
            })?;

        let rates = self
            .usd_values
            .iter()
            .filter_map(|(code, target_usd)| {
                base_usd
                    .checked_div(*target_usd)
                    .map(|rate| (code.to_string(), rate.round_dp(CROSS_RATE_DP).normalize()))
            })
            .collect();

        Ok(FetchedRates {
            base: base.to_string(),
            rates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_types::KnownCurrencies;
    use rust_decimal_macros::dec;

    fn code(raw: &str) -> CurrencyCode {
        KnownCurrencies::new(["USD", "EUR", "VND", "XYZ"])
            .resolve(raw)
            .unwrap()
    }

    #[tokio::test]
    async fn test_usd_table_matches_reference() {
        let provider = FixedRateProvider::new();
        let table = provider.fetch_rates(&code("USD")).await.unwrap();

        assert_eq!(table.base, "USD");
        assert_eq!(table.rates["USD"], dec!(1));
        assert_eq!(table.rates["VND"], dec!(25000));
    }

    #[tokio::test]
    async fn test_cross_rates_are_derived() {
        let provider = FixedRateProvider::new();
        let table = provider.fetch_rates(&code("EUR")).await.unwrap();

        assert_eq!(table.rates["EUR"], dec!(1));
        assert_eq!(table.rates["USD"], dec!(1.087));
    }

    #[tokio::test]
    async fn test_unknown_base_is_an_error() {
        let provider = FixedRateProvider::new();
        let err = provider.fetch_rates(&code("XYZ")).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }
}
