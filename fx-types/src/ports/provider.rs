//! Exchange rate provider port.
//!
//! Implementations fetch a full rate table for one base currency, usually
//! over HTTP. They are called by the rate cache only, never per conversion.

use crate::domain::{CurrencyCode, FetchedRates};
use crate::error::FetchError;

/// Port trait for external rate providers.
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync + 'static {
    /// Short identifier used in logs.
    fn id(&self) -> &'static str;

    /// Fetches every rate the provider knows for `base`.
    ///
    /// The returned map is units of each target per one unit of `base`.
    async fn fetch_rates(&self, base: &CurrencyCode) -> Result<FetchedRates, FetchError>;
}
