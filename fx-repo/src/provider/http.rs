use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use fx_types::{CurrencyCode, FetchError, FetchedRates, RateProvider};

const PROVIDER_ID: &str = "HTTP";

/// Default HTTP request timeout. The cache applies its own, usually tighter, fetch timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `GET /latest/{BASE}` response body.
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    #[serde(alias = "base_code")]
    base: String,
    rates: HashMap<String, serde_json::Number>,
}

/// Rate provider speaking the common `latest/{BASE}` JSON shape.
pub struct HttpRateProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpRateProvider {
    /// Creates a provider rooted at `base_url` (without trailing `/latest`).
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn latest_url(&self, base: &CurrencyCode) -> String {
        format!("{}/latest/{}", self.base_url, base)
    }
}

/// Converts a JSON number to `Decimal` through its shortest textual form,
/// so `0.92` stays exactly `0.92`.
fn number_to_decimal(code: &str, n: &serde_json::Number) -> Result<Decimal, FetchError> {
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| FetchError::InvalidPayload(format!("rate for {} ({}): {}", code, text, e)))
}

fn transport_err(base: &CurrencyCode, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            base: base.to_string(),
            after_ms: REQUEST_TIMEOUT.as_millis() as u64,
        }
    } else {
        FetchError::Transport(e.to_string())
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_rates(&self, base: &CurrencyCode) -> Result<FetchedRates, FetchError> {
        let mut request = self.client.get(self.latest_url(base));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| transport_err(base, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                base: base.to_string(),
            });
        }

        let body: LatestRatesResponse = response
            .json()
            .await
            .map_err(|e| FetchError::InvalidPayload(e.to_string()))?;

        let mut rates = HashMap::with_capacity(body.rates.len());
        for (code, number) in &body.rates {
            rates.insert(code.clone(), number_to_decimal(code, number)?);
        }

        tracing::debug!(base = %base, count = rates.len(), "Fetched provider rates");

        Ok(FetchedRates {
            base: body.base,
            rates,
        })
    }
}
