//! # FX Client SDK
//!
//! A typed Rust client for the FX conversion API.

use fx_types::{
    AddCurrencyRequest, CacheEntryStatus, ConvertRequest, ConvertResponse, ErrorResponse,
    FormatRequest, FormatResponse, OverrideRecord, RateTableResponse, RoundingMode,
    UpsertOverrideRequest, ValidateAmountRequest, ValidateAmountResponse,
};
use reqwest::{Client, Method, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

/// Header the server keys its rate limits on.
const CLIENT_ID_HEADER: &str = "X-Client-Id";

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} {kind} - {message}")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// The server's `errorKind`, when the API answered with an error body.
    pub fn kind(&self) -> Option<&str> {
        match self {
            ClientError::Api { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

/// FX API client.
pub struct FxClient {
    base_url: String,
    client_id: Option<String>,
    http: Client,
}

impl FxClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: None,
            http: Client::new(),
        }
    }

    /// Sets the client identity sent with every request.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self.request(Method::GET, "/health").send().await?;
        Ok(resp.status().is_success())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Conversion and amounts
    // ─────────────────────────────────────────────────────────────────────────────

    /// Converts `amount` from one currency to another.
    pub async fn convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
        mode: RoundingMode,
    ) -> Result<ConvertResponse, ClientError> {
        let req = ConvertRequest {
            amount,
            from: from.to_string(),
            to: to.to_string(),
            mode,
        };
        self.send_json(Method::POST, "/api/convert", &req).await
    }

    /// Sanitizes a user-typed amount on the server.
    pub async fn validate_amount(
        &self,
        value: &str,
        allow_negative: bool,
    ) -> Result<ValidateAmountResponse, ClientError> {
        let req = ValidateAmountRequest {
            value: value.to_string(),
            allow_negative,
        };
        self.send_json(Method::POST, "/api/amounts/validate", &req)
            .await
    }

    /// Renders an amount for display.
    pub async fn format_amount(&self, req: &FormatRequest) -> Result<FormatResponse, ClientError> {
        self.send_json(Method::POST, "/api/amounts/format", req)
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Currencies and overrides
    // ─────────────────────────────────────────────────────────────────────────────

    /// Lists registered currency codes.
    pub async fn list_currencies(&self) -> Result<Vec<String>, ClientError> {
        self.get("/api/currencies").await
    }

    /// Registers a currency code.
    pub async fn add_currency(&self, code: &str, name: &str) -> Result<String, ClientError> {
        let req = AddCurrencyRequest {
            code: code.to_string(),
            name: name.to_string(),
        };
        let body: serde_json::Value = self
            .send_json(Method::POST, "/api/currencies", &req)
            .await?;
        Ok(body
            .get("code")
            .and_then(|c| c.as_str())
            .unwrap_or(code)
            .to_string())
    }

    /// Lists override rates.
    pub async fn list_overrides(&self) -> Result<Vec<OverrideRecord>, ClientError> {
        self.get("/api/overrides").await
    }

    /// Creates or replaces the override `from_value FROM = to_value TO`.
    pub async fn upsert_override(
        &self,
        from: &str,
        to: &str,
        from_value: Decimal,
        to_value: Decimal,
    ) -> Result<OverrideRecord, ClientError> {
        let req = UpsertOverrideRequest {
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            from_value,
            to_value,
        };
        self.send_json(Method::PUT, "/api/overrides", &req).await
    }

    /// Deletes the override for an ordered pair.
    pub async fn delete_override(&self, from: &str, to: &str) -> Result<(), ClientError> {
        self.send_empty(Method::DELETE, &format!("/api/overrides/{}/{}", from, to))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Provider rates
    // ─────────────────────────────────────────────────────────────────────────────

    /// Gets the cached provider table for `base`.
    pub async fn rate_table(&self, base: &str) -> Result<RateTableResponse, ClientError> {
        self.get(&format!("/api/rates/{}", base)).await
    }

    /// Drops the cached provider table for `base`.
    pub async fn invalidate_rates(&self, base: &str) -> Result<(), ClientError> {
        self.send_empty(Method::DELETE, &format!("/api/rates/{}", base))
            .await
    }

    /// Lists the cache state per base currency.
    pub async fn cache_status(&self) -> Result<Vec<CacheEntryStatus>, ClientError> {
        self.get("/api/rates").await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Plumbing
    // ─────────────────────────────────────────────────────────────────────────────

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(id) = &self.client_id {
            req = req.header(CLIENT_ID_HEADER, id);
        }
        req
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self.request(Method::GET, path).send().await?;
        self.handle_response(resp).await
    }

    async fn send_json<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self.request(method, path).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn send_empty(&self, method: Method, path: &str) -> Result<(), ClientError> {
        let resp = self.request(method, path).send().await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(resp).await)
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        if resp.status().is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            Err(Self::api_error(resp).await)
        }
    }

    async fn api_error(resp: reqwest::Response) -> ClientError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => ClientError::Api {
                status,
                kind: err.error_kind,
                message: err.message,
            },
            Err(_) => ClientError::Api {
                status,
                kind: "Unknown".to_string(),
                message: body,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = FxClient::new("http://localhost:3000");
        assert_eq!(client.base_url, "http://localhost:3000");
        assert!(client.client_id.is_none());
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = FxClient::new("http://localhost:3000/").with_client_id("cli");
        assert_eq!(client.base_url, "http://localhost:3000");
        assert_eq!(client.client_id.as_deref(), Some("cli"));
    }

    #[test]
    fn test_error_kind() {
        let err = ClientError::Api {
            status: 400,
            kind: "UnknownCurrency".into(),
            message: "Unknown currency: XYZ".into(),
        };
        assert_eq!(err.kind(), Some("UnknownCurrency"));
        assert!(err.to_string().contains("400"));
    }
}
