//! Data Transfer Objects (DTOs) for requests and responses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use fx_money::{FormatOptions, RoundingMode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CacheState, RateSource};

// ─────────────────────────────────────────────────────────────────────────────
// Conversion DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to convert an amount between two currencies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConvertRequest {
    /// Amount in major units, at most two decimals
    #[schema(value_type = String, example = "10.00")]
    pub amount: Decimal,
    #[schema(example = "USD")]
    pub from: String,
    #[schema(example = "EUR")]
    pub to: String,
    #[serde(default)]
    pub mode: RoundingMode,
}

/// Result of a conversion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConvertResponse {
    #[schema(value_type = String, example = "9.20")]
    pub result: Decimal,
    /// Multiplier that was applied (1 for same-currency requests)
    #[schema(value_type = String, example = "0.92")]
    pub rate: Decimal,
    pub source: RateSource,
    pub from: String,
    pub to: String,
    pub mode: RoundingMode,
}

// ─────────────────────────────────────────────────────────────────────────────
// Amount DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to sanitize a user-typed amount.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidateAmountRequest {
    #[schema(example = "$1,234.567")]
    pub value: String,
    #[serde(default)]
    pub allow_negative: bool,
}

/// Canonical form of a validated amount.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidateAmountResponse {
    #[schema(example = "1234.56")]
    pub normalized: String,
}

/// Rendering style for [`FormatRequest`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FormatStyle {
    #[default]
    Locale,
    Compact,
}

/// Request to render an amount for display.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormatRequest {
    #[schema(value_type = String, example = "1500000")]
    pub amount: Decimal,
    #[serde(default)]
    pub style: FormatStyle,
    /// Locale options (the rounding mode also applies to compact rendering)
    #[serde(default)]
    pub options: FormatOptions,
    /// Code appended by compact rendering
    #[serde(default)]
    #[schema(example = "VND")]
    pub currency_code: Option<String>,
}

/// Rendered amount.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormatResponse {
    #[schema(example = "1.5M VND")]
    pub formatted: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate administration DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create or replace an override rate.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpsertOverrideRequest {
    #[schema(example = "USD")]
    pub from_currency: String,
    #[schema(example = "VND")]
    pub to_currency: String,
    #[schema(value_type = String, example = "1")]
    pub from_value: Decimal,
    #[schema(value_type = String, example = "25000")]
    pub to_value: Decimal,
}

/// Request to register a currency code.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddCurrencyRequest {
    #[schema(example = "THB")]
    pub code: String,
    #[serde(default)]
    #[schema(example = "Thai Baht")]
    pub name: String,
}

/// Snapshot of a cached provider table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RateTableResponse {
    #[schema(example = "USD")]
    pub base: String,
    #[schema(value_type = String, example = "2024-01-01T00:00:00Z")]
    pub fetched_at: DateTime<Utc>,
    pub stale: bool,
    #[schema(value_type = Object)]
    pub rates: BTreeMap<String, Decimal>,
}

/// Cache state of one base currency.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CacheEntryStatus {
    #[schema(example = "USD")]
    pub base: String,
    pub state: CacheState,
    #[schema(value_type = Option<String>)]
    pub fetched_at: Option<DateTime<Utc>>,
    pub rate_count: usize,
}

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[schema(example = "RateUnavailable")]
    pub error_kind: String,
    pub message: String,
    #[schema(example = 404)]
    pub code: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_convert_request_accepts_number_and_default_mode() {
        let req: ConvertRequest =
            serde_json::from_str(r#"{"amount": 10, "from": "USD", "to": "EUR"}"#).unwrap();
        assert_eq!(req.amount, dec!(10));
        assert_eq!(req.mode, RoundingMode::Nearest);

        let req: ConvertRequest =
            serde_json::from_str(r#"{"amount": "2.50", "from": "USD", "to": "VND", "mode": "up"}"#)
                .unwrap();
        assert_eq!(req.amount, dec!(2.50));
        assert_eq!(req.mode, RoundingMode::Up);
    }

    #[test]
    fn test_error_response_is_camel_case() {
        let body = ErrorResponse {
            error_kind: "FetchError".into(),
            message: "down".into(),
            code: 503,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["errorKind"], "FetchError");
    }

    #[test]
    fn test_format_request_defaults() {
        let req: FormatRequest = serde_json::from_str(r#"{"amount": "12.5"}"#).unwrap();
        assert_eq!(req.style, FormatStyle::Locale);
        assert_eq!(req.options, FormatOptions::default());
    }
}
