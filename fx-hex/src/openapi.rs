//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use fx_money::{FormatOptions, RoundingMode};
use fx_types::domain::{CacheState, OverrideRecord, RateSource};
use fx_types::dto::{
    AddCurrencyRequest, CacheEntryStatus, ConvertRequest, ConvertResponse, ErrorResponse,
    FormatRequest, FormatResponse, FormatStyle, RateTableResponse, UpsertOverrideRequest,
    ValidateAmountRequest, ValidateAmountResponse,
};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Convert an amount between two currencies
///
/// Same-currency requests return the amount unchanged. Otherwise an override
/// for the ordered pair is used when present, else the cached provider rate.
#[utoipa::path(
    post,
    path = "/api/convert",
    tag = "conversion",
    request_body = ConvertRequest,
    responses(
        (status = 200, description = "Converted amount", body = ConvertResponse),
        (status = 400, description = "Unknown currency", body = ErrorResponse),
        (status = 404, description = "Provider has no rate for the pair", body = ErrorResponse),
        (status = 422, description = "Invalid amount", body = ErrorResponse),
        (status = 503, description = "Rate provider unavailable", body = ErrorResponse),
        (status = 504, description = "Deadline elapsed while waiting for rates", body = ErrorResponse)
    )
)]
async fn convert() {}

/// Sanitize a user-typed amount
#[utoipa::path(
    post,
    path = "/api/amounts/validate",
    tag = "amounts",
    request_body = ValidateAmountRequest,
    responses(
        (status = 200, description = "Canonical amount", body = ValidateAmountResponse),
        (status = 422, description = "Amount rejected", body = ErrorResponse)
    )
)]
async fn validate_amount() {}

/// Render an amount for display
#[utoipa::path(
    post,
    path = "/api/amounts/format",
    tag = "amounts",
    request_body = FormatRequest,
    responses(
        (status = 200, description = "Formatted amount", body = FormatResponse)
    )
)]
async fn format_amount() {}

/// List registered currency codes
#[utoipa::path(
    get,
    path = "/api/currencies",
    tag = "currencies",
    responses(
        (status = 200, description = "Registered codes", body = Vec<String>)
    )
)]
async fn list_currencies() {}

/// Register a currency code
#[utoipa::path(
    post,
    path = "/api/currencies",
    tag = "currencies",
    request_body = AddCurrencyRequest,
    responses(
        (status = 201, description = "Currency registered", body = inline(serde_json::Value), example = json!({"code": "THB"})),
        (status = 400, description = "Invalid code", body = ErrorResponse)
    )
)]
async fn add_currency() {}

/// List override rates
#[utoipa::path(
    get,
    path = "/api/overrides",
    tag = "overrides",
    responses(
        (status = 200, description = "Override rates", body = Vec<OverrideRecord>)
    )
)]
async fn list_overrides() {}

/// Create or replace an override rate
#[utoipa::path(
    put,
    path = "/api/overrides",
    tag = "overrides",
    request_body = UpsertOverrideRequest,
    responses(
        (status = 200, description = "Override saved", body = OverrideRecord),
        (status = 400, description = "Invalid override", body = ErrorResponse)
    )
)]
async fn upsert_override() {}

/// Delete an override rate
#[utoipa::path(
    delete,
    path = "/api/overrides/{from}/{to}",
    tag = "overrides",
    params(
        ("from" = String, Path, description = "Source currency code"),
        ("to" = String, Path, description = "Target currency code")
    ),
    responses(
        (status = 204, description = "Override deleted"),
        (status = 404, description = "No override for the pair", body = ErrorResponse)
    )
)]
async fn delete_override() {}

/// Cache status per base currency
#[utoipa::path(
    get,
    path = "/api/rates",
    tag = "rates",
    responses(
        (status = 200, description = "Cache entries", body = Vec<CacheEntryStatus>)
    )
)]
async fn rates_status() {}

/// Cached provider table for a base currency (populated on demand)
#[utoipa::path(
    get,
    path = "/api/rates/{base}",
    tag = "rates",
    params(("base" = String, Path, description = "Base currency code")),
    responses(
        (status = 200, description = "Rate table", body = RateTableResponse),
        (status = 400, description = "Unknown currency", body = ErrorResponse),
        (status = 503, description = "Rate provider unavailable", body = ErrorResponse)
    )
)]
async fn get_rates() {}

/// Drop the cached provider table for a base currency
#[utoipa::path(
    delete,
    path = "/api/rates/{base}",
    tag = "rates",
    params(("base" = String, Path, description = "Base currency code")),
    responses(
        (status = 204, description = "Table dropped"),
        (status = 404, description = "Nothing cached for the base", body = ErrorResponse)
    )
)]
async fn invalidate_rates() {}

/// OpenAPI documentation for the FX API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "FX Conversion Service API",
        version = "1.0.0",
        description = "Currency conversion over admin-managed override rates and cached provider rates, plus amount validation and display formatting.\n\nRequests are rate limited per `X-Client-Id` header.",
        license(name = "MIT"),
    ),
    paths(
        health,
        convert,
        validate_amount,
        format_amount,
        list_currencies,
        add_currency,
        list_overrides,
        upsert_override,
        delete_override,
        rates_status,
        get_rates,
        invalidate_rates,
    ),
    components(
        schemas(
            ConvertRequest,
            ConvertResponse,
            RateSource,
            RoundingMode,
            ValidateAmountRequest,
            ValidateAmountResponse,
            FormatRequest,
            FormatResponse,
            FormatStyle,
            FormatOptions,
            AddCurrencyRequest,
            UpsertOverrideRequest,
            OverrideRecord,
            RateTableResponse,
            CacheEntryStatus,
            CacheState,
            ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "conversion", description = "Currency conversion"),
        (name = "amounts", description = "Amount validation and display formatting"),
        (name = "currencies", description = "Currency registry"),
        (name = "overrides", description = "Admin-managed override rates"),
        (name = "rates", description = "Cached provider rate tables"),
    )
)]
pub struct ApiDoc;
