//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use fx_types::{
    AddCurrencyRequest, AppError, ConversionError, ConvertRequest, ErrorResponse, FormatRequest,
    RateRepository, UpsertOverrideRequest, ValidateAmountRequest,
};

use crate::ConversionService;

/// Application state shared across handlers.
pub struct AppState<R: RateRepository> {
    pub service: ConversionService<R>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<ConversionError> for ApiError {
    fn from(err: ConversionError) -> Self {
        ApiError(AppError::Conversion(err))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Conversion(e) => match e {
                ConversionError::Validation(_) | ConversionError::Overflow { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ConversionError::UnknownCurrency(_) => StatusCode::BAD_REQUEST,
                ConversionError::RateUnavailable { .. } => StatusCode::NOT_FOUND,
                ConversionError::Fetch(_) => StatusCode::SERVICE_UNAVAILABLE,
                ConversionError::Cancelled => StatusCode::GATEWAY_TIMEOUT,
                ConversionError::InvalidOverride { .. } | ConversionError::Repo(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.0.kind(), error = %self.0, "Request failed");
        }

        let body = ErrorResponse {
            error_kind: self.0.kind().to_string(),
            message: self.0.to_string(),
            code: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversion and amounts
// ─────────────────────────────────────────────────────────────────────────────

/// Convert an amount between two currencies.
#[tracing::instrument(skip(state), fields(from = %req.from, to = %req.to, amount = %req.amount))]
pub async fn convert<R: RateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<ConvertRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.service.convert_request(req).await?;
    Ok(Json(response))
}

/// Sanitize a user-typed amount.
pub async fn validate_amount<R: RateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<ValidateAmountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.service.validate_amount(req)?;
    Ok(Json(response))
}

/// Render an amount for display.
pub async fn format_amount<R: RateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<FormatRequest>,
) -> impl IntoResponse {
    Json(state.service.format_amount(req))
}

// ─────────────────────────────────────────────────────────────────────────────
// Currencies
// ─────────────────────────────────────────────────────────────────────────────

/// List registered currency codes.
#[tracing::instrument(skip(state))]
pub async fn list_currencies<R: RateRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let codes = state.service.list_currencies().await?;
    Ok(Json(codes))
}

/// Register a currency code.
#[tracing::instrument(skip(state), fields(code = %req.code))]
pub async fn add_currency<R: RateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<AddCurrencyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let code = state.service.add_currency(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "code": code })),
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Overrides
// ─────────────────────────────────────────────────────────────────────────────

/// List override rates.
#[tracing::instrument(skip(state))]
pub async fn list_overrides<R: RateRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let overrides = state.service.list_overrides().await?;
    Ok(Json(overrides))
}

/// Create or replace an override rate.
#[tracing::instrument(skip(state), fields(from = %req.from_currency, to = %req.to_currency))]
pub async fn upsert_override<R: RateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<UpsertOverrideRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.service.upsert_override(req).await?;
    Ok(Json(record))
}

/// Delete an override rate.
#[tracing::instrument(skip(state))]
pub async fn delete_override<R: RateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path((from, to)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    state.service.delete_override(&from, &to).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider rates
// ─────────────────────────────────────────────────────────────────────────────

/// Cache status for every base seen so far.
pub async fn rates_status<R: RateRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> impl IntoResponse {
    Json(state.service.cache_status())
}

/// Cached provider table for a base currency.
#[tracing::instrument(skip(state))]
pub async fn get_rates<R: RateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(base): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let table = state.service.rate_table(&base).await?;
    Ok(Json(table))
}

/// Drop the cached provider table for a base currency.
#[tracing::instrument(skip(state))]
pub async fn invalidate_rates<R: RateRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(base): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.service.invalidate_rates(&base).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_types::{FetchError, ValidationError};

    fn status_of(err: ConversionError) -> StatusCode {
        ApiError::from(err).status()
    }

    #[test]
    fn test_error_status_per_kind() {
        assert_eq!(
            status_of(ConversionError::Validation(ValidationError::Empty)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(ConversionError::UnknownCurrency("XYZ".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ConversionError::Fetch(FetchError::Transport("x".into()))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ConversionError::Cancelled),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError(AppError::Internal("db".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
