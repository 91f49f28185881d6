//! Conversion Application Service
//!
//! Runs the conversion pipeline over the rate store port and the rate cache,
//! and fronts the amount and display helpers for the HTTP adapter.

use std::time::Duration;

use rust_decimal::Decimal;
use tokio::time::Instant;

use fx_money::{format_compact, format_locale, validate_amount_string};
use fx_types::domain::normalize_code;
use fx_types::{
    AddCurrencyRequest, AppError, CacheEntryStatus, Conversion, ConversionError, ConvertRequest,
    ConvertResponse, CurrencyCode, FormatRequest, FormatResponse, FormatStyle, KnownCurrencies,
    MonetaryAmount, OverrideRecord, RateRepository, RateSource, RateTableResponse, RoundingMode,
    UpsertOverrideRequest, ValidateAmountRequest, ValidateAmountResponse,
};

use crate::cache::RateCache;

/// Deadline applied to HTTP conversions unless configured otherwise.
pub const DEFAULT_CONVERT_DEADLINE: Duration = Duration::from_secs(10);

/// Application service for currency conversion.
///
/// Generic over `R: RateRepository` - the store adapter is injected at compile time.
/// The provider sits behind the [`RateCache`] and is never called directly.
pub struct ConversionService<R: RateRepository> {
    repo: R,
    cache: RateCache,
    convert_deadline: Duration,
}

impl<R: RateRepository> ConversionService<R> {
    /// Creates a new conversion service with the given store and cache.
    pub fn new(repo: R, cache: RateCache) -> Self {
        Self {
            repo,
            cache,
            convert_deadline: DEFAULT_CONVERT_DEADLINE,
        }
    }

    /// Sets the deadline used by [`Self::convert_request`].
    pub fn with_convert_deadline(mut self, deadline: Duration) -> Self {
        self.convert_deadline = deadline;
        self
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn cache(&self) -> &RateCache {
        &self.cache
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Currency registry
    // ─────────────────────────────────────────────────────────────────────────────

    /// Loads the current registry snapshot.
    pub async fn known_currencies(&self) -> Result<KnownCurrencies, ConversionError> {
        Ok(KnownCurrencies::new(self.repo.list_known_currencies().await?))
    }

    /// Validates a single raw code against the registry.
    pub async fn resolve_currency(&self, raw: &str) -> Result<CurrencyCode, ConversionError> {
        self.known_currencies().await?.resolve(raw)
    }

    pub async fn list_currencies(&self) -> Result<Vec<String>, AppError> {
        Ok(self.repo.list_known_currencies().await?)
    }

    /// Registers a currency code (three ASCII letters).
    pub async fn add_currency(&self, req: AddCurrencyRequest) -> Result<String, AppError> {
        let code = normalize_code(&req.code);
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(AppError::BadRequest(format!(
                "Currency code must be three letters, got {:?}",
                req.code
            )));
        }

        self.repo.add_currency(&code, req.name.trim()).await?;
        tracing::info!(code = %code, "Registered currency");
        Ok(code)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Conversion pipeline
    // ─────────────────────────────────────────────────────────────────────────────

    /// Converts `amount` from one currency to another.
    ///
    /// Same-currency requests return the amount untouched, without a
    /// registry lookup or rounding. Otherwise an override for the ordered
    /// pair wins over the cached provider table, and the product is rounded
    /// to two decimals with `mode`. A result outside the monetary bounds is
    /// `Overflow`.
    #[tracing::instrument(skip(self), fields(amount = %amount))]
    pub async fn convert(
        &self,
        amount: MonetaryAmount,
        from: &str,
        to: &str,
        mode: RoundingMode,
    ) -> Result<Conversion, ConversionError> {
        if normalize_code(from) == normalize_code(to) {
            return Ok(Conversion {
                result: amount.value(),
                rate: Decimal::ONE,
                source: RateSource::Identity,
            });
        }

        let known = self.known_currencies().await?;
        let from = known.resolve(from)?;
        let to = known.resolve(to)?;

        let (rate, source) = match self.repo.find_override(&from, &to).await? {
            Some(ov) => {
                let rate = ov.rate().ok_or_else(|| ConversionError::InvalidOverride {
                    from: from.clone(),
                    to: to.clone(),
                })?;
                (rate, RateSource::Override)
            }
            None => (self.cache.get_rate(&from, &to).await?, RateSource::Provider),
        };

        let product = amount
            .value()
            .checked_mul(rate)
            .ok_or_else(|| ConversionError::Overflow {
                from: from.clone(),
                to: to.clone(),
            })?;
        // The rounded result must itself be a valid monetary amount.
        let result = MonetaryAmount::new(fx_money::round(product, mode), true)
            .map_err(|_| ConversionError::Overflow {
                from: from.clone(),
                to: to.clone(),
            })?
            .value();

        tracing::debug!(from = %from, to = %to, rate = %rate, ?source, result = %result, "Converted");
        Ok(Conversion {
            result,
            rate,
            source,
        })
    }

    /// [`Self::convert`] bounded by `deadline`.
    ///
    /// Expiry yields `Cancelled`; a rate population the call was waiting on
    /// keeps running for other callers.
    pub async fn convert_with_deadline(
        &self,
        amount: MonetaryAmount,
        from: &str,
        to: &str,
        mode: RoundingMode,
        deadline: Instant,
    ) -> Result<Conversion, ConversionError> {
        match tokio::time::timeout_at(deadline, self.convert(amount, from, to, mode)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(from, to, "Conversion deadline elapsed");
                Err(ConversionError::Cancelled)
            }
        }
    }

    /// Validates an API request and converts it under the configured deadline.
    pub async fn convert_request(&self, req: ConvertRequest) -> Result<ConvertResponse, AppError> {
        let amount = MonetaryAmount::new(req.amount, true)?;
        let deadline = Instant::now() + self.convert_deadline;

        let conversion = self
            .convert_with_deadline(amount, &req.from, &req.to, req.mode, deadline)
            .await?;

        Ok(ConvertResponse {
            result: conversion.result,
            rate: conversion.rate,
            source: conversion.source,
            from: normalize_code(&req.from),
            to: normalize_code(&req.to),
            mode: req.mode,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Amount helpers
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn validate_amount(
        &self,
        req: ValidateAmountRequest,
    ) -> Result<ValidateAmountResponse, AppError> {
        let normalized = validate_amount_string(&req.value, req.allow_negative)?;
        Ok(ValidateAmountResponse {
            normalized: normalized.into_string(),
        })
    }

    pub fn format_amount(&self, req: FormatRequest) -> FormatResponse {
        let formatted = match req.style {
            FormatStyle::Locale => format_locale(req.amount, &req.options),
            FormatStyle::Compact => format_compact(
                req.amount,
                req.currency_code.as_deref().unwrap_or_default(),
                req.options.mode,
            ),
        };
        FormatResponse { formatted }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Override administration
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn list_overrides(&self) -> Result<Vec<OverrideRecord>, AppError> {
        Ok(self.repo.list_overrides().await?)
    }

    /// Creates or replaces the override for an ordered pair.
    #[tracing::instrument(skip(self), fields(from = %req.from_currency, to = %req.to_currency))]
    pub async fn upsert_override(
        &self,
        req: UpsertOverrideRequest,
    ) -> Result<OverrideRecord, AppError> {
        if req.from_value <= Decimal::ZERO || req.to_value <= Decimal::ZERO {
            return Err(AppError::BadRequest(
                "Override values must be greater than zero".into(),
            ));
        }

        let known = self.known_currencies().await?;
        let from = known.resolve(&req.from_currency)?;
        let to = known.resolve(&req.to_currency)?;
        if from == to {
            return Err(AppError::BadRequest(
                "Override needs two different currencies".into(),
            ));
        }

        let record = self
            .repo
            .upsert_override(UpsertOverrideRequest {
                from_currency: from.to_string(),
                to_currency: to.to_string(),
                ..req
            })
            .await?;
        tracing::info!("Override saved");
        Ok(record)
    }

    pub async fn delete_override(&self, from: &str, to: &str) -> Result<(), AppError> {
        if self.repo.delete_override(from, to).await? {
            tracing::info!(from, to, "Override deleted");
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Override {} -> {}",
                normalize_code(from),
                normalize_code(to)
            )))
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Provider rate tables
    // ─────────────────────────────────────────────────────────────────────────────

    /// The cached table for `base`, populating it if needed.
    pub async fn rate_table(&self, base: &str) -> Result<RateTableResponse, AppError> {
        let base = self.resolve_currency(base).await?;
        let snapshot = self
            .cache
            .acquire(&base)
            .await
            .map_err(ConversionError::from)?;

        Ok(RateTableResponse {
            base: base.to_string(),
            fetched_at: snapshot.table.fetched_at(),
            stale: snapshot.stale,
            rates: snapshot
                .table
                .rates()
                .iter()
                .map(|(code, rate)| (code.clone(), *rate))
                .collect(),
        })
    }

    /// Drops the cached table for `base`.
    pub async fn invalidate_rates(&self, base: &str) -> Result<(), AppError> {
        let base = self.resolve_currency(base).await?;
        if self.cache.invalidate(&base) {
            tracing::info!(base = %base, "Rate table invalidated");
            Ok(())
        } else {
            Err(AppError::NotFound(format!("No cached rates for {}", base)))
        }
    }

    pub fn cache_status(&self) -> Vec<CacheEntryStatus> {
        self.cache.status()
    }
}
