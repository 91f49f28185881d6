//! Error types for the FX conversion service.

use fx_money::ValidationError;

use crate::domain::CurrencyCode;

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Failures of a single rate-provider fetch.
///
/// `Clone` because one failed population is reported to every caller that
/// was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Rate provider timed out after {after_ms}ms fetching {base}")]
    Timeout { base: String, after_ms: u64 },

    #[error("Rate provider request failed: {0}")]
    Transport(String),

    #[error("Rate provider returned HTTP {status} for {base}")]
    Status { status: u16, base: String },

    #[error("Rate provider returned an invalid table: {0}")]
    InvalidPayload(String),

    #[error("Rate population for {0} ended without a result")]
    Aborted(String),
}

/// Errors from a rate-cache lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("Rate not available for {base} -> {target}")]
    RateUnavailable {
        base: CurrencyCode,
        target: CurrencyCode,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Everything `convert` can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Rate not available for {base} -> {target}")]
    RateUnavailable {
        base: CurrencyCode,
        target: CurrencyCode,
    },

    #[error("Exchange rate temporarily unavailable: {0}")]
    Fetch(#[from] FetchError),

    #[error("Conversion cancelled before a rate was available")]
    Cancelled,

    #[error("Override for {from} -> {to} has a zero source value")]
    InvalidOverride { from: CurrencyCode, to: CurrencyCode },

    #[error("Arithmetic overflow converting {from} -> {to}")]
    Overflow { from: CurrencyCode, to: CurrencyCode },

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl ConversionError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ConversionError::Validation(_) => "ValidationError",
            ConversionError::UnknownCurrency(_) => "UnknownCurrency",
            ConversionError::RateUnavailable { .. } => "RateUnavailable",
            ConversionError::Fetch(_) => "FetchError",
            ConversionError::Cancelled => "CancellationError",
            ConversionError::InvalidOverride { .. } => "InvalidOverride",
            ConversionError::Overflow { .. } => "Overflow",
            ConversionError::Repo(_) => "Internal",
        }
    }
}

impl From<CacheError> for ConversionError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::RateUnavailable { base, target } => {
                ConversionError::RateUnavailable { base, target }
            }
            CacheError::Fetch(e) => ConversionError::Fetch(e),
        }
    }
}

/// Application-level errors (for HTTP responses).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::Conversion(e) => e.kind(),
            AppError::Internal(_) => "Internal",
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Conflict(e) => AppError::BadRequest(e),
            RepoError::Database(e) | RepoError::Corrupt(e) => AppError::Internal(e),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Conversion(ConversionError::Validation(err))
    }
}
