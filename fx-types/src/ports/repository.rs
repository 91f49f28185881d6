//! Rate store port trait.
//!
//! Backed by the admin-managed override table and the currency registry.
//! Adapters (Postgres, SQLite, in-memory) implement this trait.

use crate::domain::{CurrencyCode, OverrideRecord, RateOverride, normalize_code};
use crate::dto::UpsertOverrideRequest;
use crate::error::RepoError;

/// The rate store used by the conversion service.
#[async_trait::async_trait]
pub trait RateRepository: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Engine reads
    // ─────────────────────────────────────────────────────────────────────────────

    /// Finds the override for the ordered pair `from -> to`.
    async fn find_override(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Option<RateOverride>, RepoError>;

    /// Lists every registered currency code (upper case).
    async fn list_known_currencies(&self) -> Result<Vec<String>, RepoError>;

    /// Checks registry membership for a raw code.
    async fn is_known_currency(&self, code: &str) -> Result<bool, RepoError> {
        let code = normalize_code(code);
        Ok(self.list_known_currencies().await?.contains(&code))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Administration
    // ─────────────────────────────────────────────────────────────────────────────

    /// Registers a currency code. Registering an existing code is a no-op.
    async fn add_currency(&self, code: &str, name: &str) -> Result<(), RepoError>;

    /// Lists all override rows.
    async fn list_overrides(&self) -> Result<Vec<OverrideRecord>, RepoError>;

    /// Creates or replaces the override for an ordered pair.
    ///
    /// Codes are expected to be validated and upper case already.
    async fn upsert_override(
        &self,
        req: UpsertOverrideRequest,
    ) -> Result<OverrideRecord, RepoError>;

    /// Deletes the override for an ordered pair. Returns false if none existed.
    async fn delete_override(&self, from: &str, to: &str) -> Result<bool, RepoError>;
}
