//! In-memory rate store, used for development and tests.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use fx_types::{
    CurrencyCode, OverrideRecord, RateOverride, RateRepository, RepoError, UpsertOverrideRequest,
    domain::normalize_code,
};

use crate::seed::SEED_CURRENCIES;

/// Rate store backed by concurrent maps. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryRepo {
    currencies: DashMap<String, String>,
    overrides: DashMap<(String, String), OverrideRecord>,
}

impl InMemoryRepo {
    /// Creates an empty store (no currencies registered).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with the reference currencies registered.
    pub fn seeded() -> Self {
        let repo = Self::new();
        for (code, name) in SEED_CURRENCIES {
            repo.currencies.insert(code.to_string(), name.to_string());
        }
        repo
    }
}

#[async_trait]
impl RateRepository for InMemoryRepo {
    async fn find_override(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Option<RateOverride>, RepoError> {
        let key = (from.as_str().to_string(), to.as_str().to_string());
        Ok(self.overrides.get(&key).map(|row| RateOverride {
            from_currency: from.clone(),
            to_currency: to.clone(),
            from_value: row.from_value,
            to_value: row.to_value,
        }))
    }

    async fn list_known_currencies(&self) -> Result<Vec<String>, RepoError> {
        let mut codes: Vec<String> = self.currencies.iter().map(|e| e.key().clone()).collect();
        codes.sort();
        Ok(codes)
    }

    async fn is_known_currency(&self, code: &str) -> Result<bool, RepoError> {
        Ok(self.currencies.contains_key(&normalize_code(code)))
    }

    async fn add_currency(&self, code: &str, name: &str) -> Result<(), RepoError> {
        self.currencies
            .entry(normalize_code(code))
            .or_insert_with(|| name.to_string());
        Ok(())
    }

    async fn list_overrides(&self) -> Result<Vec<OverrideRecord>, RepoError> {
        let mut rows: Vec<OverrideRecord> =
            self.overrides.iter().map(|e| e.value().clone()).collect();
        rows.sort_by(|a, b| {
            (&a.from_currency, &a.to_currency).cmp(&(&b.from_currency, &b.to_currency))
        });
        Ok(rows)
    }

    async fn upsert_override(
        &self,
        req: UpsertOverrideRequest,
    ) -> Result<OverrideRecord, RepoError> {
        let record = OverrideRecord {
            from_currency: normalize_code(&req.from_currency),
            to_currency: normalize_code(&req.to_currency),
            from_value: req.from_value,
            to_value: req.to_value,
            updated_at: Utc::now(),
        };
        self.overrides.insert(
            (record.from_currency.clone(), record.to_currency.clone()),
            record.clone(),
        );
        Ok(record)
    }

    async fn delete_override(&self, from: &str, to: &str) -> Result<bool, RepoError> {
        Ok(self
            .overrides
            .remove(&(normalize_code(from), normalize_code(to)))
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_types::KnownCurrencies;
    use rust_decimal_macros::dec;

    fn upsert(from: &str, to: &str, to_value: rust_decimal::Decimal) -> UpsertOverrideRequest {
        UpsertOverrideRequest {
            from_currency: from.into(),
            to_currency: to.into(),
            from_value: dec!(1),
            to_value,
        }
    }

    #[tokio::test]
    async fn test_seeded_registry() {
        let repo = InMemoryRepo::seeded();
        let codes = repo.list_known_currencies().await.unwrap();
        assert!(codes.contains(&"USD".to_string()));
        assert!(codes.contains(&"VND".to_string()));
        assert!(repo.is_known_currency("vnd").await.unwrap());
        assert!(!repo.is_known_currency("XYZ").await.unwrap());
    }

    #[tokio::test]
    async fn test_override_is_ordered_pair() {
        let repo = InMemoryRepo::seeded();
        repo.upsert_override(upsert("usd", "vnd", dec!(25000)))
            .await
            .unwrap();

        let known = KnownCurrencies::new(repo.list_known_currencies().await.unwrap());
        let usd = known.resolve("USD").unwrap();
        let vnd = known.resolve("VND").unwrap();

        let found = repo.find_override(&usd, &vnd).await.unwrap().unwrap();
        assert_eq!(found.rate(), Some(dec!(25000)));
        assert!(repo.find_override(&vnd, &usd).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_delete_removes() {
        let repo = InMemoryRepo::seeded();
        repo.upsert_override(upsert("USD", "VND", dec!(25000)))
            .await
            .unwrap();
        repo.upsert_override(upsert("USD", "VND", dec!(26000)))
            .await
            .unwrap();

        let rows = repo.list_overrides().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].to_value, dec!(26000));

        assert!(repo.delete_override("usd", "vnd").await.unwrap());
        assert!(!repo.delete_override("USD", "VND").await.unwrap());
    }

    #[tokio::test]
    async fn test_add_currency_is_idempotent() {
        let repo = InMemoryRepo::new();
        repo.add_currency("thb", "Thai Baht").await.unwrap();
        repo.add_currency("THB", "Other").await.unwrap();
        assert_eq!(repo.list_known_currencies().await.unwrap(), vec!["THB"]);
    }
}
