//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use fx_types::{KnownCurrencies, RateRepository, RepoError, UpsertOverrideRequest};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::SqliteRepo;

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    fn upsert(from: &str, to: &str, from_value: Decimal, to_value: Decimal) -> UpsertOverrideRequest {
        UpsertOverrideRequest {
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            from_value,
            to_value,
        }
    }

    #[tokio::test]
    async fn test_seed_currencies_registered() {
        let repo = setup_repo().await;

        let codes = repo.list_known_currencies().await.unwrap();

        assert!(codes.contains(&"USD".to_string()));
        assert!(codes.contains(&"VND".to_string()));
        assert!(repo.is_known_currency(" eur ").await.unwrap());
        assert!(!repo.is_known_currency("XYZ").await.unwrap());
    }

    #[tokio::test]
    async fn test_schema_creation_is_repeatable() {
        let repo = setup_repo().await;
        let before = repo.list_known_currencies().await.unwrap();

        repo.create_schema().await.unwrap();

        assert_eq!(repo.list_known_currencies().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_override_round_trip_keeps_exact_decimals() {
        let repo = setup_repo().await;
        repo.upsert_override(upsert("USD", "VND", dec!(1), dec!(25000.125)))
            .await
            .unwrap();

        let known = KnownCurrencies::new(repo.list_known_currencies().await.unwrap());
        let usd = known.resolve("USD").unwrap();
        let vnd = known.resolve("VND").unwrap();

        let found = repo.find_override(&usd, &vnd).await.unwrap().unwrap();
        assert_eq!(found.from_value, dec!(1));
        assert_eq!(found.to_value, dec!(25000.125));

        assert!(repo.find_override(&vnd, &usd).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_pair() {
        let repo = setup_repo().await;
        repo.upsert_override(upsert("USD", "VND", dec!(1), dec!(25000)))
            .await
            .unwrap();
        repo.upsert_override(upsert("USD", "VND", dec!(2), dec!(51000)))
            .await
            .unwrap();

        let rows = repo.list_overrides().await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].from_value, dec!(2));
        assert_eq!(rows[0].to_value, dec!(51000));
    }

    #[tokio::test]
    async fn test_upsert_unregistered_currency_conflicts() {
        let repo = setup_repo().await;

        let result = repo
            .upsert_override(upsert("USD", "XYZ", dec!(1), dec!(3)))
            .await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_override() {
        let repo = setup_repo().await;
        repo.upsert_override(upsert("EUR", "USD", dec!(1), dec!(1.09)))
            .await
            .unwrap();

        assert!(repo.delete_override("eur", "usd").await.unwrap());
        assert!(!repo.delete_override("EUR", "USD").await.unwrap());
        assert!(repo.list_overrides().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_currency() {
        let repo = setup_repo().await;

        repo.add_currency("thb", "Thai Baht").await.unwrap();
        repo.add_currency("THB", "Duplicate").await.unwrap();

        let codes = repo.list_known_currencies().await.unwrap();
        assert_eq!(codes.iter().filter(|c| c.as_str() == "THB").count(), 1);
    }
}
