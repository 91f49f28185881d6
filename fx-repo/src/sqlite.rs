//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use fx_types::{
    CurrencyCode, OverrideRecord, RateOverride, RateRepository, RepoError, UpsertOverrideRequest,
    domain::normalize_code,
};

use crate::seed::SEED_CURRENCIES;
use crate::types::DbOverride;

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

fn db_err(e: sqlx::Error) -> RepoError {
    RepoError::Database(e.to_string())
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &SqlitePool, sql: &str, name: &str) -> anyhow::Result<()> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration and seeding.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if !in_memory {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to `:memory:` opens a separate database, so keep exactly one.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(options).await?;

        let repo = Self { pool };
        repo.create_schema().await?;
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the schema and registers the reference currencies.
    pub async fn create_schema(&self) -> anyhow::Result<()> {
        execute_migration(
            &self.pool,
            include_str!("../migrations/0001_create_rate_tables.sql"),
            "0001",
        )
        .await?;

        for (code, name) in SEED_CURRENCIES {
            self.add_currency(code, name).await?;
        }
        tracing::debug!("SQLite schema ready, {} seed currencies", SEED_CURRENCIES.len());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateRepository for SqliteRepo {
    async fn find_override(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Option<RateOverride>, RepoError> {
        let row: Option<DbOverride> = sqlx::query_as(
            r#"SELECT from_currency, to_currency, from_value, to_value, updated_at
               FROM rate_overrides WHERE from_currency = ? AND to_currency = ?"#,
        )
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(|r| r.into_override(from, to)).transpose()
    }

    async fn list_known_currencies(&self) -> Result<Vec<String>, RepoError> {
        sqlx::query_scalar::<_, String>(r#"SELECT code FROM currencies ORDER BY code"#)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn is_known_currency(&self, code: &str) -> Result<bool, RepoError> {
        let found: Option<String> =
            sqlx::query_scalar(r#"SELECT code FROM currencies WHERE code = ?"#)
                .bind(normalize_code(code))
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(found.is_some())
    }

    async fn add_currency(&self, code: &str, name: &str) -> Result<(), RepoError> {
        sqlx::query(r#"INSERT OR IGNORE INTO currencies (code, name) VALUES (?, ?)"#)
            .bind(normalize_code(code))
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn list_overrides(&self) -> Result<Vec<OverrideRecord>, RepoError> {
        let rows: Vec<DbOverride> = sqlx::query_as(
            r#"SELECT from_currency, to_currency, from_value, to_value, updated_at
               FROM rate_overrides ORDER BY from_currency, to_currency"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbOverride::into_record).collect()
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

        sqlx::query(
            r#"INSERT INTO rate_overrides (from_currency, to_currency, from_value, to_value, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (from_currency, to_currency) DO UPDATE SET
                   from_value = excluded.from_value,
                   to_value = excluded.to_value,
                   updated_at = excluded.updated_at"#,
        )
        .bind(&record.from_currency)
        .bind(&record.to_currency)
        .bind(record.from_value.to_string())
        .bind(record.to_value.to_string())
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                RepoError::Conflict("Override references an unregistered currency".into())
            }
            _ => db_err(e),
        })?;

        Ok(record)
    }

    async fn delete_override(&self, from: &str, to: &str) -> Result<bool, RepoError> {
        let result =
            sqlx::query(r#"DELETE FROM rate_overrides WHERE from_currency = ? AND to_currency = ?"#)
                .bind(normalize_code(from))
                .bind(normalize_code(to))
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}
