//! PostgreSQL repository adapter.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use fx_types::{
    CurrencyCode, OverrideRecord, RateOverride, RateRepository, RepoError, UpsertOverrideRequest,
    domain::normalize_code,
};

use crate::seed::SEED_CURRENCIES;
use crate::types::DbOverride;

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository implementation.
pub struct PostgresRepo {
    pool: PgPool,
}

fn db_err(e: sqlx::Error) -> RepoError {
    RepoError::Database(e.to_string())
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
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

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_rate_tables_pg.sql"),
        "0001",
    )
    .await
}

impl PostgresRepo {
    /// Connects, migrates and seeds the reference currencies.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;

        let repo = Self { pool };
        for (code, name) in SEED_CURRENCIES {
            repo.add_currency(code, name).await?;
        }
        Ok(repo)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateRepository for PostgresRepo {
    async fn find_override(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Option<RateOverride>, RepoError> {
        let row: Option<DbOverride> = sqlx::query_as(
            r#"SELECT from_currency, to_currency, from_value, to_value, updated_at
               FROM rate_overrides WHERE from_currency = $1 AND to_currency = $2"#,
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
            sqlx::query_scalar(r#"SELECT code FROM currencies WHERE code = $1"#)
                .bind(normalize_code(code))
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(found.is_some())
    }

    async fn add_currency(&self, code: &str, name: &str) -> Result<(), RepoError> {
        sqlx::query(
            r#"INSERT INTO currencies (code, name) VALUES ($1, $2) ON CONFLICT (code) DO NOTHING"#,
        )
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
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT (from_currency, to_currency) DO UPDATE SET
                   from_value = EXCLUDED.from_value,
                   to_value = EXCLUDED.to_value,
                   updated_at = EXCLUDED.updated_at"#,
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
        let result = sqlx::query(
            r#"DELETE FROM rate_overrides WHERE from_currency = $1 AND to_currency = $2"#,
        )
        .bind(normalize_code(from))
        .bind(normalize_code(to))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}
