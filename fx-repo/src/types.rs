//! Shared database row types for SQLite and PostgreSQL.
//!
//! Decimals and timestamps are stored as TEXT in both engines so that the
//! exact decimal representation survives, whatever numeric types the engine has.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use fx_types::{CurrencyCode, OverrideRecord, RateOverride, RepoError};

/// Override row from database.
#[derive(FromRow)]
pub struct DbOverride {
    pub from_currency: String,
    pub to_currency: String,
    pub from_value: String,
    pub to_value: String,
    pub updated_at: String,
}

fn parse_decimal(column: &str, raw: &str) -> Result<Decimal, RepoError> {
    Decimal::from_str(raw).map_err(|e| RepoError::Corrupt(format!("{}={:?}: {}", column, raw, e)))
}

impl DbOverride {
    /// Converts into the engine type, reusing the already-validated codes.
    pub fn into_override(
        self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<RateOverride, RepoError> {
        Ok(RateOverride {
            from_currency: from.clone(),
            to_currency: to.clone(),
            from_value: parse_decimal("from_value", &self.from_value)?,
            to_value: parse_decimal("to_value", &self.to_value)?,
        })
    }

    pub fn into_record(self) -> Result<OverrideRecord, RepoError> {
        let updated_at = DateTime::parse_from_rfc3339(&self.updated_at)
            .map_err(|e| RepoError::Corrupt(format!("updated_at: {}", e)))?
            .with_timezone(&Utc);

        Ok(OverrideRecord {
            from_value: parse_decimal("from_value", &self.from_value)?,
            to_value: parse_decimal("to_value", &self.to_value)?,
            from_currency: self.from_currency,
            to_currency: self.to_currency,
            updated_at,
        })
    }
}
