//! Configuration loading from environment.

use std::env;
use std::time::Duration;

use fx_hex::{CacheConfig, StalePolicy};

/// Where provider rate tables come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    /// Built-in reference table, no network.
    Fixed,
    Http {
        url: String,
        api_key: Option<String>,
    },
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub provider: ProviderConfig,
    pub cache: CacheConfig,
    pub convert_deadline: Duration,
    pub rate_limit_per_minute: u32,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`; unset or blank values take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let parse_u64 = |key: &str, default: u64| -> anyhow::Result<u64> {
            match var(key) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|e| anyhow::anyhow!("{} must be a whole number: {}", key, e)),
                None => Ok(default),
            }
        };

        let port = parse_u64("PORT", 3000)?;
        let port = u16::try_from(port).map_err(|_| anyhow::anyhow!("PORT out of range: {}", port))?;

        let database_url = var("DATABASE_URL").unwrap_or_else(|| "memory://".to_string());

        let provider = match var("RATE_PROVIDER").as_deref().map(str::trim) {
            None | Some("fixed") => ProviderConfig::Fixed,
            Some("http") => ProviderConfig::Http {
                url: var("RATE_PROVIDER_URL").ok_or_else(|| {
                    anyhow::anyhow!("RATE_PROVIDER_URL is required when RATE_PROVIDER=http")
                })?,
                api_key: var("RATE_PROVIDER_API_KEY"),
            },
            Some(other) => anyhow::bail!("Unknown RATE_PROVIDER {:?} (expected fixed or http)", other),
        };

        let stale_policy = match var("RATE_STALE_POLICY") {
            Some(raw) => raw.parse::<StalePolicy>().map_err(anyhow::Error::msg)?,
            None => StalePolicy::default(),
        };

        let cache = CacheConfig {
            ttl: Duration::from_secs(parse_u64("RATE_CACHE_TTL_SECS", 3600)?),
            fetch_timeout: Duration::from_millis(parse_u64("RATE_FETCH_TIMEOUT_MS", 5000)?),
            stale_policy,
        };

        let rate_limit = parse_u64("RATE_LIMIT_PER_MINUTE", 100)?;

        Ok(Self {
            port,
            database_url,
            provider,
            cache,
            convert_deadline: Duration::from_millis(parse_u64("CONVERT_DEADLINE_MS", 10_000)?),
            rate_limit_per_minute: u32::try_from(rate_limit).unwrap_or(u32::MAX),
            otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.database_url, "memory://");
        assert_eq!(config.provider, ProviderConfig::Fixed);
        assert_eq!(config.cache.ttl, Duration::from_secs(3600));
        assert_eq!(config.cache.fetch_timeout, Duration::from_millis(5000));
        assert_eq!(config.cache.stale_policy, StalePolicy::Block);
        assert_eq!(config.convert_deadline, Duration::from_secs(10));
        assert_eq!(config.rate_limit_per_minute, 100);
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn test_http_provider_requires_url() {
        assert!(load(&[("RATE_PROVIDER", "http")]).is_err());

        let config = load(&[
            ("RATE_PROVIDER", "http"),
            ("RATE_PROVIDER_URL", "https://rates.example.com/v6"),
            ("RATE_PROVIDER_API_KEY", "secret"),
            ("RATE_STALE_POLICY", "revalidate"),
        ])
        .unwrap();

        assert_eq!(
            config.provider,
            ProviderConfig::Http {
                url: "https://rates.example.com/v6".into(),
                api_key: Some("secret".into()),
            }
        );
        assert_eq!(config.cache.stale_policy, StalePolicy::Revalidate);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(load(&[("PORT", "70000")]).is_err());
        assert!(load(&[("RATE_CACHE_TTL_SECS", "soon")]).is_err());
        assert!(load(&[("RATE_PROVIDER", "carrier-pigeon")]).is_err());
        assert!(load(&[("RATE_STALE_POLICY", "never")]).is_err());
    }
}
