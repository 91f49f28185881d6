//! Registry-validated currency codes.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::error::ConversionError;

/// Normalizes a raw currency code for comparison and storage.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// A currency code known to the registry.
///
/// The only constructor is [`KnownCurrencies::resolve`], so a value of this
/// type is proof that the code was checked against the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of the currency registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownCurrencies {
    codes: BTreeSet<String>,
}

impl KnownCurrencies {
    /// Builds a registry snapshot from raw codes (normalized to upper case).
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            codes: codes
                .into_iter()
                .map(|c| normalize_code(c.as_ref()))
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }

    /// Validates `raw` against the registry.
    ///
    /// The error names the code exactly as supplied (trimmed).
    pub fn resolve(&self, raw: &str) -> Result<CurrencyCode, ConversionError> {
        let code = normalize_code(raw);
        if self.codes.contains(&code) {
            Ok(CurrencyCode(code))
        } else {
            Err(ConversionError::UnknownCurrency(raw.trim().to_string()))
        }
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_code() {
        let known = KnownCurrencies::new(["usd", "VND"]);
        let code = known.resolve(" usd ").unwrap();
        assert_eq!(code.as_str(), "USD");
        assert_eq!(code.to_string(), "USD");
    }

    #[test]
    fn test_resolve_unknown_code_names_it() {
        let known = KnownCurrencies::new(["USD"]);
        match known.resolve("XYZ") {
            Err(ConversionError::UnknownCurrency(code)) => assert_eq!(code, "XYZ"),
            other => panic!("expected UnknownCurrency, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_codes_ignored() {
        let known = KnownCurrencies::new(["", "  ", "EUR"]);
        assert_eq!(known.len(), 1);
        assert!(known.resolve("").is_err());
    }

    #[test]
    fn test_code_serializes_as_string() {
        let code = KnownCurrencies::new(["JPY"]).resolve("jpy").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"JPY\"");
    }
}
