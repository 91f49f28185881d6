//! Display formatting for monetary amounts.
//!
//! Formatting never feeds back into conversion math; it only renders a value
//! that has already been computed.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amount::MAX_DECIMAL_DIGITS;
use crate::rounding::{RoundingMode, round, round_to};

/// Upper bound on rendered fractional digits (the largest `Decimal` scale).
pub const MAX_FRACTION_DIGITS: u32 = 28;

const NBSP: char = '\u{a0}';
const NARROW_NBSP: char = '\u{202f}';

// ─────────────────────────────────────────────────────────────────────────────
// Locales
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grouping {
    /// 1,234,567
    Thousands,
    /// 12,34,567
    Indian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolPosition {
    Prefix,
    Suffix,
}

/// Supported display locales. Unknown tags fall back to [`Locale::EnUs`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Locale {
    #[default]
    EnUs,
    EnGb,
    EnIn,
    DeDe,
    FrFr,
    ViVn,
    JaJp,
}

impl Locale {
    pub fn tag(&self) -> &'static str {
        match self {
            Locale::EnUs => "en-US",
            Locale::EnGb => "en-GB",
            Locale::EnIn => "en-IN",
            Locale::DeDe => "de-DE",
            Locale::FrFr => "fr-FR",
            Locale::ViVn => "vi-VN",
            Locale::JaJp => "ja-JP",
        }
    }

    fn group_separator(&self) -> char {
        match self {
            Locale::EnUs | Locale::EnGb | Locale::EnIn | Locale::JaJp => ',',
            Locale::DeDe | Locale::ViVn => '.',
            Locale::FrFr => NARROW_NBSP,
        }
    }

    fn decimal_separator(&self) -> char {
        match self {
            Locale::EnUs | Locale::EnGb | Locale::EnIn | Locale::JaJp => '.',
            Locale::DeDe | Locale::ViVn | Locale::FrFr => ',',
        }
    }

    fn grouping(&self) -> Grouping {
        match self {
            Locale::EnIn => Grouping::Indian,
            _ => Grouping::Thousands,
        }
    }

    fn symbol_position(&self) -> SymbolPosition {
        match self {
            Locale::EnUs | Locale::EnGb | Locale::EnIn | Locale::JaJp => SymbolPosition::Prefix,
            Locale::DeDe | Locale::ViVn | Locale::FrFr => SymbolPosition::Suffix,
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('_', "-").to_lowercase();
        match normalized.as_str() {
            "en-us" | "en" => Ok(Locale::EnUs),
            "en-gb" => Ok(Locale::EnGb),
            "en-in" => Ok(Locale::EnIn),
            "de-de" | "de" => Ok(Locale::DeDe),
            "fr-fr" | "fr" => Ok(Locale::FrFr),
            "vi-vn" | "vi" => Ok(Locale::ViVn),
            "ja-jp" | "ja" => Ok(Locale::JaJp),
            _ => Err(format!("Unsupported locale: {}", s)),
        }
    }
}

impl From<String> for Locale {
    fn from(tag: String) -> Self {
        tag.parse().unwrap_or_default()
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.tag().to_string()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Locale formatting
// ─────────────────────────────────────────────────────────────────────────────

/// Options for [`format_locale`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct FormatOptions {
    #[schema(value_type = String, example = "en-US")]
    pub locale: Locale,
    /// Symbol rendered before or after the number, per locale convention.
    #[schema(example = "$")]
    pub currency_symbol: Option<String>,
    pub min_fraction_digits: u32,
    pub max_fraction_digits: u32,
    pub mode: RoundingMode,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            locale: Locale::EnUs,
            currency_symbol: None,
            min_fraction_digits: MAX_DECIMAL_DIGITS,
            max_fraction_digits: MAX_DECIMAL_DIGITS,
            mode: RoundingMode::Nearest,
        }
    }
}

fn group_digits(digits: &str, grouping: Grouping, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 2);
    for (i, c) in digits.chars().enumerate() {
        let remaining = len - i;
        let boundary = match grouping {
            Grouping::Thousands => remaining % 3 == 0,
            Grouping::Indian => remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0),
        };
        if i > 0 && boundary {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// Renders `amount` with locale grouping, decimal separator and currency symbol.
///
/// The value is rounded per `options.mode` at two decimals first, then again at
/// `max_fraction_digits` when that is smaller. Fractional zeros are trimmed
/// down to `min_fraction_digits`. Both bounds are capped at
/// [`MAX_FRACTION_DIGITS`].
pub fn format_locale(amount: Decimal, options: &FormatOptions) -> String {
    let max = options.max_fraction_digits.min(MAX_FRACTION_DIGITS);
    let min = options.min_fraction_digits.min(max);

    let mut rounded = round(amount, options.mode);
    if max < MAX_DECIMAL_DIGITS {
        rounded = round_to(rounded, max, options.mode);
    }

    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = rounded.abs().to_string();
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut fraction = fraction.to_string();
    while fraction.len() > min as usize && fraction.ends_with('0') {
        fraction.pop();
    }
    while fraction.len() < min as usize {
        fraction.push('0');
    }

    let locale = options.locale;
    let mut number = group_digits(integer, locale.grouping(), locale.group_separator());
    if !fraction.is_empty() {
        number.push(locale.decimal_separator());
        number.push_str(&fraction);
    }

    let sign = if negative { "-" } else { "" };
    match options.currency_symbol.as_deref() {
        Some(symbol) if !symbol.is_empty() => match locale.symbol_position() {
            SymbolPosition::Prefix => format!("{}{}{}", sign, symbol, number),
            SymbolPosition::Suffix => format!("{}{}{}{}", sign, number, NBSP, symbol),
        },
        _ => format!("{}{}", sign, number),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Compact formatting
// ─────────────────────────────────────────────────────────────────────────────

const COMPACT_TIERS: [(i64, &str); 3] = [(1_000, "K"), (1_000_000, "M"), (1_000_000_000, "B")];

/// Renders `amount` with a `K`/`M`/`B` suffix, e.g. `1.5M VND`.
///
/// Suffixed values keep at most two fractional digits with trailing zeros
/// trimmed. Below 1,000 the value is rendered with exactly two decimals.
pub fn format_compact(amount: Decimal, currency_code: &str, mode: RoundingMode) -> String {
    let rounded = round(amount, mode);
    let magnitude = rounded.abs();

    let mut tier = COMPACT_TIERS
        .iter()
        .rposition(|(threshold, _)| magnitude >= Decimal::from(*threshold));

    let body = loop {
        match tier {
            None => break magnitude.to_string(),
            Some(i) => {
                let (threshold, suffix) = COMPACT_TIERS[i];
                let scaled = round(rounded / Decimal::from(threshold), mode).abs();
                // 999,999 rounds to 1000K; promote it to 1M.
                if scaled >= Decimal::from(1_000) && i + 1 < COMPACT_TIERS.len() {
                    tier = Some(i + 1);
                    continue;
                }
                break format!("{}{}", scaled.normalize(), suffix);
            }
        }
    };

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let code = currency_code.trim();
    if code.is_empty() {
        format!("{}{}", sign, body)
    } else {
        format!("{}{} {}", sign, body, code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn opts(locale: Locale, symbol: &str) -> FormatOptions {
        FormatOptions {
            locale,
            currency_symbol: Some(symbol.to_string()),
            ..FormatOptions::default()
        }
    }

    #[test]
    fn test_compact_examples() {
        assert_eq!(
            format_compact(dec!(1500000), "VND", RoundingMode::Nearest),
            "1.5M VND"
        );
        assert_eq!(
            format_compact(dec!(999), "VND", RoundingMode::Nearest),
            "999.00 VND"
        );
    }

    #[test]
    fn test_compact_tiers() {
        assert_eq!(format_compact(dec!(1000), "USD", RoundingMode::Nearest), "1K USD");
        assert_eq!(format_compact(dec!(12345), "USD", RoundingMode::Nearest), "12.35K USD");
        assert_eq!(format_compact(dec!(12345), "USD", RoundingMode::Down), "12.34K USD");
        assert_eq!(
            format_compact(dec!(2500000000), "USD", RoundingMode::Nearest),
            "2.5B USD"
        );
        assert_eq!(format_compact(dec!(-1500), "", RoundingMode::Nearest), "-1.5K");
    }

    #[test]
    fn test_compact_promotes_rounded_tier() {
        assert_eq!(format_compact(dec!(999999), "EUR", RoundingMode::Nearest), "1M EUR");
        assert_eq!(format_compact(dec!(999.999), "EUR", RoundingMode::Nearest), "1K EUR");
        assert_eq!(format_compact(dec!(999.999), "EUR", RoundingMode::Down), "999.99 EUR");
    }

    #[test]
    fn test_locale_en_us() {
        assert_eq!(format_locale(dec!(1234567.891), &opts(Locale::EnUs, "$")), "$1,234,567.89");
        assert_eq!(format_locale(dec!(-5), &opts(Locale::EnUs, "$")), "-$5.00");
        assert_eq!(format_locale(dec!(0.5), &FormatOptions::default()), "0.50");
    }

    #[test]
    fn test_locale_suffix_symbols() {
        assert_eq!(
            format_locale(dec!(1234.5), &opts(Locale::DeDe, "€")),
            "1.234,50\u{a0}€"
        );
        assert_eq!(
            format_locale(dec!(25000), &opts(Locale::ViVn, "₫")),
            "25.000,00\u{a0}₫"
        );
        assert_eq!(
            format_locale(dec!(1234.5), &opts(Locale::FrFr, "€")),
            "1\u{202f}234,50\u{a0}€"
        );
    }

    #[test]
    fn test_locale_indian_grouping() {
        assert_eq!(format_locale(dec!(1234567.8), &opts(Locale::EnIn, "₹")), "₹12,34,567.80");
        assert_eq!(format_locale(dec!(123), &opts(Locale::EnIn, "₹")), "₹123.00");
    }

    #[test]
    fn test_fraction_digit_bounds() {
        let whole = FormatOptions {
            locale: Locale::JaJp,
            currency_symbol: Some("¥".into()),
            min_fraction_digits: 0,
            max_fraction_digits: 0,
            mode: RoundingMode::Nearest,
        };
        assert_eq!(format_locale(dec!(1234.5), &whole), "¥1,235");

        let trimmed = FormatOptions {
            min_fraction_digits: 0,
            ..FormatOptions::default()
        };
        assert_eq!(format_locale(dec!(12.50), &trimmed), "12.5");
        assert_eq!(format_locale(dec!(12.00), &trimmed), "12");

        let padded = FormatOptions {
            min_fraction_digits: 4,
            max_fraction_digits: 4,
            ..FormatOptions::default()
        };
        assert_eq!(format_locale(dec!(1.239), &padded), "1.2400");
    }

    #[test]
    fn test_fraction_digits_are_capped() {
        let huge = FormatOptions {
            min_fraction_digits: 20_000_000,
            max_fraction_digits: 20_000_000,
            ..FormatOptions::default()
        };

        let formatted = format_locale(dec!(1), &huge);

        assert_eq!(formatted, format!("1.{}", "0".repeat(MAX_FRACTION_DIGITS as usize)));
    }

    #[test]
    fn test_locale_parse_fallback() {
        assert_eq!("vi_VN".parse::<Locale>().unwrap(), Locale::ViVn);
        assert_eq!(Locale::from("xx-YY".to_string()), Locale::EnUs);
    }
}
