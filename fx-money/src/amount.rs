//! Monetary amount bounds and input validation.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

/// Maximum number of digits allowed in the integer part of an amount.
pub const MAX_DIGITS: usize = 15;

/// Maximum number of fractional digits an amount may carry.
pub const MAX_DECIMAL_DIGITS: u32 = 2;

/// Largest magnitude that survives a round trip through an IEEE-754 double
/// (2^53 - 1). Amounts leave this service as JSON and are read by clients that
/// parse numbers as doubles.
pub const MAX_SAFE_MAGNITUDE: i64 = 9_007_199_254_740_991;

/// Reasons a monetary input is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Amount has more than {} integer digits", MAX_DIGITS)]
    TooManyIntegerDigits,

    #[error("Amount has more than {} decimal digits", MAX_DECIMAL_DIGITS)]
    TooManyDecimalDigits,

    #[error("Negative amounts are not allowed")]
    NegativeNotAllowed,

    #[error("Amount is outside the safe numeric range")]
    OutOfRange,

    #[error("Amount contains no digits")]
    Empty,

    #[error("Amount is not a valid decimal number")]
    Malformed,
}

// ─────────────────────────────────────────────────────────────────────────────
// Range checks
// ─────────────────────────────────────────────────────────────────────────────

fn integer_digits(amount: Decimal) -> usize {
    amount.trunc().abs().normalize().to_string().len()
}

/// Returns true if `amount` can be used as a monetary value.
///
/// Rejects negatives unless `allow_negative`, magnitudes beyond
/// [`MAX_SAFE_MAGNITUDE`] and integer parts longer than [`MAX_DIGITS`].
pub fn is_amount_in_range(amount: Decimal, allow_negative: bool) -> bool {
    if amount.is_sign_negative() && !amount.is_zero() && !allow_negative {
        return false;
    }
    amount.abs() <= Decimal::from(MAX_SAFE_MAGNITUDE) && integer_digits(amount) <= MAX_DIGITS
}

// ─────────────────────────────────────────────────────────────────────────────
// MonetaryAmount
// ─────────────────────────────────────────────────────────────────────────────

/// A decimal amount that passed every bound check.
///
/// Construction is the only validation point; arithmetic on the wrapped value
/// can assume it fits the declared precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MonetaryAmount(Decimal);

impl MonetaryAmount {
    /// Validates `value` strictly: excess fractional digits are an error, not truncated.
    pub fn new(value: Decimal, allow_negative: bool) -> Result<Self, ValidationError> {
        if value.is_sign_negative() && !value.is_zero() && !allow_negative {
            return Err(ValidationError::NegativeNotAllowed);
        }
        if integer_digits(value) > MAX_DIGITS {
            return Err(ValidationError::TooManyIntegerDigits);
        }
        if value.abs() > Decimal::from(MAX_SAFE_MAGNITUDE) {
            return Err(ValidationError::OutOfRange);
        }
        if value.normalize().scale() > MAX_DECIMAL_DIGITS {
            return Err(ValidationError::TooManyDecimalDigits);
        }
        Ok(Self(value))
    }

    /// Parses a decimal string strictly (no sanitizing).
    pub fn parse(s: &str, allow_negative: bool) -> Result<Self, ValidationError> {
        let value = Decimal::from_str(s.trim()).map_err(|_| ValidationError::Malformed)?;
        Self::new(value, allow_negative)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl fmt::Display for MonetaryAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<MonetaryAmount> for Decimal {
    fn from(amount: MonetaryAmount) -> Self {
        amount.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Input strings
// ─────────────────────────────────────────────────────────────────────────────

/// Canonical form of a user-typed amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedAmount {
    text: String,
    #[serde(skip)]
    value: Decimal,
}

impl NormalizedAmount {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn to_decimal(&self) -> Decimal {
        self.value
    }
}

impl fmt::Display for NormalizedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Sanitizes and validates a free-form amount string, as typed into a form field.
///
/// Characters other than digits, `.` and `-` are dropped. Only a leading `-`
/// counts, and only when `allow_negative`. Extra decimal points collapse into
/// the first, fractional digits beyond [`MAX_DECIMAL_DIGITS`] are truncated
/// and leading integer zeros are stripped. An integer part longer than
/// [`MAX_DIGITS`] is rejected, never clamped.
///
/// Validating the returned string again yields the same string.
pub fn validate_amount_string(
    input: &str,
    allow_negative: bool,
) -> Result<NormalizedAmount, ValidationError> {
    let kept: Vec<char> = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let negative = kept.first() == Some(&'-');
    if negative && !allow_negative {
        return Err(ValidationError::NegativeNotAllowed);
    }

    let mut integer = String::new();
    let mut fraction = String::new();
    let mut seen_point = false;
    for c in kept.into_iter().filter(|c| *c != '-') {
        match c {
            '.' => seen_point = true,
            d if seen_point => fraction.push(d),
            d => integer.push(d),
        }
    }

    if integer.is_empty() && fraction.is_empty() {
        return Err(ValidationError::Empty);
    }

    fraction.truncate(MAX_DECIMAL_DIGITS as usize);

    let integer = match integer.trim_start_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };
    if integer.len() > MAX_DIGITS {
        return Err(ValidationError::TooManyIntegerDigits);
    }

    let is_zero = integer == "0" && fraction.chars().all(|c| c == '0');
    let mut text = String::with_capacity(integer.len() + fraction.len() + 2);
    if negative && !is_zero {
        text.push('-');
    }
    text.push_str(integer);
    if !fraction.is_empty() {
        text.push('.');
        text.push_str(&fraction);
    }

    let value = Decimal::from_str(&text).map_err(|_| ValidationError::OutOfRange)?;
    Ok(NormalizedAmount { text, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn normalize(s: &str) -> String {
        validate_amount_string(s, true).unwrap().into_string()
    }

    #[test]
    fn test_strips_disallowed_characters() {
        assert_eq!(normalize("$1,234.50"), "1234.50");
        assert_eq!(normalize(" 12 345 ₫"), "12345");
    }

    #[test]
    fn test_leading_zeros_stripped() {
        assert_eq!(normalize("000123"), "123");
        assert_eq!(normalize("0000"), "0");
        assert_eq!(normalize("00.5"), "0.5");
        assert_eq!(normalize(".5"), "0.5");
    }

    #[test]
    fn test_multiple_decimal_points_collapse() {
        assert_eq!(normalize("1.2.3"), "1.23");
        assert_eq!(normalize("1..5"), "1.5");
    }

    #[test]
    fn test_fraction_truncated_to_two_digits() {
        assert_eq!(normalize("12.3456"), "12.34");
        assert_eq!(normalize("12.999"), "12.99");
    }

    #[test]
    fn test_trailing_point_dropped() {
        assert_eq!(normalize("12."), "12");
    }

    #[test]
    fn test_minus_handling() {
        assert_eq!(normalize("-12.5"), "-12.5");
        assert_eq!(normalize("--12"), "-12");
        assert_eq!(normalize("12-3"), "123");
        assert_eq!(normalize("-0.00"), "0.00");
        assert_eq!(
            validate_amount_string("-12", false),
            Err(ValidationError::NegativeNotAllowed)
        );
        assert_eq!(validate_amount_string("12-", false).unwrap().as_str(), "12");
    }

    #[test]
    fn test_empty_input_rejected() {
        assert_eq!(validate_amount_string("", true), Err(ValidationError::Empty));
        assert_eq!(validate_amount_string("abc", true), Err(ValidationError::Empty));
        assert_eq!(validate_amount_string("-.", true), Err(ValidationError::Empty));
    }

    #[test]
    fn test_too_many_integer_digits_rejected() {
        let at_limit = "9".repeat(MAX_DIGITS);
        assert_eq!(normalize(&at_limit), at_limit);

        let over = "1".repeat(MAX_DIGITS + 1);
        assert_eq!(
            validate_amount_string(&over, false),
            Err(ValidationError::TooManyIntegerDigits)
        );
        // Leading zeros do not count towards the limit.
        let padded = format!("000{}", at_limit);
        assert_eq!(normalize(&padded), at_limit);
    }

    #[test]
    fn test_revalidation_is_noop() {
        let inputs = [
            "$1,234.567",
            "-0012.3.4",
            "0",
            ".99",
            "12.",
            "-5",
            "000.000",
            "999999999999999.99",
        ];
        for input in inputs {
            let once = validate_amount_string(input, true).unwrap();
            let twice = validate_amount_string(once.as_str(), true).unwrap();
            assert_eq!(once, twice, "input {:?}", input);
        }
    }

    #[test]
    fn test_normalized_value_matches_text() {
        let n = validate_amount_string("1,000.5", false).unwrap();
        assert_eq!(n.to_decimal(), dec!(1000.5));
    }

    #[test]
    fn test_is_amount_in_range() {
        assert!(is_amount_in_range(dec!(0), false));
        assert!(is_amount_in_range(dec!(999999999999999.99), false));
        assert!(!is_amount_in_range(dec!(1000000000000000), false));
        assert!(!is_amount_in_range(dec!(-1), false));
        assert!(is_amount_in_range(dec!(-1), true));
    }

    #[test]
    fn test_monetary_amount_strict() {
        assert!(MonetaryAmount::new(dec!(10.50), false).is_ok());
        assert!(MonetaryAmount::new(dec!(10.500), false).is_ok());
        assert_eq!(
            MonetaryAmount::new(dec!(10.505), false),
            Err(ValidationError::TooManyDecimalDigits)
        );
        assert_eq!(
            MonetaryAmount::new(dec!(-3), false),
            Err(ValidationError::NegativeNotAllowed)
        );
        assert_eq!(
            MonetaryAmount::new(dec!(1234567890123456), true),
            Err(ValidationError::TooManyIntegerDigits)
        );
        assert_eq!(
            MonetaryAmount::parse("12.x", false),
            Err(ValidationError::Malformed)
        );
        assert_eq!(MonetaryAmount::parse("", false), Err(ValidationError::Malformed));
        assert_eq!(MonetaryAmount::parse(" 7.25 ", false).unwrap().value(), dec!(7.25));
    }
}
