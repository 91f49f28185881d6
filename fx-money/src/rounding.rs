//! Deterministic decimal rounding.
//!
//! Rounding always happens on `Decimal`, so `2.005` really is `2.005` and
//! `Nearest` rounds it to `2.01`. Results carry exactly the requested scale.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::amount::MAX_DECIMAL_DIGITS;

/// Rounding policy applied to monetary values.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    /// Towards positive infinity (ceiling).
    Up,
    /// Towards negative infinity (floor).
    Down,
    /// Half away from zero.
    #[default]
    Nearest,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::Up => RoundingStrategy::ToPositiveInfinity,
            RoundingMode::Down => RoundingStrategy::ToNegativeInfinity,
            RoundingMode::Nearest => RoundingStrategy::MidpointAwayFromZero,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoundingMode::Up => "up",
            RoundingMode::Down => "down",
            RoundingMode::Nearest => "nearest",
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoundingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" | "ceil" => Ok(RoundingMode::Up),
            "down" | "floor" => Ok(RoundingMode::Down),
            "nearest" | "round" => Ok(RoundingMode::Nearest),
            _ => Err(format!("Unknown rounding mode: {}", s)),
        }
    }
}

/// Rounds `amount` to two decimal places under `mode`.
///
/// The result always has scale 2, so `round(50000, Nearest)` displays as
/// `50000.00`. Rounding an already-rounded value is a no-op.
pub fn round(amount: Decimal, mode: RoundingMode) -> Decimal {
    round_to(amount, MAX_DECIMAL_DIGITS, mode)
}

/// Rounds `amount` to `dp` decimal places under `mode`, padding the scale to `dp`.
pub fn round_to(amount: Decimal, dp: u32, mode: RoundingMode) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(dp, mode.strategy());
    rounded.rescale(dp);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}
