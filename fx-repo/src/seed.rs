//! Reference currencies shipped with every fresh store.
//!
//! The same list drives the registry seed and the fixed development rate
//! provider, so a new currency only needs one line here.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Defines the seed registry together with a USD reference value per currency.
///
/// # Syntax
/// ```ignore
/// define_reference_currencies! {
///     CODE => ("Display name", usd_value_of_one_unit),
/// }
/// ```
macro_rules! define_reference_currencies {
    (
        $(
            $code:ident => ($name:literal, $usd:expr)
        ),* $(,)?
    ) => {
        /// Currencies registered in a fresh store: `(code, name)`.
        pub const SEED_CURRENCIES: &[(&str, &str)] = &[
            $((stringify!($code), $name)),*
        ];

        /// USD value of one unit of each seed currency.
        pub fn usd_reference_rates() -> Vec<(&'static str, Decimal)> {
            vec![$((stringify!($code), $usd)),*]
        }
    };
}

define_reference_currencies! {
    USD => ("US Dollar", dec!(1)),
    EUR => ("Euro", dec!(1.087)),
    GBP => ("British Pound", dec!(1.266)),
    INR => ("Indian Rupee", dec!(0.01203)),
    VND => ("Vietnamese Dong", dec!(0.00004)),
    JPY => ("Japanese Yen", dec!(0.0067)),
    AUD => ("Australian Dollar", dec!(0.655)),
    CAD => ("Canadian Dollar", dec!(0.738)),
    CHF => ("Swiss Franc", dec!(1.128)),
    CNY => ("Chinese Yuan", dec!(0.1385)),
    SGD => ("Singapore Dollar", dec!(0.745)),
}
