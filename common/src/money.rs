//! [`Money`] amounts.

use std::{fmt, str::FromStr};

use derive_more::{Display, Error};
use rust_decimal::Decimal;

use crate::define_kind;

/// Exact amount of money in some [`Currency`].
///
/// Its textual form is the amount immediately followed by the [`Currency`]
/// code, like `12.5USD`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount in major units of the [`Currency`].
    pub amount: Decimal,

    /// [`Currency`] of the [`Money::amount`].
    pub currency: Currency,
}

impl Money {
    /// Indicates whether this [`Money`] is more than nothing.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Multiplies this [`Money`] by the provided number of `units` (like days
    /// of a rental).
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub fn checked_times(self, units: u32) -> Option<Self> {
        self.amount
            .checked_mul(units.into())
            .map(|amount| Self { amount, ..self })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount.normalize(), self.currency)
    }
}

impl FromStr for Money {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .len()
            .checked_sub(3)
            .filter(|&at| at > 0 && s.is_char_boundary(at))
            .ok_or(ParseError::Malformed)?;
        let (amount, currency) = s.split_at(split);

        Ok(Self {
            amount: amount.parse().map_err(ParseError::Amount)?,
            currency: currency.parse().map_err(|_| ParseError::Currency)?,
        })
    }
}

/// Error of parsing [`Money`] from a string.
#[derive(Clone, Debug, Display, Error)]
pub enum ParseError {
    /// Not an amount followed by a three-letter [`Currency`] code.
    #[display("expected amount followed by three-letter currency code")]
    Malformed,

    /// Amount is not a decimal number.
    #[display("invalid amount: {_0}")]
    Amount(rust_decimal::Error),

    /// [`Currency`] is not supported.
    #[display("unsupported currency")]
    Currency,
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "US Dollar."]
        Usd = 1,

        #[doc = "Euro."]
        Eur = 2,

        #[doc = "Russian Ruble."]
        Rub = 3,
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    use juniper::graphql_scalar;

    /// Amount of money followed by its three-letter currency code, like
    /// `12.50USD` or `40EUR`.
    #[graphql_scalar(with = crate::scalar::Textual, parse_token(String))]
    type Money = super::Money;
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{Currency, Money, ParseError};

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn parses_amount_and_currency() {
        assert_eq!(
            money("12.50EUR"),
            Money {
                amount: Decimal::new(1250, 2),
                currency: Currency::Eur,
            },
        );
        assert_eq!(money("40USD").currency, Currency::Usd);
        assert_eq!(money("0.5RUB").amount, Decimal::new(5, 1));
    }

    #[test]
    fn rejects_malformed() {
        let parse = |s: &str| s.parse::<Money>();

        assert!(matches!(parse("USD"), Err(ParseError::Malformed)));
        assert!(matches!(parse(""), Err(ParseError::Malformed)));
        assert!(matches!(parse("12,5USD"), Err(ParseError::Amount(_))));
        assert!(matches!(parse("12.50usd"), Err(ParseError::Currency)));
        assert!(matches!(parse("12.50GBP"), Err(ParseError::Currency)));
        assert!(parse("12.50").is_err());
    }

    #[test]
    fn formats_without_trailing_zeros() {
        assert_eq!(money("12.50EUR").to_string(), "12.5EUR");
        assert_eq!(money("40.00USD").to_string(), "40USD");
        assert_eq!(money("0.01RUB").to_string(), "0.01RUB");
    }

    #[test]
    fn multiplies_daily_price_by_days() {
        let per_day = money("12.50EUR");

        assert_eq!(per_day.checked_times(3), Some(money("37.5EUR")));
        assert_eq!(per_day.checked_times(1), Some(per_day));
        assert!(!per_day.checked_times(0).unwrap().is_positive());

        let huge = Money {
            amount: Decimal::MAX,
            currency: Currency::Usd,
        };
        assert_eq!(huge.checked_times(2), None);
    }

    #[test]
    fn positivity() {
        assert!(money("0.01USD").is_positive());
        assert!(!money("0USD").is_positive());
        assert!(!money("-5USD").is_positive());
    }
}
