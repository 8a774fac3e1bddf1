#![deny(warnings)]

//! Rate-table currency conversion.
//!
//! Every deal is evaluated in the base currency (EUR); converting amounts
//! into the viewer's display currency happens here, at the edge. A rate
//! table holds each currency's value per one unit of the base, so a
//! conversion is `amount / rate[from] * rate[to]`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Currencies a deal can be priced or displayed in.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Gbp,
    Usd,
}

impl Currency {
    /// The currency all evaluation happens in.
    pub const BASE: Currency = Currency::Eur;

    /// Display symbol.
    pub const fn symbol(&self) -> &'static str {
        match self {
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Usd => "$",
        }
    }

    /// ISO 4217 code.
    pub const fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Usd => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            "USD" => Ok(Currency::Usd),
            other => Err(FxError::UnknownCurrency(other.to_string())),
        }
    }
}

/// Errors from rate lookup and conversion.
#[derive(Debug, Error, PartialEq)]
pub enum FxError {
    /// The table has no entry for the currency.
    #[error("no rate for currency {0}")]
    MissingRate(Currency),
    /// Rates are values per one base unit and must be strictly positive.
    #[error("rate for {0} must be positive")]
    NonPositiveRate(Currency),
    /// Unparseable currency code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Value of each currency per one unit of the base currency.
///
/// The base itself carries rate 1. Tables come from whatever feed the caller
/// trusts; [`RateTable::fallback`] covers the feed being unavailable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub rates: BTreeMap<Currency, Decimal>,
    /// Provenance label, e.g. the feed's update date or "fallback".
    pub as_of: String,
}

impl RateTable {
    /// Build a table from (currency, rate) pairs. The base rate of 1 is
    /// always present, whether or not the pairs include it.
    pub fn new(pairs: impl IntoIterator<Item = (Currency, Decimal)>, as_of: impl Into<String>) -> Self {
        let mut rates: BTreeMap<Currency, Decimal> = pairs.into_iter().collect();
        rates.insert(Currency::BASE, Decimal::ONE);
        Self {
            rates,
            as_of: as_of.into(),
        }
    }

    /// Approximate early-2026 rates, used when no live table is supplied.
    pub fn fallback() -> Self {
        Self::new(
            [
                (Currency::Gbp, dec!(0.83)),
                (Currency::Usd, dec!(1.08)),
            ],
            "fallback",
        )
    }

    /// Look up a currency's rate, insisting it is usable as a divisor.
    pub fn rate(&self, currency: Currency) -> Result<Decimal, FxError> {
        let rate = self
            .rates
            .get(&currency)
            .copied()
            .ok_or(FxError::MissingRate(currency))?;
        if rate <= Decimal::ZERO {
            return Err(FxError::NonPositiveRate(currency));
        }
        Ok(rate)
    }
}

/// Convert an amount between currencies via the base.
pub fn convert(
    amount: Decimal,
    from: Currency,
    to: Currency,
    table: &RateTable,
) -> Result<Decimal, FxError> {
    if from == to {
        return Ok(amount);
    }
    let from_rate = table.rate(from)?;
    let to_rate = table.rate(to)?;
    Ok(amount / from_rate * to_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identity_conversion_is_untouched() {
        let table = RateTable::fallback();
        let amount = dec!(123.45);
        assert_eq!(convert(amount, Currency::Gbp, Currency::Gbp, &table), Ok(amount));
    }

    #[test]
    fn conversion_goes_through_the_base() {
        let table = RateTable::new(
            [(Currency::Gbp, dec!(0.8)), (Currency::Usd, dec!(1.2))],
            "test",
        );
        // 80 GBP -> 100 EUR -> 120 USD
        assert_eq!(
            convert(dec!(80), Currency::Gbp, Currency::Usd, &table),
            Ok(dec!(120))
        );
        assert_eq!(
            convert(dec!(100), Currency::Eur, Currency::Gbp, &table),
            Ok(dec!(80))
        );
    }

    #[test]
    fn base_rate_is_always_one() {
        let table = RateTable::new([], "empty");
        assert_eq!(table.rate(Currency::Eur), Ok(Decimal::ONE));
        assert_eq!(
            table.rate(Currency::Usd),
            Err(FxError::MissingRate(Currency::Usd))
        );
    }

    #[test]
    fn zero_rate_is_rejected_not_divided_by() {
        let table = RateTable::new([(Currency::Usd, Decimal::ZERO)], "broken feed");
        assert_eq!(
            convert(dec!(10), Currency::Usd, Currency::Eur, &table),
            Err(FxError::NonPositiveRate(Currency::Usd))
        );
    }

    #[test]
    fn currency_codes_parse_case_insensitively() {
        assert_eq!("eur".parse::<Currency>(), Ok(Currency::Eur));
        assert_eq!("GBP".parse::<Currency>(), Ok(Currency::Gbp));
        assert!(matches!(
            "CHF".parse::<Currency>(),
            Err(FxError::UnknownCurrency(_))
        ));
    }

    #[test]
    fn serde_uses_iso_codes() {
        let table = RateTable::fallback();
        let s = serde_json::to_string(&table).unwrap();
        assert!(s.contains("\"GBP\""));
        let back: RateTable = serde_json::from_str(&s).unwrap();
        assert_eq!(back, table);
    }

    proptest! {
        #[test]
        fn there_and_back_drifts_by_dust_at_most(cents in 0i64..10_000_000) {
            let table = RateTable::fallback();
            let amount = Decimal::new(cents, 2);
            let gbp = convert(amount, Currency::Eur, Currency::Gbp, &table).unwrap();
            let back = convert(gbp, Currency::Gbp, Currency::Eur, &table).unwrap();
            prop_assert!((back - amount).abs() < dec!(0.0000000001));
        }
    }
}
