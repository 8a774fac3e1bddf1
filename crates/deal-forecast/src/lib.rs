#![deny(warnings)]

//! Territory/market-sizing estimator.
//!
//! A strictly linear model: `population × prevalence% × addressable% ×
//! share%` gives the owner's unit share of a territory, and `× price` its
//! peak revenue. No cascading logic lives here. The resulting unit counts
//! are one possible source for a deal's `forecast_sales`, but this crate
//! never calls the evaluation engine.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Market regions the atlas groups countries into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    Europe,
    NorthAmerica,
    Gcc,
    Mena,
    AsiaPacific,
    Africa,
    LatinAmerica,
}

impl Region {
    /// Human-readable label.
    pub const fn label(&self) -> &'static str {
        match self {
            Region::Europe => "Europe",
            Region::NorthAmerica => "North America",
            Region::Gcc => "GCC",
            Region::Mena => "MENA",
            Region::AsiaPacific => "Asia Pacific",
            Region::Africa => "Africa",
            Region::LatinAmerica => "Latin America",
        }
    }
}

/// A sellable territory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    /// ISO 3166-1 alpha-2 code.
    pub code: String,
    /// Population in millions.
    pub population_millions: Decimal,
    pub region: Region,
}

fn country(name: &str, code: &str, population_millions: Decimal, region: Region) -> Country {
    Country {
        name: name.to_string(),
        code: code.to_string(),
        population_millions,
        region,
    }
}

/// The built-in market atlas.
pub fn countries() -> Vec<Country> {
    use Region::*;
    vec![
        country("Austria", "AT", dec!(9.0), Europe),
        country("Belgium", "BE", dec!(11.6), Europe),
        country("Bulgaria", "BG", dec!(6.9), Europe),
        country("Croatia", "HR", dec!(4.1), Europe),
        country("Cyprus", "CY", dec!(1.2), Europe),
        country("Czech Republic", "CZ", dec!(10.7), Europe),
        country("Denmark", "DK", dec!(5.8), Europe),
        country("Estonia", "EE", dec!(1.3), Europe),
        country("Finland", "FI", dec!(5.5), Europe),
        country("France", "FR", dec!(67.4), Europe),
        country("Germany", "DE", dec!(83.2), Europe),
        country("Greece", "GR", dec!(10.7), Europe),
        country("Hungary", "HU", dec!(9.7), Europe),
        country("Iceland", "IS", dec!(0.4), Europe),
        country("Ireland", "IE", dec!(5.0), Europe),
        country("Italy", "IT", dec!(59.3), Europe),
        country("Latvia", "LV", dec!(1.9), Europe),
        country("Lithuania", "LT", dec!(2.8), Europe),
        country("Luxembourg", "LU", dec!(0.6), Europe),
        country("Malta", "MT", dec!(0.5), Europe),
        country("Netherlands", "NL", dec!(17.4), Europe),
        country("Norway", "NO", dec!(5.4), Europe),
        country("Poland", "PL", dec!(38.0), Europe),
        country("Portugal", "PT", dec!(10.3), Europe),
        country("Romania", "RO", dec!(19.3), Europe),
        country("Slovakia", "SK", dec!(5.5), Europe),
        country("Slovenia", "SI", dec!(2.1), Europe),
        country("Spain", "ES", dec!(47.4), Europe),
        country("Sweden", "SE", dec!(10.4), Europe),
        country("Switzerland", "CH", dec!(8.6), Europe),
        country("United Kingdom", "GB", dec!(67.2), Europe),
        country("Canada", "CA", dec!(38.0), NorthAmerica),
        country("Mexico", "MX", dec!(128.9), NorthAmerica),
        country("United States", "US", dec!(331.0), NorthAmerica),
        country("United Arab Emirates", "AE", dec!(9.9), Gcc),
        country("Saudi Arabia", "SA", dec!(34.8), Gcc),
        country("Qatar", "QA", dec!(2.9), Gcc),
        country("Kuwait", "KW", dec!(4.3), Gcc),
        country("Oman", "OM", dec!(5.1), Gcc),
        country("Bahrain", "BH", dec!(1.7), Gcc),
        country("Egypt", "EG", dec!(102.3), Mena),
        country("Jordan", "JO", dec!(10.2), Mena),
        country("Lebanon", "LB", dec!(6.8), Mena),
        country("Morocco", "MA", dec!(36.9), Mena),
        country("Tunisia", "TN", dec!(11.8), Mena),
        country("Algeria", "DZ", dec!(43.8), Mena),
        country("Iraq", "IQ", dec!(40.2), Mena),
        country("Israel", "IL", dec!(9.2), Mena),
        country("Iran", "IR", dec!(84.0), Mena),
        country("Australia", "AU", dec!(25.7), AsiaPacific),
        country("China", "CN", dec!(1411.0), AsiaPacific),
        country("Hong Kong", "HK", dec!(7.5), AsiaPacific),
        country("India", "IN", dec!(1380.0), AsiaPacific),
        country("Indonesia", "ID", dec!(273.5), AsiaPacific),
        country("Japan", "JP", dec!(125.8), AsiaPacific),
        country("Malaysia", "MY", dec!(32.4), AsiaPacific),
        country("New Zealand", "NZ", dec!(5.1), AsiaPacific),
        country("Philippines", "PH", dec!(109.6), AsiaPacific),
        country("Singapore", "SG", dec!(5.7), AsiaPacific),
        country("South Korea", "KR", dec!(51.8), AsiaPacific),
        country("Taiwan", "TW", dec!(23.6), AsiaPacific),
        country("Thailand", "TH", dec!(69.8), AsiaPacific),
        country("Vietnam", "VN", dec!(97.3), AsiaPacific),
        country("Pakistan", "PK", dec!(220.9), AsiaPacific),
        country("Bangladesh", "BD", dec!(164.7), AsiaPacific),
        country("South Africa", "ZA", dec!(59.3), Africa),
        country("Nigeria", "NG", dec!(206.1), Africa),
        country("Kenya", "KE", dec!(53.8), Africa),
        country("Ethiopia", "ET", dec!(115.0), Africa),
        country("Ghana", "GH", dec!(31.1), Africa),
        country("Tanzania", "TZ", dec!(59.7), Africa),
        country("Uganda", "UG", dec!(45.7), Africa),
        country("Ivory Coast", "CI", dec!(26.4), Africa),
        country("Senegal", "SN", dec!(16.7), Africa),
        country("Argentina", "AR", dec!(45.4), LatinAmerica),
        country("Brazil", "BR", dec!(212.6), LatinAmerica),
        country("Chile", "CL", dec!(19.1), LatinAmerica),
        country("Colombia", "CO", dec!(50.9), LatinAmerica),
        country("Peru", "PE", dec!(33.0), LatinAmerica),
        country("Venezuela", "VE", dec!(28.4), LatinAmerica),
    ]
}

/// Find a country by its alpha-2 code (case-insensitive).
pub fn find_country(code: &str) -> Option<Country> {
    countries()
        .into_iter()
        .find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Linear sizing of one territory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerritoryForecast {
    pub country: Country,
    /// Prevalent population, in units.
    pub market_size: Decimal,
    /// Addressable slice of the market, in units.
    pub addressable: Decimal,
    /// The owner's share of the addressable slice, in units.
    pub owner_share: Decimal,
    /// `owner_share × price`, in the base currency.
    pub peak_revenue: Decimal,
}

/// Size a territory.
///
/// All three rate inputs are percentages, not fractions: a prevalence of
/// `0.35` means 0.35% of the population. `price` is per unit in the base
/// currency.
pub fn estimate_territory(
    country: &Country,
    prevalence_pct: Decimal,
    addressable_pct: Decimal,
    share_pct: Decimal,
    price: Decimal,
) -> TerritoryForecast {
    let hundred = dec!(100);
    let population = country.population_millions * Decimal::from(1_000_000u32);
    let market_size = population * prevalence_pct / hundred;
    let addressable = market_size * addressable_pct / hundred;
    let owner_share = addressable * share_pct / hundred;
    let peak_revenue = owner_share * price;
    TerritoryForecast {
        country: country.clone(),
        market_size,
        addressable,
        owner_share,
        peak_revenue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn atlas_codes_are_unique() {
        let all = countries();
        let mut codes: Vec<&str> = all.iter().map(|c| c.code.as_str()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn find_country_is_case_insensitive() {
        assert_eq!(find_country("de").unwrap().name, "Germany");
        assert_eq!(find_country("DE").unwrap().name, "Germany");
        assert!(find_country("XX").is_none());
    }

    #[test]
    fn germany_at_typical_rates() {
        let germany = find_country("DE").unwrap();
        // 83.2m × 0.35% = 291,200 prevalent; 40% addressable = 116,480;
        // 50% share = 58,240 units; at 5.00 = 291,200 peak revenue.
        let forecast = estimate_territory(&germany, dec!(0.35), dec!(40), dec!(50), dec!(5.00));
        assert_eq!(forecast.market_size, dec!(291_200));
        assert_eq!(forecast.addressable, dec!(116_480));
        assert_eq!(forecast.owner_share, dec!(58_240));
        assert_eq!(forecast.peak_revenue, dec!(291_200));
    }

    #[test]
    fn zero_prevalence_zeroes_the_chain() {
        let iceland = find_country("IS").unwrap();
        let forecast = estimate_territory(&iceland, Decimal::ZERO, dec!(40), dec!(50), dec!(9.5));
        assert_eq!(forecast.market_size, Decimal::ZERO);
        assert_eq!(forecast.peak_revenue, Decimal::ZERO);
    }

    #[test]
    fn region_labels_render() {
        assert_eq!(Region::AsiaPacific.label(), "Asia Pacific");
        assert_eq!(find_country("SA").unwrap().region, Region::Gcc);
    }

    proptest! {
        #[test]
        fn model_is_monotone_in_share(
            share_a in 0u32..=100,
            share_b in 0u32..=100,
        ) {
            let france = find_country("FR").unwrap();
            let (lo, hi) = if share_a <= share_b { (share_a, share_b) } else { (share_b, share_a) };
            let f_lo = estimate_territory(&france, dec!(0.35), dec!(40), Decimal::from(lo), dec!(5));
            let f_hi = estimate_territory(&france, dec!(0.35), dec!(40), Decimal::from(hi), dec!(5));
            prop_assert!(f_lo.owner_share <= f_hi.owner_share);
            prop_assert!(f_lo.peak_revenue <= f_hi.peak_revenue);
        }
    }
}
