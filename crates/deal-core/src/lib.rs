#![deny(warnings)]

//! Core domain models and invariants for deal-desk.
//!
//! This crate defines the serializable types shared across the workspace
//! with validation helpers to guarantee basic invariants. It carries no
//! calculation logic; see `deal-econ` for the evaluation engine.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of forecast years covered by every deal evaluation.
pub const FORECAST_YEARS: usize = 5;

/// A named royalty obligation within the cascade.
///
/// Order matters: each tier's rate applies to whatever per-unit value is left
/// after all previous tiers' deductions, so reordering tiers changes every
/// downstream amount.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoyaltyTier {
    /// Royalty holder, e.g. "KammPhillips".
    pub name: String,
    /// Rate as a fraction in [0, 1).
    pub rate: Decimal,
}

impl RoyaltyTier {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, rate: Decimal) -> Self {
        Self {
            name: name.into(),
            rate,
        }
    }
}

/// The five-tier cascade most deals inherit from the legacy deal book.
///
/// An explicit value, not a global: callers pass it (or a substitute) into
/// [`DealParameters`], so a deal can carry a different tier set without
/// touching shared state.
pub fn default_royalty_tiers() -> Vec<RoyaltyTier> {
    vec![
        RoyaltyTier::new("KammPhillips", dec!(0.15)),
        RoyaltyTier::new("Emin", dec!(0.075)),
        RoyaltyTier::new("Lubowski", dec!(0.15)),
        RoyaltyTier::new("Pharmula", dec!(0.10)),
        RoyaltyTier::new("Aspire", dec!(0.04)),
    ]
}

/// A one-off payment attributed to a single forecast year.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceFee {
    /// Fee amount in the base currency (>= 0).
    pub amount: Decimal,
    /// Forecast year the fee lands in (1..=3).
    pub year: u8,
}

impl ServiceFee {
    /// Convenience constructor.
    pub fn new(amount: Decimal, year: u8) -> Self {
        Self { amount, year }
    }
}

/// The three contract milestones, each independently scheduled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceFees {
    pub signing: ServiceFee,
    pub approval: ServiceFee,
    pub launch: ServiceFee,
}

impl ServiceFees {
    /// Total fee income scheduled for `year`.
    ///
    /// A fee contributes to its own year only and is counted exactly once,
    /// even when its amount is zero.
    pub fn income_for_year(&self, year: u8) -> Decimal {
        [&self.signing, &self.approval, &self.launch]
            .into_iter()
            .filter(|fee| fee.year == year)
            .map(|fee| fee.amount)
            .sum()
    }

    /// Sum of all three fee amounts, regardless of schedule.
    pub fn total(&self) -> Decimal {
        self.signing.amount + self.approval.amount + self.launch.amount
    }
}

impl Default for ServiceFees {
    /// Zero fees on the customary schedule: signing in year 1, approval in
    /// year 2, launch in year 3.
    fn default() -> Self {
        Self {
            signing: ServiceFee::new(Decimal::ZERO, 1),
            approval: ServiceFee::new(Decimal::ZERO, 2),
            launch: ServiceFee::new(Decimal::ZERO, 3),
        }
    }
}

/// Which per-unit base the royalty cascade runs on in transfer-price deals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoyaltyBase {
    /// Cascade on the raw transfer price.
    OnPrice,
    /// Cascade on transfer price minus unit cost, floored at zero.
    OnPriceMinusCost,
}

/// The two deal structures, as a tagged variant.
///
/// Both share the cost resolver and the royalty cascade; they diverge in how
/// the owner's revenue and the cascade base are derived.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealMode {
    /// Fixed per-unit price charged to the partner.
    TransferPrice {
        /// Price per unit in the base currency.
        transfer_price_per_unit: Decimal,
        /// Base selector for the royalty cascade.
        royalty_base: RoyaltyBase,
        /// Partner's end-market selling price, if known. Enables the
        /// mirrored partner-side profit view.
        partner_selling_price: Option<Decimal>,
    },
    /// Owner takes an agreed share of the partner's gross profit.
    ProfitShare {
        /// Partner's end-market selling price per unit.
        partner_selling_price: Decimal,
        /// Owner's share of the partner's gross profit, as a fraction.
        sla_share: Decimal,
    },
}

/// Complete input to a deal evaluation. Immutable per call; results are pure
/// functions of this value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DealParameters {
    /// Annual unit volumes, index 0 = year 1.
    pub forecast_sales: [u64; FORECAST_YEARS],
    /// Ordered royalty cascade.
    pub royalty_tiers: Vec<RoyaltyTier>,
    /// Overhead charged on non-negative pre-overhead profit, as a fraction.
    pub overhead_rate: Decimal,
    /// Explicit per-unit cost. `None` means resolve from the volume tiers;
    /// `Some(0)` is a genuine zero-cost override, not "absent".
    pub cost_override: Option<Decimal>,
    /// One-off milestone fees.
    pub service_fees: ServiceFees,
    /// Active deal structure.
    pub mode: DealMode,
}

/// One tier's contribution within a year's royalty cascade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoyaltyLine {
    pub name: String,
    /// The tier's configured rate.
    pub rate: Decimal,
    /// Deduction per unit, computed on the post-cascade remainder.
    pub per_unit: Decimal,
    /// Deduction for the whole year (`per_unit * sales`).
    pub amount: Decimal,
}

/// Mirrored profit view for the counterparty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartnerAnalysis {
    /// Partner's end-market revenue.
    pub partner_revenue: Decimal,
    /// What the partner pays out (to the owner, plus production where the
    /// partner carries it).
    pub partner_cost: Decimal,
    /// Partner's margin in currency.
    pub partner_margin: Decimal,
    /// Partner's margin as a percentage of partner revenue, 0 when revenue
    /// is 0.
    pub partner_margin_percent: Decimal,
}

/// Complete result for a single forecast year.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct YearlyResult {
    /// Forecast year, 1..=5.
    pub year: u8,
    /// Unit volume evaluated.
    pub sales: u64,
    /// Owner revenue: transfer-price receipts, or the owner's share of the
    /// partner's gross profit in profit-share deals.
    pub revenue: Decimal,
    /// Resolved per-unit production cost.
    pub cost_per_unit: Decimal,
    /// Production cost for the year.
    pub total_cost: Decimal,
    /// Cascade breakdown, preserving tier order.
    pub royalty_breakdown: Vec<RoyaltyLine>,
    /// Sum of all royalty deductions.
    pub total_royalties: Decimal,
    /// Overhead charged on non-negative pre-overhead profit; 0 in a
    /// loss-making year.
    pub overhead: Decimal,
    /// One-off fee income landing in this year.
    pub service_fee_income: Decimal,
    /// Net profit after cost, royalties, overhead and fee income.
    pub net_profit: Decimal,
    /// Net profit per unit, 0 when sales are 0.
    pub profit_per_unit: Decimal,
    /// Net margin on owner revenue, always finite, 0 when revenue is 0.
    pub profit_margin_percent: Decimal,
    /// Partner-side view, where the inputs allow one.
    pub partner_analysis: Option<PartnerAnalysis>,
}

/// Five-year aggregation of [`YearlyResult`]s.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FiveYearResult {
    /// Per-year results in year order (always [`FORECAST_YEARS`] entries).
    pub years: Vec<YearlyResult>,
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub total_royalties: Decimal,
    pub total_overhead: Decimal,
    pub total_service_fee_income: Decimal,
    pub total_net_profit: Decimal,
    /// `total_net_profit / total_revenue * 100`, 0 when revenue is 0.
    pub average_margin_percent: Decimal,
    /// Sum of partner margins across years; `None` when no year produced a
    /// partner view.
    pub total_partner_margin: Option<Decimal>,
}

/// Validation errors for deal invariants.
///
/// The evaluation engine never rejects input (it stays numerically total);
/// these helpers exist for callers that want to refuse nonsensical deals up
/// front.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Royalty rates must be fractions in [0, 1).
    #[error("royalty rate {0} is outside [0, 1)")]
    RateOutOfRange(Decimal),
    /// Shares and overhead must be fractions in [0, 1].
    #[error("fraction {0} is outside [0, 1]")]
    FractionOutOfRange(Decimal),
    /// Monetary inputs must be non-negative.
    #[error("negative monetary value is invalid")]
    NegativeMoney,
    /// Service fees land in years 1 through 3.
    #[error("service fee year {0} is outside [1, 3]")]
    FeeYearOutOfRange(u8),
    /// Tier names identify royalty holders and must not be blank.
    #[error("royalty tier name must not be empty")]
    EmptyTierName,
}

/// Validate a single royalty tier.
pub fn validate_tier(tier: &RoyaltyTier) -> Result<(), ValidationError> {
    if tier.name.trim().is_empty() {
        return Err(ValidationError::EmptyTierName);
    }
    if tier.rate < Decimal::ZERO || tier.rate >= Decimal::ONE {
        return Err(ValidationError::RateOutOfRange(tier.rate));
    }
    Ok(())
}

/// Validate the fee schedule.
pub fn validate_service_fees(fees: &ServiceFees) -> Result<(), ValidationError> {
    for fee in [&fees.signing, &fees.approval, &fees.launch] {
        if fee.amount < Decimal::ZERO {
            return Err(ValidationError::NegativeMoney);
        }
        if !(1..=3).contains(&fee.year) {
            return Err(ValidationError::FeeYearOutOfRange(fee.year));
        }
    }
    Ok(())
}

fn validate_fraction(value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(ValidationError::FractionOutOfRange(value));
    }
    Ok(())
}

/// Validate a complete parameter set, including mode-specific fields.
pub fn validate_deal(params: &DealParameters) -> Result<(), ValidationError> {
    for tier in &params.royalty_tiers {
        validate_tier(tier)?;
    }
    validate_fraction(params.overhead_rate)?;
    if let Some(cost) = params.cost_override {
        if cost < Decimal::ZERO {
            return Err(ValidationError::NegativeMoney);
        }
    }
    validate_service_fees(&params.service_fees)?;
    match &params.mode {
        DealMode::TransferPrice {
            transfer_price_per_unit,
            partner_selling_price,
            ..
        } => {
            if *transfer_price_per_unit < Decimal::ZERO {
                return Err(ValidationError::NegativeMoney);
            }
            if let Some(psp) = partner_selling_price {
                if *psp < Decimal::ZERO {
                    return Err(ValidationError::NegativeMoney);
                }
            }
        }
        DealMode::ProfitShare {
            partner_selling_price,
            sla_share,
        } => {
            if *partner_selling_price < Decimal::ZERO {
                return Err(ValidationError::NegativeMoney);
            }
            validate_fraction(*sla_share)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_deal() -> DealParameters {
        DealParameters {
            forecast_sales: [22_000, 45_000, 60_000, 85_000, 120_000],
            royalty_tiers: default_royalty_tiers(),
            overhead_rate: dec!(0.05),
            cost_override: None,
            service_fees: ServiceFees {
                signing: ServiceFee::new(dec!(50_000), 1),
                approval: ServiceFee::new(dec!(25_000), 2),
                launch: ServiceFee::new(dec!(25_000), 3),
            },
            mode: DealMode::TransferPrice {
                transfer_price_per_unit: dec!(5.00),
                royalty_base: RoyaltyBase::OnPrice,
                partner_selling_price: Some(dec!(9.50)),
            },
        }
    }

    #[test]
    fn serde_roundtrip_deal_parameters() {
        let deal = sample_deal();
        let s = serde_json::to_string_pretty(&deal).unwrap();
        let back: DealParameters = serde_json::from_str(&s).unwrap();
        assert_eq!(back, deal);
    }

    #[test]
    fn deal_mode_uses_snake_case_tags() {
        let deal = sample_deal();
        let s = serde_json::to_string(&deal).unwrap();
        assert!(s.contains("transfer_price"));
        assert!(s.contains("on_price"));
    }

    #[test]
    fn default_tiers_are_ordered() {
        let tiers = default_royalty_tiers();
        assert_eq!(tiers.len(), 5);
        assert_eq!(tiers[0].name, "KammPhillips");
        assert_eq!(tiers[4].name, "Aspire");
        assert_eq!(tiers[1].rate, dec!(0.075));
    }

    #[test]
    fn fee_income_lands_in_its_own_year_only() {
        let fees = ServiceFees {
            signing: ServiceFee::new(dec!(10_000), 1),
            approval: ServiceFee::new(dec!(5_000), 2),
            launch: ServiceFee::new(dec!(7_500), 2),
        };
        assert_eq!(fees.income_for_year(1), dec!(10_000));
        assert_eq!(fees.income_for_year(2), dec!(12_500));
        assert_eq!(fees.income_for_year(3), Decimal::ZERO);
        assert_eq!(fees.income_for_year(4), Decimal::ZERO);
    }

    #[test]
    fn zero_amount_fee_still_counts_once() {
        let fees = ServiceFees {
            signing: ServiceFee::new(Decimal::ZERO, 2),
            ..ServiceFees::default()
        };
        assert_eq!(fees.income_for_year(2), Decimal::ZERO);
        assert_eq!(fees.total(), Decimal::ZERO);
    }

    #[test]
    fn validate_rejects_rate_of_one() {
        let tier = RoyaltyTier::new("All", Decimal::ONE);
        assert_eq!(
            validate_tier(&tier),
            Err(ValidationError::RateOutOfRange(Decimal::ONE))
        );
    }

    #[test]
    fn validate_rejects_blank_tier_name() {
        let tier = RoyaltyTier::new("  ", dec!(0.1));
        assert_eq!(validate_tier(&tier), Err(ValidationError::EmptyTierName));
    }

    #[test]
    fn validate_rejects_fee_year_out_of_schedule() {
        let mut deal = sample_deal();
        deal.service_fees.launch.year = 4;
        assert_eq!(
            validate_deal(&deal),
            Err(ValidationError::FeeYearOutOfRange(4))
        );
    }

    #[test]
    fn validate_rejects_negative_transfer_price() {
        let mut deal = sample_deal();
        deal.mode = DealMode::TransferPrice {
            transfer_price_per_unit: dec!(-1),
            royalty_base: RoyaltyBase::OnPrice,
            partner_selling_price: None,
        };
        assert_eq!(validate_deal(&deal), Err(ValidationError::NegativeMoney));
    }

    #[test]
    fn validate_rejects_profit_share_above_one() {
        let mut deal = sample_deal();
        deal.mode = DealMode::ProfitShare {
            partner_selling_price: dec!(10),
            sla_share: dec!(1.2),
        };
        assert_eq!(
            validate_deal(&deal),
            Err(ValidationError::FractionOutOfRange(dec!(1.2)))
        );
    }

    #[test]
    fn zero_cost_override_is_distinct_from_absent() {
        let mut deal = sample_deal();
        deal.cost_override = Some(Decimal::ZERO);
        assert!(validate_deal(&deal).is_ok());
        let s = serde_json::to_string(&deal).unwrap();
        let back: DealParameters = serde_json::from_str(&s).unwrap();
        assert_eq!(back.cost_override, Some(Decimal::ZERO));
    }

    proptest! {
        #[test]
        fn scheduled_fees_are_counted_exactly_once(
            amounts in proptest::array::uniform3(0u64..1_000_000),
            years in proptest::array::uniform3(1u8..=3),
        ) {
            let fees = ServiceFees {
                signing: ServiceFee::new(Decimal::from(amounts[0]), years[0]),
                approval: ServiceFee::new(Decimal::from(amounts[1]), years[1]),
                launch: ServiceFee::new(Decimal::from(amounts[2]), years[2]),
            };
            let spread: Decimal = (1..=FORECAST_YEARS as u8)
                .map(|y| fees.income_for_year(y))
                .sum();
            prop_assert_eq!(spread, fees.total());
        }

        #[test]
        fn fractional_rates_validate(cents in 0u32..10_000) {
            let tier = RoyaltyTier::new("T", Decimal::new(cents as i64, 5));
            prop_assert!(validate_tier(&tier).is_ok());
        }
    }
}
