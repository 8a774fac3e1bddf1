#![deny(warnings)]

//! Deal-economics evaluation engine.
//!
//! Pure calculation over an explicit [`DealParameters`] value:
//! - volume-tiered unit-cost resolution with optional override
//! - the ordered royalty cascade (each tier deducts from the remainder left
//!   by the tiers before it)
//! - per-year profit evaluation under both deal structures
//! - five-year aggregation with year-scheduled one-off fees
//!
//! No I/O, no shared state: repeated invocation from concurrent callers
//! (e.g. live recomputation in a UI) is safe without coordination. The
//! engine never rejects numeric input; every division is guarded so results
//! stay well-defined for any finite input. Callers wanting up-front
//! rejection use `deal_core::validate_deal`.

use deal_core::{
    DealMode, DealParameters, FiveYearResult, PartnerAnalysis, RoyaltyBase, RoyaltyLine,
    RoyaltyTier, YearlyResult, FORECAST_YEARS,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Volume-tiered production cost: (exclusive upper bound, cost per unit).
/// The first two bands quote the same cost; a later costing round widened
/// the small-batch band without retiring the old row, and the table is kept
/// as quoted.
const COST_BANDS: [(u64, Decimal); 5] = [
    (11_000, dec!(2.19)),
    (22_000, dec!(2.19)),
    (44_000, dec!(1.79)),
    (66_000, dec!(1.49)),
    (110_000, dec!(1.42)),
];

/// Cost per unit beyond the last band.
const COST_ABOVE_BANDS: Decimal = dec!(1.37);

/// Resolve the per-unit production cost for an annual volume.
///
/// An explicit override is returned verbatim, bypassing the table entirely
/// (an override of zero is honored as zero). Volume 0 falls in the first
/// band; the per-unit cost is multiplied by volume elsewhere, so a zero
/// year still yields zero total cost.
pub fn resolve_unit_cost(volume: u64, override_cost: Option<Decimal>) -> Decimal {
    if let Some(cost) = override_cost {
        return cost;
    }
    for (upper, cost) in COST_BANDS {
        if volume < upper {
            return cost;
        }
    }
    COST_ABOVE_BANDS
}

/// Result of one pass through the royalty cascade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CascadeResult {
    /// Per-tier lines in configured order.
    pub breakdown: Vec<RoyaltyLine>,
    /// Total deduction for the year across all tiers.
    pub total_royalties: Decimal,
    /// Per-unit value left to the deal owner after the last tier.
    pub remaining_per_unit: Decimal,
}

/// Run the royalty cascade on a per-unit base.
///
/// Each tier's percentage applies to what is left after all previous tiers'
/// deductions, not to the original base; reordering tiers changes every
/// downstream amount. The base is not clamped here: a negative base
/// propagates negative lines, and the caller decides whether to floor it
/// first (the per-year evaluator does, where its rules say so).
pub fn apply_cascade(
    base_per_unit: Decimal,
    tiers: &[RoyaltyTier],
    volume: u64,
) -> CascadeResult {
    let volume_dec = Decimal::from(volume);
    let mut remaining = base_per_unit;
    let mut total_per_unit = Decimal::ZERO;
    let mut breakdown = Vec::with_capacity(tiers.len());
    for tier in tiers {
        let per_unit = remaining * tier.rate;
        breakdown.push(RoyaltyLine {
            name: tier.name.clone(),
            rate: tier.rate,
            per_unit,
            amount: per_unit * volume_dec,
        });
        total_per_unit += per_unit;
        remaining -= per_unit;
    }
    CascadeResult {
        breakdown,
        total_royalties: total_per_unit * volume_dec,
        remaining_per_unit: remaining,
    }
}

/// `numerator / denominator * 100`, or 0 unless the denominator is strictly
/// positive. Keeps every reported percentage finite.
fn ratio_percent(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator > Decimal::ZERO {
        numerator / denominator * dec!(100)
    } else {
        Decimal::ZERO
    }
}

/// Per-unit share of a yearly total, 0 for a zero-volume year.
fn per_unit(total: Decimal, volume: u64) -> Decimal {
    if volume > 0 {
        total / Decimal::from(volume)
    } else {
        Decimal::ZERO
    }
}

/// Evaluate a single forecast year under the deal's active mode.
///
/// `service_fee_income` is the one-off fee income already attributed to this
/// year; the aggregator derives it from the fee schedule.
pub fn evaluate_year(
    params: &DealParameters,
    year: u8,
    volume: u64,
    service_fee_income: Decimal,
) -> YearlyResult {
    match &params.mode {
        DealMode::TransferPrice {
            transfer_price_per_unit,
            royalty_base,
            partner_selling_price,
        } => transfer_price_year(
            params,
            year,
            volume,
            service_fee_income,
            *transfer_price_per_unit,
            *royalty_base,
            *partner_selling_price,
        ),
        DealMode::ProfitShare {
            partner_selling_price,
            sla_share,
        } => profit_share_year(
            params,
            year,
            volume,
            service_fee_income,
            *partner_selling_price,
            *sla_share,
        ),
    }
}

fn transfer_price_year(
    params: &DealParameters,
    year: u8,
    volume: u64,
    service_fee_income: Decimal,
    price: Decimal,
    royalty_base: RoyaltyBase,
    partner_selling_price: Option<Decimal>,
) -> YearlyResult {
    let volume_dec = Decimal::from(volume);
    let cost = resolve_unit_cost(volume, params.cost_override);
    let revenue = price * volume_dec;
    let total_cost = cost * volume_dec;

    // Royalties cascade either on the raw price or on the owner's per-unit
    // gross, floored at zero so an underwater price cannot produce negative
    // royalty lines.
    let base = match royalty_base {
        RoyaltyBase::OnPrice => price,
        RoyaltyBase::OnPriceMinusCost => (price - cost).max(Decimal::ZERO),
    };
    let cascade = apply_cascade(base, &params.royalty_tiers, volume);

    let net_before_overhead = revenue - total_cost - cascade.total_royalties;
    let overhead = net_before_overhead.max(Decimal::ZERO) * params.overhead_rate;
    let net_profit = net_before_overhead - overhead + service_fee_income;

    // The partner view needs a known end-market price and actual volume.
    let partner_analysis = match partner_selling_price {
        Some(psp) if psp > Decimal::ZERO && volume > 0 => {
            let partner_revenue = psp * volume_dec;
            let partner_margin = partner_revenue - revenue;
            Some(PartnerAnalysis {
                partner_revenue,
                // What the partner pays the deal owner.
                partner_cost: revenue,
                partner_margin,
                partner_margin_percent: ratio_percent(partner_margin, partner_revenue),
            })
        }
        _ => None,
    };

    YearlyResult {
        year,
        sales: volume,
        revenue,
        cost_per_unit: cost,
        total_cost,
        royalty_breakdown: cascade.breakdown,
        total_royalties: cascade.total_royalties,
        overhead,
        service_fee_income,
        net_profit,
        profit_per_unit: per_unit(net_profit, volume),
        profit_margin_percent: ratio_percent(net_profit, revenue),
        partner_analysis,
    }
}

fn profit_share_year(
    params: &DealParameters,
    year: u8,
    volume: u64,
    service_fee_income: Decimal,
    partner_selling_price: Decimal,
    sla_share: Decimal,
) -> YearlyResult {
    let volume_dec = Decimal::from(volume);
    let cost = resolve_unit_cost(volume, params.cost_override);
    let partner_revenue = partner_selling_price * volume_dec;
    let total_cost = cost * volume_dec;

    // The partner's gross profit before the split; the owner's cut of it is
    // this mode's "revenue".
    let gross_profit = partner_revenue - total_cost;
    let owner_share = gross_profit * sla_share;

    // Royalties still cascade per unit, on a synthetic base derived from the
    // owner's share.
    let base = per_unit(owner_share, volume);
    let cascade = apply_cascade(base, &params.royalty_tiers, volume);

    let net_before_overhead = owner_share - cascade.total_royalties;
    let overhead = net_before_overhead.max(Decimal::ZERO) * params.overhead_rate;
    let net_profit = net_before_overhead - overhead + service_fee_income;

    let partner_margin = gross_profit * (Decimal::ONE - sla_share);
    let partner_analysis = Some(PartnerAnalysis {
        partner_revenue,
        partner_cost: total_cost + owner_share,
        partner_margin,
        partner_margin_percent: ratio_percent(partner_margin, partner_revenue),
    });

    YearlyResult {
        year,
        sales: volume,
        revenue: owner_share,
        cost_per_unit: cost,
        total_cost,
        royalty_breakdown: cascade.breakdown,
        total_royalties: cascade.total_royalties,
        overhead,
        service_fee_income,
        net_profit,
        profit_per_unit: per_unit(net_profit, volume),
        profit_margin_percent: ratio_percent(net_profit, owner_share),
        partner_analysis,
    }
}

/// Evaluate all five forecast years and fold them into totals.
///
/// Service-fee income is attributed strictly by the fee's scheduled year.
/// The fold is over immutable per-year results; each year is independent of
/// the others.
pub fn evaluate_five_years(params: &DealParameters) -> FiveYearResult {
    let years: Vec<YearlyResult> = (1..=FORECAST_YEARS as u8)
        .map(|year| {
            let volume = params.forecast_sales[usize::from(year - 1)];
            let income = params.service_fees.income_for_year(year);
            let result = evaluate_year(params, year, volume, income);
            debug!(year, sales = volume, net_profit = %result.net_profit, "evaluated year");
            result
        })
        .collect();

    let total_revenue: Decimal = years.iter().map(|y| y.revenue).sum();
    let total_cost: Decimal = years.iter().map(|y| y.total_cost).sum();
    let total_royalties: Decimal = years.iter().map(|y| y.total_royalties).sum();
    let total_overhead: Decimal = years.iter().map(|y| y.overhead).sum();
    let total_service_fee_income: Decimal = years.iter().map(|y| y.service_fee_income).sum();
    let total_net_profit: Decimal = years.iter().map(|y| y.net_profit).sum();
    let total_partner_margin = if years.iter().any(|y| y.partner_analysis.is_some()) {
        Some(
            years
                .iter()
                .filter_map(|y| y.partner_analysis.as_ref())
                .map(|p| p.partner_margin)
                .sum(),
        )
    } else {
        None
    };
    let average_margin_percent = ratio_percent(total_net_profit, total_revenue);

    FiveYearResult {
        years,
        total_revenue,
        total_cost,
        total_royalties,
        total_overhead,
        total_service_fee_income,
        total_net_profit,
        average_margin_percent,
        total_partner_margin,
    }
}

/// Side-by-side evaluation of one deal under two structures.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModeComparison {
    /// The deal as configured.
    pub primary: FiveYearResult,
    /// The same volumes, tiers, overhead rate and cost basis under the
    /// substituted mode.
    pub alternate: FiveYearResult,
}

/// Evaluate the configured deal and, independently, the same deal with its
/// mode replaced by `alternate_mode`.
///
/// The two evaluations share nothing but the input parameters; neither
/// reads or mutates the other's result.
pub fn compare_modes(params: &DealParameters, alternate_mode: DealMode) -> ModeComparison {
    let primary = evaluate_five_years(params);
    let mut alternate_params = params.clone();
    alternate_params.mode = alternate_mode;
    let alternate = evaluate_five_years(&alternate_params);
    ModeComparison { primary, alternate }
}
