#![deny(warnings)]

//! Headless CLI: evaluates a licensing deal over the five-year horizon and
//! prints the per-year economics, optionally side by side with the
//! alternate deal structure.

use anyhow::{anyhow, Context, Result};
use deal_core::{
    default_royalty_tiers, validate_deal, DealMode, DealParameters, FiveYearResult, RoyaltyBase,
    ServiceFee, ServiceFees,
};
use deal_econ::{compare_modes, evaluate_five_years};
use deal_fx::{convert, Currency, RateTable};
use persistence::JsonStore;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

struct Args {
    deal_path: Option<String>,
    book_path: Option<String>,
    currency: Option<String>,
    compare: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        deal_path: None,
        book_path: None,
        currency: None,
        compare: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--deal" => args.deal_path = it.next(),
            "--book" => args.book_path = it.next(),
            "--currency" => args.currency = it.next(),
            "--compare" => args.compare = true,
            _ => {}
        }
    }
    args
}

/// A representative transfer-price deal for runs without `--deal`.
fn demo_deal() -> DealParameters {
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

/// Derive the natural counterpart structure for a side-by-side view.
/// Presentation glue only: the engine never invents prices itself.
fn counterpart_mode(mode: &DealMode) -> Option<DealMode> {
    match mode {
        DealMode::TransferPrice {
            partner_selling_price: Some(psp),
            ..
        } => Some(DealMode::ProfitShare {
            partner_selling_price: *psp,
            sla_share: dec!(0.40),
        }),
        DealMode::TransferPrice {
            partner_selling_price: None,
            ..
        } => None,
        DealMode::ProfitShare {
            partner_selling_price,
            ..
        } => Some(DealMode::TransferPrice {
            transfer_price_per_unit: *partner_selling_price,
            royalty_base: RoyaltyBase::OnPrice,
            partner_selling_price: Some(*partner_selling_price),
        }),
    }
}

struct MoneyDisplay {
    currency: Currency,
    rates: RateTable,
}

impl MoneyDisplay {
    fn money(&self, amount: Decimal) -> Result<String> {
        let shown = convert(amount, Currency::BASE, self.currency, &self.rates)?;
        Ok(format!("{}{}", self.currency.symbol(), shown.round_dp(2)))
    }
}

fn print_five_years(label: &str, result: &FiveYearResult, display: &MoneyDisplay) -> Result<()> {
    println!("{label}");
    for year in &result.years {
        println!(
            "  Y{} | units: {:>8} | revenue: {:>14} | COGS: {:>13} | royalties: {:>13} | overhead: {:>12} | fees: {:>11} | net: {:>14} | margin: {:>7}%",
            year.year,
            year.sales,
            display.money(year.revenue)?,
            display.money(year.total_cost)?,
            display.money(year.total_royalties)?,
            display.money(year.overhead)?,
            display.money(year.service_fee_income)?,
            display.money(year.net_profit)?,
            year.profit_margin_percent.round_dp(1),
        );
    }
    println!(
        "  5Y | revenue: {} | net profit: {} | avg margin: {}%",
        display.money(result.total_revenue)?,
        display.money(result.total_net_profit)?,
        result.average_margin_percent.round_dp(1),
    );
    if let Some(partner_margin) = result.total_partner_margin {
        println!("  5Y | partner margin: {}", display.money(partner_margin)?);
    }
    Ok(())
}

fn evaluate_and_print(deal: &DealParameters, compare: bool, display: &MoneyDisplay) -> Result<()> {
    validate_deal(deal).map_err(|e| anyhow!("invalid deal: {e}"))?;
    let result = evaluate_five_years(deal);
    print_five_years("Configured structure:", &result, display)?;

    if compare {
        match counterpart_mode(&deal.mode) {
            Some(alternate) => {
                let comparison = compare_modes(deal, alternate);
                print_five_years("Alternate structure:", &comparison.alternate, display)?;
                let delta =
                    comparison.primary.total_net_profit - comparison.alternate.total_net_profit;
                println!("  Configured minus alternate net profit: {}", display.money(delta)?);
            }
            None => {
                println!("No counterpart structure: set a partner selling price to compare.")
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    info!(build = env!("GIT_SHA"), "deal-desk CLI starting");

    let currency = match &args.currency {
        Some(code) => code.parse::<Currency>()?,
        None => Currency::BASE,
    };
    let display = MoneyDisplay {
        currency,
        rates: RateTable::fallback(),
    };

    if let Some(book_path) = &args.book_path {
        let store = JsonStore::new(book_path);
        let doc = store.load()?;
        if doc.deals.is_empty() {
            println!("Deal book at {book_path} is empty.");
            return Ok(());
        }
        for record in &doc.deals {
            println!(
                "== {} ({:?}, added {}) | territories: {}",
                record.company_name, record.deal_type, record.added_on, record.countries_display
            );
            evaluate_and_print(&record.parameters, args.compare, &display)?;
        }
        return Ok(());
    }

    let deal = match &args.deal_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading deal file {path}"))?;
            serde_json::from_str::<DealParameters>(&raw)
                .with_context(|| format!("parsing deal file {path}"))?
        }
        None => demo_deal(),
    };
    evaluate_and_print(&deal, args.compare, &display)
}
