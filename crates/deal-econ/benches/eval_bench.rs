use criterion::{black_box, criterion_group, criterion_main, Criterion};
use deal_core::{
    default_royalty_tiers, DealMode, DealParameters, RoyaltyBase, ServiceFee, ServiceFees,
};
use rust_decimal_macros::dec;

fn transfer_deal() -> DealParameters {
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

fn bench_five_years(c: &mut Criterion) {
    let deal = transfer_deal();
    c.bench_function("five-year transfer-price evaluation", |b| {
        b.iter(|| black_box(deal_econ::evaluate_five_years(black_box(&deal))))
    });

    let mut share_deal = transfer_deal();
    share_deal.mode = DealMode::ProfitShare {
        partner_selling_price: dec!(9.50),
        sla_share: dec!(0.40),
    };
    c.bench_function("five-year profit-share evaluation", |b| {
        b.iter(|| black_box(deal_econ::evaluate_five_years(black_box(&share_deal))))
    });

    c.bench_function("mode comparison", |b| {
        b.iter(|| {
            black_box(deal_econ::compare_modes(
                black_box(&deal),
                DealMode::ProfitShare {
                    partner_selling_price: dec!(9.50),
                    sla_share: dec!(0.40),
                },
            ))
        })
    });
}

criterion_group!(benches, bench_five_years);
criterion_main!(benches);
