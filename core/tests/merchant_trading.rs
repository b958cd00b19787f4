//! Merchant wholesale behavior: dispersion screening, price smoothing,
//! the stock ceiling and the capital deduction order.

use microecon_core::{
    economy::Economy,
    merchant,
    rng::RngPool,
    types::{Location, ProductKind},
    SimConfig,
};

fn small_config() -> SimConfig {
    SimConfig {
        firms: 16,
        banks: 3,
        rentiers: 2,
        accounts_per_bank: 8,
        ..SimConfig::default()
    }
}

fn test_economy(seed: u64) -> Economy {
    let mut rng = RngPool::new(seed);
    Economy::init(small_config(), &mut rng)
}

fn blank_market(e: &mut Economy) {
    for f in &mut e.firms {
        f.labour.workers = 0;
        f.labour.is_recruiting = false;
        f.process.finished_stock = 0.0;
    }
}

fn revive_seller(e: &mut Economy, i: usize, kind: ProductKind, stock: f64, price: f64) {
    let f = &mut e.firms[i];
    f.location = Location::West;
    f.labour.workers = 10;
    f.labour.wage_rate = 1.0;
    f.labour.productivity = 10.0;
    f.labour.hours_per_day = 8.0;
    f.labour.days_per_week = 5;
    f.process.product = kind;
    f.process.finished_stock = stock;
    f.sale_value = price;
}

#[test]
fn merchant_stock_never_exceeds_the_ceiling() {
    let mut e = test_economy(1);
    e.config.max_merchant_stock = 500.0;
    blank_market(&mut e);
    revive_seller(&mut e, 1, ProductKind::Grain, 100_000.0, 1.0);
    e.merchant.capital.fictitious = 1_000_000.0;

    merchant::update(&mut e);
    assert!(e.merchant.stock[ProductKind::Grain.index()] <= 500.0);
    assert_eq!(e.merchant.stock[ProductKind::Grain.index()], 500.0);

    // A full shelf stays full, never overfull.
    merchant::update(&mut e);
    assert_eq!(e.merchant.stock[ProductKind::Grain.index()], 500.0);
}

#[test]
fn quoted_price_tracks_seller_price_with_smoothing() {
    let mut e = test_economy(2);
    blank_market(&mut e);
    revive_seller(&mut e, 1, ProductKind::Grain, 1_000.0, 1.0);

    merchant::update(&mut e);
    let first = e.merchant.price[ProductKind::Grain.index()];
    // First quote is set directly: seller price plus the 2% margin.
    assert!((first - 1.02).abs() < 1e-9);

    e.firms[1].sale_value = 2.0;
    e.firms[1].process.finished_stock = 1_000.0;
    merchant::update(&mut e);
    let second = e.merchant.price[ProductKind::Grain.index()];
    // Then a 10% exponential step toward the new target of 2.04.
    assert!((second - (1.02 + (2.04 - 1.02) * 0.1)).abs() < 1e-9);
}

#[test]
fn trade_drains_surplus_before_fictitious() {
    let mut e = test_economy(3);
    blank_market(&mut e);
    revive_seller(&mut e, 1, ProductKind::Grain, 200_000.0, 1.0);
    e.state_mut(Location::West).vat_rate = 10.0;
    e.merchant.capital.surplus = 100.0;
    e.merchant.capital.fictitious = 10_000.0;

    merchant::update(&mut e);

    let bought = e.merchant.stock[ProductKind::Grain.index()];
    assert!(bought > 0.0);
    // Working capital 10,100 split across hedge=2 lines.
    assert!((bought - 5_050.0).abs() < 1e-6);
    assert_eq!(e.merchant.capital.surplus, 0.0);
    assert!((e.merchant.capital.fictitious - (10_000.0 - 4_950.0)).abs() < 1e-6);
    // Seller keeps the proceeds net of VAT.
    assert!((e.firms[1].capital.surplus - (10_000.0 + 5_050.0 * 0.9)).abs() < 1e-6);
}

#[test]
fn only_volatile_markets_are_traded() {
    let mut e = test_economy(4);
    blank_market(&mut e);

    // Grain is dispersed (prices 1.0 and 3.0); cloth is uniform.
    revive_seller(&mut e, 1, ProductKind::Grain, 10.0, 1.0);
    revive_seller(&mut e, 2, ProductKind::Grain, 10.0, 3.0);
    revive_seller(&mut e, 3, ProductKind::Cloth, 10.0, 2.0);
    revive_seller(&mut e, 4, ProductKind::Cloth, 10.0, 2.0);

    merchant::update(&mut e);

    assert!(e.merchant.stock[ProductKind::Grain.index()] > 0.0);
    assert_eq!(e.merchant.stock[ProductKind::Cloth.index()], 0.0);
    // The buy went to the cheapest seller.
    assert!(e.firms[1].process.finished_stock < 10.0);
    assert_eq!(e.firms[2].process.finished_stock, 10.0);
}
