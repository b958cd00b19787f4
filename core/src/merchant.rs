//! The merchant engine: wholesale buy-side and implicit price support.
//!
//! Each tick the merchant screens every traded product for price
//! dispersion and buys only in the volatile half of the range, from the
//! globally cheapest seller, splitting its investable capital evenly
//! across `hedge` product lines.

use crate::{capital::Capital, config::SimConfig, economy::Economy, types::ProductKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Merchant {
    pub capital: Capital,
    /// Target markup over the cheapest seller, in percent.
    pub interest_rate: f64,
    pub hedge: u32,
    pub stock: [f64; ProductKind::COUNT],
    pub price: [f64; ProductKind::COUNT],
}

impl Merchant {
    pub fn new(config: &SimConfig) -> Self {
        let capital = Capital {
            fictitious: config.initial_merchant_deposit,
            fixed_cost: 10.0,
            ..Capital::default()
        };
        Merchant {
            capital,
            interest_rate: config.merchant_margin,
            hedge: config.merchant_hedge.max(1),
            stock: [0.0; ProductKind::COUNT],
            price: [0.0; ProductKind::COUNT],
        }
    }
}

/// One merchant tick: trade, then commit history.
pub fn update(e: &mut Economy) {
    trade(e);
    e.merchant.capital.push_history();
}

fn trade(e: &mut Economy) {
    let max_stock = e.config.max_merchant_stock;
    let tranche = e.merchant.capital.working() / f64::from(e.merchant.hedge);

    // Dispersion range across products still under the stock ceiling.
    // Zero acts as "unset" for both ends of the range.
    let mut dispersion_min = 0.0;
    let mut dispersion_max = 0.0;
    for kind in ProductKind::TRADED {
        if e.merchant.stock[kind.index()] > max_stock {
            continue;
        }
        let d = e.price_dispersion(kind);
        if dispersion_max == 0.0 || d > dispersion_max {
            dispersion_max = d;
        }
        if dispersion_min == 0.0 || d < dispersion_min {
            dispersion_min = d;
        }
    }
    let threshold = dispersion_min + (dispersion_max - dispersion_min) / 2.0;

    for kind in ProductKind::TRADED {
        let k = kind.index();
        if e.merchant.stock[k] > max_stock {
            continue;
        }
        // Prefer volatile markets, where the spread is worth capturing.
        if e.price_dispersion(kind) < threshold {
            continue;
        }
        let Some(seller) = e.best_price(kind, None, false) else {
            continue;
        };
        let sale_value = e.firms[seller].sale_value;

        // Quote toward seller price plus margin, with 10% smoothing.
        let target_price = sale_value * (1.0 + e.merchant.interest_rate / 100.0);
        if e.merchant.price[k] == 0.0 {
            e.merchant.price[k] = target_price;
        } else {
            e.merchant.price[k] += (target_price - e.merchant.price[k]) * 0.1;
        }

        let mut buy = tranche / sale_value;
        if buy <= 1.0 {
            continue;
        }
        buy = buy.min(e.firms[seller].process.finished_stock);
        buy = buy.min(max_stock - e.merchant.stock[k]);
        if buy <= 1.0 {
            continue;
        }

        let value = sale_value * buy;
        let location = e.firms[seller].location;
        let vat = value * e.state(location).vat_rate / 100.0;

        e.firms[seller].process.finished_stock =
            (e.firms[seller].process.finished_stock - buy).max(0.0);
        e.merchant.stock[k] += buy;
        e.merchant.capital.subtract(value);
        e.firms[seller].capital.surplus += value - vat;
        e.state_mut(location).capital.surplus += vat;

        log::debug!("merchant bought {buy:.0} {kind:?} from firm {seller} at {sale_value:.2}");
    }
}
