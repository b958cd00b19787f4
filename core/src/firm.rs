//! The firm engine: production, pricing, procurement, labour strategy.
//!
//! A firm is defunct exactly when its workforce is zero; the slot stays
//! resident and is reused by the startup pass. All derived quantities
//! are pure functions of current state, recomputed on every call.

use crate::{
    bank,
    capital::Capital,
    config::SimConfig,
    economy::Economy,
    rng::EntityRng,
    types::{EntityRef, Location, ProductKind, PROCESS_INPUTS},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Labour {
    pub workers: u32,
    pub wage_rate: f64,
    pub productivity: f64,
    pub days_per_week: u32,
    pub hours_per_day: f64,
    pub is_recruiting: bool,
    /// Workforce the firm was (re)started with; anchors the
    /// diminishing-returns productivity curve.
    pub initial_workers: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Process {
    /// Never `Primitive`: firms always produce a tradeable good.
    pub product: ProductKind,
    /// Inputs may be `Primitive` (free, unlimited).
    pub inputs: [ProductKind; PROCESS_INPUTS],
    pub input_stock: [f64; PROCESS_INPUTS],
    pub finished_stock: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Firm {
    pub location: Location,
    pub capital: Capital,
    pub labour: Labour,
    pub process: Process,
    pub sale_value: f64,
}

impl Firm {
    /// A brand-new firm at a random location.
    pub fn spawn(config: &SimConfig, rng: &mut EntityRng) -> Self {
        let location = Location::from_index(rng.next_u64_below(Location::COUNT as u64) as usize);
        let mut firm = Firm {
            location,
            capital: Capital::default(),
            labour: Labour {
                workers: 0,
                wage_rate: 0.0,
                productivity: 0.0,
                days_per_week: 0,
                hours_per_day: 0.0,
                is_recruiting: false,
                initial_workers: config.initial_workers,
            },
            process: Process {
                product: ProductKind::Grain,
                inputs: [ProductKind::Primitive; PROCESS_INPUTS],
                input_stock: [0.0; PROCESS_INPUTS],
                finished_stock: 0.0,
            },
            sale_value: 0.0,
        };
        firm.randomize(config, rng);
        firm
    }

    /// Reinitialize in place with fresh random process and labour
    /// parameters. The location is fixed for the lifetime of the slot,
    /// so the startup pass always drains the pool it tested.
    pub fn randomize(&mut self, config: &SimConfig, rng: &mut EntityRng) {
        // The product made is always non-primitive.
        let product =
            ProductKind::TRADED[rng.next_u64_below(ProductKind::TRADED.len() as u64) as usize];
        let mut inputs = [product; PROCESS_INPUTS];
        for input in &mut inputs {
            // Inputs can be primitive, but never the firm's own product.
            while *input == product {
                *input = ProductKind::from_index(
                    rng.next_u64_below(ProductKind::COUNT as u64) as usize,
                );
            }
        }
        self.process = Process {
            product,
            inputs,
            input_stock: [0.0; PROCESS_INPUTS],
            finished_stock: 0.0,
        };
        self.labour = Labour {
            workers: config.initial_workers,
            wage_rate: rng.range_f64(config.min_wage, config.max_wage),
            productivity: rng.range_f64(config.min_productivity, config.max_productivity),
            days_per_week: rng.range_u32(config.min_days_per_week, config.max_days_per_week),
            hours_per_day: rng.range_f64(config.min_working_day, config.max_working_day),
            is_recruiting: false,
            initial_workers: config.initial_workers,
        };
        self.capital = Capital::with_deposit(config.initial_firm_deposit);
        self.capital.fixed_cost = config.firm_overhead_per_worker;
        self.sale_value = config.initial_sale_value;
    }

    pub fn is_defunct(&self) -> bool {
        self.labour.workers == 0
    }

    /// Diminishing-returns curve: each additional worker produces less.
    pub fn productivity_per_worker(&self) -> f64 {
        self.labour.productivity * f64::from(self.labour.initial_workers)
            / (1.0 + f64::from(self.labour.workers))
    }

    pub fn fixed_cost_per_day(&self) -> f64 {
        self.capital.fixed_cost * f64::from(self.labour.workers)
    }

    pub fn variable_cost_per_day(&self) -> f64 {
        self.labour.wage_rate * self.labour.hours_per_day * f64::from(self.labour.workers)
    }

    pub fn max_output_per_day(&self) -> f64 {
        self.productivity_per_worker() * self.labour.hours_per_day * f64::from(self.labour.workers)
    }

    /// Units the scarcest raw material allows right now.
    pub fn limiting_input_stock(&self) -> f64 {
        self.process
            .input_stock
            .iter()
            .fold(f64::INFINITY, |acc, &s| acc.min(s))
    }

    /// A firm cannot produce faster than its scarcest input allows.
    pub fn feasible_output_per_day(&self) -> f64 {
        self.max_output_per_day().min(self.limiting_input_stock())
    }

    pub fn loan_repayment_per_day(&self) -> f64 {
        self.capital.repayment_per_month / 30.0
    }

    fn costs_per_day(&self) -> f64 {
        self.variable_cost_per_day() + self.fixed_cost_per_day() + self.loan_repayment_per_day()
    }

    /// Planning figure: assumes raw materials are not the bottleneck.
    /// Drives hiring, layoffs, pricing and loan decisions.
    pub fn surplus_per_day(&self) -> f64 {
        self.sale_value * self.max_output_per_day() - self.costs_per_day()
    }

    /// Realized figure: capped by the scarcest raw material.
    /// This is what production actually accrues.
    pub fn surplus_per_day_actual(&self) -> f64 {
        self.sale_value * self.feasible_output_per_day() - self.costs_per_day()
    }

    /// Proxy valuation used by the merger pass, not a liquidation value.
    pub fn worth(&self) -> f64 {
        self.capital.surplus + self.variable_cost_per_day() + self.fixed_cost_per_day()
    }
}

/// One firm tick: procure, produce, strategize, commit history.
/// Callers skip defunct firms; the guard here is for direct use.
pub fn update(e: &mut Economy, idx: usize, weeks: u32) {
    if e.firms[idx].is_defunct() {
        return;
    }
    purchase(e, idx, weeks);
    produce(&mut e.firms[idx], weeks);
    strategize(e, idx);
    e.firms[idx].capital.push_history();
}

/// Top up each raw-material slot toward the stock needed to run at full
/// output for the whole period. Primitive inputs are free; the rest come
/// from the merchant first, then the cheapest local seller.
pub fn purchase(e: &mut Economy, idx: usize, weeks: u32) {
    for slot in 0..PROCESS_INPUTS {
        let (kind, target) = {
            let f = &e.firms[idx];
            let days = f64::from(f.labour.days_per_week * weeks);
            (f.process.inputs[slot], f.max_output_per_day() * days)
        };

        if kind.is_primitive() {
            let deficit = target - e.firms[idx].process.input_stock[slot];
            if deficit > 0.0 {
                e.firms[idx].process.input_stock[slot] += deficit;
            }
            continue;
        }

        let deficit = target - e.firms[idx].process.input_stock[slot];
        buy_from_merchant(e, idx, slot, deficit);

        let deficit = target - e.firms[idx].process.input_stock[slot];
        buy_locally(e, idx, slot, deficit);
    }
}

/// Buy up to `quantity` units of input `slot` from the merchant, capped
/// by merchant stock and the firm's cash. VAT on the trade is credited
/// to the firm's local state.
fn buy_from_merchant(e: &mut Economy, idx: usize, slot: usize, quantity: f64) {
    if quantity < 1.0 {
        return;
    }
    let kind = e.firms[idx].process.inputs[slot];
    let k = kind.index();
    let price = e.merchant.price[k];
    let available = e.merchant.stock[k];
    if available <= 0.0 || price <= 0.0 {
        return;
    }

    let mut buy = quantity.min(available);
    if buy * price > e.firms[idx].capital.surplus {
        buy = e.firms[idx].capital.surplus / price;
    }
    if buy < 1.0 {
        return;
    }

    let value = buy * price;
    let loc = e.firms[idx].location;
    let vat = value * e.state(loc).vat_rate / 100.0;

    e.merchant.stock[k] -= buy;
    e.firms[idx].process.input_stock[slot] += buy;
    e.firms[idx].capital.surplus = (e.firms[idx].capital.surplus - value).max(0.0);
    e.merchant.capital.surplus += value - vat;
    e.state_mut(loc).capital.surplus += vat;
}

/// Buy up to `quantity` units from same-location firms, cheapest seller
/// first, while cash and sellers last. Both sides clamp at zero.
fn buy_locally(e: &mut Economy, idx: usize, slot: usize, mut quantity: f64) {
    if quantity < 1.0 {
        return;
    }
    let kind = e.firms[idx].process.inputs[slot];

    while quantity > 0.0 && e.firms[idx].capital.surplus > 0.0 {
        let Some(seller) = e.best_price(kind, Some(idx), true) else {
            break;
        };
        let price = e.firms[seller].sale_value;
        let available = e.firms[seller].process.finished_stock;

        let mut buy = quantity.min(available);
        if buy * price > e.firms[idx].capital.surplus {
            buy = e.firms[idx].capital.surplus / price;
        }

        let value = price * buy;
        e.firms[idx].capital.surplus = (e.firms[idx].capital.surplus - value).max(0.0);
        e.firms[seller].capital.surplus += value;
        e.firms[idx].process.input_stock[slot] += buy;
        e.firms[seller].process.finished_stock = (available - buy).max(0.0);
        quantity -= buy;
    }
}

/// Run production for as many days as the period and the raw-material
/// runway allow. Surplus accrues at the realized rate; finished stock
/// grows and inputs deplete at the feasible output rate.
pub fn produce(f: &mut Firm, weeks: u32) {
    let requested = f.labour.days_per_week * weeks;
    let per_day = f.max_output_per_day();
    let days = if per_day > 0.0 {
        requested.min((f.limiting_input_stock() / per_day).floor() as u32)
    } else {
        requested
    };
    if days == 0 {
        return;
    }

    let out = f.feasible_output_per_day();
    let elapsed = f64::from(days);
    f.capital.surplus += f.surplus_per_day_actual() * elapsed;
    f.process.finished_stock += out * elapsed;
    for stock in &mut f.process.input_stock {
        *stock = (*stock - out * elapsed).max(0.0);
    }
}

/// Post-production decisions: distress borrowing, the recruiting flag,
/// layoffs, and the pricing nudge against the local market average.
pub fn strategize(e: &mut Economy, idx: usize) {
    if e.firms[idx].is_defunct() {
        return;
    }
    let existing_surplus = e.firms[idx].surplus_per_day();

    if existing_surplus < 0.0 {
        obtain_loan(e, idx);
    }

    // Would one more worker improve the daily surplus? The flag, not an
    // actual hire, is what the labour-market pass consumes.
    {
        let max_workers = e.config.max_workers;
        let f = &mut e.firms[idx];
        f.labour.is_recruiting = false;
        if f.labour.workers < max_workers {
            f.labour.workers += 1;
            let possible_surplus = f.surplus_per_day();
            f.labour.workers -= 1;
            if possible_surplus > existing_surplus {
                f.labour.is_recruiting = true;
            }
        }
    }

    // Shed workers one at a time while running at a loss.
    {
        let min_workers = e.config.min_workers;
        let f = &mut e.firms[idx];
        if !f.labour.is_recruiting && f.labour.workers > 2 {
            let before = f.labour.workers;
            while f.surplus_per_day() < 0.0 && f.labour.workers > min_workers {
                f.labour.workers -= 1;
            }
            let released = before - f.labour.workers;
            if released > 0 {
                let loc = f.location;
                e.state_mut(loc).unemployed += released;
                log::debug!("firm {idx} laid off {released} workers");
            }
        }
    }

    // Track the local market price: raise when clearly below average,
    // cut when clearly above — but never knowingly price into a loss.
    let average_price = {
        let f = &e.firms[idx];
        e.average_price(f.process.product, f.location)
    };
    if average_price * 0.95 > e.firms[idx].sale_value {
        e.firms[idx].sale_value *= 1.01;
    }
    if average_price * 1.05 < e.firms[idx].sale_value {
        let original = e.firms[idx].sale_value;
        e.firms[idx].sale_value *= 0.99;
        if e.firms[idx].surplus_per_day() <= 0.0 {
            e.firms[idx].sale_value = original;
        }
    }
}

/// Borrow enough to cover the projected shortfall over the loan term,
/// from the bank quoting the lowest loan rate. No-op while a loan is
/// already outstanding or no bank is open.
fn obtain_loan(e: &mut Economy, idx: usize) {
    if e.firms[idx].capital.repayment_per_month != 0.0 {
        return;
    }
    let Some(bank_idx) = e.best_loan_bank() else {
        return;
    };
    let term_days = e.config.firm_loan_term_days;
    let shortfall_per_day = -e.firms[idx].surplus_per_day();
    if shortfall_per_day <= 0.0 {
        return;
    }
    let amount = shortfall_per_day * f64::from(term_days);
    bank::issue_loan(e, bank_idx, EntityRef::Firm(idx), amount, term_days);
}
