//! The state (government) engine, one per location.
//!
//! Taxes arrive implicitly: VAT on merchant-intermediated trades is
//! credited here by the firm and merchant engines. Spending is
//! unconditional; when the projected bill exceeds working capital and no
//! loan is outstanding, the state finances the deficit at the cheapest
//! bank before spending.

use crate::{
    bank,
    capital::Capital,
    config::SimConfig,
    economy::Economy,
    rng::EntityRng,
    types::{EntityRef, Location},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    pub location: Location,
    pub capital: Capital,
    pub vat_rate: f64,
    pub business_tax_rate: f64,
    pub population: u32,
    pub unemployed: u32,
    /// Hourly welfare payment per citizen.
    pub citizens_dividend: f64,
}

impl State {
    pub fn spawn(location: Location, config: &SimConfig, rng: &mut EntityRng) -> Self {
        State {
            location,
            capital: Capital::with_deposit(config.initial_state_deposit),
            vat_rate: rng.range_f64(config.min_vat_rate, config.max_vat_rate),
            business_tax_rate: rng
                .range_f64(config.min_business_tax_rate, config.max_business_tax_rate),
            population: 0,
            unemployed: 0,
            citizens_dividend: config.citizens_dividend,
        }
    }

    /// Welfare bill plus debt service for a tick of `weeks`.
    pub fn projected_spending(&self, config: &SimConfig, weeks: u32) -> f64 {
        let welfare = f64::from(self.population)
            * self.citizens_dividend
            * config.welfare_hours_per_week
            * f64::from(weeks);
        let debt_service = self.capital.repayment_per_month * f64::from(weeks * 7) / 30.0;
        welfare + debt_service
    }
}

/// One state tick: borrow if the bill cannot be covered, then spend.
pub fn update(e: &mut Economy, idx: usize, weeks: u32) {
    let projected = e.states[idx].projected_spending(&e.config, weeks);

    if e.states[idx].capital.repayment_per_month == 0.0
        && projected > e.states[idx].capital.working()
    {
        if let Some(bank_idx) = e.best_loan_bank() {
            let term_days = e.config.state_loan_term_days;
            bank::issue_loan(e, bank_idx, EntityRef::State(idx), projected * 2.0, term_days);
        }
    }

    e.states[idx].capital.subtract(projected);
    e.states[idx].capital.push_history();
}
