//! The economy aggregate root: every entity pool, the market queries
//! that read across them, and the population-level passes (startups,
//! bankruptcy sweep, mergers, labour-market clearing).
//!
//! RULES:
//!   - Entity pools are fixed-capacity; removal is a state mutation
//!     (`workers = 0`, `holder = None`), never a resize. Indices are
//!     stable for the life of the run.
//!   - Passes iterate in ascending index order over the shared pools;
//!     a firm processed later in a pass sees mutations already made to
//!     earlier firms. The order is observable behavior.

use crate::{
    bank::{self, Bank},
    capital::Capital,
    config::SimConfig,
    event::SimEvent,
    firm::{self, Firm},
    merchant::{self, Merchant},
    rentier::Rentier,
    rng::{RngPool, StreamSlot},
    state::{self, State},
    types::{EntityRef, Location, ProductKind, Tick},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Economy {
    pub config: SimConfig,
    pub firms: Vec<Firm>,
    pub merchant: Merchant,
    pub banks: Vec<Bank>,
    /// One state per location, indexed by `Location::index()`.
    pub states: Vec<State>,
    pub rentiers: Vec<Rentier>,
    /// Monotonic within a tick; only the startup pass decrements it.
    pub bankruptcies: u32,
}

impl Economy {
    pub fn init(config: SimConfig, rng: &mut RngPool) -> Self {
        let mut states: Vec<State> = Location::ALL
            .iter()
            .map(|&loc| State::spawn(loc, &config, rng.stream(StreamSlot::States)))
            .collect();

        let mut firms = Vec::with_capacity(config.firms);
        for _ in 0..config.firms {
            let f = Firm::spawn(&config, rng.stream(StreamSlot::Firms));
            states[f.location.index()].population += f.labour.workers;
            firms.push(f);
        }

        let banks = (0..config.banks)
            .map(|_| Bank::spawn(&config, rng.stream(StreamSlot::Banks)))
            .collect();
        let rentiers = (0..config.rentiers)
            .map(|_| Rentier::spawn(&config, rng.stream(StreamSlot::Rentiers)))
            .collect();
        let merchant = Merchant::new(&config);

        Economy {
            config,
            firms,
            merchant,
            banks,
            states,
            rentiers,
            bankruptcies: 0,
        }
    }

    pub fn state(&self, location: Location) -> &State {
        &self.states[location.index()]
    }

    pub fn state_mut(&mut self, location: Location) -> &mut State {
        &mut self.states[location.index()]
    }

    /// Resolve a cross-entity reference to its capital ledger. The one
    /// place loan events touch borrower capital, whatever the kind.
    pub fn capital_mut(&mut self, entity: EntityRef) -> &mut Capital {
        match entity {
            EntityRef::Firm(i) => &mut self.firms[i].capital,
            EntityRef::Bank(i) => &mut self.banks[i].capital,
            EntityRef::State(i) => &mut self.states[i].capital,
        }
    }

    pub fn capital(&self, entity: EntityRef) -> &Capital {
        match entity {
            EntityRef::Firm(i) => &self.firms[i].capital,
            EntityRef::Bank(i) => &self.banks[i].capital,
            EntityRef::State(i) => &self.states[i].capital,
        }
    }

    // ── Market queries ─────────────────────────────────────────

    /// Stock-weighted mean offer price for `kind` at `location`,
    /// including the merchant's quote weighted by merchant stock.
    /// Zero when nobody offers stock.
    pub fn average_price(&self, kind: ProductKind, location: Location) -> f64 {
        let mut weighted = 0.0;
        let mut weight = 0.0;
        for f in &self.firms {
            if f.is_defunct() {
                continue;
            }
            if f.process.product == kind
                && f.process.finished_stock > 0.0
                && f.location == location
            {
                weighted += f.sale_value * f.process.finished_stock;
                weight += f.process.finished_stock;
            }
        }
        weighted += self.merchant.price[kind.index()] * self.merchant.stock[kind.index()];
        weight += self.merchant.stock[kind.index()];

        if weight > 0.0 {
            weighted / weight
        } else {
            0.0
        }
    }

    /// Stock-weighted mean offer price for `kind` across all locations,
    /// firms only.
    pub fn average_price_global(&self, kind: ProductKind) -> f64 {
        let mut weighted = 0.0;
        let mut weight = 0.0;
        for f in &self.firms {
            if f.is_defunct() {
                continue;
            }
            if f.process.product == kind && f.process.finished_stock > 0.0 {
                weighted += f.sale_value * f.process.finished_stock;
                weight += f.process.finished_stock;
            }
        }
        if weight > 0.0 {
            weighted / weight
        } else {
            0.0
        }
    }

    /// Price dispersion signal: root-mean-square deviation of offer
    /// prices from the global mean, over firms holding stock of `kind`.
    pub fn price_dispersion(&self, kind: ProductKind) -> f64 {
        let mean = self.average_price_global(kind);
        let mut sum = 0.0;
        let mut hits = 0u32;
        for f in &self.firms {
            if f.is_defunct() {
                continue;
            }
            if f.process.product == kind && f.process.finished_stock > 0.0 {
                sum += (f.sale_value - mean) * (f.sale_value - mean);
                hits += 1;
            }
        }
        if hits > 0 {
            (sum / f64::from(hits)).sqrt()
        } else {
            0.0
        }
    }

    /// Index of the firm offering `kind` at the lowest price, ties going
    /// to the lowest index. `buyer` is excluded; with `local_only` the
    /// scan is restricted to the buyer's location.
    pub fn best_price(
        &self,
        kind: ProductKind,
        buyer: Option<usize>,
        local_only: bool,
    ) -> Option<usize> {
        let buyer_location = buyer.map(|b| self.firms[b].location);
        let mut best: Option<(usize, f64)> = None;
        for (i, f) in self.firms.iter().enumerate() {
            if f.is_defunct() {
                continue;
            }
            if Some(i) == buyer {
                continue;
            }
            if local_only {
                if let Some(loc) = buyer_location {
                    if f.location != loc {
                        continue;
                    }
                }
            }
            if f.process.product == kind && f.process.finished_stock > 0.0 {
                match best {
                    Some((_, price)) if f.sale_value >= price => {}
                    _ => best = Some((i, f.sale_value)),
                }
            }
        }
        best.map(|(i, _)| i)
    }

    /// Mean wage over live firms at `location`.
    pub fn average_wage(&self, location: Location) -> f64 {
        let mut sum = 0.0;
        let mut hits = 0u32;
        for f in &self.firms {
            if f.is_defunct() || f.location != location {
                continue;
            }
            sum += f.labour.wage_rate;
            hits += 1;
        }
        if hits > 0 {
            sum / f64::from(hits)
        } else {
            0.0
        }
    }

    /// The live bank quoting the lowest loan rate; ties go to the
    /// lowest index.
    pub fn best_loan_bank(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, b) in self.banks.iter().enumerate() {
            if b.is_defunct() {
                continue;
            }
            match best {
                Some((_, rate)) if b.interest_loan >= rate => {}
                _ => best = Some((i, b.interest_loan)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// The live bank paying the highest deposit rate; ties go to the
    /// lowest index.
    pub fn best_deposit_bank(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, b) in self.banks.iter().enumerate() {
            if b.is_defunct() {
                continue;
            }
            match best {
                Some((_, rate)) if b.interest_deposit <= rate => {}
                _ => best = Some((i, b.interest_deposit)),
            }
        }
        best.map(|(i, _)| i)
    }

    pub fn average_interest_loan(&self) -> f64 {
        let live: Vec<f64> = self
            .banks
            .iter()
            .filter(|b| !b.is_defunct())
            .map(|b| b.interest_loan)
            .collect();
        if live.is_empty() {
            0.0
        } else {
            live.iter().sum::<f64>() / live.len() as f64
        }
    }

    pub fn average_interest_deposit(&self) -> f64 {
        let live: Vec<f64> = self
            .banks
            .iter()
            .filter(|b| !b.is_defunct())
            .map(|b| b.interest_deposit)
            .collect();
        if live.is_empty() {
            0.0
        } else {
            live.iter().sum::<f64>() / live.len() as f64
        }
    }

    // ── Tick algorithm ─────────────────────────────────────────

    /// Advance the whole economy by one tick of `weeks`.
    ///
    /// EXECUTION ORDER (fixed, documented, never reordered):
    ///   1. Startups          — defunct slots respawn from idle labour
    ///   2. Firm pass         — procure, produce, strategize
    ///   3. Bank pass         — amortize (5-day weeks), rate strategy
    ///   4. State pass        — borrow if needed, spend
    ///   5. Merchant pass     — dispersion-screened wholesale buying
    ///   6. Rentier pass      — history commit
    ///   7. Bankruptcy sweep  — close firms with negative surplus
    ///   8. Mergers           — richest affordable local target absorbed
    ///   9. Labour market     — wage migration, then recruitment
    pub fn advance_tick(&mut self, rng: &mut RngPool, weeks: u32, tick: Tick) -> Vec<SimEvent> {
        let mut events = Vec::new();

        events.extend(self.startups(rng, tick));

        for i in 0..self.firms.len() {
            if !self.firms[i].is_defunct() {
                firm::update(self, i, weeks);
            }
        }

        // Banking runs on a 5-day week regardless of firm schedules.
        for b in 0..self.banks.len() {
            if self.banks[b].is_defunct() {
                continue;
            }
            if let Some(worth) = bank::update(self, b, weeks * 5) {
                events.push(SimEvent::BankFailed {
                    tick,
                    bank: b,
                    worth,
                });
            } else {
                bank::strategize(self, b);
            }
            self.banks[b].capital.push_history();
        }

        for s in 0..self.states.len() {
            state::update(self, s, weeks);
        }

        merchant::update(self);

        for r in &mut self.rentiers {
            r.update();
        }

        events.extend(self.bankruptcy_sweep(tick));
        events.extend(self.mergers(tick));
        self.clear_labour_market();

        events
    }

    /// Step 1: every defunct firm restarts once its location has enough
    /// idle labour; defunct banks restart unconditionally. Each restart
    /// works off one recorded bankruptcy.
    pub fn startups(&mut self, rng: &mut RngPool, tick: Tick) -> Vec<SimEvent> {
        let mut events = Vec::new();

        for i in 0..self.firms.len() {
            if !self.firms[i].is_defunct() {
                continue;
            }
            let location = self.firms[i].location;
            if self.states[location.index()].unemployed < self.config.initial_workers {
                continue;
            }
            let stream = rng.stream(StreamSlot::Firms);
            Firm::randomize(&mut self.firms[i], &self.config, stream);
            let workers = self.firms[i].labour.workers;
            self.states[location.index()].unemployed -= workers;
            self.bankruptcies = self.bankruptcies.saturating_sub(1);
            events.push(SimEvent::FirmLaunched {
                tick,
                firm: i,
                location,
                workers,
            });
        }

        for b in 0..self.banks.len() {
            if !self.banks[b].is_defunct() {
                continue;
            }
            let stream = rng.stream(StreamSlot::Banks);
            Bank::randomize(&mut self.banks[b], &self.config, stream);
            self.bankruptcies = self.bankruptcies.saturating_sub(1);
            events.push(SimEvent::BankRestarted { tick, bank: b });
        }

        events
    }

    /// Step 7: any live firm with negative realized surplus is wound up
    /// in the same sweep — loans written off, workers released to the
    /// local pool.
    pub fn bankruptcy_sweep(&mut self, tick: Tick) -> Vec<SimEvent> {
        let mut events = Vec::new();
        for i in 0..self.firms.len() {
            if self.firms[i].is_defunct() {
                continue;
            }
            if self.firms[i].capital.surplus >= 0.0 {
                continue;
            }
            let had_loan = self.firms[i].capital.repayment_per_month > 0.0;
            if had_loan {
                bank::close_accounts_for(self, EntityRef::Firm(i));
            }
            let workers_released = self.firms[i].labour.workers;
            let location = self.firms[i].location;
            self.states[location.index()].unemployed += workers_released;
            self.firms[i].labour.workers = 0;
            self.bankruptcies += 1;
            events.push(SimEvent::FirmBankrupt {
                tick,
                firm: i,
                location,
                workers_released,
                had_loan,
            });
        }
        events
    }

    /// Step 8: each firm absorbs the richest same-location target it can
    /// afford, keeping the combined workforce under the ceiling. The
    /// target's non-workforce assets are abandoned, not transferred.
    pub fn mergers(&mut self, tick: Tick) -> Vec<SimEvent> {
        let mut events = Vec::new();
        let n = self.firms.len();
        for i in 0..n {
            if self.firms[i].is_defunct() {
                continue;
            }
            let mut best_index = None;
            let mut best_worth = 0.0;
            for j in 0..n {
                if i == j {
                    continue;
                }
                let target = &self.firms[j];
                if target.labour.workers == 0 || target.location != self.firms[i].location {
                    continue;
                }
                let worth = target.worth();
                if self.firms[i].capital.surplus > worth
                    && self.firms[i].labour.workers + target.labour.workers
                        < self.config.max_workers
                    && worth > best_worth
                {
                    best_index = Some(j);
                    best_worth = worth;
                }
            }
            if let Some(j) = best_index {
                self.firms[i].capital.surplus -= best_worth;
                self.firms[i].labour.workers += self.firms[j].labour.workers;
                self.firms[j].labour.workers = 0;
                events.push(SimEvent::FirmsMerged {
                    tick,
                    acquirer: i,
                    target: j,
                    price: best_worth,
                    combined_workers: self.firms[i].labour.workers,
                });
            }
        }
        events
    }

    /// Step 9: greedy labour-market clearing. First one worker per firm
    /// may migrate to a strictly better-paying, unsaturated firm; then
    /// the unemployed are assigned one at a time to the highest-paying
    /// recruiting firm in their location.
    pub fn clear_labour_market(&mut self) {
        let n = self.firms.len();

        for i in 0..n {
            if self.firms[i].is_defunct() {
                continue;
            }
            let mut max_wage = self.firms[i].labour.wage_rate;
            let mut best = None;
            for j in 0..n {
                if i == j {
                    continue;
                }
                let f2 = &self.firms[j];
                if f2.labour.workers == 0 {
                    continue;
                }
                if f2.labour.wage_rate > max_wage
                    && f2.labour.workers < self.config.max_workers - 1
                {
                    max_wage = f2.labour.wage_rate;
                    best = Some(j);
                }
            }
            if let Some(j) = best {
                self.firms[i].labour.workers -= 1;
                self.firms[j].labour.workers += 1;
                self.firms[j].labour.is_recruiting = false;
            }
        }

        for location in Location::ALL {
            while self.states[location.index()].unemployed > 0 {
                let mut max_wage = 0.0;
                let mut best = None;
                for (j, f) in self.firms.iter().enumerate() {
                    if f.is_defunct() || f.location != location || !f.labour.is_recruiting {
                        continue;
                    }
                    if f.labour.wage_rate > max_wage {
                        max_wage = f.labour.wage_rate;
                        best = Some(j);
                    }
                }
                let Some(j) = best else { break };
                self.firms[j].labour.workers += 1;
                self.firms[j].labour.is_recruiting = false;
                self.states[location.index()].unemployed -= 1;
            }
        }
    }
}
