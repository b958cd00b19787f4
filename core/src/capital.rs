//! The capital ledger shared by every entity type.
//!
//! `surplus` is realized, spendable cash. `fictitious` is a secondary
//! reserve representing credit created ahead of realized income; banks,
//! the merchant and the states run on it, and it may go negative
//! (a widening credit gap, not an error).

use serde::{Deserialize, Serialize};

/// Length of the surplus trace, most-recent-first.
pub const HISTORY_STEPS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capital {
    pub surplus: f64,
    pub fictitious: f64,
    pub variable_cost: f64,
    pub fixed_cost: f64,
    pub repayment_per_month: f64,
    pub savings_rate: f64,
    pub surplus_history: [f64; HISTORY_STEPS],
}

impl Default for Capital {
    fn default() -> Self {
        Self {
            surplus: 0.0,
            fictitious: 0.0,
            variable_cost: 0.0,
            fixed_cost: 0.0,
            repayment_per_month: 0.0,
            savings_rate: 0.0,
            surplus_history: [0.0; HISTORY_STEPS],
        }
    }
}

impl Capital {
    pub fn with_deposit(surplus: f64) -> Self {
        Self {
            surplus,
            ..Self::default()
        }
    }

    /// Total spendable capacity for a tick.
    pub fn working(&self) -> f64 {
        self.surplus + self.fictitious
    }

    /// Debit `amount`: surplus first, any shortfall from fictitious.
    /// Fictitious may go negative; surplus never goes below zero here.
    pub fn subtract(&mut self, amount: f64) {
        if amount <= self.surplus {
            self.surplus -= amount;
        } else {
            let shortfall = amount - self.surplus.max(0.0);
            if self.surplus > 0.0 {
                self.surplus = 0.0;
            }
            self.fictitious -= shortfall;
        }
    }

    /// Shift the trace right by one and record the current surplus at
    /// index 0. The oldest entry falls off the end.
    pub fn push_history(&mut self) {
        for i in (1..HISTORY_STEPS).rev() {
            self.surplus_history[i] = self.surplus_history[i - 1];
        }
        self.surplus_history[0] = self.surplus;
    }

}
