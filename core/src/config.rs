//! All tunable constants of the simulation, in one serde-loadable struct.
//!
//! The defaults reproduce the documented parameterization. A JSON file
//! with any subset of the fields can override them (`SimConfig::from_path`);
//! missing fields fall back to the defaults via `#[serde(default)]`.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // ── Pool sizes ─────────────────────────────────────────────
    /// Fixed capacity of the firm pool. Defunct slots are reused, never removed.
    pub firms: usize,
    pub banks: usize,
    pub rentiers: usize,
    /// Fixed account capacity per bank.
    pub accounts_per_bank: usize,

    // ── Labour ─────────────────────────────────────────────────
    /// Workforce a firm starts (or restarts) with.
    pub initial_workers: u32,
    /// Layoffs never shrink a firm below this.
    pub min_workers: u32,
    /// Hard workforce ceiling; hires, migration and mergers respect it.
    pub max_workers: u32,
    pub min_wage: f64,
    pub max_wage: f64,
    pub min_working_day: f64,
    pub max_working_day: f64,
    pub min_days_per_week: u32,
    pub max_days_per_week: u32,
    pub min_productivity: f64,
    pub max_productivity: f64,

    // ── Opening balances ───────────────────────────────────────
    pub initial_firm_deposit: f64,
    pub initial_bank_deposit: f64,
    /// Merchant capital opens as fictitious (credit-created) money.
    pub initial_merchant_deposit: f64,
    pub initial_state_deposit: f64,
    pub initial_rentier_deposit: f64,

    // ── Firms ──────────────────────────────────────────────────
    /// Fixed overhead per worker per day.
    pub firm_overhead_per_worker: f64,
    /// Price every firm opens at.
    pub initial_sale_value: f64,
    /// Term of a firm's distress loan, in days.
    pub firm_loan_term_days: u32,

    // ── Banks ──────────────────────────────────────────────────
    pub min_deposit_interest: f64,
    pub max_deposit_interest: f64,
    pub max_loan_interest: f64,

    // ── Merchant ───────────────────────────────────────────────
    pub max_merchant_stock: f64,
    /// Markup over the cheapest seller the merchant quotes toward, in percent.
    pub merchant_margin: f64,
    /// Number of product lines the merchant spreads its capital across.
    pub merchant_hedge: u32,

    // ── States ─────────────────────────────────────────────────
    pub min_vat_rate: f64,
    pub max_vat_rate: f64,
    pub min_business_tax_rate: f64,
    pub max_business_tax_rate: f64,
    /// Hourly citizen's dividend paid out as welfare.
    pub citizens_dividend: f64,
    /// Hours of dividend paid per citizen per week.
    pub welfare_hours_per_week: f64,
    /// Term of a state's deficit-financing loan, in days.
    pub state_loan_term_days: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            firms: 1024,
            banks: 5,
            rentiers: 8,
            accounts_per_bank: 256,

            initial_workers: 10,
            min_workers: 4,
            max_workers: 1000,
            min_wage: 6.70,
            max_wage: 20.00,
            min_working_day: 8.0,
            max_working_day: 12.0,
            min_days_per_week: 4,
            max_days_per_week: 6,
            min_productivity: 6.0,
            max_productivity: 50.0,

            initial_firm_deposit: 10_000.0,
            initial_bank_deposit: 10_000.0,
            initial_merchant_deposit: 10_000.0,
            initial_state_deposit: 10_000.0,
            initial_rentier_deposit: 10_000.0,

            firm_overhead_per_worker: 10.0,
            initial_sale_value: 1.50,
            firm_loan_term_days: 180,

            min_deposit_interest: 0.0,
            max_deposit_interest: 30.0,
            max_loan_interest: 30.0,

            max_merchant_stock: 100_000.0,
            merchant_margin: 2.0,
            merchant_hedge: 2,

            min_vat_rate: 5.0,
            max_vat_rate: 20.0,
            min_business_tax_rate: 10.0,
            max_business_tax_rate: 30.0,
            citizens_dividend: 0.5,
            welfare_hours_per_week: 40.0,
            state_loan_term_days: 21,
        }
    }
}

impl SimConfig {
    pub fn from_path(path: &Path) -> SimResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the update algorithms cannot run on.
    pub fn validate(&self) -> SimResult<()> {
        if self.firms == 0 || self.banks == 0 {
            return Err(SimError::Config(
                "firm and bank pools must be non-empty".into(),
            ));
        }
        if self.initial_workers < self.min_workers || self.initial_workers >= self.max_workers {
            return Err(SimError::Config(format!(
                "initial_workers {} outside [{}, {})",
                self.initial_workers, self.min_workers, self.max_workers
            )));
        }
        if self.min_wage > self.max_wage
            || self.min_working_day > self.max_working_day
            || self.min_days_per_week > self.max_days_per_week
            || self.min_productivity > self.max_productivity
        {
            return Err(SimError::Config("inverted parameter range".into()));
        }
        Ok(())
    }
}
