//! The bank engine: account ledger, loan issuance, compound-interest
//! amortization, solvency, and the competitive rate strategy.
//!
//! Loans are credit creation: issuance debits the lender's fictitious
//! capital and credits the borrower's, so a bank's net worth is
//! unchanged at the moment of issue (`loan - balance` rises by the same
//! amount the fictitious reserve falls).

use crate::{
    capital::Capital,
    config::SimConfig,
    economy::Economy,
    rng::EntityRng,
    types::EntityRef,
};
use serde::{Deserialize, Serialize};

/// One account slot. `holder == None` marks a free slot; slots are
/// reused, never removed, so `(kind, index)` references stay valid.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Account {
    pub holder: Option<EntityRef>,
    pub balance: f64,
    pub loan: f64,
    pub loan_rate: f64,
    pub loan_age_days: u32,
    pub loan_repaid: f64,
    pub repayment_per_month: f64,
}

impl Account {
    pub fn is_free(&self) -> bool {
        self.holder.is_none()
    }

    /// True daily-compounded payoff balance. The amortization schedule is
    /// linear, but the closure threshold compounds; early closure happens
    /// whenever the linear schedule out-paces compound growth.
    pub fn due(&self) -> f64 {
        let daily = 1.0 + self.loan_rate / 100.0 / 365.0;
        self.loan * daily.powf(365.0 * f64::from(self.loan_age_days))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bank {
    pub capital: Capital,
    pub interest_deposit: f64,
    pub interest_loan: f64,
    pub accounts: Vec<Account>,
}

impl Bank {
    pub fn spawn(config: &SimConfig, rng: &mut EntityRng) -> Self {
        let mut bank = Bank {
            capital: Capital::default(),
            interest_deposit: 0.0,
            interest_loan: 0.0,
            accounts: vec![Account::default(); config.accounts_per_bank],
        };
        bank.randomize(config, rng);
        bank
    }

    /// Fresh balance sheet, fresh rates, every account slot freed.
    pub fn randomize(&mut self, config: &SimConfig, rng: &mut EntityRng) {
        self.capital = Capital::with_deposit(config.initial_bank_deposit);
        self.interest_deposit =
            rng.range_f64(config.min_deposit_interest, config.max_deposit_interest);
        // The loan rate always sits above the deposit rate.
        self.interest_loan = rng.range_f64(self.interest_deposit, config.max_loan_interest);
        self.accounts.fill(Account::default());
    }

    /// Net worth: own capital plus the book of outstanding credit.
    pub fn worth(&self) -> f64 {
        let book: f64 = self
            .accounts
            .iter()
            .filter(|a| !a.is_free())
            .map(|a| a.loan - a.balance)
            .sum();
        self.capital.surplus + self.capital.fictitious + book
    }

    pub fn is_defunct(&self) -> bool {
        self.worth() < 0.0
    }

    /// Linear scan for the holder's account. At most one exists.
    pub fn account_index(&self, holder: EntityRef) -> Option<usize> {
        self.accounts
            .iter()
            .position(|a| a.holder == Some(holder))
    }
}

/// Issue a loan to `borrower`. Rejected when the borrower already holds
/// an open loan at this bank or no account slot is available. Total
/// repayment across the term is double the principal, spread linearly.
pub fn issue_loan(
    e: &mut Economy,
    bank_idx: usize,
    borrower: EntityRef,
    amount: f64,
    term_days: u32,
) -> bool {
    if amount <= 0.0 || term_days == 0 {
        return false;
    }
    let slot = {
        let bank = &e.banks[bank_idx];
        match bank.account_index(borrower) {
            Some(i) if bank.accounts[i].loan > 0.0 => return false,
            Some(i) => Some(i),
            None => bank.accounts.iter().position(Account::is_free),
        }
    };
    let Some(slot) = slot else {
        return false;
    };

    let rate = e.banks[bank_idx].interest_loan;
    let repayment_per_month = amount * 2.0 / (f64::from(term_days) / 30.0);

    let account = &mut e.banks[bank_idx].accounts[slot];
    account.holder = Some(borrower);
    account.loan = amount;
    account.loan_rate = rate;
    account.loan_age_days = 0;
    account.loan_repaid = 0.0;
    account.repayment_per_month = repayment_per_month;

    e.banks[bank_idx].capital.fictitious -= amount;
    let capital = e.capital_mut(borrower);
    capital.fictitious += amount;
    capital.repayment_per_month = repayment_per_month;

    log::debug!(
        "bank {bank_idx} issued {amount:.2} to {borrower:?} at {rate:.2}% over {term_days} days"
    );
    true
}

/// Amortize every account by `elapsed_days`, then re-test solvency.
/// Returns the failing net worth when the bank went under this pass
/// (accounts force-closed, economy bankruptcy counter bumped).
/// Callers skip defunct banks.
pub fn update(e: &mut Economy, bank_idx: usize, elapsed_days: u32) -> Option<f64> {
    let deposit_rate = e.banks[bank_idx].interest_deposit;

    for i in 0..e.banks[bank_idx].accounts.len() {
        let (holder, balance, loan) = {
            let a = &e.banks[bank_idx].accounts[i];
            (a.holder, a.balance, a.loan)
        };
        let Some(holder) = holder else { continue };

        // Deposit interest compounds once per pass.
        if balance > 0.0 {
            e.banks[bank_idx].accounts[i].balance *= 1.0 + deposit_rate / 100.0;
        }

        if loan > 0.0 {
            let repayment =
                f64::from(elapsed_days) * e.banks[bank_idx].accounts[i].repayment_per_month / 30.0;
            e.capital_mut(holder).subtract(repayment);
            match holder {
                // Inter-bank repayments stay in the credit sphere.
                EntityRef::Bank(_) => e.banks[bank_idx].capital.fictitious += repayment,
                _ => e.banks[bank_idx].capital.surplus += repayment,
            }

            let account = &mut e.banks[bank_idx].accounts[i];
            account.loan_age_days += elapsed_days;
            account.loan_repaid += repayment;

            if account.loan_repaid >= account.due() {
                account.loan = 0.0;
                account.loan_rate = 0.0;
                account.loan_age_days = 0;
                account.loan_repaid = 0.0;
                account.repayment_per_month = 0.0;
                e.capital_mut(holder).repayment_per_month = 0.0;
                log::debug!("bank {bank_idx} closed loan for {holder:?}");
            }
        }
    }

    let worth = e.banks[bank_idx].worth();
    if worth < 0.0 {
        force_close_all(e, bank_idx);
        e.bankruptcies += 1;
        log::warn!("bank {bank_idx} failed, worth {worth:.2}");
        return Some(worth);
    }
    None
}

/// Wipe the whole book without further collection.
fn force_close_all(e: &mut Economy, bank_idx: usize) {
    for i in 0..e.banks[bank_idx].accounts.len() {
        let account = e.banks[bank_idx].accounts[i];
        if let Some(holder) = account.holder {
            if account.loan > 0.0 {
                e.capital_mut(holder).repayment_per_month = 0.0;
            }
        }
        e.banks[bank_idx].accounts[i] = Account::default();
    }
}

/// Close the borrower's accounts at every live bank and clear its
/// repayment obligation. Used when the borrower itself is wound up;
/// outstanding loans are written off.
pub fn close_accounts_for(e: &mut Economy, holder: EntityRef) {
    for b in 0..e.banks.len() {
        if e.banks[b].is_defunct() {
            continue;
        }
        if let Some(i) = e.banks[b].account_index(holder) {
            e.banks[b].accounts[i] = Account::default();
        }
    }
    e.capital_mut(holder).repayment_per_month = 0.0;
}

/// Competitive rate strategy: drift toward the peer average when more
/// than 5% away from it, and lean on relative net worth — a richer bank
/// charges more for loans and pays less on deposits. A hill-climbing
/// heuristic, not an optimizer.
pub fn strategize(e: &mut Economy, bank_idx: usize) {
    let mut loan_sum = 0.0;
    let mut deposit_sum = 0.0;
    let mut worth_sum = 0.0;
    let mut peers = 0u32;
    for (i, bank) in e.banks.iter().enumerate() {
        if i == bank_idx || bank.is_defunct() {
            continue;
        }
        loan_sum += bank.interest_loan;
        deposit_sum += bank.interest_deposit;
        worth_sum += bank.worth();
        peers += 1;
    }
    if peers == 0 {
        return;
    }
    let avg_loan = loan_sum / f64::from(peers);
    let avg_deposit = deposit_sum / f64::from(peers);
    let avg_worth = worth_sum / f64::from(peers);

    let bank = &mut e.banks[bank_idx];
    if bank.interest_loan > avg_loan * 1.05 {
        bank.interest_loan *= 0.99;
    } else if bank.interest_loan < avg_loan * 0.95 {
        bank.interest_loan *= 1.01;
    }
    if bank.interest_deposit > avg_deposit * 1.05 {
        bank.interest_deposit *= 0.99;
    } else if bank.interest_deposit < avg_deposit * 0.95 {
        bank.interest_deposit *= 1.01;
    }

    let worth = bank.worth();
    if worth > avg_worth {
        bank.interest_loan *= 1.01;
        bank.interest_deposit *= 0.99;
    } else if worth < avg_worth {
        bank.interest_loan *= 0.99;
        bank.interest_deposit *= 1.01;
    }
}
