//! Loan issuance, amortization, compound-due closure and force-closure.

use microecon_core::{
    bank::{self, Account},
    economy::Economy,
    rng::RngPool,
    types::EntityRef,
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

fn accounts_held_by(e: &Economy, holder: EntityRef) -> usize {
    e.banks
        .iter()
        .flat_map(|b| b.accounts.iter())
        .filter(|a| a.holder == Some(holder))
        .count()
}

#[test]
fn repayment_schedule_doubles_principal_over_term() {
    let mut e = test_economy(1);
    e.banks[0].interest_loan = 10.0;

    let issued = bank::issue_loan(&mut e, 0, EntityRef::Firm(0), 10_000.0, 180);
    assert!(issued);

    let i = e.banks[0].account_index(EntityRef::Firm(0)).expect("account");
    let account = &e.banks[0].accounts[i];

    // 10,000 * 2 / (180/30) = 3333.33 per month.
    assert!((account.repayment_per_month - 3333.3333).abs() < 0.01);
    assert_eq!(account.loan, 10_000.0);
    assert_eq!(account.loan_rate, 10.0);

    // Proceeds are credit creation: both sides move in fictitious.
    let borrower = e.capital(EntityRef::Firm(0));
    assert_eq!(borrower.fictitious, 10_000.0);
    assert!((borrower.repayment_per_month - 3333.3333).abs() < 0.01);
    assert_eq!(e.banks[0].capital.fictitious, -10_000.0);
}

#[test]
fn issuance_is_worth_neutral_for_the_bank() {
    let mut e = test_economy(2);
    let before = e.banks[0].worth();
    bank::issue_loan(&mut e, 0, EntityRef::Firm(3), 5_000.0, 180);
    let after = e.banks[0].worth();
    assert!(
        (before - after).abs() < 1e-9,
        "issuing a loan changed bank worth: {before} -> {after}"
    );
}

#[test]
fn duplicate_loan_at_same_bank_is_rejected() {
    let mut e = test_economy(3);
    assert!(bank::issue_loan(&mut e, 0, EntityRef::Firm(0), 1_000.0, 180));
    assert!(!bank::issue_loan(&mut e, 0, EntityRef::Firm(0), 2_000.0, 180));

    // Never two accounts for the same (kind, index) pair.
    assert_eq!(accounts_held_by(&e, EntityRef::Firm(0)), 1);
}

#[test]
fn compound_due_is_monotonic_in_age() {
    let mut account = Account {
        holder: Some(EntityRef::Firm(0)),
        loan: 10_000.0,
        loan_rate: 10.0,
        ..Account::default()
    };

    account.loan_age_days = 0;
    let d0 = account.due();
    account.loan_age_days = 5;
    let d5 = account.due();
    account.loan_age_days = 50;
    let d50 = account.due();

    assert_eq!(d0, 10_000.0);
    assert!(d5 > d0);
    assert!(d50 > d5);
}

#[test]
fn zero_rate_loan_amortizes_to_closure_and_stays_closed() {
    let mut e = test_economy(4);
    e.banks[0].interest_loan = 0.0;
    assert!(bank::issue_loan(&mut e, 0, EntityRef::Firm(0), 10_000.0, 180));

    // 3333.33/month against a constant 10,000 due: closes within months.
    for _ in 0..6 {
        bank::update(&mut e, 0, 30);
    }

    let i = e.banks[0].account_index(EntityRef::Firm(0)).expect("account");
    let account = e.banks[0].accounts[i];
    assert_eq!(account.loan, 0.0);
    assert_eq!(account.loan_repaid, 0.0);
    assert_eq!(account.repayment_per_month, 0.0);
    assert_eq!(e.firms[0].capital.repayment_per_month, 0.0);

    // Idempotent: further passes are no-ops for the closed account.
    let surplus_before = e.firms[0].capital.surplus;
    bank::update(&mut e, 0, 30);
    bank::update(&mut e, 0, 30);
    let account_after = e.banks[0].accounts[i];
    assert_eq!(account_after.loan, 0.0);
    assert_eq!(account_after.loan_repaid, 0.0);
    assert_eq!(e.firms[0].capital.surplus, surplus_before);
}

#[test]
fn closed_loan_frees_the_slot_for_reissue() {
    let mut e = test_economy(5);
    e.banks[0].interest_loan = 0.0;
    assert!(bank::issue_loan(&mut e, 0, EntityRef::Firm(0), 3_000.0, 180));
    for _ in 0..6 {
        bank::update(&mut e, 0, 30);
    }

    assert!(bank::issue_loan(&mut e, 0, EntityRef::Firm(0), 2_000.0, 180));
    assert_eq!(accounts_held_by(&e, EntityRef::Firm(0)), 1);
}

/// The documented scenario: 10,000 over 180 days at 10%. The linear
/// schedule reaches 20,000, but the daily-compounded due balance grows
/// much faster, so the closure condition is never crossed — verified
/// against direct computation of the due curve at every step.
#[test]
fn ten_percent_loan_tracks_compound_due_curve() {
    let mut e = test_economy(6);
    e.banks[0].interest_loan = 10.0;
    assert!(bank::issue_loan(&mut e, 0, EntityRef::Firm(0), 10_000.0, 180));
    let i = e.banks[0].account_index(EntityRef::Firm(0)).expect("account");

    for step in 1..=36u32 {
        bank::update(&mut e, 0, 5);
        let account = e.banks[0].accounts[i];

        let age = 5 * step;
        let expected_due = 10_000.0 * (1.0_f64 + 0.10 / 365.0).powf(365.0 * f64::from(age));

        assert_eq!(account.loan_age_days, age);
        assert!(account.loan > 0.0, "loan closed early at step {step}");
        assert!(
            (account.due() - expected_due).abs() <= expected_due * 1e-9,
            "due mismatch at step {step}"
        );
        assert!(
            account.loan_repaid < account.due(),
            "closure condition unexpectedly met at step {step}"
        );
    }

    let account = e.banks[0].accounts[i];
    assert!((account.loan_repaid - 20_000.0).abs() < 0.01);
    assert!(account.loan > 0.0);
}

#[test]
fn bankrupt_borrower_has_accounts_force_closed() {
    let mut e = test_economy(7);
    assert!(bank::issue_loan(&mut e, 0, EntityRef::Firm(2), 4_000.0, 180));

    e.firms[2].capital.surplus = -50.0;
    let workers = e.firms[2].labour.workers;
    let location = e.firms[2].location;
    let pool_before = e.state(location).unemployed;

    let events = e.bankruptcy_sweep(1);
    assert_eq!(events.len(), 1);

    assert_eq!(accounts_held_by(&e, EntityRef::Firm(2)), 0);
    assert_eq!(e.firms[2].capital.repayment_per_month, 0.0);
    assert!(e.firms[2].is_defunct());
    assert_eq!(e.state(location).unemployed, pool_before + workers);
    assert_eq!(e.bankruptcies, 1);
}

#[test]
fn failed_bank_wipes_its_book_without_collection() {
    let mut e = test_economy(8);
    assert!(bank::issue_loan(&mut e, 1, EntityRef::Firm(1), 4_000.0, 180));

    e.banks[1].capital.surplus = -1.0e9;
    let failed = bank::update(&mut e, 1, 5);
    assert!(failed.is_some());

    assert!(e.banks[1].accounts.iter().all(Account::is_free));
    assert_eq!(e.firms[1].capital.repayment_per_month, 0.0);
    assert_eq!(e.bankruptcies, 1);
}

#[test]
fn deposit_interest_compounds_on_positive_balances() {
    let mut e = test_economy(9);
    e.banks[0].interest_deposit = 10.0;
    assert!(bank::issue_loan(&mut e, 0, EntityRef::Firm(0), 1_000.0, 180));
    let i = e.banks[0].account_index(EntityRef::Firm(0)).expect("account");

    e.banks[0].accounts[i].balance = 100.0;
    bank::update(&mut e, 0, 5);
    assert!((e.banks[0].accounts[i].balance - 110.0).abs() < 1e-9);
    bank::update(&mut e, 0, 5);
    assert!((e.banks[0].accounts[i].balance - 121.0).abs() < 1e-9);
}
