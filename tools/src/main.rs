//! econ-runner: headless simulation runner for microecon.
//!
//! Usage:
//!   econ-runner --seed 12345 --ticks 100
//!   econ-runner --seed 12345 --ticks 100 --weeks 2 --quiet
//!   econ-runner --config econ.json --snapshot final.json

use anyhow::Result;
use microecon_core::{
    engine::SimEngine,
    types::{Location, ProductKind},
    SimConfig,
};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 100u64);
    let weeks = parse_arg(&args, "--weeks", 1u32);
    let quiet = args.iter().any(|a| a == "--quiet");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());
    let snapshot_path = args
        .windows(2)
        .find(|w| w[0] == "--snapshot")
        .map(|w| w[1].as_str());

    let config = match config_path {
        Some(path) => SimConfig::from_path(Path::new(path))?,
        None => SimConfig::default(),
    };

    let run_id = format!("run-{seed}");
    let mut engine = SimEngine::new(run_id.clone(), seed, config);

    println!("microecon — econ-runner");
    println!("  run_id: {run_id}");
    println!("  seed:   {seed}");
    println!("  ticks:  {ticks} x {weeks} week(s)");
    println!();

    engine.clock.resume();
    for _ in 0..ticks {
        let events = engine.tick(weeks)?;
        if !quiet {
            print_tick_report(&engine, events.len());
        }
    }
    engine.clock.pause();

    print_summary(&engine, ticks);

    if let Some(path) = snapshot_path {
        let json = engine.snapshot().to_json()?;
        std::fs::write(path, json)?;
        log::info!("snapshot written to {path}");
    }

    Ok(())
}

/// One line per tick, in the spirit of the classic console trace:
/// firm 0's surplus, the bankruptcy ratio, unemployment, merchant stock
/// and per-bank net worth.
fn print_tick_report(engine: &SimEngine, event_count: usize) {
    let e = engine.economy();
    let state0 = e.state(Location::West);

    let merchant_stock: Vec<String> = ProductKind::TRADED
        .iter()
        .map(|k| format!("{:.0}", e.merchant.stock[k.index()]))
        .collect();
    let bank_worth: Vec<String> = e.banks.iter().map(|b| format!("{:.2}", b.worth())).collect();

    println!(
        "tick {:>4} | firm0 {:>12.2} | bankrupt {:>4}/{} | unemployed {:>5}/{} | merchant [{}] | banks [{}] | events {}",
        engine.clock.current_tick,
        e.firms[0].capital.surplus,
        e.bankruptcies,
        e.firms.len(),
        state0.unemployed,
        state0.population,
        merchant_stock.join(", "),
        bank_worth.join(", "),
        event_count,
    );
}

fn print_summary(engine: &SimEngine, ticks: u64) {
    let e = engine.economy();

    println!();
    println!("=== RUN SUMMARY ===");
    println!("  run_id:        {}", engine.run_id);
    println!("  ticks run:     {ticks}");
    println!("  bankruptcies:  {}", e.bankruptcies);
    println!("  events logged: {}", engine.event_log().len());

    println!();
    println!("=== LABOUR ===");
    for location in Location::ALL {
        let s = e.state(location);
        println!(
            "  {:?}: unemployed {}/{} | avg wage {:.2} | state surplus {:.2}",
            location,
            s.unemployed,
            s.population,
            e.average_wage(location),
            s.capital.surplus,
        );
    }

    println!();
    println!("=== CREDIT ===");
    println!(
        "  avg loan rate {:.2}% | avg deposit rate {:.2}%",
        e.average_interest_loan(),
        e.average_interest_deposit()
    );
    if let Some(b) = e.best_loan_bank() {
        println!(
            "  cheapest loans: bank {b} at {:.2}%",
            e.banks[b].interest_loan
        );
    }
    if let Some(b) = e.best_deposit_bank() {
        println!(
            "  best savings:   bank {b} at {:.2}%",
            e.banks[b].interest_deposit
        );
    }
    for (i, b) in e.banks.iter().enumerate() {
        println!("  bank {i}: worth {:.2} | loan {:.2}% | deposit {:.2}%",
            b.worth(), b.interest_loan, b.interest_deposit);
    }

    println!();
    println!("=== MERCHANT ===");
    for kind in ProductKind::TRADED {
        println!(
            "  {:?}: stock {:.0} | price {:.2}",
            kind,
            e.merchant.stock[kind.index()],
            e.merchant.price[kind.index()]
        );
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
