//! Population-level passes: startups, the bankruptcy sweep invariant,
//! mergers and labour-market clearing.

use microecon_core::{
    economy::Economy,
    engine::SimEngine,
    event::SimEvent,
    rng::RngPool,
    types::Location,
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
    for s in &mut e.states {
        s.unemployed = 0;
    }
}

fn revive(e: &mut Economy, i: usize, wage: f64, workers: u32) {
    let f = &mut e.firms[i];
    f.location = Location::West;
    f.labour.workers = workers;
    f.labour.wage_rate = wage;
    f.labour.productivity = 10.0;
    f.labour.hours_per_day = 8.0;
    f.labour.days_per_week = 5;
    f.labour.is_recruiting = false;
}

#[test]
fn defunct_firm_respawns_once_the_pool_is_deep_enough() {
    let mut e = test_economy(1);
    let mut rng = RngPool::new(99);

    let location = e.firms[3].location;
    e.firms[3].labour.workers = 0;
    e.state_mut(location).unemployed = 10;
    e.bankruptcies = 2;

    let events = e.startups(&mut rng, 1);

    assert!(!e.firms[3].is_defunct());
    assert_eq!(e.firms[3].labour.workers, 10);
    // Respawn keeps the slot's location, so the tested pool is drained.
    assert_eq!(e.firms[3].location, location);
    assert_eq!(e.state(location).unemployed, 0);
    assert_eq!(e.bankruptcies, 1);
    assert!(events
        .iter()
        .any(|ev| matches!(ev, SimEvent::FirmLaunched { firm: 3, .. })));
}

#[test]
fn respawn_waits_for_a_full_initial_workforce() {
    let mut e = test_economy(2);
    let mut rng = RngPool::new(99);

    let location = e.firms[3].location;
    e.firms[3].labour.workers = 0;
    e.state_mut(location).unemployed = 9;
    e.bankruptcies = 1;

    let events = e.startups(&mut rng, 1);

    assert!(e.firms[3].is_defunct());
    assert_eq!(e.state(location).unemployed, 9);
    assert_eq!(e.bankruptcies, 1);
    assert!(events.is_empty());
}

#[test]
fn no_live_firm_carries_negative_surplus_past_a_tick() {
    let mut engine = SimEngine::new("sweep-test".into(), 7, small_config());
    engine.clock.resume();

    for _ in 0..15 {
        engine.tick(1).expect("tick");
        for (i, f) in engine.economy().firms.iter().enumerate() {
            if !f.is_defunct() {
                assert!(
                    f.capital.surplus >= 0.0,
                    "firm {i} left with negative surplus {}",
                    f.capital.surplus
                );
            }
        }
    }
}

#[test]
fn workforce_stays_under_the_ceiling_across_ticks() {
    let mut engine = SimEngine::new("ceiling-test".into(), 11, small_config());
    engine.run_ticks(15).expect("run");

    let max = small_config().max_workers;
    for f in &engine.economy().firms {
        assert!(f.labour.workers < max);
    }
}

#[test]
fn acquirer_absorbs_richest_affordable_target_under_the_ceiling() {
    let mut e = test_economy(3);
    blank_market(&mut e);

    revive(&mut e, 1, 1.0, 500);
    e.firms[1].capital.surplus = 1_000_000.0;
    revive(&mut e, 2, 1.0, 600); // over the ceiling when combined
    revive(&mut e, 3, 1.0, 100);

    let target_worth = e.firms[3].worth();
    let events = e.mergers(1);

    assert_eq!(events.len(), 1);
    assert_eq!(e.firms[1].labour.workers, 600);
    assert!(e.firms[3].is_defunct());
    assert_eq!(e.firms[2].labour.workers, 600);
    assert!((e.firms[1].capital.surplus - (1_000_000.0 - target_worth)).abs() < 1e-6);
    match &events[0] {
        SimEvent::FirmsMerged {
            acquirer,
            target,
            price,
            combined_workers,
            ..
        } => {
            assert_eq!(*acquirer, 1);
            assert_eq!(*target, 3);
            assert!((price - target_worth).abs() < 1e-6);
            assert_eq!(*combined_workers, 600);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn workers_migrate_to_strictly_higher_wages() {
    let mut e = test_economy(4);
    blank_market(&mut e);

    revive(&mut e, 1, 5.0, 10);
    revive(&mut e, 2, 10.0, 10);

    e.clear_labour_market();

    assert_eq!(e.firms[1].labour.workers, 9);
    assert_eq!(e.firms[2].labour.workers, 11);
    assert!(!e.firms[2].labour.is_recruiting);
}

#[test]
fn unemployed_go_to_the_best_paying_recruiting_firms() {
    let mut e = test_economy(5);
    blank_market(&mut e);

    // Equal wages: no migration, isolates the recruitment phase.
    revive(&mut e, 1, 10.0, 10);
    e.firms[1].labour.is_recruiting = true;
    revive(&mut e, 2, 10.0, 10);
    e.firms[2].labour.is_recruiting = true;
    e.state_mut(Location::West).unemployed = 2;

    e.clear_labour_market();

    // One hire per recruiting firm per tick, highest wage first.
    assert_eq!(e.firms[1].labour.workers, 11);
    assert_eq!(e.firms[2].labour.workers, 11);
    assert_eq!(e.state(Location::West).unemployed, 0);
    assert!(!e.firms[1].labour.is_recruiting);
    assert!(!e.firms[2].labour.is_recruiting);
}
