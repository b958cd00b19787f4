//! The simulation engine — run identity, clock, RNG streams, event log.
//!
//! The engine owns an `Economy` and advances it tick by tick; the tick
//! algorithm itself (and its fixed execution order) lives on
//! `Economy::advance_tick`. One tick always runs to completion: there
//! are no suspension points and no partial ticks.
//!
//! RULES:
//!   - The economy is only ever mutated inside `tick()`.
//!   - All randomness flows through the engine's `RngPool`.
//!   - Population-level transitions are recorded in the event log.

use crate::{
    clock::SimClock,
    config::SimConfig,
    economy::Economy,
    error::SimResult,
    event::SimEvent,
    rng::RngPool,
    snapshot::SimSnapshot,
    types::RunId,
};
use uuid::Uuid;

pub struct SimEngine {
    pub run_id: RunId,
    pub clock:  SimClock,
    rng:        RngPool,
    seed:       u64,
    economy:    Economy,
    event_log:  Vec<SimEvent>,
}

impl SimEngine {
    pub fn new(run_id: RunId, seed: u64, config: SimConfig) -> Self {
        let mut rng = RngPool::new(seed);
        let economy = Economy::init(config, &mut rng);
        Self {
            clock: SimClock::new(run_id.clone()),
            rng,
            seed,
            economy,
            event_log: Vec::new(),
            run_id,
        }
    }

    /// Convenience constructor with a generated run ID and the default
    /// parameterization.
    ///
    /// ```
    /// use microecon_core::SimEngine;
    ///
    /// let mut engine = SimEngine::with_seed(42);
    /// engine.run_ticks(2).unwrap();
    /// assert_eq!(engine.clock.current_tick, 2);
    /// ```
    pub fn with_seed(seed: u64) -> Self {
        let run_id = format!("run-{}", Uuid::new_v4());
        Self::new(run_id, seed, SimConfig::default())
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn event_log(&self) -> &[SimEvent] {
        &self.event_log
    }

    /// Advance one tick covering `weeks` in-game weeks. This is the core
    /// simulation step; the economy is mutated in place.
    pub fn tick(&mut self, weeks: u32) -> SimResult<Vec<SimEvent>> {
        assert!(!self.clock.paused, "tick() called on paused engine");

        let tick = self.clock.advance();
        let mut events = vec![SimEvent::TickStarted { tick }];
        events.extend(self.economy.advance_tick(&mut self.rng, weeks, tick));
        events.push(SimEvent::TickCompleted { tick });

        log::debug!(
            "tick={tick} bankruptcies={} events={}",
            self.economy.bankruptcies,
            events.len()
        );

        self.event_log.extend(events.iter().cloned());
        Ok(events)
    }

    /// Run n single-week ticks in a loop. Used for testing and fast-forward.
    pub fn run_ticks(&mut self, n: u64) -> SimResult<()> {
        // Record RunInitialized first so seed differences are observable.
        if self.clock.current_tick == 0 && self.event_log.is_empty() {
            self.event_log.push(SimEvent::RunInitialized {
                run_id: self.run_id.clone(),
                seed: self.seed,
            });
        }
        self.clock.resume();
        for _ in 0..n {
            self.tick(1)?;
        }
        self.clock.pause();
        Ok(())
    }

    /// Capture the full simulation state for export or inspection.
    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            run_id: self.run_id.clone(),
            tick: self.clock.current_tick,
            economy: self.economy.clone(),
        }
    }
}
