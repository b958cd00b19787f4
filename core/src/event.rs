//! Population-level simulation events.
//!
//! RULE: events record entity lifecycle transitions the orchestrator is
//! responsible for — startups, failures, mergers. Per-entity decisions
//! (loans, price nudges, hires) are `log::debug!` lines, not events.
//! Variants are only ever appended, never removed or reordered.

use crate::types::{Location, RunId, Tick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
    },
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },

    // ── Startup pass ───────────────────────────────
    FirmLaunched {
        tick: Tick,
        firm: usize,
        location: Location,
        workers: u32,
    },
    BankRestarted {
        tick: Tick,
        bank: usize,
    },

    // ── Bankruptcy sweep / bank solvency ───────────
    FirmBankrupt {
        tick: Tick,
        firm: usize,
        location: Location,
        workers_released: u32,
        had_loan: bool,
    },
    BankFailed {
        tick: Tick,
        bank: usize,
        worth: f64,
    },

    // ── Merger pass ────────────────────────────────
    FirmsMerged {
        tick: Tick,
        acquirer: usize,
        target: usize,
        price: f64,
        combined_workers: u32,
    },
}
