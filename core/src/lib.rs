//! microecon-core — a discrete-time agent-based simulation of a
//! simplified monetary economy.
//!
//! A population of producing firms, a handful of competing banks, a
//! wholesale merchant, one state per region and a set of passive
//! rentiers interact over successive weekly ticks: production, pricing,
//! labour reallocation, credit issuance and amortization, taxation,
//! bankruptcy and mergers.
//!
//! The tick algorithm and its fixed execution order live in
//! `economy::Economy::advance_tick`; `engine::SimEngine` wraps it with
//! run identity, the clock, deterministic RNG streams and the event log.

pub mod bank;
pub mod capital;
pub mod clock;
pub mod config;
pub mod economy;
pub mod engine;
pub mod error;
pub mod event;
pub mod firm;
pub mod merchant;
pub mod rentier;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod types;

pub use config::SimConfig;
pub use economy::Economy;
pub use engine::SimEngine;
pub use error::{SimError, SimResult};
pub use event::SimEvent;
pub use snapshot::SimSnapshot;
pub use types::{EntityRef, Location, ProductKind, Tick};
