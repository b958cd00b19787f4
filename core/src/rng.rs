//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through `EntityRng` streams derived from the
//! single master seed of the run.
//!
//! Each entity family gets its own stream, seeded deterministically from
//! (master_seed XOR slot_index). This means:
//!   - Adding a new family never changes existing families' streams.
//!   - Each family's stream is fully reproducible in isolation.
//!
//! Streams live for the whole run: the draws that reinitialize a defunct
//! firm at tick 400 continue the same sequence that spawned the initial
//! population.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single entity family.
pub struct EntityRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl EntityRng {
    /// Create a family stream from the master seed and a stable slot
    /// index. The index must never change once assigned.
    fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Uniform float in [lo, hi).
    pub fn range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }

    /// Uniform integer in [lo, hi], inclusive on both ends.
    pub fn range_u32(&mut self, lo: u32, hi: u32) -> u32 {
        lo + self.next_u64_below(u64::from(hi - lo) + 1) as u32
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every family's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Firms = 0,
    Banks = 1,
    States = 2,
    Rentiers = 3,
    // Add new families here — append only.
}

impl StreamSlot {
    const ALL: [StreamSlot; 4] = [
        StreamSlot::Firms,
        StreamSlot::Banks,
        StreamSlot::States,
        StreamSlot::Rentiers,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Firms => "firms",
            Self::Banks => "banks",
            Self::States => "states",
            Self::Rentiers => "rentiers",
        }
    }
}

/// All entity-family RNG streams for a single run.
pub struct RngPool {
    streams: Vec<EntityRng>,
}

impl RngPool {
    pub fn new(master_seed: u64) -> Self {
        let streams = StreamSlot::ALL
            .iter()
            .map(|&slot| EntityRng::new(master_seed, slot as u64).with_name(slot.name()))
            .collect();
        Self { streams }
    }

    pub fn stream(&mut self, slot: StreamSlot) -> &mut EntityRng {
        &mut self.streams[slot as usize]
    }
}
