//! Shared primitive types used across the entire simulation.

use serde::{Deserialize, Serialize};

/// A simulation tick. One tick = one scheduling step of the economy
/// (a batch of one or more in-game weeks).
pub type Tick = u64;

/// The canonical run identifier.
pub type RunId = String;

/// Number of raw-material inputs per production process.
pub const PROCESS_INPUTS: usize = 2;

/// A region of the economy. Each location has its own state (government),
/// labour pool and local goods market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    West,
    Central,
    East,
}

impl Location {
    pub const ALL: [Location; 3] = [Location::West, Location::Central, Location::East];
    pub const COUNT: usize = Self::ALL.len();

    /// Stable index into per-location arrays (states, labour pools).
    pub fn index(self) -> usize {
        match self {
            Location::West => 0,
            Location::Central => 1,
            Location::East => 2,
        }
    }

    pub fn from_index(i: usize) -> Location {
        Self::ALL[i % Self::COUNT]
    }
}

/// A commodity kind. `Primitive` is the free, unlimited input (land,
/// gathered raw matter); it is never produced or sold, only consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Primitive,
    Grain,
    Cloth,
    Tools,
}

impl ProductKind {
    pub const ALL: [ProductKind; 4] = [
        ProductKind::Primitive,
        ProductKind::Grain,
        ProductKind::Cloth,
        ProductKind::Tools,
    ];
    pub const COUNT: usize = Self::ALL.len();

    /// The kinds that can actually be produced and traded.
    pub const TRADED: [ProductKind; 3] =
        [ProductKind::Grain, ProductKind::Cloth, ProductKind::Tools];

    /// Stable index into per-product arrays (merchant stock and prices).
    pub fn index(self) -> usize {
        match self {
            ProductKind::Primitive => 0,
            ProductKind::Grain => 1,
            ProductKind::Cloth => 2,
            ProductKind::Tools => 3,
        }
    }

    pub fn from_index(i: usize) -> ProductKind {
        Self::ALL[i % Self::COUNT]
    }

    pub fn is_primitive(self) -> bool {
        self == ProductKind::Primitive
    }
}

/// A cross-entity reference: `(kind, slot index)` resolved through the
/// owning `Economy`, never a raw pointer. Stays valid across logical
/// deletion and in-place reinitialization of the referenced slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum EntityRef {
    Firm(usize),
    Bank(usize),
    State(usize),
}
