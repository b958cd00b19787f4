//! The rentier engine: passive asset holders.
//!
//! Rentiers currently only commit their capital history each tick; they
//! are the extension point for asset and rent markets.

use crate::{
    capital::Capital,
    config::SimConfig,
    rng::EntityRng,
    types::Location,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Land,
    House,
    Factory,
}

impl AssetKind {
    pub const ALL: [AssetKind; 3] = [AssetKind::Land, AssetKind::House, AssetKind::Factory];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rentier {
    pub location: Location,
    pub capital: Capital,
    pub asset: AssetKind,
    pub asset_value: f64,
    pub rent_per_month: f64,
    pub quantity: u32,
}

impl Rentier {
    pub fn spawn(config: &SimConfig, rng: &mut EntityRng) -> Self {
        Rentier {
            location: Location::from_index(rng.next_u64_below(Location::COUNT as u64) as usize),
            capital: Capital::with_deposit(config.initial_rentier_deposit),
            asset: AssetKind::ALL[rng.next_u64_below(AssetKind::ALL.len() as u64) as usize],
            asset_value: 0.0,
            rent_per_month: 0.0,
            quantity: 0,
        }
    }

    pub fn update(&mut self) {
        self.capital.push_history();
    }
}
