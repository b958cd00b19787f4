//! Full-state capture of a run at a tick boundary.

use crate::{economy::Economy, error::SimResult, types::{RunId, Tick}};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub run_id: RunId,
    pub tick: Tick,
    pub economy: Economy,
}

impl SimSnapshot {
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
