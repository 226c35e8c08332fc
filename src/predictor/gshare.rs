//! The "gshare" global history predictor.
//!
//! A single [`SimplePHT`] indexed by the program counter XOR'ed with the
//! newest bits of global history, so that one branch can be tracked
//! separately in different execution contexts.

use serde::{ Deserialize, Serialize };

use crate::Outcome;
use crate::config::{ check_width, MAX_INDEX_BITS };
use crate::error::ConfigError;
use crate::history::*;
use crate::predictor::*;

/// Configuration for a [`GSharePredictor`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GShareConfig {
    /// Number of history bits (and log2 of the number of entries)
    pub history_bits: usize,
}
impl Default for GShareConfig {
    fn default() -> Self {
        Self { history_bits: 17 }
    }
}
impl GShareConfig {
    /// Get the number of storage bits.
    pub fn storage_bits(&self) -> usize {
        2 << self.history_bits
    }

    /// Check that the table width is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_width("gshare history", self.history_bits, 1, MAX_INDEX_BITS)
    }

    /// Use this configuration to create a new [`GSharePredictor`].
    pub fn build(self) -> Result<GSharePredictor, ConfigError> {
        self.validate()?;
        Ok(GSharePredictor {
            pht: SimplePHT::new(self.history_bits),
            cfg: self,
        })
    }
}

pub struct GSharePredictor {
    pub cfg: GShareConfig,
    pht: SimplePHT,
}
impl GSharePredictor {
    /// Compute the table index for a branch at 'pc' under history 'ghr'.
    pub fn index(&self, pc: usize, ghr: &HistoryRegister) -> usize {
        let bits = self.cfg.history_bits;
        (pc & mask(bits)) ^ ghr.low_bits(bits)
    }

    /// The pattern history table.
    pub fn table(&self) -> &SimplePHT { &self.pht }
}

impl DirectionPredictor for GSharePredictor {
    fn name(&self) -> &'static str { "Gshare" }

    fn predict(&self, pc: usize, ghr: &HistoryRegister) -> Outcome {
        self.pht.predict(self.index(pc, ghr))
    }

    fn update(&mut self, pc: usize, outcome: Outcome,
        ghr: &mut HistoryRegister)
    {
        let idx = self.index(pc, ghr);
        self.pht.update(idx, outcome);
        ghr.push(outcome);
    }
}
