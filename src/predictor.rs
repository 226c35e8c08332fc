//! Implementations of different branch direction predictors.

pub mod table;
pub mod counter;
pub mod pht;
pub mod simple;
pub mod gshare;
pub mod tage;

pub use table::*;
pub use counter::*;
pub use pht::*;
pub use simple::*;
pub use gshare::*;
pub use tage::*;

use crate::history::*;
use crate::Outcome;

/// Interface to a predictor with some internal state which is only subject to
/// change by the correct branch outcome.
///
/// The global history register is owned by the caller and lent to the
/// predictor: shared for predictions, exclusively for training.
pub trait DirectionPredictor {
    fn name(&self) -> &'static str;

    /// Return the predicted direction for the conditional branch at 'pc'.
    fn predict(&self, pc: usize, ghr: &HistoryRegister) -> Outcome;

    /// Update the internal state of the predictor with the correct outcome
    /// of the conditional branch at 'pc'. Predictors that consume global
    /// history also shift the outcome into 'ghr'.
    fn update(&mut self, pc: usize, outcome: Outcome,
        ghr: &mut HistoryRegister);
}
