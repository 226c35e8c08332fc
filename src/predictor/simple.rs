
use crate::Outcome;
use crate::history::HistoryRegister;
use crate::predictor::DirectionPredictor;

/// A simple predictor with no state: always predict 'taken'.
///
/// Training is ignored and global history is left untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticPredictor;
impl DirectionPredictor for StaticPredictor {
    fn name(&self) -> &'static str { "Static" }
    fn predict(&self, _pc: usize, _ghr: &HistoryRegister) -> Outcome {
        Outcome::T
    }
    fn update(&mut self, _pc: usize, _outcome: Outcome,
        _ghr: &mut HistoryRegister)
    {
    }
}
