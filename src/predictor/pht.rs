//! Implementations of a pattern history table (PHT).

use crate::Outcome;
use crate::predictor::*;

/// A power-of-two table of [`TwoBitCounter`], indexed by some key that the
/// owner computes (a program counter, or a program counter hashed with
/// global history).
#[derive(Clone, Debug)]
pub struct SimplePHT {
    /// Table of counters
    data: Vec<TwoBitCounter>,
}
impl SimplePHT {
    pub fn new(index_bits: usize) -> Self {
        Self {
            data: vec![TwoBitCounter::default(); 1 << index_bits],
        }
    }

    /// Return the predicted direction for the entry selected by 'key'.
    pub fn predict(&self, key: usize) -> Outcome {
        self.get_entry(self.get_index(key)).predict()
    }

    /// Update the entry selected by 'key' with the resolved outcome.
    pub fn update(&mut self, key: usize, outcome: Outcome) {
        let idx = self.get_index(key);
        self.get_entry_mut(idx).update(outcome);
    }

    /// Returns 'true' if every entry is in the given state.
    pub fn is_uniform(&self, state: TwoBitCounter) -> bool {
        self.data.iter().all(|c| *c == state)
    }
}

impl PredictorTable for SimplePHT {
    type Input<'a> = usize;
    type Entry = TwoBitCounter;

    fn size(&self) -> usize { self.data.len() }

    fn get_index(&self, key: usize) -> usize {
        key & self.index_mask()
    }

    fn get_entry(&self, idx: usize) -> &TwoBitCounter {
        let index = idx & self.index_mask();
        &self.data[index]
    }

    fn get_entry_mut(&mut self, idx: usize) -> &mut TwoBitCounter {
        let index = idx & self.index_mask();
        &mut self.data[index]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn starts_weakly_not_taken() {
        let pht = SimplePHT::new(4);
        assert_eq!(pht.size(), 16);
        assert!(pht.is_uniform(TwoBitCounter::WeaklyNotTaken));
        assert_eq!(pht.predict(3), Outcome::N);
    }

    #[test]
    fn keys_wrap_into_range() {
        let mut pht = SimplePHT::new(4);
        pht.update(0x13, Outcome::T);
        assert_eq!(*pht.get_entry(0x3), TwoBitCounter::WeaklyTaken);
        assert_eq!(pht.predict(0x3), Outcome::T);
        assert_eq!(pht.predict(0xf3), Outcome::T);
    }
}
