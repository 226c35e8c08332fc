//! Saturating counters used to follow the behavior of a branch.

use std::ops::RangeInclusive;

use crate::Outcome;

/// An n-bit saturating counter over some inclusive range.
///
/// The predicted direction is determined by which half of the range the
/// value lies in: for a signed 3-bit counter (`[-4, 3]`) this is the sign,
/// and for an unsigned 2-bit counter (`[0, 3]`) this is the top bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaturatingCounter {
    lo: i8,
    hi: i8,
    state: i8,
}
impl SaturatingCounter {
    pub fn new(range: RangeInclusive<i8>, init: i8) -> Self {
        assert!(range.start() < range.end());
        assert!(range.contains(&init));
        Self {
            lo: *range.start(),
            hi: *range.end(),
            state: init,
        }
    }

    /// A two's complement counter with 'bits' bits, starting at 'init'.
    pub fn signed(bits: u32, init: i8) -> Self {
        assert!((2..=7).contains(&bits));
        let half = 1i8 << (bits - 1);
        Self::new(-half..=(half - 1), init)
    }

    /// An unsigned counter with 'bits' bits, starting at 'init'.
    pub fn unsigned(bits: u32, init: i8) -> Self {
        assert!((1..=6).contains(&bits));
        Self::new(0..=((1i8 << bits) - 1), init)
    }

    fn clamp(&self, x: i8) -> i8 { x.clamp(self.lo, self.hi) }

    /// The lowest value that predicts 'taken'.
    fn threshold(&self) -> i8 {
        let (lo, hi) = (self.lo as i16, self.hi as i16);
        (lo + (hi - lo + 1) / 2) as i8
    }

    pub fn min(&self) -> i8 { self.lo }
    pub fn max(&self) -> i8 { self.hi }
    pub fn value(&self) -> i8 { self.state }

    pub fn inc(&mut self) { self.state = self.clamp(self.state.saturating_add(1)); }
    pub fn dec(&mut self) { self.state = self.clamp(self.state.saturating_sub(1)); }

    /// Set the counter, clamping into range.
    pub fn set(&mut self, val: i8) {
        self.state = self.clamp(val);
    }

    /// Put the counter in the weakest state that predicts 'outcome'.
    pub fn set_weak(&mut self, outcome: Outcome) {
        self.state = match outcome {
            Outcome::T => self.threshold(),
            Outcome::N => self.threshold() - 1,
        };
    }

    /// Return the current predicted direction.
    pub fn predict(&self) -> Outcome {
        Outcome::from(self.state >= self.threshold())
    }

    /// Move toward 'outcome': increment when taken, decrement otherwise.
    pub fn update(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::T => self.inc(),
            Outcome::N => self.dec(),
        }
    }
}

/// A 2-bit bimodal counter.
///
/// Transitions are spelled out as a table rather than computed so that
/// every state has an explicit successor for both outcomes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TwoBitCounter {
    StronglyNotTaken,
    #[default]
    WeaklyNotTaken,
    WeaklyTaken,
    StronglyTaken,
}
impl TwoBitCounter {
    /// Return the state that follows this one after observing 'outcome'.
    pub fn next(self, outcome: Outcome) -> Self {
        use TwoBitCounter::*;
        match (self, outcome) {
            (StronglyNotTaken, Outcome::T) => WeaklyNotTaken,
            (StronglyNotTaken, Outcome::N) => StronglyNotTaken,
            (WeaklyNotTaken,   Outcome::T) => WeaklyTaken,
            (WeaklyNotTaken,   Outcome::N) => StronglyNotTaken,
            (WeaklyTaken,      Outcome::T) => StronglyTaken,
            (WeaklyTaken,      Outcome::N) => WeaklyNotTaken,
            (StronglyTaken,    Outcome::T) => StronglyTaken,
            (StronglyTaken,    Outcome::N) => WeaklyTaken,
        }
    }

    /// Update the state of the counter.
    pub fn update(&mut self, outcome: Outcome) {
        *self = self.next(outcome);
    }

    /// Return the current predicted direction.
    pub fn predict(&self) -> Outcome {
        match self {
            Self::StronglyNotTaken | Self::WeaklyNotTaken => Outcome::N,
            Self::WeaklyTaken | Self::StronglyTaken => Outcome::T,
        }
    }

    /// The counter value as it would be stored in hardware (0..=3).
    pub fn bits(&self) -> u8 {
        *self as u8
    }
}
