//! The global history register shared by the direction predictors.

use bitvec::prelude::*;
use std::ops::RangeInclusive;

use crate::Outcome;

/// A shift register of past branch outcomes.
///
/// Bit 0 always holds the most recent outcome. The register is owned by
/// whoever drives the predictor and lent to the active predictor on every
/// call, so there is exactly one history per predictor instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryRegister {
    data: BitVec<usize, Lsb0>,
    len: usize,
}

// NOTE: This *reverses* all of the bits and presents them in a format
// where the leftmost bit is the most-significant (index n) and the rightmost
// bit is the least-significant (index 0).
impl std::fmt::Display for HistoryRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let x: String = self.data.as_bitslice().iter().by_vals()
            .map(|b| if b { '1' } else { '0' })
            .rev()
            .collect();
        write!(f, "{}", x)
    }
}

impl HistoryRegister {
    /// Create a register with the specified length in bits.
    /// All bits in the register are initialized to zero.
    pub fn new(len: usize) -> Self {
        assert!(len > 0, "history register must hold at least one bit");
        Self {
            data: bitvec![usize, Lsb0; 0; len],
            len,
        }
    }

    pub fn len(&self) -> usize { self.len }
    pub fn data(&self) -> &BitVec { &self.data }

    /// Clear every bit in the register.
    pub fn clear(&mut self) {
        self.data.fill(false);
    }

    /// Shift all bits toward the oldest end by one and insert 'outcome' as
    /// the newest bit. The oldest bit is discarded.
    pub fn push(&mut self, outcome: Outcome) {
        if self.len > 1 {
            self.data.shift_right(1);
        }
        self.data.set(0, outcome.into());
    }

    /// Return the newest 'n' bits as an integer (bit 0 is the newest).
    ///
    /// Requests wider than the register or the machine word are clamped.
    pub fn low_bits(&self, n: usize) -> usize {
        let n = n.min(self.len).min(usize::BITS as usize);
        if n == 0 {
            return 0;
        }
        self.data[..n].load_le::<usize>()
    }

    /// Fold [with XOR] some slice of bits.
    ///
    /// Like [`Self::low_bits`], bits past the end of the register read as
    /// zero.
    pub fn fold(&self, range: RangeInclusive<usize>, output_bits: usize)
        -> usize
    {
        assert!(output_bits > 0 && output_bits < usize::BITS as usize);
        let output_mask = (1 << output_bits) - 1;
        let (start, end) = (*range.start(), *range.end());
        if start >= self.len {
            return 0;
        }
        let slice = &self.data[start..=end.min(self.len - 1)];
        let res = slice.chunks(output_bits)
            .fold(0, |res, x| res ^ x.load_le::<usize>());
        res & output_mask
    }
}
