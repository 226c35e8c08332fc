//! Types for implementing a table of predictors.

/// Interface to a table of predictors.
pub trait PredictorTable: Sized {
    /// The type of input to the table used to form an index.
    type Input<'a>;

    /// The type of entry in the table.
    type Entry;

    /// Returns the number of entries in the table.
    fn size(&self) -> usize;

    /// Given some input, return the corresponding index into the table.
    ///
    /// Implementations must mask the result with [`Self::index_mask`].
    fn get_index(&self, input: Self::Input<'_>) -> usize;

    /// Returns a reference to an entry in the table.
    fn get_entry(&self, idx: usize) -> &Self::Entry;

    /// Returns a mutable reference to an entry in the table.
    fn get_entry_mut(&mut self, idx: usize) -> &mut Self::Entry;

    /// Returns a bitmask corresponding to the number of entries in the table.
    fn index_mask(&self) -> usize {
        debug_assert!(self.size().is_power_of_two());
        self.size() - 1
    }
}

/// Interface to a *tagged* table of predictors.
pub trait TaggedPredictorTable: PredictorTable {
    fn get_tag(&self, input: Self::Input<'_>) -> usize;
}

/// Returns a mask covering the low 'bits' bits of a word.
pub(crate) fn mask(bits: usize) -> usize {
    if bits >= usize::BITS as usize { usize::MAX } else { (1 << bits) - 1 }
}
