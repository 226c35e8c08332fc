
use crate::Outcome;
use crate::predictor::*;

/// The base component in the TAGE predictor: an untagged table of 2-bit
/// counters indexed by the program counter alone. It always provides a
/// prediction.
#[derive(Clone, Debug)]
pub struct TAGEBaseComponent {
    pub cfg: TAGEBaseConfig,

    /// A table of saturating counters
    pub pht: SimplePHT,
}
impl PredictorTable for TAGEBaseComponent {
    type Input<'a> = TAGEInputs<'a>;
    type Entry = TwoBitCounter;

    fn size(&self) -> usize { self.cfg.size() }

    fn get_index(&self, input: TAGEInputs) -> usize {
        input.pc & self.index_mask()
    }

    fn get_entry(&self, idx: usize) -> &TwoBitCounter {
        self.pht.get_entry(idx)
    }
    fn get_entry_mut(&mut self, idx: usize) -> &mut TwoBitCounter {
        self.pht.get_entry_mut(idx)
    }
}

/// Selects which bit of every 'useful' counter is cleared by an aging pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgingBit {
    High,
    Low,
}
impl AgingBit {
    pub fn mask(&self) -> u8 {
        match self {
            Self::High => 0b10,
            Self::Low  => 0b01,
        }
    }
}
impl std::ops::Not for AgingBit {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::High => Self::Low,
            Self::Low => Self::High,
        }
    }
}

/// The 2-bit 'useful' counter attached to each tagged entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Usefulness {
    #[default]
    StronglyNotUseful,
    WeaklyNotUseful,
    WeaklyUseful,
    StronglyUseful,
}
impl Usefulness {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::StronglyNotUseful,
            1 => Self::WeaklyNotUseful,
            2 => Self::WeaklyUseful,
            3 => Self::StronglyUseful,
            _ => unreachable!(),
        }
    }

    pub fn bits(&self) -> u8 { *self as u8 }

    pub fn increment(self) -> Self {
        match self {
            Self::StronglyNotUseful => Self::WeaklyNotUseful,
            Self::WeaklyNotUseful   => Self::WeaklyUseful,
            Self::WeaklyUseful      => Self::StronglyUseful,
            Self::StronglyUseful    => Self::StronglyUseful,
        }
    }

    pub fn decrement(self) -> Self {
        match self {
            Self::StronglyNotUseful => Self::StronglyNotUseful,
            Self::WeaklyNotUseful   => Self::StronglyNotUseful,
            Self::WeaklyUseful      => Self::WeaklyNotUseful,
            Self::StronglyUseful    => Self::WeaklyUseful,
        }
    }

    /// Entries in the lower two states are not considered useful.
    pub fn is_useful(&self) -> bool {
        matches!(self, Self::WeaklyUseful | Self::StronglyUseful)
    }

    pub fn clear_bit(self, bit: AgingBit) -> Self {
        Self::from_bits(self.bits() & !bit.mask())
    }
}

/// An entry in some [TAGEComponent].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TAGEEntry {
    /// Signed 3-bit counter tracking a branch outcome
    pub ctr: SaturatingCounter,

    /// The 'useful' counter
    pub useful: Usefulness,

    /// Tag associated with this entry. Entries without a tag are invalid.
    pub tag: Option<usize>,
}
impl TAGEEntry {
    pub fn new() -> Self {
        Self {
            ctr: SaturatingCounter::signed(3, 0),
            useful: Usefulness::StronglyNotUseful,
            tag: None,
        }
    }

    /// Get the current predicted outcome.
    pub fn predict(&self) -> Outcome {
        self.ctr.predict()
    }

    pub fn is_valid(&self) -> bool { self.tag.is_some() }

    /// Returns true if the provided tag matches this entry.
    pub fn tag_matches(&self, tag: usize) -> bool {
        if let Some(val) = self.tag { val == tag } else { false }
    }

    /// Returns true if this entry may provide a prediction for 'tag'.
    pub fn hits(&self, tag: usize, useful_gates_provider: bool) -> bool {
        self.tag_matches(tag)
            && (!useful_gates_provider || self.useful.is_useful())
    }

    /// Increment the 'useful' counter.
    pub fn increment_useful(&mut self) {
        self.useful = self.useful.increment();
    }

    /// Decrement the 'useful' counter.
    pub fn decrement_useful(&mut self) {
        self.useful = self.useful.decrement();
    }

    /// Claim this entry for a new branch that resolved to 'outcome'.
    pub fn allocate(&mut self, tag: usize, outcome: Outcome) {
        self.tag = Some(tag);
        self.useful = Usefulness::StronglyNotUseful;
        self.ctr.set_weak(outcome);
    }
}
impl Default for TAGEEntry {
    fn default() -> Self { Self::new() }
}

/// A tagged component in the TAGE predictor.
#[derive(Clone, Debug)]
pub struct TAGEComponent {
    pub cfg: TAGEComponentConfig,
    /// Strategy for creating tags
    pub scheme: TagScheme,
    /// Table of entries
    pub data: Vec<TAGEEntry>,
}
impl TAGEComponent {
    pub fn num_valid_entries(&self) -> usize {
        self.data.iter().filter(|e| e.is_valid()).count()
    }

    pub fn num_useful_entries(&self) -> usize {
        self.data.iter().filter(|e| e.useful.is_useful()).count()
    }

    /// Clear one bit of the 'useful' counter for all entries in this
    /// component.
    pub fn age_useful_bits(&mut self, bit: AgingBit) {
        for entry in self.data.iter_mut() {
            entry.useful = entry.useful.clear_bit(bit);
        }
    }
}

impl PredictorTable for TAGEComponent {
    type Input<'a> = TAGEInputs<'a>;
    type Entry = TAGEEntry;

    fn size(&self) -> usize { self.cfg.size() }

    fn get_index(&self, input: TAGEInputs) -> usize {
        let bits = self.cfg.history_len();
        let pc_bits = input.pc & mask(bits);
        let ghist_bits = input.ghr.low_bits(bits);
        (pc_bits ^ ghist_bits) & self.index_mask()
    }

    fn get_entry(&self, idx: usize) -> &TAGEEntry {
        let index = idx & self.index_mask();
        &self.data[index]
    }
    fn get_entry_mut(&mut self, idx: usize) -> &mut TAGEEntry {
        let index = idx & self.index_mask();
        &mut self.data[index]
    }
}

impl TaggedPredictorTable for TAGEComponent {
    fn get_tag(&self, input: TAGEInputs) -> usize {
        let tag_mask = mask(self.cfg.tag_bits);
        match self.scheme {
            TagScheme::PcLowBits => input.pc & tag_mask,
            TagScheme::PcHistoryFold => {
                let range = 0..=(self.cfg.history_len() - 1);
                let ghist_bits = input.ghr.fold(range, self.cfg.tag_bits);
                (input.pc ^ ghist_bits) & tag_mask
            },
        }
    }
}
