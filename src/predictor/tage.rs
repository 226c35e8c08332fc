//! Implementations of a "Tagged GEometric history length" (TAGE) predictor.

pub mod component;
pub mod stat;
pub mod config;

pub use component::*;
pub use stat::*;
pub use config::*;

use rand::distributions::{ WeightedIndex, Distribution };
use rand::rngs::StdRng;
use tracing::{ debug, trace };

use crate::history::*;
use crate::Outcome;
use crate::predictor::*;

/// Container for inputs passed to a [`TAGEPredictor`] and its components.
#[derive(Clone, Copy, Debug)]
pub struct TAGEInputs<'a> {
    /// Program counter associated with a predicted branch
    pub pc: usize,

    /// Global history at the time of the prediction
    pub ghr: &'a HistoryRegister,
}

/// Identifies a particular component in a [`TAGEPredictor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TAGEProvider {
    /// The base component
    Base,

    /// A tagged component (index 0 has the shortest history)
    Tagged(usize),
}
impl TAGEProvider {
    /// Bank number: 0 for the base component, 'n + 1' for tagged
    /// component 'n'.
    pub fn bank(&self) -> usize {
        match self {
            Self::Base => 0,
            Self::Tagged(idx) => idx + 1,
        }
    }
}

/// Container for output from [`TAGEPredictor::resolve`], including the
/// predicted outcome and other metadata about how the prediction was made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TAGEPrediction {
    /// The component providing the prediction
    pub provider: TAGEProvider,

    /// A predicted direction
    pub outcome: Outcome,

    /// Alternate component (the next hit below the provider)
    pub alt_provider: TAGEProvider,

    /// Predicted direction from the alternate component
    pub alt_outcome: Outcome,

    /// Index into the base component
    pub base_idx: usize,

    /// Index into each tagged component
    pub indices: Vec<usize>,

    /// Tag computed for each tagged component
    pub tags: Vec<usize>,
}
impl TAGEPrediction {
    /// The index of the entry used to make this prediction.
    pub fn idx(&self) -> usize {
        match self.provider {
            TAGEProvider::Base => self.base_idx,
            TAGEProvider::Tagged(idx) => self.indices[idx],
        }
    }
}

/// The "TAgged GEometric history length" predictor.
///
/// See the following:
///  - "A case for (partially) TAgged GEometric history length branch prediction"
///  (Seznec, 2006).
pub struct TAGEPredictor {
    /// The configuration used to create this object
    pub cfg: TAGEConfig,

    pub stat: TAGEStats,

    /// Base component
    pub base: TAGEBaseComponent,

    /// Tagged components, in order of increasing history length
    pub comp: Vec<TAGEComponent>,

    /// Source of randomness for choosing an allocation target
    pub(crate) rng: StdRng,

    /// The 'useful' bit cleared by the next aging pass
    pub(crate) next_aging_bit: AgingBit,
}
impl TAGEPredictor {
    /// Return the predicted outcome from some provider.
    fn provider_outcome(&self, provider: TAGEProvider, base_idx: usize,
        indices: &[usize]) -> Outcome
    {
        match provider {
            TAGEProvider::Base => self.base.get_entry(base_idx).predict(),
            TAGEProvider::Tagged(idx) => {
                self.comp[idx].get_entry(indices[idx]).predict()
            },
        }
    }

    /// Given the provider of an incorrect prediction, select a tagged
    /// component that will be used to allocate a new entry.
    ///
    /// Returns [None] when no component has a longer history than the
    /// provider.
    fn select_alloc_candidate(&mut self, provider: TAGEProvider)
        -> Option<usize>
    {
        // Only components with a longer history than the provider are
        // candidates.
        let first = provider.bank();
        let candidates: Vec<usize> = (first..self.comp.len()).collect();

        match candidates.len() {
            0 => return None,
            1 => return candidates.first().copied(),
            _ => {},
        }

        // Each step away from the provider halves the probability of being
        // chosen.
        //
        // NOTE: In hardware, this is presumably just an LFSR
        let n = candidates.len();
        let weights: Vec<usize> = candidates.iter()
            .map(|idx| 1 << (n - 1 - (idx - first)))
            .collect();
        let dist = match WeightedIndex::new(&weights) {
            Ok(dist) => dist,
            Err(e) => unreachable!("allocation weights {:?}: {}", weights, e),
        };
        Some(candidates[dist.sample(&mut self.rng)])
    }

    /// Clear one bit of every 'useful' counter, alternating between the
    /// high and low bit on each pass.
    fn age_useful_counters(&mut self) {
        let bit = self.next_aging_bit;
        for comp in self.comp.iter_mut() {
            comp.age_useful_bits(bit);
        }
        self.next_aging_bit = !bit;
        self.stat.agings += 1;
        debug!(clk = self.stat.clk, ?bit, "aged useful counters");
    }
}

/// The public interface to a [`TAGEPredictor`].
impl TAGEPredictor {
    /// Make a prediction for the provided input.
    pub fn resolve(&self, input: TAGEInputs) -> TAGEPrediction {
        let base_idx = self.base.get_index(input);
        let indices: Vec<usize> = self.comp.iter()
            .map(|c| c.get_index(input))
            .collect();
        let tags: Vec<usize> = self.comp.iter()
            .map(|c| c.get_tag(input))
            .collect();

        // Scan from the longest history to the shortest: the first hit is
        // the provider, and the next hit (if any) is the alternate.
        let gate = self.cfg.useful_gates_provider;
        let mut hits = self.comp.iter().enumerate().rev()
            .filter(|(idx, c)| {
                c.get_entry(indices[*idx]).hits(tags[*idx], gate)
            })
            .map(|(idx, _)| TAGEProvider::Tagged(idx));
        let provider = hits.next().unwrap_or(TAGEProvider::Base);
        let alt_provider = hits.next().unwrap_or(TAGEProvider::Base);

        TAGEPrediction {
            provider,
            outcome: self.provider_outcome(provider, base_idx, &indices),
            alt_provider,
            alt_outcome: self.provider_outcome(alt_provider, base_idx,
                &indices),
            base_idx,
            indices,
            tags,
        }
    }

    /// Given a particular prediction and the resolved outcome, update the
    /// state of the predictor.
    ///
    /// This does not touch global history: the caller shifts the outcome
    /// into the history register afterwards.
    pub fn train(&mut self,
        prediction: &TAGEPrediction,
        outcome: Outcome
    )
    {
        let correct = prediction.outcome == outcome;

        // Update the entry in the component that provided the prediction
        match prediction.provider {
            TAGEProvider::Base => {
                let entry = self.base.get_entry_mut(prediction.base_idx);
                entry.update(outcome);
                if correct {
                    self.stat.base_hits += 1;
                } else {
                    self.stat.base_miss += 1;
                }
            },
            TAGEProvider::Tagged(idx) => {
                let entry = self.comp[idx]
                    .get_entry_mut(prediction.indices[idx]);
                if correct {
                    entry.increment_useful();
                    self.stat.comp_hits[idx] += 1;
                } else {
                    entry.decrement_useful();
                    self.stat.comp_miss[idx] += 1;
                }
                entry.ctr.update(outcome);
            },
        }

        // Try to allocate a new entry in a component with longer history.
        // The new entry starts in the weakest state for the correct outcome.
        if !correct {
            if let Some(idx) = self.select_alloc_candidate(prediction.provider) {
                let tag = prediction.tags[idx];
                self.comp[idx].get_entry_mut(prediction.indices[idx])
                    .allocate(tag, outcome);
                self.stat.alcs[idx] += 1;
                trace!(
                    bank = idx + 1,
                    index = prediction.indices[idx],
                    tag,
                    ?outcome,
                    "allocated tagged entry"
                );
            }
        }

        self.stat.clk += 1;
        if self.stat.clk % self.cfg.aging_period == 0 {
            self.age_useful_counters();
        }
    }
}

impl DirectionPredictor for TAGEPredictor {
    fn name(&self) -> &'static str { "Tage" }

    fn predict(&self, pc: usize, ghr: &HistoryRegister) -> Outcome {
        self.resolve(TAGEInputs { pc, ghr }).outcome
    }

    /// The provider is recomputed from the current state rather than
    /// carried over from the matching call to [`DirectionPredictor::predict`].
    fn update(&mut self, pc: usize, outcome: Outcome,
        ghr: &mut HistoryRegister)
    {
        let prediction = self.resolve(TAGEInputs { pc, ghr });
        self.train(&prediction, outcome);
        ghr.push(outcome);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn build() -> (TAGEPredictor, HistoryRegister) {
        (TAGEConfig::default().build().unwrap(), HistoryRegister::new(64))
    }

    /// Make the entry for 'pc' in tagged component 'idx' a useful hit.
    fn plant(tage: &mut TAGEPredictor, idx: usize, pc: usize,
        ghr: &HistoryRegister, outcome: Outcome)
    {
        let input = TAGEInputs { pc, ghr };
        let index = tage.comp[idx].get_index(input);
        let tag = tage.comp[idx].get_tag(input);
        let entry = tage.comp[idx].get_entry_mut(index);
        entry.allocate(tag, outcome);
        entry.useful = Usefulness::StronglyUseful;
    }

    #[test]
    fn base_provides_when_nothing_hits() {
        let (tage, ghr) = build();
        let p = tage.resolve(TAGEInputs { pc: 0x40, ghr: &ghr });
        assert_eq!(p.provider, TAGEProvider::Base);
        assert_eq!(p.alt_provider, TAGEProvider::Base);
        assert_eq!(p.outcome, Outcome::N);
        assert_eq!(p.idx(), 0x40);
    }

    #[test]
    fn longest_hit_provides() {
        let (mut tage, ghr) = build();
        let pc = 0x1234;
        plant(&mut tage, 0, pc, &ghr, Outcome::N);
        plant(&mut tage, 1, pc, &ghr, Outcome::N);
        plant(&mut tage, 2, pc, &ghr, Outcome::N);
        plant(&mut tage, 3, pc, &ghr, Outcome::T);

        let p = tage.resolve(TAGEInputs { pc, ghr: &ghr });
        assert_eq!(p.provider, TAGEProvider::Tagged(3));
        assert_eq!(p.provider.bank(), 4);
        assert_eq!(p.outcome, Outcome::T);
        assert_eq!(p.alt_provider, TAGEProvider::Tagged(2));
        assert_eq!(p.alt_outcome, Outcome::N);
    }

    #[test]
    fn unuseful_entries_do_not_provide() {
        let (mut tage, ghr) = build();
        let pc = 0x88;
        plant(&mut tage, 1, pc, &ghr, Outcome::T);
        plant(&mut tage, 3, pc, &ghr, Outcome::T);
        let index = tage.comp[3].get_index(TAGEInputs { pc, ghr: &ghr });
        tage.comp[3].get_entry_mut(index).useful =
            Usefulness::WeaklyNotUseful;

        let p = tage.resolve(TAGEInputs { pc, ghr: &ghr });
        assert_eq!(p.provider, TAGEProvider::Tagged(1));

        tage.cfg.useful_gates_provider = false;
        let p = tage.resolve(TAGEInputs { pc, ghr: &ghr });
        assert_eq!(p.provider, TAGEProvider::Tagged(3));
    }

    #[test]
    fn misprediction_from_base_allocates_once() {
        let (mut tage, mut ghr) = build();
        let pc = 0x3f0;
        let p = tage.resolve(TAGEInputs { pc, ghr: &ghr });
        assert_eq!(p.outcome, Outcome::N);

        tage.update(pc, Outcome::T, &mut ghr);

        let valid: Vec<usize> = tage.comp.iter()
            .map(|c| c.num_valid_entries())
            .collect();
        assert_eq!(valid.iter().sum::<usize>(), 1);
        let idx = valid.iter().position(|n| *n == 1).unwrap();
        let entry = tage.comp[idx].get_entry(p.indices[idx]);
        assert_eq!(entry.tag, Some(p.tags[idx]));
        assert_eq!(entry.ctr.value(), 0);
        assert_eq!(entry.predict(), Outcome::T);
        assert_eq!(entry.useful, Usefulness::StronglyNotUseful);
        assert_eq!(tage.stat.total_alcs(), 1);

        // The base counter moved toward 'taken' too
        assert_eq!(*tage.base.get_entry(p.base_idx),
            TwoBitCounter::WeaklyTaken);
        assert_eq!(ghr.low_bits(1), 1);
    }

    #[test]
    fn allocation_for_not_taken_is_weakly_not_taken() {
        let (mut tage, mut ghr) = build();
        let pc = 0x10;
        // Make the base predict 'taken' so a not-taken outcome mispredicts
        tage.base.pht.update(pc, Outcome::T);
        tage.update(pc, Outcome::N, &mut ghr);
        let entry = tage.comp.iter()
            .flat_map(|c| c.data.iter())
            .find(|e| e.is_valid())
            .unwrap();
        assert_eq!(entry.ctr.value(), -1);
        assert_eq!(entry.predict(), Outcome::N);
    }

    #[test]
    fn correct_prediction_does_not_allocate() {
        let (mut tage, mut ghr) = build();
        tage.update(0x44, Outcome::N, &mut ghr);
        assert_eq!(tage.stat.total_alcs(), 0);
        assert_eq!(tage.stat.base_hits, 1);
    }

    #[test]
    fn longest_provider_cannot_allocate() {
        let (mut tage, ghr) = build();
        let pc = 0x5;
        plant(&mut tage, 3, pc, &ghr, Outcome::T);
        let p = tage.resolve(TAGEInputs { pc, ghr: &ghr });
        assert_eq!(p.provider, TAGEProvider::Tagged(3));

        tage.train(&p, Outcome::N);
        assert_eq!(tage.stat.total_alcs(), 0);
        assert_eq!(tage.stat.comp_miss[3], 1);
        let entry = tage.comp[3].get_entry(p.indices[3]);
        assert_eq!(entry.useful, Usefulness::WeaklyUseful);
        assert_eq!(entry.ctr.value(), -1);
    }

    #[test]
    fn tagged_provider_gains_usefulness_when_correct() {
        let (mut tage, ghr) = build();
        let pc = 0x77;
        plant(&mut tage, 1, pc, &ghr, Outcome::T);
        let index = tage.comp[1].get_index(TAGEInputs { pc, ghr: &ghr });
        tage.comp[1].get_entry_mut(index).useful = Usefulness::WeaklyUseful;

        let p = tage.resolve(TAGEInputs { pc, ghr: &ghr });
        tage.train(&p, Outcome::T);
        let entry = tage.comp[1].get_entry(index);
        assert_eq!(entry.useful, Usefulness::StronglyUseful);
        assert_eq!(entry.ctr.value(), 1);
        assert_eq!(tage.stat.comp_hits[1], 1);
    }

    #[test]
    fn aging_alternates_bits() {
        let mut cfg = TAGEConfig::default();
        cfg.aging_period = 4;
        let mut tage = cfg.build().unwrap();
        let ghr = HistoryRegister::new(64);
        for comp in tage.comp.iter_mut() {
            for e in comp.data.iter_mut() {
                e.useful = Usefulness::StronglyUseful;
            }
        }

        // The base component predicts every branch correctly, so nothing
        // is allocated and the planted counters are only changed by aging.
        for _ in 0..4 {
            let p = tage.resolve(TAGEInputs { pc: 0x100, ghr: &ghr });
            tage.train(&p, Outcome::N);
        }
        assert_eq!(tage.stat.agings, 1);
        assert!(tage.comp.iter().flat_map(|c| c.data.iter())
            .all(|e| e.useful == Usefulness::WeaklyNotUseful));

        for _ in 0..4 {
            let p = tage.resolve(TAGEInputs { pc: 0x100, ghr: &ghr });
            tage.train(&p, Outcome::N);
        }
        assert_eq!(tage.stat.agings, 2);
        assert_eq!(tage.stat.clk, 8);
        assert!(tage.comp.iter().flat_map(|c| c.data.iter())
            .all(|e| e.useful == Usefulness::StronglyNotUseful));
    }

    #[test]
    fn same_seed_same_allocations() {
        let run = || {
            let (mut tage, mut ghr) = build();
            for i in 0..2000usize {
                let pc = (i * 7919) & 0xffff;
                let outcome = Outcome::from(i % 3 == 0);
                tage.update(pc, outcome, &mut ghr);
            }
            tage.stat.alcs.clone()
        };
        assert_eq!(run(), run());
    }

    /// Run a short periodic pattern over a handful of branches.
    fn run_periodic(tage: &mut TAGEPredictor, ghr: &mut HistoryRegister) {
        for i in 0..3000usize {
            let pc = 0x40 + (i % 5) * 4;
            tage.update(pc, Outcome::from(i % 3 == 0), ghr);
        }
    }

    #[test]
    fn gated_entries_never_become_useful() {
        // New entries start at the lowest usefulness and only a provider's
        // usefulness can rise, so with gating enabled no tagged entry ever
        // provides.
        let (mut tage, mut ghr) = build();
        run_periodic(&mut tage, &mut ghr);
        assert!(tage.stat.total_alcs() > 0);
        assert_eq!(tage.stat.comp_hits, vec![0; 4]);
        assert_eq!(tage.stat.comp_miss, vec![0; 4]);
        assert!(tage.comp.iter().all(|c| c.num_useful_entries() == 0));

        let mut cfg = TAGEConfig::default();
        cfg.useful_gates_provider = false;
        let mut tage = cfg.build().unwrap();
        let mut ghr = HistoryRegister::new(64);
        run_periodic(&mut tage, &mut ghr);
        assert!(tage.stat.comp_hits.iter().sum::<usize>() > 0);
    }

    #[test]
    fn folded_tags_tolerate_a_short_history() {
        let mut cfg = TAGEConfig::default();
        cfg.tag_scheme = TagScheme::PcHistoryFold;
        let mut tage = cfg.build().unwrap();
        let mut ghr = HistoryRegister::new(4);
        run_periodic(&mut tage, &mut ghr);
        assert_eq!(tage.stat.clk, 3000);
        assert!(tage.stat.total_alcs() > 0);
    }

    proptest! {
        #[test]
        fn allocation_targets_longer_history(
            provider in 0usize..=4,
            seed in any::<u64>(),
        ) {
            let mut cfg = TAGEConfig::default();
            cfg.alloc_seed = seed;
            let mut tage = cfg.build().unwrap();
            let provider = match provider {
                0 => TAGEProvider::Base,
                n => TAGEProvider::Tagged(n - 1),
            };
            for _ in 0..16 {
                let provider_len = match provider {
                    TAGEProvider::Base => 0,
                    TAGEProvider::Tagged(p) => tage.comp[p].cfg.history_len(),
                };
                match tage.select_alloc_candidate(provider) {
                    Some(idx) => {
                        prop_assert!(idx + 1 > provider.bank());
                        prop_assert!(
                            tage.comp[idx].cfg.history_len() > provider_len
                        );
                    },
                    None => {
                        prop_assert_eq!(provider, TAGEProvider::Tagged(3));
                    },
                }
            }
        }
    }

    #[test]
    fn nearest_bank_is_favoured() {
        let (mut tage, _) = build();
        let mut counts = [0usize; 4];
        for _ in 0..4000 {
            let idx = tage.select_alloc_candidate(TAGEProvider::Base).unwrap();
            counts[idx] += 1;
        }
        assert!(counts[0] > counts[1]);
        assert!(counts[1] > counts[2]);
        assert!(counts[2] > counts[3]);
    }
}
