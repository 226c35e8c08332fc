
use itertools::Itertools;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{ Deserialize, Serialize };

use crate::config::{ check_width, MAX_INDEX_BITS };
use crate::error::ConfigError;
use crate::predictor::*;

/// The widest tag a tagged component may store.
pub const MAX_TAG_BITS: usize = 16;

/// Strategy for creating the tag associated with an entry in a
/// [`TAGEComponent`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagScheme {
    /// The low bits of the program counter.
    #[default]
    PcLowBits,

    /// The low bits of the program counter XOR'ed with the component's
    /// slice of global history, folded down to the tag width.
    PcHistoryFold,
}

/// Configuration for a [`TAGEBaseComponent`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TAGEBaseConfig {
    /// log2 of the number of entries
    pub index_bits: usize,
}
impl Default for TAGEBaseConfig {
    fn default() -> Self {
        Self { index_bits: 10 }
    }
}
impl TAGEBaseConfig {
    /// Number of entries
    pub fn size(&self) -> usize { 1 << self.index_bits }

    /// Get the number of storage bits.
    pub fn storage_bits(&self) -> usize {
        2 * self.size()
    }

    pub(crate) fn build(self) -> TAGEBaseComponent {
        TAGEBaseComponent {
            pht: SimplePHT::new(self.index_bits),
            cfg: self,
        }
    }
}

/// Configuration for a [`TAGEComponent`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TAGEComponentConfig {
    /// log2 of the number of entries. This is also the number of global
    /// history bits hashed into the index (the effective history length).
    pub index_bits: usize,

    /// Number of tag bits
    #[serde(default = "TAGEComponentConfig::default_tag_bits")]
    pub tag_bits: usize,
}
impl TAGEComponentConfig {
    fn default_tag_bits() -> usize { 8 }

    pub fn new(index_bits: usize) -> Self {
        Self { index_bits, tag_bits: Self::default_tag_bits() }
    }

    /// Number of entries
    pub fn size(&self) -> usize { 1 << self.index_bits }

    /// Number of global history bits used by this component.
    pub fn history_len(&self) -> usize { self.index_bits }

    /// Get the number of storage bits (prediction counter, 'useful'
    /// counter, tag and valid bit for each entry).
    pub fn storage_bits(&self) -> usize {
        let entry_size = 3 + 2 + self.tag_bits + 1;
        entry_size * self.size()
    }

    pub(crate) fn build(self, scheme: TagScheme) -> TAGEComponent {
        TAGEComponent {
            data: vec![TAGEEntry::new(); self.size()],
            cfg: self,
            scheme,
        }
    }
}

/// Configuration for a [`TAGEPredictor`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TAGEConfig {
    /// Base component configuration
    pub base: TAGEBaseConfig,

    /// Tagged component configurations
    pub comp: Vec<TAGEComponentConfig>,

    /// Strategy for creating tags
    pub tag_scheme: TagScheme,

    /// Number of trained branches between 'useful' counter agings
    pub aging_period: u64,

    /// When set, entries whose 'useful' counter is in one of its two lowest
    /// states cannot provide a prediction.
    pub useful_gates_provider: bool,

    /// Seed for the generator used to pick allocation targets
    pub alloc_seed: u64,
}
impl Default for TAGEConfig {
    fn default() -> Self {
        let mut cfg = Self::new(TAGEBaseConfig::default());
        for index_bits in [2, 4, 8, 16] {
            cfg.add_component(TAGEComponentConfig::new(index_bits));
        }
        cfg
    }
}
impl TAGEConfig {
    /// Create a configuration with no tagged components.
    pub fn new(base: TAGEBaseConfig) -> Self {
        Self {
            base,
            comp: Vec::new(),
            tag_scheme: TagScheme::default(),
            aging_period: 256 * 1024,
            useful_gates_provider: true,
            alloc_seed: 0,
        }
    }

    pub fn total_entries(&self) -> usize {
        let c: usize = self.comp.iter().map(|c| c.size()).sum();
        self.base.size() + c
    }

    /// Get the number of storage bits.
    pub fn storage_bits(&self) -> usize {
        let c: usize = self.comp.iter().map(|c| c.storage_bits()).sum();
        c + self.base.storage_bits()
    }

    /// The longest history length used by any tagged component.
    pub fn max_history_len(&self) -> usize {
        self.comp.iter().map(|c| c.history_len()).max().unwrap_or(0)
    }

    /// Add a tagged component to the predictor.
    /// Components are kept in order of increasing history length.
    pub fn add_component(&mut self, c: TAGEComponentConfig) {
        self.comp.push(c);
        self.comp.sort_by_key(|c| c.history_len());
    }

    /// Check that this configuration describes a buildable predictor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_width("TAGE base index", self.base.index_bits,
            1, MAX_INDEX_BITS)?;
        if self.comp.is_empty() {
            return Err(ConfigError::NoTaggedComponents);
        }
        for c in self.comp.iter() {
            check_width("TAGE component index", c.index_bits,
                1, MAX_INDEX_BITS)?;
            check_width("TAGE component tag", c.tag_bits, 1, MAX_TAG_BITS)?;
        }
        let dup = self.comp.iter().map(|c| c.history_len()).duplicates()
            .next();
        if let Some(len) = dup {
            return Err(ConfigError::DuplicateHistoryLength(len));
        }
        if self.aging_period == 0 {
            return Err(ConfigError::ZeroAgingPeriod);
        }
        Ok(())
    }

    /// Use this configuration to create a new [`TAGEPredictor`].
    ///
    /// Fails if [`Self::validate`] rejects the configuration.
    pub fn build(mut self) -> Result<TAGEPredictor, ConfigError> {
        self.validate()?;
        self.comp.sort_by_key(|c| c.history_len());
        let comp = self.comp.iter()
            .map(|c| c.clone().build(self.tag_scheme))
            .collect::<Vec<TAGEComponent>>();
        let base = self.base.clone().build();
        let stat = TAGEStats::new(comp.len());
        let rng = StdRng::seed_from_u64(self.alloc_seed);
        Ok(TAGEPredictor {
            cfg: self,
            base,
            comp,
            stat,
            rng,
            next_aging_bit: AgingBit::High,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_geometry() {
        let cfg = TAGEConfig::default();
        let lens: Vec<usize> = cfg.comp.iter().map(|c| c.history_len())
            .collect();
        assert_eq!(lens, vec![2, 4, 8, 16]);
        assert_eq!(cfg.total_entries(), 1024 + 4 + 16 + 256 + 65536);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn components_are_sorted_by_history() {
        let mut cfg = TAGEConfig::new(TAGEBaseConfig::default());
        cfg.add_component(TAGEComponentConfig::new(9));
        cfg.add_component(TAGEComponentConfig::new(3));
        cfg.add_component(TAGEComponentConfig::new(5));
        assert_eq!(cfg.comp[0].index_bits, 3);
        assert_eq!(cfg.comp[2].index_bits, 9);
        assert_eq!(cfg.max_history_len(), 9);
    }

    #[test]
    fn rejects_bad_geometry() {
        let mut cfg = TAGEConfig::new(TAGEBaseConfig::default());
        assert_eq!(cfg.validate(), Err(ConfigError::NoTaggedComponents));

        cfg.add_component(TAGEComponentConfig::new(4));
        cfg.add_component(TAGEComponentConfig::new(4));
        assert_eq!(cfg.validate(),
            Err(ConfigError::DuplicateHistoryLength(4)));

        cfg.comp.pop();
        cfg.comp[0].tag_bits = 17;
        assert!(matches!(cfg.validate(),
            Err(ConfigError::WidthOutOfRange { got: 17, .. })));

        cfg.comp[0].tag_bits = 8;
        cfg.aging_period = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroAgingPeriod));
    }

    #[test]
    fn build_validates_first() {
        let mut cfg = TAGEConfig::default();
        cfg.aging_period = 0;
        assert!(matches!(cfg.clone().build(),
            Err(ConfigError::ZeroAgingPeriod)));

        cfg.aging_period = 1;
        cfg.comp.clear();
        assert!(matches!(cfg.build(), Err(ConfigError::NoTaggedComponents)));
    }
}
