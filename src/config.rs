//! Configuration for building a direction predictor.
//!
//! A [`PredictorConfig`] can be built in code (starting from
//! `PredictorConfig::default()`) or deserialized from JSON, in which case
//! every field that is left out takes its default value.

use serde::{ Deserialize, Serialize };

use crate::error::ConfigError;
use crate::predictor::*;

/// The widest table index (and history slice) any table may use.
pub const MAX_INDEX_BITS: usize = 30;

/// The longest global history register that may be configured.
pub const MAX_HISTORY_BITS: usize = 4096;

/// Check that some configured width lies in '[min, max]'.
pub(crate) fn check_width(name: &'static str, got: usize, min: usize,
    max: usize) -> Result<(), ConfigError>
{
    if got < min || got > max {
        return Err(ConfigError::WidthOutOfRange { name, got, min, max });
    }
    Ok(())
}

/// Which direction predictor to build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictorKind {
    /// Always predict 'taken'.
    #[default]
    Static,

    /// A single table indexed by PC XOR global history.
    GShare,

    /// The tagged geometric history length predictor.
    #[serde(alias = "tagged")]
    Tage,
}
impl PredictorKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Static => "Static",
            Self::GShare => "Gshare",
            Self::Tage => "Tage",
        }
    }
}
impl std::fmt::Display for PredictorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
impl std::str::FromStr for PredictorKind {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "gshare" => Ok(Self::GShare),
            "tage" | "tagged" => Ok(Self::Tage),
            _ => Err(ConfigError::UnknownKind(s.to_string())),
        }
    }
}

/// Root configuration for a predictor instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// The predictor to build
    pub kind: PredictorKind,

    /// Length of the global history register in bits
    pub ghr_bits: usize,

    /// Parameters used when 'kind' is [`PredictorKind::GShare`]
    pub gshare: GShareConfig,

    /// Parameters used when 'kind' is [`PredictorKind::Tage`]
    pub tage: TAGEConfig,
}
impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            kind: PredictorKind::default(),
            ghr_bits: 64,
            gshare: GShareConfig::default(),
            tage: TAGEConfig::default(),
        }
    }
}
impl PredictorConfig {
    /// The default configuration for some kind of predictor.
    pub fn new(kind: PredictorKind) -> Self {
        Self { kind, ..Self::default() }
    }

    /// Parse a configuration from JSON.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Get the number of storage bits used by the selected predictor,
    /// including the global history register.
    pub fn storage_bits(&self) -> usize {
        let tables = match self.kind {
            PredictorKind::Static => 0,
            PredictorKind::GShare => self.gshare.storage_bits(),
            PredictorKind::Tage => self.tage.storage_bits(),
        };
        tables + self.ghr_bits
    }

    /// Check that the selected predictor can be built from this
    /// configuration. Parameters of the other predictors are ignored.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_width("global history register", self.ghr_bits, 1,
            MAX_HISTORY_BITS)?;
        let (name, needed) = match self.kind {
            PredictorKind::Static => return Ok(()),
            PredictorKind::GShare => {
                self.gshare.validate()?;
                ("gshare history", self.gshare.history_bits)
            },
            PredictorKind::Tage => {
                self.tage.validate()?;
                ("the longest TAGE history", self.tage.max_history_len())
            },
        };
        if self.ghr_bits < needed {
            return Err(ConfigError::HistoryTooShort {
                name,
                ghr_bits: self.ghr_bits,
                needed,
            });
        }
        Ok(())
    }
}
