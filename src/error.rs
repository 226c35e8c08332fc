//! Error types.

use thiserror::Error;

/// A configuration that cannot be used to build a predictor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be between {min} and {max} bits (got {got})")]
    WidthOutOfRange {
        name: &'static str,
        got: usize,
        min: usize,
        max: usize,
    },

    #[error("TAGE needs at least one tagged component")]
    NoTaggedComponents,

    #[error("tagged components must use distinct history lengths \
        ({0} bits appears more than once)")]
    DuplicateHistoryLength(usize),

    #[error("usefulness aging period must be non-zero")]
    ZeroAgingPeriod,

    #[error("global history register ({ghr_bits} bits) is narrower than \
        {name} ({needed} bits)")]
    HistoryTooShort {
        name: &'static str,
        ghr_bits: usize,
        needed: usize,
    },

    #[error("unknown predictor kind '{0}'")]
    UnknownKind(String),

    #[error("malformed configuration: {0}")]
    Parse(String),
}

/// Precondition violations at the predictor boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictorError {
    #[error("predictor used before init()")]
    Uninitialized,

    #[error("predictor is already initialized (call teardown() first)")]
    AlreadyInitialized,

    #[error(transparent)]
    Config(#[from] ConfigError),
}
