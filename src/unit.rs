//! The boundary used by a trace-driven simulator.
//!
//! A [`PredictorUnit`] starts out uninitialized. [`PredictorUnit::init`]
//! builds the configured predictor along with a fresh global history
//! register; [`PredictorUnit::teardown`] releases both. Calls to
//! [`PredictorUnit::predict`] and [`PredictorUnit::train`] in between are
//! expected to alternate for each dynamic branch, in program order.

use tracing::info;

use crate::{ BranchRecord, Outcome };
use crate::config::{ PredictorConfig, PredictorKind };
use crate::error::{ ConfigError, PredictorError };
use crate::history::HistoryRegister;
use crate::predictor::*;

/// Enum wrapper for static dispatch over the available predictors.
pub enum PredictorVariant {
    Static(StaticPredictor),
    GShare(GSharePredictor),
    Tage(TAGEPredictor),
}
impl PredictorVariant {
    /// Build the predictor selected by 'cfg'.
    pub fn new(cfg: &PredictorConfig) -> Result<Self, ConfigError> {
        Ok(match cfg.kind {
            PredictorKind::Static => Self::Static(StaticPredictor),
            PredictorKind::GShare => Self::GShare(cfg.gshare.clone().build()?),
            PredictorKind::Tage => Self::Tage(cfg.tage.clone().build()?),
        })
    }
}

impl DirectionPredictor for PredictorVariant {
    fn name(&self) -> &'static str {
        match self {
            Self::Static(bp) => bp.name(),
            Self::GShare(bp) => bp.name(),
            Self::Tage(bp) => bp.name(),
        }
    }

    #[inline(always)]
    fn predict(&self, pc: usize, ghr: &HistoryRegister) -> Outcome {
        match self {
            Self::Static(bp) => bp.predict(pc, ghr),
            Self::GShare(bp) => bp.predict(pc, ghr),
            Self::Tage(bp) => bp.predict(pc, ghr),
        }
    }

    #[inline(always)]
    fn update(&mut self, pc: usize, outcome: Outcome,
        ghr: &mut HistoryRegister)
    {
        match self {
            Self::Static(bp) => bp.update(pc, outcome, ghr),
            Self::GShare(bp) => bp.update(pc, outcome, ghr),
            Self::Tage(bp) => bp.update(pc, outcome, ghr),
        }
    }
}

/// State owned by an initialized [`PredictorUnit`].
struct Active {
    cfg: PredictorConfig,
    ghr: HistoryRegister,
    predictor: PredictorVariant,
}

/// A direction predictor together with the global history it consumes.
#[derive(Default)]
pub struct PredictorUnit {
    state: Option<Active>,
}
impl PredictorUnit {
    /// Create an uninitialized unit.
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Allocate and initialize every table for the configured predictor.
    ///
    /// Fails if the configuration is invalid or if the unit is already
    /// initialized.
    pub fn init(&mut self, cfg: PredictorConfig)
        -> Result<(), PredictorError>
    {
        if self.state.is_some() {
            return Err(PredictorError::AlreadyInitialized);
        }
        cfg.validate()?;

        let predictor = PredictorVariant::new(&cfg)?;
        info!(
            kind = %cfg.kind,
            storage_bits = cfg.storage_bits(),
            ghr_bits = cfg.ghr_bits,
            "initialized branch predictor"
        );
        self.state = Some(Active {
            ghr: HistoryRegister::new(cfg.ghr_bits),
            predictor,
            cfg,
        });
        Ok(())
    }

    /// Release all table storage. Calling this on an uninitialized unit
    /// does nothing.
    pub fn teardown(&mut self) {
        if let Some(active) = self.state.take() {
            info!(kind = %active.cfg.kind, "released branch predictor");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    fn active(&self) -> Result<&Active, PredictorError> {
        self.state.as_ref().ok_or(PredictorError::Uninitialized)
    }

    /// Predict the direction of the conditional branch at 'pc'.
    /// This does not change any state.
    pub fn predict(&self, pc: u32) -> Result<Outcome, PredictorError> {
        let active = self.active()?;
        Ok(active.predictor.predict(pc as usize, &active.ghr))
    }

    /// Train the predictor with a resolved branch.
    ///
    /// Anything other than a conditional branch is ignored: it neither
    /// updates the tables nor enters global history.
    pub fn train(&mut self, record: &BranchRecord)
        -> Result<(), PredictorError>
    {
        let active = self.state.as_mut().ok_or(PredictorError::Uninitialized)?;
        if !record.is_conditional() {
            return Ok(());
        }
        active.predictor.update(record.pc as usize, record.outcome,
            &mut active.ghr);
        Ok(())
    }

    /// The configuration used to initialize this unit.
    pub fn config(&self) -> Result<&PredictorConfig, PredictorError> {
        Ok(&self.active()?.cfg)
    }

    /// The active predictor.
    pub fn predictor(&self) -> Result<&PredictorVariant, PredictorError> {
        Ok(&self.active()?.predictor)
    }

    /// The global history register.
    pub fn history(&self) -> Result<&HistoryRegister, PredictorError> {
        Ok(&self.active()?.ghr)
    }
}
