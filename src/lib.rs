//! Simulation models of conditional branch direction predictors: a
//! "gshare" predictor and a TAGE predictor sharing one interface, driven
//! through a [`PredictorUnit`] by a trace-driven simulator.

pub mod branch;
pub mod config;
pub mod error;
pub mod history;
pub mod predictor;
pub mod unit;

pub use branch::*;
pub use config::*;
pub use error::*;
pub use history::*;
pub use predictor::*;
pub use unit::*;
