//! Extraction errors and reliability warnings.

use std::fmt;

use iv_core::CoreError;
use iv_dataset::{Branch, DatasetError};
use thiserror::Error;

pub type ExtractResult<T> = Result<T, ExtractError>;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// The table lacks data a step needs (for example an empty branch).
    #[error("Missing data: {what}")]
    MissingData { what: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Data-quality concerns that still yield a best-effort result.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionWarning {
    /// The transconductance extreme sits at the end of the sweep, so the
    /// curve may not have rolled over and Vt may be biased.
    GmNotRolledOver {
        device: String,
        branch: Branch,
        drain_voltage: f64,
    },
    /// Carrier densities at one TLM point differ too much across devices.
    DensitySpread {
        point: usize,
        relative_spread: f64,
        limit: f64,
    },
    /// A TLM point was left out because a device is below threshold there.
    BelowThreshold { point: usize },
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionWarning::GmNotRolledOver {
                device,
                branch,
                drain_voltage,
            } => write!(
                f,
                "{device}: transconductance has not reached its maximum on the {branch:?} sweep at Vd = {drain_voltage} V; threshold voltage may be biased"
            ),
            ExtractionWarning::DensitySpread {
                point,
                relative_spread,
                limit,
            } => write!(
                f,
                "TLM point {point}: carrier density spread {relative_spread:.3} exceeds {limit}"
            ),
            ExtractionWarning::BelowThreshold { point } => {
                write!(f, "TLM point {point}: skipped, a device is below threshold")
            }
        }
    }
}
