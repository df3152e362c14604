//! iv-extract: transistor parameter extraction from IV sweep tables.
//!
//! Provides:
//! - Numerical kernels (padded slopes, line extrapolation, covariance-backed
//!   linear regression)
//! - Polarity-aware extremum search for n-type, p-type and ambipolar devices
//! - FET extraction: transconductance, threshold voltage, hysteresis,
//!   subthreshold swing, mobility and on-current
//! - TLM extraction of contact and sheet resistance across channel lengths
//! - Typed device models that publish `name,magnitude,unit` CSV rows

pub mod engine;
pub mod error;
pub mod fet;
pub mod model;
pub mod numeric;
pub mod physics;
pub mod polarity;
pub mod tlm;

pub use engine::{ExtractionEngine, ExtractionOptions};
pub use error::{ExtractError, ExtractResult, ExtractionWarning};
pub use fet::{normalize_current, FetExtraction};
pub use model::{DeviceModel, FetDevice, FetModel, TlmModel, TlmPoint};
pub use numeric::{linear_extraction, linear_regression, slope, Line, LineConstraint, NonFinitePolicy, Regression};
pub use physics::GateOxide;
pub use polarity::{Ambipolar, AmbipolarBranch, DeviceKind, NType, PType, Polarity};
pub use tlm::TlmExtraction;
