//! Extraction engine and its tunables.

use crate::numeric::NonFinitePolicy;

/// Tunables for an extraction run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOptions {
    /// Replacement policy for non-finite slopes.
    pub non_finite: NonFinitePolicy,
    /// Ignore exact-zero swings (flat current steps) when searching for the
    /// minimum subthreshold swing.
    pub exclude_zero_swing: bool,
    /// Largest relative standard deviation of carrier density across TLM
    /// devices at one point before a warning is raised.
    pub max_density_spread: f64,
    /// Drain voltage (V) of the sets used for TLM; the largest available
    /// when `None`.
    pub tlm_drain_voltage: Option<f64>,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            non_finite: NonFinitePolicy::Zero,
            exclude_zero_swing: true,
            max_density_spread: 0.1,
            tlm_drain_voltage: None,
        }
    }
}

/// Runs the FET and TLM procedures over sweep tables.
///
/// The engine holds no per-device state; one instance can serve any number
/// of devices, including from several threads.
#[derive(Debug, Clone, Default)]
pub struct ExtractionEngine {
    options: ExtractionOptions,
}

impl ExtractionEngine {
    pub fn new(options: ExtractionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExtractionOptions {
        &self.options
    }
}
