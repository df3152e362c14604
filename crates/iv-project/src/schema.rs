//! Extraction configuration schema.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Newest configuration version this crate reads.
pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionConfig {
    pub version: u32,
    pub name: String,
    pub device: DeviceDef,
    /// Explicit header candidates keyed by role (`vg`, `id`, `vd`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub columns: BTreeMap<String, Vec<String>>,
    /// Drain voltages (V) of the transfer-curve sets, overriding the values
    /// read from the table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_values: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tlm: Option<TlmDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceDef {
    pub polarity: PolarityDef,
    pub length_um: f64,
    pub width_um: f64,
    pub oxide: OxideDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PolarityDef {
    N,
    P,
    Ambipolar,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OxideDef {
    pub relative_permittivity: f64,
    pub thickness_nm: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TlmDef {
    /// Channel length of each device, in table order.
    pub lengths_um: Vec<f64>,
    /// Drain voltage (V) to regress at; the largest available when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drain_voltage: Option<f64>,
    #[serde(default = "default_max_density_spread")]
    pub max_density_spread: f64,
}

fn default_max_density_spread() -> f64 {
    0.1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputDef {
    pub csv_dir: PathBuf,
}
