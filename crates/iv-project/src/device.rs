//! Turning a validated configuration into extraction inputs.

use iv_core::{nm, um};
use iv_dataset::{Layout, Role, SweepTableBuilder};
use iv_extract::{ExtractionOptions, FetDevice, GateOxide, Polarity};

use crate::schema::{ExtractionConfig, PolarityDef};
use crate::ProjectResult;

impl From<PolarityDef> for Polarity {
    fn from(def: PolarityDef) -> Self {
        match def {
            PolarityDef::N => Polarity::N,
            PolarityDef::P => Polarity::P,
            PolarityDef::Ambipolar => Polarity::Ambipolar,
        }
    }
}

impl From<Polarity> for PolarityDef {
    fn from(polarity: Polarity) -> Self {
        match polarity {
            Polarity::N => PolarityDef::N,
            Polarity::P => PolarityDef::P,
            Polarity::Ambipolar => PolarityDef::Ambipolar,
        }
    }
}

impl ExtractionConfig {
    pub fn oxide(&self) -> ProjectResult<GateOxide> {
        let oxide = &self.device.oxide;
        Ok(GateOxide::new(
            oxide.relative_permittivity,
            nm(oxide.thickness_nm),
        )?)
    }

    /// The configured device at its configured channel length.
    pub fn fet_device(&self) -> ProjectResult<FetDevice> {
        self.fet_device_with_length(&self.name, self.device.length_um)
    }

    /// The configured device with another channel length, as used for the
    /// devices of a TLM structure.
    pub fn fet_device_with_length(&self, name: &str, length_um: f64) -> ProjectResult<FetDevice> {
        Ok(FetDevice::new(
            name,
            self.device.polarity.into(),
            um(length_um),
            um(self.device.width_um),
            self.oxide()?,
        )?)
    }

    /// Table builder carrying the configured column names for `layout`.
    ///
    /// The secondary-value override only applies to transfer tables.
    pub fn table_builder(&self, layout: Layout) -> SweepTableBuilder {
        let mut builder = SweepTableBuilder::new(layout);
        for (key, names) in &self.columns {
            if let Some(role) = Role::from_key(key).filter(|r| layout.roles().contains(r)) {
                builder = builder.column_names(role, names.iter().cloned());
            }
        }
        match (&self.secondary_values, layout) {
            (Some(values), Layout::IdVg) => builder.secondary_values(values.clone()),
            _ => builder,
        }
    }

    pub fn extraction_options(&self) -> ExtractionOptions {
        let mut options = ExtractionOptions::default();
        if let Some(tlm) = &self.tlm {
            options.max_density_spread = tlm.max_density_spread;
            options.tlm_drain_voltage = tlm.drain_voltage;
        }
        options
    }
}
