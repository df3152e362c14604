//! Device models: passive records of extracted properties.

use std::fs;
use std::path::{Path, PathBuf};

use iv_core::{CoreError, CoreResult, Dimension, Length, PropertySpec, Quantity, TypedProperty, Unit};

use crate::physics::GateOxide;
use crate::polarity::Polarity;

/// Property contracts shared by the device models.
pub mod specs {
    use super::*;

    /// FET properties are measured at a drain and gate bias.
    fn fet(kind: &'static str, dimension: Dimension, unit: Unit) -> PropertySpec {
        PropertySpec::new(kind, dimension)
            .canonical(unit, 2)
            .require("Vd", Dimension::VOLTAGE)
            .require("Vg", Dimension::VOLTAGE)
            .optional("n", Dimension::AREAL_DENSITY)
            .optional("temperature", Dimension::TEMPERATURE)
            .optional("field", Dimension::ELECTRIC_FIELD)
    }

    pub fn transconductance() -> PropertySpec {
        fet(
            "Transconductance",
            Dimension::LINEAR_CONDUCTANCE,
            Unit::MICROSIEMENS_PER_MICROMETER,
        )
    }

    pub fn subthreshold_swing() -> PropertySpec {
        fet("Subthreshold Swing", Dimension::VOLTAGE, Unit::MILLIVOLT_PER_DECADE)
    }

    pub fn current_density() -> PropertySpec {
        fet(
            "Current",
            Dimension::LINEAR_CURRENT_DENSITY,
            Unit::MICROAMPERE_PER_MICROMETER,
        )
    }

    pub fn mobility() -> PropertySpec {
        fet(
            "Mobility",
            Dimension::MOBILITY,
            Unit::SQ_CENTIMETER_PER_VOLT_SECOND,
        )
    }

    pub fn voltage() -> PropertySpec {
        PropertySpec::new("Voltage", Dimension::VOLTAGE)
            .canonical(Unit::VOLT, 2)
            .optional("Vd", Dimension::VOLTAGE)
    }

    pub fn contact_resistance() -> PropertySpec {
        PropertySpec::new("Contact Resistance", Dimension::LINEAR_RESISTANCE)
            .canonical(Unit::OHM_MICROMETER, 2)
            .require("n", Dimension::AREAL_DENSITY)
    }

    pub fn sheet_resistance() -> PropertySpec {
        PropertySpec::new("Sheet Resistance", Dimension::RESISTANCE)
            .canonical(Unit::OHM_PER_SQUARE, 2)
            .require("n", Dimension::AREAL_DENSITY)
    }
}

/// A device whose properties can be published as `name,magnitude,unit` rows.
pub trait DeviceModel {
    fn name(&self) -> &str;

    /// Published properties, in output order.
    fn properties(&self) -> Vec<&TypedProperty>;

    /// Static rows written after the properties (geometry and the like).
    fn static_rows(&self) -> Vec<(String, Quantity)> {
        Vec::new()
    }

    /// CSV with header `name,magnitude,unit`; unset properties are skipped.
    fn to_csv(&self) -> String {
        let mut csv = String::from("name,magnitude,unit\n");
        for prop in self.properties() {
            if let Some(value) = prop.value() {
                csv.push_str(&format!(
                    "{},{},{}\n",
                    prop.name(),
                    value.magnitude(),
                    value.unit().symbol()
                ));
            }
        }
        for (name, value) in self.static_rows() {
            csv.push_str(&format!(
                "{},{},{}\n",
                name,
                value.magnitude(),
                value.unit().symbol()
            ));
        }
        csv
    }

    /// Write `<dir>/<name>.csv` and return its path.
    fn write_csv(&self, dir: &Path) -> std::io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.csv", self.name()));
        fs::write(&path, self.to_csv())?;
        Ok(path)
    }
}

/// Geometry and gate stack of one transistor under test.
#[derive(Debug, Clone, PartialEq)]
pub struct FetDevice {
    pub name: String,
    pub polarity: Polarity,
    pub length: Quantity,
    pub width: Quantity,
    pub oxide: GateOxide,
}

impl FetDevice {
    pub fn new(
        name: impl Into<String>,
        polarity: Polarity,
        length: Length,
        width: Length,
        oxide: GateOxide,
    ) -> CoreResult<Self> {
        let length = Quantity::from(length).convert(&Unit::MICROMETER)?;
        let width = Quantity::from(width).convert(&Unit::MICROMETER)?;
        for (what, q) in [("channel length", &length), ("channel width", &width)] {
            if !(q.is_finite() && q.magnitude() > 0.0) {
                return Err(CoreError::InvalidArg {
                    what: format!("{what} must be positive, got {q}"),
                });
            }
        }
        Ok(Self {
            name: name.into(),
            polarity,
            length,
            width,
            oxide,
        })
    }
}

/// Properties extracted from one FET's transfer curves.
#[derive(Debug, Clone)]
pub struct FetModel {
    pub name: String,
    pub polarity: Polarity,
    pub length: Quantity,
    pub width: Quantity,
    pub oxide: GateOxide,
    /// Gate capacitance per area, F/cm^2.
    pub cox: Quantity,
    pub max_gm: TypedProperty,
    pub min_ss: TypedProperty,
    pub vt_fwd: TypedProperty,
    pub vt_bwd: TypedProperty,
    pub vt_avg: TypedProperty,
    pub hysteresis: TypedProperty,
    pub max_mobility: TypedProperty,
    pub max_on_current: TypedProperty,
}

impl FetModel {
    /// Empty model for `device` run as `polarity` (one branch of an
    /// ambipolar device keeps its own model).
    pub fn new(device: &FetDevice, polarity: Polarity) -> CoreResult<Self> {
        let name = if device.polarity == Polarity::Ambipolar {
            format!("{}_{}", device.name, polarity)
        } else {
            device.name.clone()
        };
        Ok(Self {
            name,
            polarity,
            length: device.length.clone(),
            width: device.width.clone(),
            oxide: device.oxide.clone(),
            cox: device.oxide.capacitance()?,
            max_gm: TypedProperty::new("max_gm", specs::transconductance()),
            min_ss: TypedProperty::new("min_ss", specs::subthreshold_swing()),
            vt_fwd: TypedProperty::new("vt_fwd", specs::voltage()),
            vt_bwd: TypedProperty::new("vt_bwd", specs::voltage()),
            vt_avg: TypedProperty::new("vt_avg", specs::voltage()),
            hysteresis: TypedProperty::new("hysteresis", specs::voltage()),
            max_mobility: TypedProperty::new("max_mobility", specs::mobility()),
            max_on_current: TypedProperty::new("max_on_current", specs::current_density()),
        })
    }
}

impl DeviceModel for FetModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn properties(&self) -> Vec<&TypedProperty> {
        vec![
            &self.max_gm,
            &self.min_ss,
            &self.vt_fwd,
            &self.vt_bwd,
            &self.vt_avg,
            &self.hysteresis,
            &self.max_mobility,
            &self.max_on_current,
        ]
    }

    fn static_rows(&self) -> Vec<(String, Quantity)> {
        vec![
            ("length".to_string(), self.length.clone()),
            ("width".to_string(), self.width.clone()),
            ("tox".to_string(), self.oxide.thickness().clone()),
            (
                "dielectric_const".to_string(),
                Quantity::dimensionless(self.oxide.relative_permittivity()),
            ),
            ("cox".to_string(), self.cox.clone()),
        ]
    }
}

/// Contact and sheet resistance at one matched carrier density.
#[derive(Debug, Clone)]
pub struct TlmPoint {
    /// Sample index shared by every device.
    pub index: usize,
    /// Mean carrier density across devices, cm^-2.
    pub density: Quantity,
    pub contact_resistance: TypedProperty,
    pub sheet_resistance: TypedProperty,
    pub contact_resistance_error: Option<Quantity>,
    pub sheet_resistance_error: Option<Quantity>,
}

/// Result of a transfer-length-method regression across channel lengths.
#[derive(Debug, Clone)]
pub struct TlmModel {
    pub name: String,
    pub lengths: Vec<Quantity>,
    pub drain_voltage: Quantity,
    pub points: Vec<TlmPoint>,
    /// Values at the highest matched carrier density.
    pub contact_resistance: TypedProperty,
    pub sheet_resistance: TypedProperty,
}

impl TlmModel {
    pub fn new(name: impl Into<String>, lengths: Vec<Quantity>, drain_voltage: Quantity) -> Self {
        Self {
            name: name.into(),
            lengths,
            drain_voltage,
            points: Vec::new(),
            contact_resistance: TypedProperty::new(
                "contact_resistance",
                specs::contact_resistance(),
            ),
            sheet_resistance: TypedProperty::new("sheet_resistance", specs::sheet_resistance()),
        }
    }
}

impl DeviceModel for TlmModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn properties(&self) -> Vec<&TypedProperty> {
        vec![&self.contact_resistance, &self.sheet_resistance]
    }

    fn static_rows(&self) -> Vec<(String, Quantity)> {
        let mut rows: Vec<(String, Quantity)> = self
            .lengths
            .iter()
            .enumerate()
            .map(|(i, l)| (format!("length_{i}"), l.clone()))
            .collect();
        rows.push(("drain_voltage".to_string(), self.drain_voltage.clone()));
        for p in &self.points {
            rows.push((format!("density_{}", p.index), p.density.clone()));
            for prop in [&p.contact_resistance, &p.sheet_resistance] {
                if let Some(v) = prop.value() {
                    rows.push((format!("{}_{}", prop.name(), p.index), v.clone()));
                }
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iv_core::{nm, um, Conditions};

    fn device(polarity: Polarity) -> FetDevice {
        FetDevice::new(
            "dev1",
            polarity,
            um(1.0),
            um(2.0),
            GateOxide::new(3.9, nm(90.0)).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn device_rejects_bad_geometry() {
        let oxide = GateOxide::new(3.9, nm(90.0)).unwrap();
        let err = FetDevice::new("bad", Polarity::N, um(-1.0), um(1.0), oxide.clone()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArg { .. }));
        assert!(FetDevice::new("bad", Polarity::N, um(1.0), um(0.0), oxide).is_err());
    }

    #[test]
    fn ambipolar_models_are_named_per_branch() {
        let d = device(Polarity::Ambipolar);
        assert_eq!(FetModel::new(&d, Polarity::N).unwrap().name, "dev1_n");
        assert_eq!(FetModel::new(&device(Polarity::P), Polarity::P).unwrap().name, "dev1");
    }

    #[test]
    fn csv_lists_set_properties_then_geometry() {
        let mut model = FetModel::new(&device(Polarity::N), Polarity::N).unwrap();
        let vd = Conditions::new().with("Vd", Quantity::new(1.0, Unit::VOLT));
        model
            .vt_fwd
            .set(Quantity::new(3.888_888, Unit::VOLT), Some(&vd))
            .unwrap();

        let csv = model.to_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("name,magnitude,unit"));
        assert_eq!(lines.next(), Some("vt_fwd,3.89,V"));
        assert_eq!(lines.next(), Some("length,1,um"));
        assert!(csv.contains("cox,"));
        assert!(!csv.contains("max_gm"));
    }

    #[test]
    fn fet_specs_require_bias_inputs() {
        let mut gm = TypedProperty::new("max_gm", specs::transconductance());
        let err = gm
            .set(Quantity::new(9.0, Unit::MICROSIEMENS_PER_MICROMETER), None)
            .unwrap_err();
        assert!(matches!(err, CoreError::MissingInput { .. }));
    }

    #[test]
    fn write_csv_uses_model_name() {
        let dir = std::env::temp_dir().join(format!("iv-extract-csv-{}", std::process::id()));
        let model = TlmModel::new("tlm", vec![Quantity::new(1.0, Unit::MICROMETER)], Quantity::new(1.0, Unit::VOLT));
        let path = model.write_csv(&dir).unwrap();
        assert!(path.ends_with("tlm.csv"));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("name,magnitude,unit\nlength_0,1,um\n"));
        let _ = fs::remove_dir_all(&dir);
    }
}
