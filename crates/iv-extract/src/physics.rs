//! Gate-stack electrostatics and derived transport quantities.

use iv_core::units::constants::{elementary_charge, epsilon_0};
use iv_core::{CoreError, CoreResult, Dimension, Length, Quantity, Unit};

use crate::polarity::DeviceKind;

/// Gate dielectric of a FET.
#[derive(Debug, Clone, PartialEq)]
pub struct GateOxide {
    relative_permittivity: f64,
    thickness: Quantity,
}

impl GateOxide {
    pub fn new(relative_permittivity: f64, thickness: Length) -> CoreResult<Self> {
        let thickness = Quantity::from(thickness).convert(&Unit::NANOMETER)?;
        if !(relative_permittivity.is_finite() && relative_permittivity > 0.0) {
            return Err(CoreError::InvalidArg {
                what: format!("relative permittivity must be positive, got {relative_permittivity}"),
            });
        }
        if !(thickness.is_finite() && thickness.magnitude() > 0.0) {
            return Err(CoreError::InvalidArg {
                what: format!("oxide thickness must be positive, got {thickness}"),
            });
        }
        Ok(Self {
            relative_permittivity,
            thickness,
        })
    }

    pub fn relative_permittivity(&self) -> f64 {
        self.relative_permittivity
    }

    pub fn thickness(&self) -> &Quantity {
        &self.thickness
    }

    /// Areal capacitance `eps0 * eps_r / tox`, in F/cm^2.
    pub fn capacitance(&self) -> CoreResult<Quantity> {
        (&(epsilon_0() * self.relative_permittivity) / &self.thickness)
            .convert(&Unit::FARAD_PER_SQ_CENTIMETER)
    }
}

/// Induced sheet carrier density `Cox * overdrive / q`, in cm^-2.
///
/// Gate voltages on the off side of threshold give zero density.
pub fn carrier_density(
    cox: &Quantity,
    vg: &Quantity,
    vt: &Quantity,
    kind: &dyn DeviceKind,
) -> CoreResult<Quantity> {
    cox.ensure_dimension(Dimension::AREAL_CAPACITANCE, "gate capacitance")?;
    let vg = vg.value_in(&Unit::VOLT)?;
    let vt = vt.value_in(&Unit::VOLT)?;
    let overdrive = Quantity::new(kind.overdrive(vg, vt), Unit::VOLT);
    (&(cox * &overdrive) / &elementary_charge()).convert(&Unit::PER_SQ_CENTIMETER)
}

/// Field-effect mobility `L * gm / (Cox * Vd)`, in cm^2/(V*s).
///
/// `gm` is the width-normalized transconductance.
pub fn mobility(
    length: &Quantity,
    gm: &Quantity,
    cox: &Quantity,
    vd: &Quantity,
) -> CoreResult<Quantity> {
    length.ensure_dimension(Dimension::LENGTH, "channel length")?;
    gm.ensure_dimension(Dimension::LINEAR_CONDUCTANCE, "transconductance")?;
    cox.ensure_dimension(Dimension::AREAL_CAPACITANCE, "gate capacitance")?;
    vd.ensure_dimension(Dimension::VOLTAGE, "drain voltage")?;
    (&(length * gm) / &(cox * vd)).convert(&Unit::SQ_CENTIMETER_PER_VOLT_SECOND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polarity::{NType, PType};
    use iv_core::{nearly_equal, nm, Tolerances};

    fn tol() -> Tolerances {
        Tolerances { abs: 0.0, rel: 1e-9 }
    }

    fn oxide() -> GateOxide {
        GateOxide::new(3.9, nm(90.0)).unwrap()
    }

    #[test]
    fn silicon_dioxide_capacitance() {
        let cox = oxide().capacitance().unwrap();
        assert_eq!(cox.unit(), &Unit::FARAD_PER_SQ_CENTIMETER);
        let expected = 8.854_187_8128e-12 * 3.9 / 90e-9 * 1e-4;
        assert!(nearly_equal(cox.magnitude(), expected, tol()));
    }

    #[test]
    fn oxide_rejects_bad_inputs() {
        assert!(GateOxide::new(-1.0, nm(90.0)).is_err());
        assert!(GateOxide::new(3.9, nm(0.0)).is_err());
        assert!(GateOxide::new(3.9, nm(f64::NAN)).is_err());
    }

    #[test]
    fn density_is_clamped_below_threshold() {
        let cox = oxide().capacitance().unwrap();
        let vt = Quantity::new(1.0, Unit::VOLT);
        let off = carrier_density(&cox, &Quantity::new(0.0, Unit::VOLT), &vt, &NType).unwrap();
        assert_eq!(off.magnitude(), 0.0);

        let on = carrier_density(&cox, &Quantity::new(11.0, Unit::VOLT), &vt, &NType).unwrap();
        let expected = cox.magnitude() * 10.0 / 1.602_176_634e-19;
        assert!(nearly_equal(on.magnitude(), expected, tol()));

        let holes =
            carrier_density(&cox, &Quantity::new(-9.0, Unit::VOLT), &vt, &PType).unwrap();
        assert!(nearly_equal(holes.magnitude(), expected, tol()));
    }

    #[test]
    fn mobility_in_square_centimeters() {
        let cox = Quantity::new(1e-8, Unit::FARAD_PER_SQ_CENTIMETER);
        let gm = Quantity::new(1.0, Unit::MICROSIEMENS_PER_MICROMETER);
        let mu = mobility(
            &Quantity::new(1.0, Unit::MICROMETER),
            &gm,
            &cox,
            &Quantity::new(1.0, Unit::VOLT),
        )
        .unwrap();
        // 1e-6 m * 1 S/m / (1e-4 F/m^2 * 1 V) = 1e-2 m^2/(V s) = 100 cm^2/(V s)
        assert!(nearly_equal(mu.magnitude(), 100.0, tol()));
        assert_eq!(mu.unit(), &Unit::SQ_CENTIMETER_PER_VOLT_SECOND);
    }

    #[test]
    fn mobility_checks_dimensions() {
        let cox = Quantity::new(1e-8, Unit::FARAD_PER_SQ_CENTIMETER);
        let err = mobility(
            &Quantity::new(1.0, Unit::MICROMETER),
            &Quantity::new(1.0, Unit::SIEMENS),
            &cox,
            &Quantity::new(1.0, Unit::VOLT),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::DimensionMismatch { .. }));
    }
}
