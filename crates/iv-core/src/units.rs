// iv-core/src/units.rs

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Div, Mul, Neg};

use uom::si::f64::Length as UomLength;

use crate::dimension::Dimension;
use crate::error::{CoreError, CoreResult};
use crate::numeric::round_decimals;

// Statically typed SI lengths (uom) used for device geometry at API boundaries
pub type Length = UomLength;

#[inline]
pub fn um(v: f64) -> Length {
    use uom::si::length::micrometer;
    Length::new::<micrometer>(v)
}

#[inline]
pub fn nm(v: f64) -> Length {
    use uom::si::length::nanometer;
    Length::new::<nanometer>(v)
}

/// A measurement unit: display symbol, physical dimension and the SI value of
/// one unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    symbol: Cow<'static, str>,
    dimension: Dimension,
    scale: f64,
}

impl Unit {
    pub const DIMENSIONLESS: Unit = Unit::fixed("", Dimension::DIMENSIONLESS, 1.0);
    pub const METER: Unit = Unit::fixed("m", Dimension::LENGTH, 1.0);
    pub const CENTIMETER: Unit = Unit::fixed("cm", Dimension::LENGTH, 1e-2);
    pub const MICROMETER: Unit = Unit::fixed("um", Dimension::LENGTH, 1e-6);
    pub const NANOMETER: Unit = Unit::fixed("nm", Dimension::LENGTH, 1e-9);
    pub const SECOND: Unit = Unit::fixed("s", Dimension::TIME, 1.0);
    pub const KELVIN: Unit = Unit::fixed("K", Dimension::TEMPERATURE, 1.0);
    pub const AMPERE: Unit = Unit::fixed("A", Dimension::CURRENT, 1.0);
    pub const MICROAMPERE: Unit = Unit::fixed("uA", Dimension::CURRENT, 1e-6);
    pub const VOLT: Unit = Unit::fixed("V", Dimension::VOLTAGE, 1.0);
    pub const MILLIVOLT: Unit = Unit::fixed("mV", Dimension::VOLTAGE, 1e-3);
    pub const OHM: Unit = Unit::fixed("Ohm", Dimension::RESISTANCE, 1.0);
    pub const SIEMENS: Unit = Unit::fixed("S", Dimension::CONDUCTANCE, 1.0);
    pub const FARAD: Unit = Unit::fixed("F", Dimension::CAPACITANCE, 1.0);
    pub const COULOMB: Unit = Unit::fixed("C", Dimension::CHARGE, 1.0);
    pub const VOLT_PER_METER: Unit = Unit::fixed("V/m", Dimension::ELECTRIC_FIELD, 1.0);

    pub const AMPERE_PER_METER: Unit =
        Unit::fixed("A/m", Dimension::LINEAR_CURRENT_DENSITY, 1.0);
    pub const MICROAMPERE_PER_MICROMETER: Unit =
        Unit::fixed("uA/um", Dimension::LINEAR_CURRENT_DENSITY, 1.0);
    pub const SIEMENS_PER_METER: Unit = Unit::fixed("S/m", Dimension::LINEAR_CONDUCTANCE, 1.0);
    pub const MICROSIEMENS_PER_MICROMETER: Unit =
        Unit::fixed("uS/um", Dimension::LINEAR_CONDUCTANCE, 1.0);
    pub const SQ_METER_PER_VOLT_SECOND: Unit =
        Unit::fixed("m^2/(V*s)", Dimension::MOBILITY, 1.0);
    pub const SQ_CENTIMETER_PER_VOLT_SECOND: Unit =
        Unit::fixed("cm^2/(V*s)", Dimension::MOBILITY, 1e-4);
    /// Volts per decade of current; the decade itself is dimensionless.
    pub const VOLT_PER_DECADE: Unit = Unit::fixed("V/dec", Dimension::VOLTAGE, 1.0);
    pub const MILLIVOLT_PER_DECADE: Unit = Unit::fixed("mV/dec", Dimension::VOLTAGE, 1e-3);
    pub const PER_SQ_METER: Unit = Unit::fixed("m^-2", Dimension::AREAL_DENSITY, 1.0);
    pub const PER_SQ_CENTIMETER: Unit = Unit::fixed("cm^-2", Dimension::AREAL_DENSITY, 1e4);
    pub const FARAD_PER_SQ_METER: Unit =
        Unit::fixed("F/m^2", Dimension::AREAL_CAPACITANCE, 1.0);
    pub const FARAD_PER_SQ_CENTIMETER: Unit =
        Unit::fixed("F/cm^2", Dimension::AREAL_CAPACITANCE, 1e4);
    pub const OHM_METER: Unit = Unit::fixed("Ohm*m", Dimension::LINEAR_RESISTANCE, 1.0);
    pub const OHM_MICROMETER: Unit = Unit::fixed("Ohm*um", Dimension::LINEAR_RESISTANCE, 1e-6);
    pub const OHM_PER_SQUARE: Unit = Unit::fixed("Ohm/sq", Dimension::RESISTANCE, 1.0);

    const fn fixed(symbol: &'static str, dimension: Dimension, scale: f64) -> Unit {
        Unit {
            symbol: Cow::Borrowed(symbol),
            dimension,
            scale,
        }
    }

    pub fn new(symbol: impl Into<String>, dimension: Dimension, scale: f64) -> CoreResult<Unit> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(CoreError::InvalidArg {
                what: format!("unit scale must be positive and finite, got {scale}"),
            });
        }
        Ok(Unit {
            symbol: Cow::Owned(symbol.into()),
            dimension,
            scale,
        })
    }

    /// Coherent SI unit for a dimension, labelled with the base-unit expression.
    pub fn si(dimension: Dimension) -> Unit {
        let symbol = if dimension.is_dimensionless() {
            String::new()
        } else {
            dimension.to_string()
        };
        Unit {
            symbol: Cow::Owned(symbol),
            dimension,
            scale: 1.0,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.dimension == other.dimension
    }

    pub fn mul(&self, other: &Unit) -> Unit {
        let symbol = match (self.symbol.is_empty(), other.symbol.is_empty()) {
            (true, _) => other.symbol.to_string(),
            (_, true) => self.symbol.to_string(),
            _ => format!("{}*{}", group(&self.symbol), group(&other.symbol)),
        };
        Unit {
            symbol: Cow::Owned(symbol),
            dimension: self.dimension * other.dimension,
            scale: self.scale * other.scale,
        }
    }

    pub fn div(&self, other: &Unit) -> Unit {
        let symbol = match (self.symbol.is_empty(), other.symbol.is_empty()) {
            (_, true) => self.symbol.to_string(),
            (true, false) => format!("1/{}", group(&other.symbol)),
            _ => format!("{}/{}", group(&self.symbol), group(&other.symbol)),
        };
        Unit {
            symbol: Cow::Owned(symbol),
            dimension: self.dimension / other.dimension,
            scale: self.scale / other.scale,
        }
    }

    pub fn powi(&self, n: i8) -> Unit {
        let symbol = match n {
            _ if self.symbol.is_empty() => String::new(),
            1 => self.symbol.to_string(),
            _ => format!("{}^{}", group(&self.symbol), n),
        };
        Unit {
            symbol: Cow::Owned(symbol),
            dimension: self.dimension.powi(n),
            scale: self.scale.powi(n as i32),
        }
    }
}

fn group(symbol: &str) -> Cow<'_, str> {
    if symbol.contains(['*', '/']) {
        Cow::Owned(format!("({symbol})"))
    } else {
        Cow::Borrowed(symbol)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

/// An immutable magnitude tagged with a unit (and therefore a dimension).
///
/// Addition, subtraction and comparison require identical dimensions;
/// multiplication and division combine them. Every operation yields a new
/// quantity.
#[derive(Clone, Debug)]
pub struct Quantity {
    magnitude: f64,
    unit: Unit,
}

impl Quantity {
    pub fn new(magnitude: f64, unit: Unit) -> Self {
        Self { magnitude, unit }
    }

    pub fn dimensionless(magnitude: f64) -> Self {
        Self::new(magnitude, Unit::DIMENSIONLESS)
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn dimension(&self) -> Dimension {
        self.unit.dimension
    }

    /// Magnitude expressed in coherent SI units.
    pub fn si_value(&self) -> f64 {
        self.magnitude * self.unit.scale
    }

    pub fn to_si(&self) -> Quantity {
        Quantity::new(self.si_value(), Unit::si(self.dimension()))
    }

    pub fn convert(&self, target: &Unit) -> CoreResult<Quantity> {
        self.ensure_dimension(target.dimension, format!("conversion to '{target}'"))?;
        Ok(Quantity::new(self.si_value() / target.scale, target.clone()))
    }

    /// Magnitude of this quantity in `target` units.
    pub fn value_in(&self, target: &Unit) -> CoreResult<f64> {
        Ok(self.convert(target)?.magnitude)
    }

    pub fn ensure_dimension(&self, expected: Dimension, context: impl Into<String>) -> CoreResult<()> {
        if self.dimension() == expected {
            Ok(())
        } else {
            Err(CoreError::mismatch(context, expected, self.dimension()))
        }
    }

    pub fn try_add(&self, other: &Quantity) -> CoreResult<Quantity> {
        self.ensure_same("addition", other)?;
        Ok(Quantity::new(
            self.magnitude + other.si_value() / self.unit.scale,
            self.unit.clone(),
        ))
    }

    pub fn try_sub(&self, other: &Quantity) -> CoreResult<Quantity> {
        self.ensure_same("subtraction", other)?;
        Ok(Quantity::new(
            self.magnitude - other.si_value() / self.unit.scale,
            self.unit.clone(),
        ))
    }

    pub fn try_cmp(&self, other: &Quantity) -> CoreResult<Ordering> {
        self.ensure_same("comparison", other)?;
        self.si_value()
            .partial_cmp(&other.si_value())
            .ok_or(CoreError::NonFinite {
                what: "comparison operand",
                value: f64::NAN,
            })
    }

    pub fn abs(&self) -> Quantity {
        Quantity::new(self.magnitude.abs(), self.unit.clone())
    }

    pub fn powi(&self, n: i8) -> Quantity {
        Quantity::new(self.magnitude.powi(n as i32), self.unit.powi(n))
    }

    pub fn recip(&self) -> Quantity {
        self.powi(-1)
    }

    pub fn round_decimals(&self, decimals: i32) -> Quantity {
        Quantity::new(round_decimals(self.magnitude, decimals), self.unit.clone())
    }

    pub fn is_finite(&self) -> bool {
        self.magnitude.is_finite()
    }

    fn ensure_same(&self, op: &str, other: &Quantity) -> CoreResult<()> {
        other.ensure_dimension(self.dimension(), format!("{op} with '{self}'"))
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.dimension() == other.dimension() && self.si_value() == other.si_value()
    }
}

impl PartialOrd for Quantity {
    /// `None` when the dimensions differ.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.dimension() != other.dimension() {
            return None;
        }
        self.si_value().partial_cmp(&other.si_value())
    }
}

impl Mul<&Quantity> for &Quantity {
    type Output = Quantity;

    fn mul(self, rhs: &Quantity) -> Quantity {
        Quantity::new(self.magnitude * rhs.magnitude, self.unit.mul(&rhs.unit))
    }
}

impl Mul for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: Quantity) -> Quantity {
        &self * &rhs
    }
}

impl Div<&Quantity> for &Quantity {
    type Output = Quantity;

    fn div(self, rhs: &Quantity) -> Quantity {
        Quantity::new(self.magnitude / rhs.magnitude, self.unit.div(&rhs.unit))
    }
}

impl Div for Quantity {
    type Output = Quantity;

    fn div(self, rhs: Quantity) -> Quantity {
        &self / &rhs
    }
}

impl Mul<f64> for &Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Quantity {
        Quantity::new(self.magnitude * rhs, self.unit.clone())
    }
}

impl Mul<f64> for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Quantity {
        &self * rhs
    }
}

impl Div<f64> for &Quantity {
    type Output = Quantity;

    fn div(self, rhs: f64) -> Quantity {
        Quantity::new(self.magnitude / rhs, self.unit.clone())
    }
}

impl Div<f64> for Quantity {
    type Output = Quantity;

    fn div(self, rhs: f64) -> Quantity {
        &self / rhs
    }
}

impl Neg for Quantity {
    type Output = Quantity;

    fn neg(self) -> Quantity {
        Quantity::new(-self.magnitude, self.unit)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.symbol.is_empty() {
            write!(f, "{}", self.magnitude)
        } else {
            write!(f, "{} {}", self.magnitude, self.unit.symbol)
        }
    }
}

impl From<Length> for Quantity {
    fn from(v: Length) -> Self {
        Quantity::new(v.value, Unit::METER)
    }
}

pub mod constants {
    use super::*;

    /// Vacuum permittivity (F/m).
    pub const EPSILON_0_F_PER_M: f64 = 8.854_187_8128e-12;
    /// Elementary charge (C).
    pub const ELEMENTARY_CHARGE_C: f64 = 1.602_176_634e-19;

    #[inline]
    pub fn epsilon_0() -> Quantity {
        Quantity::new(EPSILON_0_F_PER_M, Unit::FARAD.div(&Unit::METER))
    }

    #[inline]
    pub fn elementary_charge() -> Quantity {
        Quantity::new(ELEMENTARY_CHARGE_C, Unit::COULOMB)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::numeric::{Tolerances, nearly_equal};
    use proptest::prelude::*;

    fn compatible_pairs() -> impl Strategy<Value = (Unit, Unit)> {
        prop_oneof![
            Just((Unit::VOLT, Unit::MILLIVOLT)),
            Just((Unit::AMPERE, Unit::MICROAMPERE)),
            Just((Unit::METER, Unit::NANOMETER)),
            Just((Unit::PER_SQ_METER, Unit::PER_SQ_CENTIMETER)),
            Just((Unit::SQ_METER_PER_VOLT_SECOND, Unit::SQ_CENTIMETER_PER_VOLT_SECOND)),
            Just((Unit::OHM_METER, Unit::OHM_MICROMETER)),
        ]
    }

    proptest! {
        #[test]
        fn conversion_round_trip(value in -1e12_f64..1e12_f64, (from, to) in compatible_pairs()) {
            let q = Quantity::new(value, from.clone());
            let back = q.convert(&to).unwrap().convert(&from).unwrap();
            let tol = Tolerances { abs: 1e-9, rel: 1e-12 };
            prop_assert!(nearly_equal(back.magnitude(), value, tol));
        }

        #[test]
        fn division_undoes_multiplication(a in 1e-6_f64..1e6_f64, b in 1e-6_f64..1e6_f64) {
            let va = Quantity::new(a, Unit::VOLT);
            let ib = Quantity::new(b, Unit::MICROAMPERE);
            let back = &(&va * &ib) / &ib;
            prop_assert_eq!(back.dimension(), Dimension::VOLTAGE);
            let tol = Tolerances { abs: 1e-12, rel: 1e-12 };
            prop_assert!(nearly_equal(back.si_value(), a, tol));
        }
    }
}
