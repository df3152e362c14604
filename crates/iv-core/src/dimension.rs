//! Physical dimension as integer exponents over the seven SI base dimensions.

use core::fmt;
use core::ops::{Div, Mul};

const BASE_SYMBOLS: [&str; 7] = ["m", "kg", "s", "A", "K", "mol", "cd"];

/// Exponent vector ordered as length, mass, time, current, temperature,
/// amount of substance, luminous intensity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimension([i8; 7]);

impl Dimension {
    pub const DIMENSIONLESS: Self = Self([0, 0, 0, 0, 0, 0, 0]);
    pub const LENGTH: Self = Self([1, 0, 0, 0, 0, 0, 0]);
    pub const MASS: Self = Self([0, 1, 0, 0, 0, 0, 0]);
    pub const TIME: Self = Self([0, 0, 1, 0, 0, 0, 0]);
    pub const CURRENT: Self = Self([0, 0, 0, 1, 0, 0, 0]);
    pub const TEMPERATURE: Self = Self([0, 0, 0, 0, 1, 0, 0]);
    pub const AMOUNT: Self = Self([0, 0, 0, 0, 0, 1, 0]);
    pub const LUMINOSITY: Self = Self([0, 0, 0, 0, 0, 0, 1]);

    pub const AREA: Self = Self([2, 0, 0, 0, 0, 0, 0]);
    pub const CHARGE: Self = Self([0, 0, 1, 1, 0, 0, 0]);
    pub const VOLTAGE: Self = Self([2, 1, -3, -1, 0, 0, 0]);
    pub const RESISTANCE: Self = Self([2, 1, -3, -2, 0, 0, 0]);
    pub const CONDUCTANCE: Self = Self([-2, -1, 3, 2, 0, 0, 0]);
    pub const CAPACITANCE: Self = Self([-2, -1, 4, 2, 0, 0, 0]);
    pub const ELECTRIC_FIELD: Self = Self([1, 1, -3, -1, 0, 0, 0]);

    /// Current per unit channel width (A/m).
    pub const LINEAR_CURRENT_DENSITY: Self = Self([-1, 0, 0, 1, 0, 0, 0]);
    /// Conductance per unit channel width (S/m).
    pub const LINEAR_CONDUCTANCE: Self = Self([-3, -1, 3, 2, 0, 0, 0]);
    /// Width-normalized resistance (Ohm*m).
    pub const LINEAR_RESISTANCE: Self = Self([3, 1, -3, -2, 0, 0, 0]);
    /// Carrier mobility (m^2/(V*s)).
    pub const MOBILITY: Self = Self([0, -1, 2, 1, 0, 0, 0]);
    /// Sheet carrier density (m^-2).
    pub const AREAL_DENSITY: Self = Self([-2, 0, 0, 0, 0, 0, 0]);
    /// Capacitance per unit area (F/m^2).
    pub const AREAL_CAPACITANCE: Self = Self([-4, -1, 4, 2, 0, 0, 0]);

    pub const fn new(exponents: [i8; 7]) -> Self {
        Self(exponents)
    }

    pub const fn exponents(&self) -> [i8; 7] {
        self.0
    }

    pub fn is_dimensionless(&self) -> bool {
        *self == Self::DIMENSIONLESS
    }

    pub fn powi(self, n: i8) -> Self {
        let mut out = self.0;
        for e in &mut out {
            *e *= n;
        }
        Self(out)
    }

    pub fn recip(self) -> Self {
        self.powi(-1)
    }
}

impl Mul for Dimension {
    type Output = Dimension;

    fn mul(self, rhs: Dimension) -> Dimension {
        let mut out = self.0;
        for (e, r) in out.iter_mut().zip(rhs.0) {
            *e += r;
        }
        Dimension(out)
    }
}

impl Div for Dimension {
    type Output = Dimension;

    fn div(self, rhs: Dimension) -> Dimension {
        self * rhs.recip()
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "1");
        }
        let mut parts = Vec::new();
        // positive exponents first so "m^2*kg*s^-3*A^-1" reads naturally
        for positive in [true, false] {
            for (sym, &e) in BASE_SYMBOLS.iter().zip(self.0.iter()) {
                if e == 0 || (e > 0) != positive {
                    continue;
                }
                if e == 1 {
                    parts.push((*sym).to_string());
                } else {
                    parts.push(format!("{sym}^{e}"));
                }
            }
        }
        write!(f, "{}", parts.join("*"))
    }
}

impl fmt::Debug for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dimension({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_dimensions_compose() {
        assert_eq!(Dimension::VOLTAGE / Dimension::CURRENT, Dimension::RESISTANCE);
        assert_eq!(Dimension::RESISTANCE.recip(), Dimension::CONDUCTANCE);
        assert_eq!(Dimension::CHARGE / Dimension::VOLTAGE, Dimension::CAPACITANCE);
        assert_eq!(
            Dimension::CURRENT / Dimension::LENGTH,
            Dimension::LINEAR_CURRENT_DENSITY
        );
        assert_eq!(
            Dimension::AREA / (Dimension::VOLTAGE * Dimension::TIME),
            Dimension::MOBILITY
        );
        assert_eq!(
            Dimension::CAPACITANCE / Dimension::AREA,
            Dimension::AREAL_CAPACITANCE
        );
    }

    #[test]
    fn display_orders_positive_exponents_first() {
        assert_eq!(Dimension::VOLTAGE.to_string(), "m^2*kg*s^-3*A^-1");
        assert_eq!(Dimension::DIMENSIONLESS.to_string(), "1");
        assert_eq!(Dimension::LENGTH.to_string(), "m");
    }
}
