//! Column values, keys and selectors.

use std::fmt;
use std::str::FromStr;

use iv_core::{CoreResult, Quantity, Unit};

use crate::error::{DatasetError, DatasetResult};
use crate::roles::Role;

/// One column of a sweep table: a unit shared by every set, and one value
/// sequence per set.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnData {
    unit: Unit,
    sets: Vec<Vec<f64>>,
}

impl ColumnData {
    pub fn new(unit: Unit, sets: Vec<Vec<f64>>) -> Self {
        Self { unit, sets }
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn sets(&self) -> &[Vec<f64>] {
        &self.sets
    }

    pub fn into_sets(self) -> Vec<Vec<f64>> {
        self.sets
    }

    pub fn num_sets(&self) -> usize {
        self.sets.len()
    }

    pub fn set(&self, index: usize) -> Option<Series> {
        self.sets.get(index).map(|values| Series {
            unit: self.unit.clone(),
            values: values.clone(),
        })
    }

    pub fn quantity(&self, set: usize, sample: usize) -> Option<Quantity> {
        let v = *self.sets.get(set)?.get(sample)?;
        Some(Quantity::new(v, self.unit.clone()))
    }

    /// Express the column in another unit of the same dimension.
    pub fn convert(&self, target: &Unit) -> CoreResult<ColumnData> {
        let factor = Quantity::new(1.0, self.unit.clone()).value_in(target)?;
        Ok(self.map_values(|v| v * factor, target.clone()))
    }

    /// Divide every value by a quantity; the unit becomes `unit / q.unit`.
    pub fn divide_by(&self, q: &Quantity) -> ColumnData {
        let m = q.magnitude();
        self.map_values(|v| v / m, self.unit.div(q.unit()))
    }

    pub fn multiply_by(&self, q: &Quantity) -> ColumnData {
        let m = q.magnitude();
        self.map_values(|v| v * m, self.unit.mul(q.unit()))
    }

    /// Apply `f` to every value and tag the result with `unit`.
    pub fn map_values(&self, f: impl Fn(f64) -> f64, unit: Unit) -> ColumnData {
        ColumnData {
            unit,
            sets: self
                .sets
                .iter()
                .map(|set| set.iter().map(|&v| f(v)).collect())
                .collect(),
        }
    }
}

/// A single set's values with their unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub unit: Unit,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(unit: Unit, values: Vec<f64>) -> Self {
        Self { unit, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn quantity(&self, index: usize) -> Option<Quantity> {
        self.values
            .get(index)
            .map(|&v| Quantity::new(v, self.unit.clone()))
    }

    pub fn convert(&self, target: &Unit) -> CoreResult<Series> {
        let factor = Quantity::new(1.0, self.unit.clone()).value_in(target)?;
        Ok(Series {
            unit: target.clone(),
            values: self.values.iter().map(|v| v * factor).collect(),
        })
    }
}

/// Which part of a bidirectional sweep to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Branch {
    #[default]
    Full,
    Forward,
    Backward,
}

impl Branch {
    pub fn suffix(self) -> &'static str {
        match self {
            Branch::Full => "",
            Branch::Forward => "_fwd",
            Branch::Backward => "_bwd",
        }
    }

    /// Slice one set's samples; `boundary` is the first backward sample.
    pub fn slice(self, values: &[f64], boundary: usize) -> &[f64] {
        let boundary = boundary.min(values.len());
        match self {
            Branch::Full => values,
            Branch::Forward => &values[..boundary],
            Branch::Backward => &values[boundary..],
        }
    }
}

/// Identifies a stored column: a measured role, or a derived column added
/// after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Role(Role),
    Derived(String),
}

impl From<Role> for ColumnKey {
    fn from(role: Role) -> Self {
        ColumnKey::Role(role)
    }
}

impl From<&str> for ColumnKey {
    fn from(name: &str) -> Self {
        match Role::from_key(name) {
            Some(role) => ColumnKey::Role(role),
            None => ColumnKey::Derived(name.to_ascii_lowercase()),
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Role(role) => f.write_str(role.key()),
            ColumnKey::Derived(name) => f.write_str(name),
        }
    }
}

/// A column key plus sweep branch, written as `vg`, `id_fwd`, `gm_bwd`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnSelector {
    pub key: ColumnKey,
    pub branch: Branch,
}

impl ColumnSelector {
    pub fn new(key: impl Into<ColumnKey>, branch: Branch) -> Self {
        Self {
            key: key.into(),
            branch,
        }
    }

    pub fn full(key: impl Into<ColumnKey>) -> Self {
        Self::new(key, Branch::Full)
    }
}

impl FromStr for ColumnSelector {
    type Err = DatasetError;

    fn from_str(s: &str) -> DatasetResult<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let (name, branch) = if let Some(name) = lower.strip_suffix("_fwd") {
            (name, Branch::Forward)
        } else if let Some(name) = lower.strip_suffix("_bwd") {
            (name, Branch::Backward)
        } else {
            (lower.as_str(), Branch::Full)
        };
        if name.is_empty() {
            return Err(DatasetError::UnknownColumn {
                name: s.to_string(),
            });
        }
        Ok(ColumnSelector::new(name, branch))
    }
}

impl fmt::Display for ColumnSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.key, self.branch.suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_parses_branch_suffix() {
        let sel: ColumnSelector = "Vg_fwd".parse().unwrap();
        assert_eq!(sel.key, ColumnKey::Role(Role::GateVoltage));
        assert_eq!(sel.branch, Branch::Forward);

        let sel: ColumnSelector = "gm_bwd".parse().unwrap();
        assert_eq!(sel.key, ColumnKey::Derived("gm".into()));
        assert_eq!(sel.to_string(), "gm_bwd");

        assert!("_fwd".parse::<ColumnSelector>().is_err());
    }

    #[test]
    fn branch_slices_at_boundary() {
        let v = [0.0, 1.0, 2.0, 2.0, 1.0, 0.0];
        assert_eq!(Branch::Forward.slice(&v, 3), &[0.0, 1.0, 2.0]);
        assert_eq!(Branch::Backward.slice(&v, 3), &[2.0, 1.0, 0.0]);
        assert_eq!(Branch::Full.slice(&v, 3).len(), 6);
    }

    #[test]
    fn divide_by_width_changes_unit() {
        let col = ColumnData::new(Unit::AMPERE, vec![vec![2e-6, 4e-6]]);
        let width = Quantity::new(2.0, Unit::MICROMETER);
        let density = col.divide_by(&width);
        assert_eq!(density.unit().dimension(), iv_core::Dimension::LINEAR_CURRENT_DENSITY);
        let per_um = density.convert(&Unit::MICROAMPERE_PER_MICROMETER).unwrap();
        assert!((per_um.sets()[0][0] - 1.0).abs() < 1e-12);
        assert!((per_um.sets()[0][1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn convert_rejects_other_dimensions() {
        let col = ColumnData::new(Unit::VOLT, vec![vec![1.0]]);
        assert!(col.convert(&Unit::AMPERE).is_err());
    }
}
