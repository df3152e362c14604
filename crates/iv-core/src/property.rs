//! Typed device properties.
//!
//! A [`TypedProperty`] holds one named physical result (for example the
//! maximum transconductance of a transistor) together with the measurement
//! conditions it was extracted at. The [`PropertySpec`] it is built from is the
//! contract: the value must carry the declared dimension, every required
//! condition must be supplied with the right dimension, and optional
//! conditions are recorded only when they are well typed.

use indexmap::IndexMap;

use crate::dimension::Dimension;
use crate::error::{CoreError, CoreResult};
use crate::units::{Quantity, Unit};

/// A named condition input and the dimension it must have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputSpec {
    pub name: &'static str,
    pub dimension: Dimension,
}

/// Dimensional contract for a family of properties.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertySpec {
    pub kind: &'static str,
    pub dimension: Dimension,
    /// Unit the value is rescaled into on `set`.
    pub canonical_unit: Option<Unit>,
    /// Decimal places kept after rescaling into `canonical_unit`.
    pub precision: Option<i32>,
    pub required_inputs: Vec<InputSpec>,
    pub optional_inputs: Vec<InputSpec>,
}

impl PropertySpec {
    pub fn new(kind: &'static str, dimension: Dimension) -> Self {
        Self {
            kind,
            dimension,
            canonical_unit: None,
            precision: None,
            required_inputs: Vec::new(),
            optional_inputs: Vec::new(),
        }
    }

    /// Rescale stored values into `unit`, rounded to `decimals` places.
    pub fn canonical(mut self, unit: Unit, decimals: i32) -> Self {
        debug_assert_eq!(unit.dimension(), self.dimension);
        self.canonical_unit = Some(unit);
        self.precision = Some(decimals);
        self
    }

    pub fn require(mut self, name: &'static str, dimension: Dimension) -> Self {
        self.required_inputs.push(InputSpec { name, dimension });
        self
    }

    pub fn optional(mut self, name: &'static str, dimension: Dimension) -> Self {
        self.optional_inputs.push(InputSpec { name, dimension });
        self
    }
}

/// Named measurement conditions, in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Conditions(IndexMap<String, Quantity>);

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: Quantity) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Quantity) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Quantity> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Quantity)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Quantity)> for Conditions {
    fn from_iter<I: IntoIterator<Item = (String, Quantity)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypedProperty {
    name: String,
    spec: PropertySpec,
    value: Option<Quantity>,
    recorded_inputs: Conditions,
}

impl TypedProperty {
    /// Create an empty property; it holds no value until [`set`](Self::set).
    pub fn new(name: impl Into<String>, spec: PropertySpec) -> Self {
        Self {
            name: name.into(),
            spec,
            value: None,
            recorded_inputs: Conditions::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> &PropertySpec {
        &self.spec
    }

    pub fn value(&self) -> Option<&Quantity> {
        self.value.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub fn recorded_inputs(&self) -> &Conditions {
        &self.recorded_inputs
    }

    pub fn input(&self, name: &str) -> Option<&Quantity> {
        self.recorded_inputs.get(name)
    }

    /// Validate and store `value` with its measurement conditions.
    ///
    /// Nothing is modified unless every check passes. Unknown condition
    /// names are ignored.
    pub fn set(&mut self, value: Quantity, inputs: Option<&Conditions>) -> CoreResult<&Quantity> {
        value.ensure_dimension(self.spec.dimension, format!("property '{}'", self.name))?;

        let mut recorded = Conditions::new();
        for req in &self.spec.required_inputs {
            let input = inputs
                .and_then(|c| c.get(req.name))
                .ok_or_else(|| CoreError::MissingInput {
                    property: self.name.clone(),
                    input: req.name.to_string(),
                })?;
            input.ensure_dimension(
                req.dimension,
                format!("input '{}' of property '{}'", req.name, self.name),
            )?;
            recorded.insert(req.name, input.clone());
        }

        if let Some(inputs) = inputs {
            for opt in &self.spec.optional_inputs {
                if let Some(input) = inputs.get(opt.name) {
                    input.ensure_dimension(
                        opt.dimension,
                        format!("input '{}' of property '{}'", opt.name, self.name),
                    )?;
                    recorded.insert(opt.name, input.clone());
                }
            }
        }

        let stored = match (&self.spec.canonical_unit, self.spec.precision) {
            (Some(unit), Some(decimals)) => value.convert(unit)?.round_decimals(decimals),
            (Some(unit), None) => value.convert(unit)?,
            (None, _) => value,
        };

        self.recorded_inputs = recorded;
        Ok(&*self.value.insert(stored))
    }

    pub fn clear(&mut self) {
        self.value = None;
        self.recorded_inputs = Conditions::new();
    }
}

impl std::fmt::Display for TypedProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{} = {}", self.name, v),
            None => write!(f, "{} = <unset>", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gm_spec() -> PropertySpec {
        PropertySpec::new("Transconductance", Dimension::LINEAR_CONDUCTANCE)
            .canonical(Unit::MICROSIEMENS_PER_MICROMETER, 2)
            .require("Vd", Dimension::VOLTAGE)
            .require("Vg", Dimension::VOLTAGE)
            .optional("temperature", Dimension::TEMPERATURE)
    }

    fn bias() -> Conditions {
        Conditions::new()
            .with("Vd", Quantity::new(1.0, Unit::VOLT))
            .with("Vg", Quantity::new(4.0, Unit::VOLT))
    }

    #[test]
    fn set_rescales_and_rounds() {
        let mut prop = TypedProperty::new("maximum transconductance", gm_spec());
        assert!(!prop.is_set());
        let value = Quantity::new(12.3456, Unit::SIEMENS_PER_METER);
        let stored = prop.set(value, Some(&bias())).unwrap().clone();
        assert_eq!(stored.unit(), &Unit::MICROSIEMENS_PER_MICROMETER);
        assert_eq!(stored.magnitude(), 12.35);
        assert_eq!(prop.recorded_inputs().len(), 2);
        assert_eq!(prop.input("Vg").unwrap().magnitude(), 4.0);
    }

    #[test]
    fn set_rejects_wrong_value_dimension() {
        let mut prop = TypedProperty::new("gm", gm_spec());
        let err = prop
            .set(Quantity::new(1.0, Unit::VOLT), Some(&bias()))
            .unwrap_err();
        assert!(matches!(err, CoreError::DimensionMismatch { .. }));
        assert!(!prop.is_set());
    }

    #[test]
    fn set_reports_missing_required_input() {
        let mut prop = TypedProperty::new("gm", gm_spec());
        let partial = Conditions::new().with("Vd", Quantity::new(1.0, Unit::VOLT));
        let err = prop
            .set(Quantity::new(1.0, Unit::SIEMENS_PER_METER), Some(&partial))
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::MissingInput {
                property: "gm".into(),
                input: "Vg".into()
            }
        );

        let err = prop
            .set(Quantity::new(1.0, Unit::SIEMENS_PER_METER), None)
            .unwrap_err();
        assert!(matches!(err, CoreError::MissingInput { .. }));
    }

    #[test]
    fn set_rejects_mistyped_input() {
        let mut prop = TypedProperty::new("gm", gm_spec());
        let bad = bias().with("Vd", Quantity::new(1.0, Unit::AMPERE));
        let err = prop
            .set(Quantity::new(1.0, Unit::SIEMENS_PER_METER), Some(&bad))
            .unwrap_err();
        assert!(matches!(err, CoreError::DimensionMismatch { .. }));
    }

    #[test]
    fn optional_inputs_recorded_and_unknown_ignored() {
        let mut prop = TypedProperty::new("gm", gm_spec());
        let inputs = bias()
            .with("temperature", Quantity::new(300.0, Unit::KELVIN))
            .with("humidity", Quantity::dimensionless(0.4));
        prop.set(Quantity::new(1.0, Unit::SIEMENS_PER_METER), Some(&inputs))
            .unwrap();
        assert!(prop.input("temperature").is_some());
        assert!(prop.input("humidity").is_none());
    }

    #[test]
    fn property_without_inputs_accepts_none() {
        let spec = PropertySpec::new("Voltage", Dimension::VOLTAGE).canonical(Unit::VOLT, 2);
        let mut vt = TypedProperty::new("threshold voltage", spec);
        vt.set(Quantity::new(3_888.888, Unit::MILLIVOLT), None).unwrap();
        assert_eq!(vt.value().unwrap().magnitude(), 3.89);
        assert_eq!(vt.value().unwrap().unit(), &Unit::VOLT);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn dimension() -> impl Strategy<Value = Dimension> {
        prop_oneof![
            Just(Dimension::VOLTAGE),
            Just(Dimension::CURRENT),
            Just(Dimension::LENGTH),
            Just(Dimension::MOBILITY),
            Just(Dimension::LINEAR_CONDUCTANCE),
            Just(Dimension::AREAL_DENSITY),
        ]
    }

    proptest! {
        #[test]
        fn set_accepts_exactly_the_declared_dimension(
            declared in dimension(),
            given in dimension(),
            magnitude in -1e6_f64..1e6_f64,
        ) {
            let mut prop = TypedProperty::new("p", PropertySpec::new("Generic", declared));
            let value = Quantity::new(magnitude, Unit::si(given));
            let result = prop.set(value, None);
            if declared == given {
                prop_assert!(result.is_ok());
                prop_assert_eq!(prop.value().unwrap().dimension(), declared);
            } else {
                let is_mismatch = matches!(result, Err(CoreError::DimensionMismatch { .. }));
                prop_assert!(is_mismatch);
            }
        }
    }
}
