//! Configuration validation logic.

use std::collections::HashSet;

use iv_dataset::Role;

use crate::schema::{ExtractionConfig, PolarityDef, LATEST_VERSION};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown column role: {key}")]
    UnknownRole { key: String },

    #[error("Duplicate TLM length: {value} um")]
    DuplicateLength { value: f64 },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_config(config: &ExtractionConfig) -> Result<(), ValidationError> {
    if config.version == 0 || config.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }
    if config.name.trim().is_empty() {
        return Err(invalid("name", &config.name, "must not be empty"));
    }

    let device = &config.device;
    positive("device.length_um", device.length_um)?;
    positive("device.width_um", device.width_um)?;
    positive(
        "device.oxide.relative_permittivity",
        device.oxide.relative_permittivity,
    )?;
    positive("device.oxide.thickness_nm", device.oxide.thickness_nm)?;

    for (key, names) in &config.columns {
        if Role::from_key(key).is_none() {
            return Err(ValidationError::UnknownRole { key: key.clone() });
        }
        if names.is_empty() || names.iter().any(|n| n.trim().is_empty()) {
            return Err(invalid(
                &format!("columns.{key}"),
                &format!("{names:?}"),
                "needs at least one non-empty name",
            ));
        }
    }

    if let Some(values) = &config.secondary_values {
        if values.is_empty() {
            return Err(invalid("secondary_values", "[]", "must not be empty"));
        }
        if let Some(v) = values.iter().find(|v| !v.is_finite()) {
            return Err(invalid("secondary_values", &v.to_string(), "must be finite"));
        }
    }

    if let Some(tlm) = &config.tlm {
        if tlm.lengths_um.len() < 2 {
            return Err(invalid(
                "tlm.lengths_um",
                &format!("{:?}", tlm.lengths_um),
                "needs at least two lengths",
            ));
        }
        let mut seen = HashSet::new();
        for &l in &tlm.lengths_um {
            positive("tlm.lengths_um", l)?;
            if !seen.insert(l.to_bits()) {
                return Err(ValidationError::DuplicateLength { value: l });
            }
        }
        if let Some(vd) = tlm.drain_voltage.filter(|v| !v.is_finite()) {
            return Err(invalid("tlm.drain_voltage", &vd.to_string(), "must be finite"));
        }
        positive("tlm.max_density_spread", tlm.max_density_spread)?;
        if config.device.polarity == PolarityDef::Ambipolar {
            return Err(ValidationError::Unsupported {
                feature: "tlm".to_string(),
                reason: "TLM needs an n or p type device".to_string(),
            });
        }
    }

    Ok(())
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &value.to_string(), "must be positive and finite"))
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
