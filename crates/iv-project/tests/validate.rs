use std::collections::BTreeMap;

use iv_project::*;

fn base() -> ExtractionConfig {
    ExtractionConfig {
        version: 1,
        name: "dev".to_string(),
        device: DeviceDef {
            polarity: PolarityDef::P,
            length_um: 1.0,
            width_um: 1.0,
            oxide: OxideDef {
                relative_permittivity: 25.0,
                thickness_nm: 10.0,
            },
        },
        columns: BTreeMap::new(),
        secondary_values: None,
        tlm: None,
        output: None,
    }
}

#[test]
fn accepts_base_config() {
    validate_config(&base()).unwrap();
}

#[test]
fn rejects_future_version() {
    let mut config = base();
    config.version = LATEST_VERSION + 1;
    assert!(matches!(
        validate_config(&config),
        Err(ValidationError::UnsupportedVersion { .. })
    ));
}

#[test]
fn rejects_non_positive_geometry() {
    let mut config = base();
    config.device.width_um = 0.0;
    assert!(matches!(
        validate_config(&config),
        Err(ValidationError::InvalidValue { field, .. }) if field == "device.width_um"
    ));

    let mut config = base();
    config.device.oxide.relative_permittivity = f64::NAN;
    assert!(validate_config(&config).is_err());
}

#[test]
fn rejects_unknown_role_keys() {
    let mut config = base();
    config
        .columns
        .insert("gm".to_string(), vec!["Gm".to_string()]);
    assert!(matches!(
        validate_config(&config),
        Err(ValidationError::UnknownRole { key }) if key == "gm"
    ));
}

#[test]
fn rejects_duplicate_tlm_lengths() {
    let mut config = base();
    config.tlm = Some(TlmDef {
        lengths_um: vec![1.0, 2.0, 1.0],
        drain_voltage: None,
        max_density_spread: 0.1,
    });
    assert!(matches!(
        validate_config(&config),
        Err(ValidationError::DuplicateLength { value }) if value == 1.0
    ));
}

#[test]
fn rejects_single_tlm_length_and_ambipolar_tlm() {
    let mut config = base();
    config.tlm = Some(TlmDef {
        lengths_um: vec![1.0],
        drain_voltage: None,
        max_density_spread: 0.1,
    });
    assert!(validate_config(&config).is_err());

    config.tlm = Some(TlmDef {
        lengths_um: vec![1.0, 2.0],
        drain_voltage: None,
        max_density_spread: 0.1,
    });
    config.device.polarity = PolarityDef::Ambipolar;
    assert!(matches!(
        validate_config(&config),
        Err(ValidationError::Unsupported { .. })
    ));
}

#[test]
fn save_refuses_invalid_config() {
    let mut config = base();
    config.name = "  ".to_string();
    let path = std::env::temp_dir().join("iv_project_invalid.yaml");
    assert!(matches!(
        save_yaml(&path, &config),
        Err(ProjectError::Validation(_))
    ));
}
