use iv_core::{nm, um, Unit};
use iv_dataset::{Layout, RawTable, SweepTable};
use iv_extract::*;

const VG: [f64; 5] = [0.0, 1.0, 2.0, 3.0, 4.0];
// Shared transfer shape; scaling it keeps the threshold voltage fixed.
const SHAPE: [f64; 5] = [1e-3, 1e-2, 0.1, 0.4, 1.0];

fn tlm_device(length_um: f64, total_resistance: f64) -> (FetDevice, SweepTable) {
    let oxide = GateOxide::new(3.9, nm(90.0)).unwrap();
    let device = FetDevice::new(
        format!("L{length_um}"),
        Polarity::N,
        um(length_um),
        um(1.0),
        oxide,
    )
    .unwrap();
    let raw = RawTable::new()
        .with_column("GateV", VG.to_vec())
        .unwrap()
        .with_column("DrainI", SHAPE.iter().map(|s| s / total_resistance).collect())
        .unwrap()
        .with_column("DrainV", vec![1.0; VG.len()])
        .unwrap();
    (device, SweepTable::from_raw(Layout::IdVg, &raw).unwrap())
}

fn devices() -> Vec<(FetDevice, SweepTable)> {
    vec![
        tlm_device(0.5, 300.0),
        tlm_device(1.0, 400.0),
        tlm_device(2.0, 600.0),
    ]
}

#[test]
fn contact_and_sheet_resistance_from_three_lengths() {
    let ext = ExtractionEngine::default()
        .extract_tlm("tlm", devices())
        .unwrap();
    let model = &ext.model;

    assert_eq!(ext.devices.len(), 3);
    assert_eq!(model.lengths.len(), 3);
    // Vt is 7/3 V, so the first three gate voltages carry no density.
    assert_eq!(model.points.len(), 2);
    let below = ext
        .warnings
        .iter()
        .filter(|w| matches!(w, ExtractionWarning::BelowThreshold { .. }))
        .count();
    assert_eq!(below, 3);
    assert!(!ext
        .warnings
        .iter()
        .any(|w| matches!(w, ExtractionWarning::DensitySpread { .. })));

    let rc = model.contact_resistance.value().unwrap();
    let rsh = model.sheet_resistance.value().unwrap();
    assert_eq!(rc.unit(), &Unit::OHM_MICROMETER);
    assert_eq!(rsh.unit(), &Unit::OHM_PER_SQUARE);
    assert_eq!(rc.magnitude(), 100.0);
    assert_eq!(rsh.magnitude(), 200.0);
    assert!(model.contact_resistance.input("n").is_some());

    let top = model.points.last().unwrap();
    assert_eq!(top.index, 4);
    assert!(top.sheet_resistance_error.as_ref().unwrap().magnitude().abs() < 1e-6);

    assert_eq!(ext.table.layout(), Layout::Tlm);
    assert_eq!(ext.table.num_sets(), 3);
    assert_eq!(ext.table.samples(), 2);
}

#[test]
fn lower_density_point_scales_with_shape() {
    let ext = ExtractionEngine::default()
        .extract_tlm("tlm", devices())
        .unwrap();
    // At index 3 the current is 0.4x, so every resistance scales by 2.5.
    let p = &ext.model.points[0];
    assert_eq!(p.index, 3);
    assert_eq!(p.contact_resistance.value().unwrap().magnitude(), 250.0);
    assert_eq!(p.sheet_resistance.value().unwrap().magnitude(), 500.0);
}

#[test]
fn too_few_devices_is_rejected() {
    let err = ExtractionEngine::default()
        .extract_tlm("tlm", vec![tlm_device(1.0, 400.0)])
        .unwrap_err();
    assert!(matches!(err, ExtractError::InvalidInput { .. }));
}

#[test]
fn ambipolar_devices_are_rejected() {
    let mut devs = devices();
    devs[1].0.polarity = Polarity::Ambipolar;
    let err = ExtractionEngine::default()
        .extract_tlm("tlm", devs)
        .unwrap_err();
    assert!(matches!(err, ExtractError::InvalidInput { .. }));
}

#[test]
fn tlm_csv_lists_points() {
    let ext = ExtractionEngine::default()
        .extract_tlm("tlm", devices())
        .unwrap();
    let csv = ext.model.to_csv();
    assert!(csv.contains("contact_resistance,100,Ohm*um\n"));
    assert!(csv.contains("sheet_resistance_4,200,Ohm/sq\n"));
    assert!(csv.contains("length_2,2,um\n"));
}
