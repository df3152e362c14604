//! FET extraction from transfer (IdVg) and output (IdVd) tables.

use iv_core::{Conditions, Quantity, Unit};
use iv_dataset::{Branch, ColumnData, ColumnKey, ColumnSelector, Layout, Role, SweepTable};
use tracing::{debug, info, warn};

use crate::engine::ExtractionEngine;
use crate::error::{ExtractError, ExtractResult, ExtractionWarning};
use crate::model::{FetDevice, FetModel};
use crate::numeric::{clean_non_finite, linear_extraction, slope, LineConstraint, NonFinitePolicy};
use crate::physics::{carrier_density, mobility};
use crate::polarity::{min_magnitude, DeviceKind};

/// One device's extraction: the populated model and the tables it was read
/// from, with derived `gm`, `ss`, `n` and `r` columns added to the IdVg table.
#[derive(Debug, Clone)]
pub struct FetExtraction {
    pub model: FetModel,
    pub idvg: SweepTable,
    pub idvd: Option<SweepTable>,
    pub warnings: Vec<ExtractionWarning>,
}

/// Extreme transconductance of one sweep branch and the threshold voltage
/// extrapolated from it.
#[derive(Debug, Clone, Copy)]
struct BranchFit {
    gm: f64,
    vg: f64,
    vt: f64,
}

impl ExtractionEngine {
    /// Extract every polarity branch of `device`; ambipolar devices yield an
    /// n-type and a p-type result.
    pub fn extract_fet(
        &self,
        device: &FetDevice,
        idvg: SweepTable,
        idvd: Option<SweepTable>,
    ) -> ExtractResult<Vec<FetExtraction>> {
        device
            .polarity
            .kinds()
            .iter()
            .map(|kind| self.extract_fet_as(device, kind.as_ref(), idvg.clone(), idvd.clone()))
            .collect()
    }

    /// Run the FET procedure treating the device as `kind`.
    pub fn extract_fet_as(
        &self,
        device: &FetDevice,
        kind: &dyn DeviceKind,
        mut idvg: SweepTable,
        mut idvd: Option<SweepTable>,
    ) -> ExtractResult<FetExtraction> {
        expect_layout(&idvg, Layout::IdVg)?;
        let mut model = FetModel::new(device, kind.polarity())?;
        let mut warnings = Vec::new();

        normalize_current(&mut idvg, &device.width)?;
        if let Some(table) = idvd.as_mut() {
            expect_layout(table, Layout::IdVd)?;
            normalize_current(table, &device.width)?;
        }

        let vg_col = idvg.get_column_by(&ColumnSelector::full(Role::GateVoltage))?.convert(&Unit::VOLT)?;
        let id_col = idvg.get_column_by(&ColumnSelector::full(Role::DrainCurrent))?;
        let gm_unit = id_col.unit().div(&Unit::VOLT);
        let boundary = idvg.boundary();
        let branches = branches(&idvg);

        let vds = idvg.get_secondary_indep_values();
        let vd_values: Vec<f64> = vds.iter().map(Quantity::magnitude).collect();
        let (set, _) = kind.extremum(&vd_values).ok_or_else(|| ExtractError::MissingData {
            what: "no drain-voltage sets".to_string(),
        })?;
        let vd = vds[set].convert(&Unit::VOLT)?;
        let vg_set = &vg_col.sets()[set];
        let id_set = &id_col.sets()[set];

        // Transconductance extreme and Vt per branch at the largest drain bias.
        let mut fits = Vec::with_capacity(branches.len());
        for &branch in &branches {
            let vg = branch.slice(vg_set, boundary);
            let id = branch.slice(id_set, boundary);
            let gm = slope(vg, id, false, self.options().non_finite)?;
            let (i, g) = kind.extremum_slope(&gm).ok_or_else(|| ExtractError::MissingData {
                what: format!("no finite transconductance on the {branch:?} branch"),
            })?;

            let at_edge = match branch {
                Branch::Backward => i == 0,
                Branch::Forward | Branch::Full => i + 1 == gm.len(),
            };
            if at_edge {
                let warning = ExtractionWarning::GmNotRolledOver {
                    device: model.name.clone(),
                    branch,
                    drain_voltage: vd.magnitude(),
                };
                warn!("{warning}");
                warnings.push(warning);
            }

            let vt = linear_extraction(vg[i], id[i], LineConstraint::Slope(g))?.x_intercept();
            if !vt.is_finite() {
                return Err(ExtractError::Numeric {
                    what: format!("threshold voltage on the {branch:?} branch is not finite"),
                });
            }
            debug!(device = %model.name, ?branch, index = i, gm = g, vt, "branch fit");
            fits.push((branch, BranchFit { gm: g, vg: vg[i], vt }));
        }

        let at_vd = Conditions::new().with("Vd", vd.clone());
        for (branch, fit) in &fits {
            let target = match branch {
                Branch::Backward => &mut model.vt_bwd,
                Branch::Forward | Branch::Full => &mut model.vt_fwd,
            };
            target.set(Quantity::new(fit.vt, Unit::VOLT), Some(&at_vd))?;
        }
        let vt_avg = fits.iter().map(|(_, f)| f.vt).sum::<f64>() / fits.len() as f64;
        let vt_avg_q = Quantity::new(vt_avg, Unit::VOLT);
        model.vt_avg.set(vt_avg_q.clone(), Some(&at_vd))?;
        if let [(_, fwd), (_, bwd)] = fits.as_slice() {
            model
                .hysteresis
                .set(Quantity::new(fwd.vt - bwd.vt, Unit::VOLT), Some(&at_vd))?;
        }

        // Maximum transconductance and mobility.
        let gms: Vec<f64> = fits.iter().map(|(_, f)| f.gm).collect();
        if let Some((best, _)) = kind.extremum_slope(&gms) {
            let fit = fits[best].1;
            let vg = Quantity::new(fit.vg, Unit::VOLT);
            let inputs = self.bias(&model, kind, &vd, &vg, &vt_avg_q)?;
            let gm = Quantity::new(fit.gm, gm_unit.clone());
            model.max_gm.set(gm.clone(), Some(&inputs))?;
            let mu = mobility(&model.length, &gm, &model.cox, &vd)?;
            model.max_mobility.set(mu, Some(&inputs))?;
        }

        // Minimum subthreshold swing.
        let mut best_ss: Option<(f64, f64)> = None;
        for &branch in &branches {
            let vg = branch.slice(vg_set, boundary);
            let log_id: Vec<f64> = branch
                .slice(id_set, boundary)
                .iter()
                .map(|v| v.abs().log10())
                .collect();
            let ss = slope(&log_id, vg, false, self.options().non_finite)?;
            if let Some((i, s)) = min_magnitude(&ss, self.options().exclude_zero_swing) {
                if best_ss.is_none_or(|(b, _)| s.abs() < b.abs()) {
                    best_ss = Some((s, vg[i]));
                }
            }
        }
        match best_ss {
            Some((s, vg)) => {
                let vg = Quantity::new(vg, Unit::VOLT);
                let inputs = self.bias(&model, kind, &vd, &vg, &vt_avg_q)?;
                model
                    .min_ss
                    .set(Quantity::new(s, Unit::VOLT_PER_DECADE), Some(&inputs))?;
            }
            None => debug!(device = %model.name, "no usable subthreshold swing"),
        }

        // Maximum on-current over every set.
        let mut best_on: Option<(usize, usize, f64)> = None;
        for (s, values) in id_col.sets().iter().enumerate() {
            if let Some((i, v)) = kind.extremum(values) {
                if best_on.is_none_or(|(_, _, b)| v.abs() > b.abs()) {
                    best_on = Some((s, i, v));
                }
            }
        }
        if let Some((s, i, v)) = best_on {
            let on_vd = vds[s].convert(&Unit::VOLT)?;
            let vg = Quantity::new(vg_col.sets()[s][i], Unit::VOLT);
            let mut inputs = self.bias(&model, kind, &on_vd, &vg, &vt_avg_q)?;
            inputs.insert("field", &on_vd / &model.length);
            model
                .max_on_current
                .set(Quantity::new(v, id_col.unit().clone()), Some(&inputs))?;
        }

        // Derived columns for downstream reporting and TLM.
        let gm_col = self.slope_column(&vg_col, &id_col, boundary, &branches, gm_unit)?;
        idvg.add_column("gm", gm_col)?;
        let log_id = id_col.map_values(|v| v.abs().log10(), Unit::DIMENSIONLESS);
        let ss_col = self.slope_column(&log_id, &vg_col, boundary, &branches, Unit::VOLT_PER_DECADE)?;
        idvg.add_column("ss", ss_col)?;

        let n_col = density_column(&vg_col, &model, kind, &vt_avg_q)?;
        idvg.add_column(Role::CarrierDensity, n_col)?;
        let r_col = resistance_column(&idvg, &id_col, &vds)?;
        idvg.add_column(Role::Resistance, r_col)?;

        info!(
            device = %model.name,
            polarity = %model.polarity,
            vt = %model.vt_avg,
            gm = %model.max_gm,
            ss = %model.min_ss,
            "extracted FET"
        );

        Ok(FetExtraction {
            model,
            idvg,
            idvd,
            warnings,
        })
    }

    /// Bias conditions `{Vd, Vg, n}` for a FET property.
    fn bias(
        &self,
        model: &FetModel,
        kind: &dyn DeviceKind,
        vd: &Quantity,
        vg: &Quantity,
        vt: &Quantity,
    ) -> ExtractResult<Conditions> {
        let n = carrier_density(&model.cox, vg, vt, kind)?;
        Ok(Conditions::new()
            .with("Vd", vd.clone())
            .with("Vg", vg.clone())
            .with("n", n))
    }

    /// `dy/dx` for every set, each branch padded back to its own length.
    fn slope_column(
        &self,
        x: &ColumnData,
        y: &ColumnData,
        boundary: usize,
        branches: &[Branch],
        unit: Unit,
    ) -> ExtractResult<ColumnData> {
        let mut sets = Vec::with_capacity(x.num_sets());
        for (xs, ys) in x.sets().iter().zip(y.sets()) {
            let mut out = Vec::with_capacity(xs.len());
            for &branch in branches {
                out.extend(slope(
                    branch.slice(xs, boundary),
                    branch.slice(ys, boundary),
                    true,
                    self.options().non_finite,
                )?);
            }
            sets.push(out);
        }
        Ok(ColumnData::new(unit, sets))
    }
}

fn expect_layout(table: &SweepTable, layout: Layout) -> ExtractResult<()> {
    if table.layout() != layout {
        return Err(ExtractError::InvalidInput {
            what: format!("expected an {layout} table, got {}", table.layout()),
        });
    }
    Ok(())
}

/// Branches of a table's sweep; a single-direction sweep is one full branch.
fn branches(table: &SweepTable) -> Vec<Branch> {
    if table.sweep_count() == 2 {
        vec![Branch::Forward, Branch::Backward]
    } else {
        vec![Branch::Full]
    }
}

/// Divide the drain current by the channel width.
pub fn normalize_current(table: &mut SweepTable, width: &Quantity) -> ExtractResult<()> {
    table.adjust_column(Role::DrainCurrent, |id| Ok(id.divide_by(width)))?;
    Ok(())
}

/// Carrier density at every gate-voltage sample, in cm^-2.
fn density_column(
    vg: &ColumnData,
    model: &FetModel,
    kind: &dyn DeviceKind,
    vt: &Quantity,
) -> ExtractResult<ColumnData> {
    let sets = vg
        .sets()
        .iter()
        .map(|set| {
            set.iter()
                .map(|&v| {
                    carrier_density(&model.cox, &Quantity::new(v, Unit::VOLT), vt, kind)
                        .map(|n| n.magnitude())
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ColumnData::new(Unit::PER_SQ_CENTIMETER, sets))
}

/// Width-normalized total resistance `Vd / Id`, in Ohm*um; NaN where the
/// current is zero.
fn resistance_column(
    table: &SweepTable,
    id: &ColumnData,
    vds: &[Quantity],
) -> ExtractResult<ColumnData> {
    let vd_key = ColumnKey::Role(Role::DrainVoltage);
    let vd_sets: Vec<Vec<f64>> = if table.has_column(&vd_key) {
        table
            .get_column_by(&ColumnSelector::full(vd_key))?
            .convert(&Unit::VOLT)?
            .into_sets()
    } else {
        vds.iter()
            .map(|v| v.value_in(&Unit::VOLT).map(|v| vec![v; table.samples()]))
            .collect::<Result<Vec<_>, _>>()?
    };
    let factor = Quantity::new(1.0, Unit::VOLT.div(id.unit())).value_in(&Unit::OHM_MICROMETER)?;
    let mut sets = Vec::with_capacity(id.num_sets());
    for (vd, current) in vd_sets.iter().zip(id.sets()) {
        let mut r: Vec<f64> = vd
            .iter()
            .zip(current)
            .map(|(v, i)| factor * v / i)
            .collect();
        clean_non_finite(&mut r, NonFinitePolicy::Exclude);
        sets.push(r);
    }
    Ok(ColumnData::new(Unit::OHM_MICROMETER, sets))
}
