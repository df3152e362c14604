//! Transfer-length-method extraction across devices of different length.

use iv_core::{Conditions, Quantity, Unit};
use iv_dataset::{Branch, ColumnSelector, Layout, RawTable, Role, SweepTable};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::engine::ExtractionEngine;
use crate::error::{ExtractError, ExtractResult, ExtractionWarning};
use crate::fet::FetExtraction;
use crate::model::{FetDevice, TlmModel, TlmPoint};
use crate::numeric::linear_regression;
use crate::polarity::{DeviceKind, NType, PType, Polarity};

/// TLM result plus the per-device FET extractions it was built from.
#[derive(Debug, Clone)]
pub struct TlmExtraction {
    pub model: TlmModel,
    pub devices: Vec<FetExtraction>,
    /// Density, resistance and length per device in the TLM layout.
    pub table: SweepTable,
    pub warnings: Vec<ExtractionWarning>,
}

impl ExtractionEngine {
    /// Extract every device independently, then regress total resistance
    /// against channel length at each shared sample index.
    pub fn extract_tlm(
        &self,
        name: &str,
        devices: Vec<(FetDevice, SweepTable)>,
    ) -> ExtractResult<TlmExtraction> {
        if devices.len() < 2 {
            return Err(ExtractError::InvalidInput {
                what: format!("TLM needs at least 2 devices, got {}", devices.len()),
            });
        }

        let extractions = devices
            .into_par_iter()
            .map(|(device, idvg)| {
                let kind: &dyn DeviceKind = match device.polarity {
                    Polarity::N => &NType,
                    Polarity::P => &PType,
                    Polarity::Ambipolar => {
                        return Err(ExtractError::InvalidInput {
                            what: format!("TLM device {} must be n or p type", device.name),
                        });
                    }
                };
                self.extract_fet_as(&device, kind, idvg, None)
            })
            .collect::<ExtractResult<Vec<_>>>()?;

        let drain_voltage = match self.options().tlm_drain_voltage {
            Some(v) => Quantity::new(v, Unit::VOLT),
            None => largest_drain_voltage(&extractions[0].idvg)?,
        };

        let mut densities = Vec::with_capacity(extractions.len());
        let mut resistances = Vec::with_capacity(extractions.len());
        let mut lengths = Vec::with_capacity(extractions.len());
        for ext in &extractions {
            let branch = if ext.idvg.sweep_count() == 2 {
                Branch::Forward
            } else {
                Branch::Full
            };
            let n = ext.idvg.get_column_set(
                &ColumnSelector::new(Role::CarrierDensity, branch).to_string(),
                &drain_voltage,
            )?;
            let r = ext.idvg.get_column_set(
                &ColumnSelector::new(Role::Resistance, branch).to_string(),
                &drain_voltage,
            )?;
            densities.push(n.convert(&Unit::PER_SQ_CENTIMETER)?.values);
            resistances.push(r.convert(&Unit::OHM_MICROMETER)?.values);
            lengths.push(ext.model.length.value_in(&Unit::MICROMETER)?);
        }
        let samples = densities.iter().map(Vec::len).min().unwrap_or(0);

        let mut model = TlmModel::new(
            name,
            lengths
                .iter()
                .map(|&l| Quantity::new(l, Unit::MICROMETER))
                .collect(),
            drain_voltage.clone(),
        );
        let mut warnings: Vec<ExtractionWarning> =
            extractions.iter().flat_map(|e| e.warnings.clone()).collect();
        let limit = self.options().max_density_spread;
        let mut usable_indices = Vec::new();

        for index in 0..samples {
            let ns: Vec<f64> = densities.iter().map(|d| d[index]).collect();
            let rs: Vec<f64> = resistances.iter().map(|r| r[index]).collect();
            let usable = ns.iter().all(|n| n.is_finite() && *n != 0.0)
                && rs.iter().all(|r| r.is_finite());
            if !usable {
                warnings.push(ExtractionWarning::BelowThreshold { point: index });
                continue;
            }

            let mean = ns.iter().sum::<f64>() / ns.len() as f64;
            let var = ns.iter().map(|n| (n - mean).powi(2)).sum::<f64>() / ns.len() as f64;
            let spread = var.sqrt() / mean.abs();
            if spread > limit {
                let warning = ExtractionWarning::DensitySpread {
                    point: index,
                    relative_spread: spread,
                    limit,
                };
                warn!("{warning}");
                warnings.push(warning);
            }

            let fit = linear_regression(&lengths, &rs)?;
            let density = Quantity::new(mean, Unit::PER_SQ_CENTIMETER);
            let at_n = Conditions::new().with("n", density.clone());
            let mut point = TlmPoint {
                index,
                density,
                contact_resistance: model.contact_resistance.clone(),
                sheet_resistance: model.sheet_resistance.clone(),
                contact_resistance_error: fit
                    .intercept_error
                    .map(|e| Quantity::new(e / 2.0, Unit::OHM_MICROMETER)),
                sheet_resistance_error: fit
                    .slope_error
                    .map(|e| Quantity::new(e, Unit::OHM_PER_SQUARE)),
            };
            point.contact_resistance.set(
                Quantity::new(fit.intercept / 2.0, Unit::OHM_MICROMETER),
                Some(&at_n),
            )?;
            point
                .sheet_resistance
                .set(Quantity::new(fit.slope, Unit::OHM_PER_SQUARE), Some(&at_n))?;
            model.points.push(point);
            usable_indices.push(index);
        }
        let skipped = samples - usable_indices.len();
        if skipped > 0 {
            warn!(skipped, total = samples, "TLM points skipped below threshold");
        }

        let top = model
            .points
            .iter()
            .max_by(|a, b| a.density.magnitude().total_cmp(&b.density.magnitude()))
            .ok_or_else(|| ExtractError::MissingData {
                what: "no TLM point has every device above threshold".to_string(),
            })?;
        model.contact_resistance = top.contact_resistance.clone();
        model.sheet_resistance = top.sheet_resistance.clone();

        let table = tlm_table(&densities, &resistances, &lengths, &usable_indices)?;

        info!(
            tlm = %model.name,
            points = model.points.len(),
            rc = %model.contact_resistance,
            rsh = %model.sheet_resistance,
            "extracted TLM"
        );

        Ok(TlmExtraction {
            model,
            devices: extractions,
            table,
            warnings,
        })
    }
}

fn largest_drain_voltage(table: &SweepTable) -> ExtractResult<Quantity> {
    table
        .get_secondary_indep_values()
        .into_iter()
        .max_by(|a, b| a.magnitude().abs().total_cmp(&b.magnitude().abs()))
        .ok_or_else(|| ExtractError::MissingData {
            what: "no drain-voltage sets".to_string(),
        })
}

/// Assemble the usable points as a TLM-layout table, one set per length.
fn tlm_table(
    densities: &[Vec<f64>],
    resistances: &[Vec<f64>],
    lengths: &[f64],
    indices: &[usize],
) -> ExtractResult<SweepTable> {
    let pick = |values: &[f64]| indices.iter().map(|&i| values[i]).collect::<Vec<_>>();
    let mut raw = RawTable::new();
    for (k, ((n, r), &l)) in densities.iter().zip(resistances).zip(lengths).enumerate() {
        raw.push_column(format!("density_{k}"), pick(n))?;
        raw.push_column(format!("resistance_{k}"), pick(r))?;
        raw.push_column(format!("length_{k}"), vec![l; indices.len()])?;
    }
    Ok(SweepTable::builder(Layout::Tlm)
        .secondary_values(lengths.to_vec())
        .build(&raw)?)
}
