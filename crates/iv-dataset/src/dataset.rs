//! Multi-set sweep table.

use std::collections::HashMap;

use indexmap::IndexMap;
use iv_core::{nearly_equal, Quantity, Tolerances};
use tracing::{debug, warn};

use crate::column::{Branch, ColumnData, ColumnKey, ColumnSelector, Series};
use crate::error::{DatasetError, DatasetResult, DatasetWarning};
use crate::resolve::{find_similar_columns, Binding};
use crate::roles::{Layout, Role};
use crate::sweep::{detect_sweep_shape, SweepShape};
use crate::table::RawTable;

/// Measured sweeps grouped into sets by their secondary independent value.
///
/// Built once by [`SweepTableBuilder`]: roles are bound to headers, sets with
/// repeated secondary values are dropped and the forward/backward boundary is
/// fixed. Afterwards only [`SweepTable::add_column`] and
/// [`SweepTable::adjust_column`] change it.
#[derive(Debug, Clone)]
pub struct SweepTable {
    layout: Layout,
    columns: IndexMap<ColumnKey, ColumnData>,
    bindings: IndexMap<Role, Binding>,
    secondary_values: Vec<f64>,
    shape: SweepShape,
    warnings: Vec<DatasetWarning>,
}

/// Collects name overrides before resolving a [`RawTable`].
#[derive(Debug, Clone)]
pub struct SweepTableBuilder {
    layout: Layout,
    names: HashMap<Role, Vec<String>>,
    secondary_values: Option<Vec<f64>>,
}

impl SweepTableBuilder {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            names: HashMap::new(),
            secondary_values: None,
        }
    }

    /// Explicit candidate header names for a role, replacing the defaults.
    pub fn column_names<I, S>(mut self, role: Role, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names
            .insert(role, names.into_iter().map(Into::into).collect());
        self
    }

    /// Secondary values to use instead of reading them from the data, one per
    /// physical set, in the secondary role's unit.
    pub fn secondary_values(mut self, values: Vec<f64>) -> Self {
        self.secondary_values = Some(values);
        self
    }

    pub fn build(self, raw: &RawTable) -> DatasetResult<SweepTable> {
        let layout = self.layout;
        let mut warnings = Vec::new();
        let mut bindings = IndexMap::new();

        for &role in layout.roles() {
            let defaults: Vec<String>;
            let candidates: &[String] = match self.names.get(&role) {
                Some(names) => names,
                None => {
                    defaults = role.default_names().iter().map(|s| s.to_string()).collect();
                    &defaults
                }
            };
            let resolution = find_similar_columns(role, candidates, raw.headers());
            warnings.extend(resolution.warnings);
            match resolution.binding {
                Some(binding) => {
                    debug!(%role, headers = ?binding.headers, "bound column");
                    bindings.insert(role, binding);
                }
                None if layout.is_required(role) => {
                    return Err(DatasetError::UnresolvedColumn {
                        role,
                        candidates: candidates.to_vec(),
                    });
                }
                None => {
                    let warning = DatasetWarning::MissingColumn { role };
                    warn!("{warning}");
                    warnings.push(warning);
                }
            }
        }

        let mut raw_columns: IndexMap<Role, Vec<Vec<f64>>> = IndexMap::new();
        for (&role, binding) in &bindings {
            let sets = binding
                .headers
                .iter()
                .map(|h| {
                    raw.column(h)
                        .map(trim_trailing_nan)
                        .ok_or_else(|| DatasetError::UnknownColumn { name: h.clone() })
                })
                .collect::<DatasetResult<Vec<_>>>()?;
            raw_columns.insert(role, sets);
        }

        let master = layout.master_independent();
        let physical_sets = raw_columns.get(&master).map_or(0, Vec::len);
        for (&role, sets) in &raw_columns {
            if sets.len() != physical_sets {
                return Err(DatasetError::ShapeMismatch {
                    what: format!("{role} sets"),
                    expected: physical_sets.to_string(),
                    actual: sets.len().to_string(),
                });
            }
        }

        let secondary_raw = match self.secondary_values {
            Some(values) => {
                if values.len() != physical_sets {
                    return Err(DatasetError::SecondaryValueCount {
                        given: values.len(),
                        sets: physical_sets,
                    });
                }
                values
            }
            None => {
                let role = layout.secondary_independent();
                let sets = raw_columns.get(&role).ok_or_else(|| {
                    DatasetError::UnresolvedColumn {
                        role,
                        candidates: self
                            .names
                            .get(&role)
                            .cloned()
                            .unwrap_or_else(|| {
                                role.default_names().iter().map(|s| s.to_string()).collect()
                            }),
                    }
                })?;
                sets.iter()
                    .map(|s| s.first().copied().unwrap_or(f64::NAN))
                    .collect()
            }
        };

        let mut secondary_values = Vec::new();
        let mut kept = Vec::new();
        for (set, &value) in secondary_raw.iter().enumerate() {
            if value.is_nan() || secondary_values.contains(&value) {
                let warning = DatasetWarning::DroppedSet {
                    set,
                    secondary_value: value,
                };
                warn!("{warning}");
                warnings.push(warning);
                continue;
            }
            secondary_values.push(value);
            kept.push(set);
        }
        if kept.is_empty() {
            return Err(DatasetError::Empty {
                what: format!("no usable {} sets", layout.secondary_independent()),
            });
        }

        let mut columns = IndexMap::new();
        for (role, sets) in raw_columns {
            let sets: Vec<Vec<f64>> = kept.iter().map(|&i| sets[i].clone()).collect();
            columns.insert(ColumnKey::Role(role), ColumnData::new(role.unit(), sets));
        }

        let master_sets = columns
            .get(&ColumnKey::Role(master))
            .map(ColumnData::sets)
            .unwrap_or_default();
        let shape = detect_sweep_shape(master_sets)?;
        for (key, column) in &columns {
            if let Some(set) = column.sets().iter().position(|s| s.len() != shape.samples) {
                return Err(DatasetError::InconsistentSweepShape {
                    what: format!(
                        "column {key} set {set} has {} samples, the {master} has {}",
                        column.sets()[set].len(),
                        shape.samples
                    ),
                });
            }
        }

        debug!(
            %layout,
            sets = secondary_values.len(),
            sweep_count = shape.sweep_count,
            boundary = shape.boundary,
            "built sweep table"
        );

        Ok(SweepTable {
            layout,
            columns,
            bindings,
            secondary_values,
            shape,
            warnings,
        })
    }
}

fn trim_trailing_nan(values: &[f64]) -> Vec<f64> {
    let end = values
        .iter()
        .rposition(|v| !v.is_nan())
        .map_or(0, |i| i + 1);
    values[..end].to_vec()
}

impl SweepTable {
    pub fn builder(layout: Layout) -> SweepTableBuilder {
        SweepTableBuilder::new(layout)
    }

    /// Resolve `raw` with the default name catalogue.
    pub fn from_raw(layout: Layout, raw: &RawTable) -> DatasetResult<Self> {
        SweepTableBuilder::new(layout).build(raw)
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn sweep_count(&self) -> usize {
        self.shape.sweep_count
    }

    /// First sample index of the backward branch.
    pub fn boundary(&self) -> usize {
        self.shape.boundary
    }

    pub fn samples(&self) -> usize {
        self.shape.samples
    }

    pub fn num_sets(&self) -> usize {
        self.secondary_values.len()
    }

    pub fn binding(&self, role: Role) -> Option<&Binding> {
        self.bindings.get(&role)
    }

    pub fn has_column(&self, key: &ColumnKey) -> bool {
        self.columns.contains_key(key)
    }

    pub fn column_keys(&self) -> impl Iterator<Item = &ColumnKey> {
        self.columns.keys()
    }

    pub fn warnings(&self) -> &[DatasetWarning] {
        &self.warnings
    }

    /// Read a column by selector text such as `id`, `vg_fwd` or `gm_bwd`.
    pub fn get_column(&self, selector: &str) -> DatasetResult<ColumnData> {
        self.get_column_by(&selector.parse()?)
    }

    pub fn get_column_by(&self, selector: &ColumnSelector) -> DatasetResult<ColumnData> {
        let column = self.stored(&selector.key)?;
        self.check_branch(selector)?;
        let sets = column
            .sets()
            .iter()
            .map(|s| selector.branch.slice(s, self.shape.boundary).to_vec())
            .collect();
        Ok(ColumnData::new(column.unit().clone(), sets))
    }

    /// Read a column restricted, per set, to the samples between those whose
    /// master independent values are closest to `lo` and `hi` (inclusive).
    pub fn get_column_in_range(
        &self,
        selector: &str,
        lo: &Quantity,
        hi: &Quantity,
    ) -> DatasetResult<ColumnData> {
        let selector: ColumnSelector = selector.parse()?;
        let column = self.get_column_by(&selector)?;
        let master = self.get_column_by(&ColumnSelector::new(
            self.layout.master_independent(),
            selector.branch,
        ))?;
        let lo = lo.value_in(master.unit())?;
        let hi = hi.value_in(master.unit())?;

        let mut ranges = Vec::with_capacity(master.num_sets());
        for values in master.sets() {
            let a = closest_index(values, lo);
            let b = closest_index(values, hi);
            ranges.push((a.min(b), a.max(b)));
        }
        let widths: Vec<usize> = ranges.iter().map(|(a, b)| b - a + 1).collect();
        if widths.windows(2).any(|w| w[0] != w[1]) {
            return Err(DatasetError::NonRectangularSelection {
                column: selector.to_string(),
                widths,
            });
        }

        let sets = column
            .sets()
            .iter()
            .zip(&ranges)
            .map(|(values, &(a, b))| values[a..=b].to_vec())
            .collect();
        Ok(ColumnData::new(column.unit().clone(), sets))
    }

    /// Read the single set whose secondary value equals `secondary`.
    pub fn get_column_set(&self, selector: &str, secondary: &Quantity) -> DatasetResult<Series> {
        let index = self.secondary_index(secondary)?;
        let column = self.get_column(selector)?;
        column.set(index).ok_or_else(|| DatasetError::ShapeMismatch {
            what: format!("column {selector}"),
            expected: format!("set {index}"),
            actual: format!("{} sets", column.num_sets()),
        })
    }

    /// Distinct secondary values in set order.
    pub fn get_secondary_indep_values(&self) -> Vec<Quantity> {
        let unit = self.layout.secondary_independent().unit();
        self.secondary_values
            .iter()
            .map(|&v| Quantity::new(v, unit.clone()))
            .collect()
    }

    pub fn secondary_index(&self, value: &Quantity) -> DatasetResult<usize> {
        let unit = self.layout.secondary_independent().unit();
        let v = value.value_in(&unit)?;
        let tol = Tolerances::default();
        self.secondary_values
            .iter()
            .position(|&known| nearly_equal(known, v, tol))
            .ok_or_else(|| DatasetError::UnknownSecondaryValue {
                value: value.to_string(),
                known: self.secondary_values.clone(),
            })
    }

    /// Store a derived column. It must have one full-length sequence per set.
    pub fn add_column(&mut self, key: impl Into<ColumnKey>, data: ColumnData) -> DatasetResult<()> {
        let key = key.into();
        if self.columns.contains_key(&key) {
            return Err(DatasetError::DuplicateColumn {
                name: key.to_string(),
            });
        }
        self.check_shape(&key, &data)?;
        debug!(column = %key, unit = %data.unit(), "added column");
        self.columns.insert(key, data);
        Ok(())
    }

    /// Replace a stored column with `f` applied to it; the shape must be kept.
    pub fn adjust_column<F>(&mut self, key: impl Into<ColumnKey>, f: F) -> DatasetResult<()>
    where
        F: FnOnce(&ColumnData) -> iv_core::CoreResult<ColumnData>,
    {
        let key = key.into();
        let adjusted = f(self.stored(&key)?)?;
        self.check_shape(&key, &adjusted)?;
        debug!(column = %key, unit = %adjusted.unit(), "adjusted column");
        self.columns.insert(key, adjusted);
        Ok(())
    }

    fn stored(&self, key: &ColumnKey) -> DatasetResult<&ColumnData> {
        self.columns
            .get(key)
            .ok_or_else(|| DatasetError::UnknownColumn {
                name: key.to_string(),
            })
    }

    fn check_branch(&self, selector: &ColumnSelector) -> DatasetResult<()> {
        if selector.branch != Branch::Full && self.shape.sweep_count == 1 {
            return Err(DatasetError::UnsupportedSweepDirection {
                column: selector.to_string(),
            });
        }
        Ok(())
    }

    fn check_shape(&self, key: &ColumnKey, data: &ColumnData) -> DatasetResult<()> {
        if data.num_sets() != self.num_sets() {
            return Err(DatasetError::ShapeMismatch {
                what: format!("column {key}"),
                expected: format!("{} sets", self.num_sets()),
                actual: format!("{} sets", data.num_sets()),
            });
        }
        if let Some(bad) = data.sets().iter().find(|s| s.len() != self.shape.samples) {
            return Err(DatasetError::ShapeMismatch {
                what: format!("column {key}"),
                expected: format!("{} samples per set", self.shape.samples),
                actual: format!("{} samples", bad.len()),
            });
        }
        Ok(())
    }
}

fn closest_index(values: &[f64], target: f64) -> usize {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold((0, f64::INFINITY), |(best, dist), (i, v)| {
            let d = (v - target).abs();
            if d < dist { (i, d) } else { (best, dist) }
        })
        .0
}
