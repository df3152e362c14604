//! Sweep direction detection.

use crate::error::{DatasetError, DatasetResult};

/// Direction structure shared by every set of a sweep table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepShape {
    /// 1 for a monotonic sweep, 2 for forward then backward.
    pub sweep_count: usize,
    /// First sample of the backward branch; equals `samples` for a single sweep.
    pub boundary: usize,
    pub samples: usize,
}

/// Indices where the sweep reverses direction.
///
/// Zero and NaN steps carry no direction, so a duplicated turnaround point
/// does not register as an extra reversal. Each returned index is the first
/// sample of the new direction: `[0, 1, 2, 3, 3, 2, 1, 0]` reverses at 4.
pub fn direction_changes(values: &[f64]) -> Vec<usize> {
    let mut changes = Vec::new();
    let mut last_sign = 0.0;
    for (i, pair) in values.windows(2).enumerate() {
        let step = pair[1] - pair[0];
        if step == 0.0 || step.is_nan() {
            continue;
        }
        let sign = step.signum();
        if last_sign != 0.0 && sign != last_sign {
            // The reversing step runs from i to i+1; a flat turnaround pushes
            // the branch start back onto the duplicated sample.
            let mut start = i;
            while start > 0 && values[start - 1] == values[start] {
                start -= 1;
            }
            changes.push(if start < i { i } else { i + 1 });
        }
        last_sign = sign;
    }
    changes
}

/// Determine the shared sweep shape of all sets.
///
/// Every set must have the same length, the same number of reversals (zero
/// or one), and reverse at the same index.
pub fn detect_sweep_shape(sets: &[Vec<f64>]) -> DatasetResult<SweepShape> {
    let first = sets.first().ok_or_else(|| DatasetError::Empty {
        what: "no sets for the master independent column".to_string(),
    })?;
    let samples = first.len();

    let mut reference: Option<Vec<usize>> = None;
    for (set, values) in sets.iter().enumerate() {
        if values.len() != samples {
            return Err(DatasetError::InconsistentSweepShape {
                what: format!("set {set} has {} samples, set 0 has {samples}", values.len()),
            });
        }
        let changes = direction_changes(values);
        if changes.len() > 1 {
            return Err(DatasetError::TooManyDirectionChanges {
                set,
                changes: changes.len(),
            });
        }
        match &reference {
            None => reference = Some(changes),
            Some(r) if r.len() != changes.len() => {
                return Err(DatasetError::InconsistentSweepShape {
                    what: format!(
                        "set {set} has {} direction changes, set 0 has {}",
                        changes.len(),
                        r.len()
                    ),
                });
            }
            Some(r) if *r != changes => {
                return Err(DatasetError::InconsistentSweepShape {
                    what: format!(
                        "set {set} reverses at sample {:?}, set 0 at {:?}",
                        changes, r
                    ),
                });
            }
            Some(_) => {}
        }
    }

    let boundary = reference
        .and_then(|r| r.first().copied())
        .unwrap_or(samples);
    Ok(SweepShape {
        sweep_count: if boundary < samples { 2 } else { 1 },
        boundary,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicated_turnaround_splits_in_half() {
        let shape = detect_sweep_shape(&[vec![0.0, 1.0, 2.0, 3.0, 3.0, 2.0, 1.0, 0.0]]).unwrap();
        assert_eq!(shape.sweep_count, 2);
        assert_eq!(shape.boundary, 4);
    }

    #[test]
    fn sharp_turnaround_starts_backward_after_peak() {
        assert_eq!(direction_changes(&[0.0, 1.0, 2.0, 1.0, 0.0]), vec![3]);
    }

    #[test]
    fn monotonic_is_single_direction() {
        let shape = detect_sweep_shape(&[vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0]]).unwrap();
        assert_eq!(shape.sweep_count, 1);
        assert_eq!(shape.boundary, 3);
    }

    #[test]
    fn descending_sweep_is_single_direction() {
        let shape = detect_sweep_shape(&[vec![5.0, 4.0, 4.0, 3.0]]).unwrap();
        assert_eq!(shape.sweep_count, 1);
    }

    #[test]
    fn two_reversals_are_rejected() {
        let err = detect_sweep_shape(&[vec![0.0, 1.0, 0.0, 1.0]]).unwrap_err();
        assert!(matches!(err, DatasetError::TooManyDirectionChanges { changes: 2, .. }));
    }

    #[test]
    fn sets_must_agree() {
        let err = detect_sweep_shape(&[vec![0.0, 1.0, 2.0], vec![0.0, 1.0]]).unwrap_err();
        assert!(matches!(err, DatasetError::InconsistentSweepShape { .. }));

        let err = detect_sweep_shape(&[vec![0.0, 1.0, 1.0, 0.0], vec![0.0, 1.0, 2.0, 3.0]])
            .unwrap_err();
        assert!(matches!(err, DatasetError::InconsistentSweepShape { .. }));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn mirrored_sweep_splits_at_turnaround(n in 2usize..40, step in 0.01_f64..5.0, dup in any::<bool>()) {
            let up: Vec<f64> = (0..n).map(|i| i as f64 * step).collect();
            let mut down = up.clone();
            down.reverse();
            if !dup {
                down.remove(0);
            }
            let mut values = up.clone();
            values.extend(down);

            let shape = detect_sweep_shape(&[values]).unwrap();
            prop_assert_eq!(shape.sweep_count, 2);
            prop_assert_eq!(shape.boundary, n);
        }
    }
}
