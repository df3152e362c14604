//! Local slope estimation, line extrapolation and least-squares fitting.

use nalgebra::{DMatrix, DVector};

use crate::error::{ExtractError, ExtractResult};

/// What to do with inf/NaN produced by a numerical step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonFinitePolicy {
    /// Replace with 0.0; indices are kept.
    #[default]
    Zero,
    /// Mark as NaN; extremum searches skip it.
    Exclude,
}

/// Apply `policy` to every non-finite value. Returns how many were replaced.
pub fn clean_non_finite(values: &mut [f64], policy: NonFinitePolicy) -> usize {
    let replacement = match policy {
        NonFinitePolicy::Zero => 0.0,
        NonFinitePolicy::Exclude => f64::NAN,
    };
    let mut replaced = 0;
    for v in values.iter_mut().filter(|v| !v.is_finite()) {
        *v = replacement;
        replaced += 1;
    }
    replaced
}

/// Forward differences `(y[i+1] - y[i]) / (x[i+1] - x[i])`.
///
/// The result has one fewer sample than the input unless `pad` repeats the
/// last slope. Zero-width steps give non-finite slopes which are cleaned with
/// `policy`.
pub fn slope(x: &[f64], y: &[f64], pad: bool, policy: NonFinitePolicy) -> ExtractResult<Vec<f64>> {
    if x.len() != y.len() {
        return Err(ExtractError::InvalidInput {
            what: format!("slope of {} y samples over {} x samples", y.len(), x.len()),
        });
    }
    if x.len() < 2 {
        return Err(ExtractError::MissingData {
            what: format!("slope needs at least 2 samples, got {}", x.len()),
        });
    }
    let mut out: Vec<f64> = x
        .windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (ys[1] - ys[0]) / (xs[1] - xs[0]))
        .collect();
    clean_non_finite(&mut out, policy);
    if pad {
        if let Some(&last) = out.last() {
            out.push(last);
        }
    }
    Ok(out)
}

/// The extra condition fixing a line through one known point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineConstraint {
    Slope(f64),
    YIntercept(f64),
    XIntercept(f64),
}

/// `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub slope: f64,
    pub intercept: f64,
}

impl Line {
    pub fn x_intercept(&self) -> f64 {
        -self.intercept / self.slope
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Line through `(x, y)` satisfying `constraint`.
pub fn linear_extraction(x: f64, y: f64, constraint: LineConstraint) -> ExtractResult<Line> {
    let line = match constraint {
        LineConstraint::Slope(a) => Line {
            slope: a,
            intercept: y - a * x,
        },
        LineConstraint::YIntercept(b) => Line {
            slope: (y - b) / x,
            intercept: b,
        },
        LineConstraint::XIntercept(x0) => {
            let a = y / (x - x0);
            Line {
                slope: a,
                intercept: y - a * x,
            }
        }
    };
    if !line.slope.is_finite() || !line.intercept.is_finite() {
        return Err(ExtractError::Numeric {
            what: format!("degenerate line through ({x}, {y}) with {constraint:?}"),
        });
    }
    Ok(line)
}

/// Ordinary least-squares straight-line fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    /// Standard errors from the fit covariance; `None` with no residual
    /// degrees of freedom (two points).
    pub slope_error: Option<f64>,
    pub intercept_error: Option<f64>,
    pub points: usize,
}

pub fn linear_regression(x: &[f64], y: &[f64]) -> ExtractResult<Regression> {
    if x.len() != y.len() {
        return Err(ExtractError::InvalidInput {
            what: format!("regression of {} y samples over {} x samples", y.len(), x.len()),
        });
    }
    let n = x.len();
    if n < 2 {
        return Err(ExtractError::MissingData {
            what: format!("regression needs at least 2 points, got {n}"),
        });
    }

    let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { x[i] } else { 1.0 });
    let target = DVector::from_column_slice(y);
    let normal = design.transpose() * &design;
    let inverse = normal.try_inverse().ok_or_else(|| ExtractError::Numeric {
        what: "regression is singular (all x values equal)".to_string(),
    })?;
    let beta = &inverse * design.transpose() * &target;

    let residuals = &target - &design * &beta;
    let dof = n - 2;
    let (slope_error, intercept_error) = if dof == 0 {
        (None, None)
    } else {
        let s2 = residuals.norm_squared() / dof as f64;
        let cov = inverse * s2;
        (Some(cov[(0, 0)].sqrt()), Some(cov[(1, 1)].sqrt()))
    };

    Ok(Regression {
        slope: beta[0],
        intercept: beta[1],
        slope_error,
        intercept_error,
        points: n,
    })
}
