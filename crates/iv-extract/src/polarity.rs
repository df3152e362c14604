//! Device polarity and the extremum searches that depend on it.

use std::fmt;
use std::str::FromStr;

/// Capability shared by every polarity variant.
///
/// Searches skip NaN samples and return the index and value found.
pub trait DeviceKind: fmt::Debug + Send + Sync {
    fn polarity(&self) -> Polarity;

    /// Largest-magnitude value (on-current).
    fn extremum(&self, values: &[f64]) -> Option<(usize, f64)> {
        search(values, |v| v.abs(), |a, b| a > b)
    }

    /// Largest-magnitude slope (transconductance). p-type gm is negative, so
    /// the magnitude serves both polarities.
    fn extremum_slope(&self, values: &[f64]) -> Option<(usize, f64)> {
        search(values, |v| v.abs(), |a, b| a > b)
    }

    /// Gate overdrive past threshold, clamped at zero below threshold.
    fn overdrive(&self, vg: f64, vt: f64) -> f64 {
        ((vg - vt) * self.polarity().sign()).max(0.0)
    }
}

/// Smallest non-zero magnitude, e.g. the steepest subthreshold swing.
pub fn min_magnitude(values: &[f64], exclude_zero: bool) -> Option<(usize, f64)> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan() && !(exclude_zero && **v == 0.0))
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if b.abs() <= v.abs() => best,
            _ => Some((i, v)),
        })
}

fn search(
    values: &[f64],
    key: impl Fn(f64) -> f64,
    better: impl Fn(f64, f64) -> bool,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if !better(key(v), key(b)) => {}
            _ => best = Some((i, v)),
        }
    }
    best
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    N,
    P,
    Ambipolar,
}

impl Polarity {
    /// Carrier sign: +1 for electrons (n), -1 for holes (p).
    pub fn sign(self) -> f64 {
        match self {
            Polarity::P => -1.0,
            Polarity::N | Polarity::Ambipolar => 1.0,
        }
    }

    /// Unipolar kinds to run; ambipolar devices run once per branch.
    pub fn kinds(self) -> Vec<Box<dyn DeviceKind>> {
        match self {
            Polarity::N => vec![Box::new(NType)],
            Polarity::P => vec![Box::new(PType)],
            Polarity::Ambipolar => {
                let Ambipolar { n, p } = Ambipolar::default();
                vec![Box::new(n), Box::new(p)]
            }
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::N => write!(f, "n"),
            Polarity::P => write!(f, "p"),
            Polarity::Ambipolar => write!(f, "ambipolar"),
        }
    }
}

impl FromStr for Polarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "n" | "nfet" | "nmos" => Ok(Polarity::N),
            "p" | "pfet" | "pmos" => Ok(Polarity::P),
            "ambipolar" | "np" => Ok(Polarity::Ambipolar),
            other => Err(format!("unknown polarity '{other}' (expected n, p or ambipolar)")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NType;

impl DeviceKind for NType {
    fn polarity(&self) -> Polarity {
        Polarity::N
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PType;

impl DeviceKind for PType {
    fn polarity(&self) -> Polarity {
        Polarity::P
    }
}

/// One conduction branch of an ambipolar device.
///
/// Both branches share the same sweep, so the slope search only considers
/// samples of the branch's own carrier sign. It falls back to the largest
/// magnitude when no sample has that sign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmbipolarBranch<K>(pub K);

impl<K: DeviceKind> DeviceKind for AmbipolarBranch<K> {
    fn polarity(&self) -> Polarity {
        self.0.polarity()
    }

    fn extremum_slope(&self, values: &[f64]) -> Option<(usize, f64)> {
        let sign = self.polarity().sign();
        search(values, |v| v * sign, |a, b| a > b)
            .filter(|&(_, v)| v * sign > 0.0)
            .or_else(|| self.0.extremum_slope(values))
    }
}

/// Conducts on both branches: holds one n-type and one p-type kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ambipolar {
    pub n: AmbipolarBranch<NType>,
    pub p: AmbipolarBranch<PType>,
}

impl Ambipolar {
    pub fn branches(&self) -> [&dyn DeviceKind; 2] {
        [&self.n, &self.p]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unipolar_slope_is_largest_magnitude() {
        let gm = [1.0, 3.0, 1.0, f64::NAN, -4.5];
        assert_eq!(NType.extremum_slope(&gm), Some((4, -4.5)));
        assert_eq!(PType.extremum_slope(&gm), Some((4, -4.5)));
    }

    #[test]
    fn ambipolar_branches_pick_their_own_sign() {
        let gm = [-3.0, 1.0, 2.0, f64::NAN, -1.0];
        let Ambipolar { n, p } = Ambipolar::default();
        assert_eq!(n.extremum_slope(&gm), Some((2, 2.0)));
        assert_eq!(p.extremum_slope(&gm), Some((0, -3.0)));
    }

    #[test]
    fn unipolar_slope_matches_magnitude() {
        let gm = [0.0, 1e-7, 9e-6, 5e-6];
        assert_eq!(NType.extremum_slope(&gm), NType.extremum(&gm));
        let neg: Vec<f64> = gm.iter().map(|v| -v).collect();
        assert_eq!(PType.extremum_slope(&neg), PType.extremum(&neg));
    }

    #[test]
    fn ambipolar_wrong_sign_falls_back_to_magnitude() {
        let n = AmbipolarBranch(NType);
        assert_eq!(n.extremum_slope(&[-1.0, -4.0]), Some((1, -4.0)));
        assert_eq!(n.extremum_slope(&[]), None);
        assert_eq!(n.overdrive(3.0, 1.0), 2.0);
    }

    #[test]
    fn overdrive_clamps_below_threshold() {
        assert_eq!(NType.overdrive(3.0, 1.0), 2.0);
        assert_eq!(NType.overdrive(0.0, 1.0), 0.0);
        assert_eq!(PType.overdrive(-3.0, -1.0), 2.0);
        assert_eq!(PType.overdrive(0.0, -1.0), 0.0);
    }

    #[test]
    fn min_magnitude_skips_zero_artifacts() {
        let ss = [0.0, -0.2, 0.1, f64::NAN, 0.3];
        assert_eq!(min_magnitude(&ss, true), Some((2, 0.1)));
        assert_eq!(min_magnitude(&ss, false), Some((0, 0.0)));
    }

    #[test]
    fn ambipolar_runs_both_branches() {
        let kinds = Polarity::Ambipolar.kinds();
        let polarities: Vec<_> = kinds.iter().map(|k| k.polarity()).collect();
        assert_eq!(polarities, vec![Polarity::N, Polarity::P]);
        assert_eq!(Ambipolar::default().branches()[1].polarity(), Polarity::P);
        assert_eq!("P".parse::<Polarity>(), Ok(Polarity::P));
    }
}
