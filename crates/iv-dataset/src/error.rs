//! Dataset construction and access errors.

use iv_core::CoreError;
use thiserror::Error;

use crate::roles::Role;

/// Result type for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Error, Debug)]
pub enum DatasetError {
    /// A required role matched no table header.
    #[error("Cannot find a column for {role} (searched for {candidates:?})")]
    UnresolvedColumn { role: Role, candidates: Vec<String> },

    /// Sets disagree on length, direction-change count or turnaround index.
    #[error("Inconsistent sweep shape: {what}")]
    InconsistentSweepShape { what: String },

    /// Only single-direction or forward+backward sweeps are supported.
    #[error("Set {set} reverses direction {changes} times; only single or forward+backward sweeps are supported")]
    TooManyDirectionChanges { set: usize, changes: usize },

    #[error("Column '{column}' requests a sweep direction, but the sweep has a single direction")]
    UnsupportedSweepDirection { column: String },

    #[error("Secondary value {value} is not one of the dataset's sets {known:?}")]
    UnknownSecondaryValue { value: String, known: Vec<f64> },

    #[error("Selecting '{column}' by master range yields widths {widths:?} across sets")]
    NonRectangularSelection { column: String, widths: Vec<usize> },

    #[error("Unknown column: {name}")]
    UnknownColumn { name: String },

    #[error("Column already exists: {name}")]
    DuplicateColumn { name: String },

    #[error("Shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: String,
        expected: String,
        actual: String,
    },

    #[error("{given} secondary values were supplied for {sets} sets")]
    SecondaryValueCount { given: usize, sets: usize },

    #[error("Parse error at line {line}, column {column}: '{text}'")]
    Parse {
        line: usize,
        column: usize,
        text: String,
    },

    #[error("Empty table: {what}")]
    Empty { what: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Non-fatal data-quality findings recorded during construction.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetWarning {
    /// More than one candidate name matched; the closer one was kept.
    AmbiguousColumn {
        role: Role,
        chosen: String,
        rejected: String,
    },
    /// An optional role has no column in the table.
    MissingColumn { role: Role },
    /// A set repeated an earlier secondary value (or had none) and was dropped.
    DroppedSet { set: usize, secondary_value: f64 },
}

impl std::fmt::Display for DatasetWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetWarning::AmbiguousColumn {
                role,
                chosen,
                rejected,
            } => write!(
                f,
                "{role}: names '{chosen}' and '{rejected}' both match table columns, using '{chosen}'"
            ),
            DatasetWarning::MissingColumn { role } => {
                write!(f, "{role}: no matching column in the table")
            }
            DatasetWarning::DroppedSet {
                set,
                secondary_value,
            } => write!(
                f,
                "set {set} dropped: secondary value {secondary_value} is missing or repeated"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_role() {
        let err = DatasetError::UnresolvedColumn {
            role: Role::DrainCurrent,
            candidates: vec!["draini".into(), "idrain".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("drain current"));
        assert!(msg.contains("idrain"));
    }

    #[test]
    fn core_error_converts() {
        let core = CoreError::InvalidArg { what: "x".into() };
        let err: DatasetError = core.into();
        assert!(matches!(err, DatasetError::Core(_)));
    }
}
