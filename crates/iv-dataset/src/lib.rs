//! iv-dataset: multi-set IV sweep tables.
//!
//! Provides:
//! - A generic named-column table (`RawTable`) with delimited-text reading
//! - Column roles and dataset layouts (IdVg, IdVd, TLM)
//! - Fuzzy header resolution with edit-distance tie-breaks
//! - Forward/backward sweep splitting and secondary-value set indexing
//!
//! # Example
//!
//! ```
//! use iv_dataset::{Layout, RawTable, SweepTable};
//!
//! let raw = RawTable::new()
//!     .with_column("GateV", vec![0.0, 1.0, 2.0, 2.0, 1.0, 0.0]).unwrap()
//!     .with_column("DrainI", vec![1e-9, 1e-7, 1e-6, 1e-6, 1e-7, 1e-9]).unwrap()
//!     .with_column("DrainV", vec![1.0; 6]).unwrap();
//! let table = SweepTable::from_raw(Layout::IdVg, &raw).unwrap();
//!
//! assert_eq!(table.sweep_count(), 2);
//! assert_eq!(table.get_column("id_fwd").unwrap().sets()[0].len(), 3);
//! ```

pub mod column;
pub mod dataset;
pub mod error;
pub mod resolve;
pub mod roles;
pub mod sweep;
pub mod table;

pub use column::{Branch, ColumnData, ColumnKey, ColumnSelector, Series};
pub use dataset::{SweepTable, SweepTableBuilder};
pub use error::{DatasetError, DatasetResult, DatasetWarning};
pub use resolve::{levenshtein, Binding};
pub use roles::{Layout, Role};
pub use sweep::SweepShape;
pub use table::RawTable;
