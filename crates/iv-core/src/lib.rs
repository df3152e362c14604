//! iv-core: stable foundation for device-parameter extraction.
//!
//! Contains:
//! - dimension (exponent vectors over the SI base dimensions)
//! - units (runtime Unit/Quantity plus uom lengths + constructors)
//! - property (TypedProperty with dimensional contracts)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod dimension;
pub mod error;
pub mod numeric;
pub mod property;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use dimension::Dimension;
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use property::{Conditions, InputSpec, PropertySpec, TypedProperty};
pub use units::{Length, Quantity, Unit, nm, um};
