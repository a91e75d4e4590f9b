//! Service layer: the estimate computation and its boundary wrappers.

pub mod calc;
pub mod snapshot;
pub mod validation;

pub use calc::{build_estimate, EstimateParams};
pub use snapshot::{build_snapshot, format_ref_no, preview_estimate};
pub use validation::{build_estimate_checked, resolve_estimate_date, validate_request};
