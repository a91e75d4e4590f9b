//! Construction cost estimate engine.
//!
//! Computes an estimate breakup (line items, contingency/electrification
//! add-ons, GST split) from a built-up area, a rate per square foot and a
//! catalog of description rules. The breakup always reconciles with the
//! GST-inclusive grand total to the rupee.
//!
//! The crate is the pure computation layer of the estimate service: the
//! HTTP surface, persistence, payment capture and PDF rendering live in
//! the callers. They hand in an already-fetched [`CatalogSnapshot`] and
//! get back rows and totals ready to persist or render.

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod services;

pub use config::{ChargeDefaults, Settings};
pub use domain::catalog::{CatalogSnapshot, Charges, DescriptionItem};
pub use domain::estimate::{EstimateBreakup, EstimateOptions, EstimateRequest, LineItem};
pub use error::{EstimateError, EstimateResult};
pub use services::calc::{build_estimate, EstimateParams};
