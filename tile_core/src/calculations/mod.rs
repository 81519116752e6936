//! # Materials Calculations
//!
//! Turns a validated job into quantities. Each step follows the pattern:
//!
//! - a validated input ([`JobSpec`](crate::job::JobSpec) or a bill)
//! - a JSON-serializable result ([`MaterialsBill`], [`PurchasePlan`])
//! - a pure function producing it, with a `_traced` variant that records
//!   the formulas applied
//!
//! ## Available Calculations
//!
//! - `estimate` - Quantity Estimator: job spec to raw materials bill
//! - [`purchase`] - Rounding a bill into whole bags and tubs

pub mod estimate;
pub mod purchase;

pub use estimate::{estimate, estimate_traced, estimate_with, MaterialsBill};
pub use purchase::{Material, PurchaseLine, PurchasePlan};
