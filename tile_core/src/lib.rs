//! # tile_core - Tiling Estimate and Method Statement Engine
//!
//! `tile_core` turns a floor tiling job into a materials bill and a branded
//! PDF method statement. All inputs and outputs are JSON-serializable, and
//! the estimator is a pure function of its input.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **Validated at the edge**: A [`JobSpec`] can only be built from valid data
//! - **Raw quantities**: No wastage or rounding in the bill; packs are a separate step
//! - **Rich Errors**: Structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use tile_core::job::JobSpec;
//! use tile_core::materials::{AdhesiveType, GroutType, Substrate, TileSize};
//!
//! let spec = JobSpec::new(
//!     20.0,
//!     TileSize::T300x300,
//!     Substrate::Concrete,
//!     false,
//!     AdhesiveType::C2TeS1,
//!     GroutType::Cg2Wa,
//! )
//! .unwrap();
//!
//! let bill = tile_core::estimate(&spec);
//! assert_eq!(bill.levelling_compound_kg, 0.0);
//!
//! // Serialize to JSON for storage or transmission
//! let json = serde_json::to_string_pretty(&bill).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`job`] - Job parameters, document details and job files
//! - [`calculations`] - Quantity estimator and purchase rounding
//! - [`coverage`] - Coverage rate tables, pack sizes and settings
//! - [`formulas`] - Estimating formulas and their registry
//! - [`materials`] - Tile sizes, substrates, adhesives and grouts
//! - [`pdf`] - Method statement renderer (Typst)
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types
//! - [`file_io`] - Job, settings and document files with atomic saves

pub mod calculations;
pub mod coverage;
pub mod errors;
pub mod file_io;
pub mod formulas;
pub mod job;
pub mod materials;
pub mod pdf;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{estimate, estimate_with, MaterialsBill, PurchasePlan};
pub use coverage::EstimateSettings;
pub use errors::{TileError, TileResult};
pub use file_io::{load_job, save_job, write_document};
pub use job::{JobDetails, JobFile, JobSpec, JobSpecInput, JobSpecRecord};
pub use pdf::{render, render_method_statement, DocumentOptions, DocumentPayload};
