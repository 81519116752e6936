//! # Estimating Formulas
//!
//! The arithmetic behind a materials bill, kept in one place so every
//! quantity can be checked against its source.
//!
//! ## Modules
//!
//! - [`quantities`] - Pure quantity formulas (primer, adhesive, grout, levelling, packs)
//! - [`registry`] - Formula metadata and tracking for the method statement appendix
//!
//! ## Conventions
//!
//! - Areas in m², tile and joint dimensions in mm
//! - Quantities are raw; rounding into packs is a separate step
//! - No allowance for wastage is included
//!
//! ## References
//!
//! - BS 5385-3:2014 Wall and floor tiling, floor tiling code of practice
//! - BS EN 12004 Adhesives for ceramic tiles
//! - BS EN 13888 Grout for tiles

pub mod quantities;
pub mod registry;

pub use quantities::{
    adhesive_mass,
    grout_fill_depth,
    grout_mass,
    levelling_mass,
    pack_count,
    primer_volume,
};

pub use registry::{
    Formula,
    FormulaCategory,
    FormulaMetadata,
    FormulaTracker,
    FormulaUsage,
    SourceReference,
    Variable,
    ALL_FORMULAS,
    generate_formulas_markdown,
};
