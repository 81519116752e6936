//! # Quantity Estimator
//!
//! Maps a validated [`JobSpec`] to a [`MaterialsBill`]: primer, adhesive,
//! grout and levelling compound for the whole area.
//!
//! Estimation is total. A `JobSpec` is valid by construction, and every
//! table lookup has a fallback, so there is nothing left to fail. Lookups
//! that fell back are listed in [`MaterialsBill::assumptions`].
//!
//! ## Assumptions
//!
//! - Solid adhesive bed at the trowel notch for the tile bracket
//! - Grout joints filled to full tile depth
//! - No wastage allowance; quantities are raw
//!
//! ## Example
//!
//! ```rust
//! use tile_core::calculations::estimate::estimate;
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
//! let bill = estimate(&spec);
//! assert!((bill.adhesive_kg - 106.0).abs() < 1e-9);
//! assert_eq!(bill.levelling_compound_kg, 0.0);
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coverage::EstimateSettings;
use crate::formulas::quantities::{adhesive_mass, grout_fill_depth, grout_mass, levelling_mass, primer_volume};
use crate::formulas::registry::{Formula, FormulaTracker};
use crate::job::JobSpec;
use crate::materials::TileBracket;
use crate::units::{Millimetres, SquareMetres};

static DEFAULT_SETTINGS: Lazy<EstimateSettings> = Lazy::new(EstimateSettings::default);

/// Materials needed for a tiling job.
///
/// ## JSON Example
///
/// ```json
/// {
///   "primer_litres": 2.0,
///   "adhesive_kg": 106.0,
///   "grout_kg": 5.76,
///   "levelling_compound_kg": 0.0,
///   "primer_coats": 1,
///   "trowel_notch_mm": 8.0,
///   "joint_width_mm": 3.0,
///   "levelling_depth_mm": 0.0,
///   "tile_bracket": "Standard",
///   "assumptions": []
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialsBill {
    /// Primer for all coats (L)
    pub primer_litres: f64,

    /// Powder adhesive (kg)
    pub adhesive_kg: f64,

    /// Grout powder (kg)
    pub grout_kg: f64,

    /// Self-levelling compound (kg); zero when no levelling is needed
    pub levelling_compound_kg: f64,

    /// Primer coats applied
    pub primer_coats: u32,

    /// Square-notch trowel size (mm)
    pub trowel_notch_mm: f64,

    /// Nominal grout joint width (mm)
    pub joint_width_mm: f64,

    /// Average levelling depth including any UFH allowance (mm)
    pub levelling_depth_mm: f64,

    /// Tile size class that selected the notch and adhesive rate
    pub tile_bracket: TileBracket,

    /// Fallback rates that were used, for the method statement notes
    #[serde(default)]
    pub assumptions: Vec<String>,
}

impl MaterialsBill {
    /// True when the job needs levelling compound
    pub fn needs_levelling(&self) -> bool {
        self.levelling_compound_kg > 0.0
    }

    /// The four quantities, in work order
    pub fn quantities(&self) -> [f64; 4] {
        [
            self.primer_litres,
            self.levelling_compound_kg,
            self.adhesive_kg,
            self.grout_kg,
        ]
    }
}

/// Estimate materials with the built-in coverage tables.
pub fn estimate(spec: &JobSpec) -> MaterialsBill {
    estimate_with(spec, &DEFAULT_SETTINGS)
}

/// Estimate materials with caller-supplied coverage tables.
///
/// `settings` should already have passed [`EstimateSettings::validate`];
/// the settings loaders in [`crate::file_io`] guarantee that.
pub fn estimate_with(spec: &JobSpec, settings: &EstimateSettings) -> MaterialsBill {
    let mut tracker = FormulaTracker::new();
    estimate_traced(spec, settings, &mut tracker)
}

/// Estimate materials and record every formula applied.
pub fn estimate_traced(spec: &JobSpec, settings: &EstimateSettings, tracker: &mut FormulaTracker) -> MaterialsBill {
    let rates = &settings.rates;
    let area = SquareMetres(spec.area_m2());
    let tile = spec.tile();
    let substrate = spec.substrate();
    let mut assumptions = Vec::new();

    // Preparation
    let primer = rates.primer(substrate);
    let (primer_rate, primer_coats) = primer.value;
    if primer.is_fallback() {
        assumptions.push(format!(
            "No primer rate listed for {}; {:.2} L/m² x {} coat assumed",
            substrate.display_name(),
            primer_rate,
            primer_coats
        ));
    }
    let primer_litres = primer_volume(area, primer_rate, primer_coats);
    tracker.record_for_material(
        Formula::PrimerVolume,
        format!("{} coat(s) on {}", primer_coats, substrate.display_name()),
        "Primer",
    );

    let levelling_depth = Millimetres(rates.levelling_depth_mm(substrate, spec.underfloor_heating()));
    tracker.record_for_material(
        Formula::LevellingDepth,
        format!("{} mm average", levelling_depth.0),
        "Levelling compound",
    );
    let levelling = levelling_mass(area, levelling_depth, rates.levelling_kg_per_m2_per_mm);
    tracker.record_for_material(Formula::LevellingMass, "Self-levelling compound", "Levelling compound");

    // Fixing
    let bracket = tile.bracket();
    let notch_mm = bracket.trowel_notch_mm();
    tracker.record_for_material(
        Formula::TrowelNotch,
        format!("{} tile, {} mm notch", tile.display_name(), notch_mm),
        "Adhesive",
    );
    let adhesive_rate = rates.adhesive_kg_per_m2(spec.adhesive(), bracket);
    if adhesive_rate.is_fallback() {
        assumptions.push(format!(
            "No {} yield listed for {} tiles; {:.1} kg/m² assumed",
            spec.adhesive().display_name(),
            bracket.display_name().to_lowercase(),
            adhesive_rate.value
        ));
    }
    let substrate_factor = rates.adhesive_substrate_factor(substrate);
    let adhesive = adhesive_mass(area, adhesive_rate.value, substrate_factor);
    tracker.record_for_material(
        Formula::AdhesiveMass,
        format!("{} at {:.1} kg/m²", spec.adhesive().code(), adhesive_rate.value),
        "Adhesive",
    );

    // Grouting
    let joint_mm = tile.joint_width_mm();
    tracker.record_for_material(Formula::JointWidth, format!("{} mm joints", joint_mm), "Grout");
    let (width_mm, height_mm) = tile.dimensions_mm();
    let fill_depth = grout_fill_depth(width_mm, height_mm, joint_mm, spec.tile_thickness_mm());
    tracker.record_for_material(
        Formula::GroutFillDepth,
        format!("{} mm deep joints", spec.tile_thickness_mm()),
        "Grout",
    );
    let density = rates.grout_density_kg_per_l(spec.grout());
    if density.is_fallback() {
        assumptions.push(format!(
            "No density listed for {} grout; {:.2} kg/L assumed",
            spec.grout().display_name(),
            density.value
        ));
    }
    let grout = grout_mass(area, fill_depth, density.value);
    tracker.record_for_material(Formula::GroutMass, spec.grout().code(), "Grout");

    let bill = MaterialsBill {
        primer_litres: primer_litres.0,
        adhesive_kg: adhesive.0,
        grout_kg: grout.0,
        levelling_compound_kg: levelling.0,
        primer_coats,
        trowel_notch_mm: notch_mm,
        joint_width_mm: joint_mm,
        levelling_depth_mm: levelling_depth.0,
        tile_bracket: bracket,
        assumptions,
    };

    debug!(
        area_m2 = area.0,
        primer_l = bill.primer_litres,
        adhesive_kg = bill.adhesive_kg,
        grout_kg = bill.grout_kg,
        levelling_kg = bill.levelling_compound_kg,
        "estimated materials"
    );

    bill
}
