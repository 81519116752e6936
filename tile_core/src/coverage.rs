//! # Coverage Rates
//!
//! Constant tables mapping job options to material consumption.
//!
//! ## Overview
//!
//! Every quantity in a materials bill is `area × rate`, where the rate is a
//! table lookup keyed by the relevant enum combination:
//!
//! | Table | Key | Value | Fallback |
//! |-------|-----|-------|----------|
//! | Adhesive | adhesive × tile bracket | kg/m² | [`DEFAULT_ADHESIVE_KG_PER_M2`] |
//! | Adhesive factor | substrate | multiplier | 1.0 |
//! | Primer | substrate | L/m² per coat, coats | [`DEFAULT_PRIMER_LITRES_PER_M2`], 1 coat |
//! | Grout density | grout | kg/L | [`DEFAULT_GROUT_DENSITY_KG_PER_L`] |
//! | Levelling depth | substrate | mm | 0 mm |
//!
//! Underfloor heating adds a fixed [`UFH_LEVELLING_ALLOWANCE_MM`] of
//! levelling compound on top of any substrate allowance.
//!
//! A lookup that misses its table uses the documented fallback and says so
//! through [`RateSource::Fallback`], so the method statement can flag it.
//!
//! The built-in tables are the defaults of [`EstimateSettings`], which can be
//! overridden from a TOML file.
//!
//! ## Reference
//!
//! BS 5385-3:2014 (floor tiling), BS EN 12004 (adhesives), BS EN 13888
//! (grouts); yields are typical manufacturer datasheet figures.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{TileError, TileResult};
use crate::materials::{AdhesiveType, GroutType, Substrate, TileBracket};

// ============================================================================
// Standard References
// ============================================================================

/// Standard and clause references printed alongside the method steps.
pub mod bs_ref {
    /// Floor tiling code of practice
    pub const FLOOR_TILING: &str = "BS 5385-3:2014";
    /// Substrate assessment
    pub const SUBSTRATE: &str = "BS 5385-3 Clause 6";
    /// Calcium sulphate screeds
    pub const ANHYDRITE: &str = "BS 5385-3 Clause 6.4";
    /// Heated floors
    pub const UFH: &str = "BS 5385-3 Clause 6.8";
    /// Timber floors
    pub const TIMBER: &str = "BS 5385-3 Clause 6.6";
    /// Movement joints
    pub const MOVEMENT_JOINTS: &str = "BS 5385-3 Clause 6.9";
    /// Adhesive classification
    pub const ADHESIVE: &str = "BS EN 12004";
    /// Grout classification
    pub const GROUT: &str = "BS EN 13888";
}

// ============================================================================
// Built-in Tables
// ============================================================================

/// Adhesive rate used when an adhesive/bracket pair has no table entry
/// (10 mm notch yield, the heaviest bed in the table).
pub const DEFAULT_ADHESIVE_KG_PER_M2: f64 = 6.7;

/// Primer rate per coat used for substrates without a table entry
pub const DEFAULT_PRIMER_LITRES_PER_M2: f64 = 0.10;

/// Primer coats used for substrates without a table entry
pub const DEFAULT_PRIMER_COATS: u32 = 1;

/// Grout density used for grouts without a table entry
pub const DEFAULT_GROUT_DENSITY_KG_PER_L: f64 = 1.6;

/// Extra levelling depth laid over underfloor heating
pub const UFH_LEVELLING_ALLOWANCE_MM: f64 = 3.0;

/// Levelling compound yield per millimetre of depth
pub const LEVELLING_KG_PER_M2_PER_MM: f64 = 1.6;

/// Adhesive consumption for one adhesive class and tile bracket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdhesiveRate {
    pub adhesive: AdhesiveType,
    pub bracket: TileBracket,
    pub kg_per_m2: f64,
}

/// Adhesive multiplier for a substrate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubstrateFactor {
    pub substrate: Substrate,
    pub adhesive_factor: f64,
}

/// Primer consumption for a substrate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrimerRate {
    pub substrate: Substrate,
    pub litres_per_m2_per_coat: f64,
    pub coats: u32,
}

/// Placed density for a grout class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroutDensity {
    pub grout: GroutType,
    pub kg_per_litre: f64,
}

/// Average levelling depth a substrate needs before tiling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubstrateLevelling {
    pub substrate: Substrate,
    pub depth_mm: f64,
}

/// 6 / 8 / 10 mm square-notch bed yields. S2 adhesives are lightweight;
/// gel adhesives have no published large-format yield and fall back.
const ADHESIVE_RATES: [AdhesiveRate; 11] = [
    AdhesiveRate { adhesive: AdhesiveType::C2TeS1, bracket: TileBracket::Small, kg_per_m2: 3.5 },
    AdhesiveRate { adhesive: AdhesiveType::C2TeS1, bracket: TileBracket::Standard, kg_per_m2: 5.3 },
    AdhesiveRate { adhesive: AdhesiveType::C2TeS1, bracket: TileBracket::LargeFormat, kg_per_m2: 6.7 },
    AdhesiveRate { adhesive: AdhesiveType::C2TeS2, bracket: TileBracket::Small, kg_per_m2: 2.8 },
    AdhesiveRate { adhesive: AdhesiveType::C2TeS2, bracket: TileBracket::Standard, kg_per_m2: 4.2 },
    AdhesiveRate { adhesive: AdhesiveType::C2TeS2, bracket: TileBracket::LargeFormat, kg_per_m2: 5.3 },
    AdhesiveRate { adhesive: AdhesiveType::RapidSetC2, bracket: TileBracket::Small, kg_per_m2: 3.5 },
    AdhesiveRate { adhesive: AdhesiveType::RapidSetC2, bracket: TileBracket::Standard, kg_per_m2: 5.3 },
    AdhesiveRate { adhesive: AdhesiveType::RapidSetC2, bracket: TileBracket::LargeFormat, kg_per_m2: 6.7 },
    AdhesiveRate { adhesive: AdhesiveType::Gel, bracket: TileBracket::Small, kg_per_m2: 3.0 },
    AdhesiveRate { adhesive: AdhesiveType::Gel, bracket: TileBracket::Standard, kg_per_m2: 4.5 },
];

/// Non-absorbent existing tile needs a fuller bed
const SUBSTRATE_FACTORS: [SubstrateFactor; 1] = [
    SubstrateFactor { substrate: Substrate::ExistingTile, adhesive_factor: 1.10 },
];

/// Anhydrite takes two coats; plywood and existing tile take a heavier bonding primer
const PRIMER_RATES: [PrimerRate; 5] = [
    PrimerRate { substrate: Substrate::Concrete, litres_per_m2_per_coat: 0.10, coats: 1 },
    PrimerRate { substrate: Substrate::Screed, litres_per_m2_per_coat: 0.10, coats: 1 },
    PrimerRate { substrate: Substrate::AnhydriteScreed, litres_per_m2_per_coat: 0.10, coats: 2 },
    PrimerRate { substrate: Substrate::Plywood, litres_per_m2_per_coat: 0.15, coats: 1 },
    PrimerRate { substrate: Substrate::ExistingTile, litres_per_m2_per_coat: 0.15, coats: 1 },
];

const GROUT_DENSITIES: [GroutDensity; 3] = [
    GroutDensity { grout: GroutType::Cg2Wa, kg_per_litre: 1.6 },
    GroutDensity { grout: GroutType::Hybrid, kg_per_litre: 1.5 },
    GroutDensity { grout: GroutType::EpoxyRg, kg_per_litre: 1.55 },
];

/// Anhydrite screeds are sanded and usually need a skim
const SUBSTRATE_LEVELLING: [SubstrateLevelling; 1] = [
    SubstrateLevelling { substrate: Substrate::AnhydriteScreed, depth_mm: 3.0 },
];

// ============================================================================
// Lookups
// ============================================================================

/// Where a looked-up rate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateSource {
    /// Found in the table
    Table,
    /// Missing from the table; the documented fallback was used
    Fallback,
}

/// A looked-up rate and its provenance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rate<T> {
    pub value: T,
    pub source: RateSource,
}

impl<T> Rate<T> {
    fn table(value: T) -> Self {
        Rate { value, source: RateSource::Table }
    }

    fn fallback(value: T) -> Self {
        Rate { value, source: RateSource::Fallback }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == RateSource::Fallback
    }
}

/// Coverage tables used by the estimator.
///
/// `Default` is the built-in table. Missing fields in a TOML override fall
/// back to the built-in values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageRates {
    pub adhesive: Vec<AdhesiveRate>,
    pub default_adhesive_kg_per_m2: f64,
    pub adhesive_substrate_factors: Vec<SubstrateFactor>,
    pub primer: Vec<PrimerRate>,
    pub default_primer_litres_per_m2: f64,
    pub default_primer_coats: u32,
    pub grout_density: Vec<GroutDensity>,
    pub default_grout_density_kg_per_l: f64,
    pub substrate_levelling: Vec<SubstrateLevelling>,
    pub ufh_levelling_allowance_mm: f64,
    pub levelling_kg_per_m2_per_mm: f64,
}

impl Default for CoverageRates {
    fn default() -> Self {
        CoverageRates {
            adhesive: ADHESIVE_RATES.to_vec(),
            default_adhesive_kg_per_m2: DEFAULT_ADHESIVE_KG_PER_M2,
            adhesive_substrate_factors: SUBSTRATE_FACTORS.to_vec(),
            primer: PRIMER_RATES.to_vec(),
            default_primer_litres_per_m2: DEFAULT_PRIMER_LITRES_PER_M2,
            default_primer_coats: DEFAULT_PRIMER_COATS,
            grout_density: GROUT_DENSITIES.to_vec(),
            default_grout_density_kg_per_l: DEFAULT_GROUT_DENSITY_KG_PER_L,
            substrate_levelling: SUBSTRATE_LEVELLING.to_vec(),
            ufh_levelling_allowance_mm: UFH_LEVELLING_ALLOWANCE_MM,
            levelling_kg_per_m2_per_mm: LEVELLING_KG_PER_M2_PER_MM,
        }
    }
}

impl CoverageRates {
    /// Adhesive consumption (kg/m²) for an adhesive class and tile bracket
    pub fn adhesive_kg_per_m2(&self, adhesive: AdhesiveType, bracket: TileBracket) -> Rate<f64> {
        match self
            .adhesive
            .iter()
            .find(|r| r.adhesive == adhesive && r.bracket == bracket)
        {
            Some(rate) => Rate::table(rate.kg_per_m2),
            None => {
                debug!(?adhesive, ?bracket, "no adhesive rate, using fallback");
                Rate::fallback(self.default_adhesive_kg_per_m2)
            }
        }
    }

    /// Adhesive multiplier for a substrate (1.0 when unlisted)
    pub fn adhesive_substrate_factor(&self, substrate: Substrate) -> f64 {
        self.adhesive_substrate_factors
            .iter()
            .find(|f| f.substrate == substrate)
            .map(|f| f.adhesive_factor)
            .unwrap_or(1.0)
    }

    /// Primer rate per coat and number of coats for a substrate
    pub fn primer(&self, substrate: Substrate) -> Rate<(f64, u32)> {
        match self.primer.iter().find(|r| r.substrate == substrate) {
            Some(rate) => Rate::table((rate.litres_per_m2_per_coat, rate.coats)),
            None => {
                debug!(?substrate, "no primer rate, using fallback");
                Rate::fallback((self.default_primer_litres_per_m2, self.default_primer_coats))
            }
        }
    }

    /// Placed grout density (kg/L)
    pub fn grout_density_kg_per_l(&self, grout: GroutType) -> Rate<f64> {
        match self.grout_density.iter().find(|d| d.grout == grout) {
            Some(density) => Rate::table(density.kg_per_litre),
            None => {
                debug!(?grout, "no grout density, using fallback");
                Rate::fallback(self.default_grout_density_kg_per_l)
            }
        }
    }

    /// Average levelling depth (mm) for a substrate, plus the UFH allowance
    pub fn levelling_depth_mm(&self, substrate: Substrate, underfloor_heating: bool) -> f64 {
        let substrate_depth = self
            .substrate_levelling
            .iter()
            .find(|l| l.substrate == substrate)
            .map(|l| l.depth_mm)
            .unwrap_or(0.0);
        let ufh_depth = if underfloor_heating {
            self.ufh_levelling_allowance_mm
        } else {
            0.0
        };
        substrate_depth + ufh_depth
    }

    /// Check every rate is finite and non-negative and no key repeats.
    pub fn validate(&self) -> TileResult<()> {
        let scalars = [
            ("default_adhesive_kg_per_m2", self.default_adhesive_kg_per_m2),
            ("default_primer_litres_per_m2", self.default_primer_litres_per_m2),
            ("default_grout_density_kg_per_l", self.default_grout_density_kg_per_l),
            ("ufh_levelling_allowance_mm", self.ufh_levelling_allowance_mm),
            ("levelling_kg_per_m2_per_mm", self.levelling_kg_per_m2_per_mm),
        ];
        for (field, value) in scalars {
            check_rate(field, value)?;
        }

        for (i, rate) in self.adhesive.iter().enumerate() {
            check_rate("adhesive.kg_per_m2", rate.kg_per_m2)?;
            if self.adhesive[..i]
                .iter()
                .any(|r| r.adhesive == rate.adhesive && r.bracket == rate.bracket)
            {
                return Err(duplicate("adhesive", format!("{:?}/{:?}", rate.adhesive, rate.bracket)));
            }
        }
        for (i, factor) in self.adhesive_substrate_factors.iter().enumerate() {
            check_rate("adhesive_substrate_factors.adhesive_factor", factor.adhesive_factor)?;
            if self.adhesive_substrate_factors[..i]
                .iter()
                .any(|f| f.substrate == factor.substrate)
            {
                return Err(duplicate("adhesive_substrate_factors", factor.substrate.code()));
            }
        }
        for (i, rate) in self.primer.iter().enumerate() {
            check_rate("primer.litres_per_m2_per_coat", rate.litres_per_m2_per_coat)?;
            if self.primer[..i].iter().any(|r| r.substrate == rate.substrate) {
                return Err(duplicate("primer", rate.substrate.code()));
            }
        }
        for (i, density) in self.grout_density.iter().enumerate() {
            check_rate("grout_density.kg_per_litre", density.kg_per_litre)?;
            if self.grout_density[..i].iter().any(|d| d.grout == density.grout) {
                return Err(duplicate("grout_density", density.grout.code()));
            }
        }
        for (i, levelling) in self.substrate_levelling.iter().enumerate() {
            check_rate("substrate_levelling.depth_mm", levelling.depth_mm)?;
            if self.substrate_levelling[..i]
                .iter()
                .any(|l| l.substrate == levelling.substrate)
            {
                return Err(duplicate("substrate_levelling", levelling.substrate.code()));
            }
        }
        Ok(())
    }
}

fn check_rate(field: &str, value: f64) -> TileResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(TileError::invalid_input(
            field,
            value.to_string(),
            "Rates must be finite and non-negative",
        ));
    }
    Ok(())
}

fn duplicate(table: &str, key: impl Into<String>) -> TileError {
    TileError::invalid_input(table, key, "Duplicate table entry")
}

// ============================================================================
// Pack Sizes and Settings
// ============================================================================

/// Purchasable unit sizes used to round a bill into whole packs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackSizes {
    pub adhesive_bag_kg: f64,
    pub grout_bag_kg: f64,
    pub levelling_bag_kg: f64,
    pub primer_tub_litres: f64,
}

impl Default for PackSizes {
    fn default() -> Self {
        PackSizes {
            adhesive_bag_kg: 20.0,
            grout_bag_kg: 5.0,
            levelling_bag_kg: 25.0,
            primer_tub_litres: 5.0,
        }
    }
}

impl PackSizes {
    /// Every pack size must be finite and positive.
    pub fn validate(&self) -> TileResult<()> {
        for (field, value) in [
            ("adhesive_bag_kg", self.adhesive_bag_kg),
            ("grout_bag_kg", self.grout_bag_kg),
            ("levelling_bag_kg", self.levelling_bag_kg),
            ("primer_tub_litres", self.primer_tub_litres),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TileError::invalid_input(
                    field,
                    value.to_string(),
                    "Pack sizes must be positive",
                ));
            }
        }
        Ok(())
    }
}

/// Estimator configuration: coverage tables plus pack sizes.
///
/// ## TOML Example
///
/// ```toml
/// [rates]
/// ufh_levelling_allowance_mm = 5.0
///
/// [[rates.adhesive]]
/// adhesive = "GEL"
/// bracket = "LargeFormat"
/// kg_per_m2 = 6.0
///
/// [packs]
/// adhesive_bag_kg = 25.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateSettings {
    pub rates: CoverageRates,
    pub packs: PackSizes,
}

impl EstimateSettings {
    /// Validate rates and pack sizes.
    pub fn validate(&self) -> TileResult<()> {
        self.rates.validate()?;
        self.packs.validate()
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(text: &str) -> TileResult<Self> {
        let settings: EstimateSettings =
            toml::from_str(text).map_err(|e| TileError::serialization(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize settings to TOML text.
    pub fn to_toml_string(&self) -> TileResult<String> {
        toml::to_string_pretty(self).map_err(|e| TileError::serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_are_valid() {
        assert!(EstimateSettings::default().validate().is_ok());
    }

    #[test]
    fn test_adhesive_lookup() {
        let rates = CoverageRates::default();
        let rate = rates.adhesive_kg_per_m2(AdhesiveType::C2TeS1, TileBracket::Standard);
        assert_eq!(rate.value, 5.3);
        assert_eq!(rate.source, RateSource::Table);

        // Gel adhesive has no large-format entry
        let fallback = rates.adhesive_kg_per_m2(AdhesiveType::Gel, TileBracket::LargeFormat);
        assert!(fallback.is_fallback());
        assert_eq!(fallback.value, DEFAULT_ADHESIVE_KG_PER_M2);
    }

    #[test]
    fn test_primer_lookup() {
        let rates = CoverageRates::default();
        assert_eq!(rates.primer(Substrate::AnhydriteScreed).value, (0.10, 2));
        let board = rates.primer(Substrate::BackerBoard);
        assert!(board.is_fallback());
        assert_eq!(board.value, (DEFAULT_PRIMER_LITRES_PER_M2, DEFAULT_PRIMER_COATS));
    }

    #[test]
    fn test_levelling_depth() {
        let rates = CoverageRates::default();
        assert_eq!(rates.levelling_depth_mm(Substrate::Concrete, false), 0.0);
        assert_eq!(rates.levelling_depth_mm(Substrate::Concrete, true), UFH_LEVELLING_ALLOWANCE_MM);
        assert_eq!(rates.levelling_depth_mm(Substrate::AnhydriteScreed, true), 6.0);
    }

    #[test]
    fn test_substrate_factor() {
        let rates = CoverageRates::default();
        assert_eq!(rates.adhesive_substrate_factor(Substrate::ExistingTile), 1.10);
        assert_eq!(rates.adhesive_substrate_factor(Substrate::Concrete), 1.0);
    }

    #[test]
    fn test_validation_rejects_negative_and_duplicates() {
        let mut rates = CoverageRates::default();
        rates.levelling_kg_per_m2_per_mm = -1.0;
        assert!(rates.validate().is_err());

        let mut rates = CoverageRates::default();
        rates.primer.push(PrimerRate {
            substrate: Substrate::Concrete,
            litres_per_m2_per_coat: 0.2,
            coats: 1,
        });
        assert!(rates.validate().unwrap_err().is_invalid_input());

        let packs = PackSizes { grout_bag_kg: 0.0, ..PackSizes::default() };
        assert!(packs.validate().is_err());
    }

    #[test]
    fn test_partial_toml_override() {
        let text = r#"
[rates]
ufh_levelling_allowance_mm = 5.0

[[rates.adhesive]]
adhesive = "GEL"
bracket = "LargeFormat"
kg_per_m2 = 6.0

[packs]
adhesive_bag_kg = 25.0
"#;
        let settings = EstimateSettings::from_toml_str(text).unwrap();
        assert_eq!(settings.rates.ufh_levelling_allowance_mm, 5.0);
        // The adhesive table is replaced wholesale by the override
        assert_eq!(settings.rates.adhesive.len(), 1);
        assert_eq!(settings.rates.primer, CoverageRates::default().primer);
        assert_eq!(settings.packs.adhesive_bag_kg, 25.0);
        assert_eq!(settings.packs.grout_bag_kg, 5.0);
    }

    #[test]
    fn test_toml_roundtrip() {
        let settings = EstimateSettings::default();
        let text = settings.to_toml_string().unwrap();
        let parsed = EstimateSettings::from_toml_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_invalid_toml() {
        let err = EstimateSettings::from_toml_str("[packs]\nprimer_tub_litres = -5.0\n").unwrap_err();
        assert!(err.is_invalid_input());
        let err = EstimateSettings::from_toml_str("rates = 3").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }
}
