//! Adhesive and Grout Products
//!
//! Product classes per BS EN 12004 (adhesives) and BS EN 13888 (grouts).
//! The estimator only needs the class; brand names are accepted as aliases
//! when parsing.

use serde::{Deserialize, Serialize};

use crate::errors::{TileError, TileResult};

/// Tile adhesive class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String")]
pub enum AdhesiveType {
    /// Improved cementitious, reduced slip, deformable (standard choice)
    #[default]
    #[serde(rename = "C2TE-S1")]
    C2TeS1,
    /// Improved cementitious, highly deformable (lightweight)
    #[serde(rename = "C2TE-S2")]
    C2TeS2,
    /// Rapid-setting improved cementitious
    #[serde(rename = "C2F")]
    RapidSetC2,
    /// Gel-type eco adhesive (H40-style)
    #[serde(rename = "GEL")]
    Gel,
}

impl AdhesiveType {
    /// All adhesive classes for selection lists
    pub const ALL: [AdhesiveType; 4] = [
        AdhesiveType::C2TeS1,
        AdhesiveType::C2TeS2,
        AdhesiveType::RapidSetC2,
        AdhesiveType::Gel,
    ];

    /// Short code used in job files and on the command line
    pub fn code(&self) -> &'static str {
        match self {
            AdhesiveType::C2TeS1 => "C2TE-S1",
            AdhesiveType::C2TeS2 => "C2TE-S2",
            AdhesiveType::RapidSetC2 => "C2F",
            AdhesiveType::Gel => "GEL",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> TileResult<Self> {
        match s.trim().to_uppercase().replace([' ', '_', '-'], "").as_str() {
            "C2TES1" | "STANDARD" | "S1" => Ok(AdhesiveType::C2TeS1),
            "C2TES2" | "FLEXIBLE" | "S2" | "LIGHTWEIGHT" => Ok(AdhesiveType::C2TeS2),
            "C2F" | "RAPID" | "RAPIDSET" | "RAPIDSETC2" | "C2FT" => Ok(AdhesiveType::RapidSetC2),
            "GEL" | "H40" | "H40(KERAKOLL)" | "H40KERAKOLL" => Ok(AdhesiveType::Gel),
            _ => Err(TileError::unknown_option(
                "adhesive",
                s,
                &AdhesiveType::ALL.map(|a| a.code()),
            )),
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            AdhesiveType::C2TeS1 => "C2 TE S1 cementitious",
            AdhesiveType::C2TeS2 => "C2 TE S2 highly deformable",
            AdhesiveType::RapidSetC2 => "Rapid-set C2",
            AdhesiveType::Gel => "Gel adhesive (H40 type)",
        }
    }

    /// Whether the adhesive is S1 or better (suitable for timber and UFH)
    pub fn is_deformable(&self) -> bool {
        !matches!(self, AdhesiveType::RapidSetC2)
    }
}

impl TryFrom<String> for AdhesiveType {
    type Error = TileError;

    fn try_from(s: String) -> TileResult<Self> {
        AdhesiveType::from_str_flexible(&s)
    }
}

impl std::fmt::Display for AdhesiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Grout class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String")]
pub enum GroutType {
    /// Improved cementitious, water absorption reduced (standard choice)
    #[default]
    #[serde(rename = "CG2WA")]
    Cg2Wa,
    /// Hybrid resin-cement (Fugabella-style)
    #[serde(rename = "HYBRID")]
    Hybrid,
    /// Reaction resin (epoxy) grout
    #[serde(rename = "RG")]
    EpoxyRg,
}

impl GroutType {
    /// All grout classes for selection lists
    pub const ALL: [GroutType; 3] = [GroutType::Cg2Wa, GroutType::Hybrid, GroutType::EpoxyRg];

    /// Short code used in job files and on the command line
    pub fn code(&self) -> &'static str {
        match self {
            GroutType::Cg2Wa => "CG2WA",
            GroutType::Hybrid => "HYBRID",
            GroutType::EpoxyRg => "RG",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> TileResult<Self> {
        match s.trim().to_uppercase().replace([' ', '_', '-'], "").as_str() {
            "CG2WA" | "CG2" | "STANDARD" | "CEMENTITIOUS" => Ok(GroutType::Cg2Wa),
            "HYBRID" | "FUGABELLA" | "FUGABELLA43" | "KERAKOLLFUGABELLA43" => Ok(GroutType::Hybrid),
            "RG" | "EPOXY" | "EPOXYRG" => Ok(GroutType::EpoxyRg),
            _ => Err(TileError::unknown_option(
                "grout",
                s,
                &GroutType::ALL.map(|g| g.code()),
            )),
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            GroutType::Cg2Wa => "CG2 WA cementitious",
            GroutType::Hybrid => "Hybrid resin-cement",
            GroutType::EpoxyRg => "Epoxy RG",
        }
    }
}

impl TryFrom<String> for GroutType {
    type Error = TileError;

    fn try_from(s: String) -> TileResult<Self> {
        GroutType::from_str_flexible(&s)
    }
}

impl std::fmt::Display for GroutType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adhesive_aliases() {
        assert_eq!(AdhesiveType::from_str_flexible("C2 TE S1").unwrap(), AdhesiveType::C2TeS1);
        assert_eq!(AdhesiveType::from_str_flexible("c2te-s2").unwrap(), AdhesiveType::C2TeS2);
        assert_eq!(AdhesiveType::from_str_flexible("Rapid set C2").unwrap(), AdhesiveType::RapidSetC2);
        assert_eq!(AdhesiveType::from_str_flexible("H40 (Kerakoll)").unwrap(), AdhesiveType::Gel);
        assert!(AdhesiveType::from_str_flexible("glue").is_err());
    }

    #[test]
    fn test_grout_aliases() {
        assert_eq!(GroutType::from_str_flexible("CG2").unwrap(), GroutType::Cg2Wa);
        assert_eq!(GroutType::from_str_flexible("Kerakoll Fugabella 43").unwrap(), GroutType::Hybrid);
        assert_eq!(GroutType::from_str_flexible("Epoxy RG").unwrap(), GroutType::EpoxyRg);
        assert!(GroutType::from_str_flexible("silicone").unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_codes_roundtrip() {
        for adhesive in AdhesiveType::ALL {
            assert_eq!(AdhesiveType::from_str_flexible(adhesive.code()).unwrap(), adhesive);
        }
        for grout in GroutType::ALL {
            assert_eq!(GroutType::from_str_flexible(grout.code()).unwrap(), grout);
        }
    }

    #[test]
    fn test_deserialize_flexible_strings() {
        let adhesive: AdhesiveType = serde_json::from_str("\"Rapid set C2\"").unwrap();
        assert_eq!(adhesive, AdhesiveType::RapidSetC2);
        let grout: GroutType = serde_json::from_str("\"epoxy\"").unwrap();
        assert_eq!(grout, GroutType::EpoxyRg);
        assert_eq!(serde_json::to_string(&grout).unwrap(), "\"RG\"");
        assert!(serde_json::from_str::<GroutType>("\"silicone\"").is_err());
    }

    #[test]
    fn test_only_rapid_set_is_not_deformable() {
        let rigid: Vec<_> = AdhesiveType::ALL.into_iter().filter(|a| !a.is_deformable()).collect();
        assert_eq!(rigid, vec![AdhesiveType::RapidSetC2]);
    }
}
