//! Substrates
//!
//! The surface the tiles are fixed to. Substrate drives priming (rate and
//! number of coats), any levelling allowance, and a small adhesive factor
//! for non-absorbent bases.

use serde::{Deserialize, Serialize};

use crate::errors::{TileError, TileResult};

/// Base the tiles are fixed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum Substrate {
    /// Cured concrete slab
    #[default]
    Concrete,
    /// Plywood overlay on timber floor
    Plywood,
    /// Sand-cement screed
    Screed,
    /// Calcium sulphate (anhydrite) screed
    AnhydriteScreed,
    /// Sound existing tiles, tiled over
    ExistingTile,
    /// Cement or insulated backer board
    BackerBoard,
}

impl Substrate {
    /// All substrates for selection lists
    pub const ALL: [Substrate; 6] = [
        Substrate::Concrete,
        Substrate::Plywood,
        Substrate::Screed,
        Substrate::AnhydriteScreed,
        Substrate::ExistingTile,
        Substrate::BackerBoard,
    ];

    /// Short code used in job files and on the command line
    pub fn code(&self) -> &'static str {
        match self {
            Substrate::Concrete => "concrete",
            Substrate::Plywood => "plywood",
            Substrate::Screed => "screed",
            Substrate::AnhydriteScreed => "anhydrite-screed",
            Substrate::ExistingTile => "existing-tile",
            Substrate::BackerBoard => "backer-board",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> TileResult<Self> {
        match s.trim().to_lowercase().replace([' ', '_'], "-").as_str() {
            "concrete" | "concrete-slab" | "slab" => Ok(Substrate::Concrete),
            "plywood" | "ply" | "plywood-overlay" | "timber" => Ok(Substrate::Plywood),
            "screed" | "sand-cement" | "sand-cement-screed" | "cement-screed" => Ok(Substrate::Screed),
            "anhydrite" | "anhydrite-screed" | "calcium-sulphate" | "calcium-sulphate-screed" => {
                Ok(Substrate::AnhydriteScreed)
            }
            "existing-tile" | "existing-tiles" | "tile" | "over-tile" => Ok(Substrate::ExistingTile),
            "backer-board" | "backerboard" | "cement-board" | "board" => Ok(Substrate::BackerBoard),
            _ => Err(TileError::unknown_option(
                "substrate",
                s,
                &Substrate::ALL.map(|sub| sub.code()),
            )),
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Substrate::Concrete => "Concrete",
            Substrate::Plywood => "Plywood overlay",
            Substrate::Screed => "Sand-cement screed",
            Substrate::AnhydriteScreed => "Anhydrite screed",
            Substrate::ExistingTile => "Existing tile",
            Substrate::BackerBoard => "Backer board",
        }
    }

    /// Timber-based substrates that need deflection checks and a flexible bed
    pub fn is_timber(&self) -> bool {
        matches!(self, Substrate::Plywood)
    }
}

impl TryFrom<String> for Substrate {
    type Error = TileError;

    fn try_from(s: String) -> TileResult<Self> {
        Substrate::from_str_flexible(&s)
    }
}

impl std::fmt::Display for Substrate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flexible() {
        assert_eq!(Substrate::from_str_flexible("Concrete").unwrap(), Substrate::Concrete);
        assert_eq!(
            Substrate::from_str_flexible("Anhydrite screed").unwrap(),
            Substrate::AnhydriteScreed
        );
        assert_eq!(
            Substrate::from_str_flexible("existing_tile").unwrap(),
            Substrate::ExistingTile
        );
        let err = Substrate::from_str_flexible("carpet").unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_OPTION");
    }

    #[test]
    fn test_codes_roundtrip() {
        for substrate in Substrate::ALL {
            assert_eq!(Substrate::from_str_flexible(substrate.code()).unwrap(), substrate);
        }
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&Substrate::AnhydriteScreed).unwrap();
        assert_eq!(json, "\"anhydrite-screed\"");

        let parsed: Substrate = serde_json::from_str("\"Anhydrite screed\"").unwrap();
        assert_eq!(parsed, Substrate::AnhydriteScreed);
        assert!(serde_json::from_str::<Substrate>("\"carpet\"").is_err());
    }
}
