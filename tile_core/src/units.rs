//! # Unit Types
//!
//! Newtype wrappers for the handful of metric units a tiling estimate uses.
//! They serialize as bare numbers and exist to keep millimetres and metres
//! from being mixed up in the formula code.
//!
//! ## Units
//!
//! - Area: square metres (m²)
//! - Length: millimetres (mm), metres (m)
//! - Volume: litres (L)
//! - Mass: kilograms (kg)
//!
//! ## Example
//!
//! ```rust
//! use tile_core::units::{Litres, Millimetres, Metres};
//!
//! let edge = Millimetres(600.0);
//! let edge_m: Metres = edge.into();
//! assert_eq!(edge_m.0, 0.6);
//!
//! let primer = Litres(1.5) + Litres(0.5);
//! assert_eq!(primer, Litres(2.0));
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

// ============================================================================
// Length
// ============================================================================

/// Length in millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimetres(pub f64);

/// Length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metres(pub f64);

impl From<Millimetres> for Metres {
    fn from(mm: Millimetres) -> Self {
        Metres(mm.0 / 1000.0)
    }
}

impl From<Metres> for Millimetres {
    fn from(m: Metres) -> Self {
        Millimetres(m.0 * 1000.0)
    }
}

// ============================================================================
// Area
// ============================================================================

/// Area in square metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquareMetres(pub f64);

impl Mul<Metres> for Metres {
    type Output = SquareMetres;

    fn mul(self, rhs: Metres) -> SquareMetres {
        SquareMetres(self.0 * rhs.0)
    }
}

/// A layer `depth` thick spread over one square metre holds `depth` litres.
impl Mul<Millimetres> for SquareMetres {
    type Output = Litres;

    fn mul(self, depth: Millimetres) -> Litres {
        Litres(self.0 * depth.0)
    }
}

// ============================================================================
// Volume and Mass
// ============================================================================

/// Volume in litres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Litres(pub f64);

/// Mass in kilograms
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(pub f64);

impl Litres {
    /// Mass of this volume at the given density (kg/L)
    pub fn at_density(self, kg_per_litre: f64) -> Kilograms {
        Kilograms(self.0 * kg_per_litre)
    }
}

impl Add for Litres {
    type Output = Litres;

    fn add(self, rhs: Litres) -> Litres {
        Litres(self.0 + rhs.0)
    }
}

impl Add for Kilograms {
    type Output = Kilograms;

    fn add(self, rhs: Kilograms) -> Kilograms {
        Kilograms(self.0 + rhs.0)
    }
}

impl std::fmt::Display for SquareMetres {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} m²", self.0)
    }
}

impl std::fmt::Display for Litres {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} L", self.0)
    }
}

impl std::fmt::Display for Kilograms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} kg", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversions() {
        let m: Metres = Millimetres(1200.0).into();
        assert!((m.0 - 1.2).abs() < 1e-12);
        let mm: Millimetres = Metres(0.3).into();
        assert!((mm.0 - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_layer_volume() {
        // 3 mm over 10 m² is 30 litres
        let volume = SquareMetres(10.0) * Millimetres(3.0);
        assert!((volume.0 - 30.0).abs() < 1e-12);
        assert!((volume.at_density(1.6).0 - 48.0).abs() < 1e-9);
    }

    #[test]
    fn test_serialization_is_transparent() {
        let json = serde_json::to_string(&Kilograms(12.5)).unwrap();
        assert_eq!(json, "12.5");
    }
}
