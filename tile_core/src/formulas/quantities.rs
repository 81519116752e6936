//! # Material Quantity Formulas
//!
//! Every quantity is an area multiplied by a coverage rate. The rates come
//! from [`crate::coverage`]; these functions only do the arithmetic.
//!
//! ## Notation
//!
//! - `A` = Area to be tiled (m²)
//! - `W`, `H` = Tile face width and height (mm)
//! - `J` = Joint width (mm)
//! - `D` = Joint depth, taken as the tile thickness (mm)
//! - `ρ` = Placed grout density (kg/L)
//!
//! ## References
//!
//! - BS 5385-3:2014 Code of practice for the design and installation of
//!   internal and external ceramic and mosaic floor tiling
//! - Manufacturer datasheet yields for adhesive, primer and levelling compound

use crate::units::{Kilograms, Litres, Millimetres, SquareMetres};

// =============================================================================
// PREPARATION
// =============================================================================

/// Primer volume for the whole area
///
/// # Formula
/// V = A × r × n
///
/// # Arguments
/// * `area` - Area to be primed
/// * `litres_per_m2_per_coat` - Primer rate for one coat
/// * `coats` - Number of coats
///
/// # Example
/// ```rust
/// use tile_core::formulas::quantities::primer_volume;
/// use tile_core::units::SquareMetres;
///
/// // Anhydrite screed: two coats at 0.10 L/m²
/// let v = primer_volume(SquareMetres(20.0), 0.10, 2);
/// assert!((v.0 - 4.0).abs() < 1e-9);
/// ```
#[inline]
pub fn primer_volume(area: SquareMetres, litres_per_m2_per_coat: f64, coats: u32) -> Litres {
    Litres(area.0 * litres_per_m2_per_coat * f64::from(coats))
}

/// Levelling compound mass for an average depth
///
/// # Formula
/// m = A × y × d
///
/// A zero depth gives zero compound.
#[inline]
pub fn levelling_mass(area: SquareMetres, depth: Millimetres, kg_per_m2_per_mm: f64) -> Kilograms {
    Kilograms(area.0 * kg_per_m2_per_mm * depth.0)
}

// =============================================================================
// FIXING
// =============================================================================

/// Adhesive mass for a solid bed
///
/// # Formula
/// m = A × r_adh × f_sub
///
/// # Arguments
/// * `area` - Area to be tiled
/// * `kg_per_m2` - Bed yield for the adhesive class and trowel notch
/// * `substrate_factor` - Multiplier for non-absorbent substrates (1.0 otherwise)
///
/// # Example
/// ```rust
/// use tile_core::formulas::quantities::adhesive_mass;
/// use tile_core::units::SquareMetres;
///
/// let m = adhesive_mass(SquareMetres(20.0), 5.3, 1.0);
/// assert!((m.0 - 106.0).abs() < 1e-9);
/// ```
#[inline]
pub fn adhesive_mass(area: SquareMetres, kg_per_m2: f64, substrate_factor: f64) -> Kilograms {
    Kilograms(area.0 * kg_per_m2 * substrate_factor)
}

// =============================================================================
// GROUTING
// =============================================================================

/// Equivalent grout depth over one square metre of tiling
///
/// The joint length per square metre of a W×H grid is (W+H)/(W×H) per mm;
/// multiplying by the joint cross-section J×D gives a volume per unit area,
/// which in mm is the same number as litres per m².
///
/// ```text
///   ┌──────┬──────┐
///   │      │      │  H
///   ├──────┼──────┤  ← joint J wide, D deep
///   │      │      │
///   └──────┴──────┘
///       W
/// ```
///
/// # Formula
/// d_g = (W + H) / (W × H) × J × D
///
/// # Example
/// ```rust
/// use tile_core::formulas::quantities::grout_fill_depth;
///
/// // 300×300 tile, 3 mm joint, 9 mm deep: 0.18 L/m²
/// let d = grout_fill_depth(300.0, 300.0, 3.0, 9.0);
/// assert!((d.0 - 0.18).abs() < 1e-9);
/// ```
#[inline]
pub fn grout_fill_depth(width_mm: f64, height_mm: f64, joint_mm: f64, depth_mm: f64) -> Millimetres {
    Millimetres((width_mm + height_mm) / (width_mm * height_mm) * joint_mm * depth_mm)
}

/// Grout mass for the whole area
///
/// # Formula
/// m = A × d_g × ρ
#[inline]
pub fn grout_mass(area: SquareMetres, fill_depth: Millimetres, kg_per_litre: f64) -> Kilograms {
    (area * fill_depth).at_density(kg_per_litre)
}

// =============================================================================
// PURCHASING
// =============================================================================

/// Whole packs needed to cover a quantity
///
/// # Formula
/// n = ⌈q / p⌉
///
/// Zero or negative quantities need no packs; any positive quantity needs at
/// least one. `pack_size` must be positive;
/// [`PackSizes::validate`](crate::coverage::PackSizes::validate) enforces it.
///
/// # Example
/// ```rust
/// use tile_core::formulas::quantities::pack_count;
///
/// assert_eq!(pack_count(106.0, 20.0), 6);
/// assert_eq!(pack_count(100.0, 20.0), 5);
/// assert_eq!(pack_count(0.0, 20.0), 0);
/// ```
#[inline]
pub fn pack_count(quantity: f64, pack_size: f64) -> u32 {
    if quantity <= 0.0 || pack_size <= 0.0 {
        return 0;
    }
    // Absorb float noise so 100.0000000001 / 20 stays 5 packs
    let packs = (quantity / pack_size - 1e-9).ceil();
    packs.max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primer_volume() {
        assert!((primer_volume(SquareMetres(20.0), 0.10, 1).0 - 2.0).abs() < 1e-9);
        assert_eq!(primer_volume(SquareMetres(20.0), 0.10, 0).0, 0.0);
    }

    #[test]
    fn test_grout_depth_scales_with_joint_and_tile() {
        let narrow = grout_fill_depth(600.0, 600.0, 3.0, 9.0);
        let wide = grout_fill_depth(600.0, 600.0, 5.0, 9.0);
        assert!(wide.0 > narrow.0);

        // Smaller tiles mean more joint per square metre
        let small = grout_fill_depth(100.0, 100.0, 3.0, 9.0);
        assert!(small.0 > narrow.0);

        // Rectangular tile: (300 + 600) / (300 × 600) × 3 × 9 = 0.135
        let rect = grout_fill_depth(300.0, 600.0, 3.0, 9.0);
        assert!((rect.0 - 0.135).abs() < 1e-9);
    }

    #[test]
    fn test_grout_mass() {
        let depth = grout_fill_depth(300.0, 300.0, 3.0, 9.0);
        let m = grout_mass(SquareMetres(20.0), depth, 1.6);
        assert!((m.0 - 5.76).abs() < 1e-9);
    }

    #[test]
    fn test_levelling_mass() {
        let m = levelling_mass(SquareMetres(20.0), Millimetres(3.0), 1.6);
        assert!((m.0 - 96.0).abs() < 1e-9);
        assert_eq!(levelling_mass(SquareMetres(20.0), Millimetres(0.0), 1.6).0, 0.0);
    }

    #[test]
    fn test_pack_count() {
        assert_eq!(pack_count(0.1, 5.0), 1);
        assert_eq!(pack_count(5.0, 5.0), 1);
        assert_eq!(pack_count(5.01, 5.0), 2);
        assert_eq!(pack_count(-1.0, 5.0), 0);
        assert_eq!(pack_count(10.0, 0.0), 0);
    }
}
