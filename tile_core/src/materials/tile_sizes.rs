//! Standard Tile Sizes
//!
//! Nominal tile face dimensions in millimetres, plus a custom width×height
//! pair for anything off the list.
//!
//! ## Size Brackets
//!
//! The longest edge decides the [`TileBracket`], which in turn selects the
//! trowel notch (and so the adhesive bed) and the nominal joint width:
//!
//! | Bracket | Longest edge | Notch |
//! |---------|--------------|-------|
//! | Small | ≤ 200 mm | 6 mm |
//! | Standard | ≤ 899 mm | 8 mm |
//! | LargeFormat | ≥ 900 mm | 10 mm |

use serde::{Deserialize, Serialize};

use crate::errors::{TileError, TileResult};
use crate::units::{Metres, Millimetres, SquareMetres};

/// Longest edge at or below which a tile counts as small format (mm)
pub const SMALL_FORMAT_MAX_EDGE_MM: f64 = 200.0;

/// Longest edge from which a tile counts as large format (mm)
pub const LARGE_FORMAT_MIN_EDGE_MM: f64 = 900.0;

/// Longest edge at or below which a 3 mm joint is assumed (mm)
pub const NARROW_JOINT_MAX_EDGE_MM: f64 = 600.0;

/// Largest tile edge accepted (mm)
pub const MAX_TILE_EDGE_MM: f64 = 3600.0;

/// Tile face size
///
/// Serialized as its size code ("600x600", or "250x400" for a custom size)
/// and parsed back through [`TileSize::from_str_flexible`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum TileSize {
    T100x100,
    T150x150,
    T200x200,
    T300x300,
    T300x600,
    T450x450,
    #[default]
    T600x600,
    T600x1200,
    T900x900,
    T1200x1200,
    /// Custom size - user supplies the face dimensions
    Custom { width_mm: f64, height_mm: f64 },
}

impl TileSize {
    /// All standard sizes for selection lists (most common first)
    pub const STANDARD: [TileSize; 10] = [
        TileSize::T600x600,
        TileSize::T300x600,
        TileSize::T300x300,
        TileSize::T600x1200,
        TileSize::T450x450,
        TileSize::T200x200,
        TileSize::T150x150,
        TileSize::T100x100,
        TileSize::T900x900,
        TileSize::T1200x1200,
    ];

    /// Face dimensions (width, height) in millimetres
    pub fn dimensions_mm(&self) -> (f64, f64) {
        match self {
            TileSize::T100x100 => (100.0, 100.0),
            TileSize::T150x150 => (150.0, 150.0),
            TileSize::T200x200 => (200.0, 200.0),
            TileSize::T300x300 => (300.0, 300.0),
            TileSize::T300x600 => (300.0, 600.0),
            TileSize::T450x450 => (450.0, 450.0),
            TileSize::T600x600 => (600.0, 600.0),
            TileSize::T600x1200 => (600.0, 1200.0),
            TileSize::T900x900 => (900.0, 900.0),
            TileSize::T1200x1200 => (1200.0, 1200.0),
            TileSize::Custom { width_mm, height_mm } => (*width_mm, *height_mm),
        }
    }

    /// Build a custom size, rejecting non-positive or absurd dimensions
    pub fn custom(width_mm: f64, height_mm: f64) -> TileResult<Self> {
        let size = TileSize::Custom { width_mm, height_mm };
        size.validate()?;
        Ok(size)
    }

    /// Validate the face dimensions.
    ///
    /// Standard sizes always pass; custom sizes must be finite and within
    /// `(0, MAX_TILE_EDGE_MM]`.
    pub fn validate(&self) -> TileResult<()> {
        let (w, h) = self.dimensions_mm();
        for (field, value) in [("tile.width_mm", w), ("tile.height_mm", h)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TileError::invalid_input(
                    field,
                    value.to_string(),
                    "Tile dimensions must be positive",
                ));
            }
            if value > MAX_TILE_EDGE_MM {
                return Err(TileError::invalid_input(
                    field,
                    value.to_string(),
                    format!("Tile edge exceeds {} mm", MAX_TILE_EDGE_MM),
                ));
            }
        }
        Ok(())
    }

    /// Longest face edge in millimetres
    pub fn longest_edge_mm(&self) -> f64 {
        let (w, h) = self.dimensions_mm();
        w.max(h)
    }

    /// Face area of a single tile
    pub fn face_area(&self) -> SquareMetres {
        let (w, h) = self.dimensions_mm();
        Metres::from(Millimetres(w)) * Metres::from(Millimetres(h))
    }

    /// Size bracket used for notch and adhesive selection
    pub fn bracket(&self) -> TileBracket {
        TileBracket::for_longest_edge(self.longest_edge_mm())
    }

    /// Nominal grout joint width in millimetres
    pub fn joint_width_mm(&self) -> f64 {
        if self.longest_edge_mm() <= NARROW_JOINT_MAX_EDGE_MM {
            3.0
        } else {
            5.0
        }
    }

    /// Parse "600x600", "600 x 600", "600×600" or a bare custom "WxH"
    pub fn from_str_flexible(s: &str) -> TileResult<Self> {
        let normalized = s.trim().to_lowercase().replace(['×', '*'], "x").replace(' ', "");
        let normalized = normalized.trim_end_matches("mm");

        if let Some(size) = TileSize::STANDARD
            .iter()
            .find(|size| size.code() == normalized)
        {
            return Ok(*size);
        }

        let (w, h) = normalized.split_once('x').ok_or_else(|| {
            TileError::unknown_option("tile", s, &TileSize::STANDARD.map(|t| t.code()))
        })?;
        let parse = |part: &str, field: &str| {
            part.parse::<f64>()
                .map_err(|_| TileError::invalid_input(field, part, "Not a number"))
        };
        let width_mm = parse(w, "tile.width_mm")?;
        let height_mm = parse(h, "tile.height_mm")?;

        // A custom pair that happens to match a standard size is the standard size
        if let Some(size) = TileSize::STANDARD
            .iter()
            .find(|size| size.dimensions_mm() == (width_mm, height_mm))
        {
            return Ok(*size);
        }
        TileSize::custom(width_mm, height_mm)
    }

    /// Short code (e.g. "600x600"); "custom" for custom sizes
    pub fn code(&self) -> &'static str {
        match self {
            TileSize::T100x100 => "100x100",
            TileSize::T150x150 => "150x150",
            TileSize::T200x200 => "200x200",
            TileSize::T300x300 => "300x300",
            TileSize::T300x600 => "300x600",
            TileSize::T450x450 => "450x450",
            TileSize::T600x600 => "600x600",
            TileSize::T600x1200 => "600x1200",
            TileSize::T900x900 => "900x900",
            TileSize::T1200x1200 => "1200x1200",
            TileSize::Custom { .. } => "custom",
        }
    }

    /// Size as written in job files: the standard code, or "WxH" for custom sizes
    pub fn size_code(&self) -> String {
        match self {
            TileSize::Custom { width_mm, height_mm } => format!("{}x{}", width_mm, height_mm),
            standard => standard.code().to_string(),
        }
    }

    /// Get display name (e.g. "600 x 600 mm")
    pub fn display_name(&self) -> String {
        let (w, h) = self.dimensions_mm();
        match self {
            TileSize::Custom { .. } => format!("{} x {} mm (custom)", w, h),
            _ => format!("{} x {} mm", w, h),
        }
    }
}

impl TryFrom<String> for TileSize {
    type Error = TileError;

    fn try_from(s: String) -> TileResult<Self> {
        TileSize::from_str_flexible(&s)
    }
}

impl From<TileSize> for String {
    fn from(tile: TileSize) -> Self {
        tile.size_code()
    }
}

impl std::fmt::Display for TileSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Tile size class by longest edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileBracket {
    /// Mosaics and small wall tiles (≤ 200 mm)
    Small,
    /// Everyday floor and wall tiles (201-899 mm)
    Standard,
    /// Large format (≥ 900 mm)
    LargeFormat,
}

impl TileBracket {
    pub const ALL: [TileBracket; 3] = [TileBracket::Small, TileBracket::Standard, TileBracket::LargeFormat];

    /// Classify a tile by its longest edge in millimetres
    pub fn for_longest_edge(edge_mm: f64) -> Self {
        if edge_mm <= SMALL_FORMAT_MAX_EDGE_MM {
            TileBracket::Small
        } else if edge_mm < LARGE_FORMAT_MIN_EDGE_MM {
            TileBracket::Standard
        } else {
            TileBracket::LargeFormat
        }
    }

    /// Square-notch trowel size in millimetres
    pub fn trowel_notch_mm(&self) -> f64 {
        match self {
            TileBracket::Small => 6.0,
            TileBracket::Standard => 8.0,
            TileBracket::LargeFormat => 10.0,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            TileBracket::Small => "Small format",
            TileBracket::Standard => "Standard format",
            TileBracket::LargeFormat => "Large format",
        }
    }
}

impl std::fmt::Display for TileBracket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
