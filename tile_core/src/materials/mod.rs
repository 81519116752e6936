//! # Materials and Job Options
//!
//! Enumerated choices a tiling job is described by: tile size, substrate,
//! adhesive class and grout class. Each enum offers:
//!
//! - `ALL` (or `STANDARD`) for selection lists
//! - `code()` for job files and command-line flags
//! - `from_str_flexible()` accepting common spellings and brand aliases
//! - `display_name()` for reports
//!
//! ## Example
//!
//! ```rust
//! use tile_core::materials::{AdhesiveType, Substrate, TileBracket, TileSize};
//!
//! let tile = TileSize::from_str_flexible("600x1200").unwrap();
//! assert_eq!(tile.bracket(), TileBracket::LargeFormat);
//!
//! let substrate = Substrate::from_str_flexible("Anhydrite screed").unwrap();
//! assert_eq!(substrate, Substrate::AnhydriteScreed);
//!
//! assert_eq!(AdhesiveType::default().code(), "C2TE-S1");
//! ```

pub mod products;
pub mod substrate;
pub mod tile_sizes;

pub use products::{AdhesiveType, GroutType};
pub use substrate::Substrate;
pub use tile_sizes::{TileBracket, TileSize};
