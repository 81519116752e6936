//! Purchase Plan
//!
//! Rounds the raw quantities of a [`MaterialsBill`] up to whole bags and
//! tubs. Kept apart from estimation so the bill itself stays exact.

use serde::{Deserialize, Serialize};

use crate::coverage::PackSizes;
use crate::formulas::quantities::pack_count;
use crate::formulas::registry::{Formula, FormulaTracker};

use super::estimate::MaterialsBill;

/// A line on the materials bill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Primer,
    LevellingCompound,
    Adhesive,
    Grout,
}

impl Material {
    /// All materials in work order
    pub const ALL: [Material; 4] = [
        Material::Primer,
        Material::LevellingCompound,
        Material::Adhesive,
        Material::Grout,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Material::Primer => "Primer",
            Material::LevellingCompound => "Levelling compound",
            Material::Adhesive => "Adhesive",
            Material::Grout => "Grout",
        }
    }

    /// Unit the quantity is measured in
    pub fn unit(&self) -> &'static str {
        match self {
            Material::Primer => "L",
            _ => "kg",
        }
    }

    /// What the material is sold in
    pub fn pack_noun(&self) -> &'static str {
        match self {
            Material::Primer => "tub",
            _ => "bag",
        }
    }

    fn quantity(&self, bill: &MaterialsBill) -> f64 {
        match self {
            Material::Primer => bill.primer_litres,
            Material::LevellingCompound => bill.levelling_compound_kg,
            Material::Adhesive => bill.adhesive_kg,
            Material::Grout => bill.grout_kg,
        }
    }

    fn pack_size(&self, packs: &PackSizes) -> f64 {
        match self {
            Material::Primer => packs.primer_tub_litres,
            Material::LevellingCompound => packs.levelling_bag_kg,
            Material::Adhesive => packs.adhesive_bag_kg,
            Material::Grout => packs.grout_bag_kg,
        }
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Raw quantity and whole packs for one material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub material: Material,
    /// Raw quantity in [`Material::unit`]
    pub quantity: f64,
    /// Size of one pack in [`Material::unit`]
    pub pack_size: f64,
    /// Whole packs to order
    pub packs: u32,
}

impl PurchaseLine {
    /// e.g. "6 x 20 kg bag"
    pub fn pack_description(&self) -> String {
        if self.packs == 0 {
            return "Not required".to_string();
        }
        format!(
            "{} x {} {} {}",
            self.packs,
            self.pack_size,
            self.material.unit(),
            self.material.pack_noun()
        )
    }
}

/// Whole-pack order for a materials bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasePlan {
    pub lines: Vec<PurchaseLine>,
}

impl PurchasePlan {
    /// Packs to order for one material
    pub fn packs_of(&self, material: Material) -> u32 {
        self.lines
            .iter()
            .find(|l| l.material == material)
            .map(|l| l.packs)
            .unwrap_or(0)
    }

    /// Total packs across all materials
    pub fn total_packs(&self) -> u32 {
        self.lines.iter().map(|l| l.packs).sum()
    }
}

impl MaterialsBill {
    /// Round each quantity up to whole packs.
    ///
    /// `packs` should already have passed [`PackSizes::validate`].
    ///
    /// ```rust
    /// use tile_core::calculations::{estimate, Material};
    /// use tile_core::coverage::PackSizes;
    /// use tile_core::job::JobSpecInput;
    ///
    /// let spec = JobSpecInput::default().validate().unwrap();
    /// let plan = estimate(&spec).purchase_plan(&PackSizes::default());
    /// assert_eq!(plan.packs_of(Material::LevellingCompound), 0);
    /// ```
    pub fn purchase_plan(&self, packs: &PackSizes) -> PurchasePlan {
        let mut tracker = FormulaTracker::new();
        self.purchase_plan_traced(packs, &mut tracker)
    }

    /// Round into packs and record the rounding for each material.
    pub fn purchase_plan_traced(&self, packs: &PackSizes, tracker: &mut FormulaTracker) -> PurchasePlan {
        let lines = Material::ALL
            .iter()
            .map(|material| {
                let quantity = material.quantity(self);
                let pack_size = material.pack_size(packs);
                tracker.record_for_material(
                    Formula::PackCount,
                    format!("{} {} {}", pack_size, material.unit(), material.pack_noun()),
                    material.display_name(),
                );
                PurchaseLine {
                    material: *material,
                    quantity,
                    pack_size,
                    packs: pack_count(quantity, pack_size),
                }
            })
            .collect();
        PurchasePlan { lines }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::estimate::estimate;
    use crate::job::JobSpec;
    use crate::materials::{AdhesiveType, GroutType, Substrate, TileSize};

    fn bill(ufh: bool) -> MaterialsBill {
        let spec = JobSpec::new(
            20.0,
            TileSize::T300x300,
            Substrate::Concrete,
            ufh,
            AdhesiveType::C2TeS1,
            GroutType::Cg2Wa,
        )
        .unwrap();
        estimate(&spec)
    }

    #[test]
    fn test_default_packs() {
        let plan = bill(true).purchase_plan(&PackSizes::default());
        // 106 kg / 20 kg bags
        assert_eq!(plan.packs_of(Material::Adhesive), 6);
        // 5.76 kg / 5 kg bags
        assert_eq!(plan.packs_of(Material::Grout), 2);
        // 96 kg / 25 kg bags
        assert_eq!(plan.packs_of(Material::LevellingCompound), 4);
        // 2 L / 5 L tubs
        assert_eq!(plan.packs_of(Material::Primer), 1);
        assert_eq!(plan.total_packs(), 13);
    }

    #[test]
    fn test_no_levelling_no_bags() {
        let plan = bill(false).purchase_plan(&PackSizes::default());
        assert_eq!(plan.packs_of(Material::LevellingCompound), 0);
        let line = plan
            .lines
            .iter()
            .find(|l| l.material == Material::LevellingCompound)
            .unwrap();
        assert_eq!(line.pack_description(), "Not required");
    }

    #[test]
    fn test_pack_description() {
        let plan = bill(false).purchase_plan(&PackSizes::default());
        assert_eq!(plan.lines[2].pack_description(), "6 x 20 kg bag");
        assert_eq!(plan.lines[0].pack_description(), "1 x 5 L tub");
    }

    #[test]
    fn test_larger_bags_fewer_packs() {
        let packs = PackSizes { adhesive_bag_kg: 25.0, ..PackSizes::default() };
        let plan = bill(false).purchase_plan(&packs);
        assert_eq!(plan.packs_of(Material::Adhesive), 5);
    }

    #[test]
    fn test_traced_rounding() {
        let mut tracker = FormulaTracker::new();
        bill(false).purchase_plan_traced(&PackSizes::default(), &mut tracker);
        assert_eq!(tracker.usages().len(), 4);
        assert_eq!(tracker.unique_formulas(), vec![Formula::PackCount]);
    }
}
