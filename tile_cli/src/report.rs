//! Plain-text output for the terminal.

use std::fmt::Write;

use tile_core::calculations::{MaterialsBill, PurchasePlan};
use tile_core::job::JobSpec;
use tile_core::materials::{AdhesiveType, GroutType, Substrate, TileBracket, TileSize};

const RULE: &str = "═══════════════════════════════════════════════════════";

/// Bill, purchase plan and assumptions as a table.
pub fn format_bill(spec: &JobSpec, bill: &MaterialsBill, plan: &PurchasePlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "  MATERIALS ESTIMATE");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out);
    let _ = writeln!(out, "Job:");
    let _ = writeln!(out, "  Area:       {:.2} m²", spec.area_m2());
    let _ = writeln!(
        out,
        "  Tile:       {}, {} mm thick ({})",
        spec.tile().display_name(),
        spec.tile_thickness_mm(),
        bill.tile_bracket.display_name().to_lowercase()
    );
    let _ = writeln!(out, "  Substrate:  {}", spec.substrate().display_name());
    let _ = writeln!(out, "  UFH:        {}", if spec.underfloor_heating() { "Yes" } else { "No" });
    let _ = writeln!(out, "  Adhesive:   {}", spec.adhesive().display_name());
    let _ = writeln!(out, "  Grout:      {}", spec.grout().display_name());
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<20} {:>12}   {}", "Material", "Quantity", "Order");
    let _ = writeln!(out, "{:-<20} {:->12}   {:-<20}", "", "", "");
    for line in &plan.lines {
        let _ = writeln!(
            out,
            "{:<20} {:>9.2} {:<2}   {}",
            line.material.display_name(),
            line.quantity,
            line.material.unit(),
            line.pack_description()
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Primer coats:      {}", bill.primer_coats);
    let _ = writeln!(out, "Trowel notch:      {} mm", bill.trowel_notch_mm);
    let _ = writeln!(out, "Joint width:       {} mm", bill.joint_width_mm);
    if bill.needs_levelling() {
        let _ = writeln!(out, "Levelling depth:   {} mm", bill.levelling_depth_mm);
    }
    if !bill.assumptions.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Assumptions:");
        for assumption in &bill.assumptions {
            let _ = writeln!(out, "  - {}", assumption);
        }
    }
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "  Verify with manufacturer datasheets and BS 5385.");
    let _ = writeln!(out, "{}", RULE);
    out
}

/// Accepted values for every enumerated job field.
pub fn format_options() -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Tile sizes (or any WxH in mm):");
    for tile in TileSize::STANDARD {
        let _ = writeln!(out, "  {:<12} {}", tile.code(), tile.bracket().display_name());
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Size brackets:");
    for bracket in TileBracket::ALL {
        let _ = writeln!(out, "  {:<18} {} mm notch", bracket.display_name(), bracket.trowel_notch_mm());
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Substrates:");
    for substrate in Substrate::ALL {
        let _ = writeln!(out, "  {:<18} {}", substrate.code(), substrate.display_name());
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Adhesives:");
    for adhesive in AdhesiveType::ALL {
        let _ = writeln!(out, "  {:<12} {}", adhesive.code(), adhesive.display_name());
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Grouts:");
    for grout in GroutType::ALL {
        let _ = writeln!(out, "  {:<12} {}", grout.code(), grout.display_name());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_core::calculations::estimate;
    use tile_core::coverage::PackSizes;

    #[test]
    fn test_bill_table() {
        let spec = JobSpec::new(
            20.0,
            TileSize::T300x300,
            Substrate::Concrete,
            true,
            AdhesiveType::C2TeS1,
            GroutType::Cg2Wa,
        )
        .unwrap();
        let bill = estimate(&spec);
        let text = format_bill(&spec, &bill, &bill.purchase_plan(&PackSizes::default()));

        assert!(text.contains("106.00 kg"));
        assert!(text.contains("6 x 20 kg bag"));
        assert!(text.contains("Levelling depth:   3 mm"));
        assert!(!text.contains("Assumptions:"));
    }

    #[test]
    fn test_options_list_every_code() {
        let text = format_options();
        for code in ["600x600", "anhydrite-screed", "C2TE-S1", "GEL", "RG"] {
            assert!(text.contains(code), "missing {}", code);
        }
        assert!(text.contains("Large format       10 mm notch"));
    }
}
