//! # Formula Registry
//!
//! Central registry of the estimating formulas behind a materials bill.
//! Each formula has metadata including its source, notation and variables.
//!
//! ## Architecture
//!
//! The registry provides:
//! - Type-safe formula identification via the `Formula` enum
//! - Full metadata for the method statement appendix and `FORMULAS.md`
//! - Usage tracking through [`FormulaTracker`]
//!
//! ## Usage
//!
//! ```rust
//! use tile_core::formulas::registry::{Formula, FormulaTracker};
//!
//! let mut tracker = FormulaTracker::new();
//! tracker.record_for_material(Formula::AdhesiveMass, "8 mm notch bed", "Adhesive");
//!
//! let meta = Formula::AdhesiveMass.metadata();
//! println!("Formula: {}", meta.formula_typst);
//! assert_eq!(tracker.unique_formulas(), vec![Formula::AdhesiveMass]);
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

// ============================================================================
// Source References
// ============================================================================

/// Where a formula or its rates come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceReference {
    /// BS 5385 code of practice for wall and floor tiling
    Bs5385 {
        part: u8,
        year: u16,
        clause: &'static str,
    },
    /// BS EN product standard (adhesive or grout classification)
    BsEn {
        number: &'static str,
        title: &'static str,
    },
    /// Manufacturer technical datasheet yields
    Datasheet { product: &'static str },
    /// Common estimating practice (no standard applies)
    EstimatingPractice,
}

impl SourceReference {
    /// Format the reference for display in reports
    pub fn citation(&self) -> String {
        match self {
            SourceReference::Bs5385 { part, year, clause } => {
                format!("BS 5385-{}:{} Clause {}", part, year, clause)
            }
            SourceReference::BsEn { number, title } => format!("BS EN {} ({})", number, title),
            SourceReference::Datasheet { product } => format!("Manufacturer datasheet: {}", product),
            SourceReference::EstimatingPractice => "Estimating practice".to_string(),
        }
    }

    /// Short form for inline references
    pub fn short_form(&self) -> &'static str {
        match self {
            SourceReference::Bs5385 { .. } => "BS 5385",
            SourceReference::BsEn { .. } => "BS EN",
            SourceReference::Datasheet { .. } => "Datasheet",
            SourceReference::EstimatingPractice => "Practice",
        }
    }
}

// ============================================================================
// Formula Categories
// ============================================================================

/// Categories for organizing formulas, in the order the work is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormulaCategory {
    /// Priming and levelling
    Preparation,
    /// Adhesive bed
    Fixing,
    /// Joint filling
    Grouting,
    /// Rounding into purchasable packs
    Purchasing,
}

impl FormulaCategory {
    pub const ALL: [FormulaCategory; 4] = [
        FormulaCategory::Preparation,
        FormulaCategory::Fixing,
        FormulaCategory::Grouting,
        FormulaCategory::Purchasing,
    ];

    /// Display name for the category
    pub fn display_name(&self) -> &'static str {
        match self {
            FormulaCategory::Preparation => "Preparation",
            FormulaCategory::Fixing => "Fixing",
            FormulaCategory::Grouting => "Grouting",
            FormulaCategory::Purchasing => "Purchasing",
        }
    }

    /// Sort order for the appendix (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            FormulaCategory::Preparation => 1,
            FormulaCategory::Fixing => 2,
            FormulaCategory::Grouting => 3,
            FormulaCategory::Purchasing => 4,
        }
    }
}

// ============================================================================
// Variable Definition
// ============================================================================

/// Definition of a variable used in a formula.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Symbol in Typst math notation (e.g., `r_"adh"`)
    pub symbol: &'static str,
    /// Symbol in plain text (e.g., "r_adh")
    pub plain: &'static str,
    /// Description
    pub description: &'static str,
    /// Units (e.g., "kg/m²")
    pub units: &'static str,
}

impl Variable {
    pub const fn new(
        symbol: &'static str,
        plain: &'static str,
        description: &'static str,
        units: &'static str,
    ) -> Self {
        Self { symbol, plain, description, units }
    }
}

// ============================================================================
// Formula Metadata
// ============================================================================

/// Complete metadata for an estimating formula.
#[derive(Debug, Clone)]
pub struct FormulaMetadata {
    /// Human-readable name (e.g., "Adhesive Mass")
    pub name: &'static str,
    /// Brief description of what this formula calculates
    pub description: &'static str,
    /// The formula in Typst math notation
    pub formula_typst: &'static str,
    /// The formula in plain text for markdown
    pub formula_plain: &'static str,
    /// Source reference
    pub reference: SourceReference,
    /// Variable definitions
    pub variables: Vec<Variable>,
    /// Assumptions or limitations
    pub assumptions: Vec<&'static str>,
    /// Category for grouping
    pub category: FormulaCategory,
    /// Source module where the formula implementation lives
    pub source_module: &'static str,
    /// Function name implementing the formula
    pub source_function: &'static str,
}

// ============================================================================
// Formula Enum
// ============================================================================

/// All estimating formulas used in TileIntel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Formula {
    /// V = A × r × n
    PrimerVolume,
    /// d = d_sub + d_ufh
    LevellingDepth,
    /// m = A × y × d
    LevellingMass,
    /// Bracket and trowel notch from the longest tile edge
    TrowelNotch,
    /// m = A × r_adh × f_sub
    AdhesiveMass,
    /// J = 3 mm up to 600 mm edges, else 5 mm
    JointWidth,
    /// d_g = (W+H)/(W×H) × J × D
    GroutFillDepth,
    /// m = A × d_g × ρ
    GroutMass,
    /// n = ⌈q/p⌉
    PackCount,
}

impl Formula {
    /// Get the full metadata for this formula
    pub fn metadata(&self) -> FormulaMetadata {
        match self {
            Formula::PrimerVolume => FormulaMetadata {
                name: "Primer Volume",
                description: "Primer needed to seal the substrate before levelling or fixing",
                formula_typst: r#"$V_"p" = A dot r_"p" dot n$"#,
                formula_plain: "V_p = A * r_p * n",
                reference: SourceReference::Bs5385 { part: 3, year: 2014, clause: "6" },
                variables: vec![
                    Variable::new("V_\"p\"", "V_p", "Primer volume", "L"),
                    Variable::new("A", "A", "Area to be tiled", "m²"),
                    Variable::new("r_\"p\"", "r_p", "Primer rate per coat", "L/m²"),
                    Variable::new("n", "n", "Number of coats (2 on anhydrite screed)", "count"),
                ],
                assumptions: vec![
                    "Substrate is clean, dry and sound",
                    "Primer diluted as the datasheet directs",
                ],
                category: FormulaCategory::Preparation,
                source_module: "formulas/quantities.rs",
                source_function: "primer_volume",
            },

            Formula::LevellingDepth => FormulaMetadata {
                name: "Levelling Depth",
                description: "Average depth of levelling compound laid before tiling",
                formula_typst: r#"$d = d_"sub" + d_"ufh"$"#,
                formula_plain: "d = d_sub + d_ufh",
                reference: SourceReference::Bs5385 { part: 3, year: 2014, clause: "6.8" },
                variables: vec![
                    Variable::new("d", "d", "Average levelling depth", "mm"),
                    Variable::new("d_\"sub\"", "d_sub", "Substrate allowance (3 mm on anhydrite screed)", "mm"),
                    Variable::new("d_\"ufh\"", "d_ufh", "Encapsulation allowance when underfloor heating is fitted", "mm"),
                ],
                assumptions: vec!["Substrate is within normal flatness tolerance"],
                category: FormulaCategory::Preparation,
                source_module: "coverage.rs",
                source_function: "levelling_depth_mm",
            },

            Formula::LevellingMass => FormulaMetadata {
                name: "Levelling Compound Mass",
                description: "Self-levelling compound for the average depth over the whole area",
                formula_typst: r#"$m_"lev" = A dot y dot d$"#,
                formula_plain: "m_lev = A * y * d",
                reference: SourceReference::Datasheet { product: "Cementitious self-levelling compound" },
                variables: vec![
                    Variable::new("m_\"lev\"", "m_lev", "Levelling compound mass", "kg"),
                    Variable::new("A", "A", "Area to be tiled", "m²"),
                    Variable::new("y", "y", "Compound yield per mm of depth", "kg/m²/mm"),
                    Variable::new("d", "d", "Average levelling depth", "mm"),
                ],
                assumptions: vec!["Zero depth means no compound is needed"],
                category: FormulaCategory::Preparation,
                source_module: "formulas/quantities.rs",
                source_function: "levelling_mass",
            },

            Formula::TrowelNotch => FormulaMetadata {
                name: "Trowel Notch Selection",
                description: "Tile bracket and square-notch trowel size from the longest tile edge",
                formula_typst: r#"$"notch" = cases(6 "mm" & L <= 200, 8 "mm" & L < 900, 10 "mm" & L >= 900)$"#,
                formula_plain: "notch = 6 mm if L <= 200; 8 mm if L < 900; 10 mm otherwise",
                reference: SourceReference::Bs5385 { part: 3, year: 2014, clause: "7.3" },
                variables: vec![
                    Variable::new("L", "L", "Longest tile edge", "mm"),
                ],
                assumptions: vec![
                    "Solid bed coverage; back-buttering large format tiles is included in the 10 mm yield",
                ],
                category: FormulaCategory::Fixing,
                source_module: "materials/tile_sizes.rs",
                source_function: "TileBracket::for_longest_edge",
            },

            Formula::AdhesiveMass => FormulaMetadata {
                name: "Adhesive Mass",
                description: "Powder adhesive for a solid bed at the selected trowel notch",
                formula_typst: r#"$m_"adh" = A dot r_"adh" dot f_"sub"$"#,
                formula_plain: "m_adh = A * r_adh * f_sub",
                reference: SourceReference::BsEn { number: "12004", title: "Adhesives for ceramic tiles" },
                variables: vec![
                    Variable::new("m_\"adh\"", "m_adh", "Adhesive mass", "kg"),
                    Variable::new("A", "A", "Area to be tiled", "m²"),
                    Variable::new("r_\"adh\"", "r_adh", "Bed yield for adhesive class and tile bracket", "kg/m²"),
                    Variable::new("f_\"sub\"", "f_sub", "Substrate factor (1.10 over existing tile)", "ratio"),
                ],
                assumptions: vec![
                    "Unlisted adhesive and bracket pairs use the 10 mm notch yield",
                ],
                category: FormulaCategory::Fixing,
                source_module: "formulas/quantities.rs",
                source_function: "adhesive_mass",
            },

            Formula::JointWidth => FormulaMetadata {
                name: "Joint Width",
                description: "Nominal grout joint width for floor tiling",
                formula_typst: r#"$J = cases(3 "mm" & L <= 600, 5 "mm" & L > 600)$"#,
                formula_plain: "J = 3 mm if L <= 600; 5 mm otherwise",
                reference: SourceReference::Bs5385 { part: 3, year: 2014, clause: "6.9" },
                variables: vec![
                    Variable::new("J", "J", "Joint width", "mm"),
                    Variable::new("L", "L", "Longest tile edge", "mm"),
                ],
                assumptions: vec!["Rectified tiles laid to a regular grid"],
                category: FormulaCategory::Grouting,
                source_module: "materials/tile_sizes.rs",
                source_function: "TileSize::joint_width_mm",
            },

            Formula::GroutFillDepth => FormulaMetadata {
                name: "Grout Fill Depth",
                description: "Joint volume per square metre of tiling, expressed as an equivalent depth",
                formula_typst: r#"$d_"g" = (W + H) / (W dot H) dot J dot D$"#,
                formula_plain: "d_g = (W + H) / (W * H) * J * D",
                reference: SourceReference::EstimatingPractice,
                variables: vec![
                    Variable::new("d_\"g\"", "d_g", "Equivalent grout depth (1 mm over 1 m² is 1 L)", "L/m²"),
                    Variable::new("W", "W", "Tile width", "mm"),
                    Variable::new("H", "H", "Tile height", "mm"),
                    Variable::new("J", "J", "Joint width", "mm"),
                    Variable::new("D", "D", "Joint depth, taken as tile thickness", "mm"),
                ],
                assumptions: vec!["Joints filled to full tile depth"],
                category: FormulaCategory::Grouting,
                source_module: "formulas/quantities.rs",
                source_function: "grout_fill_depth",
            },

            Formula::GroutMass => FormulaMetadata {
                name: "Grout Mass",
                description: "Grout powder for all joints over the whole area",
                formula_typst: r#"$m_"g" = A dot d_"g" dot rho$"#,
                formula_plain: "m_g = A * d_g * rho",
                reference: SourceReference::BsEn { number: "13888", title: "Grout for tiles" },
                variables: vec![
                    Variable::new("m_\"g\"", "m_g", "Grout mass", "kg"),
                    Variable::new("A", "A", "Area to be tiled", "m²"),
                    Variable::new("d_\"g\"", "d_g", "Equivalent grout depth", "L/m²"),
                    Variable::new("rho", "rho", "Placed grout density", "kg/L"),
                ],
                assumptions: vec!["No allowance for wastage"],
                category: FormulaCategory::Grouting,
                source_module: "formulas/quantities.rs",
                source_function: "grout_mass",
            },

            Formula::PackCount => FormulaMetadata {
                name: "Pack Count",
                description: "Whole bags or tubs needed to cover a raw quantity",
                formula_typst: r#"$n = ceil(q / p)$"#,
                formula_plain: "n = ceil(q / p)",
                reference: SourceReference::EstimatingPractice,
                variables: vec![
                    Variable::new("n", "n", "Packs to order", "count"),
                    Variable::new("q", "q", "Raw quantity", "kg or L"),
                    Variable::new("p", "p", "Pack size", "kg or L"),
                ],
                assumptions: vec!["Zero quantities need no packs"],
                category: FormulaCategory::Purchasing,
                source_module: "formulas/quantities.rs",
                source_function: "pack_count",
            },
        }
    }

    /// Get all formulas in a given category
    pub fn in_category(category: FormulaCategory) -> Vec<Formula> {
        ALL_FORMULAS
            .iter()
            .filter(|f| f.metadata().category == category)
            .copied()
            .collect()
    }
}

/// All formulas in the registry (for iteration)
pub static ALL_FORMULAS: &[Formula] = &[
    Formula::PrimerVolume,
    Formula::LevellingDepth,
    Formula::LevellingMass,
    Formula::TrowelNotch,
    Formula::AdhesiveMass,
    Formula::JointWidth,
    Formula::GroutFillDepth,
    Formula::GroutMass,
    Formula::PackCount,
];

// ============================================================================
// Formula Usage Tracking
// ============================================================================

/// Record of a formula being applied during an estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaUsage {
    /// The formula that was used
    pub formula: Formula,
    /// Context describing where it was used (e.g., "8 mm notch bed")
    pub context: String,
    /// Optional: the material line this formula fed
    pub material: Option<String>,
}

impl FormulaUsage {
    pub fn new(formula: Formula, context: impl Into<String>) -> Self {
        Self {
            formula,
            context: context.into(),
            material: None,
        }
    }

    pub fn for_material(formula: Formula, context: impl Into<String>, material: impl Into<String>) -> Self {
        Self {
            formula,
            context: context.into(),
            material: Some(material.into()),
        }
    }
}

/// Collector for formula usage during an estimate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormulaTracker {
    usages: Vec<FormulaUsage>,
}

impl FormulaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a formula was used
    pub fn record(&mut self, formula: Formula, context: impl Into<String>) {
        self.usages.push(FormulaUsage::new(formula, context));
    }

    /// Record formula usage for a material line
    pub fn record_for_material(&mut self, formula: Formula, context: impl Into<String>, material: impl Into<String>) {
        self.usages.push(FormulaUsage::for_material(formula, context, material));
    }

    pub fn usages(&self) -> &[FormulaUsage] {
        &self.usages
    }

    pub fn is_empty(&self) -> bool {
        self.usages.is_empty()
    }

    /// Unique formulas used, in first-use order
    pub fn unique_formulas(&self) -> Vec<Formula> {
        let mut seen = HashSet::new();
        self.usages
            .iter()
            .filter(|u| seen.insert(u.formula))
            .map(|u| u.formula)
            .collect()
    }

    /// Group usages by formula
    pub fn by_formula(&self) -> HashMap<Formula, Vec<&FormulaUsage>> {
        let mut map: HashMap<Formula, Vec<&FormulaUsage>> = HashMap::new();
        for usage in &self.usages {
            map.entry(usage.formula).or_default().push(usage);
        }
        map
    }

    /// Group unique formulas by category, categories in work order
    pub fn by_category(&self) -> Vec<(FormulaCategory, Vec<Formula>)> {
        let mut by_cat: HashMap<FormulaCategory, Vec<Formula>> = HashMap::new();
        for formula in self.unique_formulas() {
            by_cat.entry(formula.metadata().category).or_default().push(formula);
        }

        let mut result: Vec<_> = by_cat.into_iter().collect();
        result.sort_by_key(|(cat, _)| cat.sort_order());
        result
    }

    /// Merge another tracker into this one
    pub fn merge(&mut self, other: FormulaTracker) {
        self.usages.extend(other.usages);
    }
}

// ============================================================================
// Typst Appendix Generation
// ============================================================================

impl FormulaTracker {
    /// Generate Typst markup for the "Estimating Formulas" appendix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tile_core::formulas::registry::{Formula, FormulaTracker};
    ///
    /// let mut tracker = FormulaTracker::new();
    /// tracker.record_for_material(Formula::GroutMass, "CG2 WA", "Grout");
    ///
    /// let typst = tracker.generate_appendix_typst();
    /// assert!(typst.contains("Grout Mass"));
    /// ```
    pub fn generate_appendix_typst(&self) -> String {
        let mut output = String::new();

        output.push_str(r##"
#pagebreak()

#block(width: 100%, fill: accent.lighten(85%), inset: 10pt, radius: 3pt)[
  #text(size: 14pt, weight: "bold")[Appendix: Estimating Formulas]
]

#v(8pt)

#text(size: 9pt)[
  The quantities in this statement were produced with the formulas below.
  Each entry lists its source and the material lines it fed.
]

#v(10pt)
"##);

        let by_category = self.by_category();
        if by_category.is_empty() {
            output.push_str("#text(style: \"italic\")[No formulas recorded for this estimate.]\n");
            return output;
        }

        let usage_by_formula = self.by_formula();

        for (category, formulas) in by_category {
            output.push_str(&format!("\n== {}\n\n", category.display_name()));

            for formula in formulas {
                let meta = formula.metadata();

                output.push_str(&format!("=== {}\n\n", meta.name));
                output.push_str(&format!("#text(size: 9pt)[{}]\n\n", meta.description));
                output.push_str(&format!("*Formula:* {}\n\n", meta.formula_typst));
                output.push_str(&format!("*Source:* {}\n\n", meta.reference.citation()));

                if !meta.variables.is_empty() {
                    output.push_str("#table(\n");
                    output.push_str("  columns: (auto, 1fr, auto),\n");
                    output.push_str("  inset: 5pt,\n");
                    output.push_str("  stroke: 0.5pt + luma(180),\n");
                    output.push_str("  table.header([*Symbol*], [*Description*], [*Units*]),\n");
                    for var in &meta.variables {
                        output.push_str(&format!(
                            "  [${}$], [{}], [{}],\n",
                            var.symbol, var.description, var.units
                        ));
                    }
                    output.push_str(")\n\n");
                }

                if let Some(usages) = usage_by_formula.get(&formula) {
                    let mut materials: Vec<&str> = usages
                        .iter()
                        .filter_map(|u| u.material.as_deref())
                        .collect();
                    materials.sort();
                    materials.dedup();
                    if !materials.is_empty() {
                        output.push_str(&format!("*Applied to:* {}\n\n", materials.join(", ")));
                    }
                }

                if !meta.assumptions.is_empty() {
                    output.push_str("*Assumptions:*\n");
                    for assumption in &meta.assumptions {
                        output.push_str(&format!("- {}\n", assumption));
                    }
                    output.push('\n');
                }

                output.push_str("#line(length: 100%, stroke: 0.25pt + luma(160))\n\n");
            }
        }

        output
    }
}

// ============================================================================
// Markdown Generation for FORMULAS.md
// ============================================================================

/// Generate a complete FORMULAS.md file listing every formula in the registry.
///
/// ```rust
/// use tile_core::formulas::registry::generate_formulas_markdown;
///
/// let markdown = generate_formulas_markdown();
/// assert!(markdown.contains("TileIntel Formulas Reference"));
/// assert!(markdown.contains("## Grouting"));
/// ```
pub fn generate_formulas_markdown() -> String {
    let mut output = String::with_capacity(8_000);

    output.push_str(r#"# TileIntel Formulas Reference

> **Auto-generated from source code. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-formulas`

This document lists every formula used to turn a tiling job into a materials bill.
Coverage rates behind the formulas live in `tile_core/src/coverage.rs` and can be
overridden with a settings file.

## Units

| Quantity | Unit |
|----------|------|
| Area | m² |
| Tile dimensions, joints, depths | mm |
| Primer | L |
| Adhesive, grout, levelling compound | kg |

---

"#);

    let mut categories = 0;
    for category in FormulaCategory::ALL {
        let formulas = Formula::in_category(category);
        if formulas.is_empty() {
            continue;
        }
        categories += 1;

        output.push_str(&format!("## {}\n\n", category.display_name()));

        for formula in formulas {
            let meta = formula.metadata();

            output.push_str(&format!("### {}\n\n", meta.name));
            output.push_str(&format!("{}\n\n", meta.description));
            output.push_str(&format!("**Formula:** `{}`\n\n", meta.formula_plain));

            if !meta.variables.is_empty() {
                output.push_str("**Variables:**\n\n");
                output.push_str("| Symbol | Description | Units |\n");
                output.push_str("|--------|-------------|-------|\n");
                for var in &meta.variables {
                    output.push_str(&format!(
                        "| {} | {} | {} |\n",
                        var.plain, var.description, var.units
                    ));
                }
                output.push('\n');
            }

            output.push_str(&format!("**Reference:** {}\n\n", meta.reference.citation()));
            output.push_str(&format!(
                "**Source:** [`{}`]({})\n\n",
                meta.source_function, meta.source_module
            ));

            if !meta.assumptions.is_empty() {
                output.push_str("**Assumptions:**\n");
                for assumption in &meta.assumptions {
                    output.push_str(&format!("- {}\n", assumption));
                }
                output.push('\n');
            }

            output.push_str("---\n\n");
        }
    }

    output.push_str(&format!(
        "## Statistics\n\n- **Total Formulas:** {}\n- **Categories:** {}\n",
        ALL_FORMULAS.len(),
        categories
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_formulas_have_metadata() {
        assert_eq!(ALL_FORMULAS.len(), 9);

        for formula in ALL_FORMULAS {
            let meta = formula.metadata();
            assert!(!meta.name.is_empty(), "Formula {:?} has no name", formula);
            assert!(meta.formula_typst.starts_with('$'), "Formula {:?} is not math", formula);
            assert!(!meta.variables.is_empty(), "Formula {:?} has no variables", formula);
            assert!(!meta.source_function.is_empty());
        }

        let grout = Formula::GroutFillDepth.metadata();
        assert!(grout.formula_plain.contains("(W + H) / (W * H)"));
    }

    #[test]
    fn test_citation() {
        let bs = SourceReference::Bs5385 { part: 3, year: 2014, clause: "6.8" };
        assert_eq!(bs.citation(), "BS 5385-3:2014 Clause 6.8");
        assert_eq!(bs.short_form(), "BS 5385");

        let en = SourceReference::BsEn { number: "13888", title: "Grout for tiles" };
        assert_eq!(en.citation(), "BS EN 13888 (Grout for tiles)");
    }

    #[test]
    fn test_tracker() {
        let mut tracker = FormulaTracker::new();
        assert!(tracker.is_empty());
        tracker.record_for_material(Formula::PackCount, "Adhesive bags", "Adhesive");
        tracker.record_for_material(Formula::AdhesiveMass, "Bed", "Adhesive");
        tracker.record_for_material(Formula::PackCount, "Grout bags", "Grout");

        assert_eq!(tracker.usages().len(), 3);
        assert_eq!(tracker.unique_formulas(), vec![Formula::PackCount, Formula::AdhesiveMass]);
        assert_eq!(tracker.by_formula()[&Formula::PackCount].len(), 2);
    }

    #[test]
    fn test_by_category_in_work_order() {
        let mut tracker = FormulaTracker::new();
        tracker.record(Formula::GroutMass, "test");
        tracker.record(Formula::PrimerVolume, "test");
        tracker.record(Formula::AdhesiveMass, "test");

        let cats: Vec<_> = tracker.by_category().into_iter().map(|(c, _)| c).collect();
        assert_eq!(
            cats,
            vec![FormulaCategory::Preparation, FormulaCategory::Fixing, FormulaCategory::Grouting]
        );
    }

    #[test]
    fn test_merge() {
        let mut a = FormulaTracker::new();
        a.record(Formula::PrimerVolume, "a");
        let mut b = FormulaTracker::new();
        b.record(Formula::GroutMass, "b");
        a.merge(b);
        assert_eq!(a.usages().len(), 2);
    }

    #[test]
    fn test_generate_appendix_typst() {
        let mut tracker = FormulaTracker::new();
        tracker.record_for_material(Formula::AdhesiveMass, "Bed", "Adhesive");
        tracker.record_for_material(Formula::PackCount, "Bags", "Grout");
        tracker.record_for_material(Formula::PackCount, "Bags", "Adhesive");

        let typst = tracker.generate_appendix_typst();
        assert!(typst.contains("Appendix: Estimating Formulas"));
        assert!(typst.contains("=== Adhesive Mass"));
        assert!(typst.contains("BS EN 12004"));
        assert!(typst.contains("*Applied to:* Adhesive, Grout"));
        assert!(typst.contains("== Fixing"));
        assert!(typst.contains("== Purchasing"));
        assert!(!typst.contains("== Grouting"));
    }

    #[test]
    fn test_generate_appendix_empty_tracker() {
        let typst = FormulaTracker::new().generate_appendix_typst();
        assert!(typst.contains("No formulas recorded"));
    }

    #[test]
    fn test_generate_formulas_markdown() {
        let markdown = generate_formulas_markdown();
        assert!(markdown.contains("# TileIntel Formulas Reference"));
        assert!(markdown.contains("Auto-generated from source code"));
        for category in FormulaCategory::ALL {
            assert!(markdown.contains(&format!("## {}", category.display_name())));
        }
        assert!(markdown.contains("`m_adh = A * r_adh * f_sub`"));
        assert!(markdown.contains("| r_adh |"));
        assert!(markdown.contains("formulas/quantities.rs"));
        assert!(markdown.contains("**Total Formulas:** 9"));
        assert!(markdown.contains("**Categories:** 4"));
    }
}
