//! # Method Statement Renderer
//!
//! Generates a branded A4 method statement from a job and its materials
//! bill using Typst.
//!
//! ## Architecture
//!
//! - The Typst template is embedded as a string constant
//! - Data is injected via placeholder replacement before compilation
//! - User text is escaped before it reaches the Typst source
//! - Fonts come from the bundled `typst-assets` set, loaded once
//! - Output is a [`DocumentPayload`] (PDF bytes plus delivery metadata)
//!
//! Rendering either produces a complete document or fails; no partial
//! document is ever returned.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tile_core::calculations::estimate;
//! use tile_core::job::JobSpecInput;
//! use tile_core::pdf::render;
//!
//! let spec = JobSpecInput::default().validate().unwrap();
//! let bill = estimate(&spec);
//! let payload = render(&spec, &bill).unwrap();
//! std::fs::write(&payload.file_name, &payload.bytes).unwrap();
//! ```

use std::path::Path;

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use tracing::{debug, info};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;
use uuid::Uuid;

use crate::calculations::{MaterialsBill, Material, PurchasePlan};
use crate::coverage::{bs_ref, PackSizes};
use crate::errors::{TileError, TileResult};
use crate::formulas::registry::{Formula, FormulaTracker, ALL_FORMULAS};
use crate::job::{JobDetails, JobSpec};
use crate::materials::TileBracket;

/// MIME type of every rendered document
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Suggested download name for a method statement
pub const DEFAULT_FILE_NAME: &str = "TileIntel_Method_Statement.pdf";

/// Font family the template is set in
pub const BODY_FONT: &str = "Libertinus Serif";

// ============================================================================
// Typst World Implementation
// ============================================================================

/// Bundled fonts, parsed once and shared by every render.
static FONTS: Lazy<Vec<Font>> = Lazy::new(|| {
    let fonts: Vec<Font> = typst_assets::fonts()
        .flat_map(|data| Font::iter(Bytes::new(data)))
        .collect();
    debug!(count = fonts.len(), "loaded bundled fonts");
    fonts
});

/// A minimal Typst world: one source file, the bundled fonts, and an
/// optional logo image.
struct PdfWorld {
    main: Source,
    book: LazyHash<FontBook>,
    library: LazyHash<Library>,
    logo: Option<(LogoFormat, Bytes)>,
    today: NaiveDate,
}

impl PdfWorld {
    fn new(source: String, logo: Option<(LogoFormat, Bytes)>, today: NaiveDate) -> Self {
        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(FontBook::from_fonts(FONTS.iter())),
            library: LazyHash::new(Library::default()),
            logo,
            today,
        }
    }

    /// Fail early if the template's font family is not available.
    fn check_fonts(&self) -> TileResult<()> {
        if !self.book.contains_family(&BODY_FONT.to_lowercase()) {
            return Err(TileError::missing_asset(format!("font family '{}'", BODY_FONT)));
        }
        Ok(())
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        let path = id.vpath().as_rootless_path();
        match &self.logo {
            Some((format, bytes)) if path == Path::new(format.virtual_path()) => Ok(bytes.clone()),
            _ => Err(FileError::NotFound(path.into())),
        }
    }

    fn font(&self, index: usize) -> Option<Font> {
        FONTS.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        Datetime::from_ymd(
            self.today.year(),
            u8::try_from(self.today.month()).ok()?,
            u8::try_from(self.today.day()).ok()?,
        )
    }
}

// ============================================================================
// Payload and Options
// ============================================================================

/// A rendered document ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPayload {
    /// PDF bytes
    pub bytes: Vec<u8>,
    /// Always [`PDF_MIME_TYPE`]
    pub mime_type: &'static str,
    /// Suggested file name for download
    pub file_name: String,
}

impl DocumentPayload {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Recognised logo image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoFormat {
    Png,
    Jpeg,
    Svg,
}

impl LogoFormat {
    /// Detect the format from the leading bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
        const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

        if bytes.starts_with(PNG_MAGIC) {
            return Some(LogoFormat::Png);
        }
        if bytes.starts_with(JPEG_MAGIC) {
            return Some(LogoFormat::Jpeg);
        }
        let head = &bytes[..bytes.len().min(1024)];
        let text = String::from_utf8_lossy(head);
        let trimmed = text.trim_start_matches('\u{feff}').trim_start();
        if (trimmed.starts_with("<?xml") || trimmed.starts_with("<svg")) && text.contains("<svg") {
            return Some(LogoFormat::Svg);
        }
        None
    }

    /// Name the logo is served under inside the Typst world
    fn virtual_path(&self) -> &'static str {
        match self {
            LogoFormat::Png => "logo.png",
            LogoFormat::Jpeg => "logo.jpg",
            LogoFormat::Svg => "logo.svg",
        }
    }
}

/// Company branding printed in the header.
#[derive(Debug, Clone, PartialEq)]
pub struct Branding {
    pub company_name: String,
    pub tagline: String,
    /// Accent colour as `#RRGGBB`
    pub accent_color: String,
    /// PNG, JPEG or SVG logo
    pub logo: Option<Vec<u8>>,
}

impl Default for Branding {
    fn default() -> Self {
        Branding {
            company_name: "TileIntel".to_string(),
            tagline: "Tiling estimates and method statements".to_string(),
            accent_color: "#1F4E79".to_string(),
            logo: None,
        }
    }
}

impl Branding {
    /// Check the accent colour and identify the logo format.
    pub fn validate(&self) -> TileResult<Option<LogoFormat>> {
        let hex = self.accent_color.strip_prefix('#').unwrap_or("");
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TileError::invalid_input(
                "accent_color",
                self.accent_color.clone(),
                "Accent colour must be #RRGGBB",
            ));
        }
        match &self.logo {
            None => Ok(None),
            Some(bytes) => LogoFormat::detect(bytes)
                .map(Some)
                .ok_or_else(|| TileError::missing_asset("logo (not a PNG, JPEG or SVG image)")),
        }
    }
}

/// Everything about the document that is not job data.
#[derive(Debug, Clone)]
pub struct DocumentOptions {
    pub branding: Branding,
    /// Document reference printed in the footer
    pub reference: Uuid,
    /// Issue date printed in the footer
    pub issue_date: NaiveDate,
    /// Append the estimating formulas
    pub include_appendix: bool,
    /// Pack sizes for the order column
    pub packs: PackSizes,
    /// Formulas recorded during estimation; the full estimating set when absent
    pub formulas: Option<FormulaTracker>,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        DocumentOptions {
            branding: Branding::default(),
            reference: Uuid::new_v4(),
            issue_date: Utc::now().date_naive(),
            include_appendix: true,
            packs: PackSizes::default(),
            formulas: None,
        }
    }
}

impl DocumentOptions {
    /// Short reference, e.g. "TI-3F2A9C1D"
    pub fn reference_code(&self) -> String {
        let short: String = self.reference.simple().to_string().chars().take(8).collect();
        format!("TI-{}", short.to_uppercase())
    }
}

// ============================================================================
// Method Statement Template
// ============================================================================

const METHOD_STATEMENT_TEMPLATE: &str = r##"
#let accent = rgb("{{ACCENT}}")

#set document(title: [Method Statement {{PROJECT}}])
#set page(
  paper: "a4",
  margin: (top: 30mm, bottom: 24mm, left: 20mm, right: 20mm),
  header: [
    #grid(
      columns: (1fr, auto),
      align(left + horizon)[{{LOGO}}#text(size: 13pt, weight: "bold", fill: accent)[{{COMPANY}}] #h(6pt) #text(size: 8pt, fill: luma(110))[{{TAGLINE}}]],
      align(right + horizon)[#text(size: 8pt, fill: luma(110))[Method Statement]],
    )
    #v(-4pt)
    #line(length: 100%, stroke: 0.75pt + accent)
  ],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + luma(160))
    #v(2pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 8pt)[Ref: {{REFERENCE}}]],
      align(center)[#text(size: 8pt)[Page #counter(page).display() of #counter(page).final().first()]],
      align(right)[#text(size: 8pt)[Issued {{DATE}}]],
    )
  ],
)

#set text(font: "{{FONT}}", size: 10.5pt)
#show heading.where(level: 2): it => block(above: 14pt, below: 8pt)[
  #text(size: 12pt, weight: "bold", fill: accent)[#it.body]
]

#block(width: 100%, fill: accent.lighten(88%), inset: 12pt, radius: 3pt)[
  #text(size: 18pt, weight: "bold")[Method Statement: Floor Tiling]
  #v(2pt)
  #text(size: 11pt)[{{PROJECT}}]
]

#v(6pt)

== Job Details

#table(
  columns: (auto, 1fr),
  stroke: none,
  inset: (x: 0pt, y: 3pt),
  column-gutter: 12pt,
  [*Project:*], [{{PROJECT}}],
  [*Room / area:*], [{{ROOM}}],
  [*Prepared by:*], [{{PREPARED_BY}}],
  [*Substrate:*], [{{SUBSTRATE}}],
  [*Underfloor heating:*], [{{UFH}}],
  [*Tile:*], [{{TILE}}, {{THICKNESS}} mm thick ({{BRACKET}})],
  [*Area:*], [{{AREA}} m²],
  [*Adhesive:*], [{{ADHESIVE}}],
  [*Grout:*], [{{GROUT}}],
)

== Materials

#table(
  columns: (auto, auto, 1fr, auto),
  inset: 6pt,
  stroke: 0.5pt + luma(180),
  align: (left, right, left, left),
  table.header([*Material*], [*Quantity*], [*Specification*], [*Order*]),
{{MATERIAL_ROWS}}
)

#text(size: 9pt, fill: luma(90))[
  {{NOTCH}} mm square-notch trowel, {{JOINT}} mm joints. Quantities are raw estimates with no wastage allowance; order quantities are rounded up to whole packs.
]

== Method

{{METHOD_STEPS}}

== Health and Safety

- Wear an FFP3 dust mask and eye protection when cutting tiles or mixing powders.
- Cementitious adhesives, grouts and compounds are alkaline: wear gloves and wash splashes off skin promptly.
- Keep the work area ventilated and follow the safety data sheet for primers and resin grouts.
- Bags weigh up to 25 kg: lift with a straight back or share the load.
- Keep cables, tools and offcuts clear of walkways; cordon off freshly laid floors.
{{SAFETY_EXTRA}}

== Notes

{{NOTES}}

{{ASSUMPTIONS}}

{{ATTACHMENTS}}

#v(12pt)
#line(length: 100%, stroke: 0.5pt + luma(160))
#text(size: 8pt, fill: luma(110))[
  Generated by {{COMPANY}}. Quantities use standard coverage rates; always verify with manufacturer datasheets and {{STANDARD}}.
]
{{APPENDIX}}
"##;

// ============================================================================
// Rendering Functions
// ============================================================================

/// Render a method statement with default details and options.
///
/// # Returns
///
/// * `Ok(DocumentPayload)` - The PDF and its delivery metadata
/// * `Err(TileError)` - `MissingAsset` or `RenderFailed`
pub fn render(spec: &JobSpec, bill: &MaterialsBill) -> TileResult<DocumentPayload> {
    render_method_statement(spec, bill, &JobDetails::default(), &DocumentOptions::default())
}

/// Render a method statement for a job.
///
/// # Arguments
///
/// * `spec` - The validated job
/// * `bill` - Materials estimated for `spec`
/// * `details` - Project, room, notes and attachment names
/// * `options` - Branding, reference, issue date and appendix switch
///
/// # Errors
///
/// * `InvalidInput` - over-long details or a malformed accent colour
/// * `MissingAsset` - the body font is unavailable or the logo is not an image
/// * `RenderFailed` - Typst compilation or PDF export failed
pub fn render_method_statement(
    spec: &JobSpec,
    bill: &MaterialsBill,
    details: &JobDetails,
    options: &DocumentOptions,
) -> TileResult<DocumentPayload> {
    details.validate()?;
    let logo_format = options.branding.validate()?;
    options.packs.validate()?;

    let mut tracker = options.formulas.clone().unwrap_or_else(estimating_formulas);
    let plan = bill.purchase_plan_traced(&options.packs, &mut tracker);

    let source = build_source(spec, bill, &plan, details, options, logo_format, &tracker);

    let logo = match (logo_format, &options.branding.logo) {
        (Some(format), Some(bytes)) => Some((format, Bytes::new(bytes.clone()))),
        _ => None,
    };
    let world = PdfWorld::new(source, logo, options.issue_date);
    world.check_fonts()?;

    let warned = typst::compile(&world);
    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        TileError::render_failed("compile", error_msgs.join("; "))
    })?;

    let bytes = typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        TileError::render_failed("export", error_msgs.join("; "))
    })?;

    info!(
        reference = %options.reference_code(),
        pages = document.pages.len(),
        bytes = bytes.len(),
        "rendered method statement"
    );

    Ok(DocumentPayload {
        bytes,
        mime_type: PDF_MIME_TYPE,
        file_name: DEFAULT_FILE_NAME.to_string(),
    })
}

/// Tracker holding every estimating formula, for bills rendered without
/// their own trace.
fn estimating_formulas() -> FormulaTracker {
    let mut tracker = FormulaTracker::new();
    for formula in ALL_FORMULAS.iter().filter(|f| **f != Formula::PackCount) {
        tracker.record(*formula, "Materials bill");
    }
    tracker
}

fn build_source(
    spec: &JobSpec,
    bill: &MaterialsBill,
    plan: &PurchasePlan,
    details: &JobDetails,
    options: &DocumentOptions,
    logo_format: Option<LogoFormat>,
    tracker: &FormulaTracker,
) -> String {
    let branding = &options.branding;
    let logo = match logo_format {
        Some(format) => format!("#box(height: 16pt, image(\"{}\")) #h(6pt)", format.virtual_path()),
        None => String::new(),
    };
    let appendix = if options.include_appendix {
        tracker.generate_appendix_typst()
    } else {
        String::new()
    };

    let values = [
        ("ACCENT", branding.accent_color.clone()),
        ("LOGO", logo),
        ("COMPANY", escape_typst(&branding.company_name)),
        ("TAGLINE", escape_typst(&branding.tagline)),
        ("REFERENCE", options.reference_code()),
        ("DATE", options.issue_date.format("%d %B %Y").to_string()),
        ("FONT", BODY_FONT.to_string()),
        ("PROJECT", or_not_specified(&details.project)),
        ("ROOM", or_not_specified(&details.room)),
        ("PREPARED_BY", or_not_specified(&details.prepared_by)),
        ("SUBSTRATE", spec.substrate().display_name().to_string()),
        ("UFH", if spec.underfloor_heating() { "Yes" } else { "No" }.to_string()),
        ("TILE", escape_typst(&spec.tile().display_name())),
        ("THICKNESS", format_number(spec.tile_thickness_mm())),
        ("BRACKET", bill.tile_bracket.display_name().to_lowercase()),
        ("AREA", format!("{:.2}", spec.area_m2())),
        ("ADHESIVE", escape_typst(&adhesive_label(spec))),
        ("GROUT", escape_typst(&grout_label(spec))),
        ("MATERIAL_ROWS", material_rows(spec, bill, plan)),
        ("NOTCH", format_number(bill.trowel_notch_mm)),
        ("JOINT", format_number(bill.joint_width_mm)),
        ("METHOD_STEPS", method_steps(spec, bill)),
        ("SAFETY_EXTRA", safety_extra(spec)),
        ("NOTES", notes_block(&details.notes)),
        ("ASSUMPTIONS", assumptions_block(bill)),
        ("ATTACHMENTS", attachments_block(&details.attachments)),
        ("STANDARD", bs_ref::FLOOR_TILING.to_string()),
        ("APPENDIX", appendix),
    ];
    fill_template(METHOD_STATEMENT_TEMPLATE, &values)
}

/// Replace each `{{KEY}}` in a single pass.
///
/// Substituted text is never scanned again. Unknown keys are left as written.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let found = after.find("}}").and_then(|end| {
            let key = &after[..end];
            values.iter().find(|(k, _)| *k == key).map(|(_, value)| (end, value))
        });
        match found {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn adhesive_label(spec: &JobSpec) -> String {
    format!("{} ({})", spec.adhesive().display_name(), spec.adhesive().code())
}

fn grout_label(spec: &JobSpec) -> String {
    format!("{} ({})", spec.grout().display_name(), spec.grout().code())
}

/// Rows for the materials table, in work order
fn material_rows(spec: &JobSpec, bill: &MaterialsBill, plan: &PurchasePlan) -> String {
    plan.lines
        .iter()
        .map(|line| {
            let specification = match line.material {
                Material::Primer => format!(
                    "Acrylic primer, {} coat{}",
                    bill.primer_coats,
                    if bill.primer_coats == 1 { "" } else { "s" }
                ),
                Material::LevellingCompound if bill.needs_levelling() => format!(
                    "Self-levelling compound, {} mm average",
                    format_number(bill.levelling_depth_mm)
                ),
                Material::LevellingCompound => "Not required".to_string(),
                Material::Adhesive => adhesive_label(spec),
                Material::Grout => grout_label(spec),
            };
            format!(
                "  [{}], [{:.2} {}], [{}], [{}],",
                line.material.display_name(),
                line.quantity,
                line.material.unit(),
                escape_typst(&specification),
                line.pack_description()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Numbered method steps, with substrate and UFH steps where they apply
fn method_steps(spec: &JobSpec, bill: &MaterialsBill) -> String {
    let substrate = spec.substrate();
    let mut steps = vec![format!(
        "Verify the {} substrate: flatness, strength and moisture ({}).",
        substrate.display_name().to_lowercase(),
        bs_ref::SUBSTRATE
    )];

    match substrate {
        crate::materials::Substrate::AnhydriteScreed => steps.push(format!(
            "Anhydrite screed: confirm residual moisture is at or below 0.5% (75% RH), then sand off the surface laitance and vacuum ({}).",
            bs_ref::ANHYDRITE
        )),
        crate::materials::Substrate::ExistingTile => steps.push(
            "Existing tiles: tap-test for hollow or loose tiles and replace them, then degrease and abrade the glaze."
                .to_string(),
        ),
        s if s.is_timber() => steps.push(format!(
            "Timber floor: check joist deflection, screw-fix the plywood overlay at close centres and use a deformable adhesive ({}).",
            bs_ref::TIMBER
        )),
        _ => {}
    }

    if spec.underfloor_heating() {
        steps.push(format!(
            "Underfloor heating: commission the system, then switch it off before levelling and tiling; do not restart until the grout has cured, raising the temperature gradually ({}).",
            bs_ref::UFH
        ));
    }

    if (substrate.is_timber() || spec.underfloor_heating()) && !spec.adhesive().is_deformable() {
        steps.push(format!(
            "{} is not deformable: substitute a C2 TE S1 or S2 adhesive on timber or heated floors.",
            spec.adhesive().display_name()
        ));
    }

    steps.push(format!(
        "Prime as per the manufacturer datasheet: {} coat{}, {:.2} L in total; allow to dry between coats.",
        bill.primer_coats,
        if bill.primer_coats == 1 { "" } else { "s" },
        bill.primer_litres
    ));

    if bill.needs_levelling() {
        steps.push(format!(
            "Apply levelling compound to an average {} mm ({:.1} kg); cure as specified before fixing.",
            format_number(bill.levelling_depth_mm),
            bill.levelling_compound_kg
        ));
    } else {
        steps.push("No levelling compound allowed for; spot-level only where flatness checks require it.".to_string());
    }

    let mut fixing = format!(
        "Fix tiles with {} using a {} mm square-notch trowel, ensuring a solid bed.",
        spec.adhesive().display_name(),
        format_number(bill.trowel_notch_mm)
    );
    if bill.tile_bracket == TileBracket::LargeFormat {
        fixing.push_str(" Back-butter large format tiles and use a levelling clip system.");
    }
    steps.push(fixing);

    steps.push(format!(
        "Respect movement joints and perimeter gaps ({}).",
        bs_ref::MOVEMENT_JOINTS
    ));

    steps.push(format!(
        "Grout with {} at {} mm joints after the adhesive has cured.",
        spec.grout().display_name(),
        format_number(bill.joint_width_mm)
    ));

    steps
        .iter()
        .map(|step| format!("+ {}", escape_typst(step)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn safety_extra(spec: &JobSpec) -> String {
    let mut extra = Vec::new();
    if spec.underfloor_heating() {
        extra.push("- Isolate electric underfloor heating at the consumer unit before drilling, grinding or levelling.");
    }
    if spec.grout() == crate::materials::GroutType::EpoxyRg {
        extra.push("- Epoxy grout is a skin sensitiser: wear nitrile gloves and do not let resin cure on tools or skin.");
    }
    extra.join("\n")
}

/// Multi-line notes joined with Typst line breaks
fn notes_block(notes: &str) -> String {
    let lines: Vec<String> = notes
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(escape_typst)
        .collect();
    if lines.is_empty() {
        "No additional notes.".to_string()
    } else {
        lines.join(" \\\n")
    }
}

fn assumptions_block(bill: &MaterialsBill) -> String {
    if bill.assumptions.is_empty() {
        return String::new();
    }
    let mut out = String::from("*Estimating assumptions:*\n");
    for assumption in &bill.assumptions {
        out.push_str(&format!("- {}\n", escape_typst(assumption)));
    }
    out
}

fn attachments_block(attachments: &[String]) -> String {
    if attachments.is_empty() {
        return String::new();
    }
    let mut out = String::from("== Supporting Documents\n\n");
    for name in attachments {
        out.push_str(&format!("- {}\n", escape_typst(name)));
    }
    out
}

fn or_not_specified(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        "Not specified".to_string()
    } else {
        escape_typst(trimmed)
    }
}

/// "9" for whole numbers, "9.5" otherwise
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// Escape Typst markup characters in user-provided text.
///
/// Newlines become spaces; callers that keep line structure split first.
fn escape_typst(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\r' | '\n' => out.push(' '),
            '\\' | '*' | '_' | '#' | '$' | '@' | '<' | '>' | '`' | '[' | ']' | '{' | '}' | '/' | '~'
            | '=' | '-' | '+' | '.' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::estimate;
    use crate::materials::{AdhesiveType, GroutType, Substrate, TileSize};

    fn spec(substrate: Substrate, ufh: bool) -> JobSpec {
        JobSpec::new(
            20.0,
            TileSize::T300x300,
            substrate,
            ufh,
            AdhesiveType::C2TeS1,
            GroutType::Cg2Wa,
        )
        .unwrap()
    }

    fn assert_pdf(payload: &DocumentPayload) {
        assert!(payload.bytes.starts_with(b"%PDF"), "Output is not a PDF");
        let tail = &payload.bytes[payload.len().saturating_sub(64)..];
        assert!(
            tail.windows(5).any(|w| w == b"%%EOF"),
            "PDF is missing its trailer"
        );
        assert!(payload.len() > 1000, "PDF seems too small");
    }

    #[test]
    fn test_render_default() {
        let spec = spec(Substrate::Concrete, false);
        let bill = estimate(&spec);
        let payload = render(&spec, &bill).unwrap();
        assert_pdf(&payload);
        assert_eq!(payload.mime_type, "application/pdf");
        assert_eq!(payload.file_name, DEFAULT_FILE_NAME);
    }

    #[test]
    fn test_render_with_details_and_hostile_text() {
        let spec = spec(Substrate::AnhydriteScreed, true);
        let bill = estimate(&spec);
        let details = JobDetails {
            project: "#14 Mill Lane [Phase 2] $ref_*".to_string(),
            room: "Kitchen // GF hallway".to_string(),
            prepared_by: "A. Fixer <site@example.com>".to_string(),
            notes: "1. Client supplies tiles\n= not a heading\n\n- not a list".to_string(),
            attachments: vec!["plan_v2.pdf".to_string(), "photo #1.jpg".to_string()],
        };
        let options = DocumentOptions {
            branding: Branding {
                company_name: "Smith & Sons_Tiling".to_string(),
                ..Branding::default()
            },
            ..DocumentOptions::default()
        };
        let payload = render_method_statement(&spec, &bill, &details, &options).unwrap();
        assert_pdf(&payload);
    }

    #[test]
    fn test_render_all_substrates_without_appendix() {
        for substrate in Substrate::ALL {
            let spec = spec(substrate, false);
            let bill = estimate(&spec);
            let options = DocumentOptions {
                include_appendix: false,
                ..DocumentOptions::default()
            };
            let payload =
                render_method_statement(&spec, &bill, &JobDetails::default(), &options).unwrap();
            assert_pdf(&payload);
        }
    }

    #[test]
    fn test_render_with_svg_logo() {
        let spec = spec(Substrate::Concrete, false);
        let bill = estimate(&spec);
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20"><rect width="40" height="20" fill="#1F4E79"/></svg>"##;
        let options = DocumentOptions {
            branding: Branding {
                logo: Some(svg.to_vec()),
                ..Branding::default()
            },
            ..DocumentOptions::default()
        };
        let payload = render_method_statement(&spec, &bill, &JobDetails::default(), &options).unwrap();
        assert_pdf(&payload);
    }

    #[test]
    fn test_bad_logo_is_missing_asset() {
        let spec = spec(Substrate::Concrete, false);
        let bill = estimate(&spec);
        let options = DocumentOptions {
            branding: Branding {
                logo: Some(b"definitely not an image".to_vec()),
                ..Branding::default()
            },
            ..DocumentOptions::default()
        };
        let err = render_method_statement(&spec, &bill, &JobDetails::default(), &options).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_ASSET");
        assert!(err.is_render_error());
    }

    #[test]
    fn test_bad_accent_rejected() {
        let branding = Branding {
            accent_color: "navy".to_string(),
            ..Branding::default()
        };
        assert!(branding.validate().unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_logo_detection() {
        assert_eq!(LogoFormat::detect(b"\x89PNG\r\n\x1a\n...."), Some(LogoFormat::Png));
        assert_eq!(LogoFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(LogoFormat::Jpeg));
        assert_eq!(
            LogoFormat::detect(b"<?xml version=\"1.0\"?>\n<svg></svg>"),
            Some(LogoFormat::Svg)
        );
        assert_eq!(LogoFormat::detect(b"GIF89a"), None);
        assert_eq!(LogoFormat::detect(b""), None);
    }

    #[test]
    fn test_escape_typst() {
        assert_eq!(escape_typst("a*b_c"), "a\\*b\\_c");
        assert_eq!(escape_typst("#x $y"), "\\#x \\$y");
        assert_eq!(escape_typst("line\nbreak"), "line break");
        assert_eq!(escape_typst("a//b"), "a\\/\\/b");
        assert_eq!(escape_typst("plain text"), "plain text");
        assert_eq!(escape_typst("{{NOTES}}"), "\\{\\{NOTES\\}\\}");
    }

    #[test]
    fn test_fill_template_is_single_pass() {
        let values = [("A", "{{B}}".to_string()), ("B", "bee".to_string())];
        assert_eq!(fill_template("{{A}} {{B}} {{C}}", &values), "{{B}} bee {{C}}");
        assert_eq!(fill_template("x {{ y", &values), "x {{ y");
    }

    #[test]
    fn test_render_with_placeholder_text() {
        let spec = spec(Substrate::Concrete, true);
        let details = JobDetails {
            project: "{{APPENDIX}}".to_string(),
            room: "{{METHOD_STEPS}}".to_string(),
            notes: "{{NOTES}}\n{{ATTACHMENTS}} {{APPENDIX}}".to_string(),
            ..JobDetails::default()
        };
        let mut options = DocumentOptions::default();
        options.branding.company_name = "{{APPENDIX}} Tiling".to_string();
        options.branding.tagline = "{{SAFETY_EXTRA}}".to_string();

        let bill = estimate(&spec);
        let payload = render_method_statement(&spec, &bill, &details, &options).unwrap();
        assert_pdf(&payload);

        let source = build_source(
            &spec,
            &bill,
            &bill.purchase_plan(&options.packs),
            &details,
            &options,
            None,
            &estimating_formulas(),
        );
        assert!(source.contains("\\{\\{APPENDIX\\}\\} Tiling"));
        assert_eq!(source.matches("#pagebreak()").count(), 1);
    }

    #[test]
    fn test_notes_block() {
        assert_eq!(notes_block(""), "No additional notes.");
        assert_eq!(notes_block("one\n\ntwo"), "one \\\ntwo");
    }

    #[test]
    fn test_method_steps_are_conditional() {
        let plain = spec(Substrate::Concrete, false);
        let steps = method_steps(&plain, &estimate(&plain));
        assert!(!steps.contains("Underfloor heating"));
        assert!(steps.contains("No levelling compound"));

        let heated = spec(Substrate::AnhydriteScreed, true);
        let steps = method_steps(&heated, &estimate(&heated));
        assert!(steps.contains("Underfloor heating"));
        assert!(steps.contains("Anhydrite screed"));
        assert!(steps.contains("Apply levelling compound"));

        let timber = spec(Substrate::Plywood, false);
        let steps = method_steps(&timber, &estimate(&timber));
        assert!(steps.contains("Timber floor"));
        assert!(!steps.contains("not deformable"));

        let rapid = JobSpec::new(
            20.0,
            TileSize::T300x300,
            Substrate::Plywood,
            false,
            AdhesiveType::RapidSetC2,
            GroutType::Cg2Wa,
        )
        .unwrap();
        assert!(method_steps(&rapid, &estimate(&rapid)).contains("Rapid\\-set C2 is not deformable"));
    }

    #[test]
    fn test_reference_code() {
        let options = DocumentOptions::default();
        let code = options.reference_code();
        assert!(code.starts_with("TI-"));
        assert_eq!(code.len(), 11);
    }
}
