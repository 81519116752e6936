//! Interactive job form.
//!
//! Every question shows its default in brackets; an empty answer (or end
//! of input) keeps the default.

use std::io::{BufRead, Write};

use tile_core::errors::TileResult;
use tile_core::job::{JobDetails, JobSpecInput};
use tile_core::materials::{AdhesiveType, GroutType, Substrate, TileSize};

use crate::session::SessionContext;

/// Line-oriented question and answer over any reader and writer.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompter { input, output }
    }

    /// `None` at end of input or on an I/O error
    fn ask(&mut self, prompt: &str) -> Option<String> {
        write!(self.output, "{}", prompt).ok()?;
        self.output.flush().ok()?;

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn say(&mut self, message: &str) {
        let _ = writeln!(self.output, "{}", message);
    }

    pub fn text(&mut self, label: &str, default: &str) -> String {
        let prompt = if default.is_empty() {
            format!("{}: ", label)
        } else {
            format!("{} [{}]: ", label, default)
        };
        match self.ask(&prompt) {
            Some(answer) if !answer.is_empty() => answer,
            _ => default.to_string(),
        }
    }

    pub fn number(&mut self, label: &str, default: f64) -> f64 {
        loop {
            let answer = match self.ask(&format!("{} [{}]: ", label, default)) {
                Some(answer) if !answer.is_empty() => answer,
                _ => return default,
            };
            match answer.parse::<f64>() {
                Ok(value) => return value,
                Err(_) => self.say(&format!("  '{}' is not a number", answer)),
            }
        }
    }

    pub fn yes_no(&mut self, label: &str, default: bool) -> bool {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            let answer = match self.ask(&format!("{} [{}]: ", label, hint)) {
                Some(answer) if !answer.is_empty() => answer.to_lowercase(),
                _ => return default,
            };
            match answer.as_str() {
                "y" | "yes" | "true" => return true,
                "n" | "no" | "false" => return false,
                _ => self.say("  Please answer y or n"),
            }
        }
    }

    /// Ask until the answer parses; the parse error is shown each time.
    pub fn choice<T>(&mut self, label: &str, default: &str, parse: impl Fn(&str) -> TileResult<T>) -> TileResult<T> {
        loop {
            let answer = match self.ask(&format!("{} [{}]: ", label, default)) {
                Some(answer) if !answer.is_empty() => answer,
                _ => return parse(default),
            };
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(e) => self.say(&format!("  {}", e)),
            }
        }
    }
}

/// Ask for every job parameter, starting from `defaults`.
pub fn collect_job<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    defaults: &JobSpecInput,
) -> TileResult<JobSpecInput> {
    let area_m2 = prompter.number("Area (m²)", defaults.area_m2);
    let tile = prompter.choice(
        "Tile size (e.g. 600x600, or WxH in mm)",
        &defaults.tile.size_code(),
        TileSize::from_str_flexible,
    )?;
    let tile_thickness_mm = prompter.number("Tile thickness (mm)", defaults.tile_thickness_mm);
    let substrate = prompter.choice("Substrate", defaults.substrate.code(), Substrate::from_str_flexible)?;
    let underfloor_heating = prompter.yes_no("Underfloor heating", defaults.underfloor_heating);
    let adhesive = prompter.choice("Adhesive", defaults.adhesive.code(), AdhesiveType::from_str_flexible)?;
    let grout = prompter.choice("Grout", defaults.grout.code(), GroutType::from_str_flexible)?;

    Ok(JobSpecInput {
        area_m2,
        tile,
        substrate,
        underfloor_heating,
        adhesive,
        grout,
        tile_thickness_mm,
    })
}

/// Ask for the document details and attach any supporting files.
///
/// Files that cannot be attached are reported and skipped.
pub fn collect_details<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    defaults: &JobDetails,
    session: &mut SessionContext,
) -> JobDetails {
    let project = prompter.text("Project (client / address / ref)", &defaults.project);
    let room = prompter.text("Room / area", &defaults.room);
    let prepared_by = prompter.text("Prepared by", &defaults.prepared_by);
    let notes = prompter.text("Additional notes", &defaults.notes);

    let files = prompter.text("Plans / images to attach (comma separated, png/jpg/pdf)", "");
    for path in files.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Err(e) = session.attach_file(std::path::Path::new(path)) {
            prompter.say(&format!("  Skipped {}: {}", path, e));
        }
    }

    let mut attachments = defaults.attachments.clone();
    attachments.extend(session.attachment_names());

    JobDetails {
        project,
        room,
        prepared_by,
        notes,
        attachments,
    }
}
