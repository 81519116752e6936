use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::{debug, info, warn};

use tile_core::calculations::estimate_traced;
use tile_core::coverage::EstimateSettings;
use tile_core::file_io::{job_file_path, load_job, load_settings, save_job, write_document};
use tile_core::formulas::{generate_formulas_markdown, FormulaTracker};
use tile_core::job::{JobDetails, JobFile, JobSpec, JobSpecInput, JobSpecRecord};
use tile_core::pdf::{render_method_statement, Branding, DocumentOptions};

use crate::prompt::{collect_details, collect_job, Prompter};
use crate::report::{format_bill, format_options};
use crate::session::SessionContext;

/// TileIntel: floor tiling estimates and method statements.
#[derive(Parser, Debug)]
#[command(name = "tileintel", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Estimate settings (TOML) overriding the built-in coverage tables
    #[arg(long, global = true, env = "TILEINTEL_SETTINGS", value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Log lookups and computed quantities
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate materials for a job
    Estimate {
        #[command(flatten)]
        job: JobArgs,

        /// Print the bill as JSON
        #[arg(long)]
        json: bool,
    },

    /// Estimate and render a PDF method statement
    Render {
        #[command(flatten)]
        job: JobArgs,

        #[command(flatten)]
        details: DetailsArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Fill in the job form interactively, then render
    Interactive {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// List accepted values for tiles, substrates, adhesives and grouts
    Options,

    /// Print the estimating formula reference (markdown)
    Formulas {
        /// Write to a file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

/// Job parameters. Flags override values loaded with `--job`.
#[derive(Args, Debug, Clone, Default)]
pub struct JobArgs {
    /// Job file (.tij) to start from
    #[arg(long, value_name = "FILE")]
    pub job: Option<PathBuf>,

    /// Area to tile (m²)
    #[arg(long)]
    pub area: Option<f64>,

    /// Tile size, e.g. 600x600 or 450x900
    #[arg(long)]
    pub tile: Option<String>,

    /// Tile thickness (mm)
    #[arg(long)]
    pub thickness: Option<f64>,

    /// Substrate, e.g. concrete, anhydrite-screed, plywood
    #[arg(long)]
    pub substrate: Option<String>,

    /// Underfloor heating is fitted (`--ufh`, `--ufh true` or `--ufh false`)
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub ufh: Option<bool>,

    /// Adhesive, e.g. C2TE-S1, C2TE-S2, C2F, GEL
    #[arg(long)]
    pub adhesive: Option<String>,

    /// Grout, e.g. CG2WA, HYBRID, RG
    #[arg(long)]
    pub grout: Option<String>,
}

/// Text printed on the method statement.
#[derive(Args, Debug, Clone, Default)]
pub struct DetailsArgs {
    /// Client / address / reference
    #[arg(long)]
    pub project: Option<String>,

    /// Room or area label
    #[arg(long)]
    pub room: Option<String>,

    /// Person issuing the statement
    #[arg(long)]
    pub prepared_by: Option<String>,

    /// Additional notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Supporting plan or image (png, jpg, jpeg, pdf); repeatable
    #[arg(long = "attach", value_name = "FILE")]
    pub attachments: Vec<PathBuf>,
}

/// Where and how the document is written.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output PDF path
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Company logo (png, jpg or svg)
    #[arg(long, value_name = "FILE")]
    pub logo: Option<PathBuf>,

    /// Company name for the header
    #[arg(long)]
    pub company: Option<String>,

    /// Header accent colour (#RRGGBB)
    #[arg(long)]
    pub accent: Option<String>,

    /// Leave out the formula appendix
    #[arg(long)]
    pub no_appendix: bool,

    /// Also save the job to a .tij file (an existing job file is updated)
    #[arg(long, value_name = "FILE")]
    pub save_job: Option<PathBuf>,
}

/// Run a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let settings = load_settings_or_default(cli.settings.as_deref())?;

    match cli.command {
        Commands::Estimate { job, json } => {
            let (spec, _) = resolve_job(&job)?;
            let bill = tile_core::estimate_with(&spec, &settings);
            let plan = bill.purchase_plan(&settings.packs);

            if json {
                let value = json!({ "job": spec, "bill": bill, "purchase": plan });
                let text = serde_json::to_string_pretty(&value).context("Failed to serialize bill")?;
                println!("{}", text);
            } else {
                print!("{}", format_bill(&spec, &bill, &plan));
            }
            Ok(())
        }

        Commands::Render { job, details, output } => {
            let (spec, base_details) = resolve_job(&job)?;
            let mut session = SessionContext::new();
            let details = apply_details(base_details, &details, &mut session)?;
            render_job(&spec, details, &output, &settings)
        }

        Commands::Interactive { output } => {
            let stdin = io::stdin();
            let mut prompter = Prompter::new(stdin.lock(), io::stdout());

            println!("TileIntel job form (press Enter to keep the default)");
            let input = collect_job(&mut prompter, &JobSpecInput::default())?;
            let spec = input.validate()?;

            let mut session = SessionContext::new();
            let details = collect_details(&mut prompter, &JobDetails::default(), &mut session);
            render_job(&spec, details, &output, &settings)
        }

        Commands::Options => {
            print!("{}", format_options());
            Ok(())
        }

        Commands::Formulas { out } => {
            let markdown = generate_formulas_markdown();
            match out {
                Some(path) => {
                    fs::write(&path, &markdown)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => {
                    io::stdout().write_all(markdown.as_bytes())?;
                }
            }
            Ok(())
        }
    }
}

fn load_settings_or_default(path: Option<&Path>) -> Result<EstimateSettings> {
    match path {
        Some(path) => {
            let settings = load_settings(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?;
            info!(path = %path.display(), "using estimate settings");
            Ok(settings)
        }
        None => Ok(EstimateSettings::default()),
    }
}

/// Build a validated job from `--job` and the override flags.
///
/// Flags replace the stored values before anything is parsed, so a flag
/// can correct an unrecognised option in a job file.
pub fn resolve_job(args: &JobArgs) -> Result<(JobSpec, JobDetails)> {
    let (mut record, details) = match &args.job {
        Some(path) => {
            let file = load_job(path).with_context(|| format!("Failed to load job {}", path.display()))?;
            (file.spec, file.details)
        }
        None => {
            let area_m2 = args
                .area
                .ok_or(tile_core::TileError::missing_field("area"))
                .context("Give --area or --job")?;
            let input = JobSpecInput { area_m2, ..JobSpecInput::default() };
            (JobSpecRecord::from(&input), JobDetails::default())
        }
    };

    if let Some(area) = args.area {
        record.area_m2 = area;
    }
    if let Some(tile) = &args.tile {
        record.tile = tile.clone();
    }
    if let Some(thickness) = args.thickness {
        record.tile_thickness_mm = thickness;
    }
    if let Some(substrate) = &args.substrate {
        record.substrate = substrate.clone();
    }
    if let Some(ufh) = args.ufh {
        record.underfloor_heating = ufh;
    }
    if let Some(adhesive) = &args.adhesive {
        record.adhesive = adhesive.clone();
    }
    if let Some(grout) = &args.grout {
        record.grout = grout.clone();
    }

    let spec = record.to_input()?.validate()?;
    debug!(?spec, "resolved job");
    Ok((spec, details))
}

/// Overlay detail flags and attach files through the session.
pub fn apply_details(
    mut details: JobDetails,
    args: &DetailsArgs,
    session: &mut SessionContext,
) -> Result<JobDetails> {
    if let Some(project) = &args.project {
        details.project = project.clone();
    }
    if let Some(room) = &args.room {
        details.room = room.clone();
    }
    if let Some(prepared_by) = &args.prepared_by {
        details.prepared_by = prepared_by.clone();
    }
    if let Some(notes) = &args.notes {
        details.notes = notes.clone();
    }
    for path in &args.attachments {
        session
            .attach_file(path)
            .with_context(|| format!("Cannot attach {}", path.display()))?;
    }
    details.attachments.extend(session.attachment_names());
    details.validate()?;
    Ok(details)
}

fn document_options(output: &OutputArgs, settings: &EstimateSettings) -> Result<DocumentOptions> {
    let mut branding = Branding::default();
    if let Some(company) = &output.company {
        branding.company_name = company.clone();
    }
    if let Some(accent) = &output.accent {
        branding.accent_color = accent.clone();
    }
    if let Some(path) = &output.logo {
        let bytes = fs::read(path).with_context(|| format!("Failed to read logo {}", path.display()))?;
        branding.logo = Some(bytes);
    }

    Ok(DocumentOptions {
        branding,
        include_appendix: !output.no_appendix,
        packs: settings.packs,
        ..DocumentOptions::default()
    })
}

fn render_job(spec: &JobSpec, details: JobDetails, output: &OutputArgs, settings: &EstimateSettings) -> Result<()> {
    let mut tracker = FormulaTracker::new();
    let bill = estimate_traced(spec, settings, &mut tracker);

    let mut options = document_options(output, settings)?;
    options.formulas = Some(tracker);

    let payload = render_method_statement(spec, &bill, &details, &options)
        .context("Failed to render method statement")?;

    let out = output
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(&payload.file_name));
    write_document(&payload, &out).with_context(|| format!("Failed to write {}", out.display()))?;
    println!(
        "Wrote {} ({} KB, ref {})",
        out.display(),
        payload.len().div_ceil(1024),
        options.reference_code()
    );

    if let Some(path) = &output.save_job {
        let path = job_file_path(path);
        let job = updated_job_file(&path, spec, details);
        save_job(&job, &path).with_context(|| format!("Failed to save job {}", path.display()))?;
        println!("Saved job to {}", path.display());
    }
    Ok(())
}

/// The job file to write at `path`: the existing one updated in place, or a new one.
fn updated_job_file(path: &Path, spec: &JobSpec, details: JobDetails) -> JobFile {
    if path.exists() {
        match load_job(path) {
            Ok(mut existing) => {
                existing.update(spec, details);
                return existing;
            }
            Err(e) => warn!(path = %path.display(), error = %e, "replacing unreadable job file"),
        }
    }
    JobFile::new(spec, details)
}
