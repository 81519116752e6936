//! # Job Data Structures
//!
//! A tiling job is described by two records:
//!
//! - [`JobSpec`]: the validated, immutable parameters the estimator consumes
//!   (area, tile, substrate, UFH, adhesive, grout, tile thickness)
//! - [`JobDetails`]: free-text metadata printed on the method statement
//!   (project, room, notes); never read by the estimator
//!
//! [`JobSpecInput`] is the raw, serializable form a form or job file fills
//! in. It becomes a `JobSpec` only through [`JobSpecInput::validate`], so a
//! `JobSpec` in hand is always valid.
//!
//! Job files wrap both records in a [`JobFile`] with schema metadata. The
//! parameters are stored there as a [`JobSpecRecord`], whose option fields
//! stay as written until the file is used, so an unrecognised substrate or
//! grout is reported as an unknown option rather than a malformed file.
//!
//! ## Example
//!
//! ```rust
//! use tile_core::job::{JobSpec, JobSpecInput};
//! use tile_core::materials::{AdhesiveType, GroutType, Substrate, TileSize};
//!
//! let spec = JobSpec::new(
//!     20.0,
//!     TileSize::T300x300,
//!     Substrate::Concrete,
//!     false,
//!     AdhesiveType::C2TeS1,
//!     GroutType::Cg2Wa,
//! )
//! .unwrap();
//! assert_eq!(spec.area_m2(), 20.0);
//!
//! // Zero area never produces a JobSpec
//! let input = JobSpecInput { area_m2: 0.0, ..JobSpecInput::default() };
//! assert!(input.validate().unwrap_err().is_invalid_input());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{TileError, TileResult};
use crate::materials::{AdhesiveType, GroutType, Substrate, TileSize};

/// Current schema version for job files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Tile thickness assumed when none is given (mm)
pub const DEFAULT_TILE_THICKNESS_MM: f64 = 9.0;

/// Thickest tile accepted (mm)
pub const MAX_TILE_THICKNESS_MM: f64 = 40.0;

/// Largest area accepted for a single job (m²)
pub const MAX_AREA_M2: f64 = 100_000.0;

/// Longest accepted notes text (characters)
pub const MAX_NOTES_CHARS: usize = 4000;

/// Longest accepted single-line detail field (characters)
pub const MAX_FIELD_CHARS: usize = 200;

fn default_tile_thickness() -> f64 {
    DEFAULT_TILE_THICKNESS_MM
}

/// Raw job parameters, as collected from a form or job file.
///
/// ## JSON Example
///
/// ```json
/// {
///   "area_m2": 20.0,
///   "tile": "300x300",
///   "substrate": "concrete",
///   "underfloor_heating": false,
///   "adhesive": "C2TE-S1",
///   "grout": "CG2WA",
///   "tile_thickness_mm": 9.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpecInput {
    /// Area to be tiled in square metres
    pub area_m2: f64,

    /// Tile face size
    pub tile: TileSize,

    /// Base the tiles are fixed to
    pub substrate: Substrate,

    /// Whether underfloor heating is installed
    #[serde(default)]
    pub underfloor_heating: bool,

    /// Adhesive class
    #[serde(default)]
    pub adhesive: AdhesiveType,

    /// Grout class
    #[serde(default)]
    pub grout: GroutType,

    /// Tile thickness in millimetres (also the grout joint depth)
    #[serde(default = "default_tile_thickness")]
    pub tile_thickness_mm: f64,
}

impl Default for JobSpecInput {
    fn default() -> Self {
        JobSpecInput {
            area_m2: 20.0,
            tile: TileSize::default(),
            substrate: Substrate::default(),
            underfloor_heating: false,
            adhesive: AdhesiveType::default(),
            grout: GroutType::default(),
            tile_thickness_mm: DEFAULT_TILE_THICKNESS_MM,
        }
    }
}

impl JobSpecInput {
    /// Validate the raw parameters and produce an immutable [`JobSpec`].
    pub fn validate(&self) -> TileResult<JobSpec> {
        if !self.area_m2.is_finite() || self.area_m2 <= 0.0 {
            return Err(TileError::invalid_input(
                "area_m2",
                self.area_m2.to_string(),
                "Area must be positive",
            ));
        }
        if self.area_m2 > MAX_AREA_M2 {
            return Err(TileError::invalid_input(
                "area_m2",
                self.area_m2.to_string(),
                format!("Area exceeds {} m² - split the job into zones", MAX_AREA_M2),
            ));
        }
        self.tile.validate()?;
        if !self.tile_thickness_mm.is_finite() || self.tile_thickness_mm <= 0.0 {
            return Err(TileError::invalid_input(
                "tile_thickness_mm",
                self.tile_thickness_mm.to_string(),
                "Tile thickness must be positive",
            ));
        }
        if self.tile_thickness_mm > MAX_TILE_THICKNESS_MM {
            return Err(TileError::invalid_input(
                "tile_thickness_mm",
                self.tile_thickness_mm.to_string(),
                format!("Tile thickness exceeds {} mm", MAX_TILE_THICKNESS_MM),
            ));
        }

        Ok(JobSpec { inner: self.clone() })
    }
}

/// Job parameters as stored in a job file, option fields unparsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpecRecord {
    pub area_m2: f64,
    pub tile: String,
    pub substrate: String,
    #[serde(default)]
    pub underfloor_heating: bool,
    #[serde(default = "default_adhesive_code")]
    pub adhesive: String,
    #[serde(default = "default_grout_code")]
    pub grout: String,
    #[serde(default = "default_tile_thickness")]
    pub tile_thickness_mm: f64,
}

fn default_adhesive_code() -> String {
    AdhesiveType::default().code().to_string()
}

fn default_grout_code() -> String {
    GroutType::default().code().to_string()
}

impl JobSpecRecord {
    /// Parse the option fields. Values are not range-checked here.
    pub fn to_input(&self) -> TileResult<JobSpecInput> {
        Ok(JobSpecInput {
            area_m2: self.area_m2,
            tile: TileSize::from_str_flexible(&self.tile)?,
            substrate: Substrate::from_str_flexible(&self.substrate)?,
            underfloor_heating: self.underfloor_heating,
            adhesive: AdhesiveType::from_str_flexible(&self.adhesive)?,
            grout: GroutType::from_str_flexible(&self.grout)?,
            tile_thickness_mm: self.tile_thickness_mm,
        })
    }
}

impl From<&JobSpecInput> for JobSpecRecord {
    fn from(input: &JobSpecInput) -> Self {
        JobSpecRecord {
            area_m2: input.area_m2,
            tile: input.tile.size_code(),
            substrate: input.substrate.code().to_string(),
            underfloor_heating: input.underfloor_heating,
            adhesive: input.adhesive.code().to_string(),
            grout: input.grout.code().to_string(),
            tile_thickness_mm: input.tile_thickness_mm,
        }
    }
}

/// Validated, immutable tiling job parameters.
///
/// Construct with [`JobSpec::new`] or [`JobSpecInput::validate`].
/// Deserializing a `JobSpec` also runs validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JobSpecInput", into = "JobSpecInput")]
pub struct JobSpec {
    inner: JobSpecInput,
}

impl JobSpec {
    /// Build a validated job spec with the default tile thickness.
    pub fn new(
        area_m2: f64,
        tile: TileSize,
        substrate: Substrate,
        underfloor_heating: bool,
        adhesive: AdhesiveType,
        grout: GroutType,
    ) -> TileResult<Self> {
        JobSpecInput {
            area_m2,
            tile,
            substrate,
            underfloor_heating,
            adhesive,
            grout,
            tile_thickness_mm: DEFAULT_TILE_THICKNESS_MM,
        }
        .validate()
    }

    /// Return a copy with a different tile thickness, re-validated.
    pub fn with_tile_thickness(&self, tile_thickness_mm: f64) -> TileResult<Self> {
        JobSpecInput {
            tile_thickness_mm,
            ..self.inner.clone()
        }
        .validate()
    }

    /// Return a copy with a different area, re-validated.
    pub fn with_area(&self, area_m2: f64) -> TileResult<Self> {
        JobSpecInput {
            area_m2,
            ..self.inner.clone()
        }
        .validate()
    }

    pub fn area_m2(&self) -> f64 {
        self.inner.area_m2
    }

    pub fn tile(&self) -> TileSize {
        self.inner.tile
    }

    pub fn substrate(&self) -> Substrate {
        self.inner.substrate
    }

    pub fn underfloor_heating(&self) -> bool {
        self.inner.underfloor_heating
    }

    pub fn adhesive(&self) -> AdhesiveType {
        self.inner.adhesive
    }

    pub fn grout(&self) -> GroutType {
        self.inner.grout
    }

    pub fn tile_thickness_mm(&self) -> f64 {
        self.inner.tile_thickness_mm
    }

    /// The raw form of this spec (for saving)
    pub fn as_input(&self) -> &JobSpecInput {
        &self.inner
    }
}

impl TryFrom<JobSpecInput> for JobSpec {
    type Error = TileError;

    fn try_from(input: JobSpecInput) -> TileResult<Self> {
        input.validate()
    }
}

impl From<JobSpec> for JobSpecInput {
    fn from(spec: JobSpec) -> Self {
        spec.inner
    }
}

/// Document metadata for the method statement.
///
/// Nothing here affects the materials bill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobDetails {
    /// Client / address / reference
    #[serde(default)]
    pub project: String,

    /// Room or area label (e.g. "Kitchen, GF hallway")
    #[serde(default)]
    pub room: String,

    /// Name of the person issuing the statement
    #[serde(default)]
    pub prepared_by: String,

    /// Additional free-text notes
    #[serde(default)]
    pub notes: String,

    /// Names of supporting plans/images supplied with the job
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl JobDetails {
    /// Reject over-long text fields.
    pub fn validate(&self) -> TileResult<()> {
        for (field, value) in [
            ("project", &self.project),
            ("room", &self.room),
            ("prepared_by", &self.prepared_by),
        ] {
            let chars = value.chars().count();
            if chars > MAX_FIELD_CHARS {
                return Err(TileError::invalid_input(
                    field,
                    format!("{} characters", chars),
                    format!("Must be at most {} characters", MAX_FIELD_CHARS),
                ));
            }
        }
        let notes_chars = self.notes.chars().count();
        if notes_chars > MAX_NOTES_CHARS {
            return Err(TileError::invalid_input(
                "notes",
                format!("{} characters", notes_chars),
                format!("Must be at most {} characters", MAX_NOTES_CHARS),
            ));
        }
        for name in &self.attachments {
            if name.chars().count() > MAX_FIELD_CHARS {
                return Err(TileError::invalid_input(
                    "attachments",
                    name.clone(),
                    format!("Attachment names must be at most {} characters", MAX_FIELD_CHARS),
                ));
            }
        }
        Ok(())
    }
}

/// Root container serialized to `.tij` job files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFile {
    /// File metadata (schema version, timestamps)
    pub meta: JobFileMetadata,

    /// Document metadata
    #[serde(default)]
    pub details: JobDetails,

    /// Job parameters as written; parsed and validated on use
    pub spec: JobSpecRecord,
}

impl JobFile {
    /// Wrap a validated spec and its details for saving.
    pub fn new(spec: &JobSpec, details: JobDetails) -> Self {
        let now = Utc::now();
        JobFile {
            meta: JobFileMetadata {
                version: SCHEMA_VERSION.to_string(),
                created: now,
                modified: now,
            },
            details,
            spec: JobSpecRecord::from(spec.as_input()),
        }
    }

    /// Parse and validate the stored parameters.
    pub fn spec(&self) -> TileResult<JobSpec> {
        self.spec.to_input()?.validate()
    }

    /// Replace the stored job, keeping the created time.
    pub fn update(&mut self, spec: &JobSpec, details: JobDetails) {
        self.spec = JobSpecRecord::from(spec.as_input());
        self.details = details;
        self.touch();
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }
}

/// Job file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFileMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// When the job file was created
    pub created: DateTime<Utc>,

    /// When the job file was last modified
    pub modified: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> JobSpecInput {
        JobSpecInput {
            area_m2: 20.0,
            tile: TileSize::T300x300,
            substrate: Substrate::Concrete,
            underfloor_heating: false,
            adhesive: AdhesiveType::C2TeS1,
            grout: GroutType::Cg2Wa,
            tile_thickness_mm: 9.0,
        }
    }

    #[test]
    fn test_valid_spec() {
        let spec = base_input().validate().unwrap();
        assert_eq!(spec.area_m2(), 20.0);
        assert_eq!(spec.tile(), TileSize::T300x300);
        assert_eq!(spec.substrate(), Substrate::Concrete);
        assert!(!spec.underfloor_heating());
    }

    #[test]
    fn test_rejects_non_positive_area() {
        for area in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let input = JobSpecInput { area_m2: area, ..base_input() };
            let err = input.validate().unwrap_err();
            assert_eq!(err.error_code(), "INVALID_INPUT");
        }
    }

    #[test]
    fn test_rejects_bad_thickness_and_tile() {
        let thick = JobSpecInput { tile_thickness_mm: 0.0, ..base_input() };
        assert!(thick.validate().is_err());

        let too_thick = JobSpecInput { tile_thickness_mm: 41.0, ..base_input() };
        assert!(too_thick.validate().is_err());

        let tile = JobSpecInput {
            tile: TileSize::Custom { width_mm: 300.0, height_mm: 0.0 },
            ..base_input()
        };
        assert!(tile.validate().unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_with_area_revalidates() {
        let spec = base_input().validate().unwrap();
        assert_eq!(spec.with_area(35.5).unwrap().area_m2(), 35.5);
        assert!(spec.with_area(0.0).is_err());
        assert!(spec.with_tile_thickness(-3.0).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{"area_m2": 12.0, "tile": "600x600", "substrate": "plywood"}"#;
        let spec: JobSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.substrate(), Substrate::Plywood);
        assert_eq!(spec.adhesive(), AdhesiveType::C2TeS1);
        assert_eq!(spec.tile_thickness_mm(), DEFAULT_TILE_THICKNESS_MM);

        let bad = r#"{"area_m2": 0.0, "tile": "600x600", "substrate": "plywood"}"#;
        assert!(serde_json::from_str::<JobSpec>(bad).is_err());
    }

    #[test]
    fn test_spec_serializes_flat() {
        let spec = base_input().validate().unwrap();
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["area_m2"], 20.0);
        assert_eq!(json["tile"], "300x300");
        assert_eq!(json["substrate"], "concrete");
    }

    #[test]
    fn test_details_limits() {
        let details = JobDetails {
            notes: "x".repeat(MAX_NOTES_CHARS + 1),
            ..JobDetails::default()
        };
        assert!(details.validate().is_err());

        let ok = JobDetails {
            project: "14 Mill Lane".to_string(),
            room: "Kitchen".to_string(),
            ..JobDetails::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_job_file_roundtrip() {
        let spec = base_input().validate().unwrap();
        let file = JobFile::new(&spec, JobDetails::default());
        assert_eq!(file.meta.version, SCHEMA_VERSION);

        let json = serde_json::to_string_pretty(&file).unwrap();
        let roundtrip: JobFile = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.spec().unwrap(), spec);
    }

    #[test]
    fn test_job_file_accepts_labels_and_custom_sizes() {
        let json = r#"{
            "meta": {"version": "0.1.0", "created": "2026-01-05T09:00:00Z", "modified": "2026-01-05T09:00:00Z"},
            "spec": {"area_m2": 14.0, "tile": "250x400", "substrate": "Anhydrite screed", "grout": "epoxy"}
        }"#;
        let file: JobFile = serde_json::from_str(json).unwrap();
        let spec = file.spec().unwrap();
        assert_eq!(spec.tile(), TileSize::Custom { width_mm: 250.0, height_mm: 400.0 });
        assert_eq!(spec.substrate(), Substrate::AnhydriteScreed);
        assert_eq!(spec.adhesive(), AdhesiveType::C2TeS1);
        assert_eq!(spec.grout(), GroutType::EpoxyRg);
    }

    #[test]
    fn test_job_file_unknown_option_is_invalid_input() {
        let mut record = JobSpecRecord::from(&base_input());
        record.substrate = "carpet".to_string();
        let file = JobFile {
            spec: record,
            ..JobFile::new(&base_input().validate().unwrap(), JobDetails::default())
        };

        let err = file.spec().unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_OPTION");
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_spec_input_parses_flexible_strings() {
        let json = r#"{"area_m2": 9.0, "tile": "250x400", "substrate": "Anhydrite screed", "adhesive": "rapid set"}"#;
        let input: JobSpecInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.tile, TileSize::Custom { width_mm: 250.0, height_mm: 400.0 });
        assert_eq!(input.substrate, Substrate::AnhydriteScreed);
        assert_eq!(input.adhesive, AdhesiveType::RapidSetC2);

        let custom = JobSpecInput { tile: TileSize::custom(250.0, 400.0).unwrap(), ..base_input() };
        let record = JobSpecRecord::from(&custom);
        assert_eq!(record.tile, "250x400");
        assert_eq!(record.to_input().unwrap(), custom);
    }

    #[test]
    fn test_touch_moves_modified_only() {
        let mut file = JobFile::new(&base_input().validate().unwrap(), JobDetails::default());
        let created = file.meta.created;
        file.meta.modified = created - chrono::Duration::hours(1);
        file.touch();
        assert_eq!(file.meta.created, created);
        assert!(file.meta.modified >= created);
    }
}
