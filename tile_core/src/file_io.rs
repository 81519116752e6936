//! # File I/O Module
//!
//! Handles job files, settings files and rendered documents:
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent corruption
//! - **Version validation**: Ensure job file schema compatibility
//!
//! ## File Formats
//!
//! - Jobs are saved as `.tij` (TileIntel job) files containing pretty JSON
//! - Estimate settings are TOML (see [`EstimateSettings`])
//! - Rendered method statements are written as-is
//!
//! ## Example
//!
//! ```rust,no_run
//! use tile_core::file_io::{load_job, save_job};
//! use tile_core::job::{JobDetails, JobFile, JobSpecInput};
//! use std::path::Path;
//!
//! let spec = JobSpecInput::default().validate().unwrap();
//! let job = JobFile::new(&spec, JobDetails::default());
//! let path = Path::new("kitchen.tij");
//!
//! save_job(&job, path).unwrap();
//! let loaded = load_job(path).unwrap();
//! assert_eq!(loaded.spec().unwrap(), spec);
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::coverage::EstimateSettings;
use crate::errors::{TileError, TileResult};
use crate::job::{JobFile, SCHEMA_VERSION};
use crate::pdf::DocumentPayload;

/// Extension used for job files
pub const JOB_FILE_EXTENSION: &str = "tij";

/// `path` with the job file extension added when it has none
pub fn job_file_path(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(JOB_FILE_EXTENSION)
    }
}

/// Temporary path written before the final rename, e.g. `job.tij.tmp`
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write bytes to `path` with atomic write semantics.
///
/// The write process:
/// 1. Write to a temporary file beside the target (`<name>.tmp`)
/// 2. Sync to disk (fsync)
/// 3. Rename over the target (atomic on most filesystems)
///
/// An interrupted write leaves any existing file untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> TileResult<()> {
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        TileError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(bytes).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        TileError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        TileError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;
    drop(tmp_file);

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        TileError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}

fn read_to_string(path: &Path) -> TileResult<String> {
    fs::read_to_string(path)
        .map_err(|e| TileError::file_error("read", path.display().to_string(), e.to_string()))
}

// ============================================================================
// Job Files
// ============================================================================

/// Save a job to a `.tij` file.
///
/// # Example
///
/// ```rust,no_run
/// use tile_core::file_io::save_job;
/// use tile_core::job::{JobDetails, JobFile, JobSpecInput};
/// use std::path::Path;
///
/// let spec = JobSpecInput::default().validate()?;
/// save_job(&JobFile::new(&spec, JobDetails::default()), Path::new("job.tij"))?;
/// # Ok::<(), tile_core::errors::TileError>(())
/// ```
pub fn save_job(job: &JobFile, path: &Path) -> TileResult<()> {
    let json = serde_json::to_string_pretty(job).map_err(|e| TileError::serialization(e.to_string()))?;
    write_atomic(path, json.as_bytes())
}

/// Load a job from a `.tij` file.
///
/// The stored parameters are not parsed or validated here; call
/// [`JobFile::spec`] to obtain a [`JobSpec`](crate::job::JobSpec). An
/// unrecognised option such as `"substrate": "carpet"` is reported there
/// as `UnknownOption`.
///
/// # Returns
///
/// * `Ok(JobFile)` - Successfully loaded job
/// * `Err(TileError::VersionMismatch)` - File version is incompatible
/// * `Err(TileError::SerializationError)` - Invalid JSON
/// * `Err(TileError::FileError)` - I/O error
pub fn load_job(path: &Path) -> TileResult<JobFile> {
    let contents = read_to_string(path)?;

    let job: JobFile = serde_json::from_str(&contents)
        .map_err(|e| TileError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))?;

    validate_version(&job.meta.version)?;

    debug!(path = %path.display(), version = %job.meta.version, "loaded job file");
    Ok(job)
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> TileResult<()> {
    let mismatch = || TileError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let parse = |v: &str| -> Option<Vec<u32>> { v.split('.').map(|p| p.trim().parse().ok()).collect() };

    let file_parts = parse(file_version).filter(|p| !p.is_empty()).ok_or_else(mismatch)?;
    let current_parts = parse(SCHEMA_VERSION).filter(|p| !p.is_empty()).ok_or_else(mismatch)?;

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // In 0.x a newer minor may carry breaking changes
    if current_parts[0] == 0 {
        let file_minor = file_parts.get(1).copied().unwrap_or(0);
        let current_minor = current_parts.get(1).copied().unwrap_or(0);
        if file_minor > current_minor {
            return Err(mismatch());
        }
    }

    Ok(())
}

// ============================================================================
// Settings Files
// ============================================================================

/// Load estimate settings from a TOML file.
///
/// Missing tables and keys fall back to the built-in defaults; the result
/// is validated before it is returned.
pub fn load_settings(path: &Path) -> TileResult<EstimateSettings> {
    let contents = read_to_string(path)?;
    EstimateSettings::from_toml_str(&contents).map_err(|e| match e {
        TileError::SerializationError { reason } => {
            TileError::serialization(format!("Invalid TOML in {}: {}", path.display(), reason))
        }
        other => other,
    })
}

/// Save estimate settings as TOML.
pub fn save_settings(settings: &EstimateSettings, path: &Path) -> TileResult<()> {
    settings.validate()?;
    let toml = settings.to_toml_string()?;
    write_atomic(path, toml.as_bytes())
}

// ============================================================================
// Documents
// ============================================================================

/// Write a rendered document to `path`.
pub fn write_document(payload: &DocumentPayload, path: &Path) -> TileResult<()> {
    if payload.is_empty() {
        return Err(TileError::Internal {
            message: "refusing to write an empty document".to_string(),
        });
    }
    write_atomic(path, &payload.bytes)
}
