//! Request-scoped state for one CLI invocation.
//!
//! Attachments supplied with a job are held in memory for the lifetime of
//! the request only. The estimator never sees them; the method statement
//! lists their names.

use std::fs;
use std::path::Path;

use tile_core::errors::{TileError, TileResult};
use tracing::debug;

/// File types accepted as supporting documents
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "pdf"];

/// Largest single attachment accepted (bytes)
pub const MAX_ATTACHMENT_BYTES: usize = 20 * 1024 * 1024;

/// MIME type for an acceptable attachment of `len` bytes
fn check_attachment(name: &str, len: u64) -> TileResult<&'static str> {
    let mime_type =
        mime_for(name).ok_or_else(|| TileError::unknown_option("attachment", name, &ACCEPTED_EXTENSIONS))?;
    if len == 0 {
        return Err(TileError::invalid_input("attachment", name, "File is empty"));
    }
    if len > MAX_ATTACHMENT_BYTES as u64 {
        return Err(TileError::invalid_input(
            "attachment",
            name,
            format!("Larger than {} MB", MAX_ATTACHMENT_BYTES / (1024 * 1024)),
        ));
    }
    Ok(mime_type)
}

/// A supporting document held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Everything one request accumulates before rendering.
#[derive(Debug, Default)]
pub struct SessionContext {
    attachments: Vec<Attachment>,
}

impl SessionContext {
    pub fn new() -> Self {
        SessionContext::default()
    }

    /// Read a file from disk and attach it.
    ///
    /// Type and size are checked from the file name and metadata before
    /// anything is read.
    pub fn attach_file(&mut self, path: &Path) -> TileResult<()> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| TileError::invalid_input("attachment", path.display().to_string(), "Not a file"))?;
        let metadata = fs::metadata(path)
            .map_err(|e| TileError::file_error("read attachment", path.display().to_string(), e.to_string()))?;
        if !metadata.is_file() {
            return Err(TileError::invalid_input("attachment", name, "Not a file"));
        }
        check_attachment(&name, metadata.len())?;

        let bytes = fs::read(path)
            .map_err(|e| TileError::file_error("read attachment", path.display().to_string(), e.to_string()))?;
        self.attach(name, bytes)
    }

    /// Attach bytes under a file name; the extension decides the type.
    pub fn attach(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> TileResult<()> {
        let name = name.into();
        let mime_type = check_attachment(&name, bytes.len() as u64)?;
        debug!(name = %name, bytes = bytes.len(), "attached file");
        self.attachments.push(Attachment { name, mime_type, bytes });
        Ok(())
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Names in the order they were attached
    pub fn attachment_names(&self) -> Vec<String> {
        self.attachments.iter().map(|a| a.name.clone()).collect()
    }

    pub fn total_bytes(&self) -> usize {
        self.attachments.iter().map(|a| a.bytes.len()).sum()
    }
}

fn mime_for(name: &str) -> Option<&'static str> {
    let (_, ext) = name.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_accepts_listed_types() {
        let mut session = SessionContext::new();
        session.attach("plan.PDF", b"%PDF-1.4".to_vec()).unwrap();
        session.attach("site.jpeg", vec![0xFF, 0xD8, 0xFF]).unwrap();
        assert_eq!(session.attachment_names(), vec!["plan.PDF", "site.jpeg"]);
        assert_eq!(session.attachments()[0].mime_type, "application/pdf");
        assert_eq!(session.total_bytes(), 11);
    }

    #[test]
    fn test_rejects_other_types() {
        let mut session = SessionContext::new();
        let err = session.attach("notes.docx", b"PK".to_vec()).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_OPTION");
        assert!(session.attach("README", b"x".to_vec()).is_err());
        assert!(session.attachments().is_empty());
    }

    #[test]
    fn test_rejects_empty() {
        let mut session = SessionContext::new();
        assert!(session.attach("plan.png", Vec::new()).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_attach_file_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("floor.png");
        fs::write(&path, b"\x89PNG\r\n\x1a\n").unwrap();

        let mut session = SessionContext::new();
        session.attach_file(&path).unwrap();
        assert_eq!(session.attachment_names(), vec!["floor.png"]);

        let missing = dir.path().join("absent.png");
        assert_eq!(session.attach_file(&missing).unwrap_err().error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_oversized_file_rejected_from_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("survey.pdf");
        let file = fs::File::create(&path).unwrap();
        file.set_len(MAX_ATTACHMENT_BYTES as u64 + 1).unwrap();

        let mut session = SessionContext::new();
        let err = session.attach_file(&path).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("20 MB"), "{}", err);
        assert!(session.attachments().is_empty());
    }

    #[test]
    fn test_directory_is_not_attached() {
        let dir = TempDir::new().unwrap();
        let folder = dir.path().join("plans.pdf");
        fs::create_dir(&folder).unwrap();

        let mut session = SessionContext::new();
        assert!(session.attach_file(&folder).unwrap_err().is_invalid_input());
    }
}
