//! File collaborators: plain-text import, template reads, and save targets.
//!
//! Content type is derived from the file extension. Saving goes either to
//! an explicit path chosen at the save prompt or, when the prompt is
//! disabled, to an automatic download into the export directory that never
//! overwrites an existing file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::session::Role;

/// MIME-like classification of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    PlainText,
    Json,
    Other,
}

impl ContentType {
    /// Classify by extension (`.txt`/`.text` and `.json`, case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("txt" | "text") => Self::PlainText,
            Some("json") => Self::Json,
            _ => Self::Other,
        }
    }

    pub const fn mime(self) -> &'static str {
        match self {
            Self::PlainText => "text/plain",
            Self::Json => "application/json",
            Self::Other => "application/octet-stream",
        }
    }
}

/// Errors raised while reading a file into the session.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Please select a .txt file")]
    NotPlainText,
    #[error("Please select a .json template file")]
    NotTemplate,
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors raised while writing a file.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Error saving {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of a save that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    Cancelled,
}

/// Where a save should land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    /// A path chosen by the user; overwritten if present
    Path(PathBuf),
    /// The suggested name inside a directory, made unique
    Download { dir: PathBuf, file_name: String },
}

impl SaveTarget {
    /// Write `bytes` to this target.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Write`] when the file cannot be written.
    pub fn write(&self, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        match self {
            Self::Path(path) => write_to(path, bytes),
            Self::Download { dir, file_name } => download(dir, file_name, bytes),
        }
    }
}

/// Read a plain-text file for import.
///
/// # Errors
///
/// [`ImportError::NotPlainText`] for any other content type, or
/// [`ImportError::Read`] when the file cannot be read as UTF-8.
pub fn read_text_file(path: &Path) -> Result<String, ImportError> {
    if ContentType::from_path(path) != ContentType::PlainText {
        return Err(ImportError::NotPlainText);
    }
    read(path)
}

/// Read a template file's raw JSON.
///
/// # Errors
///
/// [`ImportError::NotTemplate`] for any other content type, or
/// [`ImportError::Read`] when the file cannot be read as UTF-8.
pub fn read_template_file(path: &Path) -> Result<String, ImportError> {
    if ContentType::from_path(path) != ContentType::Json {
        return Err(ImportError::NotTemplate);
    }
    read(path)
}

fn read(path: &Path) -> Result<String, ImportError> {
    let raw = fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), chars = raw.chars().count(), "read file");
    Ok(raw)
}

/// Write `bytes` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`ExportError::Write`] when the file cannot be written.
pub fn write_to(path: &Path, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    fs::write(path, bytes).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = bytes.len(), "saved file");
    Ok(path.to_path_buf())
}

/// Write `bytes` into `dir` under `file_name`, appending ` (1)`, ` (2)`,
/// ... before the extension when the name is taken.
///
/// # Errors
///
/// Returns [`ExportError::Write`] when the file cannot be written.
pub fn download(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    let path = unique_path(dir, file_name);
    write_to(&path, bytes)
}

/// First path in `dir` for `file_name` that does not exist yet.
pub fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    };
    (1..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Suggested name for a plain-text export.
pub const fn export_file_name(role: Role) -> &'static str {
    match role {
        Role::Filler => "completed-form.txt",
        Role::Author => "edited-text.txt",
    }
}
