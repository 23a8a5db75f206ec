//! Spreadsheet files selected for upload.

use std::path::Path;

use crate::ClientError;

/// File extensions accepted by the upload endpoint.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &[".xlsx", ".xls"];

/// A file picked by the user, held in memory until it is uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name, without directories.
    pub name: String,
    /// MIME type, when the caller knows it.
    pub mime: Option<String>,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// Creates a file from in-memory contents.
    #[must_use]
    pub fn new(name: impl Into<String>, mime: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime,
            bytes,
        }
    }

    /// Reads `path` into memory, guessing the MIME type from its
    /// extension.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self, ClientError> {
        let bytes = std::fs::read(path)?;
        Ok(Self::new(file_name(path), guess_mime(path), bytes))
    }

    /// Size in megabytes, for display.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size_mb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0 / 1024.0
    }

    /// Returns `true` if the name or MIME type indicates an Excel
    /// spreadsheet.
    #[must_use]
    pub fn is_spreadsheet(&self) -> bool {
        is_spreadsheet(&self.name, self.mime.as_deref())
    }
}

/// The last component of `path`, or the whole path when it has none.
#[must_use]
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// MIME type registered for the extension of `path`, matched
/// case-insensitively.
#[must_use]
pub fn guess_mime(path: &Path) -> Option<String> {
    mime_guess::from_path(path).first_raw().map(ToString::to_string)
}

/// Returns `true` if `path` looks like a spreadsheet by name or guessed
/// MIME type. The file is not opened.
#[must_use]
pub fn is_spreadsheet_path(path: &Path) -> bool {
    is_spreadsheet(&file_name(path), guess_mime(path).as_deref())
}

/// Returns `true` if `mime` mentions `excel` or `spreadsheet`, or `name`
/// ends with `.xlsx` or `.xls`.
#[must_use]
pub fn is_spreadsheet(name: &str, mime: Option<&str>) -> bool {
    let mime_matches = mime.is_some_and(|m| m.contains("excel") || m.contains("spreadsheet"));
    mime_matches
        || SPREADSHEET_EXTENSIONS
            .iter()
            .any(|ext| name.ends_with(ext))
}
