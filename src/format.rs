//! Document type tags.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Container formats that hyperlinks can be extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// Office Open XML word-processing package (`.docx`).
    Docx,
    /// Portable Document Format (`.pdf`).
    Pdf,
}

impl DocumentFormat {
    /// Resolve a caller-supplied type tag.
    ///
    /// Accepts bare tags (`docx`, `pdf`), extensions with a leading dot and
    /// MIME types. Matching is case-insensitive.
    pub fn from_tag(tag: &str) -> Result<Self> {
        let tag = tag.trim();
        let normalized = tag.trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "docx" | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Ok(DocumentFormat::Docx)
            }
            "pdf" | "application/pdf" => Ok(DocumentFormat::Pdf),
            _ => Err(Error::UnsupportedFormat(tag.to_string())),
        }
    }

    /// Resolve the format from a file path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))?;
        Self::from_tag(extension)
    }

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pdf => "pdf",
        }
    }

    /// MIME type for the format.
    pub fn mime_type(self) -> &'static str {
        match self {
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentFormat::Pdf => "application/pdf",
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_tag(s)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
