//! Error types for doclinks operations.

use thiserror::Error;

/// Errors that can occur while extracting hyperlinks.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("PDF parsing error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Invalid DOCX: {0}")]
    InvalidDocx(String),

    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// True when the input bytes could not be parsed as the declared format.
    ///
    /// Unsupported type tags and I/O failures are not format errors.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::Zip(_)
                | Error::Xml(_)
                | Error::Pdf(_)
                | Error::InvalidDocx(_)
                | Error::InvalidPdf(_)
        )
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(quick_xml::Error::from(err))
    }
}

impl From<quick_xml::escape::EscapeError> for Error {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        Error::Xml(quick_xml::Error::from(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
