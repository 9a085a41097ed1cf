//! # doclinks
//!
//! Hyperlink extraction for word-processing (DOCX) and PDF documents.
//!
//! ## Features
//!
//! - DOCX: relationship-table links, or `w:hyperlink` elements and
//!   `HYPERLINK` field codes correlated with their visible text
//! - PDF: URL-shaped text in page content, or `/URI` link annotations
//!   labelled with the text under their rectangle plus a labelled text scan
//! - Links are reported in document order, without deduplication or URL
//!   normalization
//!
//! ## Quick Start
//!
//! ```no_run
//! use doclinks::{ExtractOptions, extract_links_from_path};
//!
//! let links = extract_links_from_path("input.pdf", &ExtractOptions::default())?;
//! for link in &links {
//!     println!("{:40} {}", link.text, link.url);
//! }
//! # Ok::<(), doclinks::Error>(())
//! ```
//!
//! ## Working with Bytes
//!
//! Uploaded documents arrive as bytes with a declared type. The type tag
//! decides the parser; unknown tags fail with [`Error::UnsupportedFormat`],
//! and bytes that do not parse as the declared format fail with an error for
//! which [`Error::is_format_error`] is true.
//!
//! ```
//! use doclinks::{Error, ExtractOptions, extract_links_tagged};
//!
//! let err = extract_links_tagged(b"not a pdf", "pdf", &ExtractOptions::default()).unwrap_err();
//! assert!(err.is_format_error());
//!
//! let err = extract_links_tagged(b"", "odt", &ExtractOptions::default()).unwrap_err();
//! assert!(matches!(err, Error::UnsupportedFormat(_)));
//! ```

pub mod docx;
pub mod error;
mod extract;
mod format;
mod link;
pub mod pdf;
pub mod urls;
pub(crate) mod xml;

pub use error::{Error, Result};
pub use extract::{
    DEFAULT_CONTEXT_RADIUS, DocxStrategy, ExtractOptions, PdfStrategy, extract_links,
    extract_links_from_path, extract_links_tagged,
};
pub use format::DocumentFormat;
pub use link::Hyperlink;
