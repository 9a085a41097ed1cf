//! Format dispatch: bytes plus a type tag in, hyperlinks out.

use std::path::Path;

use tracing::debug;

use crate::docx::{self, DocxPackage};
use crate::error::Result;
use crate::format::DocumentFormat;
use crate::link::Hyperlink;
use crate::pdf::{self, PdfDocument};

/// Characters of context kept on each side of a text-scan match.
pub const DEFAULT_CONTEXT_RADIUS: usize = 10;

/// How DOCX hyperlinks are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocxStrategy {
    /// Relationship table only; labels are left empty.
    Relationships,
    /// `w:hyperlink` elements and `HYPERLINK` fields, with labels.
    #[default]
    Correlated,
}

/// How PDF hyperlinks are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PdfStrategy {
    /// URL-shaped substrings of the page text only; labels are left empty.
    TextScan,
    /// Link annotations labelled by the text they cover, then a labelled
    /// text scan.
    #[default]
    Annotations,
}

/// Extraction settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub docx: DocxStrategy,
    pub pdf: PdfStrategy,
    /// Context window for labelled text-scan matches.
    pub context_radius: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            docx: DocxStrategy::default(),
            pdf: PdfStrategy::default(),
            context_radius: DEFAULT_CONTEXT_RADIUS,
        }
    }
}

impl ExtractOptions {
    /// The unlabelled variants: relationship table and plain text scan.
    pub fn simple() -> Self {
        Self {
            docx: DocxStrategy::Relationships,
            pdf: PdfStrategy::TextScan,
            ..Self::default()
        }
    }

    pub fn with_docx(mut self, strategy: DocxStrategy) -> Self {
        self.docx = strategy;
        self
    }

    pub fn with_pdf(mut self, strategy: PdfStrategy) -> Self {
        self.pdf = strategy;
        self
    }

    pub fn with_context_radius(mut self, radius: usize) -> Self {
        self.context_radius = radius;
        self
    }
}

/// Extract hyperlinks from `bytes` declared as `format`.
///
/// # Example
///
/// ```no_run
/// use doclinks::{DocumentFormat, ExtractOptions, extract_links};
///
/// let bytes = std::fs::read("report.docx")?;
/// for link in extract_links(&bytes, DocumentFormat::Docx, &ExtractOptions::default())? {
///     println!("{} -> {}", link.text, link.url);
/// }
/// # Ok::<(), doclinks::Error>(())
/// ```
pub fn extract_links(
    bytes: &[u8],
    format: DocumentFormat,
    options: &ExtractOptions,
) -> Result<Vec<Hyperlink>> {
    let links = match format {
        DocumentFormat::Docx => {
            let package = DocxPackage::from_bytes(bytes)?;
            match options.docx {
                DocxStrategy::Relationships => docx::relationship_links(&package),
                DocxStrategy::Correlated => docx::correlated_links(&package)?,
            }
        }
        DocumentFormat::Pdf => {
            let document = PdfDocument::from_bytes(bytes)?;
            match options.pdf {
                PdfStrategy::TextScan => pdf::text_links(&document),
                PdfStrategy::Annotations => {
                    pdf::annotated_links(&document, options.context_radius)
                }
            }
        }
    };

    debug!(%format, count = links.len(), "extracted hyperlinks");
    Ok(links)
}

/// Extract hyperlinks from a string type tag (`"docx"`, `".pdf"`, a MIME type).
pub fn extract_links_tagged(
    bytes: &[u8],
    tag: &str,
    options: &ExtractOptions,
) -> Result<Vec<Hyperlink>> {
    extract_links(bytes, DocumentFormat::from_tag(tag)?, options)
}

/// Read a file and extract hyperlinks, taking the format from its extension.
pub fn extract_links_from_path<P: AsRef<Path>>(
    path: P,
    options: &ExtractOptions,
) -> Result<Vec<Hyperlink>> {
    let path = path.as_ref();
    let format = DocumentFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    extract_links(&bytes, format, options)
}
