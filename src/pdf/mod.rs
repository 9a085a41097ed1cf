//! PDF hyperlink extraction.
//!
//! Two passes are available per page: native `/URI` link annotations, and a
//! scan of the page's plain text for URL-shaped substrings. The simple
//! variant runs only the text scan; the annotation-aware variant runs both
//! and does not deduplicate between them.

mod annots;
mod fonts;
mod layout;

pub use annots::LinkAnnotation;
pub use layout::{PlacedChar, Rect, text_in_rect};

use lopdf::{Document, Object, ObjectId};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::link::Hyperlink;
use crate::urls::{context_window, find_urls};

/// The header may be preceded by junk, but must appear in the first 1 KiB.
const HEADER_SEARCH_LEN: usize = 1024;

/// A loaded PDF document.
pub struct PdfDocument {
    doc: Document,
}

impl PdfDocument {
    /// Parse a PDF from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let head = &bytes[..bytes.len().min(HEADER_SEARCH_LEN)];
        if !head.windows(5).any(|w| w == b"%PDF-") {
            return Err(Error::InvalidPdf("missing %PDF- header".into()));
        }

        let doc = Document::load_mem(bytes)?;
        debug!(pages = doc.get_pages().len(), "loaded PDF document");
        Ok(Self { doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Pages in page-number order.
    pub fn pages(&self) -> impl Iterator<Item = PdfPage<'_>> {
        self.doc
            .get_pages()
            .into_iter()
            .map(move |(number, id)| PdfPage {
                doc: &self.doc,
                number,
                id,
            })
    }
}

/// One page of a [`PdfDocument`].
pub struct PdfPage<'a> {
    doc: &'a Document,
    number: u32,
    id: ObjectId,
}

impl PdfPage<'_> {
    /// 1-based page number.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Plain text of the page, as laid out by the PDF text extractor.
    pub fn text(&self) -> Result<String> {
        Ok(self.doc.extract_text(&[self.number])?)
    }

    /// `/Link` annotations with a `/URI` action.
    pub fn link_annotations(&self) -> Result<Vec<LinkAnnotation>> {
        annots::uri_annotations(self.doc, self.id)
    }

    /// Characters of the page content stream with their positions.
    pub fn layout(&self) -> Result<Vec<PlacedChar>> {
        let fonts = fonts::page_fonts(self.doc, self.id)?;
        let content = self.doc.get_page_content(self.id)?;
        layout::layout_content(&content, &fonts)
    }
}

/// URLs found in page text, unlabelled, page by page.
pub fn text_links(document: &PdfDocument) -> Vec<Hyperlink> {
    let mut links = Vec::new();

    for page in document.pages() {
        match page.text() {
            Ok(text) => {
                links.extend(find_urls(&text).map(|m| Hyperlink::bare(m.url)));
            }
            Err(e) => warn!(page = page.number(), error = %e, "skipping page text"),
        }
    }

    links
}

/// Annotation links labelled with the text under their rectangle, followed
/// on each page by text-scan matches labelled with `radius` characters of
/// context.
pub fn annotated_links(document: &PdfDocument, radius: usize) -> Vec<Hyperlink> {
    let mut links = Vec::new();

    for page in document.pages() {
        match page.link_annotations() {
            Ok(annotations) => links.extend(label_annotations(&page, annotations)),
            Err(e) => warn!(page = page.number(), error = %e, "skipping page annotations"),
        }

        match page.text() {
            Ok(text) => {
                links.extend(find_urls(&text).map(|m| {
                    let label = context_window(&text, m.span.clone(), radius);
                    Hyperlink::new(label, m.url)
                }));
            }
            Err(e) => warn!(page = page.number(), error = %e, "skipping page text"),
        }
    }

    links
}

fn label_annotations(page: &PdfPage<'_>, annotations: Vec<LinkAnnotation>) -> Vec<Hyperlink> {
    if annotations.is_empty() {
        return Vec::new();
    }

    let chars = page.layout().unwrap_or_else(|e| {
        warn!(page = page.number(), error = %e, "page layout unavailable; labelling links by URL");
        Vec::new()
    });

    annotations
        .into_iter()
        .map(|annotation| {
            let text = annotation
                .rect
                .map(|rect| text_in_rect(&chars, rect))
                .unwrap_or_default();
            let label = if text.trim().is_empty() {
                annotation.uri.clone()
            } else {
                text
            };
            Hyperlink::new(label, annotation.uri)
        })
        .collect()
}

/// Follow an indirect reference.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object> {
    match obj {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// Numeric value of an integer or real object.
fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE with BOM, UTF-8, else byte-per-char.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let (text, _, _) = encoding_rs::UTF_16BE.decode(bytes);
        return text.into_owned();
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}
