//! Word-processing (DOCX) hyperlink extraction.

mod document;
mod package;
pub mod rels;

pub use document::hyperlink_field_target;
pub use package::DocxPackage;
pub use rels::{Relationship, RelationshipTable};

use crate::error::Result;
use crate::link::Hyperlink;

/// Every hyperlink relationship of the main document part, in table order.
///
/// Labels are left empty; targets are returned verbatim.
pub fn relationship_links(package: &DocxPackage) -> Vec<Hyperlink> {
    package
        .relationships()
        .hyperlinks()
        .map(|rel| Hyperlink::bare(rel.target.clone()))
        .collect()
}

/// Hyperlinks with their visible labels, in document order.
///
/// Covers `w:hyperlink` elements and `HYPERLINK` field codes. Elements whose
/// relationship id does not resolve to a hyperlink are skipped.
pub fn correlated_links(package: &DocxPackage) -> Result<Vec<Hyperlink>> {
    document::correlated_links(package.document_xml(), package.relationships())
}
