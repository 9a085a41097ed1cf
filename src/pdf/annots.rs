use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::debug;

use super::layout::Rect;
use super::{decode_pdf_string, number, resolve};
use crate::error::{Error, Result};

/// A `/Link` annotation whose action opens a URI.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkAnnotation {
    pub uri: String,
    /// Active area in default user space; `None` when `/Rect` is unusable.
    pub rect: Option<Rect>,
}

/// Link annotations of a page, in `/Annots` order.
///
/// A page without `/Annots` has none. Individual annotations that are not
/// URI links, or that are malformed, are skipped.
pub fn uri_annotations(doc: &Document, page_id: ObjectId) -> Result<Vec<LinkAnnotation>> {
    let page = doc.get_dictionary(page_id)?;
    let Ok(annots) = page.get(b"Annots") else {
        return Ok(Vec::new());
    };

    let Object::Array(items) = resolve(doc, annots)? else {
        return Err(Error::InvalidPdf(format!(
            "/Annots of page object {} {} is not an array",
            page_id.0, page_id.1
        )));
    };

    let mut links = Vec::new();
    for item in items {
        let annot = match resolve(doc, item) {
            Ok(Object::Dictionary(dict)) => dict,
            Ok(_) => continue,
            Err(e) => {
                debug!(error = %e, "skipping unreadable annotation");
                continue;
            }
        };

        if let Some(link) = link_annotation(doc, annot) {
            links.push(link);
        }
    }

    Ok(links)
}

fn link_annotation(doc: &Document, annot: &Dictionary) -> Option<LinkAnnotation> {
    if !has_name(doc, annot, b"Subtype", b"Link") {
        return None;
    }

    let action = match resolve(doc, annot.get(b"A").ok()?).ok()? {
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    if !has_name(doc, action, b"S", b"URI") {
        return None;
    }

    let uri = match resolve(doc, action.get(b"URI").ok()?).ok()? {
        Object::String(bytes, _) => decode_pdf_string(bytes),
        _ => return None,
    };

    let rect = annot
        .get(b"Rect")
        .ok()
        .and_then(|obj| resolve(doc, obj).ok())
        .and_then(|obj| rect_from(doc, obj));

    Some(LinkAnnotation { uri, rect })
}

fn has_name(doc: &Document, dict: &Dictionary, key: &[u8], expected: &[u8]) -> bool {
    dict.get(key)
        .ok()
        .and_then(|obj| resolve(doc, obj).ok())
        .is_some_and(|obj| matches!(obj, Object::Name(name) if name.as_slice() == expected))
}

fn rect_from(doc: &Document, obj: &Object) -> Option<Rect> {
    let Object::Array(values) = obj else {
        return None;
    };
    if values.len() != 4 {
        return None;
    }

    let mut coords = [0.0; 4];
    for (slot, value) in coords.iter_mut().zip(values) {
        *slot = number(resolve(doc, value).ok()?)?;
    }
    Some(Rect::new(coords[0], coords[1], coords[2], coords[3]))
}
