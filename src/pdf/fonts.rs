//! Page fonts: character-code decoding and glyph widths.
//!
//! Decoding goes through the font's encoding as lopdf reads it (standard
//! one-byte encodings and `/ToUnicode` maps). Widths come from `/Widths`
//! for simple fonts and `/W` plus `/DW` of the descendant for composite
//! fonts; the standard 14 fonts usually carry neither.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Encoding, Object, ObjectId};
use tracing::debug;

use super::{number, resolve};
use crate::error::Result;

/// Glyph-space units per unit of font size.
const GLYPH_SPACE: f64 = 1000.0;

/// Default `/DW` of a CID font.
const DEFAULT_CID_WIDTH: f64 = 1000.0;

/// Fonts of one page, keyed by resource name.
pub type FontMap<'a> = BTreeMap<Vec<u8>, PageFont<'a>>;

/// Collect the fonts a page's resources name.
pub fn page_fonts(doc: &Document, page_id: ObjectId) -> Result<FontMap<'_>> {
    Ok(doc
        .get_page_fonts(page_id)?
        .into_iter()
        .map(|(name, font)| (name, PageFont::from_dict(doc, font)))
        .collect())
}

/// One character code of a shown string.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Unicode text of the code; empty when the font cannot decode it.
    pub text: String,
    /// Advance as a fraction of the font size, when the font declares it.
    pub width: Option<f64>,
    /// Single-byte code 32, the only code word spacing applies to.
    pub word_space: bool,
}

pub struct PageFont<'a> {
    encoding: Option<Encoding<'a>>,
    /// Bytes per character code.
    code_len: usize,
    widths: Widths,
}

enum Widths {
    Simple {
        first_char: u32,
        widths: Vec<Option<f64>>,
        missing: Option<f64>,
    },
    Cid {
        default: f64,
        ranges: Vec<(u32, u32, f64)>,
    },
    Unknown,
}

impl<'a> PageFont<'a> {
    pub fn from_dict(doc: &'a Document, font: &'a Dictionary) -> Self {
        let composite = has_name(doc, font, b"Subtype", b"Type0");

        // lopdf asserts on non-font dictionaries.
        let encoding = if font.type_is(b"Font") {
            font.get_font_encoding(doc)
                .map_err(|e| debug!(error = %e, "font encoding unavailable"))
                .ok()
        } else {
            debug!("font resource without /Type /Font; text left undecoded");
            None
        };

        let widths = if composite {
            cid_widths(doc, font)
        } else if has_name(doc, font, b"Subtype", b"Type3") {
            // Type 3 widths are in the font's own matrix space.
            Widths::Unknown
        } else {
            simple_widths(doc, font)
        };

        Self {
            encoding,
            code_len: if composite { 2 } else { 1 },
            widths,
        }
    }

    /// Split a shown string into decoded, measured character codes.
    pub fn glyphs(&self, bytes: &[u8]) -> Vec<Glyph> {
        bytes
            .chunks(self.code_len)
            .map(|code_bytes| {
                let code = code_bytes
                    .iter()
                    .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
                Glyph {
                    text: self.decode(code_bytes),
                    width: self.width(code),
                    word_space: self.code_len == 1 && code == 32,
                }
            })
            .collect()
    }

    fn decode(&self, code: &[u8]) -> String {
        let Some(encoding) = &self.encoding else {
            return String::new();
        };

        // CMap lookups read two-byte codes; a simple font's code is one byte.
        let widened;
        let bytes = match (encoding, code) {
            (Encoding::UnicodeMapEncoding(_), &[byte]) => {
                widened = [0, byte];
                &widened[..]
            }
            _ => code,
        };

        match Document::decode_text(encoding, bytes) {
            Ok(text) => text
                .chars()
                .filter(|&c| c != char::REPLACEMENT_CHARACTER && c != '\0')
                .collect(),
            Err(_) => String::new(),
        }
    }

    fn width(&self, code: u32) -> Option<f64> {
        let glyph_units = match &self.widths {
            Widths::Simple {
                first_char,
                widths,
                missing,
            } => code
                .checked_sub(*first_char)
                .and_then(|index| widths.get(index as usize).copied().flatten())
                .or(*missing),
            Widths::Cid { default, ranges } => Some(
                ranges
                    .iter()
                    .find(|(lo, hi, _)| (*lo..=*hi).contains(&code))
                    .map_or(*default, |&(_, _, w)| w),
            ),
            Widths::Unknown => None,
        }?;
        Some(glyph_units / GLYPH_SPACE)
    }
}

fn simple_widths(doc: &Document, font: &Dictionary) -> Widths {
    let first_char = lookup(doc, font, b"FirstChar")
        .and_then(number)
        .map_or(0, |n| n.max(0.0) as u32);

    let widths = match lookup(doc, font, b"Widths") {
        Some(Object::Array(items)) => items
            .iter()
            .map(|item| resolve(doc, item).ok().and_then(number))
            .collect(),
        _ => Vec::new(),
    };

    let missing = match lookup(doc, font, b"FontDescriptor") {
        Some(Object::Dictionary(descriptor)) => lookup(doc, descriptor, b"MissingWidth")
            .and_then(number)
            .filter(|w| *w > 0.0),
        _ => None,
    };

    if widths.is_empty() && missing.is_none() {
        return Widths::Unknown;
    }
    Widths::Simple {
        first_char,
        widths,
        missing,
    }
}

fn cid_widths(doc: &Document, font: &Dictionary) -> Widths {
    let descendant = match lookup(doc, font, b"DescendantFonts") {
        Some(Object::Array(items)) => items.first().and_then(|d| resolve(doc, d).ok()),
        _ => None,
    };
    let Some(Object::Dictionary(descendant)) = descendant else {
        return Widths::Unknown;
    };

    let default = lookup(doc, descendant, b"DW")
        .and_then(number)
        .unwrap_or(DEFAULT_CID_WIDTH);
    let ranges = match lookup(doc, descendant, b"W") {
        Some(Object::Array(items)) => parse_w_array(doc, items),
        _ => Vec::new(),
    };

    Widths::Cid { default, ranges }
}

/// `/W` entries: `c [w1 w2 ...]` or `c_first c_last w`.
fn parse_w_array(doc: &Document, items: &[Object]) -> Vec<(u32, u32, f64)> {
    let value = |i: usize| items.get(i).and_then(|obj| resolve(doc, obj).ok());
    let code = |i: usize| value(i).and_then(number).map(|n| n.max(0.0) as u32);

    let mut ranges = Vec::new();
    let mut i = 0;
    while let Some(first) = code(i) {
        match value(i + 1) {
            Some(Object::Array(widths)) => {
                for (offset, w) in widths.iter().enumerate() {
                    if let Some(w) = resolve(doc, w).ok().and_then(number) {
                        let c = first + offset as u32;
                        ranges.push((c, c, w));
                    }
                }
                i += 2;
            }
            Some(_) => {
                let (Some(last), Some(w)) = (code(i + 1), value(i + 2).and_then(number)) else {
                    break;
                };
                ranges.push((first, last, w));
                i += 3;
            }
            None => break,
        }
    }
    ranges
}

fn lookup<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().and_then(|obj| resolve(doc, obj).ok())
}

fn has_name(doc: &Document, dict: &Dictionary, key: &[u8], expected: &[u8]) -> bool {
    matches!(lookup(doc, dict, key), Some(Object::Name(name)) if name.as_slice() == expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn helvetica() -> Dictionary {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        }
    }

    #[test]
    fn test_win_ansi_decoding() {
        let doc = Document::with_version("1.5");
        let dict = helvetica();
        let font = PageFont::from_dict(&doc, &dict);

        let text: String = font.glyphs(b"Don\x92t").into_iter().map(|g| g.text).collect();
        assert_eq!(text, "Don\u{2019}t");
    }

    #[test]
    fn test_standard_font_without_widths() {
        let doc = Document::with_version("1.5");
        let dict = helvetica();
        let glyphs = PageFont::from_dict(&doc, &dict).glyphs(b"a ");

        assert_eq!(glyphs[0].width, None);
        assert!(!glyphs[0].word_space);
        assert!(glyphs[1].word_space);
    }

    #[test]
    fn test_simple_widths() {
        let doc = Document::with_version("1.5");
        let mut dict = helvetica();
        dict.set("FirstChar", 97);
        dict.set("Widths", vec![556.into(), 611.into()]);
        dict.set(
            "FontDescriptor",
            dictionary! { "Type" => "FontDescriptor", "MissingWidth" => 250 },
        );
        let glyphs = PageFont::from_dict(&doc, &dict).glyphs(b"abz");

        assert_eq!(glyphs[0].width, Some(0.556));
        assert_eq!(glyphs[1].width, Some(0.611));
        assert_eq!(glyphs[2].width, Some(0.25));
    }

    #[test]
    fn test_composite_font_without_to_unicode() {
        let doc = Document::with_version("1.5");
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "ABCDEF+NotoSans",
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Dictionary(dictionary! {
                "Type" => "Font",
                "Subtype" => "CIDFontType2",
                "DW" => 500,
                "W" => vec![
                    3.into(),
                    vec![Object::Integer(278), Object::Integer(600)].into(),
                    10.into(), 20.into(), 700.into(),
                ],
            })],
        };
        let glyphs = PageFont::from_dict(&doc, &dict).glyphs(&[0, 3, 0, 4, 0, 15, 0, 99]);

        assert_eq!(glyphs.len(), 4);
        assert!(glyphs.iter().all(|g| g.text.is_empty()));
        let widths: Vec<_> = glyphs.iter().map(|g| g.width).collect();
        assert_eq!(widths, vec![Some(0.278), Some(0.6), Some(0.7), Some(0.5)]);
    }

    #[test]
    fn test_non_font_dictionary_is_undecoded() {
        let doc = Document::with_version("1.5");
        let dict = dictionary! { "Subtype" => "Type1", "Encoding" => "WinAnsiEncoding" };
        let glyphs = PageFont::from_dict(&doc, &dict).glyphs(b"ab");
        assert!(glyphs.iter().all(|g| g.text.is_empty()));
    }
}
