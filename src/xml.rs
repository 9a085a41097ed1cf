//! Small helpers shared by the XML part readers.

use std::borrow::Cow;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart};

use crate::error::Result;

/// Decode an XML part to a string.
///
/// Tries UTF-8 first (BOM sniffing also picks up UTF-16 parts), then the
/// encoding named in the XML declaration, then Windows-1252.
pub fn decode_part(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = declared_encoding(bytes)
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Encoding name from an `<?xml ... encoding="..."?>` declaration.
fn declared_encoding(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(100)];

    let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let after_xml = &prefix[xml_start..];

    let enc_pos = after_xml
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let after_enc = &after_xml[enc_pos + 9..];

    let quote = *after_enc.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let value_end = after_enc[1..].iter().position(|&b| b == quote)? + 1;
    std::str::from_utf8(&after_enc[1..value_end]).ok()
}

/// Extract local name from namespaced XML name (e.g., "w:hyperlink" -> "hyperlink").
pub fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Value of the first attribute with the given local name, unescaped.
pub fn attr_value(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if local_name(attr.key.as_ref()) == key {
            let raw = String::from_utf8_lossy(&attr.value);
            return Ok(Some(quick_xml::escape::unescape(&raw)?.into_owned()));
        }
    }
    Ok(None)
}

/// Text of a general reference: a character reference or one of the five
/// predefined entities. Other named entities resolve to `None`.
pub fn resolve_reference(reference: &BytesRef<'_>) -> Result<Option<String>> {
    if let Some(ch) = reference.resolve_char_ref()? {
        return Ok(Some(ch.to_string()));
    }
    let name = String::from_utf8_lossy(reference);
    Ok(resolve_predefined_entity(&name).map(str::to_string))
}
