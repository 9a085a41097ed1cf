//! The hyperlink record produced by every extractor.

/// A hyperlink found in a document.
///
/// `text` is the best-effort visible label. It is empty when the extractor
/// does not correlate labels, and may equal `url` when no label could be
/// recovered. `url` is the raw target string exactly as stored in the
/// document; it is not validated or normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hyperlink {
    pub text: String,
    pub url: String,
}

impl Hyperlink {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }

    /// A hyperlink with no label.
    pub fn bare(url: impl Into<String>) -> Self {
        Self::new(String::new(), url)
    }

    /// Whether a label is present (non-whitespace).
    pub fn has_label(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
