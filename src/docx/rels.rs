//! OPC relationship parts (`_rels/*.rels`).

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::Result;
use crate::xml::{attr_value, local_name};

/// Relationship type of external hyperlinks (transitional OOXML).
pub const HYPERLINK_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// Relationship type of external hyperlinks (strict OOXML).
pub const STRICT_HYPERLINK_TYPE: &str =
    "http://purl.oclc.org/ooxml/officeDocument/relationships/hyperlink";

/// Relationship type pointing from the package to its main document part.
pub const OFFICE_DOCUMENT_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

const STRICT_OFFICE_DOCUMENT_TYPE: &str =
    "http://purl.oclc.org/ooxml/officeDocument/relationships/officeDocument";

/// One `<Relationship>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Target exactly as declared, XML escapes decoded.
    pub target: String,
    /// `TargetMode` attribute, usually `External` for hyperlinks.
    pub target_mode: Option<String>,
}

impl Relationship {
    pub fn is_hyperlink(&self) -> bool {
        self.rel_type == HYPERLINK_TYPE || self.rel_type == STRICT_HYPERLINK_TYPE
    }

    pub fn is_office_document(&self) -> bool {
        self.rel_type == OFFICE_DOCUMENT_TYPE || self.rel_type == STRICT_OFFICE_DOCUMENT_TYPE
    }

    pub fn is_external(&self) -> bool {
        self.target_mode
            .as_deref()
            .is_some_and(|mode| mode.eq_ignore_ascii_case("External"))
    }
}

/// Relationships of one part, in declaration order, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct RelationshipTable {
    entries: Vec<Relationship>,
    by_id: HashMap<String, usize>,
}

impl RelationshipTable {
    /// Parse a `.rels` part.
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut table = RelationshipTable::default();

        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e)
                    if local_name(e.name().as_ref()) == b"Relationship" =>
                {
                    let Some(id) = attr_value(&e, b"Id")? else {
                        continue;
                    };
                    let rel_type = attr_value(&e, b"Type")?.unwrap_or_default();
                    let target = attr_value(&e, b"Target")?.unwrap_or_default();
                    let target_mode = attr_value(&e, b"TargetMode")?;

                    table.insert(Relationship {
                        id,
                        rel_type,
                        target,
                        target_mode,
                    });
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(table)
    }

    /// Add an entry. A repeated id keeps its first position but takes the
    /// later definition.
    pub fn insert(&mut self, rel: Relationship) {
        match self.by_id.get(&rel.id) {
            Some(&index) => self.entries[index] = rel,
            None => {
                self.by_id.insert(rel.id.clone(), self.entries.len());
                self.entries.push(rel);
            }
        }
    }

    /// Look up a relationship by exact id.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id).map(|&index| &self.entries[index])
    }

    /// Target of `id` if it names a hyperlink relationship.
    pub fn hyperlink_target(&self, id: &str) -> Option<&str> {
        self.get(id)
            .filter(|rel| rel.is_hyperlink())
            .map(|rel| rel.target.as_str())
    }

    /// Hyperlink relationships in declaration order.
    pub fn hyperlinks(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter().filter(|rel| rel.is_hyperlink())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/b?x=1&amp;y=2" TargetMode="External"/>
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/a" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn test_parse_preserves_declaration_order() {
        let table = RelationshipTable::parse(RELS).unwrap();
        assert_eq!(table.len(), 3);
        let ids: Vec<_> = table.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rId3", "rId1", "rId2"]);

        let targets: Vec<_> = table.hyperlinks().map(|r| r.target.as_str()).collect();
        assert_eq!(
            targets,
            vec!["https://example.com/b?x=1&y=2", "https://example.com/a"]
        );
    }

    #[test]
    fn test_lookup() {
        let table = RelationshipTable::parse(RELS).unwrap();
        assert_eq!(table.hyperlink_target("rId2"), Some("https://example.com/a"));
        assert!(table.get("rId1").is_some());
        assert_eq!(table.hyperlink_target("rId1"), None);
        assert_eq!(table.hyperlink_target("rId99"), None);
        assert!(table.get("rId2").unwrap().is_external());
        assert!(!table.get("rId1").unwrap().is_external());
    }

    #[test]
    fn test_strict_hyperlink_type() {
        let rels = format!(
            r#"<Relationships><Relationship Id="r1" Type="{STRICT_HYPERLINK_TYPE}" Target="http://s.test"/></Relationships>"#
        );
        let table = RelationshipTable::parse(&rels).unwrap();
        assert_eq!(table.hyperlink_target("r1"), Some("http://s.test"));
    }

    #[test]
    fn test_empty_and_idless_entries() {
        let table = RelationshipTable::parse("<Relationships/>").unwrap();
        assert!(table.is_empty());

        let table = RelationshipTable::parse(
            r#"<Relationships><Relationship Type="x" Target="y"/></Relationships>"#,
        )
        .unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_duplicate_id_keeps_position() {
        let mut table = RelationshipTable::default();
        for (id, target) in [("a", "1"), ("b", "2"), ("a", "3")] {
            table.insert(Relationship {
                id: id.into(),
                rel_type: HYPERLINK_TYPE.into(),
                target: target.into(),
                target_mode: None,
            });
        }
        let targets: Vec<_> = table.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, vec!["3", "2"]);
    }

    #[test]
    fn test_malformed_rels_is_error() {
        assert!(RelationshipTable::parse("<Relationships><Relationship Id=\"a\"></Oops>").is_err());
    }
}
