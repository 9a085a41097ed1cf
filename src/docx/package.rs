//! ZIP container access for word-processing packages.

use std::io::{Cursor, Read, Seek};

use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::docx::rels::RelationshipTable;
use crate::error::{Error, Result};
use crate::xml::decode_part;

const PACKAGE_RELS: &str = "_rels/.rels";
const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// A parsed word-processing package: the main document part and its
/// relationship table, read eagerly so the archive can be dropped.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    main_part: String,
    document: String,
    relationships: RelationshipTable,
}

impl DocxPackage {
    /// Open a package from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Open a package from any [`Read`] + [`Seek`] source.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;

        let main_part = find_main_part(&mut archive)?;
        let document = read_archive_text(&mut archive, &main_part)?.ok_or_else(|| {
            Error::InvalidDocx(format!("main document part {main_part} not found"))
        })?;

        let rels_path = rels_path_for(&main_part);
        let relationships = match read_archive_text(&mut archive, &rels_path)? {
            Some(content) => RelationshipTable::parse(&content)?,
            None => {
                debug!(part = %rels_path, "no relationship part; using empty table");
                RelationshipTable::default()
            }
        };

        debug!(
            part = %main_part,
            relationships = relationships.len(),
            "opened word-processing package"
        );

        Ok(Self {
            main_part,
            document,
            relationships,
        })
    }

    /// Archive path of the main document part (e.g. `word/document.xml`).
    pub fn main_part(&self) -> &str {
        &self.main_part
    }

    /// XML text of the main document part.
    pub fn document_xml(&self) -> &str {
        &self.document
    }

    /// Relationship table of the main document part.
    pub fn relationships(&self) -> &RelationshipTable {
        &self.relationships
    }
}

/// Locate the main document part via the package relationships, falling
/// back to the conventional location when `_rels/.rels` is absent.
fn find_main_part<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<String> {
    let Some(content) = read_archive_text(archive, PACKAGE_RELS)? else {
        return Ok(DEFAULT_MAIN_PART.to_string());
    };

    let package_rels = RelationshipTable::parse(&content)?;
    let target = package_rels
        .iter()
        .find(|rel| rel.is_office_document())
        .map(|rel| rel.target.as_str())
        .ok_or_else(|| Error::InvalidDocx("no officeDocument relationship".into()))?;

    Ok(normalize_part_name(target))
}

/// Read a text part, `None` if the archive has no such entry.
fn read_archive_text<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<Option<String>> {
    let mut file = match archive.by_name(path) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(Some(decode_part(&bytes).into_owned()))
}

/// Strip the leading slash and `./` segments from a package-relative target.
fn normalize_part_name(target: &str) -> String {
    let mut name = target.trim_start_matches('/');
    while let Some(rest) = name.strip_prefix("./") {
        name = rest;
    }
    name.to_string()
}

/// `word/document.xml` -> `word/_rels/document.xml.rels`.
fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}
