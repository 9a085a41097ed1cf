//! Document builders shared by the integration tests.
#![allow(dead_code)]

use std::io::{Cursor, Write};

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const HYPERLINK_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
const STYLES_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

/// Wrap body paragraphs in a `w:document`.
pub fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <w:body>{body}</w:body>
</w:document>"#
    )
}

/// A paragraph with a single plain run.
pub fn paragraph(text: &str) -> String {
    format!("<w:p><w:r><w:t xml:space=\"preserve\">{text}</w:t></w:r></w:p>")
}

/// A paragraph holding one `w:hyperlink` element.
pub fn hyperlink_paragraph(rel_id: &str, label: &str) -> String {
    format!(
        "<w:p><w:hyperlink r:id=\"{rel_id}\"><w:r><w:rPr><w:rStyle w:val=\"Hyperlink\"/></w:rPr>\
         <w:t>{label}</w:t></w:r></w:hyperlink></w:p>"
    )
}

/// Build a `word/_rels/document.xml.rels` part. Every `(id, target)` pair
/// becomes an external hyperlink relationship; a styles relationship is
/// always present.
pub fn document_rels(hyperlinks: &[(&str, &str)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
    );
    xml.push_str(&format!(
        "  <Relationship Id=\"rIdStyles\" Type=\"{STYLES_TYPE}\" Target=\"styles.xml\"/>\n"
    ));
    for (id, target) in hyperlinks {
        xml.push_str(&format!(
            "  <Relationship Id=\"{id}\" Type=\"{HYPERLINK_TYPE}\" Target=\"{target}\" TargetMode=\"External\"/>\n"
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// Zip up a minimal DOCX package.
pub fn build_docx(document: &str, rels: &str) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/document.xml", document),
        ("word/_rels/document.xml.rels", rels),
    ];
    for (name, content) in parts {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

/// A line of text drawn at `(x, y)` in 12pt Helvetica, WinAnsi-encoded.
pub struct TextLine<'a> {
    pub x: i64,
    pub y: i64,
    pub text: &'a str,
}

/// A `/URI` link annotation over `rect` (`[llx, lly, urx, ury]`).
pub struct UriLink<'a> {
    pub rect: [i64; 4],
    pub uri: &'a str,
}

/// Page content for [`build_pdf`].
#[derive(Default)]
pub struct PageSpec<'a> {
    pub lines: Vec<TextLine<'a>>,
    pub links: Vec<UriLink<'a>>,
    /// Point `/Contents` at an object that does not exist.
    pub missing_contents: bool,
}

/// Object id no builder document ever allocates.
const MISSING_OBJECT: (u32, u16) = (9999, 0);

/// Build a PDF with one page per [`PageSpec`].
pub fn build_pdf(pages: &[PageSpec<'_>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let mut operations = Vec::new();
        for line in &page.lines {
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![line.x.into(), line.y.into()]),
                Operation::new("Tj", vec![Object::string_literal(win_ansi(line.text))]),
                Operation::new("ET", vec![]),
            ]);
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

        let annots: Vec<Object> = page
            .links
            .iter()
            .map(|link| {
                let rect: Vec<Object> = link.rect.iter().map(|&v| v.into()).collect();
                doc.add_object(dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Link",
                    "Rect" => rect,
                    "Border" => vec![0.into(), 0.into(), 0.into()],
                    "A" => dictionary! {
                        "S" => "URI",
                        "URI" => Object::string_literal(link.uri),
                    },
                })
                .into()
            })
            .collect();

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => if page.missing_contents { MISSING_OBJECT } else { content_id },
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        };
        if !annots.is_empty() {
            page_dict.set("Annots", annots);
        }
        kids.push(doc.add_object(page_dict).into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn win_ansi(text: &str) -> Vec<u8> {
    let (bytes, _, unmappable) = encoding_rs::WINDOWS_1252.encode(text);
    assert!(!unmappable, "{text:?} is not WinAnsi text");
    bytes.into_owned()
}
