//! Hyperlink discovery in the main document part (`word/document.xml`).
//!
//! Two markup patterns carry hyperlinks in WordprocessingML:
//!
//! - `<w:hyperlink r:id="...">` elements whose id resolves through the
//!   part's relationship table, with the label spread over nested runs.
//! - `HYPERLINK "url"` fields, either complex (`w:fldChar` begin / separate /
//!   end around `w:instrText`) or simple (`w:fldSimple w:instr="..."`), whose
//!   result runs carry the `Hyperlink` character style.
//!
//! Both are reported in document order. Runs inside a `w:hyperlink` belong
//! to that element only, so a span is never reported twice.

use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;
use tracing::debug;

use crate::docx::rels::RelationshipTable;
use crate::error::Result;
use crate::link::Hyperlink;
use crate::xml::{attr_value, local_name, resolve_reference};

/// Character style id Word assigns to hyperlink runs.
const HYPERLINK_STYLE: &str = "Hyperlink";

static HYPERLINK_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"HYPERLINK\s+"([^"]*)""#).expect("HYPERLINK field pattern is valid")
});

/// Target of a `HYPERLINK "url"` field instruction.
pub fn hyperlink_field_target(instruction: &str) -> Option<&str> {
    HYPERLINK_FIELD
        .captures(instruction)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|url| !url.is_empty())
}

/// Walk `document` and return hyperlinks in document order.
pub fn correlated_links(document: &str, rels: &RelationshipTable) -> Result<Vec<Hyperlink>> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(false);

    let mut walker = Walker::new(rels);

    loop {
        match reader.read_event()? {
            Event::Start(e) => walker.start(&e)?,
            Event::Empty(e) => walker.empty(&e)?,
            Event::End(e) => walker.end(local_name(e.name().as_ref())),
            Event::Text(e) => walker.text(&String::from_utf8_lossy(e.as_ref())),
            Event::GeneralRef(e) => {
                if let Some(resolved) = resolve_reference(&e)? {
                    walker.text(&resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(walker.links)
}

/// An open `w:hyperlink` element.
struct HyperlinkSpan {
    rel_id: Option<String>,
    anchor: Option<String>,
    label: String,
}

/// An open field (complex or simple).
#[derive(Default)]
struct FieldState {
    instruction: String,
    /// Past the `separate` marker (always true for simple fields).
    in_result: bool,
    label: String,
    styled_runs: usize,
}

#[derive(Default)]
struct RunState {
    styled: bool,
    text: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum TextSink {
    None,
    RunText,
    Instruction,
}

struct Walker<'a> {
    rels: &'a RelationshipTable,
    links: Vec<Hyperlink>,
    hyperlink: Option<HyperlinkSpan>,
    /// `w:hyperlink` elements nested inside the open one.
    nested_hyperlinks: usize,
    fields: Vec<FieldState>,
    /// Open runs. Text box content puts whole runs inside a run.
    runs: Vec<RunState>,
    sink: TextSink,
    /// Depth inside an `mc:Fallback` subtree, whose content duplicates the
    /// preceding `mc:Choice`.
    fallback_depth: usize,
}

impl<'a> Walker<'a> {
    fn new(rels: &'a RelationshipTable) -> Self {
        Self {
            rels,
            links: Vec::new(),
            hyperlink: None,
            nested_hyperlinks: 0,
            fields: Vec::new(),
            runs: Vec::new(),
            sink: TextSink::None,
            fallback_depth: 0,
        }
    }

    fn start(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let name = e.name();
        let local = local_name(name.as_ref());

        if self.fallback_depth > 0 {
            self.fallback_depth += 1;
            return Ok(());
        }

        match local {
            b"Fallback" => self.fallback_depth = 1,
            b"hyperlink" => self.open_hyperlink(e)?,
            b"r" => self.runs.push(RunState::default()),
            b"t" if !self.runs.is_empty() => self.sink = TextSink::RunText,
            b"instrText" => self.sink = TextSink::Instruction,
            b"fldSimple" => {
                self.fields.push(FieldState {
                    instruction: attr_value(e, b"instr")?.unwrap_or_default(),
                    in_result: true,
                    ..FieldState::default()
                });
            }
            b"rStyle" => self.run_style(e)?,
            _ => {}
        }
        Ok(())
    }

    fn empty(&mut self, e: &BytesStart<'_>) -> Result<()> {
        if self.fallback_depth > 0 {
            return Ok(());
        }

        let name = e.name();
        match local_name(name.as_ref()) {
            b"hyperlink" => {
                self.open_hyperlink(e)?;
                self.close_hyperlink();
            }
            b"rStyle" => self.run_style(e)?,
            b"fldChar" => {
                let kind = attr_value(e, b"fldCharType")?;
                match kind.as_deref() {
                    Some("begin") => self.fields.push(FieldState::default()),
                    Some("separate") => {
                        if let Some(field) = self.fields.last_mut() {
                            field.in_result = true;
                        }
                    }
                    Some("end") => self.close_field(),
                    _ => {}
                }
            }
            b"tab" => self.push_run_char('\t'),
            b"br" | b"cr" => self.push_run_char('\n'),
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, local: &[u8]) {
        if self.fallback_depth > 0 {
            self.fallback_depth -= 1;
            return;
        }

        match local {
            b"t" | b"instrText" => self.sink = TextSink::None,
            b"r" => self.close_run(),
            b"hyperlink" => self.close_hyperlink(),
            b"fldSimple" => self.close_field(),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.fallback_depth > 0 {
            return;
        }

        match self.sink {
            TextSink::RunText => {
                if let Some(run) = self.runs.last_mut() {
                    run.text.push_str(text);
                }
            }
            TextSink::Instruction => {
                if let Some(field) = self.fields.last_mut() {
                    field.instruction.push_str(text);
                }
            }
            TextSink::None => {}
        }
    }

    fn push_run_char(&mut self, c: char) {
        if let Some(run) = self.runs.last_mut() {
            run.text.push(c);
        }
    }

    fn run_style(&mut self, e: &BytesStart<'_>) -> Result<()> {
        if let Some(run) = self.runs.last_mut()
            && attr_value(e, b"val")?.as_deref() == Some(HYPERLINK_STYLE)
        {
            run.styled = true;
        }
        Ok(())
    }

    fn close_run(&mut self) {
        let Some(run) = self.runs.pop() else {
            return;
        };

        // Inner run text stays in document order within the enclosing run.
        if let Some(outer) = self.runs.last_mut() {
            outer.text.push_str(&run.text);
            outer.styled |= run.styled;
            return;
        }

        if let Some(span) = self.hyperlink.as_mut() {
            span.label.push_str(&run.text);
        } else if run.styled
            && let Some(field) = self.fields.last_mut()
            && field.in_result
        {
            field.label.push_str(&run.text);
            field.styled_runs += 1;
        }
    }

    fn open_hyperlink(&mut self, e: &BytesStart<'_>) -> Result<()> {
        if self.hyperlink.is_some() {
            self.nested_hyperlinks += 1;
            return Ok(());
        }

        self.hyperlink = Some(HyperlinkSpan {
            rel_id: attr_value(e, b"id")?,
            anchor: attr_value(e, b"anchor")?,
            label: String::new(),
        });
        Ok(())
    }

    fn close_hyperlink(&mut self) {
        if self.nested_hyperlinks > 0 {
            self.nested_hyperlinks -= 1;
            return;
        }

        let Some(span) = self.hyperlink.take() else {
            return;
        };

        let Some(rel_id) = span.rel_id else {
            debug!(anchor = ?span.anchor, "skipping internal hyperlink");
            return;
        };

        match self.rels.get(&rel_id).filter(|rel| rel.is_hyperlink()) {
            Some(rel) => {
                if !rel.is_external() {
                    debug!(rel_id = %rel_id, target = %rel.target, "hyperlink target is not marked external");
                }
                self.links.push(Hyperlink::new(span.label, rel.target.as_str()));
            }
            None => debug!(rel_id = %rel_id, "skipping unresolved hyperlink relationship"),
        }
    }

    fn close_field(&mut self) {
        let Some(field) = self.fields.pop() else {
            return;
        };

        if field.styled_runs == 0 {
            return;
        }

        if let Some(url) = hyperlink_field_target(&field.instruction) {
            self.links.push(Hyperlink::new(field.label, url));
        }
    }
}
