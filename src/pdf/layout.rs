//! Approximate text layout from page content streams.
//!
//! Shown strings are decoded through the current font's encoding, and glyphs
//! advance by the font's declared widths. Fonts without widths (the standard
//! 14 usually) get half an em per glyph and a quarter for spaces, which is
//! close enough to tell whether a glyph falls inside a link rectangle. Codes
//! the font cannot decode advance but place nothing. Text drawn by form
//! XObjects is not visited.

use lopdf::Object;
use lopdf::content::{Content, Operation};

use super::fonts::{FontMap, PageFont};
use super::number;
use crate::error::Result;

const GLYPH_ADVANCE: f64 = 0.5;
const SPACE_ADVANCE: f64 = 0.25;
/// Glyph centre above the baseline, as a fraction of the font size.
const GLYPH_MID_HEIGHT: f64 = 0.35;

/// An axis-aligned rectangle in default user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    /// Build from two opposite corners in any order.
    pub fn new(ax: f64, ay: f64, bx: f64, by: f64) -> Self {
        Self {
            x0: ax.min(bx),
            y0: ay.min(by),
            x1: ax.max(bx),
            y1: ay.max(by),
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.x0..=self.x1).contains(&x) && (self.y0..=self.y1).contains(&y)
    }
}

/// A character placed on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedChar {
    pub ch: char,
    /// Centre of the glyph box in user space.
    pub x: f64,
    pub y: f64,
    /// Font size in user space.
    pub size: f64,
}

/// Text inside `rect`, in content-stream order, whitespace normalized.
///
/// A glyph is inside when its centre is. Glyphs on different lines are
/// joined by a space.
pub fn text_in_rect(chars: &[PlacedChar], rect: Rect) -> String {
    let mut text = String::new();
    let mut last: Option<&PlacedChar> = None;

    for placed in chars.iter().filter(|c| rect.contains(c.x, c.y)) {
        if let Some(prev) = last
            && (prev.y - placed.y).abs() > prev.size.max(placed.size) * 0.5
        {
            text.push(' ');
        }
        text.push(placed.ch);
        last = Some(placed);
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode a content stream and place its text, using `fonts` for the
/// resource names selected by `Tf`.
pub fn layout_content(content: &[u8], fonts: &FontMap<'_>) -> Result<Vec<PlacedChar>> {
    let content = Content::decode(content)?;
    let mut state = TextState::new(fonts);
    let mut chars = Vec::new();

    for op in &content.operations {
        state.apply(op, &mut chars);
    }

    Ok(chars)
}

/// Affine transform `[a b c d e f]` as used by PDF.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(tx: f64, ty: f64) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self` applied first, then `other`.
    fn then(self, other: Matrix) -> Matrix {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            e1 * a2 + f1 * c2 + e2,
            e1 * b2 + f1 * d2 + f2,
        ])
    }

    fn apply(self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.0;
        (x * a + y * c + e, x * b + y * d + f)
    }

    fn from_operands(operands: &[Object]) -> Option<Matrix> {
        if operands.len() != 6 {
            return None;
        }
        let mut m = [0.0; 6];
        for (slot, operand) in m.iter_mut().zip(operands) {
            *slot = number(operand)?;
        }
        Some(Matrix(m))
    }
}

#[derive(Clone, Copy)]
struct GraphicsState<'f> {
    ctm: Matrix,
    font: Option<&'f PageFont<'f>>,
    font_size: f64,
    leading: f64,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scale: f64,
    rise: f64,
}

impl Default for GraphicsState<'_> {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            font: None,
            font_size: 0.0,
            leading: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            rise: 0.0,
        }
    }
}

struct TextState<'f> {
    fonts: &'f FontMap<'f>,
    gs: GraphicsState<'f>,
    saved: Vec<GraphicsState<'f>>,
    text_matrix: Option<Matrix>,
    line_matrix: Option<Matrix>,
}

impl<'f> TextState<'f> {
    fn new(fonts: &'f FontMap<'f>) -> Self {
        Self {
            fonts,
            gs: GraphicsState::default(),
            saved: Vec::new(),
            text_matrix: None,
            line_matrix: None,
        }
    }

    fn apply(&mut self, op: &Operation, chars: &mut Vec<PlacedChar>) {
        let operands = op.operands.as_slice();
        let num = |i: usize| operands.get(i).and_then(number);

        match op.operator.as_str() {
            "q" => self.saved.push(self.gs),
            "Q" => {
                if let Some(gs) = self.saved.pop() {
                    self.gs = gs;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.gs.ctm = m.then(self.gs.ctm);
                }
            }
            "BT" => {
                self.text_matrix = Some(Matrix::IDENTITY);
                self.line_matrix = Some(Matrix::IDENTITY);
            }
            "ET" => {
                self.text_matrix = None;
                self.line_matrix = None;
            }
            "Tf" => {
                let fonts = self.fonts;
                self.gs.font = operands
                    .first()
                    .and_then(|name| name.as_name().ok())
                    .and_then(|name| fonts.get(name));
                if let Some(size) = num(1) {
                    self.gs.font_size = size;
                }
            }
            "TL" => self.gs.leading = num(0).unwrap_or(self.gs.leading),
            "Tc" => self.gs.char_spacing = num(0).unwrap_or(self.gs.char_spacing),
            "Tw" => self.gs.word_spacing = num(0).unwrap_or(self.gs.word_spacing),
            "Tz" => {
                self.gs.horizontal_scale = num(0).map(|s| s / 100.0).unwrap_or(1.0);
            }
            "Ts" => self.gs.rise = num(0).unwrap_or(self.gs.rise),
            "Td" => {
                if let (Some(tx), Some(ty)) = (num(0), num(1)) {
                    self.move_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (num(0), num(1)) {
                    self.gs.leading = -ty;
                    self.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.text_matrix = Some(m);
                    self.line_matrix = Some(m);
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes, chars);
                }
            }
            "'" => {
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes, chars);
                }
            }
            "\"" => {
                if let (Some(aw), Some(ac)) = (num(0), num(1)) {
                    self.gs.word_spacing = aw;
                    self.gs.char_spacing = ac;
                }
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    self.show(bytes, chars);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => self.show(bytes, chars),
                            other => {
                                if let Some(adjust) = number(other) {
                                    let tx = -adjust / 1000.0
                                        * self.gs.font_size
                                        * self.gs.horizontal_scale;
                                    self.advance(tx);
                                }
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        let line = Matrix::translate(tx, ty).then(self.line_matrix.unwrap_or(Matrix::IDENTITY));
        self.line_matrix = Some(line);
        self.text_matrix = Some(line);
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.gs.leading);
    }

    fn advance(&mut self, tx: f64) {
        if let Some(tm) = self.text_matrix {
            self.text_matrix = Some(Matrix::translate(tx, 0.0).then(tm));
        }
    }

    fn show(&mut self, bytes: &[u8], chars: &mut Vec<PlacedChar>) {
        // Text showing outside BT/ET is invalid; ignore it.
        if self.text_matrix.is_none() {
            return;
        }
        let gs = self.gs;
        let Some(font) = gs.font else {
            return;
        };

        for glyph in font.glyphs(bytes) {
            let Some(tm) = self.text_matrix else {
                return;
            };

            let em = glyph.width.unwrap_or(if glyph.word_space {
                SPACE_ADVANCE
            } else {
                GLYPH_ADVANCE
            });
            let width = em * gs.font_size * gs.horizontal_scale;
            let height = GLYPH_MID_HEIGHT * gs.font_size;

            let device = tm.then(gs.ctm);
            let (x, y) = device.apply(width / 2.0, gs.rise + height);
            let (_, top) = device.apply(0.0, gs.font_size);
            let (_, base) = device.apply(0.0, 0.0);
            let size = (top - base).abs();

            chars.extend(glyph.text.chars().map(|ch| PlacedChar { ch, x, y, size }));

            let mut tx = (em * gs.font_size + gs.char_spacing) * gs.horizontal_scale;
            if glyph.word_space {
                tx += gs.word_spacing * gs.horizontal_scale;
            }
            self.advance(tx);
        }
    }
}
