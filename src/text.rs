//! Text styles and the measurement contract paragraphs lay out with.

use std::ops::Range;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Weight};

use crate::geometry::Rect;
use crate::layout::Size;
use crate::painting::Color;

/// Font family to shape with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FontFamily {
    #[default]
    SansSerif,
    Serif,
    Monospace,
    Cursive,
    Fantasy,
    /// Custom font by name
    Name(String),
}

impl FontFamily {
    pub fn to_cosmic(&self) -> Family<'_> {
        match self {
            FontFamily::SansSerif => Family::SansSerif,
            FontFamily::Serif => Family::Serif,
            FontFamily::Monospace => Family::Monospace,
            FontFamily::Cursive => Family::Cursive,
            FontFamily::Fantasy => Family::Fantasy,
            FontFamily::Name(name) => Family::Name(name),
        }
    }
}

/// Font weight on a 100-900 scale, matching CSS font-weight values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const THIN: Self = Self(100);
    pub const LIGHT: Self = Self(300);
    pub const NORMAL: Self = Self(400);
    pub const MEDIUM: Self = Self(500);
    pub const SEMI_BOLD: Self = Self(600);
    pub const BOLD: Self = Self(700);
    pub const BLACK: Self = Self(900);

    pub fn to_cosmic(self) -> Weight {
        Weight(self.0)
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    /// Line height as a multiple of the font size
    pub line_height: f32,
    pub color: Color,
    pub family: FontFamily,
    pub weight: FontWeight,
}

impl TextStyle {
    pub fn new(font_size: f32) -> Self {
        Self {
            font_size,
            ..Self::default()
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn family(mut self, family: FontFamily) -> Self {
        self.family = family;
        self
    }

    pub fn weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    /// Height of one line in logical pixels.
    pub fn line_extent(&self) -> f32 {
        self.font_size * self.line_height
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            line_height: 1.2,
            color: Color::BLACK,
            family: FontFamily::default(),
            weight: FontWeight::default(),
        }
    }
}

/// Measures styled text for layout.
///
/// Ranges are byte ranges into `text`.
pub trait TextMeasurer {
    /// Size of `text` laid out between `min_width` and `max_width`
    /// (which may be infinite).
    fn measure(&mut self, text: &str, style: &TextStyle, min_width: f32, max_width: f32) -> Size;

    /// One rect per line covered by `range`, relative to the text origin.
    fn boxes_for_range(
        &mut self,
        text: &str,
        style: &TextStyle,
        max_width: f32,
        range: Range<usize>,
    ) -> Vec<Rect>;
}

fn clamp_width(width: f32, min_width: f32, max_width: f32) -> f32 {
    let width = width.max(min_width);
    if max_width.is_finite() {
        width.min(max_width)
    } else {
        width
    }
}

/// Text measurement with cosmic-text shaping and the system fonts.
pub struct CosmicTextMeasurer {
    font_system: FontSystem,
}

impl CosmicTextMeasurer {
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
        }
    }

    fn shape(&mut self, text: &str, style: &TextStyle, max_width: f32) -> Buffer {
        let metrics = Metrics::new(style.font_size, style.line_extent());
        let mut buffer = Buffer::new(&mut self.font_system, metrics);

        let width = max_width.is_finite().then_some(max_width);
        buffer.set_size(&mut self.font_system, width, None);
        buffer.set_text(
            &mut self.font_system,
            text,
            &Attrs::new()
                .family(style.family.to_cosmic())
                .weight(style.weight.to_cosmic()),
            Shaping::Advanced,
            None,
        );
        buffer.shape_until_scroll(&mut self.font_system, true);
        buffer
    }
}

impl Default for CosmicTextMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasurer for CosmicTextMeasurer {
    fn measure(&mut self, text: &str, style: &TextStyle, min_width: f32, max_width: f32) -> Size {
        let buffer = self.shape(text, style, max_width);

        let mut width = 0.0f32;
        let mut height = 0.0f32;
        for run in buffer.layout_runs() {
            width = width.max(run.line_w);
            height += run.line_height;
        }

        // Empty text still occupies one line
        if height == 0.0 {
            height = style.line_extent();
        }

        Size::new(clamp_width(width, min_width, max_width), height)
    }

    fn boxes_for_range(
        &mut self,
        text: &str,
        style: &TextStyle,
        max_width: f32,
        range: Range<usize>,
    ) -> Vec<Rect> {
        let buffer = self.shape(text, style, max_width);

        let mut boxes = Vec::new();
        for run in buffer.layout_runs() {
            let mut left = f32::INFINITY;
            let mut right = f32::NEG_INFINITY;
            for glyph in run.glyphs.iter() {
                if glyph.start < range.end && glyph.end > range.start {
                    left = left.min(glyph.x);
                    right = right.max(glyph.x + glyph.w);
                }
            }
            if left <= right {
                boxes.push(Rect::new(left, run.line_top, right - left, run.line_height));
            }
        }
        boxes
    }
}

/// Deterministic measurer: every character advances by
/// `font_size * advance`, lines wrap greedily at spaces.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasurer {
    pub advance: f32,
}

impl MonospaceMeasurer {
    pub fn new() -> Self {
        Self { advance: 0.6 }
    }

    pub fn with_advance(advance: f32) -> Self {
        Self { advance }
    }

    fn char_width(&self, style: &TextStyle) -> f32 {
        style.font_size * self.advance
    }

    /// Byte ranges of the laid-out lines.
    fn lines(&self, text: &str, style: &TextStyle, max_width: f32) -> Vec<Range<usize>> {
        let char_width = self.char_width(style);
        let columns = if max_width.is_finite() && char_width > 0.0 {
            Some(((max_width / char_width).floor() as usize).max(1))
        } else {
            None
        };

        let mut lines = Vec::new();
        let mut base = 0;
        for paragraph in text.split('\n') {
            wrap_paragraph(paragraph, base, columns, &mut lines);
            base += paragraph.len() + 1;
        }
        lines
    }
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

fn wrap_paragraph(paragraph: &str, base: usize, columns: Option<usize>, lines: &mut Vec<Range<usize>>) {
    let Some(columns) = columns else {
        lines.push(base..base + paragraph.len());
        return;
    };

    // (start, end, chars) of the line being filled
    let mut line: Option<(usize, usize, usize)> = None;
    let mut pos = base;

    for word in paragraph.split(' ') {
        let start = pos;
        let end = start + word.len();
        pos = end + 1;
        let chars = word.chars().count();

        if let Some((line_start, line_end, line_chars)) = line {
            if line_chars + 1 + chars <= columns {
                line = Some((line_start, end, line_chars + 1 + chars));
                continue;
            }
            lines.push(line_start..line_end);
        }

        // Words wider than a line are broken at the column limit
        let starts: Vec<usize> = word.char_indices().map(|(i, _)| start + i).collect();
        let mut chunk_start = start;
        let mut consumed = 0;
        while chars - consumed > columns {
            let chunk_end = starts[consumed + columns];
            lines.push(chunk_start..chunk_end);
            chunk_start = chunk_end;
            consumed += columns;
        }
        line = Some((chunk_start, end, chars - consumed));
    }

    if let Some((line_start, line_end, _)) = line {
        lines.push(line_start..line_end);
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&mut self, text: &str, style: &TextStyle, min_width: f32, max_width: f32) -> Size {
        let char_width = self.char_width(style);
        let lines = self.lines(text, style, max_width);

        let width = lines
            .iter()
            .map(|range| text[range.clone()].chars().count() as f32 * char_width)
            .fold(0.0f32, f32::max);
        let height = lines.len().max(1) as f32 * style.line_extent();

        Size::new(clamp_width(width, min_width, max_width), height)
    }

    fn boxes_for_range(
        &mut self,
        text: &str,
        style: &TextStyle,
        max_width: f32,
        range: Range<usize>,
    ) -> Vec<Rect> {
        let char_width = self.char_width(style);
        let line_height = style.line_extent();

        self.lines(text, style, max_width)
            .into_iter()
            .enumerate()
            .filter_map(|(index, line)| {
                let start = line.start.max(range.start);
                let end = line.end.min(range.end);
                if start >= end {
                    return None;
                }
                let column = text.get(line.start..start)?.chars().count() as f32;
                let count = text.get(start..end)?.chars().count() as f32;
                Some(Rect::new(
                    column * char_width,
                    index as f32 * line_height,
                    count * char_width,
                    line_height,
                ))
            })
            .collect()
    }
}
