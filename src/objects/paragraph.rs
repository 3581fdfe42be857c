use std::ops::Range;

use super::{ChildPolicy, RenderBox};
use crate::error::Result;
use crate::geometry::{Offset, Rect};
use crate::layout::{BoxConstraints, Size};
use crate::painting::{Clip, PaintingContext};
use crate::text::TextStyle;
use crate::tree::{DirtyFlags, NodeId, Tree};

/// What a paragraph does with text that does not fit its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextOverflow {
    #[default]
    Clip,
    Visible,
}

/// A run of styled text.
///
/// The text measurer decides the line breaks; the paragraph only clamps the
/// measured size into its constraints.
#[derive(Debug, Clone)]
pub struct Paragraph {
    text: String,
    style: TextStyle,
    overflow: TextOverflow,
    measured: Size,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
            overflow: TextOverflow::default(),
            measured: Size::zero(),
        }
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_overflow(mut self, overflow: TextOverflow) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    /// Size the text asked for in the last layout, before clamping.
    pub fn measured_size(&self) -> Size {
        self.measured
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> DirtyFlags {
        let text = text.into();
        if text == self.text {
            return DirtyFlags::empty();
        }
        self.text = text;
        DirtyFlags::NEEDS_LAYOUT
    }

    /// A color change repaints; anything else can move line breaks.
    pub fn set_style(&mut self, style: TextStyle) -> DirtyFlags {
        if style == self.style {
            return DirtyFlags::empty();
        }
        let color_only = TextStyle {
            color: style.color,
            ..self.style.clone()
        } == style;
        self.style = style;
        if color_only {
            DirtyFlags::NEEDS_PAINT
        } else {
            DirtyFlags::NEEDS_LAYOUT
        }
    }

    pub fn set_overflow(&mut self, overflow: TextOverflow) -> DirtyFlags {
        if overflow == self.overflow {
            return DirtyFlags::empty();
        }
        self.overflow = overflow;
        DirtyFlags::NEEDS_PAINT
    }

    /// Boxes covering the byte `range` of the text, laid out at the
    /// paragraph's committed width.
    pub fn boxes_for_range(&self, tree: &Tree, id: NodeId, range: Range<usize>) -> Result<Vec<Rect>> {
        let width = tree.size(id)?.width;
        Ok(tree.with_text_measurer(|measurer| {
            measurer.boxes_for_range(&self.text, &self.style, width, range)
        }))
    }

    fn overflows(&self, size: Size) -> bool {
        self.measured.width > size.width || self.measured.height > size.height
    }
}

impl RenderBox for Paragraph {
    fn child_policy(&self) -> ChildPolicy {
        ChildPolicy::None
    }

    fn perform_layout(&mut self, tree: &mut Tree, _id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        self.measured = tree.measure_text(
            &self.text,
            &self.style,
            constraints.min_width,
            constraints.max_width,
        );
        Ok(constraints.constrain(self.measured))
    }

    fn dry_layout(&self, tree: &Tree, _id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        let measured = tree.measure_text(
            &self.text,
            &self.style,
            constraints.min_width,
            constraints.max_width,
        );
        Ok(constraints.constrain(measured))
    }

    fn paint(&self, tree: &Tree, id: NodeId, ctx: &mut PaintingContext<'_>, offset: Offset) -> Result<()> {
        let size = tree.size(id)?;
        let text_rect = Rect::from_offset_size(offset, self.measured);
        if self.overflow == TextOverflow::Clip && self.overflows(size) {
            let bounds = Rect::from_offset_size(offset, size);
            return ctx.clip_rect_and_paint(Clip::HardEdge, bounds, |ctx| {
                ctx.surface().draw_text(&self.text, &self.style, text_rect);
                Ok(())
            });
        }
        ctx.surface().draw_text(&self.text, &self.style, text_rect);
        Ok(())
    }
}
