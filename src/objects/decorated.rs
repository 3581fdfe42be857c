use super::{dry_layout_proxy, layout_proxy, RenderBox};
use crate::error::Result;
use crate::geometry::{Offset, Rect};
use crate::layout::{BoxConstraints, Size};
use crate::painting::{BoxDecoration, Color, PaintingContext, RRect};
use crate::tree::{DirtyFlags, NodeId, Tree};

/// Fills its bounds with a solid color, then paints its child on top.
#[derive(Debug, Clone)]
pub struct ColoredBox {
    color: Color,
}

impl ColoredBox {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Appearance only: never affects layout.
    pub fn set_color(&mut self, color: Color) -> DirtyFlags {
        if color == self.color {
            return DirtyFlags::empty();
        }
        self.color = color;
        DirtyFlags::NEEDS_PAINT
    }
}

impl RenderBox for ColoredBox {
    fn perform_layout(&mut self, tree: &mut Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        layout_proxy(tree, id, constraints)
    }

    fn dry_layout(&self, tree: &Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        dry_layout_proxy(tree, id, constraints)
    }

    fn paint(&self, tree: &Tree, id: NodeId, ctx: &mut PaintingContext<'_>, offset: Offset) -> Result<()> {
        let size = tree.size(id)?;
        if !size.is_empty() {
            ctx.fill_rect(Rect::from_offset_size(offset, size), self.color);
        }
        tree.paint_children(id, ctx, offset)
    }
}

/// Paints a [`BoxDecoration`] behind its child.
#[derive(Debug, Clone)]
pub struct DecoratedBox {
    decoration: BoxDecoration,
}

impl DecoratedBox {
    pub fn new(decoration: BoxDecoration) -> Result<Self> {
        decoration.validate()?;
        Ok(Self { decoration })
    }

    pub fn decoration(&self) -> &BoxDecoration {
        &self.decoration
    }

    pub fn set_decoration(&mut self, decoration: BoxDecoration) -> Result<DirtyFlags> {
        decoration.validate()?;
        if decoration == self.decoration {
            return Ok(DirtyFlags::empty());
        }
        self.decoration = decoration;
        Ok(DirtyFlags::NEEDS_PAINT)
    }
}

impl RenderBox for DecoratedBox {
    fn perform_layout(&mut self, tree: &mut Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        layout_proxy(tree, id, constraints)
    }

    fn dry_layout(&self, tree: &Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        dry_layout_proxy(tree, id, constraints)
    }

    fn paint(&self, tree: &Tree, id: NodeId, ctx: &mut PaintingContext<'_>, offset: Offset) -> Result<()> {
        let size = tree.size(id)?;
        let rect = Rect::from_offset_size(offset, size);
        let radius = self.decoration.border_radius;

        if let Some(fill) = self.decoration.background() {
            ctx.fill_rounded(rect, radius, fill);
        }
        if let Some(border) = self.decoration.border {
            if border.width > 0.0 {
                ctx.stroke_rounded(rect, radius, border);
            }
        }
        tree.paint_children(id, ctx, offset)
    }

    fn hit_region_contains(&self, size: Size, position: Offset) -> bool {
        RRect::new(Rect::from_size(size), self.decoration.border_radius).contains(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::painting::{BorderRadius, DrawCommand, Fill, LinearGradient, RecordingSurface};

    fn paint(tree: &Tree, id: NodeId, offset: Offset) -> RecordingSurface {
        let mut surface = RecordingSurface::new();
        let mut ctx = PaintingContext::new(&mut surface);
        tree.paint_node(id, &mut ctx, offset).unwrap();
        drop(ctx);
        surface
    }

    #[test]
    fn test_colored_box_without_child_takes_smallest() {
        let mut tree = Tree::new();
        let node = tree.insert_node(ColoredBox::new(Color::RED));
        let size = tree
            .layout(node, BoxConstraints::new(10.0, 20.0, 100.0, 100.0), false)
            .unwrap();
        assert_eq!(size, Size::new(10.0, 20.0));

        let surface = paint(&tree, node, Offset::new(5.0, 5.0));
        assert_eq!(surface.filled_rects(), vec![Rect::new(5.0, 5.0, 10.0, 20.0)]);
    }

    #[test]
    fn test_set_color_only_needs_paint() {
        let mut colored = ColoredBox::new(Color::RED);
        assert_eq!(colored.set_color(Color::BLACK), DirtyFlags::NEEDS_PAINT);
        assert_eq!(colored.set_color(Color::BLACK), DirtyFlags::empty());
    }

    #[test]
    fn test_decorated_box_paints_rounded_background_and_border() {
        let decoration = BoxDecoration::new()
            .gradient(LinearGradient::vertical(Color::WHITE, Color::BLACK))
            .border(crate::painting::Border::new(2.0, Color::RED))
            .border_radius(8.0);
        let mut tree = Tree::new();
        let node = tree.insert_node(DecoratedBox::new(decoration).unwrap());
        tree.layout(node, BoxConstraints::tight(Size::new(40.0, 40.0)), false)
            .unwrap();

        let surface = paint(&tree, node, Offset::ZERO);
        let commands = surface.commands();
        assert_eq!(commands.len(), 2);
        assert!(matches!(
            commands[0],
            DrawCommand::FillRRect {
                fill: Fill::Gradient(_),
                ..
            }
        ));
        assert!(matches!(commands[1], DrawCommand::StrokeRRect { .. }));
    }

    #[test]
    fn test_decorated_box_rejects_color_with_gradient() {
        let decoration = BoxDecoration::new()
            .color(Color::RED)
            .gradient(LinearGradient::horizontal(Color::RED, Color::BLACK));
        assert!(DecoratedBox::new(decoration).is_err());
    }

    #[test]
    fn test_rounded_corners_are_not_hit() {
        let decorated = DecoratedBox::new(BoxDecoration::new().border_radius(BorderRadius::circular(20.0)))
            .unwrap();
        let size = Size::new(100.0, 100.0);
        assert!(!decorated.hit_region_contains(size, Offset::new(1.0, 1.0)));
        assert!(decorated.hit_region_contains(size, Offset::new(50.0, 50.0)));
    }
}
