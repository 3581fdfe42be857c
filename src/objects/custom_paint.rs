use std::fmt;
use std::rc::Rc;

use super::{dry_layout_proxy, layout_proxy, RenderBox};
use crate::error::Result;
use crate::geometry::Offset;
use crate::layout::{BoxConstraints, Size};
use crate::painting::{DrawingSurface, PaintingContext};
use crate::transform::Transform;
use crate::tree::{DirtyFlags, NodeId, Tree};

/// Draws straight onto the surface. The origin is the node's top-left
/// corner and `size` is its laid-out size.
pub trait Painter {
    fn paint(&self, surface: &mut dyn DrawingSurface, size: Size);
}

impl<F> Painter for F
where
    F: Fn(&mut dyn DrawingSurface, Size),
{
    fn paint(&self, surface: &mut dyn DrawingSurface, size: Size) {
        self(surface, size)
    }
}

/// Runs a background painter below its child and a foreground painter
/// above it.
pub struct CustomPaint {
    painter: Option<Rc<dyn Painter>>,
    foreground_painter: Option<Rc<dyn Painter>>,
    preferred_size: Size,
}

impl CustomPaint {
    pub fn new() -> Self {
        Self {
            painter: None,
            foreground_painter: None,
            preferred_size: Size::zero(),
        }
    }

    pub fn painter(mut self, painter: impl Painter + 'static) -> Self {
        self.painter = Some(Rc::new(painter));
        self
    }

    pub fn foreground_painter(mut self, painter: impl Painter + 'static) -> Self {
        self.foreground_painter = Some(Rc::new(painter));
        self
    }

    /// Size to ask for when there is no child.
    pub fn preferred_size(mut self, size: Size) -> Self {
        self.preferred_size = size;
        self
    }

    pub fn set_painter(&mut self, painter: Option<Rc<dyn Painter>>) -> DirtyFlags {
        self.painter = painter;
        DirtyFlags::NEEDS_PAINT
    }

    pub fn set_foreground_painter(&mut self, painter: Option<Rc<dyn Painter>>) -> DirtyFlags {
        self.foreground_painter = painter;
        DirtyFlags::NEEDS_PAINT
    }

    pub fn set_preferred_size(&mut self, size: Size) -> DirtyFlags {
        if size == self.preferred_size {
            return DirtyFlags::empty();
        }
        self.preferred_size = size;
        DirtyFlags::NEEDS_LAYOUT
    }

    fn run(painter: &dyn Painter, ctx: &mut PaintingContext<'_>, offset: Offset, size: Size) -> Result<()> {
        ctx.push_transform(Offset::ZERO, &Transform::translate_offset(offset), |ctx| {
            painter.paint(ctx.surface(), size);
            Ok(())
        })
    }
}

impl Default for CustomPaint {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CustomPaint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomPaint")
            .field("painter", &self.painter.is_some())
            .field("foreground_painter", &self.foreground_painter.is_some())
            .field("preferred_size", &self.preferred_size)
            .finish()
    }
}

impl RenderBox for CustomPaint {
    fn perform_layout(&mut self, tree: &mut Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        if tree.first_child(id)?.is_none() {
            return Ok(constraints.constrain(self.preferred_size));
        }
        layout_proxy(tree, id, constraints)
    }

    fn dry_layout(&self, tree: &Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        if tree.first_child(id)?.is_none() {
            return Ok(constraints.constrain(self.preferred_size));
        }
        dry_layout_proxy(tree, id, constraints)
    }

    fn paint(&self, tree: &Tree, id: NodeId, ctx: &mut PaintingContext<'_>, offset: Offset) -> Result<()> {
        let size = tree.size(id)?;
        if let Some(painter) = &self.painter {
            Self::run(painter.as_ref(), ctx, offset, size)?;
        }
        tree.paint_children(id, ctx, offset)?;
        if let Some(painter) = &self.foreground_painter {
            Self::run(painter.as_ref(), ctx, offset, size)?;
        }
        Ok(())
    }
}
