use super::{dry_layout_proxy, layout_proxy, RenderBox};
use crate::error::{Error, Result};
use crate::geometry::Offset;
use crate::layout::{BoxConstraints, Size};
use crate::painting::PaintingContext;
use crate::tree::{DirtyFlags, NodeId, Tree};

/// Paints its child partially transparent.
#[derive(Debug, Clone)]
pub struct Opacity {
    opacity: f32,
}

fn check_opacity(opacity: f32) -> Result<()> {
    if (0.0..=1.0).contains(&opacity) {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "opacity must be within [0, 1], got {opacity}"
        )))
    }
}

impl Opacity {
    pub fn new(opacity: f32) -> Result<Self> {
        check_opacity(opacity)?;
        Ok(Self { opacity })
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) -> Result<DirtyFlags> {
        check_opacity(opacity)?;
        if opacity == self.opacity {
            return Ok(DirtyFlags::empty());
        }
        self.opacity = opacity;
        Ok(DirtyFlags::NEEDS_PAINT)
    }
}

impl RenderBox for Opacity {
    fn perform_layout(&mut self, tree: &mut Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        layout_proxy(tree, id, constraints)
    }

    fn dry_layout(&self, tree: &Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        dry_layout_proxy(tree, id, constraints)
    }

    fn paint(&self, tree: &Tree, id: NodeId, ctx: &mut PaintingContext<'_>, offset: Offset) -> Result<()> {
        if self.opacity == 0.0 {
            return Ok(());
        }
        if self.opacity == 1.0 {
            return tree.paint_children(id, ctx, offset);
        }
        ctx.push_opacity(self.opacity, |ctx| tree.paint_children(id, ctx, offset))
    }
}
