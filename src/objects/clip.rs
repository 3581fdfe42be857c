use std::fmt;

use super::{dry_layout_proxy, layout_proxy, RenderBox};
use crate::error::Result;
use crate::geometry::{Offset, Rect};
use crate::layout::{BoxConstraints, Size};
use crate::painting::{BorderRadius, Clip, PaintingContext, Path, RRect};
use crate::tree::{DirtyFlags, NodeId, Tree};

macro_rules! proxy_layout {
    () => {
        fn perform_layout(&mut self, tree: &mut Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
            layout_proxy(tree, id, constraints)
        }

        fn dry_layout(&self, tree: &Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
            dry_layout_proxy(tree, id, constraints)
        }
    };
}

fn set_clip(current: &mut Clip, clip: Clip) -> DirtyFlags {
    if *current == clip {
        return DirtyFlags::empty();
    }
    *current = clip;
    DirtyFlags::NEEDS_PAINT
}

/// Clips its child to its own bounds.
#[derive(Debug, Clone)]
pub struct ClipRect {
    clip: Clip,
}

impl ClipRect {
    pub fn new(clip: Clip) -> Self {
        Self { clip }
    }

    pub fn set_clip(&mut self, clip: Clip) -> DirtyFlags {
        set_clip(&mut self.clip, clip)
    }
}

impl Default for ClipRect {
    fn default() -> Self {
        Self::new(Clip::HardEdge)
    }
}

impl RenderBox for ClipRect {
    proxy_layout!();

    fn paint(&self, tree: &Tree, id: NodeId, ctx: &mut PaintingContext<'_>, offset: Offset) -> Result<()> {
        let rect = Rect::from_offset_size(offset, tree.size(id)?);
        ctx.clip_rect_and_paint(self.clip, rect, |ctx| tree.paint_children(id, ctx, offset))
    }
}

/// Clips its child to its bounds with rounded corners.
#[derive(Debug, Clone)]
pub struct ClipRRect {
    radius: BorderRadius,
    clip: Clip,
}

impl ClipRRect {
    pub fn new(radius: impl Into<BorderRadius>) -> Self {
        Self {
            radius: radius.into(),
            clip: Clip::AntiAlias,
        }
    }

    pub fn with_clip(mut self, clip: Clip) -> Self {
        self.clip = clip;
        self
    }

    pub fn set_radius(&mut self, radius: impl Into<BorderRadius>) -> DirtyFlags {
        let radius = radius.into();
        if radius == self.radius {
            return DirtyFlags::empty();
        }
        self.radius = radius;
        DirtyFlags::NEEDS_PAINT
    }

    pub fn set_clip(&mut self, clip: Clip) -> DirtyFlags {
        set_clip(&mut self.clip, clip)
    }
}

impl RenderBox for ClipRRect {
    proxy_layout!();

    fn paint(&self, tree: &Tree, id: NodeId, ctx: &mut PaintingContext<'_>, offset: Offset) -> Result<()> {
        let rrect = RRect::new(Rect::from_offset_size(offset, tree.size(id)?), self.radius);
        ctx.clip_rrect_and_paint(self.clip, rrect, |ctx| tree.paint_children(id, ctx, offset))
    }

    fn hit_region_contains(&self, size: Size, position: Offset) -> bool {
        if self.clip.is_none() {
            return size.contains(position);
        }
        RRect::new(Rect::from_size(size), self.radius).contains(position)
    }
}

/// Builds a clip path for a box of the given size, in local coordinates.
pub type Clipper = Box<dyn Fn(Size) -> Path>;

/// Clips its child to an arbitrary path.
pub struct ClipPath {
    clipper: Clipper,
    clip: Clip,
}

impl ClipPath {
    pub fn new(clipper: impl Fn(Size) -> Path + 'static) -> Self {
        Self {
            clipper: Box::new(clipper),
            clip: Clip::AntiAlias,
        }
    }

    /// Clip to the oval inscribed in the box.
    pub fn oval() -> Self {
        Self::new(|size| {
            let mut path = Path::new();
            path.add_oval(Rect::from_size(size));
            path
        })
    }

    pub fn with_clip(mut self, clip: Clip) -> Self {
        self.clip = clip;
        self
    }

    /// A new clipper may produce a different path for the same size.
    pub fn set_clipper(&mut self, clipper: impl Fn(Size) -> Path + 'static) -> DirtyFlags {
        self.clipper = Box::new(clipper);
        DirtyFlags::NEEDS_PAINT
    }

    pub fn set_clip(&mut self, clip: Clip) -> DirtyFlags {
        set_clip(&mut self.clip, clip)
    }

    pub fn path_for(&self, size: Size) -> Path {
        (self.clipper)(size)
    }
}

impl fmt::Debug for ClipPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipPath")
            .field("clip", &self.clip)
            .finish_non_exhaustive()
    }
}

impl RenderBox for ClipPath {
    proxy_layout!();

    fn paint(&self, tree: &Tree, id: NodeId, ctx: &mut PaintingContext<'_>, offset: Offset) -> Result<()> {
        let path = self.path_for(tree.size(id)?).shift(offset);
        ctx.clip_path_and_paint(self.clip, &path, |ctx| tree.paint_children(id, ctx, offset))
    }

    fn hit_region_contains(&self, size: Size, position: Offset) -> bool {
        if self.clip.is_none() {
            return size.contains(position);
        }
        size.contains(position) && self.path_for(size).contains(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit_test::HitTestResult;
    use crate::objects::ColoredBox;
    use crate::painting::{Color, DrawCommand, RecordingSurface};

    fn clipped(clip: impl Into<crate::objects::RenderObject>) -> (Tree, NodeId, NodeId) {
        let mut tree = Tree::new();
        let node = tree.insert_node(clip);
        let child = tree.insert_node(ColoredBox::new(Color::RED));
        tree.append_child(node, child).unwrap();
        tree.layout(node, BoxConstraints::tight(Size::new(100.0, 100.0)), false)
            .unwrap();
        (tree, node, child)
    }

    #[test]
    fn test_clip_rect_wraps_child_paint() {
        let (tree, node, _) = clipped(ClipRect::default());
        let mut surface = RecordingSurface::new();
        let mut ctx = PaintingContext::new(&mut surface);
        tree.paint_node(node, &mut ctx, Offset::new(10.0, 0.0)).unwrap();
        drop(ctx);

        let commands = surface.commands();
        assert_eq!(commands[0], DrawCommand::Save);
        assert_eq!(
            commands[1],
            DrawCommand::ClipRect {
                rect: Rect::new(10.0, 0.0, 100.0, 100.0),
                anti_alias: false
            }
        );
        assert_eq!(commands.last(), Some(&DrawCommand::Restore));
        assert_eq!(surface.depth(), 0);
    }

    #[test]
    fn test_clip_path_limits_hits() {
        let (tree, node, child) = clipped(ClipPath::oval());

        let mut corner = HitTestResult::new();
        assert!(!tree.hit_test(node, &mut corner, Offset::new(2.0, 2.0)).unwrap());
        assert!(corner.is_empty());

        let mut center = HitTestResult::new();
        assert!(tree.hit_test(node, &mut center, Offset::new(50.0, 50.0)).unwrap());
        assert_eq!(center.path(), vec![child, node]);
    }

    #[test]
    fn test_clip_path_is_shifted_to_offset() {
        let (tree, node, _) = clipped(ClipPath::oval().with_clip(Clip::HardEdge));
        let mut surface = RecordingSurface::new();
        let mut ctx = PaintingContext::new(&mut surface);
        tree.paint_node(node, &mut ctx, Offset::new(100.0, 0.0)).unwrap();
        drop(ctx);

        let DrawCommand::ClipPath { path, anti_alias } = &surface.commands()[1] else {
            panic!("expected a path clip");
        };
        assert!(!anti_alias);
        assert!(path.contains(Offset::new(150.0, 50.0)));
        assert!(!path.contains(Offset::new(50.0, 50.0)));
    }
}
