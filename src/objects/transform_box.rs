use super::{dry_layout_proxy, layout_proxy, RenderBox};
use crate::alignment::Alignment;
use crate::error::Result;
use crate::geometry::Offset;
use crate::hit_test::HitTestResult;
use crate::layout::{BoxConstraints, Size};
use crate::painting::PaintingContext;
use crate::transform::Transform;
use crate::tree::{DirtyFlags, NodeId, Tree};

/// Applies a transform to its child when painting and hit testing.
///
/// Layout is unaffected. The transform pivots on `origin` plus the point
/// `alignment` picks inside the box; with neither set it pivots on the
/// top-left corner.
#[derive(Debug, Clone)]
pub struct TransformBox {
    transform: Transform,
    origin: Option<Offset>,
    alignment: Option<Alignment>,
}

impl TransformBox {
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            origin: None,
            alignment: None,
        }
    }

    pub fn with_origin(mut self, origin: Offset) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) -> DirtyFlags {
        if transform == self.transform {
            return DirtyFlags::empty();
        }
        self.transform = transform;
        DirtyFlags::NEEDS_PAINT
    }

    pub fn set_origin(&mut self, origin: Option<Offset>) -> DirtyFlags {
        if origin == self.origin {
            return DirtyFlags::empty();
        }
        self.origin = origin;
        DirtyFlags::NEEDS_PAINT
    }

    pub fn set_alignment(&mut self, alignment: Option<Alignment>) -> DirtyFlags {
        if alignment == self.alignment {
            return DirtyFlags::empty();
        }
        self.alignment = alignment;
        DirtyFlags::NEEDS_PAINT
    }

    /// The transform in local coordinates, pivot applied.
    pub fn effective_transform(&self, size: Size) -> Transform {
        let mut pivot = self.origin.unwrap_or(Offset::ZERO);
        if let Some(alignment) = self.alignment {
            pivot += alignment.along_size(size);
        }
        if pivot.is_zero() {
            self.transform
        } else {
            self.transform.about(pivot)
        }
    }
}

impl RenderBox for TransformBox {
    fn perform_layout(&mut self, tree: &mut Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        layout_proxy(tree, id, constraints)
    }

    fn dry_layout(&self, tree: &Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        dry_layout_proxy(tree, id, constraints)
    }

    fn paint(&self, tree: &Tree, id: NodeId, ctx: &mut PaintingContext<'_>, offset: Offset) -> Result<()> {
        let transform = self.effective_transform(tree.size(id)?);
        if let Some(translation) = transform.as_translation() {
            return tree.paint_children(id, ctx, offset + translation);
        }
        ctx.push_transform(offset, &transform, |ctx| tree.paint_children(id, ctx, offset))
    }

    fn hit_test(&self, tree: &Tree, id: NodeId, result: &mut HitTestResult, position: Offset) -> Result<bool> {
        let size = tree.size(id)?;
        // A singular transform collapses the child to nothing
        let Some(inverse) = self.effective_transform(size).try_inverse() else {
            return Ok(false);
        };

        // The box itself is hit where it paints, in transformed space
        let local = inverse.transform_point(position);
        if tree.hit_test_children(id, result, local)? || size.contains(local) {
            result.add(id, position);
            return Ok(true);
        }
        Ok(false)
    }
}
