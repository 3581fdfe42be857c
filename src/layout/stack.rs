use super::{BoxConstraints, Size, StackFit};
use crate::alignment::Alignment;
use crate::error::{Error, Result};
use crate::geometry::{Offset, Rect};
use crate::objects::{ChildPolicy, RenderBox};
use crate::painting::{Clip, PaintingContext};
use crate::tree::{DirtyFlags, NodeId, ParentDataKind, Tree};

/// Anchors of a stack child. A child with any anchor set is positioned;
/// the others are placed by the stack's alignment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StackPosition {
    pub top: Option<f32>,
    pub right: Option<f32>,
    pub bottom: Option<f32>,
    pub left: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl StackPosition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pinned to all four edges.
    pub fn fill() -> Self {
        Self {
            top: Some(0.0),
            right: Some(0.0),
            bottom: Some(0.0),
            left: Some(0.0),
            width: None,
            height: None,
        }
    }

    pub fn top(mut self, value: f32) -> Self {
        self.top = Some(value);
        self
    }

    pub fn right(mut self, value: f32) -> Self {
        self.right = Some(value);
        self
    }

    pub fn bottom(mut self, value: f32) -> Self {
        self.bottom = Some(value);
        self
    }

    pub fn left(mut self, value: f32) -> Self {
        self.left = Some(value);
        self
    }

    pub fn width(mut self, value: f32) -> Self {
        self.width = Some(value);
        self
    }

    pub fn height(mut self, value: f32) -> Self {
        self.height = Some(value);
        self
    }

    pub fn is_positioned(&self) -> bool {
        self.top.is_some()
            || self.right.is_some()
            || self.bottom.is_some()
            || self.left.is_some()
            || self.width.is_some()
            || self.height.is_some()
    }

    /// Extent along one axis: both insets pin it, else an explicit size.
    fn resolve_extent(near: Option<f32>, far: Option<f32>, extent: Option<f32>, available: f32) -> Option<f32> {
        match (near, far) {
            (Some(near), Some(far)) => Some((available - near - far).max(0.0)),
            _ => extent.map(|e| e.max(0.0)),
        }
    }

    fn constraints(&self, stack: Size) -> BoxConstraints {
        let width = Self::resolve_extent(self.left, self.right, self.width, stack.width);
        let height = Self::resolve_extent(self.top, self.bottom, self.height, stack.height);
        BoxConstraints::unbounded().tighten(width, height)
    }

    fn offset(&self, stack: Size, child: Size, alignment: Alignment) -> Offset {
        let aligned = alignment.along_free_space(stack, child);
        let x = match (self.left, self.right) {
            (Some(left), _) => left,
            (None, Some(right)) => stack.width - right - child.width,
            (None, None) => aligned.x,
        };
        let y = match (self.top, self.bottom) {
            (Some(top), _) => top,
            (None, Some(bottom)) => stack.height - bottom - child.height,
            (None, None) => aligned.y,
        };
        Offset::new(x, y)
    }
}

/// Layers its children on top of each other, last child on top.
#[derive(Debug, Clone)]
pub struct Stack {
    alignment: Alignment,
    fit: StackFit,
    clip: Clip,
}

struct StackLayout {
    size: Size,
    offsets: Vec<Offset>,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            alignment: Alignment::TOP_LEFT,
            fit: StackFit::Loose,
            clip: Clip::None,
        }
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn fit(mut self, fit: StackFit) -> Self {
        self.fit = fit;
        self
    }

    pub fn clip(mut self, clip: Clip) -> Self {
        self.clip = clip;
        self
    }

    pub fn set_alignment(&mut self, alignment: Alignment) -> DirtyFlags {
        if alignment == self.alignment {
            return DirtyFlags::empty();
        }
        self.alignment = alignment;
        DirtyFlags::NEEDS_LAYOUT
    }

    pub fn set_fit(&mut self, fit: StackFit) -> DirtyFlags {
        if fit == self.fit {
            return DirtyFlags::empty();
        }
        self.fit = fit;
        DirtyFlags::NEEDS_LAYOUT
    }

    pub fn set_clip(&mut self, clip: Clip) -> DirtyFlags {
        if clip == self.clip {
            return DirtyFlags::empty();
        }
        self.clip = clip;
        DirtyFlags::NEEDS_PAINT
    }

    fn non_positioned_constraints(&self, constraints: BoxConstraints) -> Result<BoxConstraints> {
        match self.fit {
            StackFit::Loose => Ok(constraints.loosen()),
            StackFit::Passthrough => Ok(constraints),
            StackFit::Expand => {
                let biggest = constraints.biggest();
                if !biggest.is_finite() {
                    return Err(Error::UnboundedConstraints {
                        context: "Stack expanding its children".into(),
                        constraints,
                        trace: String::new(),
                    });
                }
                Ok(BoxConstraints::tight(biggest))
            }
        }
    }

    fn compute(
        &self,
        constraints: BoxConstraints,
        children: &[(NodeId, StackPosition)],
        mut layout_child: impl FnMut(NodeId, BoxConstraints) -> Result<Size>,
    ) -> Result<StackLayout> {
        let mut sizes = vec![Size::zero(); children.len()];

        // Non-positioned children decide the stack's size
        let mut has_non_positioned = false;
        let mut width = 0.0f32;
        let mut height = 0.0f32;
        for (index, (child, position)) in children.iter().enumerate() {
            if position.is_positioned() {
                continue;
            }
            has_non_positioned = true;
            let size = layout_child(*child, self.non_positioned_constraints(constraints)?)?;
            width = width.max(size.width);
            height = height.max(size.height);
            sizes[index] = size;
        }

        let size = if has_non_positioned {
            constraints.constrain(Size::new(width, height))
        } else {
            constraints.smallest()
        };

        let mut offsets = Vec::with_capacity(children.len());
        for (index, (child, position)) in children.iter().enumerate() {
            if position.is_positioned() {
                let child_size = layout_child(*child, position.constraints(size))?;
                offsets.push(position.offset(size, child_size, self.alignment));
            } else {
                offsets.push(self.alignment.along_free_space(size, sizes[index]));
            }
        }

        Ok(StackLayout { size, offsets })
    }

    fn collect_children(tree: &Tree, id: NodeId) -> Result<Vec<(NodeId, StackPosition)>> {
        tree.children(id)
            .into_iter()
            .map(|child| Ok((child, tree.parent_data(child)?.stack_position())))
            .collect()
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBox for Stack {
    fn child_policy(&self) -> ChildPolicy {
        ChildPolicy::Multiple
    }

    fn setup_parent_data(&self, kind: &mut ParentDataKind) {
        if !kind.is_stack() {
            *kind = ParentDataKind::Stack(StackPosition::default());
        }
    }

    fn perform_layout(&mut self, tree: &mut Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        let children = Self::collect_children(tree, id)?;
        let layout = self.compute(constraints, &children, |child, c| tree.layout(child, c, true))?;
        for ((child, _), offset) in children.iter().zip(layout.offsets) {
            tree.set_offset(*child, offset)?;
        }
        Ok(layout.size)
    }

    fn dry_layout(&self, tree: &Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        let children = Self::collect_children(tree, id)?;
        // Positioned children never affect the size
        let non_positioned: Vec<_> = children
            .into_iter()
            .filter(|(_, position)| !position.is_positioned())
            .collect();
        let layout = self.compute(constraints, &non_positioned, |child, c| tree.dry_layout(child, c))?;
        Ok(layout.size)
    }

    fn paint(&self, tree: &Tree, id: NodeId, ctx: &mut PaintingContext<'_>, offset: Offset) -> Result<()> {
        if self.clip.is_none() {
            return tree.paint_children(id, ctx, offset);
        }
        let bounds = Rect::from_offset_size(offset, tree.size(id)?);
        ctx.clip_rect_and_paint(self.clip, bounds, |ctx| tree.paint_children(id, ctx, offset))
    }
}
