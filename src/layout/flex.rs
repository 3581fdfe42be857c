//! Rows and columns.
//!
//! Non-flexible children are laid out first with an unbounded main axis;
//! the space they leave is then shared between flexible children in
//! proportion to their flex factor.

use super::{Axis, BoxConstraints, CrossAxisAlignment, FlexFit, MainAxisAlignment, MainAxisSize, Size};
use crate::error::{Error, Result};
use crate::geometry::{Offset, Rect};
use crate::objects::{ChildPolicy, RenderBox};
use crate::painting::{Clip, PaintingContext};
use crate::tree::{DirtyFlags, NodeId, ParentDataKind, Tree};

/// Thickness of the overflow stripe.
const OVERFLOW_INDICATOR_EXTENT: f32 = 8.0;

/// Flex layout for rows and columns
#[derive(Debug, Clone)]
pub struct Flex {
    direction: Axis,
    main_axis_alignment: MainAxisAlignment,
    main_axis_size: MainAxisSize,
    cross_axis_alignment: CrossAxisAlignment,
    spacing: f32,
    clip: Clip,
    overflow: f32,
}

struct FlexChild {
    id: NodeId,
    flex: u32,
    fit: FlexFit,
}

struct FlexLayout {
    size: Size,
    overflow: f32,
    offsets: Vec<Offset>,
}

impl Flex {
    pub fn new(direction: Axis) -> Self {
        Self {
            direction,
            main_axis_alignment: MainAxisAlignment::Start,
            main_axis_size: MainAxisSize::Max,
            cross_axis_alignment: CrossAxisAlignment::Center,
            spacing: 0.0,
            clip: Clip::None,
            overflow: 0.0,
        }
    }

    pub fn row() -> Self {
        Self::new(Axis::Horizontal)
    }

    pub fn column() -> Self {
        Self::new(Axis::Vertical)
    }

    pub fn main_axis_alignment(mut self, alignment: MainAxisAlignment) -> Self {
        self.main_axis_alignment = alignment;
        self
    }

    pub fn main_axis_size(mut self, size: MainAxisSize) -> Self {
        self.main_axis_size = size;
        self
    }

    pub fn cross_axis_alignment(mut self, alignment: CrossAxisAlignment) -> Self {
        self.cross_axis_alignment = alignment;
        self
    }

    /// Negative spacing is treated as zero.
    pub fn spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing.max(0.0);
        self
    }

    pub fn clip(mut self, clip: Clip) -> Self {
        self.clip = clip;
        self
    }

    pub fn direction(&self) -> Axis {
        self.direction
    }

    /// How far the children extend past the main axis after the last
    /// layout; zero when they fit.
    pub fn overflow(&self) -> f32 {
        self.overflow
    }

    pub fn set_direction(&mut self, direction: Axis) -> DirtyFlags {
        if direction == self.direction {
            return DirtyFlags::empty();
        }
        self.direction = direction;
        DirtyFlags::NEEDS_LAYOUT
    }

    pub fn set_main_axis_alignment(&mut self, alignment: MainAxisAlignment) -> DirtyFlags {
        if alignment == self.main_axis_alignment {
            return DirtyFlags::empty();
        }
        self.main_axis_alignment = alignment;
        DirtyFlags::NEEDS_LAYOUT
    }

    pub fn set_main_axis_size(&mut self, size: MainAxisSize) -> DirtyFlags {
        if size == self.main_axis_size {
            return DirtyFlags::empty();
        }
        self.main_axis_size = size;
        DirtyFlags::NEEDS_LAYOUT
    }

    pub fn set_cross_axis_alignment(&mut self, alignment: CrossAxisAlignment) -> DirtyFlags {
        if alignment == self.cross_axis_alignment {
            return DirtyFlags::empty();
        }
        self.cross_axis_alignment = alignment;
        DirtyFlags::NEEDS_LAYOUT
    }

    pub fn set_spacing(&mut self, spacing: f32) -> Result<DirtyFlags> {
        if !(spacing >= 0.0) {
            return Err(Error::InvalidArgument(format!(
                "flex spacing must be non-negative, got {spacing}"
            )));
        }
        if spacing == self.spacing {
            return Ok(DirtyFlags::empty());
        }
        self.spacing = spacing;
        Ok(DirtyFlags::NEEDS_LAYOUT)
    }

    pub fn set_clip(&mut self, clip: Clip) -> DirtyFlags {
        if clip == self.clip {
            return DirtyFlags::empty();
        }
        self.clip = clip;
        DirtyFlags::NEEDS_PAINT
    }

    fn collect_children(tree: &Tree, id: NodeId) -> Result<Vec<FlexChild>> {
        tree.children(id)
            .into_iter()
            .map(|child| {
                let data = tree.parent_data(child)?;
                Ok(FlexChild {
                    id: child,
                    flex: data.flex(),
                    fit: data.fit(),
                })
            })
            .collect()
    }

    /// Constraints for a child given its main-axis bounds.
    fn child_constraints(&self, constraints: BoxConstraints, min_main: f32, max_main: f32) -> BoxConstraints {
        let max_cross = constraints.max_cross(self.direction);
        let min_cross = if self.cross_axis_alignment == CrossAxisAlignment::Stretch {
            max_cross
        } else {
            0.0
        };
        match self.direction {
            Axis::Horizontal => BoxConstraints::new(min_main, min_cross, max_main, max_cross),
            Axis::Vertical => BoxConstraints::new(min_cross, min_main, max_cross, max_main),
        }
    }

    /// Run the two-phase algorithm, laying children out through
    /// `layout_child`. Nothing is written to the tree.
    fn compute(
        &self,
        constraints: BoxConstraints,
        children: &[FlexChild],
        mut layout_child: impl FnMut(NodeId, BoxConstraints) -> Result<Size>,
    ) -> Result<FlexLayout> {
        if children.is_empty() {
            return Ok(FlexLayout {
                size: constraints.smallest(),
                overflow: 0.0,
                offsets: Vec::new(),
            });
        }

        let axis = self.direction;
        let max_main = constraints.max_main(axis);
        let can_flex = max_main.is_finite();

        if self.cross_axis_alignment == CrossAxisAlignment::Stretch
            && !constraints.max_cross(axis).is_finite()
        {
            return Err(Error::UnboundedConstraints {
                context: "Flex stretching its children across an unbounded cross axis".into(),
                constraints,
                trace: String::new(),
            });
        }

        let total_flex: u32 = children.iter().map(|c| c.flex).sum();
        if total_flex > 0 && !can_flex {
            return Err(Error::UnboundedConstraints {
                context: "Flex with flexible children along an unbounded main axis".into(),
                constraints,
                trace: String::new(),
            });
        }

        let mut sizes = vec![Size::zero(); children.len()];
        let mut allocated = self.spacing * (children.len() - 1) as f32;
        let mut cross_size = 0.0f32;

        // Phase 1: inflexible children
        let inflexible = self.child_constraints(constraints, 0.0, f32::INFINITY);
        for (index, child) in children.iter().enumerate() {
            if child.flex > 0 {
                continue;
            }
            let size = layout_child(child.id, inflexible)?;
            allocated += size.main_axis(axis);
            cross_size = cross_size.max(size.cross_axis(axis));
            sizes[index] = size;
        }

        // Phase 2: share what is left between flexible children
        if total_flex > 0 {
            let free_space = (max_main - allocated).max(0.0);
            let per_flex = free_space / total_flex as f32;
            for (index, child) in children.iter().enumerate() {
                if child.flex == 0 {
                    continue;
                }
                let share = per_flex * child.flex as f32;
                let min_main = match child.fit {
                    FlexFit::Tight => share,
                    FlexFit::Loose => 0.0,
                };
                let size = layout_child(child.id, self.child_constraints(constraints, min_main, share))?;
                allocated += size.main_axis(axis);
                cross_size = cross_size.max(size.cross_axis(axis));
                sizes[index] = size;
            }
        }

        let ideal_main = if self.main_axis_size == MainAxisSize::Max && can_flex {
            max_main
        } else {
            allocated
        };
        let size = constraints.constrain(Size::from_axes(axis, ideal_main, cross_size));
        let main_size = size.main_axis(axis);
        let cross_size = size.cross_axis(axis);
        let overflow = (allocated - main_size).max(0.0);
        let remaining = (main_size - allocated).max(0.0);

        let (leading, between) = self
            .main_axis_alignment
            .distribute(remaining, children.len(), self.spacing);

        let mut main_position = leading;
        let offsets = sizes
            .iter()
            .map(|child_size| {
                let child_cross = child_size.cross_axis(axis);
                let cross_position = match self.cross_axis_alignment {
                    CrossAxisAlignment::Start
                    | CrossAxisAlignment::Stretch
                    | CrossAxisAlignment::Baseline => 0.0,
                    CrossAxisAlignment::Center => (cross_size - child_cross) / 2.0,
                    CrossAxisAlignment::End => cross_size - child_cross,
                };
                let offset = match axis {
                    Axis::Horizontal => Offset::new(main_position, cross_position),
                    Axis::Vertical => Offset::new(cross_position, main_position),
                };
                main_position += child_size.main_axis(axis) + between;
                offset
            })
            .collect();

        Ok(FlexLayout {
            size,
            overflow,
            offsets,
        })
    }

    /// The stripe along the edge the children spill over.
    fn overflow_rect(&self, offset: Offset, size: Size) -> Rect {
        match self.direction {
            Axis::Horizontal => Rect::new(
                offset.x + size.width - OVERFLOW_INDICATOR_EXTENT,
                offset.y,
                OVERFLOW_INDICATOR_EXTENT,
                size.height,
            ),
            Axis::Vertical => Rect::new(
                offset.x,
                offset.y + size.height - OVERFLOW_INDICATOR_EXTENT,
                size.width,
                OVERFLOW_INDICATOR_EXTENT,
            ),
        }
    }
}

impl Default for Flex {
    fn default() -> Self {
        Self::row()
    }
}

impl RenderBox for Flex {
    fn child_policy(&self) -> ChildPolicy {
        ChildPolicy::Multiple
    }

    fn setup_parent_data(&self, kind: &mut ParentDataKind) {
        if !kind.is_flex() {
            *kind = ParentDataKind::flexible(0);
        }
    }

    fn perform_layout(&mut self, tree: &mut Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        let children = Self::collect_children(tree, id)?;
        let layout = self.compute(constraints, &children, |child, c| tree.layout(child, c, true))?;

        for (child, offset) in children.iter().zip(layout.offsets) {
            tree.set_offset(child.id, offset)?;
        }
        if layout.overflow > 0.0 {
            log::debug!(
                "{:?} flex overflowed by {:.1}px ({})",
                self.direction,
                layout.overflow,
                tree.ancestor_trace(id)
            );
        }
        self.overflow = layout.overflow;
        Ok(layout.size)
    }

    fn dry_layout(&self, tree: &Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        let children = Self::collect_children(tree, id)?;
        let layout = self.compute(constraints, &children, |child, c| tree.dry_layout(child, c))?;
        Ok(layout.size)
    }

    fn paint(&self, tree: &Tree, id: NodeId, ctx: &mut PaintingContext<'_>, offset: Offset) -> Result<()> {
        if self.overflow <= 0.0 {
            return tree.paint_children(id, ctx, offset);
        }

        let size = tree.size(id)?;
        if self.clip.is_none() {
            tree.paint_children(id, ctx, offset)?;
        } else {
            let bounds = Rect::from_offset_size(offset, size);
            ctx.clip_rect_and_paint(self.clip, bounds, |ctx| tree.paint_children(id, ctx, offset))?;
        }
        ctx.overflow_indicator(self.overflow_rect(offset, size));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::ConstrainedBox;
    use crate::painting::{DrawCommand, RecordingSurface};

    fn sized(tree: &mut Tree, width: f32, height: f32) -> NodeId {
        tree.insert_node(ConstrainedBox::tight_for(Some(width), Some(height)))
    }

    fn row_with(tree: &mut Tree, flex: Flex, sizes: &[(f32, f32)]) -> (NodeId, Vec<NodeId>) {
        let row = tree.insert_node(flex);
        let children = sizes
            .iter()
            .map(|&(w, h)| {
                let child = sized(tree, w, h);
                tree.append_child(row, child).unwrap();
                child
            })
            .collect();
        (row, children)
    }

    fn bounded(width: f32, height: f32) -> BoxConstraints {
        BoxConstraints::loose(Size::new(width, height))
    }

    #[test]
    fn test_start_alignment_packs_children() {
        let mut tree = Tree::new();
        let (row, children) = row_with(&mut tree, Flex::row().spacing(5.0), &[(10.0, 10.0), (20.0, 30.0)]);
        let size = tree.layout(row, bounded(100.0, 100.0), false).unwrap();

        assert_eq!(size, Size::new(100.0, 30.0));
        assert_eq!(tree.offset(children[0]).unwrap(), Offset::new(0.0, 10.0));
        assert_eq!(tree.offset(children[1]).unwrap(), Offset::new(15.0, 0.0));
    }

    #[test]
    fn test_min_main_axis_size_shrinks_to_children() {
        let mut tree = Tree::new();
        let flex = Flex::row().main_axis_size(MainAxisSize::Min).spacing(4.0);
        let (row, _) = row_with(&mut tree, flex, &[(10.0, 10.0), (10.0, 10.0)]);
        let size = tree.layout(row, bounded(100.0, 100.0), false).unwrap();
        assert_eq!(size, Size::new(24.0, 10.0));
    }

    #[test]
    fn test_flexible_children_share_free_space() {
        let mut tree = Tree::new();
        let (row, children) = row_with(&mut tree, Flex::row().spacing(10.0), &[(20.0, 10.0)]);
        let one = tree.insert_node(ConstrainedBox::tight_for(None, Some(10.0)));
        let two = tree.insert_node(ConstrainedBox::tight_for(None, Some(10.0)));
        tree.set_parent_data(one, ParentDataKind::flexible(1)).unwrap();
        tree.set_parent_data(two, ParentDataKind::flexible(2)).unwrap();
        tree.append_child(row, one).unwrap();
        tree.append_child(row, two).unwrap();

        tree.layout(row, bounded(200.0, 50.0), false).unwrap();
        // 200 - 20 - 2 * 10 spacing = 160 shared 1:2
        assert!((tree.size(one).unwrap().width - 160.0 / 3.0).abs() < 1e-3);
        assert!((tree.size(two).unwrap().width - 320.0 / 3.0).abs() < 1e-3);
        assert_eq!(tree.offset(children[0]).unwrap().x, 0.0);
        assert!((tree.offset(two).unwrap().x - (20.0 + 10.0 + 160.0 / 3.0 + 10.0)).abs() < 1e-3);
    }

    #[test]
    fn test_loose_flex_child_may_be_smaller() {
        let mut tree = Tree::new();
        let row = tree.insert_node(Flex::row());
        let child = sized(&mut tree, 30.0, 10.0);
        tree.set_parent_data(child, ParentDataKind::loose(1)).unwrap();
        tree.append_child(row, child).unwrap();

        tree.layout(row, bounded(100.0, 100.0), false).unwrap();
        assert_eq!(tree.size(child).unwrap().width, 30.0);
    }

    #[test]
    fn test_flex_in_unbounded_main_axis_fails_with_trace() {
        let mut tree = Tree::new();
        let row = tree.insert_node(Flex::row());
        let child = sized(&mut tree, 10.0, 10.0);
        tree.set_parent_data(child, ParentDataKind::flexible(1)).unwrap();
        tree.append_child(row, child).unwrap();

        let err = tree
            .layout(row, BoxConstraints::unbounded(), false)
            .unwrap_err();
        match err {
            Error::UnboundedConstraints { trace, .. } => assert_eq!(trace, "Flex"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_space_between_and_evenly() {
        let mut tree = Tree::new();
        let flex = Flex::row().main_axis_alignment(MainAxisAlignment::SpaceBetween);
        let (row, children) = row_with(&mut tree, flex, &[(10.0, 10.0), (10.0, 10.0), (10.0, 10.0)]);
        tree.layout(row, bounded(100.0, 10.0), false).unwrap();
        let xs: Vec<f32> = children.iter().map(|&c| tree.offset(c).unwrap().x).collect();
        assert_eq!(xs, vec![0.0, 45.0, 90.0]);

        tree.update::<Flex, _>(row, |f| f.set_main_axis_alignment(MainAxisAlignment::SpaceEvenly))
            .unwrap();
        tree.layout(row, bounded(100.0, 10.0), false).unwrap();
        let xs: Vec<f32> = children.iter().map(|&c| tree.offset(c).unwrap().x).collect();
        assert_eq!(xs, vec![17.5, 45.0, 72.5]);
    }

    #[test]
    fn test_stretch_forces_cross_extent() {
        let mut tree = Tree::new();
        let column = tree.insert_node(Flex::column().cross_axis_alignment(CrossAxisAlignment::Stretch));
        let child = tree.insert_node(ConstrainedBox::tight_for(None, Some(10.0)));
        tree.append_child(column, child).unwrap();

        tree.layout(column, bounded(80.0, 100.0), false).unwrap();
        assert_eq!(tree.size(child).unwrap(), Size::new(80.0, 10.0));
    }

    #[test]
    fn test_overflow_is_recorded_and_indicated() {
        let mut tree = Tree::new();
        let (row, _) = row_with(&mut tree, Flex::row().clip(Clip::HardEdge), &[(60.0, 10.0), (60.0, 10.0)]);
        let size = tree.layout(row, bounded(100.0, 10.0), false).unwrap();
        assert_eq!(size.width, 100.0);
        assert_eq!(tree.get::<Flex>(row).unwrap().overflow(), 20.0);

        let mut surface = RecordingSurface::new();
        let mut ctx = PaintingContext::new(&mut surface).paint_overflow_indicator(true);
        tree.paint_node(row, &mut ctx, Offset::ZERO).unwrap();
        drop(ctx);

        let commands = surface.commands();
        assert_eq!(commands[0], DrawCommand::Save);
        assert!(matches!(commands[1], DrawCommand::ClipRect { .. }));
        assert!(surface.filled_rects().contains(&Rect::new(92.0, 0.0, 8.0, 10.0)));
        assert_eq!(surface.depth(), 0);
    }

    #[test]
    fn test_no_children_takes_smallest_size() {
        let mut tree = Tree::new();
        let row = tree.insert_node(Flex::row());
        let size = tree
            .layout(row, BoxConstraints::new(5.0, 6.0, 100.0, 100.0), false)
            .unwrap();
        assert_eq!(size, Size::new(5.0, 6.0));
    }

    #[test]
    fn test_dry_layout_matches_layout() {
        let mut tree = Tree::new();
        let (row, children) = row_with(&mut tree, Flex::column(), &[(10.0, 10.0), (30.0, 5.0)]);
        let c = bounded(100.0, 100.0);
        let dry = tree.dry_layout(row, c).unwrap();
        assert!(tree.needs_layout(children[0]));
        assert_eq!(dry, tree.layout(row, c, false).unwrap());
    }
}
