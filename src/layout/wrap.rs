//! Greedy line breaking into runs.

use super::{Axis, BoxConstraints, MainAxisAlignment, Size, WrapAlignment, WrapCrossAlignment};
use crate::error::{Error, Result};
use crate::geometry::{Offset, Rect};
use crate::objects::{ChildPolicy, RenderBox};
use crate::painting::{Clip, PaintingContext};
use crate::tree::{DirtyFlags, NodeId, ParentDataKind, Tree};

/// Slack allowed when deciding whether a child still fits its run.
const PRECISION_TOLERANCE: f32 = 1e-4;

/// Lays children out in runs, starting a new run when the next child would
/// not fit the main axis.
#[derive(Debug, Clone)]
pub struct Wrap {
    direction: Axis,
    alignment: WrapAlignment,
    spacing: f32,
    run_alignment: WrapAlignment,
    run_spacing: f32,
    cross_axis_alignment: WrapCrossAlignment,
    clip: Clip,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RunMetrics {
    main_extent: f32,
    cross_extent: f32,
    child_count: usize,
}

struct WrapLayout {
    size: Size,
    offsets: Vec<Offset>,
    run_indices: Vec<usize>,
}

fn check_spacing(what: &str, value: f32) -> Result<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "wrap {what} must be non-negative, got {value}"
        )))
    }
}

impl Wrap {
    pub fn new(direction: Axis) -> Self {
        Self {
            direction,
            alignment: WrapAlignment::Start,
            spacing: 0.0,
            run_alignment: WrapAlignment::Start,
            run_spacing: 0.0,
            cross_axis_alignment: WrapCrossAlignment::Start,
            clip: Clip::None,
        }
    }

    pub fn alignment(mut self, alignment: WrapAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Negative spacing is treated as zero.
    pub fn spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing.max(0.0);
        self
    }

    pub fn run_alignment(mut self, alignment: WrapAlignment) -> Self {
        self.run_alignment = alignment;
        self
    }

    pub fn run_spacing(mut self, spacing: f32) -> Self {
        self.run_spacing = spacing.max(0.0);
        self
    }

    pub fn cross_axis_alignment(mut self, alignment: WrapCrossAlignment) -> Self {
        self.cross_axis_alignment = alignment;
        self
    }

    pub fn clip(mut self, clip: Clip) -> Self {
        self.clip = clip;
        self
    }

    pub fn set_direction(&mut self, direction: Axis) -> DirtyFlags {
        if direction == self.direction {
            return DirtyFlags::empty();
        }
        self.direction = direction;
        DirtyFlags::NEEDS_LAYOUT
    }

    pub fn set_alignment(&mut self, alignment: WrapAlignment) -> DirtyFlags {
        if alignment == self.alignment {
            return DirtyFlags::empty();
        }
        self.alignment = alignment;
        DirtyFlags::NEEDS_LAYOUT
    }

    pub fn set_run_alignment(&mut self, alignment: WrapAlignment) -> DirtyFlags {
        if alignment == self.run_alignment {
            return DirtyFlags::empty();
        }
        self.run_alignment = alignment;
        DirtyFlags::NEEDS_LAYOUT
    }

    pub fn set_cross_axis_alignment(&mut self, alignment: WrapCrossAlignment) -> DirtyFlags {
        if alignment == self.cross_axis_alignment {
            return DirtyFlags::empty();
        }
        self.cross_axis_alignment = alignment;
        DirtyFlags::NEEDS_LAYOUT
    }

    pub fn set_spacing(&mut self, spacing: f32) -> Result<DirtyFlags> {
        check_spacing("spacing", spacing)?;
        if spacing == self.spacing {
            return Ok(DirtyFlags::empty());
        }
        self.spacing = spacing;
        Ok(DirtyFlags::NEEDS_LAYOUT)
    }

    pub fn set_run_spacing(&mut self, spacing: f32) -> Result<DirtyFlags> {
        check_spacing("run spacing", spacing)?;
        if spacing == self.run_spacing {
            return Ok(DirtyFlags::empty());
        }
        self.run_spacing = spacing;
        Ok(DirtyFlags::NEEDS_LAYOUT)
    }

    pub fn set_clip(&mut self, clip: Clip) -> DirtyFlags {
        if clip == self.clip {
            return DirtyFlags::empty();
        }
        self.clip = clip;
        DirtyFlags::NEEDS_PAINT
    }

    /// Children may take any cross extent; the main axis is capped.
    fn child_constraints(&self, constraints: BoxConstraints) -> BoxConstraints {
        match self.direction {
            Axis::Horizontal => BoxConstraints::new(0.0, 0.0, constraints.max_width, f32::INFINITY),
            Axis::Vertical => BoxConstraints::new(0.0, 0.0, f32::INFINITY, constraints.max_height),
        }
    }

    fn compute(
        &self,
        constraints: BoxConstraints,
        children: &[NodeId],
        mut layout_child: impl FnMut(NodeId, BoxConstraints) -> Result<Size>,
    ) -> Result<WrapLayout> {
        let axis = self.direction;
        let main_limit = constraints.max_main(axis);
        let child_constraints = self.child_constraints(constraints);

        let mut sizes = Vec::with_capacity(children.len());
        let mut run_indices = Vec::with_capacity(children.len());
        let mut runs: Vec<RunMetrics> = Vec::new();
        let mut run = RunMetrics {
            main_extent: 0.0,
            cross_extent: 0.0,
            child_count: 0,
        };

        for &child in children {
            let size = layout_child(child, child_constraints)?;
            let child_main = size.main_axis(axis);
            let child_cross = size.cross_axis(axis);

            if run.child_count > 0
                && run.main_extent + self.spacing + child_main > main_limit + PRECISION_TOLERANCE
            {
                runs.push(run);
                run = RunMetrics {
                    main_extent: 0.0,
                    cross_extent: 0.0,
                    child_count: 0,
                };
            }
            if run.child_count > 0 {
                run.main_extent += self.spacing;
            }
            run.main_extent += child_main;
            run.cross_extent = run.cross_extent.max(child_cross);
            run.child_count += 1;

            sizes.push(size);
            run_indices.push(runs.len());
        }
        if run.child_count > 0 {
            runs.push(run);
        }

        let main_extent = runs.iter().map(|r| r.main_extent).sum::<f32>();
        let cross_extent = runs.iter().map(|r| r.cross_extent).sum::<f32>()
            + self.run_spacing * runs.len().saturating_sub(1) as f32;

        let size = constraints.constrain(Size::from_axes(axis, main_extent, cross_extent));
        let container_main = size.main_axis(axis);
        let container_cross = size.cross_axis(axis);

        let cross_free = (container_cross - cross_extent).max(0.0);
        let (run_leading, run_between) = MainAxisAlignment::from(self.run_alignment).distribute(
            cross_free,
            runs.len(),
            self.run_spacing,
        );

        let mut offsets = Vec::with_capacity(children.len());
        let mut cross_position = run_leading;
        let mut next = 0;
        for run in &runs {
            let main_free = (container_main - run.main_extent).max(0.0);
            let (leading, between) = MainAxisAlignment::from(self.alignment).distribute(
                main_free,
                run.child_count,
                self.spacing,
            );

            let mut main_position = leading;
            for size in &sizes[next..next + run.child_count] {
                let child_cross = cross_position
                    + self
                        .cross_axis_alignment
                        .offset(run.cross_extent, size.cross_axis(axis));
                offsets.push(match axis {
                    Axis::Horizontal => Offset::new(main_position, child_cross),
                    Axis::Vertical => Offset::new(child_cross, main_position),
                });
                main_position += size.main_axis(axis) + between;
            }

            next += run.child_count;
            cross_position += run.cross_extent + run_between;
        }

        Ok(WrapLayout {
            size,
            offsets,
            run_indices,
        })
    }
}

impl Default for Wrap {
    fn default() -> Self {
        Self::new(Axis::Horizontal)
    }
}

impl RenderBox for Wrap {
    fn child_policy(&self) -> ChildPolicy {
        ChildPolicy::Multiple
    }

    fn setup_parent_data(&self, kind: &mut ParentDataKind) {
        if !kind.is_wrap() {
            *kind = ParentDataKind::Wrap { run_index: 0 };
        }
    }

    fn perform_layout(&mut self, tree: &mut Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        let children = tree.children(id);
        let layout = self.compute(constraints, &children, |child, c| tree.layout(child, c, true))?;
        for ((&child, offset), run_index) in children.iter().zip(layout.offsets).zip(layout.run_indices) {
            tree.set_offset(child, offset)?;
            tree.set_run_index(child, run_index)?;
        }
        Ok(layout.size)
    }

    fn dry_layout(&self, tree: &Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        let children = tree.children(id);
        let layout = self.compute(constraints, &children, |child, c| tree.dry_layout(child, c))?;
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
