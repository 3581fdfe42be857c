use super::RenderBox;
use crate::alignment::Alignment;
use crate::error::{Error, Result};
use crate::layout::{BoxConstraints, Size};
use crate::tree::{DirtyFlags, NodeId, Tree};

/// Positions its child inside itself by an [`Alignment`].
///
/// Expands to fill bounded constraints. With a width (or height) factor, or
/// on an unbounded axis, it sizes to the child times the factor instead.
#[derive(Debug, Clone)]
pub struct Align {
    alignment: Alignment,
    width_factor: Option<f32>,
    height_factor: Option<f32>,
}

fn check_factor(factor: Option<f32>) -> Result<()> {
    match factor {
        Some(f) if !(f >= 0.0) => Err(Error::InvalidArgument(format!(
            "size factors must be non-negative, got {f}"
        ))),
        _ => Ok(()),
    }
}

impl Align {
    pub fn new(alignment: Alignment) -> Self {
        Self {
            alignment,
            width_factor: None,
            height_factor: None,
        }
    }

    pub fn center() -> Self {
        Self::new(Alignment::CENTER)
    }

    pub fn with_factors(mut self, width_factor: Option<f32>, height_factor: Option<f32>) -> Result<Self> {
        check_factor(width_factor)?;
        check_factor(height_factor)?;
        self.width_factor = width_factor;
        self.height_factor = height_factor;
        Ok(self)
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    pub fn set_alignment(&mut self, alignment: Alignment) -> DirtyFlags {
        if alignment == self.alignment {
            return DirtyFlags::empty();
        }
        self.alignment = alignment;
        DirtyFlags::NEEDS_LAYOUT
    }

    pub fn set_factors(&mut self, width_factor: Option<f32>, height_factor: Option<f32>) -> Result<DirtyFlags> {
        check_factor(width_factor)?;
        check_factor(height_factor)?;
        if (width_factor, height_factor) == (self.width_factor, self.height_factor) {
            return Ok(DirtyFlags::empty());
        }
        self.width_factor = width_factor;
        self.height_factor = height_factor;
        Ok(DirtyFlags::NEEDS_LAYOUT)
    }

    fn resolve_size(&self, constraints: BoxConstraints, child: Option<Size>) -> Size {
        let shrink_width = self.width_factor.is_some() || !constraints.has_bounded_width();
        let shrink_height = self.height_factor.is_some() || !constraints.has_bounded_height();
        let child = child.unwrap_or_default();

        constraints.constrain(Size::new(
            if shrink_width {
                child.width * self.width_factor.unwrap_or(1.0)
            } else {
                f32::INFINITY
            },
            if shrink_height {
                child.height * self.height_factor.unwrap_or(1.0)
            } else {
                f32::INFINITY
            },
        ))
    }
}

impl RenderBox for Align {
    fn perform_layout(&mut self, tree: &mut Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        let Some(child) = tree.first_child(id)? else {
            return Ok(self.resolve_size(constraints, None));
        };

        let child_size = tree.layout(child, constraints.loosen(), true)?;
        let size = self.resolve_size(constraints, Some(child_size));
        tree.set_offset(child, self.alignment.along_free_space(size, child_size))?;
        Ok(size)
    }

    fn dry_layout(&self, tree: &Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        let child_size = match tree.first_child(id)? {
            Some(child) => Some(tree.dry_layout(child, constraints.loosen())?),
            None => None,
        };
        Ok(self.resolve_size(constraints, child_size))
    }
}
