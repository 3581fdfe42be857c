use super::RenderBox;
use crate::error::{Error, Result};
use crate::layout::{BoxConstraints, Size};
use crate::tree::{DirtyFlags, NodeId, Tree};

/// Imposes additional constraints on its child, clamped into the incoming
/// ones. With tight additional constraints this is a fixed-size box.
#[derive(Debug, Clone)]
pub struct ConstrainedBox {
    additional: BoxConstraints,
}

impl ConstrainedBox {
    pub fn new(additional: BoxConstraints) -> Result<Self> {
        if !additional.is_normalized() {
            return Err(Error::InvalidArgument(format!(
                "additional constraints {additional:?} are not normalized"
            )));
        }
        Ok(Self { additional })
    }

    /// A box of exactly `width` x `height` where given; negative extents
    /// count as zero.
    pub fn tight_for(width: Option<f32>, height: Option<f32>) -> Self {
        Self {
            additional: BoxConstraints::tight_for(
                width.map(|w| w.max(0.0)),
                height.map(|h| h.max(0.0)),
            ),
        }
    }

    pub fn additional_constraints(&self) -> BoxConstraints {
        self.additional
    }

    pub fn set_additional_constraints(&mut self, additional: BoxConstraints) -> Result<DirtyFlags> {
        if !additional.is_normalized() {
            return Err(Error::InvalidArgument(format!(
                "additional constraints {additional:?} are not normalized"
            )));
        }
        if additional == self.additional {
            return Ok(DirtyFlags::empty());
        }
        self.additional = additional;
        Ok(DirtyFlags::NEEDS_LAYOUT)
    }
}

impl RenderBox for ConstrainedBox {
    fn perform_layout(&mut self, tree: &mut Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        let enforced = self.additional.enforce(constraints);
        match tree.first_child(id)? {
            Some(child) => tree.layout(child, enforced, true),
            None => Ok(enforced.smallest()),
        }
    }

    fn dry_layout(&self, tree: &Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        let enforced = self.additional.enforce(constraints);
        match tree.first_child(id)? {
            Some(child) => tree.dry_layout(child, enforced),
            None => Ok(enforced.smallest()),
        }
    }
}

/// Caps its child's size, but only along axes where the incoming
/// constraints are unbounded.
#[derive(Debug, Clone)]
pub struct LimitedBox {
    max_width: f32,
    max_height: f32,
}

impl LimitedBox {
    pub fn new(max_width: f32, max_height: f32) -> Result<Self> {
        if !(max_width >= 0.0 && max_height >= 0.0) {
            return Err(Error::InvalidArgument(format!(
                "limits must be non-negative, got {max_width} x {max_height}"
            )));
        }
        Ok(Self {
            max_width,
            max_height,
        })
    }

    pub fn set_limits(&mut self, max_width: f32, max_height: f32) -> Result<DirtyFlags> {
        let limited = Self::new(max_width, max_height)?;
        if (limited.max_width, limited.max_height) == (self.max_width, self.max_height) {
            return Ok(DirtyFlags::empty());
        }
        *self = limited;
        Ok(DirtyFlags::NEEDS_LAYOUT)
    }

    fn limit(&self, constraints: BoxConstraints) -> BoxConstraints {
        BoxConstraints {
            max_width: if constraints.has_bounded_width() {
                constraints.max_width
            } else {
                constraints.constrain_width(self.max_width)
            },
            max_height: if constraints.has_bounded_height() {
                constraints.max_height
            } else {
                constraints.constrain_height(self.max_height)
            },
            ..constraints
        }
    }
}

impl Default for LimitedBox {
    fn default() -> Self {
        Self {
            max_width: f32::INFINITY,
            max_height: f32::INFINITY,
        }
    }
}

impl RenderBox for LimitedBox {
    fn perform_layout(&mut self, tree: &mut Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        let limited = self.limit(constraints);
        match tree.first_child(id)? {
            Some(child) => {
                let child_size = tree.layout(child, limited, true)?;
                Ok(constraints.constrain(child_size))
            }
            None => Ok(limited.smallest()),
        }
    }

    fn dry_layout(&self, tree: &Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        let limited = self.limit(constraints);
        match tree.first_child(id)? {
            Some(child) => Ok(constraints.constrain(tree.dry_layout(child, limited)?)),
            None => Ok(limited.smallest()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Align;

    #[test]
    fn test_tight_for_is_clamped_by_parent() {
        let mut tree = Tree::new();
        let node = tree.insert_node(ConstrainedBox::tight_for(Some(200.0), Some(20.0)));
        let size = tree
            .layout(node, BoxConstraints::loose(Size::new(100.0, 100.0)), false)
            .unwrap();
        assert_eq!(size, Size::new(100.0, 20.0));
    }

    #[test]
    fn test_new_rejects_malformed_constraints() {
        let bad = BoxConstraints::new(10.0, 0.0, 5.0, 5.0);
        assert!(matches!(ConstrainedBox::new(bad), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_limited_box_only_limits_unbounded_axes() {
        let mut tree = Tree::new();
        let limited = tree.insert_node(LimitedBox::new(50.0, 50.0).unwrap());
        // Align expands to whatever it is allowed, which shows the limit
        let child = tree.insert_node(Align::center());
        tree.append_child(limited, child).unwrap();

        let size = tree
            .layout(limited, BoxConstraints::new(0.0, 0.0, 80.0, f32::INFINITY), false)
            .unwrap();
        assert_eq!(size, Size::new(80.0, 50.0));
    }
}
