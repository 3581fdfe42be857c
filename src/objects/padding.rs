use super::RenderBox;
use crate::error::{Error, Result};
use crate::geometry::EdgeInsets;
use crate::layout::{BoxConstraints, Size};
use crate::tree::{DirtyFlags, NodeId, Tree};

/// Insets its child by a fixed amount on each side.
#[derive(Debug, Clone)]
pub struct Padding {
    padding: EdgeInsets,
}

impl Padding {
    /// Negative insets are clamped to zero; use [`set_padding`](Self::set_padding)
    /// to have them rejected instead.
    pub fn new(padding: impl Into<EdgeInsets>) -> Self {
        let padding = padding.into();
        Self {
            padding: EdgeInsets::from_ltrb(
                padding.left.max(0.0),
                padding.top.max(0.0),
                padding.right.max(0.0),
                padding.bottom.max(0.0),
            ),
        }
    }

    pub fn padding(&self) -> EdgeInsets {
        self.padding
    }

    pub fn set_padding(&mut self, padding: impl Into<EdgeInsets>) -> Result<DirtyFlags> {
        let padding = padding.into();
        if !padding.is_non_negative() {
            return Err(Error::InvalidArgument(format!(
                "padding must be non-negative, got {padding:?}"
            )));
        }
        if padding == self.padding {
            return Ok(DirtyFlags::empty());
        }
        self.padding = padding;
        Ok(DirtyFlags::NEEDS_LAYOUT)
    }

    fn size_around(&self, constraints: BoxConstraints, child: Size) -> Size {
        constraints.constrain(Size::new(
            child.width + self.padding.horizontal(),
            child.height + self.padding.vertical(),
        ))
    }
}

impl RenderBox for Padding {
    fn perform_layout(&mut self, tree: &mut Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        let Some(child) = tree.first_child(id)? else {
            return Ok(self.size_around(constraints, Size::zero()));
        };

        let inner = constraints.deflate(self.padding);
        let child_size = tree.layout(child, inner, true)?;
        tree.set_offset(child, self.padding.top_left())?;
        Ok(self.size_around(constraints, child_size))
    }

    // Recomputed from the given constraints; the committed size is never
    // consulted.
    fn dry_layout(&self, tree: &Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        let child_size = match tree.first_child(id)? {
            Some(child) => tree.dry_layout(child, constraints.deflate(self.padding))?,
            None => Size::zero(),
        };
        Ok(self.size_around(constraints, child_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Offset;
    use crate::objects::ConstrainedBox;

    #[test]
    fn test_padding_offsets_child() {
        let mut tree = Tree::new();
        let padding = tree.insert_node(Padding::new(EdgeInsets::from_ltrb(1.0, 2.0, 3.0, 4.0)));
        let child = tree.insert_node(ConstrainedBox::tight_for(Some(10.0), Some(10.0)));
        tree.append_child(padding, child).unwrap();

        let size = tree
            .layout(padding, BoxConstraints::loose(Size::new(100.0, 100.0)), false)
            .unwrap();
        assert_eq!(size, Size::new(14.0, 16.0));
        assert_eq!(tree.offset(child).unwrap(), Offset::new(1.0, 2.0));
    }

    #[test]
    fn test_dry_layout_follows_constraints() {
        let mut tree = Tree::new();
        let padding = tree.insert_node(Padding::new(5.0));
        let child = tree.insert_node(ConstrainedBox::tight_for(Some(10.0), Some(10.0)));
        tree.append_child(padding, child).unwrap();
        tree.layout(padding, BoxConstraints::loose(Size::new(100.0, 100.0)), false)
            .unwrap();

        // A different query gives a different answer, not the committed size
        let dry = tree
            .dry_layout(padding, BoxConstraints::tight(Size::new(50.0, 60.0)))
            .unwrap();
        assert_eq!(dry, Size::new(50.0, 60.0));
        assert_eq!(tree.size(padding).unwrap(), Size::new(20.0, 20.0));
    }

    #[test]
    fn test_negative_padding_rejected_by_setter() {
        let mut padding = Padding::new(2.0);
        assert!(padding.set_padding(-1.0).is_err());
        assert_eq!(padding.set_padding(2.0).unwrap(), DirtyFlags::empty());
        assert_eq!(padding.set_padding(3.0).unwrap(), DirtyFlags::NEEDS_LAYOUT);
    }
}
