//! Render-object kinds and their dispatch.
//!
//! Every kind implements [`RenderBox`]. [`RenderObject`] is the closed set of
//! kinds the tree stores; it forwards the protocol to the concrete kind
//! through a `dyn RenderBox` table.

mod align;
mod clip;
mod constrained;
mod custom_paint;
mod decorated;
mod image_box;
mod listener;
mod opacity;
mod padding;
mod paragraph;
mod transform_box;
mod view;

pub use align::Align;
pub use clip::{ClipPath, ClipRRect, ClipRect, Clipper};
pub use constrained::{ConstrainedBox, LimitedBox};
pub use custom_paint::{CustomPaint, Painter};
pub use decorated::{ColoredBox, DecoratedBox};
pub use image_box::{ImageBox, ImageStatus};
pub use listener::{PointerCallback, PointerListener};
pub use opacity::Opacity;
pub use padding::Padding;
pub use paragraph::{Paragraph, TextOverflow};
pub use transform_box::TransformBox;
pub use view::View;

use crate::error::Result;
use crate::events::PointerEvent;
use crate::geometry::Offset;
use crate::hit_test::HitTestResult;
use crate::layout::{BoxConstraints, Flex, Size, Stack, Wrap};
use crate::painting::PaintingContext;
use crate::tree::{NodeId, ParentDataKind, Tree};

/// How many children a kind accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildPolicy {
    None,
    Single,
    Multiple,
}

/// The layout, paint and hit-test protocol of one render-object kind.
///
/// `id` is the node the object is stored under; children and committed
/// geometry are read through `tree`.
pub trait RenderBox {
    fn child_policy(&self) -> ChildPolicy {
        ChildPolicy::Single
    }

    /// Install this container's parent-data variant on a new child.
    fn setup_parent_data(&self, kind: &mut ParentDataKind) {
        *kind = ParentDataKind::Box;
    }

    /// Lay out the children, position them and return this node's size.
    fn perform_layout(&mut self, tree: &mut Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size>;

    /// The size `perform_layout` would return, without committing anything.
    fn dry_layout(&self, tree: &Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size>;

    fn paint(&self, tree: &Tree, id: NodeId, ctx: &mut PaintingContext<'_>, offset: Offset) -> Result<()> {
        tree.paint_children(id, ctx, offset)
    }

    /// Whether `position` falls inside the node's hit region.
    fn hit_region_contains(&self, size: Size, position: Offset) -> bool {
        size.contains(position)
    }

    /// Whether the node is a hit target on its own, without a child hit.
    fn hit_test_self(&self, _size: Size, _position: Offset) -> bool {
        true
    }

    fn hit_test(&self, tree: &Tree, id: NodeId, result: &mut HitTestResult, position: Offset) -> Result<bool> {
        let size = tree.size(id)?;
        if !self.hit_region_contains(size, position) {
            return Ok(false);
        }
        if tree.hit_test_children(id, result, position)? || self.hit_test_self(size, position) {
            result.add(id, position);
            return Ok(true);
        }
        Ok(false)
    }

    /// React to a pointer event routed here by hit testing. Returns whether
    /// the event was handled.
    fn handle_event(&mut self, _event: &PointerEvent) -> bool {
        false
    }
}

/// Typed access to one variant of [`RenderObject`].
pub trait ObjectKind: Sized {
    /// Kind name used in ancestor traces.
    const KIND: &'static str;

    fn downcast_ref(object: &RenderObject) -> Option<&Self>;
    fn downcast_mut(object: &mut RenderObject) -> Option<&mut Self>;
}

macro_rules! render_objects {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// A render object stored in the [`Tree`].
        #[derive(Debug)]
        pub enum RenderObject {
            $($variant($ty),)*
        }

        impl RenderObject {
            pub fn kind_name(&self) -> &'static str {
                match self {
                    $(RenderObject::$variant(_) => <$ty as ObjectKind>::KIND,)*
                }
            }

            fn as_box(&self) -> &dyn RenderBox {
                match self {
                    $(RenderObject::$variant(object) => object,)*
                }
            }

            fn as_box_mut(&mut self) -> &mut dyn RenderBox {
                match self {
                    $(RenderObject::$variant(object) => object,)*
                }
            }
        }

        $(
            impl ObjectKind for $ty {
                const KIND: &'static str = stringify!($variant);

                fn downcast_ref(object: &RenderObject) -> Option<&Self> {
                    match object {
                        RenderObject::$variant(inner) => Some(inner),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }

                fn downcast_mut(object: &mut RenderObject) -> Option<&mut Self> {
                    match object {
                        RenderObject::$variant(inner) => Some(inner),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }

            impl From<$ty> for RenderObject {
                fn from(object: $ty) -> Self {
                    RenderObject::$variant(object)
                }
            }
        )*
    };
}

render_objects! {
    View(View),
    Flex(Flex),
    Wrap(Wrap),
    Stack(Stack),
    Padding(Padding),
    Align(Align),
    ConstrainedBox(ConstrainedBox),
    LimitedBox(LimitedBox),
    ColoredBox(ColoredBox),
    DecoratedBox(DecoratedBox),
    CustomPaint(CustomPaint),
    Opacity(Opacity),
    ClipRect(ClipRect),
    ClipRRect(ClipRRect),
    ClipPath(ClipPath),
    Transform(TransformBox),
    PointerListener(PointerListener),
    Image(ImageBox),
    Paragraph(Paragraph),
}

impl RenderObject {
    pub fn child_policy(&self) -> ChildPolicy {
        self.as_box().child_policy()
    }

    pub fn setup_parent_data(&self, kind: &mut ParentDataKind) {
        self.as_box().setup_parent_data(kind)
    }

    pub fn perform_layout(&mut self, tree: &mut Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        self.as_box_mut().perform_layout(tree, id, constraints)
    }

    pub fn dry_layout(&self, tree: &Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        self.as_box().dry_layout(tree, id, constraints)
    }

    pub fn paint(&self, tree: &Tree, id: NodeId, ctx: &mut PaintingContext<'_>, offset: Offset) -> Result<()> {
        self.as_box().paint(tree, id, ctx, offset)
    }

    pub fn hit_test(&self, tree: &Tree, id: NodeId, result: &mut HitTestResult, position: Offset) -> Result<bool> {
        self.as_box().hit_test(tree, id, result, position)
    }

    pub fn handle_event(&mut self, event: &PointerEvent) -> bool {
        self.as_box_mut().handle_event(event)
    }
}

/// Lay out the only child with `constraints` and adopt its size, or take
/// the smallest size allowed when there is no child.
pub(crate) fn layout_proxy(tree: &mut Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
    match tree.first_child(id)? {
        Some(child) => tree.layout(child, constraints, true),
        None => Ok(constraints.smallest()),
    }
}

pub(crate) fn dry_layout_proxy(tree: &Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
    match tree.first_child(id)? {
        Some(child) => tree.dry_layout(child, constraints),
        None => Ok(constraints.smallest()),
    }
}
