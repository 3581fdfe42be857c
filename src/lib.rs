//! A retained-mode 2D layout and paint engine.
//!
//! Render objects live in a [`Tree`] and are laid out with box constraints:
//! constraints go down, sizes come up, parents position their children.
//! Mutations mark nodes dirty; a [`RenderPipeline`] frame then applies image
//! notifications, re-lays out the dirty relayout boundaries and repaints
//! onto a [`DrawingSurface`](painting::DrawingSurface).

pub mod alignment;
pub mod error;
pub mod events;
pub mod geometry;
pub mod image;
pub mod layout;
pub mod objects;
pub mod painting;
pub mod pipeline;
pub mod stats;
pub mod text;
pub mod transform;
pub mod tree;

pub use error::{Error, Result};
pub use pipeline::{RenderConfig, RenderPipeline};
pub use tree::{NodeId, Tree};

pub mod prelude {
    pub use crate::alignment::Alignment;
    pub use crate::events::{PointerEvent, PointerEventKind};
    pub use crate::geometry::{EdgeInsets, Offset, Rect};
    pub use crate::hit_test::HitTestResult;
    pub use crate::image::{BoxFit, FileImageProvider, ImageProvider, MemoryImageProvider};
    pub use crate::layout::{
        Axis, BoxConstraints, CrossAxisAlignment, Flex, FlexFit, MainAxisAlignment, MainAxisSize,
        Size, Stack, StackFit, StackPosition, Wrap, WrapAlignment, WrapCrossAlignment,
    };
    pub use crate::objects::{
        Align, ClipPath, ClipRRect, ClipRect, ColoredBox, ConstrainedBox, CustomPaint, DecoratedBox,
        ImageBox, LimitedBox, Opacity, Padding, Painter, Paragraph, PointerListener, RenderObject,
        TextOverflow, TransformBox, View,
    };
    pub use crate::painting::{
        Border, BorderRadius, BoxDecoration, Clip, Color, DrawingSurface, LinearGradient,
        RecordingSurface,
    };
    pub use crate::text::{MonospaceMeasurer, TextMeasurer, TextStyle};
    pub use crate::transform::Transform;
    pub use crate::tree::{DirtyFlags, ParentDataKind};
    pub use crate::{Error, NodeId, RenderConfig, RenderPipeline, Result, Tree};
}
