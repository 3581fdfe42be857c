//! Paint primitives and the drawing-surface abstraction.
//!
//! Render objects never rasterize. They issue primitive operations on a
//! [`DrawingSurface`] through a [`PaintingContext`], which enforces
//! save/restore pairing around clips, transforms and opacity.

pub mod commands;
pub mod context;
pub mod path;

pub use commands::{DrawCommand, RecordingSurface};
pub use context::PaintingContext;
pub use path::{Path, PathCommand};

use crate::alignment::Alignment;
use crate::error::{Error, Result};
use crate::geometry::{Offset, Rect};
use crate::image::ImageHandle;
use crate::text::TextStyle;
use crate::transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);
    /// Debug-paint boundary color
    pub const DEBUG_ORANGE: Color = Color::from_hex(0xFF9800);
}

impl Default for Color {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

/// How a node clips its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clip {
    /// No clipping at all; clip scopes still save and restore.
    #[default]
    None,
    HardEdge,
    AntiAlias,
}

impl Clip {
    pub fn is_none(&self) -> bool {
        *self == Clip::None
    }

    pub fn anti_alias(&self) -> bool {
        *self == Clip::AntiAlias
    }
}

/// Per-corner radii.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BorderRadius {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl BorderRadius {
    pub const ZERO: BorderRadius = BorderRadius {
        top_left: 0.0,
        top_right: 0.0,
        bottom_right: 0.0,
        bottom_left: 0.0,
    };

    pub fn circular(radius: f32) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_right: radius,
            bottom_left: radius,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl From<f32> for BorderRadius {
    fn from(radius: f32) -> Self {
        BorderRadius::circular(radius)
    }
}

/// A rectangle with rounded corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RRect {
    pub rect: Rect,
    pub radius: BorderRadius,
}

impl RRect {
    pub fn new(rect: Rect, radius: BorderRadius) -> Self {
        Self { rect, radius }
    }

    pub fn contains(&self, point: Offset) -> bool {
        let center_x = self.rect.x + self.rect.width / 2.0;
        let center_y = self.rect.y + self.rect.height / 2.0;
        let corner = match (point.x < center_x, point.y < center_y) {
            (true, true) => self.radius.top_left,
            (false, true) => self.radius.top_right,
            (false, false) => self.radius.bottom_right,
            (true, false) => self.radius.bottom_left,
        };
        self.rect.contains_rounded(point, corner)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    /// Stroke width in logical pixels
    pub width: f32,
    pub color: Color,
}

impl Border {
    pub fn new(width: f32, color: Color) -> Self {
        Self { width, color }
    }
}

/// Two-stop linear gradient between two alignments of the painted box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearGradient {
    pub begin: Alignment,
    pub end: Alignment,
    pub start_color: Color,
    pub end_color: Color,
}

impl LinearGradient {
    pub fn horizontal(start_color: Color, end_color: Color) -> Self {
        Self {
            begin: Alignment::CENTER_LEFT,
            end: Alignment::CENTER_RIGHT,
            start_color,
            end_color,
        }
    }

    pub fn vertical(start_color: Color, end_color: Color) -> Self {
        Self {
            begin: Alignment::TOP_CENTER,
            end: Alignment::BOTTOM_CENTER,
            start_color,
            end_color,
        }
    }
}

/// What a fill operation paints with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Solid(Color),
    Gradient(LinearGradient),
}

impl From<Color> for Fill {
    fn from(color: Color) -> Self {
        Fill::Solid(color)
    }
}

impl From<LinearGradient> for Fill {
    fn from(gradient: LinearGradient) -> Self {
        Fill::Gradient(gradient)
    }
}

/// Background, border and corner rounding of a decorated box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxDecoration {
    pub color: Option<Color>,
    pub gradient: Option<LinearGradient>,
    pub border: Option<Border>,
    pub border_radius: BorderRadius,
}

impl BoxDecoration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn gradient(mut self, gradient: LinearGradient) -> Self {
        self.gradient = Some(gradient);
        self
    }

    pub fn border(mut self, border: Border) -> Self {
        self.border = Some(border);
        self
    }

    pub fn border_radius(mut self, radius: impl Into<BorderRadius>) -> Self {
        self.border_radius = radius.into();
        self
    }

    /// Color and gradient both describe the background; only one may be set.
    pub fn validate(&self) -> Result<()> {
        if self.color.is_some() && self.gradient.is_some() {
            return Err(Error::InvalidArgument(
                "a decoration cannot have both a color and a gradient".into(),
            ));
        }
        if let Some(border) = self.border {
            if border.width < 0.0 {
                return Err(Error::InvalidArgument(format!(
                    "border width must be non-negative, got {}",
                    border.width
                )));
            }
        }
        Ok(())
    }

    pub fn background(&self) -> Option<Fill> {
        self.gradient
            .map(Fill::Gradient)
            .or(self.color.map(Fill::Solid))
    }
}

/// Primitive drawing operations a rasterizer provides.
///
/// Coordinates are in the surface's current space, which `transform` and
/// `save`/`restore` manipulate the way a 2D canvas does.
pub trait DrawingSurface {
    fn save(&mut self);
    fn restore(&mut self);
    /// Pre-multiply the current transform.
    fn transform(&mut self, transform: &Transform);
    fn clip_rect(&mut self, rect: Rect, anti_alias: bool);
    fn clip_rrect(&mut self, rrect: RRect, anti_alias: bool);
    fn clip_path(&mut self, path: &Path, anti_alias: bool);
    /// Alpha applied to everything drawn until the matching `restore`.
    fn set_global_alpha(&mut self, alpha: f32);
    fn fill_rect(&mut self, rect: Rect, fill: &Fill);
    fn fill_rrect(&mut self, rrect: RRect, fill: &Fill);
    fn stroke_rect(&mut self, rect: Rect, border: Border);
    fn stroke_rrect(&mut self, rrect: RRect, border: Border);
    fn fill_path(&mut self, path: &Path, fill: &Fill);
    fn draw_text(&mut self, text: &str, style: &TextStyle, rect: Rect);
    /// Draw the `src` region of `image` into `dst`.
    fn draw_image(&mut self, image: &ImageHandle, src: Rect, dst: Rect);
}
