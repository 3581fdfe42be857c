//! Draw command definitions and a surface that records them.

use super::{Border, DrawingSurface, Fill, Path, RRect};
use crate::geometry::Rect;
use crate::image::ImageHandle;
use crate::text::TextStyle;
use crate::transform::Transform;

/// A single surface operation, in the coordinates it was issued with.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    Transform(Transform),
    ClipRect {
        rect: Rect,
        anti_alias: bool,
    },
    ClipRRect {
        rrect: RRect,
        anti_alias: bool,
    },
    ClipPath {
        path: Path,
        anti_alias: bool,
    },
    GlobalAlpha(f32),
    FillRect {
        rect: Rect,
        fill: Fill,
    },
    FillRRect {
        rrect: RRect,
        fill: Fill,
    },
    StrokeRect {
        rect: Rect,
        border: Border,
    },
    StrokeRRect {
        rrect: RRect,
        border: Border,
    },
    FillPath {
        path: Path,
        fill: Fill,
    },
    Text {
        text: String,
        style: TextStyle,
        rect: Rect,
    },
    Image {
        image: ImageHandle,
        src: Rect,
        dst: Rect,
    },
}

/// A [`DrawingSurface`] that keeps every command, for tests and debugging.
///
/// It also tracks the save depth so unbalanced save/restore pairs show up.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    depth: usize,
    max_depth: usize,
    unmatched_restores: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Current number of open saves.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Restores issued with no save open.
    pub fn unmatched_restores(&self) -> usize {
        self.unmatched_restores
    }

    /// Rects of all `FillRect` commands, in order.
    pub fn filled_rects(&self) -> Vec<Rect> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| predicate(c)).count()
    }
}

impl DrawingSurface for RecordingSurface {
    fn save(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if self.depth == 0 {
            self.unmatched_restores += 1;
        } else {
            self.depth -= 1;
        }
        self.commands.push(DrawCommand::Restore);
    }

    fn transform(&mut self, transform: &Transform) {
        self.commands.push(DrawCommand::Transform(*transform));
    }

    fn clip_rect(&mut self, rect: Rect, anti_alias: bool) {
        self.commands.push(DrawCommand::ClipRect { rect, anti_alias });
    }

    fn clip_rrect(&mut self, rrect: RRect, anti_alias: bool) {
        self.commands
            .push(DrawCommand::ClipRRect { rrect, anti_alias });
    }

    fn clip_path(&mut self, path: &Path, anti_alias: bool) {
        self.commands.push(DrawCommand::ClipPath {
            path: path.clone(),
            anti_alias,
        });
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::GlobalAlpha(alpha));
    }

    fn fill_rect(&mut self, rect: Rect, fill: &Fill) {
        self.commands.push(DrawCommand::FillRect { rect, fill: *fill });
    }

    fn fill_rrect(&mut self, rrect: RRect, fill: &Fill) {
        self.commands
            .push(DrawCommand::FillRRect { rrect, fill: *fill });
    }

    fn stroke_rect(&mut self, rect: Rect, border: Border) {
        self.commands.push(DrawCommand::StrokeRect { rect, border });
    }

    fn stroke_rrect(&mut self, rrect: RRect, border: Border) {
        self.commands
            .push(DrawCommand::StrokeRRect { rrect, border });
    }

    fn fill_path(&mut self, path: &Path, fill: &Fill) {
        self.commands.push(DrawCommand::FillPath {
            path: path.clone(),
            fill: *fill,
        });
    }

    fn draw_text(&mut self, text: &str, style: &TextStyle, rect: Rect) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            style: style.clone(),
            rect,
        });
    }

    fn draw_image(&mut self, image: &ImageHandle, src: Rect, dst: Rect) {
        self.commands.push(DrawCommand::Image {
            image: image.clone(),
            src,
            dst,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::painting::Color;

    #[test]
    fn test_depth_tracking() {
        let mut surface = RecordingSurface::new();
        surface.save();
        surface.save();
        surface.restore();
        assert_eq!(surface.depth(), 1);
        assert_eq!(surface.max_depth(), 2);
        surface.restore();
        surface.restore();
        assert_eq!(surface.depth(), 0);
        assert_eq!(surface.unmatched_restores(), 1);
    }

    #[test]
    fn test_filled_rects() {
        let mut surface = RecordingSurface::new();
        surface.fill_rect(Rect::new(0.0, 0.0, 5.0, 5.0), &Fill::Solid(Color::RED));
        surface.stroke_rect(Rect::new(1.0, 1.0, 2.0, 2.0), Border::new(1.0, Color::BLACK));
        assert_eq!(surface.filled_rects(), vec![Rect::new(0.0, 0.0, 5.0, 5.0)]);
        assert_eq!(surface.count(|c| matches!(c, DrawCommand::StrokeRect { .. })), 1);
    }
}
