use crate::geometry::{Offset, Rect};
use crate::layout::Size;

/// A point within a box, expressed relative to its center.
///
/// `x` and `y` range from `-1.0` (left/top edge) to `1.0` (right/bottom
/// edge); `(0, 0)` is the center. Values outside that range address points
/// outside the box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    pub x: f32,
    pub y: f32,
}

impl Alignment {
    pub const TOP_LEFT: Self = Self::new(-1.0, -1.0);
    pub const TOP_CENTER: Self = Self::new(0.0, -1.0);
    pub const TOP_RIGHT: Self = Self::new(1.0, -1.0);
    pub const CENTER_LEFT: Self = Self::new(-1.0, 0.0);
    pub const CENTER: Self = Self::new(0.0, 0.0);
    pub const CENTER_RIGHT: Self = Self::new(1.0, 0.0);
    pub const BOTTOM_LEFT: Self = Self::new(-1.0, 1.0);
    pub const BOTTOM_CENTER: Self = Self::new(0.0, 1.0);
    pub const BOTTOM_RIGHT: Self = Self::new(1.0, 1.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Resolve to a point inside a box of the given size.
    pub fn along_size(&self, size: Size) -> Offset {
        let center_x = size.width / 2.0;
        let center_y = size.height / 2.0;
        Offset::new(center_x + self.x * center_x, center_y + self.y * center_y)
    }

    /// Offset that places a `child` box inside a `parent` box at this alignment.
    pub fn along_free_space(&self, parent: Size, child: Size) -> Offset {
        let half_dx = (parent.width - child.width) / 2.0;
        let half_dy = (parent.height - child.height) / 2.0;
        Offset::new(half_dx + self.x * half_dx, half_dy + self.y * half_dy)
    }

    /// Rect of `size` positioned inside `rect` at this alignment.
    pub fn inscribe(&self, size: Size, rect: Rect) -> Rect {
        let offset = self.along_free_space(rect.size(), size);
        Rect::from_offset_size(rect.origin() + offset, size)
    }

    pub fn is_center(&self) -> bool {
        *self == Self::CENTER
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Self::TOP_LEFT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_constants_along_size() {
        let size = Size::new(200.0, 100.0);

        let p = Alignment::CENTER.along_size(size);
        assert!(approx_eq(p.x, 100.0) && approx_eq(p.y, 50.0));

        let p = Alignment::TOP_LEFT.along_size(size);
        assert!(approx_eq(p.x, 0.0) && approx_eq(p.y, 0.0));

        let p = Alignment::BOTTOM_RIGHT.along_size(size);
        assert!(approx_eq(p.x, 200.0) && approx_eq(p.y, 100.0));

        let p = Alignment::CENTER_RIGHT.along_size(size);
        assert!(approx_eq(p.x, 200.0) && approx_eq(p.y, 50.0));
    }

    #[test]
    fn test_free_space() {
        let parent = Size::new(100.0, 100.0);
        let child = Size::new(20.0, 40.0);

        assert_eq!(Alignment::TOP_LEFT.along_free_space(parent, child), Offset::ZERO);
        assert_eq!(
            Alignment::CENTER.along_free_space(parent, child),
            Offset::new(40.0, 30.0)
        );
        assert_eq!(
            Alignment::BOTTOM_RIGHT.along_free_space(parent, child),
            Offset::new(80.0, 60.0)
        );
    }

    #[test]
    fn test_inscribe() {
        let rect = Rect::new(10.0, 10.0, 100.0, 50.0);
        let r = Alignment::BOTTOM_CENTER.inscribe(Size::new(20.0, 10.0), rect);
        assert_eq!(r, Rect::new(50.0, 50.0, 20.0, 10.0));
    }

    #[test]
    fn test_default() {
        assert_eq!(Alignment::default(), Alignment::TOP_LEFT);
        assert!(Alignment::CENTER.is_center());
    }
}
