use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use crate::layout::Size;

/// A 2D point or displacement in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub x: f32,
    pub y: f32,
}

impl Offset {
    pub const ZERO: Offset = Offset::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Offset {
    fn add_assign(&mut self, rhs: Offset) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Offset {
    type Output = Offset;

    fn sub(self, rhs: Offset) -> Offset {
        Offset::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Offset {
    type Output = Offset;

    fn neg(self) -> Offset {
        Offset::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Offset {
    type Output = Offset;

    fn mul(self, rhs: f32) -> Offset {
        Offset::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: size.width,
            height: size.height,
        }
    }

    pub fn from_offset_size(offset: Offset, size: Size) -> Self {
        Self {
            x: offset.x,
            y: offset.y,
            width: size.width,
            height: size.height,
        }
    }

    pub fn origin(&self) -> Offset {
        Offset::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn translate(&self, offset: Offset) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            ..*self
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    pub fn contains(&self, point: Offset) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Check if a point is inside this rect with rounded corners.
    /// The corner_radius is clamped to half of the smaller dimension.
    pub fn contains_rounded(&self, point: Offset, corner_radius: f32) -> bool {
        if !self.contains(point) {
            return false;
        }
        if corner_radius <= 0.0 {
            return true;
        }

        let max_radius = (self.width.min(self.height) / 2.0).max(0.0);
        let r = corner_radius.min(max_radius);

        // Pick the corner circle the point falls into, if any
        let cx = if point.x < self.x + r {
            self.x + r
        } else if point.x > self.right() - r {
            self.right() - r
        } else {
            return true;
        };
        let cy = if point.y < self.y + r {
            self.y + r
        } else if point.y > self.bottom() - r {
            self.bottom() - r
        } else {
            return true;
        };

        let dx = point.x - cx;
        let dy = point.y - cy;
        dx * dx + dy * dy <= r * r
    }
}

/// Insets on each side of a box, used by padding and deflated constraints.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeInsets {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl EdgeInsets {
    pub const ZERO: EdgeInsets = EdgeInsets {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    pub fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn is_non_negative(&self) -> bool {
        self.top >= 0.0 && self.right >= 0.0 && self.bottom >= 0.0 && self.left >= 0.0
    }

    /// Offset of the content box's top-left corner.
    pub fn top_left(&self) -> Offset {
        Offset::new(self.left, self.top)
    }

    /// Override the top inset.
    pub fn top(mut self, v: f32) -> Self {
        self.top = v;
        self
    }

    /// Override the bottom inset.
    pub fn bottom(mut self, v: f32) -> Self {
        self.bottom = v;
        self
    }

    /// Override the left inset.
    pub fn left(mut self, v: f32) -> Self {
        self.left = v;
        self
    }

    /// Override the right inset.
    pub fn right(mut self, v: f32) -> Self {
        self.right = v;
        self
    }
}

impl From<f32> for EdgeInsets {
    fn from(v: f32) -> Self {
        EdgeInsets::all(v)
    }
}

/// `[vertical, horizontal]`, the CSS-style 2-value shorthand.
impl From<[f32; 2]> for EdgeInsets {
    fn from(v: [f32; 2]) -> Self {
        EdgeInsets::symmetric(v[1], v[0])
    }
}

/// `[top, right, bottom, left]`, the CSS-style 4-value shorthand.
impl From<[f32; 4]> for EdgeInsets {
    fn from(v: [f32; 4]) -> Self {
        EdgeInsets {
            top: v[0],
            right: v[1],
            bottom: v[2],
            left: v[3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_arithmetic() {
        let a = Offset::new(3.0, 4.0);
        let b = Offset::new(1.0, 2.0);
        assert_eq!(a + b, Offset::new(4.0, 6.0));
        assert_eq!(a - b, Offset::new(2.0, 2.0));
        assert_eq!(-a, Offset::new(-3.0, -4.0));
        assert_eq!(a * 2.0, Offset::new(6.0, 8.0));
        assert!(Offset::ZERO.is_zero());
    }

    #[test]
    fn test_rect_contains_is_half_open() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Offset::new(10.0, 10.0)));
        assert!(r.contains(Offset::new(29.9, 29.9)));
        assert!(!r.contains(Offset::new(30.0, 15.0)));
        assert!(!r.contains(Offset::new(9.9, 15.0)));
    }

    #[test]
    fn test_rect_contains_rounded_corners() {
        let r = Rect::new(0.0, 0.0, 100.0, 100.0);
        // Corner pixel is outside a 20px radius
        assert!(!r.contains_rounded(Offset::new(1.0, 1.0), 20.0));
        // Edge midpoint is inside
        assert!(r.contains_rounded(Offset::new(50.0, 1.0), 20.0));
        // Inside the corner circle
        assert!(r.contains_rounded(Offset::new(10.0, 10.0), 20.0));
        // Zero radius degenerates to plain containment
        assert!(r.contains_rounded(Offset::new(0.5, 0.5), 0.0));
    }

    #[test]
    fn test_rect_translate_and_intersects() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).translate(Offset::new(5.0, 5.0));
        assert_eq!(r, Rect::new(5.0, 5.0, 10.0, 10.0));
        assert!(r.intersects(&Rect::new(14.0, 14.0, 5.0, 5.0)));
        assert!(!r.intersects(&Rect::new(15.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn test_edge_insets_shorthands() {
        let e = EdgeInsets::from([4.0, 8.0]);
        assert_eq!(e.vertical(), 8.0);
        assert_eq!(e.horizontal(), 16.0);

        let e = EdgeInsets::from([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(e.top_left(), Offset::new(4.0, 1.0));
        assert_eq!(EdgeInsets::all(2.0).left(0.0).horizontal(), 2.0);
        assert!(EdgeInsets::ZERO.is_zero());
        assert!(!EdgeInsets::all(-1.0).is_non_negative());
    }
}
