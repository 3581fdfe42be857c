use crate::geometry::{EdgeInsets, Offset};

use super::Axis;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub const fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }

    pub const fn infinite() -> Self {
        Self {
            width: f32::INFINITY,
            height: f32::INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }

    /// Whether a local position lies inside `(0,0)..(width,height)`.
    pub fn contains(&self, position: Offset) -> bool {
        position.x >= 0.0 && position.x < self.width && position.y >= 0.0 && position.y < self.height
    }

    pub fn main_axis(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    pub fn cross_axis(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.height,
            Axis::Vertical => self.width,
        }
    }

    /// Build a size from main/cross extents along `axis`.
    pub fn from_axes(axis: Axis, main: f32, cross: f32) -> Self {
        match axis {
            Axis::Horizontal => Size::new(main, cross),
            Axis::Vertical => Size::new(cross, main),
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::zero()
    }
}

/// Min/max width and height bounds handed down during layout.
///
/// Well-formed constraints satisfy `0 <= min <= max` on both axes and never
/// carry an infinite minimum; maxima may be `f32::INFINITY`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxConstraints {
    pub min_width: f32,
    pub min_height: f32,
    pub max_width: f32,
    pub max_height: f32,
}

impl BoxConstraints {
    pub const fn new(min_width: f32, min_height: f32, max_width: f32, max_height: f32) -> Self {
        Self {
            min_width,
            min_height,
            max_width,
            max_height,
        }
    }

    pub fn tight(size: Size) -> Self {
        Self {
            min_width: size.width,
            min_height: size.height,
            max_width: size.width,
            max_height: size.height,
        }
    }

    /// Tight on the axes that are given, unbounded on the others.
    pub fn tight_for(width: Option<f32>, height: Option<f32>) -> Self {
        Self {
            min_width: width.unwrap_or(0.0),
            min_height: height.unwrap_or(0.0),
            max_width: width.unwrap_or(f32::INFINITY),
            max_height: height.unwrap_or(f32::INFINITY),
        }
    }

    pub fn loose(size: Size) -> Self {
        Self {
            min_width: 0.0,
            min_height: 0.0,
            max_width: size.width,
            max_height: size.height,
        }
    }

    pub fn unbounded() -> Self {
        Self {
            min_width: 0.0,
            min_height: 0.0,
            max_width: f32::INFINITY,
            max_height: f32::INFINITY,
        }
    }

    /// Bound only the cross axis of `axis` by `max_cross`; the main axis is free.
    pub fn cross_bounded(axis: Axis, max_cross: f32) -> Self {
        match axis {
            Axis::Horizontal => Self::new(0.0, 0.0, f32::INFINITY, max_cross),
            Axis::Vertical => Self::new(0.0, 0.0, max_cross, f32::INFINITY),
        }
    }

    /// Force the given extents, clamped into these constraints.
    pub fn tighten(&self, width: Option<f32>, height: Option<f32>) -> Self {
        let mut result = *self;
        if let Some(w) = width {
            let w = w.clamp(self.min_width, self.max_width);
            result.min_width = w;
            result.max_width = w;
        }
        if let Some(h) = height {
            let h = h.clamp(self.min_height, self.max_height);
            result.min_height = h;
            result.max_height = h;
        }
        result
    }

    /// Drop the minimums to zero.
    pub fn loosen(&self) -> Self {
        Self {
            min_width: 0.0,
            min_height: 0.0,
            ..*self
        }
    }

    /// Clamp every bound of `self` into `outer`.
    pub fn enforce(&self, outer: BoxConstraints) -> Self {
        Self {
            min_width: self.min_width.clamp(outer.min_width, outer.max_width),
            max_width: self.max_width.clamp(outer.min_width, outer.max_width),
            min_height: self.min_height.clamp(outer.min_height, outer.max_height),
            max_height: self.max_height.clamp(outer.min_height, outer.max_height),
        }
    }

    /// Subtract a fixed inset from both bounds, never going below zero.
    pub fn deflate(&self, insets: EdgeInsets) -> Self {
        let horizontal = insets.horizontal();
        let vertical = insets.vertical();
        let min_width = (self.min_width - horizontal).max(0.0);
        let min_height = (self.min_height - vertical).max(0.0);
        Self {
            min_width,
            min_height,
            max_width: (self.max_width - horizontal).max(min_width),
            max_height: (self.max_height - vertical).max(min_height),
        }
    }

    pub fn constrain(&self, size: Size) -> Size {
        Size {
            width: self.constrain_width(size.width),
            height: self.constrain_height(size.height),
        }
    }

    pub fn constrain_width(&self, width: f32) -> f32 {
        width.max(self.min_width).min(self.max_width)
    }

    pub fn constrain_height(&self, height: f32) -> f32 {
        height.max(self.min_height).min(self.max_height)
    }

    /// Constrain `size` while keeping its aspect ratio where the bounds allow.
    pub fn constrain_size_and_attempt_to_preserve_aspect_ratio(&self, size: Size) -> Size {
        if self.is_tight() {
            return self.smallest();
        }
        if size.width <= 0.0 || size.height <= 0.0 {
            return self.constrain(size);
        }

        let aspect = size.width / size.height;
        let mut width = size.width;
        let mut height = size.height;

        if width > self.max_width {
            width = self.max_width;
            height = width / aspect;
        }
        if height > self.max_height {
            height = self.max_height;
            width = height * aspect;
        }
        if width < self.min_width {
            width = self.min_width;
            height = width / aspect;
        }
        if height < self.min_height {
            height = self.min_height;
            width = height * aspect;
        }

        self.constrain(Size::new(width, height))
    }

    pub fn max_size(&self) -> Size {
        Size {
            width: self.max_width,
            height: self.max_height,
        }
    }

    /// The largest size that satisfies the constraints.
    pub fn biggest(&self) -> Size {
        self.constrain(Size::infinite())
    }

    /// The smallest size that satisfies the constraints.
    pub fn smallest(&self) -> Size {
        self.constrain(Size::zero())
    }

    pub fn is_tight(&self) -> bool {
        self.min_width == self.max_width && self.min_height == self.max_height
    }

    pub fn has_bounded_width(&self) -> bool {
        self.max_width < f32::INFINITY
    }

    pub fn has_bounded_height(&self) -> bool {
        self.max_height < f32::INFINITY
    }

    pub fn has_infinite_width(&self) -> bool {
        self.min_width >= f32::INFINITY || self.max_width >= f32::INFINITY
    }

    pub fn has_infinite_height(&self) -> bool {
        self.min_height >= f32::INFINITY || self.max_height >= f32::INFINITY
    }

    pub fn max_main(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.max_width,
            Axis::Vertical => self.max_height,
        }
    }

    pub fn max_cross(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.max_height,
            Axis::Vertical => self.max_width,
        }
    }

    /// `0 <= min <= max` per axis, minimums finite, nothing NaN.
    pub fn is_normalized(&self) -> bool {
        self.min_width >= 0.0
            && self.min_height >= 0.0
            && self.min_width <= self.max_width
            && self.min_height <= self.max_height
            && self.min_width.is_finite()
            && self.min_height.is_finite()
    }

    /// Whether `size` lies within the bounds, with a small tolerance for
    /// float accumulation in the layout algorithms.
    pub fn is_satisfied_by(&self, size: Size) -> bool {
        const EPSILON: f32 = 1e-3;
        size.width >= self.min_width - EPSILON
            && size.width <= self.max_width + EPSILON
            && size.height >= self.min_height - EPSILON
            && size.height <= self.max_height + EPSILON
    }
}

impl Default for BoxConstraints {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_is_empty() {
        assert!(Size::zero().is_empty());
        assert!(Size::new(0.0, 10.0).is_empty());
        assert!(Size::new(10.0, 0.0).is_empty());
        assert!(Size::new(-5.0, 10.0).is_empty());
        assert!(!Size::new(10.0, 10.0).is_empty());
    }

    #[test]
    fn test_size_axes() {
        let size = Size::new(30.0, 40.0);
        assert_eq!(size.main_axis(Axis::Horizontal), 30.0);
        assert_eq!(size.cross_axis(Axis::Horizontal), 40.0);
        assert_eq!(size.main_axis(Axis::Vertical), 40.0);
        assert_eq!(Size::from_axes(Axis::Vertical, 40.0, 30.0), size);
    }

    #[test]
    fn test_constraints_tight() {
        let c = BoxConstraints::tight(Size::new(50.0, 75.0));
        assert_eq!(c.min_width, 50.0);
        assert_eq!(c.max_height, 75.0);
        assert!(c.is_tight());
    }

    #[test]
    fn test_constraints_tight_for_partial() {
        let c = BoxConstraints::tight_for(Some(20.0), None);
        assert_eq!(c.min_width, 20.0);
        assert_eq!(c.max_width, 20.0);
        assert_eq!(c.min_height, 0.0);
        assert_eq!(c.max_height, f32::INFINITY);
        assert!(!c.is_tight());
    }

    #[test]
    fn test_constraints_constrain() {
        let c = BoxConstraints::new(10.0, 20.0, 100.0, 200.0);
        assert_eq!(c.constrain(Size::new(50.0, 50.0)), Size::new(50.0, 50.0));
        assert_eq!(c.constrain(Size::new(5.0, 15.0)), Size::new(10.0, 20.0));
        assert_eq!(c.constrain(Size::new(150.0, 250.0)), Size::new(100.0, 200.0));
        assert_eq!(c.constrain(Size::new(5.0, 250.0)), Size::new(10.0, 200.0));
    }

    #[test]
    fn test_constrain_is_idempotent() {
        let all = [
            BoxConstraints::new(10.0, 20.0, 100.0, 200.0),
            BoxConstraints::tight(Size::new(5.0, 5.0)),
            BoxConstraints::unbounded(),
            BoxConstraints::new(0.0, 0.0, 0.0, f32::INFINITY),
        ];
        let sizes = [
            Size::zero(),
            Size::new(1e6, 3.0),
            Size::new(42.0, 1e9),
            Size::new(7.5, 7.5),
        ];
        for c in all {
            for s in sizes {
                let once = c.constrain(s);
                assert!(c.is_satisfied_by(once), "{c:?} {s:?}");
                assert_eq!(c.constrain(once), once);
            }
        }
    }

    #[test]
    fn test_tighten_clamps_into_bounds() {
        let c = BoxConstraints::new(10.0, 10.0, 50.0, 50.0);
        let t = c.tighten(Some(80.0), None);
        assert_eq!(t.min_width, 50.0);
        assert_eq!(t.max_width, 50.0);
        assert_eq!(t.min_height, 10.0);
        assert_eq!(t.max_height, 50.0);
    }

    #[test]
    fn test_loosen_and_enforce() {
        let c = BoxConstraints::tight(Size::new(40.0, 40.0)).loosen();
        assert_eq!(c, BoxConstraints::new(0.0, 0.0, 40.0, 40.0));

        let inner = BoxConstraints::tight(Size::new(100.0, 10.0));
        let outer = BoxConstraints::new(0.0, 20.0, 60.0, 60.0);
        let enforced = inner.enforce(outer);
        assert_eq!(enforced, BoxConstraints::new(60.0, 20.0, 60.0, 20.0));
    }

    #[test]
    fn test_deflate() {
        let c = BoxConstraints::new(10.0, 10.0, 100.0, f32::INFINITY);
        let d = c.deflate(EdgeInsets::all(8.0));
        assert_eq!(d.min_width, 0.0);
        assert_eq!(d.max_width, 84.0);
        assert_eq!(d.max_height, f32::INFINITY);

        let narrow = BoxConstraints::tight(Size::new(4.0, 4.0)).deflate(EdgeInsets::all(8.0));
        assert_eq!(narrow, BoxConstraints::tight(Size::zero()));
    }

    #[test]
    fn test_aspect_ratio_preservation() {
        let c = BoxConstraints::loose(Size::new(100.0, 100.0));
        let s = c.constrain_size_and_attempt_to_preserve_aspect_ratio(Size::new(400.0, 200.0));
        assert_eq!(s, Size::new(100.0, 50.0));

        let tight = BoxConstraints::tight(Size::new(30.0, 30.0));
        let s = tight.constrain_size_and_attempt_to_preserve_aspect_ratio(Size::new(400.0, 200.0));
        assert_eq!(s, Size::new(30.0, 30.0));
    }

    #[test]
    fn test_normalization() {
        assert!(BoxConstraints::unbounded().is_normalized());
        assert!(!BoxConstraints::new(10.0, 0.0, 5.0, 5.0).is_normalized());
        assert!(!BoxConstraints::new(f32::INFINITY, 0.0, f32::INFINITY, 5.0).is_normalized());
        assert!(!BoxConstraints::new(-1.0, 0.0, 5.0, 5.0).is_normalized());
    }

    #[test]
    fn test_biggest_smallest() {
        let c = BoxConstraints::new(10.0, 20.0, 100.0, f32::INFINITY);
        assert_eq!(c.smallest(), Size::new(10.0, 20.0));
        assert_eq!(c.biggest(), Size::new(100.0, f32::INFINITY));
        assert!(c.has_bounded_width());
        assert!(!c.has_bounded_height());
        assert!(c.has_infinite_height());
    }
}
