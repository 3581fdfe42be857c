use crate::geometry::Offset;

/// Row-major 4x4 matrix.
///
/// Painting and hit testing only read the 2D affine part; the full matrix
/// is kept so composition matches what a surface applies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub data: [f32; 16],
}

// Indices of the affine coefficients within `data`
const A: usize = 0;
const B: usize = 1;
const TX: usize = 3;
const C: usize = 4;
const D: usize = 5;
const TY: usize = 7;

impl Transform {
    pub const IDENTITY: Self = Self::from_affine(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// `x' = a*x + b*y + tx`, `y' = c*x + d*y + ty`.
    pub const fn from_affine(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        let mut data = [0.0; 16];
        data[A] = a;
        data[B] = b;
        data[TX] = tx;
        data[C] = c;
        data[D] = d;
        data[TY] = ty;
        data[10] = 1.0;
        data[15] = 1.0;
        Self { data }
    }

    pub fn translate(x: f32, y: f32) -> Self {
        Self::from_affine(1.0, 0.0, 0.0, 1.0, x, y)
    }

    pub fn translate_offset(offset: Offset) -> Self {
        Self::translate(offset.x, offset.y)
    }

    /// Positive angles turn clockwise on a y-down surface.
    pub fn rotate(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::from_affine(cos, -sin, sin, cos, 0.0, 0.0)
    }

    pub fn rotate_degrees(degrees: f32) -> Self {
        Self::rotate(degrees.to_radians())
    }

    pub fn scale(factor: f32) -> Self {
        Self::scale_xy(factor, factor)
    }

    pub fn scale_xy(sx: f32, sy: f32) -> Self {
        Self::from_affine(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Shear by `alpha` along x and `beta` along y, in radians.
    pub fn skew(alpha: f32, beta: f32) -> Self {
        Self::from_affine(1.0, alpha.tan(), beta.tan(), 1.0, 0.0, 0.0)
    }

    /// `self * other`: `other` applies to a point first.
    pub fn then(&self, other: &Transform) -> Transform {
        let data = std::array::from_fn(|index| {
            let (row, col) = (index / 4, index % 4);
            (0..4)
                .map(|k| self.data[row * 4 + k] * other.data[k * 4 + col])
                .sum()
        });
        Transform { data }
    }

    /// `T(pivot) * self * T(-pivot)`.
    pub fn about(&self, pivot: Offset) -> Transform {
        Transform::translate_offset(pivot)
            .then(self)
            .then(&Transform::translate_offset(-pivot))
    }

    /// Inverse of the affine part; `None` when it collapses the plane.
    pub fn try_inverse(&self) -> Option<Transform> {
        let [a, b, c, d, tx, ty] = self.affine();
        let det = a * d - b * c;
        if !det.is_finite() || det.abs() < 1e-10 {
            return None;
        }
        let r = det.recip();
        Some(Transform::from_affine(
            d * r,
            -b * r,
            -c * r,
            a * r,
            (b * ty - d * tx) * r,
            (c * tx - a * ty) * r,
        ))
    }

    pub fn transform_point(&self, point: Offset) -> Offset {
        let [a, b, c, d, tx, ty] = self.affine();
        Offset::new(a * point.x + b * point.y + tx, c * point.x + d * point.y + ty)
    }

    /// The offset, when this only translates.
    pub fn as_translation(&self) -> Option<Offset> {
        let [a, b, c, d, tx, ty] = self.affine();
        (a == 1.0 && b == 0.0 && c == 0.0 && d == 1.0).then(|| Offset::new(tx, ty))
    }

    /// `[a, b, c, d, tx, ty]`
    pub fn affine(&self) -> [f32; 6] {
        [A, B, C, D, TX, TY].map(|i| self.data[i])
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn assert_point(p: Offset, x: f32, y: f32) {
        assert!(approx_eq(p.x, x) && approx_eq(p.y, y), "{p:?} != ({x}, {y})");
    }

    #[test]
    fn test_identity() {
        let t = Transform::identity();
        assert!(t.is_identity());
        assert_eq!(t.as_translation(), Some(Offset::ZERO));
    }

    #[test]
    fn test_translate() {
        let t = Transform::translate(10.0, 20.0);
        assert_point(t.transform_point(Offset::new(5.0, 5.0)), 15.0, 25.0);
        assert_eq!(t.as_translation(), Some(Offset::new(10.0, 20.0)));
    }

    #[test]
    fn test_rotate() {
        let t = Transform::rotate_degrees(90.0);
        assert_point(t.transform_point(Offset::new(1.0, 0.0)), 0.0, 1.0);
        assert!(t.as_translation().is_none());
    }

    #[test]
    fn test_scale_and_skew() {
        let t = Transform::scale_xy(2.0, 3.0);
        assert_point(t.transform_point(Offset::new(1.0, 1.0)), 2.0, 3.0);

        let s = Transform::skew(std::f32::consts::FRAC_PI_4, 0.0);
        assert_point(s.transform_point(Offset::new(0.0, 2.0)), 2.0, 2.0);
    }

    #[test]
    fn test_compose() {
        // Translate first, then scale
        let composed = Transform::scale(2.0).then(&Transform::translate(10.0, 0.0));
        assert_point(composed.transform_point(Offset::ZERO), 20.0, 0.0);
    }

    #[test]
    fn test_about_pivot() {
        // Scaling about (50,50) keeps the pivot fixed
        let t = Transform::scale(2.0).about(Offset::new(50.0, 50.0));
        assert_point(t.transform_point(Offset::new(50.0, 50.0)), 50.0, 50.0);
        assert_point(t.transform_point(Offset::new(60.0, 50.0)), 70.0, 50.0);
    }

    #[test]
    fn test_inverse_roundtrip() {
        for t in [
            Transform::translate(10.0, 20.0),
            Transform::rotate_degrees(45.0),
            Transform::scale(2.0),
            Transform::rotate_degrees(30.0).then(&Transform::translate(4.0, -7.0)),
        ] {
            let inv = t.try_inverse().expect("invertible");
            assert_point(t.then(&inv).transform_point(Offset::new(3.0, 4.0)), 3.0, 4.0);
        }
    }

    #[test]
    fn test_singular_has_no_inverse() {
        assert!(Transform::scale(0.0).try_inverse().is_none());
        assert!(Transform::scale_xy(1.0, 0.0).try_inverse().is_none());
    }
}
