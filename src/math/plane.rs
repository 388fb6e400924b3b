use glam::{Vec3, Vec4};

/// Plane in constant-normal form: a point `p` is on the inside when
/// `normal · p + d >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    #[must_use]
    pub fn new(normal: Vec3, d: f32) -> Self {
        Self { normal, d }
    }

    /// Builds a plane from the `(a, b, c, d)` coefficients of
    /// `a·x + b·y + c·z + d = 0`.
    #[must_use]
    pub fn from_coefficients(v: Vec4) -> Self {
        Self {
            normal: Vec3::new(v.x, v.y, v.z),
            d: v.w,
        }
    }

    /// Signed distance from the plane to `p` (positive on the inside).
    #[inline]
    #[must_use]
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.d
    }

    /// Scales the coefficients so the normal has unit length.
    ///
    /// A degenerate plane (zero-length normal) is left untouched.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let length = self.normal.length();
        if length > 1e-6 {
            Self {
                normal: self.normal / length,
                d: self.d / length,
            }
        } else {
            *self
        }
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self {
            normal: Vec3::Y,
            d: 0.0,
        }
    }
}
