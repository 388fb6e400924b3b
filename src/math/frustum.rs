use glam::{Affine3A, Mat4, Vec3};

use crate::math::{Aabb, Plane, Sphere};

/// Result of testing a volume against the frustum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// Entirely outside at least one plane.
    Outside,
    /// Straddles one or more planes.
    Intersect,
    /// Entirely inside all six planes.
    Inside,
}

/// Viewing volume bounded by six planes, extracted from a view-projection
/// matrix with the Gribb-Hartmann method.
///
/// Plane order: left, right, bottom, top, near, far. Every plane normal is
/// normalized to unit length so signed distances are in world units.
///
/// The three-state tests let the octree take whole subtrees when a node is
/// [`Containment::Inside`] and prune when it is [`Containment::Outside`];
/// only [`Containment::Intersect`] nodes need per-object tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the six planes from the rows of a view-projection matrix.
    ///
    /// Assumes a `[0, 1]` clip-space depth range (wgpu convention): the near
    /// plane is the third row itself, the far plane `row3 - row2`.
    #[must_use]
    pub fn from_matrix(vp: Mat4) -> Self {
        let r0 = vp.row(0);
        let r1 = vp.row(1);
        let r2 = vp.row(2);
        let r3 = vp.row(3);

        let planes = [
            Plane::from_coefficients(r3 + r0), // left
            Plane::from_coefficients(r3 - r0), // right
            Plane::from_coefficients(r3 + r1), // bottom
            Plane::from_coefficients(r3 - r1), // top
            Plane::from_coefficients(r2),      // near (0..1 depth)
            Plane::from_coefficients(r3 - r2), // far
        ]
        .map(|p| p.normalized());

        Self { planes }
    }

    /// Re-extracts the planes in place (avoids rebuilding the struct).
    pub fn update_from_matrix(&mut self, vp: Mat4) {
        *self = Self::from_matrix(vp);
    }

    /// Read-only access to the planes (left, right, bottom, top, near, far).
    #[must_use]
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// Tests a point. A point is never [`Containment::Intersect`].
    #[must_use]
    pub fn test_point(&self, p: Vec3) -> Containment {
        for plane in &self.planes {
            if plane.signed_distance(p) < 0.0 {
                return Containment::Outside;
            }
        }
        Containment::Inside
    }

    /// Tests a sphere: outside when any plane distance drops below `-r`,
    /// intersecting when any distance magnitude is within `r`.
    #[must_use]
    pub fn test_sphere(&self, sphere: &Sphere) -> Containment {
        let mut result = Containment::Inside;
        for plane in &self.planes {
            let dist = plane.signed_distance(sphere.center);
            if dist < -sphere.radius {
                return Containment::Outside;
            }
            if dist.abs() <= sphere.radius {
                result = Containment::Intersect;
            }
        }
        result
    }

    /// Tests an AABB using the p-vertex/n-vertex optimization.
    ///
    /// For each plane the box extent is projected onto the plane normal; a
    /// plane may fully exclude a box whose center projects inside, which the
    /// projected-radius comparison rejects correctly.
    #[must_use]
    pub fn test_aabb(&self, aabb: &Aabb) -> Containment {
        let center = aabb.center();
        let extent = aabb.half_extent();

        let mut result = Containment::Inside;
        for plane in &self.planes {
            let projected_radius = extent.dot(plane.normal.abs());
            let dist = plane.signed_distance(center);

            if dist < -projected_radius {
                return Containment::Outside;
            }
            if dist < projected_radius {
                result = Containment::Intersect;
            }
        }
        result
    }

    /// Transforms a local-space AABB to world space, then tests it.
    #[must_use]
    pub fn test_aabb_world(&self, local: &Aabb, model: &Affine3A) -> Containment {
        self.test_aabb(&local.transform(model))
    }

    /// Convenience boolean: anything not [`Containment::Outside`] is visible.
    #[inline]
    #[must_use]
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.test_aabb(aabb) != Containment::Outside
    }

    #[inline]
    #[must_use]
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        self.test_sphere(sphere) != Containment::Outside
    }
}
