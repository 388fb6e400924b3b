use glam::{Affine3A, Mat4, Vec3};

use crate::math::Frustum;

/// Pure stack render camera (POD), extracted once per frame for the
/// renderer so rendering never re-borrows the scene.
#[derive(Debug, Clone, Copy)]
pub struct RenderCamera {
    pub view_matrix: Mat4,
    pub projection_matrix: Mat4,
    pub view_projection_matrix: Mat4,
    /// World-space position, needed for specular lighting
    pub position: Vec3,
    /// Culling frustum extracted from the view-projection matrix
    pub frustum: Frustum,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective,
    Orthographic,
}

/// Camera component.
///
/// Projection parameters are authored; the view matrix is derived from the
/// owning node's world transform. View, projection, view-projection and the
/// culling [`Frustum`] are cached and refreshed by
/// [`update_view`](Self::update_view) / [`update_projection_matrix`](Self::update_projection_matrix).
#[derive(Debug, Clone)]
pub struct Camera {
    pub projection: Projection,
    /// Vertical field of view in radians (perspective only)
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Half-height of the view volume (orthographic only)
    pub ortho_size: f32,

    world_matrix: Affine3A,
    view_matrix: Mat4,
    projection_matrix: Mat4,
    view_projection_matrix: Mat4,
    frustum: Frustum,
}

impl Camera {
    /// Creates a perspective camera. `fov_y_degrees` is converted to radians.
    #[must_use]
    pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            projection: Projection::Perspective,
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near,
            far,
            ortho_size: 10.0,

            world_matrix: Affine3A::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
            frustum: Frustum::default(),
        };
        cam.update_projection_matrix();
        cam
    }

    /// Creates an orthographic camera with the given half-height.
    #[must_use]
    pub fn orthographic(size: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self::perspective(60.0, aspect, near, far);
        cam.projection = Projection::Orthographic;
        cam.ortho_size = size;
        cam.update_projection_matrix();
        cam
    }

    /// Rebuilds the projection matrix and the cached frustum.
    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = match self.projection {
            Projection::Perspective => {
                Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
            }
            Projection::Orthographic => {
                let h = self.ortho_size;
                let w = h * self.aspect;
                Mat4::orthographic_rh(-w, w, -h, h, self.near, self.far)
            }
        };
        self.refresh_derived();
    }

    /// Updates the view matrix from the owning node's world transform.
    pub fn update_view(&mut self, world_transform: &Affine3A) {
        self.world_matrix = *world_transform;
        self.view_matrix = Mat4::from(*world_transform).inverse();
        self.refresh_derived();
    }

    fn refresh_derived(&mut self) {
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
        self.frustum = Frustum::from_matrix(self.view_projection_matrix);
    }

    /// Updates the aspect ratio, typically on viewport resize.
    pub fn set_aspect(&mut self, aspect: f32) {
        if (self.aspect - aspect).abs() > f32::EPSILON {
            self.aspect = aspect;
            self.update_projection_matrix();
        }
    }

    /// Clamps the far plane to `max_far` (`graphics.render_distance`).
    pub fn clamp_far(&mut self, max_far: f32) {
        let clamped = self.far.min(max_far).max(self.near + 0.01);
        if (self.far - clamped).abs() > f32::EPSILON {
            self.far = clamped;
            self.update_projection_matrix();
        }
    }

    #[inline]
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    #[inline]
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    #[inline]
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.view_projection_matrix
    }

    #[inline]
    #[must_use]
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    #[must_use]
    pub fn extract_render_camera(&self) -> RenderCamera {
        RenderCamera {
            view_matrix: self.view_matrix,
            projection_matrix: self.projection_matrix,
            view_projection_matrix: self.view_projection_matrix,
            position: self.world_matrix.translation.into(),
            frustum: self.frustum,
            near: self.near,
            far: self.far,
        }
    }
}
