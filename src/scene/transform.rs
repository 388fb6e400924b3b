use glam::{Affine3A, EulerRot, Mat4, Quat, Vec3};

/// Transform component for scene nodes.
///
/// Holds local TRS values behind guarded setters, the same idiom
/// [`crate::scene::Camera`] uses for its projection parameters: a setter
/// that actually changes a value raises the dirty bit, and the scene's
/// transform pass rebuilds the cached local matrix once per dirty node.
/// Untouched subtrees cost a single flag check per node.
///
/// The world matrix is owned by the hierarchy traversal in
/// [`crate::scene::Scene::update_transforms`]; it is derived data and has
/// no setter here.
///
/// Coordinate system is right-handed, +Y up, -Z forward.
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,

    // Cached matrices (rebuilt by the transform pass, read by the renderer)
    pub(crate) local_matrix: Affine3A,
    pub(crate) world_matrix: Affine3A,

    local_dirty: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,

            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,

            // Fresh nodes compile their matrix on the first pass.
            local_dirty: true,
        }
    }

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        let mut t = Self::new();
        t.set_position(position);
        t
    }

    // ========================================================================
    // Local TRS accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    #[inline]
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_position(&mut self, position: Vec3) {
        if self.position != position {
            self.position = position;
            self.local_dirty = true;
        }
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        if self.rotation != rotation {
            self.rotation = rotation;
            self.local_dirty = true;
        }
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        if self.scale != scale {
            self.scale = scale;
            self.local_dirty = true;
        }
    }

    /// Moves the local position by `delta`.
    pub fn translate(&mut self, delta: Vec3) {
        self.set_position(self.position + delta);
    }

    /// Sets rotation from Euler angles (XYZ order, radians).
    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.set_rotation(Quat::from_euler(EulerRot::XYZ, x, y, z));
    }

    /// Returns the rotation as Euler angles (XYZ order) in radians.
    #[must_use]
    pub fn rotation_euler(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    /// Orients -Z towards a target point in parent space. A target on top
    /// of the position (or parallel to `up`) leaves the rotation as is.
    pub fn face_towards(&mut self, target: Vec3, up: Vec3) {
        let forward = target - self.position;
        if forward.length_squared() < 1e-8 || forward.cross(up).length_squared() < 1e-8 {
            return;
        }
        // A look-to view matrix is the inverse of the orientation we want.
        let view = Mat4::look_to_rh(Vec3::ZERO, forward, up);
        self.set_rotation(Quat::from_mat4(&view).inverse());
    }

    // ========================================================================
    // Cached matrices
    // ========================================================================

    /// Rebuilds the local matrix when a setter raised the dirty bit.
    /// Returns `true` when it did; the traversal uses this to decide
    /// whether the subtree's world matrices need recomposing.
    pub(crate) fn refresh_local(&mut self) -> bool {
        if !self.local_dirty {
            return false;
        }
        self.local_matrix =
            Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position);
        self.local_dirty = false;
        true
    }

    /// World-space forward direction (-Z of the world rotation).
    #[must_use]
    pub fn world_forward(&self) -> Vec3 {
        self.world_matrix.transform_vector3(-Vec3::Z).normalize_or(-Vec3::Z)
    }

    /// World-space position.
    #[must_use]
    pub fn world_position(&self) -> Vec3 {
        self.world_matrix.translation.into()
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix_as_mat4(&self) -> Mat4 {
        Mat4::from(self.world_matrix)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
