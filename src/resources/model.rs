use glam::Affine3A;

use crate::math::Aabb;
use crate::resources::Mesh;

/// A model owns its meshes; its local bounds are the union of the mesh
/// bounds. World bounds are refit through the node's model matrix at query
/// time.
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub meshes: Vec<Mesh>,

    local_aabb: Aabb,
}

impl Model {
    #[must_use]
    pub fn from_meshes(name: impl Into<String>, meshes: Vec<Mesh>) -> Self {
        let local_aabb = meshes
            .iter()
            .map(Mesh::local_aabb)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        Self {
            name: name.into(),
            meshes,
            local_aabb,
        }
    }

    #[must_use]
    pub fn local_aabb(&self) -> Aabb {
        self.local_aabb
    }

    /// Conservative world-space bounds under `model_matrix`.
    #[must_use]
    pub fn world_aabb(&self, model_matrix: &Affine3A) -> Aabb {
        self.local_aabb.transform(model_matrix)
    }

    /// Recomputes the cached local bounds after mesh mutation.
    pub fn refresh_bounds(&mut self) {
        self.local_aabb = self
            .meshes
            .iter()
            .map(Mesh::local_aabb)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
    }
}
