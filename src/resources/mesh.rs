use glam::{Vec2, Vec3};

use crate::math::Aabb;
use crate::resources::Material;

/// Indexed triangle mesh with its material.
///
/// Attribute arrays are parallel: `positions`, `normals` and `uvs` share the
/// same length; `indices` refer into them.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,

    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,

    pub material: Material,
}

impl Mesh {
    #[must_use]
    pub fn new(
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        uvs: Vec<Vec2>,
        indices: Vec<u32>,
        material: Material,
    ) -> Self {
        Self {
            name: "Mesh".to_string(),
            positions,
            normals,
            uvs,
            indices,
            material,
        }
    }

    /// Tightest local-space box around the vertex positions.
    #[must_use]
    pub fn local_aabb(&self) -> Aabb {
        Aabb::from_points(&self.positions)
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned unit cube centered at the origin, for tests and demos.
    #[must_use]
    pub fn unit_cube(material: Material) -> Self {
        let half = 0.5;
        // 24 vertices, 4 per face, normals per face
        let faces: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut uvs = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (i, (normal, tangent, bitangent)) in faces.iter().enumerate() {
            let base = (i * 4) as u32;
            for (u, v) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                positions.push((*normal + *tangent * u + *bitangent * v) * half);
                normals.push(*normal);
                uvs.push(Vec2::new((u + 1.0) * 0.5, (v + 1.0) * 0.5));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self {
            name: "Cube".to_string(),
            positions,
            normals,
            uvs,
            indices,
            material,
        }
    }
}
