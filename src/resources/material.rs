use glam::{Vec3, Vec4};

use crate::resources::TextureKey;

/// PBR material parameters plus texture handles.
///
/// Missing textures are not an error: the main pass falls back to the
/// factor values (a missing base-color texture shows the albedo factor).
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,

    pub base_color: Vec4,
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: Vec3,

    pub base_color_texture: Option<TextureKey>,
    pub normal_texture: Option<TextureKey>,
    pub metallic_roughness_texture: Option<TextureKey>,

    pub double_sided: bool,
}

impl Material {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_base_color(mut self, color: Vec4) -> Self {
        self.base_color = color;
        self
    }

    #[must_use]
    pub fn with_metallic_roughness(mut self, metallic: f32, roughness: f32) -> Self {
        self.metallic = metallic;
        self.roughness = roughness;
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "Material".to_string(),
            base_color: Vec4::ONE,
            metallic: 0.0,
            roughness: 0.8,
            emissive: Vec3::ZERO,
            base_color_texture: None,
            normal_texture: None,
            metallic_roughness_texture: None,
            double_sided: false,
        }
    }
}
