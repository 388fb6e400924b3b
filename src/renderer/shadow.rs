//! Shadow Mapping
//!
//! Per-light depth targets and the pure view-projection builders for the
//! three light kinds:
//!
//! - Directional: orthographic fit around the scene bounds from along `-dir`
//! - Spot: perspective along the light direction with `2 * outer_cone` fov
//! - Point: six 90-degree perspective cube faces
//!
//! The VP builders are plain math so the fitting rules are testable without
//! a GPU.

use glam::{Mat4, Vec3};

use crate::errors::{LumenError, Result};
use crate::math::Aabb;

/// Square depth target owned by exactly one light.
///
/// Point lights use `layers == 6` (one per cube face); directional and spot
/// lights use a single layer. Destroyed and recreated whenever
/// `graphics.shadow_map_size` changes.
pub struct ShadowMap {
    pub texture: wgpu::Texture,
    /// Full view over all layers, bound for sampling in the main pass.
    pub sample_view: wgpu::TextureView,
    /// One render-attachment view per layer.
    pub layer_views: Vec<wgpu::TextureView>,
    pub size: u32,
    pub layers: u32,
}

pub const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

impl ShadowMap {
    /// Allocates a `size x size` depth target with the given layer count.
    ///
    /// Fails (so the owning light degrades to shadowless) when `size`
    /// exceeds the device's texture limit.
    pub fn new(device: &wgpu::Device, size: u32, layers: u32) -> Result<Self> {
        let max_dim = device.limits().max_texture_dimension_2d;
        if size == 0 || size > max_dim {
            return Err(LumenError::RenderTargetFailed(format!(
                "shadow map size {size} outside supported range (max {max_dim})"
            )));
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let sample_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Shadow Map Sample View"),
            dimension: Some(if layers > 1 {
                wgpu::TextureViewDimension::D2Array
            } else {
                wgpu::TextureViewDimension::D2
            }),
            ..Default::default()
        });

        let layer_views = (0..layers)
            .map(|layer| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some("Shadow Map Layer View"),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_array_layer: layer,
                    array_layer_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        Ok(Self {
            texture,
            sample_view,
            layer_views,
            size,
            layers,
        })
    }
}

// ============================================================================
// Light view-projection builders
// ============================================================================

fn safe_direction(direction: Vec3) -> Vec3 {
    if direction.length_squared() > 1e-6 {
        direction.normalize()
    } else {
        -Vec3::Z
    }
}

fn up_for(direction: Vec3) -> Vec3 {
    if direction.y.abs() > 0.99 {
        Vec3::X
    } else {
        Vec3::Y
    }
}

/// Orthographic VP for a directional light, fitted around the scene bounds
/// viewed from along `-direction`.
///
/// All eight corners of the bounds land inside the resulting clip volume;
/// the near plane is pulled back by the bounds' diagonal so casters between
/// the volume and the light still render.
#[must_use]
pub fn directional_light_vp(direction: Vec3, scene_bounds: &Aabb) -> Mat4 {
    let dir = safe_direction(direction);
    let center = scene_bounds.center();
    let radius = scene_bounds.half_extent().length().max(0.5);

    let eye = center - dir * radius * 2.0;
    let view = Mat4::look_at_rh(eye, center, up_for(dir));

    // Fit the light-space AABB of the bounds' corners.
    let mut ls_min = Vec3::splat(f32::MAX);
    let mut ls_max = Vec3::splat(f32::MIN);
    for corner in scene_bounds.corners() {
        let ls = view.transform_point3(corner);
        ls_min = ls_min.min(ls);
        ls_max = ls_max.max(ls);
    }

    // RH light view looks down -Z: ls_max.z is nearest. Extend towards the
    // light so off-volume casters are kept.
    let diagonal = (ls_max - ls_min).length().max(1.0);
    let near = (-ls_max.z - diagonal).max(0.01);
    let far = -ls_min.z + diagonal;

    let proj = Mat4::orthographic_rh(ls_min.x, ls_max.x, ls_min.y, ls_max.y, near, far);
    proj * view
}

/// Perspective VP for a spot light: fov is twice the outer cone half-angle,
/// clamped below pi; far plane is the light range.
#[must_use]
pub fn spot_light_vp(position: Vec3, direction: Vec3, outer_cone: f32, range: f32) -> Mat4 {
    let dir = safe_direction(direction);
    let view = Mat4::look_at_rh(position, position + dir, up_for(dir));
    let fov = (outer_cone * 2.0).clamp(0.1, std::f32::consts::PI - 0.01);
    let far = range.max(1.0);
    let proj = Mat4::perspective_rh(fov, 1.0, 0.1, far);
    proj * view
}

/// Face order of the point-light cube: +X, -X, +Y, -Y, +Z, -Z.
pub const POINT_LIGHT_FACES: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::Y),
    (Vec3::NEG_X, Vec3::Y),
    (Vec3::Y, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::Z),
    (Vec3::Z, Vec3::Y),
    (Vec3::NEG_Z, Vec3::Y),
];

/// Six 90-degree perspective VPs for a point light, one per cube face.
#[must_use]
pub fn point_light_face_vps(position: Vec3, range: f32) -> [Mat4; 6] {
    let far = range.max(1.0);
    let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.05, far);
    POINT_LIGHT_FACES.map(|(forward, up)| {
        let view = Mat4::look_at_rh(position, position + forward, up);
        proj * view
    })
}
