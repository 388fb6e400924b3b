use crate::settings::Settings;

/// Snapshot of the `graphics.*` settings the renderer consumes each frame.
///
/// Rebuilt by [`crate::renderer::Renderer::apply_settings`]; comparing
/// snapshots keeps the reconfiguration idempotent.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsOptions {
    pub msaa_samples: u32,
    pub shadows_enabled: bool,
    pub shadow_map_size: u32,
    pub culling_enabled: bool,
    pub wireframe_mode: bool,
    pub gamma: f32,
    pub render_distance: f32,
    pub frustum_culling_enabled: bool,
    pub octree_enabled: bool,
    pub anisotropic_filtering: u32,
    pub bloom: bool,
    pub bloom_intensity: f32,
}

impl GraphicsOptions {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            msaa_samples: settings.get_int("graphics.msaa_samples", 4) as u32,
            shadows_enabled: settings.get_bool("graphics.shadows_enabled", true),
            shadow_map_size: sanitize_shadow_size(
                settings.get_int("graphics.shadow_map_size", 2048),
            ),
            culling_enabled: settings.get_bool("graphics.culling_enabled", true),
            wireframe_mode: settings.get_bool("graphics.wireframe_mode", false),
            gamma: settings.get_float("graphics.gamma", 2.2) as f32,
            render_distance: settings.get_float("graphics.render_distance", 500.0) as f32,
            frustum_culling_enabled: settings.get_bool("graphics.frustum_culling_enabled", true),
            octree_enabled: settings.get_bool("graphics.octree_enabled", true),
            anisotropic_filtering: settings.get_int("graphics.anisotropic_filtering", 4) as u32,
            bloom: settings.get_bool("graphics.bloom", false),
            bloom_intensity: settings.get_float("graphics.bloom_intensity", 0.5) as f32,
        }
    }
}

impl Default for GraphicsOptions {
    fn default() -> Self {
        Self {
            msaa_samples: 4,
            shadows_enabled: true,
            shadow_map_size: 2048,
            culling_enabled: true,
            wireframe_mode: false,
            gamma: 2.2,
            render_distance: 500.0,
            frustum_culling_enabled: true,
            octree_enabled: true,
            anisotropic_filtering: 4,
            bloom: false,
            bloom_intensity: 0.5,
        }
    }
}

/// Shadow map sizes are powers of two in `[512, 4096]`.
fn sanitize_shadow_size(size: i64) -> u32 {
    let size = size.clamp(512, 4096) as u32;
    let pow2 = size.next_power_of_two().min(4096);
    if pow2 != size {
        log::warn!("renderer: shadow map size rounded to {pow2}");
    }
    pow2
}
