//! Rendering Subsystem
//!
//! - [`context`] - wgpu device/surface ownership, resize, MSAA, vsync
//! - [`scene_renderer`] - culling, shadow passes, main lit pass
//! - [`shadow`] - per-light depth targets and light VP builders
//! - [`particle_renderer`] / [`text_renderer`] / [`ui_renderer`] - feature renderers
//! - [`frame`] - the fixed-order stage orchestrator
//!
//! [`Renderer`] is the facade the engine talks to: it owns the GPU context,
//! every sub-renderer, the per-light shadow maps and the settings snapshot.
//! Sub-renderers are capability-registered: a stage runs only when its
//! renderer exists, and missing renderers silently skip their stage.

pub mod context;
pub mod frame;
pub mod options;
pub mod particle_renderer;
pub mod scene_renderer;
pub mod shadow;
pub mod text_renderer;
pub mod ui_renderer;

pub use context::GpuContext;
pub use frame::RenderPipeline;
pub use options::GraphicsOptions;
pub use scene_renderer::{compute_visible_set, CullStats, SceneRenderer};
pub use shadow::ShadowMap;
pub use ui_renderer::RenderStateTracker;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use rustc_hash::{FxHashMap, FxHashSet};
use uuid::Uuid;

use crate::errors::Result;
use crate::resources::FontKey;
use crate::scene::{LightKind, Scene};
use crate::settings::Settings;

pub struct Renderer {
    pub(crate) context: Option<GpuContext>,
    pub(crate) scene_renderer: Option<SceneRenderer>,
    pub(crate) text_renderer: Option<text_renderer::TextRenderer>,
    pub(crate) particle_renderer: Option<particle_renderer::ParticleRenderer>,
    pub(crate) ui_renderer: Option<ui_renderer::UiRenderer>,

    /// One shadow map per shadow-casting light, keyed by light UUID.
    pub(crate) shadow_maps: FxHashMap<Uuid, ShadowMap>,
    /// Lights whose shadow allocation failed; they stay shadowless until
    /// the next `recreate_shadow_maps`.
    shadow_failed: FxHashSet<Uuid>,

    pub(crate) options: GraphicsOptions,
    pub(crate) state: RenderStateTracker,
    pub(crate) default_font: Option<FontKey>,
}

impl Renderer {
    #[must_use]
    pub fn new(options: GraphicsOptions) -> Self {
        Self {
            context: None,
            scene_renderer: None,
            text_renderer: None,
            particle_renderer: None,
            ui_renderer: None,
            shadow_maps: FxHashMap::default(),
            shadow_failed: FxHashSet::default(),
            options,
            state: RenderStateTracker::default(),
            default_font: None,
        }
    }

    /// Initializes the GPU context and registers every sub-renderer.
    pub async fn init<W>(&mut self, window: W, width: u32, height: u32, vsync: bool) -> Result<()>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let mut ctx = GpuContext::new(window, width, height, vsync).await?;
        ctx.set_msaa_samples(self.options.msaa_samples);

        self.scene_renderer = Some(SceneRenderer::new(&ctx, &self.options)?);
        self.text_renderer = Some(text_renderer::TextRenderer::new(&ctx));
        self.particle_renderer = Some(particle_renderer::ParticleRenderer::new(&ctx));
        self.ui_renderer = Some(ui_renderer::UiRenderer::new(&ctx));
        self.context = Some(ctx);

        Ok(())
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.context.is_some()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(ctx) = self.context.as_mut() {
            ctx.resize(width, height);
        }
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.context.as_ref().map_or((0, 0), GpuContext::size)
    }

    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.context.as_ref().map_or(1.0, GpuContext::aspect)
    }

    pub fn set_vsync(&mut self, vsync: bool) {
        if let Some(ctx) = self.context.as_mut() {
            ctx.set_vsync(vsync);
        }
    }

    /// Font used for text without an explicit font key.
    pub fn set_default_font(&mut self, font: Option<FontKey>) {
        self.default_font = font;
    }

    #[must_use]
    pub fn options(&self) -> &GraphicsOptions {
        &self.options
    }

    #[must_use]
    pub fn cull_stats(&self) -> CullStats {
        self.scene_renderer
            .as_ref()
            .map_or(CullStats::default(), SceneRenderer::last_stats)
    }

    // ========================================================================
    // Settings reconfiguration
    // ========================================================================

    /// Re-reads the graphics settings and reconfigures GPU state. Idempotent:
    /// unchanged settings do no work.
    ///
    /// Always leaves the logical render state in the configuration the
    /// following UI/text stages expect: depth test on, alpha blend on,
    /// face culling off.
    pub fn apply_settings(&mut self, settings: &Settings) {
        let new_options = GraphicsOptions::from_settings(settings);
        if new_options == self.options {
            return;
        }

        let shadow_size_changed = new_options.shadow_map_size != self.options.shadow_map_size
            || new_options.shadows_enabled != self.options.shadows_enabled;
        let msaa_changed = new_options.msaa_samples != self.options.msaa_samples;
        self.options = new_options;

        if shadow_size_changed {
            self.recreate_shadow_maps();
        }

        if let Some(ctx) = self.context.as_mut() {
            if msaa_changed {
                ctx.set_msaa_samples(self.options.msaa_samples);
            }
        }
        if let Some(ctx) = self.context.as_ref() {
            if msaa_changed {
                // Pipelines bake the sample count; rebuild every feature
                // renderer against the new targets.
                if let Some(sr) = self.scene_renderer.as_mut() {
                    sr.apply_settings(ctx, &self.options);
                }
                self.text_renderer = Some(text_renderer::TextRenderer::new(ctx));
                self.particle_renderer = Some(particle_renderer::ParticleRenderer::new(ctx));
                self.ui_renderer = Some(ui_renderer::UiRenderer::new(ctx));
            } else if let Some(sr) = self.scene_renderer.as_mut() {
                sr.apply_settings(ctx, &self.options);
            }
        }

        self.state = RenderStateTracker {
            depth_test: true,
            face_culling: false,
            blend: true,
        };
    }

    /// Destroys every per-light shadow target. Maps are reallocated at the
    /// current `shadow_map_size` on the next frame.
    pub fn recreate_shadow_maps(&mut self) {
        self.shadow_maps.clear();
        self.shadow_failed.clear();
        if let Some(sr) = self.scene_renderer.as_mut() {
            sr.invalidate_shadow_binding();
        }
    }

    /// Reconciles the shadow-map set with the scene's lights: allocates
    /// missing maps, drops maps of removed or no-longer-casting lights.
    /// Allocation failure disables shadows for that light with a diagnostic;
    /// the frame still completes.
    pub(crate) fn ensure_shadow_maps(&mut self, scene: &Scene) {
        let Some(ctx) = self.context.as_ref() else {
            return;
        };

        let mut wanted: FxHashMap<Uuid, u32> = FxHashMap::default();
        if self.options.shadows_enabled {
            for (_, light_key) in &scene.lights {
                let Some(light) = scene.light_pool.get(*light_key) else {
                    continue;
                };
                if !light.cast_shadows || self.shadow_failed.contains(&light.uuid) {
                    continue;
                }
                let layers = match light.kind {
                    LightKind::Point { .. } => 6,
                    LightKind::Directional | LightKind::Spot { .. } => 1,
                };
                wanted.insert(light.uuid, layers);
            }
        }

        let size = self.options.shadow_map_size;
        self.shadow_maps.retain(|uuid, map| {
            wanted.get(uuid).is_some_and(|&layers| {
                map.size == size && map.layers == layers
            })
        });

        for (uuid, layers) in wanted {
            if self.shadow_maps.contains_key(&uuid) {
                continue;
            }
            match ShadowMap::new(&ctx.device, size, layers) {
                Ok(map) => {
                    self.shadow_maps.insert(uuid, map);
                }
                Err(err) => {
                    log::error!("renderer: shadow map allocation failed for light {uuid}: {err}");
                    self.shadow_failed.insert(uuid);
                }
            }
        }
    }

    /// Number of live shadow maps (diagnostics and tests).
    #[must_use]
    pub fn shadow_map_count(&self) -> usize {
        self.shadow_maps.len()
    }

    /// Dimensions of a light's shadow map, if it has one.
    #[must_use]
    pub fn shadow_map_size_of(&self, light: Uuid) -> Option<u32> {
        self.shadow_maps.get(&light).map(|m| m.size)
    }

    /// Drops GPU caches for scene objects that no longer exist.
    pub fn maybe_prune(&mut self, scene: &Scene) {
        if let Some(sr) = self.scene_renderer.as_mut() {
            sr.prune_caches(scene);
        }
    }
}
