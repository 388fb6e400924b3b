//! Engine Core
//!
//! [`Engine`] is the central coordinator: it owns the settings store, the
//! scene manager, the renderer and the frame pipeline, without any window
//! management of its own. A frontend (the winit [`crate::app::App`], tests,
//! or an embedding) drives it through `update` / `resize` /
//! `render_active_scene`.

use std::sync::Arc;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::assets::AssetServer;
use crate::renderer::{GraphicsOptions, RenderPipeline, Renderer};
use crate::scene::SceneManager;
use crate::settings::Settings;

pub struct Engine {
    pub settings: Arc<Settings>,
    pub scene_manager: SceneManager,
    pub renderer: Renderer,
    pub pipeline: RenderPipeline,
    pub assets: AssetServer,

    time: f32,
    frame_count: u64,
}

impl Engine {
    /// Creates an engine around an existing settings store. GPU resources
    /// are not allocated until [`init`](Self::init).
    #[must_use]
    pub fn new(settings: Arc<Settings>) -> Self {
        let options = GraphicsOptions::from_settings(&settings);
        Self {
            settings,
            scene_manager: SceneManager::new(),
            renderer: Renderer::new(options),
            pipeline: RenderPipeline::new(),
            assets: AssetServer::new(),
            time: 0.0,
            frame_count: 0,
        }
    }

    /// Initializes GPU resources against a window.
    pub async fn init<W>(&mut self, window: W, width: u32, height: u32) -> crate::errors::Result<()>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let vsync = self.settings.get_bool("window.vsync", true);
        self.renderer.init(window, width, height, vsync).await
    }

    #[inline]
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Advances the active scene by `dt` seconds: scripts, particle
    /// emitters, transforms, bounds. Also clamps the active camera's far
    /// plane to the configured render distance.
    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        self.frame_count += 1;

        let render_distance = self.renderer.options().render_distance;
        if let Some(scene) = self.scene_manager.active_mut() {
            if let Some(camera) = scene.active_camera_mut() {
                camera.clamp_far(render_distance);
            }
            scene.update(dt);
        }
    }

    /// Handles a window resize: surface, camera aspect and UI viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);

        if width == 0 || height == 0 {
            return;
        }
        let aspect = width as f32 / height as f32;
        if let Some(scene) = self.scene_manager.active_mut() {
            if let Some(camera) = scene.active_camera_mut() {
                camera.set_aspect(aspect);
            }
            if let Some(ui) = scene.ui.as_mut() {
                ui.set_viewport(glam::Vec2::new(width as f32, height as f32));
            }
        }
    }

    /// Re-reads the graphics settings into the renderer. Idempotent.
    pub fn apply_graphics_settings(&mut self) {
        let settings = Arc::clone(&self.settings);
        self.renderer.apply_settings(&settings);
    }

    /// Renders the active scene through the frame pipeline.
    ///
    /// Returns `true` if a frame was presented, `false` when rendering was
    /// skipped (no active scene or camera, surface unavailable).
    pub fn render_active_scene(&mut self) -> bool {
        let Some(scene) = self.scene_manager.active_mut() else {
            return false;
        };
        self.pipeline.render(&mut self.renderer, scene, &self.assets)
    }

    /// Periodic cleanup of renderer-side caches for dropped scene objects.
    pub fn maybe_prune(&mut self) {
        if let Some(scene) = self.scene_manager.active() {
            self.renderer.maybe_prune(scene);
        }
    }
}
