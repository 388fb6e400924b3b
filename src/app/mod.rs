//! Application Loop
//!
//! [`App`] drives the engine with winit: window creation from settings,
//! event dispatch (UI first, then scene), the per-frame tick and the
//! `init -> run -> shutdown` lifecycle.
//!
//! Settings callbacks that touch the GPU or the window never run on the
//! calling thread; they enqueue [`RenderCommand`]s drained at the start of
//! each frame on the render thread.

pub mod commands;
pub mod workers;

pub use commands::{RenderCommand, RenderCommandQueue};
pub use workers::{Job, WorkerPool};

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Fullscreen, Window, WindowId};

use crate::engine::Engine;
use crate::errors::Result;
use crate::settings::Settings;

/// Per-frame user callback: `(engine, dt_seconds)`.
pub type UpdateFn = Box<dyn FnMut(&mut Engine, f32)>;
/// Key callback: `(key, pressed)`.
pub type KeyFn = Box<dyn FnMut(winit::keyboard::KeyCode, bool)>;
/// Audio collaborator hook for `audio.master_volume`.
pub type VolumeFn = Box<dyn FnMut(f32)>;

pub struct App {
    window: Option<Arc<Window>>,
    pub engine: Engine,

    commands: RenderCommandQueue,
    workers: Option<WorkerPool>,

    timer: crate::utils::Timer,
    fps: crate::utils::FpsCounter,
    cursor: Vec2,

    update_fn: Option<UpdateFn>,
    key_fn: Option<KeyFn>,
    volume_fn: Option<VolumeFn>,
}

impl App {
    /// Creates the application: loads the settings file, builds the engine
    /// and wires every settings subscriber the core reacts to.
    #[must_use]
    pub fn new() -> Self {
        let settings = Arc::new(Settings::with_file("settings.json"));
        settings.load();

        let engine = Engine::new(Arc::clone(&settings));
        let commands = RenderCommandQueue::new();
        Self::wire_subscribers(&settings, &commands);

        Self {
            window: None,
            engine,
            commands,
            workers: None,
            timer: crate::utils::Timer::new(),
            fps: crate::utils::FpsCounter::new(),
            cursor: Vec2::new(-1.0, -1.0),
            update_fn: None,
            key_fn: None,
            volume_fn: None,
        }
    }

    fn wire_subscribers(settings: &Settings, commands: &RenderCommandQueue) {
        let tx = commands.sender();
        settings.subscribe("window.vsync", move |_, new| {
            if let Some(vsync) = new.as_bool() {
                let _ = tx.send(RenderCommand::SetVsync(vsync));
            }
        });

        let tx = commands.sender();
        settings.subscribe("window.fullscreen", move |_, new| {
            if let Some(fullscreen) = new.as_bool() {
                let _ = tx.send(RenderCommand::SetFullscreen(fullscreen));
            }
        });

        let tx = commands.sender();
        settings.subscribe("audio.master_volume", move |_, new| {
            if let Some(volume) = new.as_float() {
                let _ = tx.send(RenderCommand::SetMasterVolume(volume as f32));
            }
        });

        let tx = commands.sender();
        settings.subscribe("graphics.shadow_map_size", move |_, _| {
            let _ = tx.send(RenderCommand::RecreateShadowMaps);
        });

        for path in [
            "graphics.msaa_samples",
            "graphics.culling_enabled",
            "graphics.bloom",
            "graphics.bloom_intensity",
            "graphics.wireframe_mode",
            "graphics.gamma",
            "graphics.render_distance",
            "graphics.frustum_culling_enabled",
            "graphics.octree_enabled",
            "graphics.octree_max_depth",
            "graphics.octree_max_objects_per_node",
            "graphics.shadows_enabled",
            "graphics.anisotropic_filtering",
        ] {
            let tx = commands.sender();
            settings.subscribe(path, move |_, _| {
                let _ = tx.send(RenderCommand::ApplyGraphicsSettings);
            });
        }
    }

    pub fn set_update_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&mut Engine, f32) + 'static,
    {
        self.update_fn = Some(Box::new(f));
        self
    }

    pub fn set_key_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(winit::keyboard::KeyCode, bool) + 'static,
    {
        self.key_fn = Some(Box::new(f));
        self
    }

    /// Registers the audio collaborator's volume hook.
    pub fn set_volume_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(f32) + 'static,
    {
        self.volume_fn = Some(Box::new(f));
        self
    }

    /// Enters the event loop. Returns when the window closes.
    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    // ========================================================================
    // Frame
    // ========================================================================

    fn frame(&mut self) {
        let frame_start = Instant::now();

        self.drain_commands();

        self.timer.tick();
        let dt = self.timer.dt_seconds().min(0.1);

        if let Some(update_fn) = self.update_fn.as_mut() {
            update_fn(&mut self.engine, dt);
        }
        self.engine.update(dt);
        self.engine.render_active_scene();
        self.engine.maybe_prune();
        self.fps.tick();

        self.cap_frame_rate(frame_start);
    }

    /// `graphics.target_fps` is a hint: sleep out the remaining budget.
    fn cap_frame_rate(&self, frame_start: Instant) {
        let target = self.engine.settings.get_int("graphics.target_fps", 0);
        if target <= 0 {
            return;
        }
        let budget = Duration::from_secs_f64(1.0 / target as f64);
        let spent = frame_start.elapsed();
        if spent < budget {
            std::thread::sleep(budget - spent);
        }
    }

    fn drain_commands(&mut self) {
        for command in self.commands.drain() {
            match command {
                RenderCommand::SetVsync(vsync) => self.engine.renderer.set_vsync(vsync),
                RenderCommand::SetFullscreen(fullscreen) => self.set_fullscreen(fullscreen),
                RenderCommand::RecreateShadowMaps => {
                    self.engine.apply_graphics_settings();
                    self.engine.renderer.recreate_shadow_maps();
                }
                RenderCommand::ApplyGraphicsSettings => self.engine.apply_graphics_settings(),
                RenderCommand::SetMasterVolume(volume) => {
                    if let Some(volume_fn) = self.volume_fn.as_mut() {
                        volume_fn(volume.clamp(0.0, 1.0));
                    }
                }
            }
        }
    }

    /// Switches the window mode and synchronously runs the resize path.
    fn set_fullscreen(&mut self, fullscreen: bool) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        window.set_fullscreen(fullscreen.then(|| Fullscreen::Borderless(None)));
        let size = window.inner_size();
        self.engine.resize(size.width, size.height);
    }

    /// Tears down background workers and persists settings.
    fn shutdown(&mut self) {
        if let Some(mut workers) = self.workers.take() {
            workers.shutdown();
        }
        if let Err(err) = self.engine.settings.save() {
            log::warn!("app: failed to persist settings on exit: {err}");
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let settings = &self.engine.settings;
        let width = settings.get_int("window.width", 1280) as u32;
        let height = settings.get_int("window.height", 720) as u32;
        let title = settings.get_string("window.title", "Lumen");
        let fullscreen = settings.get_bool("window.fullscreen", false);

        let mut attributes = Window::default_attributes()
            .with_title(title)
            .with_inner_size(winit::dpi::LogicalSize::new(width as f64, height as f64));
        if fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("app: window creation failed: {err}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(Arc::clone(&window));

        log::info!("Initializing renderer backend...");
        let size = window.inner_size();
        if let Err(err) = pollster::block_on(self.engine.init(
            Arc::clone(&window),
            size.width,
            size.height,
        )) {
            // Critical startup failure: abort cleanly with a single cause.
            log::error!("app: renderer initialization failed: {err}");
            event_loop.exit();
            return;
        }
        self.engine.resize(size.width, size.height);

        if self.engine.settings.get_bool("performance.multithreading", true) {
            let threads = self.engine.settings.get_int("performance.worker_threads", 4) as usize;
            self.workers = Some(WorkerPool::new(threads));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.engine.resize(size.width, size.height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                let cursor = self.cursor;
                if let Some(ui) = self
                    .engine
                    .scene_manager
                    .active_mut()
                    .and_then(|s| s.ui.as_mut())
                {
                    ui.on_mouse_move(cursor);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    let pressed = state == ElementState::Pressed;
                    let cursor = self.cursor;
                    if let Some(ui) = self
                        .engine
                        .scene_manager
                        .active_mut()
                        .and_then(|s| s.ui.as_mut())
                    {
                        ui.on_mouse_button(pressed, cursor);
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let (Some(key_fn), PhysicalKey::Code(code)) =
                    (self.key_fn.as_mut(), event.physical_key)
                {
                    key_fn(code, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}
