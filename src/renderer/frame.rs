//! Frame Orchestrator
//!
//! [`RenderPipeline`] executes the per-frame stages in a fixed,
//! non-reorderable order:
//!
//! 1. Scene renderer (includes the per-light shadow passes)
//! 2. 3D text
//! 3. Particles (billboard instanced)
//! 4. UI: prepare state, compile sizes, render 2D text + elements, restore
//! 5. Present (buffer swap)
//!
//! Registration is capability-based: a stage runs only when its renderer is
//! registered *and* its stage flag is on; anything missing skips silently.

use glam::Vec2;

use crate::assets::AssetServer;
use crate::renderer::Renderer;
use crate::scene::Scene;

pub struct RenderPipeline {
    pub scene_stage: bool,
    pub text3d_stage: bool,
    pub particle_stage: bool,
    pub ui_stage: bool,
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self {
            scene_stage: true,
            text3d_stage: true,
            particle_stage: true,
            ui_stage: true,
        }
    }
}

impl RenderPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders one frame of `scene`. Returns `false` when rendering was
    /// skipped (no GPU context, no active camera, surface unavailable).
    pub fn render(&self, renderer: &mut Renderer, scene: &mut Scene, assets: &AssetServer) -> bool {
        if !renderer.is_initialized() {
            return false;
        }
        let Some(camera) = scene.active_camera() else {
            log::warn!("pipeline: no active camera; skipping frame");
            return false;
        };
        let camera = camera.extract_render_camera();

        renderer.ensure_shadow_maps(scene);

        // Acquire the backbuffer.
        let surface_texture = {
            let ctx = renderer
                .context
                .as_mut()
                .expect("context checked by is_initialized");
            match ctx.surface.get_current_texture() {
                wgpu::CurrentSurfaceTexture::Success(frame)
                | wgpu::CurrentSurfaceTexture::Suboptimal(frame) => frame,
                wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                    let (w, h) = ctx.size();
                    ctx.resize(w, h);
                    return false;
                }
                err => {
                    log::error!("pipeline: surface acquire failed: {err:?}");
                    return false;
                }
            }
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let Renderer {
            context,
            scene_renderer,
            text_renderer,
            particle_renderer,
            ui_renderer,
            shadow_maps,
            options,
            state,
            default_font,
            ..
        } = renderer;
        let ctx = context.as_ref().expect("context checked above");
        let viewport = {
            let (w, h) = ctx.size();
            Vec2::new(w as f32, h as f32)
        };

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        // Stage 1: scene (shadow passes + main lit pass).
        if self.scene_stage {
            if let Some(sr) = scene_renderer.as_mut() {
                sr.render(
                    ctx,
                    &mut encoder,
                    &surface_view,
                    scene,
                    &camera,
                    shadow_maps,
                    options,
                );
            }
        }

        // Stage 2: 3D text.
        if self.text3d_stage && !scene.texts3d.is_empty() {
            if let Some(tr) = text_renderer.as_mut() {
                tr.prepare_3d(
                    ctx,
                    assets,
                    &scene.texts3d,
                    *default_font,
                    camera.view_matrix,
                    camera.view_projection_matrix,
                );
                let mut pass = begin_overlay_pass(&mut encoder, ctx, &surface_view, "Text3D Pass");
                tr.draw_3d(&mut pass);
            }
        }

        // Stage 3: particles.
        if self.particle_stage {
            if let Some((pr, particles)) = particle_renderer.as_mut().zip(scene.particles.as_ref())
            {
                pr.prepare(ctx, particles, camera.view_matrix, camera.projection_matrix);
                let mut pass =
                    begin_overlay_pass(&mut encoder, ctx, &surface_view, "Particle Pass");
                pr.draw(&mut pass);
            }
        }

        // Stage 4: UI. The engine owns the state discipline around it.
        if self.ui_stage {
            if let Some((ui, manager)) = ui_renderer.as_mut().zip(scene.ui.as_mut()) {
                let saved = ui.prepare_for_rendering(state);

                if manager.viewport() != viewport {
                    manager.set_viewport(viewport);
                }
                manager.compile();
                let draw_list = manager.build_draw_list();
                let mut texts = ui.prepare(ctx, &draw_list, viewport);
                texts.extend(scene.texts2d.iter().cloned());

                if let Some(tr) = text_renderer.as_mut() {
                    tr.prepare_2d(ctx, assets, &texts, *default_font, viewport);
                }

                {
                    let mut pass =
                        begin_overlay_pass(&mut encoder, ctx, &surface_view, "UI Pass");
                    ui.draw(&mut pass);
                    if let Some(tr) = text_renderer.as_ref() {
                        tr.draw_2d(&mut pass);
                    }
                }

                ui.restore_after_rendering(state, saved);
            }
        }

        // Stage 5: submit and present.
        ctx.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        true
    }
}

/// Begins a load-preserving pass over the main targets for overlay stages.
fn begin_overlay_pass<'a>(
    encoder: &'a mut wgpu::CommandEncoder,
    ctx: &'a crate::renderer::GpuContext,
    surface_view: &'a wgpu::TextureView,
    label: &'static str,
) -> wgpu::RenderPass<'a> {
    let (color_view, resolve_target) = match ctx.msaa_view.as_ref() {
        Some(msaa) => (msaa, Some(surface_view)),
        None => (surface_view, None),
    };

    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: color_view,
            resolve_target,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: &ctx.depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}
