//! UI Renderer
//!
//! Consumes the manager's layer-ordered [`DrawList`]: solid rectangles go
//! through a dedicated colored-quad pipeline, text runs are handed to the
//! 2D text path with the explicitly provided UI font.
//!
//! The engine, not application code, owns the render-state discipline
//! around the UI stage: [`prepare_for_rendering`](UiRenderer::prepare_for_rendering)
//! saves the logical depth-test/face-cull state and switches to
//! no-depth/no-cull/alpha-blend;
//! [`restore_after_rendering`](UiRenderer::restore_after_rendering) puts
//! back exactly what was saved.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};
use wgpu::util::DeviceExt;

use crate::renderer::context::GpuContext;
use crate::ui::{DrawCommand, DrawList};

/// Logical fixed-function state shared by the render stages.
///
/// wgpu bakes these into pipelines; the tracker keeps the contract
/// observable so stages always hand each other a known state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStateTracker {
    pub depth_test: bool,
    pub face_culling: bool,
    pub blend: bool,
}

impl Default for RenderStateTracker {
    fn default() -> Self {
        Self {
            depth_test: true,
            face_culling: true,
            blend: false,
        }
    }
}

/// State snapshot returned by `prepare_for_rendering`.
#[derive(Debug, Clone, Copy)]
pub struct SavedRenderState {
    depth_test: bool,
    face_culling: bool,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct UiVertex {
    position: [f32; 2],
    color: [f32; 4],
}

const UI_VERTEX_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<UiVertex>() as u64,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4],
};

pub struct UiRenderer {
    pipeline: wgpu::RenderPipeline,
    ortho_buf: wgpu::Buffer,
    ortho_bind_group: wgpu::BindGroup,
    vertex_buf: Option<wgpu::Buffer>,
    vertex_count: u32,
}

impl UiRenderer {
    pub fn new(ctx: &GpuContext) -> Self {
        let device = &ctx.device;

        let ortho_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("UI Ortho Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<Mat4>() as u64),
                },
                count: None,
            }],
        });

        let ortho_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("UI Ortho Matrix"),
            size: std::mem::size_of::<Mat4>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let ortho_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("UI Ortho BindGroup"),
            layout: &ortho_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ortho_buf.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("UI Shader"),
            source: wgpu::ShaderSource::Wgsl(UI_SHADER.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("UI Pipeline Layout"),
            bind_group_layouts: &[Some(&ortho_layout)],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("UI Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[UI_VERTEX_LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.color_format(),
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // UI never culls.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: ctx.depth_format,
                depth_write_enabled: Some(false),
                depth_compare: Some(wgpu::CompareFunction::Always),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: ctx.msaa_samples,
                ..Default::default()
            },
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            ortho_buf,
            ortho_bind_group,
            vertex_buf: None,
            vertex_count: 0,
        }
    }

    /// Saves the current logical state and switches to the UI contract:
    /// depth test off, face culling off, alpha blending on.
    pub fn prepare_for_rendering(&self, state: &mut RenderStateTracker) -> SavedRenderState {
        let saved = SavedRenderState {
            depth_test: state.depth_test,
            face_culling: state.face_culling,
        };
        state.depth_test = false;
        state.face_culling = false;
        state.blend = true;
        saved
    }

    /// Re-enables exactly what was enabled before the UI stage.
    pub fn restore_after_rendering(&self, state: &mut RenderStateTracker, saved: SavedRenderState) {
        state.depth_test = saved.depth_test;
        state.face_culling = saved.face_culling;
        state.blend = false;
    }

    /// Uploads this frame's rectangles. Text runs are split out for the
    /// text renderer's 2D path.
    pub fn prepare(
        &mut self,
        ctx: &GpuContext,
        draw_list: &DrawList,
        viewport: Vec2,
    ) -> Vec<crate::text::Text2d> {
        let ortho = Mat4::orthographic_rh(
            0.0,
            viewport.x.max(1.0),
            viewport.y.max(1.0),
            0.0,
            -1.0,
            1.0,
        );
        ctx.queue
            .write_buffer(&self.ortho_buf, 0, bytemuck::bytes_of(&ortho));

        let mut vertices: Vec<UiVertex> = Vec::new();
        let mut texts = Vec::new();

        for command in draw_list.commands() {
            match command {
                DrawCommand::Rect(rect) => {
                    let color = rect.color.to_array();
                    let corners = [
                        [rect.min.x, rect.min.y],
                        [rect.max.x, rect.min.y],
                        [rect.max.x, rect.max.y],
                        [rect.min.x, rect.max.y],
                    ];
                    for &i in &[0usize, 1, 2, 0, 2, 3] {
                        vertices.push(UiVertex {
                            position: corners[i],
                            color,
                        });
                    }
                }
                DrawCommand::Text(text) => {
                    texts.push(crate::text::Text2d {
                        content: text.content.clone(),
                        position: text.position,
                        px: text.px,
                        color: text.color,
                        font: None,
                    });
                }
            }
        }

        self.vertex_count = vertices.len() as u32;
        self.vertex_buf = (!vertices.is_empty()).then(|| {
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("UI Vertices"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });

        texts
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        let Some(vertex_buf) = self.vertex_buf.as_ref() else {
            return;
        };
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.ortho_bind_group, &[]);
        pass.set_vertex_buffer(0, vertex_buf.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}

const UI_SHADER: &str = r"
@group(0) @binding(0) var<uniform> ortho: mat4x4<f32>;

struct VsOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@location(0) position: vec2<f32>, @location(1) color: vec4<f32>) -> VsOut {
    var out: VsOut;
    out.clip_position = ortho * vec4<f32>(position, 0.0, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return in.color;
}
";
