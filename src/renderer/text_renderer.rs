//! Text Renderer
//!
//! Draws glyph-atlas quads. 2D text renders in window space through an
//! orthographic matrix with the origin at the top-left; 3D text is laid out
//! in world space (billboarded toward the camera when flagged) and uses the
//! scene's view-projection. The active font is an explicit parameter of
//! every prepare call; the renderer holds no font state of its own.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use crate::assets::AssetServer;
use crate::renderer::context::GpuContext;
use crate::resources::{Font, FontKey};
use crate::text::{self, Text2d, Text3d};

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct TextVertex {
    position: [f32; 3],
    uv: [f32; 2],
    color: [f32; 4],
}

const TEXT_VERTEX_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<TextVertex>() as u64,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x4],
};

struct GpuFont {
    bind_group: wgpu::BindGroup,
}

struct Batch {
    font: FontKey,
    vertex_buf: wgpu::Buffer,
    vertex_count: u32,
}

pub struct TextRenderer {
    pipeline_2d: wgpu::RenderPipeline,
    pipeline_3d: wgpu::RenderPipeline,

    ortho_buf: wgpu::Buffer,
    ortho_bind_group: wgpu::BindGroup,
    vp_buf: wgpu::Buffer,
    vp_bind_group: wgpu::BindGroup,

    font_layout: wgpu::BindGroupLayout,
    font_sampler: wgpu::Sampler,
    font_cache: FxHashMap<FontKey, GpuFont>,

    batches_2d: Vec<Batch>,
    batches_3d: Vec<Batch>,
}

impl TextRenderer {
    pub fn new(ctx: &GpuContext) -> Self {
        let device = &ctx.device;

        let matrix_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Text Matrix Layout"),
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

        let make_matrix = |label: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: std::mem::size_of::<Mat4>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let ortho_buf = make_matrix("Text Ortho Matrix");
        let vp_buf = make_matrix("Text VP Matrix");

        let make_bind = |buffer: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Text Matrix BindGroup"),
                layout: &matrix_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            })
        };
        let ortho_bind_group = make_bind(&ortho_buf);
        let vp_bind_group = make_bind(&vp_buf);

        let font_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Font Atlas Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let font_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Font Atlas Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let pipeline_2d = Self::build_pipeline(ctx, &matrix_layout, &font_layout, false);
        let pipeline_3d = Self::build_pipeline(ctx, &matrix_layout, &font_layout, true);

        Self {
            pipeline_2d,
            pipeline_3d,
            ortho_buf,
            ortho_bind_group,
            vp_buf,
            vp_bind_group,
            font_layout,
            font_sampler,
            font_cache: FxHashMap::default(),
            batches_2d: Vec::new(),
            batches_3d: Vec::new(),
        }
    }

    fn build_pipeline(
        ctx: &GpuContext,
        matrix_layout: &wgpu::BindGroupLayout,
        font_layout: &wgpu::BindGroupLayout,
        depth_test: bool,
    ) -> wgpu::RenderPipeline {
        let device = &ctx.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Text Shader"),
            source: wgpu::ShaderSource::Wgsl(TEXT_SHADER.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Text Pipeline Layout"),
            bind_group_layouts: &[Some(matrix_layout), Some(font_layout)],
            immediate_size: 0,
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Text Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[TEXT_VERTEX_LAYOUT],
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
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: ctx.depth_format,
                depth_write_enabled: Some(false),
                depth_compare: Some(if depth_test {
                    wgpu::CompareFunction::Less
                } else {
                    wgpu::CompareFunction::Always
                }),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: ctx.msaa_samples,
                ..Default::default()
            },
            multiview_mask: None,
            cache: None,
        })
    }

    fn ensure_font(&mut self, ctx: &GpuContext, key: FontKey, font: &Font) {
        if self.font_cache.contains_key(&key) {
            return;
        }
        let atlas = &font.atlas;
        let texture = ctx.device.create_texture_with_data(
            &ctx.queue,
            &wgpu::TextureDescriptor {
                label: Some(&font.name),
                size: wgpu::Extent3d {
                    width: atlas.width,
                    height: atlas.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &atlas.rgba,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&font.name),
            layout: &self.font_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.font_sampler),
                },
            ],
        });
        self.font_cache.insert(key, GpuFont { bind_group });
    }

    // ========================================================================
    // Frame preparation
    // ========================================================================

    /// Builds the 2D batches for window-space text. `default_font` applies
    /// to runs without an explicit font.
    pub fn prepare_2d(
        &mut self,
        ctx: &GpuContext,
        assets: &AssetServer,
        texts: &[Text2d],
        default_font: Option<FontKey>,
        viewport: Vec2,
    ) {
        self.batches_2d.clear();

        let ortho = Mat4::orthographic_rh(0.0, viewport.x.max(1.0), viewport.y.max(1.0), 0.0, -1.0, 1.0);
        ctx.queue
            .write_buffer(&self.ortho_buf, 0, bytemuck::bytes_of(&ortho));

        let mut per_font: FxHashMap<FontKey, Vec<TextVertex>> = FxHashMap::default();
        for t in texts {
            let Some(key) = t.font.or(default_font) else {
                continue;
            };
            let Some(font) = assets.font(key) else {
                continue;
            };
            self.ensure_font(ctx, key, font);

            let vertices = per_font.entry(key).or_default();
            for quad in text::layout_line(font, &t.content, t.px) {
                push_quad(
                    vertices,
                    t.position + quad.min,
                    t.position + quad.max,
                    quad.uv_min,
                    quad.uv_max,
                    t.color.to_array(),
                );
            }
        }

        self.batches_2d = self.upload_batches(ctx, per_font);
    }

    /// Builds the 3D batches: quads in world space, billboarded toward the
    /// camera when requested.
    pub fn prepare_3d(
        &mut self,
        ctx: &GpuContext,
        assets: &AssetServer,
        texts: &[Text3d],
        default_font: Option<FontKey>,
        view: Mat4,
        view_proj: Mat4,
    ) {
        self.batches_3d.clear();

        ctx.queue
            .write_buffer(&self.vp_buf, 0, bytemuck::bytes_of(&view_proj));

        // Camera basis from the view matrix rows (world-space right/up).
        let right = Vec3::new(view.x_axis.x, view.y_axis.x, view.z_axis.x);
        let up = Vec3::new(view.x_axis.y, view.y_axis.y, view.z_axis.y);

        let mut per_font: FxHashMap<FontKey, Vec<TextVertex>> = FxHashMap::default();
        for t in texts {
            let Some(key) = t.font.or(default_font) else {
                continue;
            };
            let Some(font) = assets.font(key) else {
                continue;
            };
            self.ensure_font(ctx, key, font);

            let (axis_x, axis_y) = if t.billboard {
                (right, -up)
            } else {
                (Vec3::X, -Vec3::Y)
            };

            let vertices = per_font.entry(key).or_default();
            for quad in text::layout_line(font, &t.content, font.px_size) {
                let corners = [
                    Vec2::new(quad.min.x, quad.min.y),
                    Vec2::new(quad.max.x, quad.min.y),
                    Vec2::new(quad.max.x, quad.max.y),
                    Vec2::new(quad.min.x, quad.max.y),
                ];
                let world: Vec<Vec3> = corners
                    .iter()
                    .map(|c| t.anchor + (axis_x * c.x + axis_y * c.y) * t.scale)
                    .collect();
                let uvs = [
                    quad.uv_min,
                    Vec2::new(quad.uv_max.x, quad.uv_min.y),
                    quad.uv_max,
                    Vec2::new(quad.uv_min.x, quad.uv_max.y),
                ];
                let color = t.color.to_array();
                for &(a, b, c) in &[(0usize, 1usize, 2usize), (0, 2, 3)] {
                    for &i in &[a, b, c] {
                        vertices.push(TextVertex {
                            position: world[i].to_array(),
                            uv: uvs[i].to_array(),
                            color,
                        });
                    }
                }
            }
        }

        self.batches_3d = self.upload_batches(ctx, per_font);
    }

    fn upload_batches(
        &mut self,
        ctx: &GpuContext,
        per_font: FxHashMap<FontKey, Vec<TextVertex>>,
    ) -> Vec<Batch> {
        per_font
            .into_iter()
            .filter(|(_, vertices)| !vertices.is_empty())
            .map(|(font, vertices)| {
                let vertex_buf = ctx
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Text Vertices"),
                        contents: bytemuck::cast_slice(&vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    });
                Batch {
                    font,
                    vertex_buf,
                    vertex_count: vertices.len() as u32,
                }
            })
            .collect()
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    pub fn draw_2d(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.draw_batches(pass, &self.pipeline_2d, &self.ortho_bind_group, &self.batches_2d);
    }

    pub fn draw_3d(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.draw_batches(pass, &self.pipeline_3d, &self.vp_bind_group, &self.batches_3d);
    }

    fn draw_batches(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        pipeline: &wgpu::RenderPipeline,
        matrix_bind_group: &wgpu::BindGroup,
        batches: &[Batch],
    ) {
        if batches.is_empty() {
            return;
        }
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, matrix_bind_group, &[]);
        for batch in batches {
            let Some(gpu_font) = self.font_cache.get(&batch.font) else {
                continue;
            };
            pass.set_bind_group(1, &gpu_font.bind_group, &[]);
            pass.set_vertex_buffer(0, batch.vertex_buf.slice(..));
            pass.draw(0..batch.vertex_count, 0..1);
        }
    }
}

fn push_quad(
    vertices: &mut Vec<TextVertex>,
    min: Vec2,
    max: Vec2,
    uv_min: Vec2,
    uv_max: Vec2,
    color: [f32; 4],
) {
    let corners = [
        ([min.x, min.y, 0.0], [uv_min.x, uv_min.y]),
        ([max.x, min.y, 0.0], [uv_max.x, uv_min.y]),
        ([max.x, max.y, 0.0], [uv_max.x, uv_max.y]),
        ([min.x, max.y, 0.0], [uv_min.x, uv_max.y]),
    ];
    for &i in &[0usize, 1, 2, 0, 2, 3] {
        vertices.push(TextVertex {
            position: corners[i].0,
            uv: corners[i].1,
            color,
        });
    }
}

const TEXT_SHADER: &str = r"
@group(0) @binding(0) var<uniform> transform: mat4x4<f32>;
@group(1) @binding(0) var atlas: texture_2d<f32>;
@group(1) @binding(1) var atlas_sampler: sampler;

struct VsOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
) -> VsOut {
    var out: VsOut;
    out.clip_position = transform * vec4<f32>(position, 1.0);
    out.uv = uv;
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let sampled = textureSample(atlas, atlas_sampler, in.uv);
    return vec4<f32>(in.color.rgb, in.color.a * sampled.a);
}
";
