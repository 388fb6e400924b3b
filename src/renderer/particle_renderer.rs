//! Particle Renderer
//!
//! One instanced billboard draw per emitter. The vertex shader rebuilds the
//! quad from the camera's right/up axes (extracted from the view matrix)
//! and rotates it around the view normal; the fragment shader applies a
//! soft radial falloff via `smoothstep`.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::particles::{ParticleInstance, ParticleSystem};
use crate::renderer::context::GpuContext;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct CameraUniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct QuadVertex {
    corner: [f32; 2],
}

const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { corner: [-0.5, -0.5] },
    QuadVertex { corner: [0.5, -0.5] },
    QuadVertex { corner: [0.5, 0.5] },
    QuadVertex { corner: [-0.5, 0.5] },
];
const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

const INSTANCE_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<ParticleInstance>() as u64,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &wgpu::vertex_attr_array![1 => Float32x3, 2 => Float32, 3 => Float32x4, 4 => Float32],
};

const CORNER_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<QuadVertex>() as u64,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x2],
};

/// Instance range of one emitter within the frame's shared instance buffer.
struct EmitterDraw {
    start: u32,
    end: u32,
}

pub struct ParticleRenderer {
    pipeline: wgpu::RenderPipeline,
    camera_buf: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    quad_vertex_buf: wgpu::Buffer,
    quad_index_buf: wgpu::Buffer,
    instance_buf: Option<wgpu::Buffer>,
    draws: Vec<EmitterDraw>,
}

impl ParticleRenderer {
    pub fn new(ctx: &GpuContext) -> Self {
        let device = &ctx.device;

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Camera Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<CameraUniforms>() as u64
                    ),
                },
                count: None,
            }],
        });

        let camera_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Camera"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Camera BindGroup"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buf.as_entire_binding(),
            }],
        });

        let quad_vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Quad Vertices"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Quad Indices"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(PARTICLE_SHADER.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[Some(&camera_layout)],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[CORNER_LAYOUT, INSTANCE_LAYOUT],
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
                // Particles read depth but never write it.
                depth_write_enabled: Some(false),
                depth_compare: Some(wgpu::CompareFunction::Less),
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
            camera_buf,
            camera_bind_group,
            quad_vertex_buf,
            quad_index_buf,
            instance_buf: None,
            draws: Vec::new(),
        }
    }

    /// Uploads this frame's instances and the camera matrices.
    pub fn prepare(&mut self, ctx: &GpuContext, system: &ParticleSystem, view: Mat4, proj: Mat4) {
        let camera = CameraUniforms {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
        };
        ctx.queue
            .write_buffer(&self.camera_buf, 0, bytemuck::bytes_of(&camera));

        self.draws.clear();
        let mut instances: Vec<ParticleInstance> = Vec::with_capacity(system.live_particles());
        for emitter in system.emitters() {
            let start = instances.len() as u32;
            instances.extend(emitter.instances());
            let end = instances.len() as u32;
            if end > start {
                self.draws.push(EmitterDraw { start, end });
            }
        }

        self.instance_buf = (!instances.is_empty()).then(|| {
            ctx.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Particle Instances"),
                    contents: bytemuck::cast_slice(&instances),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });
    }

    /// One instanced draw per emitter, sharing the frame's instance buffer.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        let Some(instance_buf) = self.instance_buf.as_ref() else {
            return;
        };
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        pass.set_vertex_buffer(0, self.quad_vertex_buf.slice(..));
        pass.set_vertex_buffer(1, instance_buf.slice(..));
        pass.set_index_buffer(self.quad_index_buf.slice(..), wgpu::IndexFormat::Uint16);
        for draw in &self.draws {
            pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, draw.start..draw.end);
        }
    }
}

const PARTICLE_SHADER: &str = r"
struct CameraUniforms {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> camera: CameraUniforms;

struct VsOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) local: vec2<f32>,
    @location(1) color: vec4<f32>,
};

@vertex
fn vs_main(
    @location(0) corner: vec2<f32>,
    @location(1) instance_position: vec3<f32>,
    @location(2) instance_size: f32,
    @location(3) instance_color: vec4<f32>,
    @location(4) instance_rotation: f32,
) -> VsOut {
    // Camera basis in world space: rows of the view rotation.
    let right = vec3<f32>(camera.view[0].x, camera.view[1].x, camera.view[2].x);
    let up = vec3<f32>(camera.view[0].y, camera.view[1].y, camera.view[2].y);

    // Rotate the quad corner around the view normal.
    let c = cos(instance_rotation);
    let s = sin(instance_rotation);
    let rotated = vec2<f32>(
        corner.x * c - corner.y * s,
        corner.x * s + corner.y * c,
    );

    let world = instance_position + (right * rotated.x + up * rotated.y) * instance_size;

    var out: VsOut;
    out.clip_position = camera.proj * camera.view * vec4<f32>(world, 1.0);
    out.local = corner;
    out.color = instance_color;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    // Soft-edged radial gradient from the quad center.
    let dist = length(in.local) * 2.0;
    let alpha = (1.0 - smoothstep(0.6, 1.0, dist)) * in.color.a;
    if (alpha <= 0.001) {
        discard;
    }
    return vec4<f32>(in.color.rgb, alpha);
}
";
