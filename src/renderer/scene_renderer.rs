//! Scene Renderer
//!
//! Executes the per-frame contract, strictly in order:
//!
//! 1. Camera matrices and frustum from the active camera.
//! 2. Visible set: octree query when enabled and worthwhile, else a linear
//!    per-object frustum test.
//! 3. Cull statistics, logged every 60 frames at debug level.
//! 4. One depth-only pass per shadow-casting light (six for point lights).
//! 5. State restore to main-pass defaults.
//! 6. The main lit pass over the visible set.
//!
//! Culling itself is pure CPU math (`compute_visible_set`) so the
//! octree-equals-linear property is testable without a GPU.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use rustc_hash::FxHashMap;
use uuid::Uuid;
use wgpu::util::DeviceExt;

use crate::math::{Containment, Frustum};
use crate::renderer::context::GpuContext;
use crate::renderer::options::GraphicsOptions;
use crate::renderer::shadow::{self, ShadowMap, SHADOW_FORMAT};
use crate::scene::{LightKind, ModelKey, NodeHandle, Scene, OCTREE_MIN_OBJECTS};

pub const MAX_LIGHTS: usize = 16;

/// Per-frame culling statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CullStats {
    pub total: usize,
    pub visible: usize,
}

/// Computes the set of visible objects for a frustum.
///
/// Uses the octree when enabled and the scene is large enough to justify
/// it; otherwise scans linearly with a world-AABB test per object. With
/// frustum culling disabled every visible-flagged object passes.
#[must_use]
pub fn compute_visible_set(
    scene: &Scene,
    frustum: &Frustum,
    options: &GraphicsOptions,
) -> (Vec<NodeHandle>, CullStats) {
    let total = scene.object_count();

    let mut visible: Vec<NodeHandle> = if !options.frustum_culling_enabled {
        scene.models.keys().collect()
    } else if let Some(octree) = scene
        .octree()
        .filter(|_| options.octree_enabled && total >= OCTREE_MIN_OBJECTS)
    {
        octree.query_frustum(frustum)
    } else {
        scene
            .models
            .keys()
            .filter(|&handle| {
                scene
                    .world_aabb(handle)
                    .is_some_and(|aabb| frustum.test_aabb(&aabb) != Containment::Outside)
            })
            .collect()
    };

    visible.retain(|&handle| scene.nodes.get(handle).is_some_and(|n| n.visible));

    let stats = CullStats {
        total,
        visible: visible.len(),
    };
    (visible, stats)
}

// ============================================================================
// GPU data layouts
// ============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

const VERTEX_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<Vertex>() as u64,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
};

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable, Default)]
struct GpuLight {
    /// xyz = world position, w = range
    position_range: [f32; 4],
    /// xyz = world direction, w = kind (0 directional, 1 point, 2 spot)
    direction_kind: [f32; 4],
    /// rgb = color, w = intensity
    color_intensity: [f32; 4],
    /// x = cos(inner), y = cos(outer), z = casts shadows, w = unused
    cone_shadow: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct GlobalUniforms {
    view_proj: [[f32; 4]; 4],
    /// VP of the light whose shadow map is bound this frame
    shadow_view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    /// x = gamma, y = light count, z = shadow light index (-1 none), w = unused
    params: [f32; 4],
    lights: [GpuLight; MAX_LIGHTS],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ObjectUniforms {
    model: [[f32; 4]; 4],
    base_color: [f32; 4],
    /// x = metallic, y = roughness
    material: [f32; 4],
    emissive: [f32; 4],
}

struct GpuMeshBuffers {
    vertex_buf: wgpu::Buffer,
    index_buf: wgpu::Buffer,
    index_count: u32,
}

struct GpuObjectBinding {
    uniform_buf: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

// ============================================================================
// Renderer
// ============================================================================

pub struct SceneRenderer {
    globals_buf: wgpu::Buffer,
    globals_layout: wgpu::BindGroupLayout,
    globals_bind_group: wgpu::BindGroup,

    object_layout: wgpu::BindGroupLayout,

    shadow_layout: wgpu::BindGroupLayout,
    shadow_sampler: wgpu::Sampler,
    /// 1x1 depth fallback bound when no light casts shadows.
    fallback_shadow: ShadowMap,
    shadow_bind_group: wgpu::BindGroup,
    /// Which map the current shadow bind group points at.
    bound_shadow_light: Option<Uuid>,

    /// Per-view light VP buffer for depth passes (dynamic offsets).
    light_vp_buf: wgpu::Buffer,
    light_vp_capacity: u32,
    light_vp_stride: u32,
    light_vp_bind_group: wgpu::BindGroup,
    light_vp_layout: wgpu::BindGroupLayout,

    lit_pipeline: wgpu::RenderPipeline,
    depth_pipeline: wgpu::RenderPipeline,

    mesh_cache: FxHashMap<ModelKey, Vec<GpuMeshBuffers>>,
    object_cache: FxHashMap<NodeHandle, Vec<GpuObjectBinding>>,

    frame_index: u64,
    last_stats: CullStats,
}

impl SceneRenderer {
    pub fn new(ctx: &GpuContext, options: &GraphicsOptions) -> crate::errors::Result<Self> {
        let device = &ctx.device;

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Globals Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<GlobalUniforms>() as u64
                    ),
                },
                count: None,
            }],
        });

        let globals_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Globals"),
            size: std::mem::size_of::<GlobalUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Globals BindGroup"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buf.as_entire_binding(),
            }],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ObjectUniforms>() as u64
                    ),
                },
                count: None,
            }],
        });

        let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Sampling Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Comparison Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let fallback_shadow = ShadowMap::new(device, 1, 1)?;
        let shadow_bind_group = Self::make_shadow_bind_group(
            device,
            &shadow_layout,
            &fallback_shadow.sample_view,
            &shadow_sampler,
        );

        // Depth-pass light VP buffer, one aligned slot per shadow view.
        let min_alignment = device.limits().min_uniform_buffer_offset_alignment.max(1);
        let light_vp_stride = align_to(std::mem::size_of::<Mat4>() as u32, min_alignment);

        let light_vp_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Light VP Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<Mat4>() as u64),
                },
                count: None,
            }],
        });

        let light_vp_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Light VP Buffer"),
            size: u64::from(light_vp_stride),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let light_vp_bind_group =
            Self::make_light_vp_bind_group(device, &light_vp_layout, &light_vp_buf);

        let lit_pipeline = Self::build_lit_pipeline(
            ctx,
            &globals_layout,
            &object_layout,
            &shadow_layout,
            options,
        );
        let depth_pipeline = Self::build_depth_pipeline(ctx, &light_vp_layout, &object_layout);

        Ok(Self {
            globals_buf,
            globals_layout,
            globals_bind_group,
            object_layout,
            shadow_layout,
            shadow_sampler,
            fallback_shadow,
            shadow_bind_group,
            bound_shadow_light: None,
            light_vp_buf,
            light_vp_capacity: 1,
            light_vp_stride,
            light_vp_bind_group,
            light_vp_layout,
            lit_pipeline,
            depth_pipeline,
            mesh_cache: FxHashMap::default(),
            object_cache: FxHashMap::default(),
            frame_index: 0,
            last_stats: CullStats::default(),
        })
    }

    fn make_shadow_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Sampling BindGroup"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn make_light_vp_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Light VP BindGroup"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<Mat4>() as u64),
                }),
            }],
        })
    }

    fn build_lit_pipeline(
        ctx: &GpuContext,
        globals_layout: &wgpu::BindGroupLayout,
        object_layout: &wgpu::BindGroupLayout,
        shadow_layout: &wgpu::BindGroupLayout,
        options: &GraphicsOptions,
    ) -> wgpu::RenderPipeline {
        let device = &ctx.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Lit Shader"),
            source: wgpu::ShaderSource::Wgsl(LIT_SHADER.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Lit Pipeline Layout"),
            bind_group_layouts: &[Some(globals_layout), Some(object_layout), Some(shadow_layout)],
            immediate_size: 0,
        });

        let polygon_mode = if options.wireframe_mode && ctx.supports_wireframe {
            wgpu::PolygonMode::Line
        } else {
            wgpu::PolygonMode::Fill
        };
        let cull_mode = options.culling_enabled.then_some(wgpu::Face::Back);

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Lit Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[VERTEX_LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.color_format(),
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode,
                polygon_mode,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: ctx.depth_format,
                depth_write_enabled: Some(true),
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
        })
    }

    fn build_depth_pipeline(
        ctx: &GpuContext,
        light_vp_layout: &wgpu::BindGroupLayout,
        object_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        let device = &ctx.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Depth Shader"),
            source: wgpu::ShaderSource::Wgsl(DEPTH_SHADER.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow Depth Pipeline Layout"),
            bind_group_layouts: &[Some(light_vp_layout), Some(object_layout)],
            immediate_size: 0,
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Depth Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[VERTEX_LAYOUT],
                compilation_options: Default::default(),
            },
            // Depth-only: no fragment stage needed for a depth target.
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Front-face culling reduces peter-panning on closed meshes.
                cull_mode: Some(wgpu::Face::Front),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: SHADOW_FORMAT,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::Less),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    /// Rebuilds settings-dependent pipeline state. Idempotent.
    pub fn apply_settings(&mut self, ctx: &GpuContext, options: &GraphicsOptions) {
        self.lit_pipeline = Self::build_lit_pipeline(
            ctx,
            &self.globals_layout,
            &self.object_layout,
            &self.shadow_layout,
            options,
        );
    }

    /// Drops cached GPU buffers for objects no longer in the scene.
    pub fn prune_caches(&mut self, scene: &Scene) {
        self.mesh_cache
            .retain(|key, _| scene.model_pool.contains_key(*key));
        self.object_cache
            .retain(|key, _| scene.nodes.contains_key(*key));
    }

    #[must_use]
    pub fn last_stats(&self) -> CullStats {
        self.last_stats
    }

    // ========================================================================
    // Frame rendering
    // ========================================================================

    /// Renders shadow passes and the main lit pass for one frame.
    pub fn render(
        &mut self,
        ctx: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        scene: &Scene,
        camera: &crate::scene::RenderCamera,
        shadow_maps: &FxHashMap<Uuid, ShadowMap>,
        options: &GraphicsOptions,
    ) {
        self.frame_index += 1;

        // 1-2. Frustum from the camera VP, then the visible set.
        let frustum = camera.frustum;
        let (visible, stats) = compute_visible_set(scene, &frustum, options);
        self.last_stats = stats;

        // 3. Stats cadence: every 60 frames at debug level.
        if self.frame_index % 60 == 0 {
            log::debug!(
                "cull: {}/{} objects visible (octree: {})",
                stats.visible,
                stats.total,
                scene.octree().is_some() && options.octree_enabled
            );
        }

        self.upload_objects(ctx, scene, &visible);
        let shadow_views = self.upload_globals(ctx, scene, camera, shadow_maps, options);

        // 4. One depth-only pass per shadow view.
        for (map_id, layer, slot) in &shadow_views {
            let Some(map) = shadow_maps.get(map_id) else {
                continue;
            };
            let Some(layer_view) = map.layer_views.get(*layer as usize) else {
                continue;
            };
            self.encode_shadow_pass(encoder, layer_view, scene, &visible, *slot);
        }

        // 5-6. Main-pass state is baked into the lit pipeline (depth test
        // on, cull per setting, no blend); encode the lit pass.
        self.encode_main_pass(encoder, ctx, surface_view, scene, &visible);
    }

    /// Uploads per-object uniforms and ensures mesh buffers exist.
    fn upload_objects(&mut self, ctx: &GpuContext, scene: &Scene, visible: &[NodeHandle]) {
        for &handle in visible {
            let Some(node) = scene.nodes.get(handle) else {
                continue;
            };
            let Some(&model_key) = scene.models.get(handle) else {
                continue;
            };
            let Some(model) = scene.model_pool.get(model_key) else {
                continue;
            };

            if !self.mesh_cache.contains_key(&model_key) {
                let buffers = model
                    .meshes
                    .iter()
                    .map(|mesh| upload_mesh(&ctx.device, mesh))
                    .collect();
                self.mesh_cache.insert(model_key, buffers);
            }

            let model_matrix = node.transform.world_matrix_as_mat4();
            let mesh_count = model.meshes.len();

            let bindings = self.object_cache.entry(handle).or_insert_with(|| {
                (0..mesh_count)
                    .map(|_| make_object_binding(&ctx.device, &self.object_layout))
                    .collect()
            });
            if bindings.len() != mesh_count {
                *bindings = (0..mesh_count)
                    .map(|_| make_object_binding(&ctx.device, &self.object_layout))
                    .collect();
            }

            for (mesh, binding) in model.meshes.iter().zip(bindings.iter()) {
                let uniforms = ObjectUniforms {
                    model: model_matrix.to_cols_array_2d(),
                    base_color: mesh.material.base_color.to_array(),
                    material: [mesh.material.metallic, mesh.material.roughness, 0.0, 0.0],
                    emissive: mesh.material.emissive.extend(0.0).to_array(),
                };
                ctx.queue
                    .write_buffer(&binding.uniform_buf, 0, bytemuck::bytes_of(&uniforms));
            }
        }
    }

    /// Builds light uniforms and the per-view shadow VP list. Returns
    /// `(shadow map id, layer, vp slot)` for every depth pass to run.
    fn upload_globals(
        &mut self,
        ctx: &GpuContext,
        scene: &Scene,
        camera: &crate::scene::RenderCamera,
        shadow_maps: &FxHashMap<Uuid, ShadowMap>,
        options: &GraphicsOptions,
    ) -> Vec<(Uuid, u32, u32)> {
        let mut lights = [GpuLight::default(); MAX_LIGHTS];
        let mut light_count = 0usize;
        let mut shadow_views: Vec<(Uuid, u32, u32)> = Vec::new();
        let mut vp_slots: Vec<Mat4> = Vec::new();
        let mut bound_shadow_vp = Mat4::IDENTITY;
        let mut shadow_light_index = -1.0f32;
        let scene_bounds = scene
            .scene_bounds
            .or_else(|| scene.compute_scene_bounds())
            .unwrap_or_default();

        for (node, light_key) in &scene.lights {
            if light_count >= MAX_LIGHTS {
                log::warn!("renderer: more than {MAX_LIGHTS} lights; extras ignored");
                break;
            }
            let Some(light) = scene.light_pool.get(*light_key) else {
                continue;
            };
            let Some(n) = scene.nodes.get(node) else {
                continue;
            };

            let position = n.transform.world_position();
            let direction = n.transform.world_forward();
            let has_map = shadow_maps.contains_key(&light.uuid);
            let casts = light.cast_shadows && options.shadows_enabled && has_map;

            let (kind, range, inner, outer) = match light.kind {
                LightKind::Directional => (0.0, 0.0, 0.0, 0.0),
                LightKind::Point { range } => (1.0, range, 0.0, 0.0),
                LightKind::Spot {
                    range,
                    inner_cone,
                    outer_cone,
                } => (2.0, range, inner_cone.cos(), outer_cone.cos()),
            };

            lights[light_count] = GpuLight {
                position_range: [position.x, position.y, position.z, range],
                direction_kind: [direction.x, direction.y, direction.z, kind],
                color_intensity: [
                    light.color.x,
                    light.color.y,
                    light.color.z,
                    light.intensity,
                ],
                cone_shadow: [inner, outer, f32::from(u8::from(casts)), 0.0],
            };

            if casts {
                match light.kind {
                    LightKind::Directional => {
                        let vp = shadow::directional_light_vp(direction, &scene_bounds);
                        let slot = vp_slots.len() as u32;
                        vp_slots.push(vp);
                        shadow_views.push((light.uuid, 0, slot));
                        if shadow_light_index < 0.0 {
                            shadow_light_index = light_count as f32;
                            bound_shadow_vp = vp;
                            self.bind_shadow_map(ctx, shadow_maps, light.uuid);
                        }
                    }
                    LightKind::Spot {
                        range, outer_cone, ..
                    } => {
                        let vp = shadow::spot_light_vp(position, direction, outer_cone, range);
                        let slot = vp_slots.len() as u32;
                        vp_slots.push(vp);
                        shadow_views.push((light.uuid, 0, slot));
                        if shadow_light_index < 0.0 {
                            shadow_light_index = light_count as f32;
                            bound_shadow_vp = vp;
                            self.bind_shadow_map(ctx, shadow_maps, light.uuid);
                        }
                    }
                    LightKind::Point { range } => {
                        for (face, vp) in shadow::point_light_face_vps(position, range)
                            .into_iter()
                            .enumerate()
                        {
                            let slot = vp_slots.len() as u32;
                            vp_slots.push(vp);
                            shadow_views.push((light.uuid, face as u32, slot));
                        }
                    }
                }
            }

            light_count += 1;
        }

        if shadow_light_index < 0.0 && self.bound_shadow_light.is_some() {
            // Nothing casts this frame: rebind the fallback.
            self.shadow_bind_group = Self::make_shadow_bind_group(
                &ctx.device,
                &self.shadow_layout,
                &self.fallback_shadow.sample_view,
                &self.shadow_sampler,
            );
            self.bound_shadow_light = None;
        }

        self.ensure_light_vp_capacity(&ctx.device, vp_slots.len() as u32);
        for (i, vp) in vp_slots.iter().enumerate() {
            ctx.queue.write_buffer(
                &self.light_vp_buf,
                u64::from(self.light_vp_stride) * i as u64,
                bytemuck::bytes_of(vp),
            );
        }

        let globals = GlobalUniforms {
            view_proj: camera.view_projection_matrix.to_cols_array_2d(),
            shadow_view_proj: bound_shadow_vp.to_cols_array_2d(),
            camera_pos: [camera.position.x, camera.position.y, camera.position.z, 1.0],
            params: [
                options.gamma,
                light_count as f32,
                shadow_light_index,
                0.0,
            ],
            lights,
        };
        ctx.queue
            .write_buffer(&self.globals_buf, 0, bytemuck::bytes_of(&globals));

        shadow_views
    }

    fn bind_shadow_map(
        &mut self,
        ctx: &GpuContext,
        shadow_maps: &FxHashMap<Uuid, ShadowMap>,
        light: Uuid,
    ) {
        if self.bound_shadow_light == Some(light) {
            return;
        }
        if let Some(map) = shadow_maps.get(&light) {
            // Point maps are array textures; the single-layer view binds fine.
            let view = map.layer_views.first().unwrap_or(&map.sample_view);
            self.shadow_bind_group =
                Self::make_shadow_bind_group(&ctx.device, &self.shadow_layout, view, &self.shadow_sampler);
            self.bound_shadow_light = Some(light);
        }
    }

    /// Forces the shadow bind group to be rebuilt (after map recreation).
    pub fn invalidate_shadow_binding(&mut self) {
        self.bound_shadow_light = None;
    }

    fn ensure_light_vp_capacity(&mut self, device: &wgpu::Device, required: u32) {
        if required <= self.light_vp_capacity {
            return;
        }
        let mut capacity = self.light_vp_capacity.max(1);
        while capacity < required {
            capacity = capacity.saturating_mul(2);
        }
        self.light_vp_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Light VP Buffer"),
            size: u64::from(self.light_vp_stride) * u64::from(capacity),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.light_vp_bind_group =
            Self::make_light_vp_bind_group(device, &self.light_vp_layout, &self.light_vp_buf);
        self.light_vp_capacity = capacity;
    }

    fn encode_shadow_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        scene: &Scene,
        visible: &[NodeHandle],
        vp_slot: u32,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(&self.depth_pipeline);
        pass.set_bind_group(
            0,
            &self.light_vp_bind_group,
            &[vp_slot * self.light_vp_stride],
        );
        self.draw_objects(&mut pass, scene, visible);
    }

    fn encode_main_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        ctx: &GpuContext,
        surface_view: &wgpu::TextureView,
        scene: &Scene,
        visible: &[NodeHandle],
    ) {
        let (color_view, resolve_target) = match ctx.msaa_view.as_ref() {
            Some(msaa) => (msaa, Some(surface_view)),
            None => (surface_view, None),
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Main Lit Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 0.02,
                        g: 0.02,
                        b: 0.03,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &ctx.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(&self.lit_pipeline);
        pass.set_bind_group(0, &self.globals_bind_group, &[]);
        pass.set_bind_group(2, &self.shadow_bind_group, &[]);
        self.draw_objects_lit(&mut pass, scene, visible);
    }

    fn draw_objects(&self, pass: &mut wgpu::RenderPass<'_>, scene: &Scene, visible: &[NodeHandle]) {
        for &handle in visible {
            let Some(&model_key) = scene.models.get(handle) else {
                continue;
            };
            let (Some(meshes), Some(bindings)) = (
                self.mesh_cache.get(&model_key),
                self.object_cache.get(&handle),
            ) else {
                continue;
            };
            for (mesh, binding) in meshes.iter().zip(bindings.iter()) {
                pass.set_bind_group(1, &binding.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buf.slice(..));
                pass.set_index_buffer(mesh.index_buf.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
    }

    fn draw_objects_lit(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        scene: &Scene,
        visible: &[NodeHandle],
    ) {
        // Same iteration as the depth pass; kept separate in case material
        // sorting lands here later.
        self.draw_objects(pass, scene, visible);
    }
}

fn upload_mesh(device: &wgpu::Device, mesh: &crate::resources::Mesh) -> GpuMeshBuffers {
    let vertices: Vec<Vertex> = (0..mesh.positions.len())
        .map(|i| Vertex {
            position: mesh.positions[i].to_array(),
            normal: mesh.normals.get(i).copied().unwrap_or(Vec3::Y).to_array(),
            uv: mesh
                .uvs
                .get(i)
                .copied()
                .unwrap_or(glam::Vec2::ZERO)
                .to_array(),
        })
        .collect();

    let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&mesh.name),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&mesh.name),
        contents: bytemuck::cast_slice(&mesh.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    GpuMeshBuffers {
        vertex_buf,
        index_buf,
        index_count: mesh.indices.len() as u32,
    }
}

fn make_object_binding(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> GpuObjectBinding {
    let uniform_buf = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Object Uniforms"),
        size: std::mem::size_of::<ObjectUniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Object BindGroup"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buf.as_entire_binding(),
        }],
    });
    GpuObjectBinding {
        uniform_buf,
        bind_group,
    }
}

fn align_to(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

// ============================================================================
// Shaders
// ============================================================================

const DEPTH_SHADER: &str = r"
struct ObjectUniforms {
    model: mat4x4<f32>,
    base_color: vec4<f32>,
    material: vec4<f32>,
    emissive: vec4<f32>,
};

@group(0) @binding(0) var<uniform> light_vp: mat4x4<f32>;
@group(1) @binding(0) var<uniform> object: ObjectUniforms;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return light_vp * object.model * vec4<f32>(position, 1.0);
}
";

const LIT_SHADER: &str = r"
struct Light {
    position_range: vec4<f32>,
    direction_kind: vec4<f32>,
    color_intensity: vec4<f32>,
    cone_shadow: vec4<f32>,
};

struct GlobalUniforms {
    view_proj: mat4x4<f32>,
    shadow_view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    params: vec4<f32>,
    lights: array<Light, 16>,
};

struct ObjectUniforms {
    model: mat4x4<f32>,
    base_color: vec4<f32>,
    material: vec4<f32>,
    emissive: vec4<f32>,
};

@group(0) @binding(0) var<uniform> globals: GlobalUniforms;
@group(1) @binding(0) var<uniform> object: ObjectUniforms;
@group(2) @binding(0) var shadow_map: texture_depth_2d;
@group(2) @binding(1) var shadow_sampler: sampler_comparison;

struct VsOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
) -> VsOut {
    var out: VsOut;
    let world = object.model * vec4<f32>(position, 1.0);
    out.world_position = world.xyz;
    out.world_normal = normalize((object.model * vec4<f32>(normal, 0.0)).xyz);
    out.uv = uv;
    out.clip_position = globals.view_proj * world;
    return out;
}

fn shadow_factor(world_position: vec3<f32>) -> f32 {
    let clip = globals.shadow_view_proj * vec4<f32>(world_position, 1.0);
    let ndc = clip.xyz / max(clip.w, 1e-6);
    let uv = ndc.xy * vec2<f32>(0.5, -0.5) + vec2<f32>(0.5, 0.5);
    if (any(uv < vec2<f32>(0.0)) || any(uv > vec2<f32>(1.0))) {
        return 1.0;
    }
    return textureSampleCompareLevel(shadow_map, shadow_sampler, uv, ndc.z - 0.002);
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let normal = normalize(in.world_normal);
    let view_dir = normalize(globals.camera_pos.xyz - in.world_position);
    let albedo = object.base_color.rgb;
    let roughness = clamp(object.material.y, 0.04, 1.0);

    let light_count = u32(globals.params.y);
    let shadow_index = globals.params.z;

    var color = albedo * 0.03 + object.emissive.rgb;

    for (var i = 0u; i < light_count; i = i + 1u) {
        let light = globals.lights[i];
        let kind = light.direction_kind.w;

        var light_dir: vec3<f32>;
        var attenuation = 1.0;

        if (kind < 0.5) {
            light_dir = -normalize(light.direction_kind.xyz);
        } else {
            let to_light = light.position_range.xyz - in.world_position;
            let dist = length(to_light);
            light_dir = to_light / max(dist, 1e-4);
            let range = max(light.position_range.w, 1e-3);
            let falloff = clamp(1.0 - dist / range, 0.0, 1.0);
            attenuation = falloff * falloff;

            if (kind > 1.5) {
                // Spot cone falloff between inner and outer cosines.
                let cos_angle = dot(-light_dir, normalize(light.direction_kind.xyz));
                attenuation = attenuation
                    * smoothstep(light.cone_shadow.y, light.cone_shadow.x, cos_angle);
            }
        }

        var shadow = 1.0;
        if (light.cone_shadow.z > 0.5 && f32(i) == shadow_index) {
            shadow = shadow_factor(in.world_position);
        }

        let n_dot_l = max(dot(normal, light_dir), 0.0);
        let half_dir = normalize(light_dir + view_dir);
        let spec_power = mix(128.0, 4.0, roughness);
        let specular = pow(max(dot(normal, half_dir), 0.0), spec_power) * (1.0 - roughness);

        let radiance = light.color_intensity.rgb * light.color_intensity.w * attenuation * shadow;
        color = color + (albedo * n_dot_l + vec3<f32>(specular)) * radiance;
    }

    let gamma = max(globals.params.x, 0.1);
    let corrected = pow(color, vec3<f32>(1.0 / gamma));
    return vec4<f32>(corrected, object.base_color.a);
}
";
