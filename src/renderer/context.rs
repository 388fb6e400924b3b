//! GPU Context
//!
//! [`GpuContext`] owns the wgpu device, queue, surface and the window-sized
//! render targets (depth, MSAA color). It handles resize, vsync switching
//! and MSAA reconfiguration; everything else lives in the per-feature
//! renderers.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::errors::{LumenError, Result};

pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,

    pub depth_format: wgpu::TextureFormat,
    pub depth_view: wgpu::TextureView,
    /// Multisampled color target; `None` when MSAA is off.
    pub msaa_view: Option<wgpu::TextureView>,
    pub msaa_samples: u32,
    /// Line polygon mode is optional on some adapters; wireframe degrades
    /// to filled triangles without it.
    pub supports_wireframe: bool,
}

impl GpuContext {
    pub async fn new<W>(window: W, width: u32, height: u32, vsync: bool) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .map_err(|e| LumenError::AdapterRequestFailed(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| LumenError::AdapterRequestFailed(e.to_string()))?;

        let supports_wireframe = adapter
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE);
        let mut required_features = wgpu::Features::empty();
        if supports_wireframe {
            required_features |= wgpu::Features::POLYGON_MODE_LINE;
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        let mut config = surface
            .get_default_config(&adapter, width.max(1), height.max(1))
            .ok_or_else(|| {
                LumenError::AdapterRequestFailed("Surface not supported by adapter".to_string())
            })?;
        config.present_mode = present_mode(vsync);
        surface.configure(&device, &config);

        let depth_format = wgpu::TextureFormat::Depth32Float;
        let depth_view = create_depth_texture(&device, &config, depth_format, 1);

        Ok(Self {
            device,
            queue,
            surface,
            config,
            depth_format,
            depth_view,
            msaa_view: None,
            msaa_samples: 1,
            supports_wireframe,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.recreate_targets();
    }

    /// Switches the swap interval; takes effect on the next configure.
    pub fn set_vsync(&mut self, vsync: bool) {
        self.config.present_mode = present_mode(vsync);
        self.surface.configure(&self.device, &self.config);
    }

    /// Applies a new MSAA sample count, recreating the window-sized targets.
    /// Unsupported counts fall back to 1 with a diagnostic.
    pub fn set_msaa_samples(&mut self, samples: u32) {
        let samples = match samples {
            0 | 1 => 1,
            2 | 4 | 8 => samples,
            other => {
                log::warn!("renderer: unsupported MSAA sample count {other}; disabling MSAA");
                1
            }
        };
        if samples == self.msaa_samples {
            return;
        }
        self.msaa_samples = samples;
        self.recreate_targets();
    }

    fn recreate_targets(&mut self) {
        self.depth_view = create_depth_texture(
            &self.device,
            &self.config,
            self.depth_format,
            self.msaa_samples,
        );
        self.msaa_view = (self.msaa_samples > 1).then(|| {
            let texture = self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("MSAA Color Target"),
                size: wgpu::Extent3d {
                    width: self.config.width,
                    height: self.config.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: self.msaa_samples,
                dimension: wgpu::TextureDimension::D2,
                format: self.config.format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            });
            texture.create_view(&wgpu::TextureViewDescriptor::default())
        });
    }

    #[must_use]
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    format: wgpu::TextureFormat,
    sample_count: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
