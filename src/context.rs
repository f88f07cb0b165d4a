use std::{collections::HashMap, sync::Arc};

use anyhow::{Context as _, Result, anyhow};
use wgpu::util::DeviceExt;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    camera::{CameraResources, CameraUniform},
    data_structures::{
        model::{GpuMesh, Material, Surface},
        texture::{self, Texture},
    },
    pipelines::{basic::mk_basic_pipeline, overlay::OverlayResources},
    settings::Settings,
};

/// Placeholder colour for meshes whose texture is not uploaded yet.
const PLACEHOLDER_RGBA: [u8; 4] = [128, 128, 128, 255];

#[derive(Debug)]
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
}

/// Logical size (what the page lays out) and drawing-buffer size of the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewportSize {
    pub logical: (u32, u32),
    pub physical: (u32, u32),
}

impl ViewportSize {
    /// The drawing buffer is the logical size times the device pixel ratio, with
    /// the ratio capped at `max_pixel_ratio`.
    pub fn new(inner: PhysicalSize<u32>, scale_factor: f64, max_pixel_ratio: f64) -> Self {
        let logical = inner.to_logical::<f64>(scale_factor);
        let ratio = scale_factor.min(max_pixel_ratio);
        Self {
            logical: (logical.width.round() as u32, logical.height.round() as u32),
            physical: (
                (logical.width * ratio).round() as u32,
                (logical.height * ratio).round() as u32,
            ),
        }
    }
}

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub pipelines: Pipelines,
    pub overlay: OverlayResources,
    pub clear_colour: wgpu::Color,
    pub max_pixel_ratio: f64,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    /// Uploaded textures keyed by their label.
    materials: HashMap<String, Material>,
    placeholder: Material,
}

impl Context {
    pub async fn new(window: Arc<Window>, settings: &Settings) -> Result<Self> {
        let size = ViewportSize::new(
            window.inner_size(),
            window.scale_factor(),
            settings.max_pixel_ratio,
        );

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("No suitable graphics adapter: {e}"))?;
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                experimental_features: Default::default(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Baked textures are sRGB, so is the surface whenever possible.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface is incompatible with the adapter"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.physical.0.max(1),
            height: size.physical.1.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        // Written every frame before drawing.
        let camera_uniform = CameraUniform::new();

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("camera_bind_group_layout"),
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let texture_bind_group_layout = texture::texture_layout(&device);
        let pipelines = Pipelines {
            basic: mk_basic_pipeline(
                &device,
                &config,
                &texture_bind_group_layout,
                &camera_bind_group_layout,
            ),
        };
        let overlay = OverlayResources::new(&device, &config);

        let camera = CameraResources {
            uniform: camera_uniform,
            buffer: camera_buffer,
            bind_group: camera_bind_group,
            bind_group_layout: camera_bind_group_layout,
        };

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        let placeholder = Material::new(
            &device,
            "placeholder",
            Texture::create_solid(PLACEHOLDER_RGBA, &device, &queue),
            &texture_bind_group_layout,
        );

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            pipelines,
            overlay,
            clear_colour: settings.clear_colour,
            max_pixel_ratio: settings.max_pixel_ratio,
            texture_bind_group_layout,
            materials: HashMap::new(),
            placeholder,
        })
    }

    pub fn viewport_size(&self) -> ViewportSize {
        ViewportSize::new(
            self.window.inner_size(),
            self.window.scale_factor(),
            self.max_pixel_ratio,
        )
    }

    /// Uploads a decoded image and registers it under `label`.
    pub fn upload_texture(&mut self, label: &str, image: &image::DynamicImage) -> Result<()> {
        let texture = Texture::from_image(&self.device, &self.queue, image, Some(label))
            .with_context(|| format!("Uploading texture {label}"))?;
        let material = Material::new(&self.device, label, texture, &self.texture_bind_group_layout);
        if self.materials.insert(label.to_string(), material).is_some() {
            log::warn!("Texture {label} was uploaded twice, keeping the latest");
        }
        Ok(())
    }

    /// Material a mesh is drawn with. Falls back to the placeholder until its
    /// texture is uploaded.
    pub fn material_for<'a>(&'a self, surface: &Surface, gpu: &'a GpuMesh) -> &'a Material {
        match surface {
            Surface::Baked(handle) => self
                .materials
                .get(handle.label())
                .unwrap_or(&self.placeholder),
            Surface::Color(_) => gpu.color_material.as_ref().unwrap_or(&self.placeholder),
            Surface::Unassigned => &self.placeholder,
        }
    }
}
