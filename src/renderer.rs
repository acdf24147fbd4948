use anyhow::{Context, Result};
use glam::Mat4;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::loaders::{self, ImageData, ModelData};
use crate::scene::ModelId;
use crate::types::{CameraUniform, ModelUniform, ModelVertex, SkyboxVertex, SKYBOX_VERTICES};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Depth test for the model pass; the default.
pub const SCENE_DEPTH_COMPARE: wgpu::CompareFunction = wgpu::CompareFunction::Less;

/// Depth test while the skybox draws, relaxed so fragments at exactly the
/// far plane still pass. Baked into the skybox pipeline; the scene
/// pipeline keeps the default, which is the wgpu shape of "set LEQUAL for
/// the skybox, restore LESS afterwards".
pub const SKYBOX_DEPTH_COMPARE: wgpu::CompareFunction = wgpu::CompareFunction::LessEqual;

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.1,
    a: 1.0,
};

/// Cubemap face file names in the required order:
/// +X, -X, +Y, -Y, +Z, -Z.
pub const CUBEMAP_FACES: [&str; 6] = [
    "textures/_right.jpg",
    "textures/_left.jpg",
    "textures/_top.jpg",
    "textures/_bottom.jpg",
    "textures/_front.jpg",
    "textures/_back.jpg",
];

/// Maps an image channel count onto a texture format. Anything outside
/// {1, 3, 4} fails the load instead of leaving the format undefined;
/// 3-channel data is expanded to RGBA on upload since wgpu has no
/// packed RGB8 format.
pub fn format_for_channels(channels: u8) -> Result<wgpu::TextureFormat> {
    match channels {
        1 => Ok(wgpu::TextureFormat::R8Unorm),
        3 | 4 => Ok(wgpu::TextureFormat::Rgba8UnormSrgb),
        other => anyhow::bail!("unsupported channel count {other}"),
    }
}

/// What the frame loop should do about a failed surface acquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRecovery {
    /// Surface is stale; reconfigure it and try again next frame.
    Reconfigure,
    /// The device is out of memory; no frame will ever succeed again.
    Exit,
    /// Transient; drop this frame.
    Skip,
}

pub fn recovery_for(error: &wgpu::SurfaceError) -> SurfaceRecovery {
    match error {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceRecovery::Reconfigure,
        wgpu::SurfaceError::OutOfMemory => SurfaceRecovery::Exit,
        _ => SurfaceRecovery::Skip,
    }
}

fn expand_rgb_to_rgba(pixels: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(pixels.len() / 3 * 4);
    for rgb in pixels.chunks_exact(3) {
        rgba.extend_from_slice(rgb);
        rgba.push(255);
    }
    rgba
}

/// Matrices a frame is rendered with. `view` is sampled before the
/// camera-mode switch, `sky_view` after it, with translation stripped.
#[derive(Debug, Clone, Copy)]
pub struct FrameMatrices {
    pub view: Mat4,
    pub projection: Mat4,
    pub sky_view: Mat4,
}

struct GpuPrimitive {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    base_color: [f32; 4],
}

struct GpuModel {
    primitives: Vec<GpuPrimitive>,
}

/// Owns the GPU device, the two pipelines, and every uploaded scene
/// resource. Draw order and depth state are fixed at pipeline creation.
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    model_pipeline: wgpu::RenderPipeline,
    model_bind_group_layout: wgpu::BindGroupLayout,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    skybox_pipeline: wgpu::RenderPipeline,
    skybox_buffer: wgpu::Buffer,
    skybox_bind_group: wgpu::BindGroup,
    skybox_vertex_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    models: HashMap<ModelId, GpuModel>,
}

impl Renderer {
    pub fn new(window: Arc<Window>, assets: &Path) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            experimental_features: Default::default(),
            trace: Default::default(),
        }))
        .context("failed to request device")?;

        let config = Self::create_surface_config(&surface, &adapter, size);
        surface.configure(&device, &config);

        let depth_view = Self::create_depth_view(&device, &config);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Scene Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // Shared view/projection for every model draw.
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let model_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Model Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let model_pipeline = Self::create_model_pipeline(
            &device,
            config.format,
            &camera_bind_group_layout,
            &model_bind_group_layout,
        );

        // Skybox: rotation-only view in its own uniform, cubemap bound
        // alongside.
        let skybox_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Skybox Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let skybox_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Skybox Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::Cube,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let cubemap_view = Self::load_cubemap(&device, &queue, assets);

        let skybox_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Skybox Bind Group"),
            layout: &skybox_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: skybox_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&cubemap_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let skybox_pipeline =
            Self::create_skybox_pipeline(&device, config.format, &skybox_bind_group_layout);

        let skybox_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Skybox Vertex Buffer"),
            contents: bytemuck::cast_slice(&SKYBOX_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let mut renderer = Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            model_pipeline,
            model_bind_group_layout,
            camera_buffer,
            camera_bind_group,
            skybox_pipeline,
            skybox_buffer,
            skybox_bind_group,
            skybox_vertex_buffer,
            sampler,
            models: HashMap::new(),
        };

        for id in ModelId::ALL {
            let path = assets.join(id.asset_path());
            let data = loaders::load_model(&path)?;
            renderer.upload_model(id, &data);
        }

        log::info!("renderer initialized ({}x{})", size.width, size.height);
        Ok(renderer)
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::SurfaceConfiguration {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    fn create_depth_view(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_model_pipeline(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        camera_layout: &wgpu::BindGroupLayout,
        model_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Model Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("model.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Model Pipeline Layout"),
            bind_group_layouts: &[camera_layout, model_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Model Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[ModelVertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: SCENE_DEPTH_COMPARE,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_skybox_pipeline(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        skybox_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Skybox Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("skybox.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Skybox Pipeline Layout"),
            bind_group_layouts: &[skybox_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Skybox Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[SkyboxVertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: SKYBOX_DEPTH_COMPARE,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Uploads a loaded model under the given id. Stations and signs are
    /// uploaded once per placement, mirroring the hand-authored layout.
    fn upload_model(&mut self, id: ModelId, data: &ModelData) {
        let primitives = data
            .primitives
            .iter()
            .map(|primitive| {
                let vertex_buffer =
                    self.device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some("Model Vertex Buffer"),
                            contents: bytemuck::cast_slice(&primitive.vertices),
                            usage: wgpu::BufferUsages::VERTEX,
                        });
                let index_buffer =
                    self.device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some("Model Index Buffer"),
                            contents: bytemuck::cast_slice(&primitive.indices),
                            usage: wgpu::BufferUsages::INDEX,
                        });
                let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Model Uniform Buffer"),
                    size: std::mem::size_of::<ModelUniform>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });

                let texture_view = self.upload_primitive_texture(primitive.texture.as_ref());

                let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Model Bind Group"),
                    layout: &self.model_bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: uniform_buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&texture_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                    ],
                });

                GpuPrimitive {
                    vertex_buffer,
                    index_buffer,
                    index_count: primitive.indices.len() as u32,
                    uniform_buffer,
                    bind_group,
                    base_color: primitive.base_color,
                }
            })
            .collect();

        self.models.insert(id, GpuModel { primitives });
    }

    /// Uploads a primitive's base-color texture. Untextured primitives
    /// get 1x1 white so the base-color factor stands alone; a rejected
    /// channel count logs and degrades to a magenta placeholder.
    fn upload_primitive_texture(&self, image: Option<&ImageData>) -> wgpu::TextureView {
        let white = ImageData {
            width: 1,
            height: 1,
            channels: 4,
            pixels: vec![255, 255, 255, 255],
        };
        let image = match image {
            Some(image) => match format_for_channels(image.channels) {
                Ok(_) => image,
                Err(err) => {
                    log::error!("texture rejected: {err}, substituting placeholder");
                    return self.upload_2d(&ImageData {
                        width: 1,
                        height: 1,
                        channels: 4,
                        pixels: vec![255, 0, 255, 255],
                    });
                }
            },
            None => &white,
        };
        self.upload_2d(image)
    }

    fn upload_2d(&self, image: &ImageData) -> wgpu::TextureView {
        // Channel count was validated by the caller.
        let format = format_for_channels(image.channels)
            .unwrap_or(wgpu::TextureFormat::Rgba8UnormSrgb);
        let (pixels, bytes_per_pixel) = match image.channels {
            1 => (image.pixels.clone(), 1),
            3 => (expand_rgb_to_rgba(&image.pixels), 4),
            _ => (image.pixels.clone(), 4),
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Model Texture"),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width * bytes_per_pixel),
                rows_per_image: Some(image.height),
            },
            wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
        );

        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Loads the six cubemap faces. A face that fails to decode logs the
    /// failing path and is replaced by a flat gray fill; rendering
    /// continues in a degraded state.
    fn load_cubemap(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        assets: &Path,
    ) -> wgpu::TextureView {
        let mut faces: Vec<Option<image::RgbaImage>> = Vec::with_capacity(6);
        for face in CUBEMAP_FACES {
            let path = assets.join(face);
            let decoded = image::open(&path)
                .map_err(|err| {
                    log::error!("cubemap face failed to load at {:?}: {err}", path);
                })
                .ok()
                .and_then(|img| match format_for_channels(img.color().channel_count()) {
                    Ok(_) => Some(img.to_rgba8()),
                    Err(err) => {
                        log::error!("cubemap face rejected at {:?}: {err}", path);
                        None
                    }
                });
            faces.push(decoded);
        }

        let (width, height) = faces
            .iter()
            .flatten()
            .next()
            .map_or((1, 1), |img| img.dimensions());

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Skybox Cubemap"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let gray = vec![128u8; (width * height * 4) as usize];
        for (layer, face) in faces.iter().enumerate() {
            let pixels: &[u8] = match face {
                Some(img) if img.dimensions() == (width, height) => img.as_raw(),
                Some(_) => {
                    log::error!("cubemap face {layer} has mismatched dimensions, using fill");
                    &gray
                }
                None => &gray,
            };
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(width * 4),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }

        texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = Self::create_depth_view(&self.device, &self.config);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    /// Draws one frame: the scene objects in the given order, then the
    /// skybox last under its relaxed depth test, then present.
    pub fn render(
        &mut self,
        matrices: &FrameMatrices,
        draws: &[(ModelId, Mat4)],
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let camera_uniform = CameraUniform {
            view: matrices.view.to_cols_array_2d(),
            projection: matrices.projection.to_cols_array_2d(),
        };
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera_uniform]),
        );

        let sky_uniform = CameraUniform {
            view: matrices.sky_view.to_cols_array_2d(),
            projection: matrices.projection.to_cols_array_2d(),
        };
        self.queue
            .write_buffer(&self.skybox_buffer, 0, bytemuck::cast_slice(&[sky_uniform]));

        for (id, model_matrix) in draws {
            if let Some(model) = self.models.get(id) {
                for primitive in &model.primitives {
                    let uniform = ModelUniform {
                        model: model_matrix.to_cols_array_2d(),
                        base_color: primitive.base_color,
                    };
                    self.queue.write_buffer(
                        &primitive.uniform_buffer,
                        0,
                        bytemuck::cast_slice(&[uniform]),
                    );
                }
            }
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            pass.set_pipeline(&self.model_pipeline);
            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            for (id, _) in draws {
                if let Some(model) = self.models.get(id) {
                    for primitive in &model.primitives {
                        pass.set_bind_group(1, &primitive.bind_group, &[]);
                        pass.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
                        pass.set_index_buffer(
                            primitive.index_buffer.slice(..),
                            wgpu::IndexFormat::Uint32,
                        );
                        pass.draw_indexed(0..primitive.index_count, 0, 0..1);
                    }
                }
            }

            // Skybox last; its pipeline relaxes the depth test.
            pass.set_pipeline(&self.skybox_pipeline);
            pass.set_bind_group(0, &self.skybox_bind_group, &[]);
            pass.set_vertex_buffer(0, self.skybox_vertex_buffer.slice(..));
            pass.draw(0..SKYBOX_VERTICES.len() as u32, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_policy_accepts_known_counts() {
        assert_eq!(
            format_for_channels(1).unwrap(),
            wgpu::TextureFormat::R8Unorm
        );
        assert_eq!(
            format_for_channels(3).unwrap(),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        assert_eq!(
            format_for_channels(4).unwrap(),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
    }

    #[test]
    fn channel_policy_rejects_everything_else() {
        assert!(format_for_channels(0).is_err());
        assert!(format_for_channels(2).is_err());
        assert!(format_for_channels(5).is_err());
    }

    #[test]
    fn rgb_expansion_appends_opaque_alpha() {
        let rgba = expand_rgb_to_rgba(&[10, 20, 30, 40, 50, 60]);
        assert_eq!(rgba, vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn skybox_depth_test_is_relaxed_scene_is_default() {
        assert_eq!(SKYBOX_DEPTH_COMPARE, wgpu::CompareFunction::LessEqual);
        assert_eq!(SCENE_DEPTH_COMPARE, wgpu::CompareFunction::Less);
    }

    #[test]
    fn out_of_memory_is_fatal_stale_surfaces_are_not() {
        assert_eq!(
            recovery_for(&wgpu::SurfaceError::OutOfMemory),
            SurfaceRecovery::Exit
        );
        assert_eq!(
            recovery_for(&wgpu::SurfaceError::Lost),
            SurfaceRecovery::Reconfigure
        );
        assert_eq!(
            recovery_for(&wgpu::SurfaceError::Outdated),
            SurfaceRecovery::Reconfigure
        );
        assert_eq!(
            recovery_for(&wgpu::SurfaceError::Timeout),
            SurfaceRecovery::Skip
        );
    }

    #[test]
    fn cubemap_faces_are_in_gl_order() {
        assert!(CUBEMAP_FACES[0].contains("right")); // +X
        assert!(CUBEMAP_FACES[1].contains("left")); // -X
        assert!(CUBEMAP_FACES[2].contains("top")); // +Y
        assert!(CUBEMAP_FACES[3].contains("bottom")); // -Y
        assert!(CUBEMAP_FACES[4].contains("front")); // +Z
        assert!(CUBEMAP_FACES[5].contains("back")); // -Z
    }
}
