use anyhow::{Context, Result};
use glam::Vec3;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::camera::PerspectiveCamera;
use crate::config::{Config, ShadowConfig};
use crate::core::Bvh;
use crate::scene::Scene;
use crate::types::{CameraUniform, LightingUniform, MaterialData, TriangleData};

pub const WORKGROUP_SIZE: u32 = 8;

const OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Size of the ray traced image for a window: logical size times the device
/// pixel ratio capped at `max_pixel_ratio`. `None` while minimized.
pub fn render_size(
    physical: PhysicalSize<u32>,
    scale_factor: f64,
    max_pixel_ratio: f32,
) -> Option<PhysicalSize<u32>> {
    if physical.width == 0 || physical.height == 0 || scale_factor <= 0.0 {
        return None;
    }

    let ratio = scale_factor.min(max_pixel_ratio as f64);
    let logical = physical.to_logical::<f64>(scale_factor);
    let width = (logical.width * ratio).round().max(1.0) as u32;
    let height = (logical.height * ratio).round().max(1.0) as u32;
    Some(PhysicalSize::new(width, height))
}

/// Pack the scene's lights, fog and background into the shading uniform
pub fn lighting_uniform(
    scene: &Scene,
    shadows: &ShadowConfig,
    triangle_count: u32,
) -> LightingUniform {
    let ambient = scene.ambient();
    let moon = scene.directional();
    let fog = scene.fog;

    LightingUniform {
        ambient_color: ambient.color.to_array(),
        ambient_intensity: ambient.intensity,
        moon_color: moon.map_or([0.0; 3], |m| m.color.to_array()),
        moon_intensity: moon.map_or(0.0, |m| m.intensity),
        moon_direction: moon.map_or(Vec3::Y, |m| m.direction()).to_array(),
        shadow_samples: shadows.samples.max(1),
        fog_color: fog.map_or(scene.background, |f| f.color).to_array(),
        fog_near: fog.map_or(0.0, |f| f.near),
        background: scene.background.to_array(),
        fog_far: fog.map_or(1.0, |f| f.far),
        shadow_softness: shadows.softness,
        shadows_enabled: (shadows.enabled && moon.is_some_and(|m| m.cast_shadow)) as u32,
        fog_enabled: fog.is_some() as u32,
        triangle_count,
    }
}

/// Counts shown in the overlay
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneStats {
    pub meshes: usize,
    pub triangles: usize,
    pub bvh_nodes: usize,
    pub bvh_depth: usize,
}

/// Per-frame values from the app loop shown in the overlay
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInfo {
    pub fps: f32,
    pub camera_distance: f32,
}

struct SceneBuffers {
    triangles: wgpu::Buffer,
    nodes: wgpu::Buffer,
    materials: wgpu::Buffer,
}

pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    render_size: Option<PhysicalSize<u32>>,
    max_pixel_ratio: f32,
    compute_pipeline: wgpu::ComputePipeline,
    compute_bind_group_layout: wgpu::BindGroupLayout,
    compute_bind_group: wgpu::BindGroup,
    render_pipeline: wgpu::RenderPipeline,
    render_bind_group_layout: wgpu::BindGroupLayout,
    render_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    camera_buffer: wgpu::Buffer,
    lighting_buffer: wgpu::Buffer,
    scene_buffers: SceneBuffers,
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
    show_ui: bool,
    stats: SceneStats,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, scene: &Scene, config: &Config) -> Result<Self> {
        let size = window.inner_size();
        let scale_factor = window.scale_factor();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;
        let adapter = Self::request_adapter(&instance, &surface).await?;
        let (device, queue) = Self::request_device(&adapter).await?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let surface_config = Self::create_surface_config(&surface, &adapter, size)?;
        if size.width > 0 && size.height > 0 {
            surface.configure(&device, &surface_config);
        }

        let triangles = scene.triangles();
        let bvh = Bvh::build(&triangles);
        log::info!(
            "BVH built: {} triangles, {} nodes, {} leaves, depth {}, {:.1} triangles/leaf",
            bvh.triangles.len(),
            bvh.nodes.len(),
            bvh.stats.num_leaves,
            bvh.stats.max_depth,
            bvh.stats.avg_leaf_size
        );

        let stats = SceneStats {
            meshes: scene.mesh_count(),
            triangles: bvh.triangles.len(),
            bvh_nodes: bvh.nodes.len(),
            bvh_depth: bvh.stats.max_depth,
        };

        let scene_buffers = Self::create_scene_buffers(&device, scene, &bvh);

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let lighting = lighting_uniform(scene, &config.shadows, bvh.triangles.len() as u32);
        let lighting_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lighting Buffer"),
            contents: bytemuck::cast_slice(&[lighting]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let render_size = render_size(size, scale_factor, config.max_pixel_ratio);
        let output_view = Self::create_output_texture(&device, render_size.unwrap_or(size));

        let compute_bind_group_layout = Self::create_compute_bind_group_layout(&device);
        let compute_bind_group = Self::create_compute_bind_group(
            &device,
            &compute_bind_group_layout,
            &camera_buffer,
            &lighting_buffer,
            &scene_buffers,
            &output_view,
        );
        let compute_pipeline = Self::create_compute_pipeline(&device, &compute_bind_group_layout);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let render_bind_group_layout = Self::create_render_bind_group_layout(&device);
        let render_bind_group = Self::create_render_bind_group(
            &device,
            &render_bind_group_layout,
            &output_view,
            &sampler,
        );
        let render_pipeline = Self::create_render_pipeline(
            &device,
            &render_bind_group_layout,
            surface_config.format,
        );

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(scale_factor as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &device,
            surface_config.format,
            egui_wgpu::RendererOptions::default(),
        );

        log::info!(
            "Renderer initialized: {} meshes, surface {:?}, render size {:?}",
            stats.meshes,
            surface_config.format,
            render_size
        );

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            render_size,
            max_pixel_ratio: config.max_pixel_ratio,
            compute_pipeline,
            compute_bind_group_layout,
            compute_bind_group,
            render_pipeline,
            render_bind_group_layout,
            render_bind_group,
            sampler,
            camera_buffer,
            lighting_buffer,
            scene_buffers,
            egui_renderer,
            egui_state,
            egui_ctx,
            show_ui: config.show_ui,
            stats,
        })
    }

    async fn request_adapter(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'_>,
    ) -> Result<wgpu::Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to find appropriate adapter")
    }

    async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("Failed to create device")
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: PhysicalSize<u32>,
    ) -> Result<wgpu::SurfaceConfiguration> {
        let surface_caps = surface.get_capabilities(adapter);
        let first = *surface_caps
            .formats
            .first()
            .context("Surface is not supported by the adapter")?;
        // Colors are written as linear values without output encoding
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(first);

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        })
    }

    /// Storage bindings may not be empty, so empty scenes upload one zeroed element
    fn storage_buffer<T: bytemuck::Pod>(
        device: &wgpu::Device,
        label: &str,
        items: &[T],
    ) -> wgpu::Buffer {
        let placeholder = [T::zeroed()];
        let items = if items.is_empty() { &placeholder[..] } else { items };
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(items),
            usage: wgpu::BufferUsages::STORAGE,
        })
    }

    fn create_scene_buffers(device: &wgpu::Device, scene: &Scene, bvh: &Bvh) -> SceneBuffers {
        let materials: Vec<MaterialData> = scene.gpu_materials();
        let triangles: &[TriangleData] = &bvh.triangles;
        SceneBuffers {
            triangles: Self::storage_buffer(device, "Triangle Buffer", triangles),
            nodes: Self::storage_buffer(device, "BVH Node Buffer", &bvh.nodes),
            materials: Self::storage_buffer(device, "Material Buffer", &materials),
        }
    }

    fn create_output_texture(device: &wgpu::Device, size: PhysicalSize<u32>) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Output Texture"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OUTPUT_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn buffer_entry(binding: u32, ty: wgpu::BufferBindingType) -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }
    }

    fn create_compute_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let storage = wgpu::BufferBindingType::Storage { read_only: true };
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                Self::buffer_entry(0, wgpu::BufferBindingType::Uniform),
                Self::buffer_entry(1, wgpu::BufferBindingType::Uniform),
                Self::buffer_entry(2, storage),
                Self::buffer_entry(3, storage),
                Self::buffer_entry(4, storage),
                wgpu::BindGroupLayoutEntry {
                    binding: 5,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: OUTPUT_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
            label: Some("scene_bind_group_layout"),
        })
    }

    fn create_compute_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        camera_buffer: &wgpu::Buffer,
        lighting_buffer: &wgpu::Buffer,
        scene_buffers: &SceneBuffers,
        output_view: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lighting_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: scene_buffers.triangles.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: scene_buffers.nodes.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: scene_buffers.materials.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::TextureView(output_view),
                },
            ],
            label: Some("scene_bind_group"),
        })
    }

    fn create_compute_pipeline(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::ComputePipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Compute Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

        device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Scene Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        })
    }

    fn create_render_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
            label: Some("render_bind_group_layout"),
        })
    }

    fn create_render_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        output_view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(output_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
            label: Some("render_bind_group"),
        })
    }

    fn create_render_pipeline(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Display Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/display.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Display Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
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
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    /// Reconfigure the surface and, if the render resolution changed, the
    /// output texture. Zero-sized windows are left unconfigured.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>, scale_factor: f64) {
        let Some(size) = render_size(new_size, scale_factor, self.max_pixel_ratio) else {
            log::debug!("Window minimized, skipping surface configuration");
            self.render_size = None;
            return;
        };

        self.surface_config.width = new_size.width;
        self.surface_config.height = new_size.height;
        self.surface.configure(&self.device, &self.surface_config);

        if self.render_size != Some(size) {
            let output_view = Self::create_output_texture(&self.device, size);
            self.compute_bind_group = Self::create_compute_bind_group(
                &self.device,
                &self.compute_bind_group_layout,
                &self.camera_buffer,
                &self.lighting_buffer,
                &self.scene_buffers,
                &output_view,
            );
            self.render_bind_group = Self::create_render_bind_group(
                &self.device,
                &self.render_bind_group_layout,
                &output_view,
                &self.sampler,
            );
            log::debug!("Render size {}x{}", size.width, size.height);
        }
        self.render_size = Some(size);
    }

    /// Re-apply the current surface configuration after it was lost or outdated
    pub fn reconfigure(&mut self) {
        if self.render_size.is_some() {
            self.surface.configure(&self.device, &self.surface_config);
        }
    }

    pub fn render(
        &mut self,
        camera: &PerspectiveCamera,
        window: &Window,
        frame: FrameInfo,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let Some(size) = self.render_size else {
            return Ok(());
        };

        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera.to_uniform()]),
        );

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Compute Pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.compute_pipeline);
            compute_pass.set_bind_group(0, &self.compute_bind_group, &[]);
            compute_pass.dispatch_workgroups(
                size.width.div_ceil(WORKGROUP_SIZE),
                size.height.div_ceil(WORKGROUP_SIZE),
                1,
            );
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Display Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.render_bind_group, &[]);
            render_pass.draw(0..6, 0..1);
        }

        let mut command_buffers = Vec::new();
        if self.show_ui {
            command_buffers = self.draw_overlay(&mut encoder, &view, window, camera, frame, size);
        }
        command_buffers.push(encoder.finish());

        self.queue.submit(command_buffers);
        output.present();
        Ok(())
    }

    fn draw_overlay(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        window: &Window,
        camera: &PerspectiveCamera,
        frame: FrameInfo,
        render_size: PhysicalSize<u32>,
    ) -> Vec<wgpu::CommandBuffer> {
        let raw_input = self.egui_state.take_egui_input(window);
        let stats = self.stats;

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::Window::new("Haunted House")
                .title_bar(true)
                .resizable(false)
                .fixed_pos(egui::pos2(10.0, 10.0))
                .default_width(220.0)
                .show(ctx, |ui| {
                    ui.heading(
                        egui::RichText::new(format!("{:.0} FPS", frame.fps))
                            .size(28.0)
                            .color(egui::Color32::from_rgb(185, 213, 255)),
                    );

                    let frame_time_ms = if frame.fps > 0.0 { 1000.0 / frame.fps } else { 0.0 };
                    ui.label(
                        egui::RichText::new(format!("{:.2} ms", frame_time_ms))
                            .size(14.0)
                            .color(egui::Color32::GRAY),
                    );

                    ui.add_space(5.0);
                    ui.separator();

                    ui.label(
                        egui::RichText::new("Camera")
                            .size(16.0)
                            .color(egui::Color32::from_rgb(169, 195, 136)),
                    );
                    ui.monospace(format!(
                        "Pos: ({:.2}, {:.2}, {:.2})",
                        camera.position.x, camera.position.y, camera.position.z
                    ));
                    ui.monospace(format!("Distance: {:.2}", frame.camera_distance));

                    ui.add_space(5.0);
                    ui.separator();

                    ui.label(
                        egui::RichText::new("Scene")
                            .size(16.0)
                            .color(egui::Color32::from_rgb(179, 95, 69)),
                    );
                    ui.monospace(format!("Meshes: {}", stats.meshes));
                    ui.monospace(format!("Triangles: {}", stats.triangles));
                    ui.monospace(format!(
                        "BVH: {} nodes, depth {}",
                        stats.bvh_nodes, stats.bvh_depth
                    ));
                    ui.monospace(format!(
                        "Resolution: {}x{}",
                        render_size.width, render_size.height
                    ));
                });
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.surface_config.width, self.surface_config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let command_buffers = self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.egui_renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        command_buffers
    }

    /// Returns true when egui consumed the event
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.show_ui && self.egui_state.on_window_event(window, event).consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::{AmbientLight, DirectionalLight, Light};
    use crate::math::Color;
    use crate::scene::Fog;

    #[test]
    fn test_render_size_caps_pixel_ratio() {
        // 800x600 logical on a 3x display renders at 2x
        let size = render_size(PhysicalSize::new(2400, 1800), 3.0, 2.0).unwrap();
        assert_eq!(size, PhysicalSize::new(1600, 1200));

        let size = render_size(PhysicalSize::new(1600, 1200), 2.0, 2.0).unwrap();
        assert_eq!(size, PhysicalSize::new(1600, 1200));

        let size = render_size(PhysicalSize::new(800, 600), 1.0, 2.0).unwrap();
        assert_eq!(size, PhysicalSize::new(800, 600));
    }

    #[test]
    fn test_render_size_minimized() {
        assert!(render_size(PhysicalSize::new(0, 0), 1.0, 2.0).is_none());
        assert!(render_size(PhysicalSize::new(800, 0), 1.0, 2.0).is_none());
    }

    #[test]
    fn test_lighting_uniform() {
        let mut scene = Scene::new();
        scene.background = Color::from_hex(0x262837);
        scene.fog = Some(Fog::new(Color::from_hex(0x262837), 1.0, 15.0));
        scene.add_light(Light::Ambient(AmbientLight::new(Color::WHITE, 0.5)));
        let mut moon = DirectionalLight::new(Color::WHITE, 0.2);
        moon.position = Vec3::new(0.0, 10.0, 0.0);
        moon.cast_shadow = true;
        scene.add_light(Light::Directional(moon));

        let shadows = ShadowConfig {
            enabled: true,
            samples: 0,
            softness: 0.1,
        };
        let uniform = lighting_uniform(&scene, &shadows, 12);

        assert_eq!(uniform.ambient_color, [0.5, 0.5, 0.5]);
        assert_eq!(uniform.moon_direction, [0.0, 1.0, 0.0]);
        assert_eq!(uniform.shadow_samples, 1);
        assert_eq!(uniform.shadows_enabled, 1);
        assert_eq!(uniform.fog_enabled, 1);
        assert_eq!(uniform.fog_far, 15.0);
        assert_eq!(uniform.triangle_count, 12);
    }

    #[test]
    fn test_lighting_without_moon_disables_shadows() {
        let scene = Scene::new();
        let uniform = lighting_uniform(&scene, &ShadowConfig::default(), 0);
        assert_eq!(uniform.moon_intensity, 0.0);
        assert_eq!(uniform.shadows_enabled, 0);
        assert_eq!(uniform.fog_enabled, 0);
    }
}
