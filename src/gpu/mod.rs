//! wgpu render surface for the globe scene.

pub mod camera;
#[cfg(feature = "egui")]
pub mod egui_integration;

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::GpuError;
use crate::lifecycle::{FrameData, RenderSurface, SurfaceFactory};
use crate::mesh::{MeshData, MeshVertex};
use crate::scene::{SceneGraph, POLAR_CAP_RADIUS};
use crate::shader::{
    star_instances, FrameUniforms, ObjectUniforms, ATMOSPHERE_SHADER, GLOBE_SHADER, STARFIELD_SHADER,
};
use crate::viewport::Viewport;

#[cfg(feature = "egui")]
use egui_integration::{EguiFrameOutput, EguiIntegration};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.02,
    a: 1.0,
};

const MESH_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
const STAR_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Creates [`GpuSurface`]s bound to one window.
pub struct WgpuFactory {
    window: Arc<Window>,
}

impl WgpuFactory {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl SurfaceFactory for WgpuFactory {
    type Surface = GpuSurface;

    fn create_surface(&mut self, viewport: Viewport, scene: &SceneGraph) -> Result<GpuSurface, GpuError> {
        pollster::block_on(GpuSurface::new(self.window.clone(), viewport, scene))
    }
}

/// Vertex, index and uniform buffers of one mesh node.
struct MeshBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl MeshBuffers {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, mesh: &MeshData, label: &str) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let (uniforms, bind_group) = object_uniforms(device, layout, label);

        Self {
            vertex,
            index,
            index_count: mesh.indices.len() as u32,
            uniforms,
            bind_group,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex.slice(..));
        pass.set_index_buffer(self.index.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    fn destroy(&self) {
        self.vertex.destroy();
        self.index.destroy();
        self.uniforms.destroy();
    }
}

/// Instance and uniform buffers of the starfield.
struct StarBuffers {
    instances: wgpu::Buffer,
    count: u32,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl StarBuffers {
    fn destroy(&self) {
        self.instances.destroy();
        self.uniforms.destroy();
    }
}

struct DepthTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// A window surface plus every GPU resource needed to draw the globe scene.
///
/// Dropping it destroys all buffers and textures it created.
pub struct GpuSurface {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    lit_pipeline: wgpu::RenderPipeline,
    atmosphere_pipeline: wgpu::RenderPipeline,
    star_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    globe: MeshBuffers,
    atmosphere: MeshBuffers,
    polar_caps: Option<MeshBuffers>,
    stars: StarBuffers,
    depth: DepthTarget,
    #[cfg(feature = "egui")]
    window: Arc<Window>,
    #[cfg(feature = "egui")]
    egui: EguiIntegration,
    #[cfg(feature = "egui")]
    pending_ui: Option<EguiFrameOutput>,
}

impl GpuSurface {
    pub async fn new(window: Arc<Window>, viewport: Viewport, scene: &SceneGraph) -> Result<Self, GpuError> {
        if !viewport.is_drawable() {
            return Err(GpuError::EmptyViewport);
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        #[cfg(feature = "egui")]
        let surface_window = window.clone();
        #[cfg(not(feature = "egui"))]
        let surface_window = window;
        let surface = instance.create_surface(surface_window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Globe Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::UnsupportedSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: viewport.width,
            height: viewport.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth = create_depth_texture(&device, &config);

        let frame_layout = uniform_layout(&device, "Frame Bind Group Layout");
        let object_layout = uniform_layout(&device, "Object Bind Group Layout");

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Globe Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let mesh_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &MESH_ATTRIBUTES,
        }];
        let star_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &STAR_ATTRIBUTES,
        }];

        let lit_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            PipelineDesc {
                label: "Lit Pipeline",
                source: GLOBE_SHADER,
                buffers: &mesh_buffers,
                format: config.format,
                blend: wgpu::BlendState::ALPHA_BLENDING,
                cull_mode: Some(wgpu::Face::Back),
                depth_write: true,
            },
        );
        let atmosphere_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            PipelineDesc {
                label: "Atmosphere Pipeline",
                source: ATMOSPHERE_SHADER,
                buffers: &mesh_buffers,
                format: config.format,
                blend: ADDITIVE_BLENDING,
                cull_mode: Some(wgpu::Face::Front),
                depth_write: false,
            },
        );
        let star_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            PipelineDesc {
                label: "Starfield Pipeline",
                source: STARFIELD_SHADER,
                buffers: &star_buffers,
                format: config.format,
                blend: wgpu::BlendState::ALPHA_BLENDING,
                cull_mode: None,
                depth_write: false,
            },
        );

        let (globe, atmosphere, stars) = match (&scene.globe, &scene.atmosphere, &scene.starfield) {
            (Some(globe), Some(atmosphere), Some(stars)) => {
                let instances = star_instances(&stars.points);
                let (uniforms, bind_group) = object_uniforms(&device, &object_layout, "Starfield");
                let star_buffers = StarBuffers {
                    instances: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Starfield Instance Buffer"),
                        contents: bytemuck::cast_slice(&instances),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
                    count: instances.len() as u32,
                    uniforms,
                    bind_group,
                };
                (
                    MeshBuffers::new(&device, &object_layout, &globe.mesh, "Globe"),
                    MeshBuffers::new(&device, &object_layout, &atmosphere.mesh, "Atmosphere"),
                    star_buffers,
                )
            }
            _ => return Err(GpuError::IncompleteScene),
        };
        let polar_caps = scene
            .polar_caps
            .as_ref()
            .map(|caps| MeshBuffers::new(&device, &object_layout, &caps.mesh, "Polar Caps"));

        #[cfg(feature = "egui")]
        let egui = EguiIntegration::new(&device, config.format, &window);

        log::info!(
            "GPU surface ready: {} ({:?}), {:?}, {}x{}",
            adapter.get_info().name,
            adapter.get_info().backend,
            config.format,
            config.width,
            config.height
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            lit_pipeline,
            atmosphere_pipeline,
            star_pipeline,
            frame_buffer,
            frame_bind_group,
            globe,
            atmosphere,
            polar_caps,
            stars,
            depth,
            #[cfg(feature = "egui")]
            window,
            #[cfg(feature = "egui")]
            egui,
            #[cfg(feature = "egui")]
            pending_ui: None,
        })
    }

    pub fn size(&self) -> Viewport {
        Viewport::new(self.config.width, self.config.height)
    }

    /// Reconfigure the surface at its current size, after it was lost or outdated.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Pass a window event to the overlay. Returns true if the overlay consumed it.
    #[cfg(feature = "egui")]
    pub fn overlay_event(&mut self, event: &winit::event::WindowEvent) -> bool {
        self.egui.on_window_event(&self.window, event)
    }

    /// Build the overlay for the next frame.
    #[cfg(feature = "egui")]
    pub fn run_overlay(&mut self, ui: impl FnMut(&egui::Context)) {
        self.pending_ui = Some(self.egui.run(&self.window, ui));
    }

    fn write_uniforms(&self, frame: &FrameData<'_>) {
        let scene = frame.scene;
        self.queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::new(frame.camera, &scene.lights)),
        );
        if let Some(globe) = &scene.globe {
            self.queue
                .write_buffer(&self.globe.uniforms, 0, bytemuck::bytes_of(&ObjectUniforms::phong(globe)));
        }
        if let Some(atmosphere) = &scene.atmosphere {
            self.queue.write_buffer(
                &self.atmosphere.uniforms,
                0,
                bytemuck::bytes_of(&ObjectUniforms::rim(atmosphere)),
            );
        }
        if let (Some(node), Some(buffers)) = (&scene.polar_caps, &self.polar_caps) {
            self.queue
                .write_buffer(
                    &buffers.uniforms,
                    0,
                    bytemuck::bytes_of(&ObjectUniforms::polar_caps(node, POLAR_CAP_RADIUS)),
                );
        }
        if let Some(stars) = &scene.starfield {
            self.queue
                .write_buffer(&self.stars.uniforms, 0, bytemuck::bytes_of(&ObjectUniforms::points(stars)));
        }
    }
}

impl RenderSurface for GpuSurface {
    fn resize(&mut self, viewport: Viewport) {
        if viewport.is_drawable() {
            self.config.width = viewport.width;
            self.config.height = viewport.height;
            self.surface.configure(&self.device, &self.config);
            self.depth.texture.destroy();
            self.depth = create_depth_texture(&self.device, &self.config);
        }
    }

    fn draw(&mut self, frame: &FrameData<'_>) -> Result<(), wgpu::SurfaceError> {
        self.write_uniforms(frame);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Globe Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Globe Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

            // Stars first; they never write depth.
            render_pass.set_pipeline(&self.star_pipeline);
            render_pass.set_bind_group(1, &self.stars.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.stars.instances.slice(..));
            render_pass.draw(0..6, 0..self.stars.count);

            render_pass.set_pipeline(&self.lit_pipeline);
            self.globe.draw(&mut render_pass);

            let caps_visible = frame
                .scene
                .polar_caps
                .as_ref()
                .is_some_and(|caps| caps.visible);
            if let (true, Some(caps)) = (caps_visible, &self.polar_caps) {
                caps.draw(&mut render_pass);
            }

            render_pass.set_pipeline(&self.atmosphere_pipeline);
            self.atmosphere.draw(&mut render_pass);
        }

        #[cfg(feature = "egui")]
        {
            if let Some(ui) = self.pending_ui.take() {
                self.egui.paint(
                    &self.device,
                    &self.queue,
                    &mut encoder,
                    &view,
                    &ui,
                    [self.config.width, self.config.height],
                );
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl Drop for GpuSurface {
    fn drop(&mut self) {
        self.globe.destroy();
        self.atmosphere.destroy();
        if let Some(caps) = &self.polar_caps {
            caps.destroy();
        }
        self.stars.destroy();
        self.frame_buffer.destroy();
        self.depth.texture.destroy();
        log::debug!("GPU surface released");
    }
}

struct PipelineDesc<'a> {
    label: &'a str,
    source: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    format: wgpu::TextureFormat,
    blend: wgpu::BlendState,
    cull_mode: Option<wgpu::Face>,
    depth_write: bool,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    desc: PipelineDesc<'_>,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(desc.label),
        source: wgpu::ShaderSource::Wgsl(desc.source.into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: desc.buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.format,
                blend: Some(desc.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: desc.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: desc.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn object_uniforms(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    label: &str,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(&format!("{label} Uniform Buffer")),
        size: std::mem::size_of::<ObjectUniforms>() as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label} Bind Group")),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    });
    (buffer, bind_group)
}

fn create_depth_texture(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> DepthTarget {
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
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    DepthTarget { texture, view }
}
