use wgpu::util::DeviceExt;

use winit::window;
use winit::event::WindowEvent;

use crate::mesh::{AttributeFormat, Mesh, Semantic, Submesh, VertexDescriptor};

use super::camera::{Camera, CameraController, SceneUniform};
use super::config::ViewConfig;
use super::error::RenderError;

/// What `vs_main` declares for each `@location`
const SHADER_INPUTS: [(Semantic, AttributeFormat); 4] = [
    (Semantic::Position, AttributeFormat::Float3),
    (Semantic::Normal, AttributeFormat::Float3),
    (Semantic::TextureCoordinate, AttributeFormat::Float2),
    (Semantic::Color, AttributeFormat::Float4)
];

/// Checks that `descriptor` feeds every shader input from the single bound
/// vertex buffer in the format the shader declares.
fn check_shader_inputs(descriptor: &VertexDescriptor) -> Result<(), RenderError> {
    if descriptor.layout(0).is_none() {
        return Err(RenderError::MissingVertexLayout);
    }

    for (semantic, expected) in SHADER_INPUTS {
        let attribute = descriptor
            .attribute(semantic)
            .ok_or(RenderError::MissingAttribute(semantic))?;

        if attribute.buffer_index != 0 {
            return Err(RenderError::UnboundAttribute {
                semantic,
                buffer_index: attribute.buffer_index
            });
        }

        if attribute.format != expected {
            return Err(RenderError::FormatMismatch {
                semantic,
                expected,
                found: attribute.format
            });
        }
    }

    Ok(())
}

struct SubmeshDraw {
    index_buffer: wgpu::Buffer,
    index_count: u32,
    index_format: wgpu::IndexFormat,
    render_pipeline: wgpu::RenderPipeline
}

pub(super) struct State {
    pub(super) size: winit::dpi::PhysicalSize<u32>,
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    background: wgpu::Color,
    depth_view: wgpu::TextureView,
    vertex_buffer: wgpu::Buffer,
    draws: Vec<SubmeshDraw>,
    camera: Camera,
    camera_controller: CameraController,
    scene_uniform: SceneUniform,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup
}

impl State {
    const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub(super) async fn new(window: &window::Window, mesh: &Mesh, view: &ViewConfig) -> Result<Self, RenderError> {
        check_shader_inputs(mesh.descriptor())?;

        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::Backends::all());

        let surface = unsafe {
            instance.create_surface(window)
        };

        let adapter = instance.request_adapter(
            &wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false
            },
        ).await.ok_or(RenderError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("using adapter '{}' ({:?})", info.name, info.backend);

        let (device, queue) = adapter.request_device(
            &wgpu::DeviceDescriptor {
                features: wgpu::Features::empty(),
                limits: {
                    if cfg!(target_arch = "wasm32") {
                        wgpu::Limits::downlevel_webgl2_defaults()
                    } else {
                        wgpu::Limits::default()
                    }
                },
                label: None
            },
            None
        ).await?;

        let format = surface
            .get_supported_formats(&adapter)
            .first()
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo
        };

        surface.configure(&device, &config);

        let depth_view = Self::create_depth_view(&device, &config);

        log::info!(
            "uploading {} vertices, {} submesh(es)",
            mesh.vertex_count(),
            mesh.submeshes().len()
        );

        let vertex_buffer = device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("vertex buffer"),
                contents: mesh.vertex_buffer().bytes(),
                usage: wgpu::BufferUsages::VERTEX
            }
        );

        let camera = Camera::framing(
            mesh.bounds(),
            config.width as f32 / config.height as f32
        );

        let mut scene_uniform = SceneUniform::new(view.default_lighting);
        scene_uniform.update_projection(&camera);

        let scene_buffer = device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("scene uniform"),
                contents: bytemuck::cast_slice(&[scene_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            }
        );

        let scene_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }
            ],
            label: None
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &scene_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: scene_buffer.as_entire_binding(),
                }
            ],
            label: None
        });

        let shader = device.create_shader_module(
            wgpu::include_wgsl!("shader.wgsl")
        );

        let render_pipeline_layout = device.create_pipeline_layout(
            &wgpu::PipelineLayoutDescriptor {
                label: None,
                bind_group_layouts: &[
                    &scene_bind_group_layout
                ],
                push_constant_ranges: &[]
            }
        );

        // The vertex layout comes straight from the mesh descriptor
        let attributes = mesh.descriptor().wgpu_attributes(0);
        let vertex_layout = mesh
            .descriptor()
            .description(0, &attributes)
            .ok_or(RenderError::MissingVertexLayout)?;

        let draws = mesh.submeshes().iter().filter(|submesh| {
            if submesh.index_buffer().is_empty() {
                log::warn!("skipping submesh '{}', it has no indices", submesh.name());
            }

            !submesh.index_buffer().is_empty()
        } ).map(|submesh| {
            let index_buffer = device.create_buffer_init(
                &wgpu::util::BufferInitDescriptor {
                    label: Some(submesh.name()),
                    contents: submesh.index_buffer().bytes(),
                    usage: wgpu::BufferUsages::INDEX,
                }
            );

            let render_pipeline = Self::create_pipeline(
                &device,
                &render_pipeline_layout,
                &shader,
                vertex_layout.clone(),
                config.format,
                submesh
            );

            SubmeshDraw {
                index_buffer,
                index_count: submesh.index_count() as u32,
                index_format: submesh.index_type().to_wgpu(),
                render_pipeline
            }
        } ).collect();

        Ok(Self {
            size,
            surface,
            device,
            queue,
            config,
            background: view.background,
            depth_view,
            vertex_buffer,
            draws,
            camera,
            camera_controller: CameraController::new(view.camera_control),
            scene_uniform,
            scene_buffer,
            scene_bind_group
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        vertex_layout: wgpu::VertexBufferLayout,
        format: wgpu::TextureFormat,
        submesh: &Submesh
    ) -> wgpu::RenderPipeline {
        let geometry_type = submesh.geometry_type();

        device.create_render_pipeline(
            &wgpu::RenderPipelineDescriptor {
                label: Some(submesh.name()),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: "vs_main",
                    buffers: &[
                        vertex_layout
                    ]
                },
                fragment: Some(
                    wgpu::FragmentState {
                        module: shader,
                        entry_point: "fs_main",
                        targets: &[
                            Some(
                                wgpu::ColorTargetState {
                                    format,
                                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                                    write_mask: wgpu::ColorWrites::ALL
                                }
                            )
                        ],
                    }
                ),
                primitive: wgpu::PrimitiveState {
                    topology: geometry_type.to_wgpu(),
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: Self::DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default()
                }),
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None
            }
        )
    }

    fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
        });

        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    pub(super) fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            self.depth_view = Self::create_depth_view(&self.device, &self.config);
            self.camera.set_aspect(new_size.width, new_size.height);
        }
    }

    pub(super) fn redraw(&mut self) {
        self.resize(self.size);
    }

    pub(super) fn input(&mut self, event: &WindowEvent) -> bool {
        self.camera_controller.handle_mouse_events(&mut self.camera, event)
    }

    pub(super) fn update(&mut self) {
        self.scene_uniform.update_projection(&self.camera);
        self.queue.write_buffer(
            &self.scene_buffer, 0, bytemuck::cast_slice(&[self.scene_uniform])
        );
    }

    pub(super) fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(
            &wgpu::TextureViewDescriptor::default()
        );

        let mut encoder = self.device.create_command_encoder(
            &wgpu::CommandEncoderDescriptor {
                label: None,
            }
        );

        {
            let mut render_pass = encoder.begin_render_pass(
                &wgpu::RenderPassDescriptor {
                    label: None,
                    color_attachments: &[
                        Some(
                            wgpu::RenderPassColorAttachment {
                                view: &view,
                                resolve_target: None,
                                ops: wgpu::Operations {
                                    load: wgpu::LoadOp::Clear(self.background),
                                    store: true
                                },
                            }
                        )
                    ],
                    depth_stencil_attachment: Some(
                        wgpu::RenderPassDepthStencilAttachment {
                            view: &self.depth_view,
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(1.0),
                                store: true
                            }),
                            stencil_ops: None
                        }
                    )
                }
            );

            render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
            render_pass.set_vertex_buffer(
                0,
                self.vertex_buffer.slice(..)
            );

            for draw in self.draws.iter() {
                render_pass.set_pipeline(&draw.render_pipeline);
                render_pass.set_index_buffer(
                    draw.index_buffer.slice(..),
                    draw.index_format
                );

                render_pass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }

        self.queue.submit(
            std::iter::once(encoder.finish())
        );

        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::mesh::{BufferLayout, VertexAttribute};

    fn descriptor_with(color: VertexAttribute) -> VertexDescriptor {
        VertexDescriptor::new()
            .with_attribute(VertexAttribute::new(Semantic::Position, AttributeFormat::Float3, 0, 0))
            .with_attribute(VertexAttribute::new(Semantic::Normal, AttributeFormat::Float3, 12, 0))
            .with_attribute(VertexAttribute::new(Semantic::TextureCoordinate, AttributeFormat::Float2, 24, 0))
            .with_attribute(color)
            .with_layout(BufferLayout { stride: 48 })
            .with_layout(BufferLayout { stride: 16 })
    }

    #[test]
    fn triangle_feeds_every_shader_input() {
        let mesh = Mesh::triangle().unwrap();

        assert!(check_shader_inputs(mesh.descriptor()).is_ok());
    }

    #[test]
    fn attribute_on_a_second_buffer_is_rejected() {
        let descriptor = descriptor_with(
            VertexAttribute::new(Semantic::Color, AttributeFormat::Float4, 0, 1)
        );

        assert_eq!(descriptor.validate(), Ok(()));
        assert!(matches!(
            check_shader_inputs(&descriptor),
            Err(RenderError::UnboundAttribute { semantic: Semantic::Color, buffer_index: 1 })
        ));
    }

    #[test]
    fn format_the_shader_does_not_declare_is_rejected() {
        let descriptor = descriptor_with(
            VertexAttribute::new(Semantic::Color, AttributeFormat::Float3, 32, 0)
        );

        assert_eq!(descriptor.validate(), Ok(()));
        assert!(matches!(
            check_shader_inputs(&descriptor),
            Err(RenderError::FormatMismatch {
                semantic: Semantic::Color,
                expected: AttributeFormat::Float4,
                found: AttributeFormat::Float3
            })
        ));
    }

    #[test]
    fn missing_attribute_and_layout_are_reported() {
        let no_color = VertexDescriptor::new()
            .with_attribute(VertexAttribute::new(Semantic::Position, AttributeFormat::Float3, 0, 0))
            .with_attribute(VertexAttribute::new(Semantic::Normal, AttributeFormat::Float3, 12, 0))
            .with_attribute(VertexAttribute::new(Semantic::TextureCoordinate, AttributeFormat::Float2, 24, 0))
            .with_layout(BufferLayout { stride: 32 });

        assert!(matches!(
            check_shader_inputs(&no_color),
            Err(RenderError::MissingAttribute(Semantic::Color))
        ));
        assert!(matches!(
            check_shader_inputs(&VertexDescriptor::new()),
            Err(RenderError::MissingVertexLayout)
        ));
    }
}
