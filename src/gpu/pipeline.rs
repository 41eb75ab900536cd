//! Shader, render pipeline, and bind-group ownership for the image pass.

use crate::error::{Error, ErrorSink};
use crate::gpu::context::GpuContext;
use crate::gpu::plane::Plane;
use crate::gpu::texture::ImageTexture;

/// Uniform block shared with `shaders/viewer.wgsl`; layout must match the
/// WGSL struct field for field.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewUniforms {
    /// Container size in physical pixels.
    pub canvas: [f32; 2],
    /// Top-left image position, truncated toward zero.
    pub offset: [f32; 2],
    /// Unscaled image size in pixels.
    pub size: [f32; 2],
    pub scale: f32,
    pub _pad: f32,
    /// Transparency checkerboard colors.
    pub grid0: [f32; 4],
    pub grid1: [f32; 4],
}

/// Owns the linked image program and its bind group.
///
/// Compile and link failures land in the error sink instead of aborting:
/// `ready()` stays false and the render loop simply skips the image pass,
/// so the background keeps rendering with whatever succeeded. The shader
/// module itself is released as soon as the pipeline holds it.
pub struct ViewerPipeline {
    pipeline: Option<wgpu::RenderPipeline>,
    bind_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,
    uniform_buf: wgpu::Buffer,
    sampler: wgpu::Sampler,
}

impl ViewerPipeline {
    pub fn new(ctx: &GpuContext, texture: &ImageTexture, errors: &ErrorSink) -> Self {
        let device = ctx.device();

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("viewer bind layout"),
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
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let uniform_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("view uniforms"),
            size: std::mem::size_of::<ViewUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Nearest keeps pixels crisp when zoomed in, matching the
        // truncating resample the rest of the viewer uses.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("image sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let pipeline = build_pipeline(ctx, &bind_layout, errors);

        let mut this = Self {
            pipeline,
            bind_layout,
            bind_group: None,
            uniform_buf,
            sampler,
        };
        this.rebind_texture(device, texture);
        this
    }

    /// Point the bind group at `texture`'s current view; must be called
    /// after every texture reallocation.
    pub fn rebind_texture(&mut self, device: &wgpu::Device, texture: &ImageTexture) {
        if self.pipeline.is_none() {
            return;
        }
        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("viewer bind group"),
            layout: &self.bind_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.uniform_buf.as_entire_binding(),
                },
            ],
        }));
    }

    pub fn write_uniforms(&self, queue: &wgpu::Queue, uniforms: &ViewUniforms) {
        queue.write_buffer(&self.uniform_buf, 0, bytemuck::bytes_of(uniforms));
    }

    /// Whether the image pass can be issued.
    #[must_use]
    pub const fn ready(&self) -> bool {
        self.pipeline.is_some() && self.bind_group.is_some()
    }

    /// Bind the program and draw the quad. No-op while not ready.
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, plane: &Plane) {
        let (Some(pipeline), Some(bind_group)) = (&self.pipeline, &self.bind_group) else {
            return;
        };
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        plane.draw(rpass);
    }
}

/// Compile the shader pair and link the pipeline, routing each failure to
/// the error sink via a validation scope.
fn build_pipeline(
    ctx: &GpuContext,
    bind_layout: &wgpu::BindGroupLayout,
    errors: &ErrorSink,
) -> Option<wgpu::RenderPipeline> {
    let device = ctx.device();

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("viewer shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/viewer.wgsl").into()),
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        errors.push(&Error::ShaderCompile {
            log: err.to_string(),
        });
        return None;
    }

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("viewer pipeline layout"),
        bind_group_layouts: &[bind_layout],
        push_constant_ranges: &[],
    });

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("viewer pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[Plane::vertex_layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.format(),
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        errors.push(&Error::ProgramLink {
            log: err.to_string(),
        });
        return None;
    }

    Some(pipeline)
}
