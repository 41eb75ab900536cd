//! The static full-viewport quad every frame is drawn with.

use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pos: [f32; 2],
    uv: [f32; 2],
}

/// Two triangles as a 4-vertex strip covering the whole viewport.
/// UV origin is the top-left corner, matching the pixel coordinate space
/// the fragment stage works in.
const QUAD: [Vertex; 4] = [
    Vertex {
        pos: [-1.0, -1.0],
        uv: [0.0, 1.0],
    }, // bottom-left
    Vertex {
        pos: [1.0, -1.0],
        uv: [1.0, 1.0],
    }, // bottom-right
    Vertex {
        pos: [-1.0, 1.0],
        uv: [0.0, 0.0],
    }, // top-left
    Vertex {
        pos: [1.0, 1.0],
        uv: [1.0, 0.0],
    }, // top-right
];

/// Owns the quad's vertex buffer; one per rendering session.
pub struct Plane {
    vbuf: wgpu::Buffer,
}

impl Plane {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let vbuf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad"),
            contents: bytemuck::cast_slice(&QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self { vbuf }
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    /// Interleaved position + texture-coordinate attribute layout.
    #[must_use]
    pub const fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Record the strip draw call into `rpass`.
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_vertex_buffer(0, self.vbuf.slice(..));
        rpass.draw(0..4, 0..1);
    }
}
