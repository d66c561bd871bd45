use bytemuck_derive::{Pod, Zeroable};
use wgpu::util::DeviceExt;

#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    pub position: [f32; 3],
}

pub const TRIANGLE: [Vertex; 3] = [
    Vertex {
        position: [-1., -1., 0.],
    },
    Vertex {
        position: [1., -1., 0.],
    },
    Vertex {
        position: [0., 1., 0.],
    },
];

const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

/// How the bytes of a vertex buffer feed the vertex stage inputs.
pub fn layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: core::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

/// The uploaded triangle together with its vertex layout.
#[derive(Debug)]
pub struct VertexArray {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}
impl VertexArray {
    /// Uploads `vertices` into a fresh vertex buffer.
    ///
    /// Allocation failures are not reported here; they surface through the
    /// device's error handler.
    pub fn upload(device: &wgpu::Device, vertices: &[Vertex]) -> Self {
        let desc = wgpu::util::BufferInitDescriptor {
            label: Some("vertices"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        };
        let buffer = device.create_buffer_init(&desc);
        tracing::debug!(vertices = vertices.len(), "vertex buffer uploaded");
        Self {
            buffer,
            vertex_count: vertices.len() as u32,
        }
    }

    pub fn triangle(device: &wgpu::Device) -> Self {
        Self::upload(device, &TRIANGLE)
    }

    pub fn layout(&self) -> wgpu::VertexBufferLayout<'static> {
        layout()
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.buffer.slice(..));
    }
}
