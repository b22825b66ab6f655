use wgpu::util::DeviceExt;

use crate::{
    context::Gpu,
    data_structures::mesh::{MeshData, PositionVertex, Vertex},
    resources::ledger::{ResourceKind, Tracked},
};

/// The layout half of a mesh: how the vertex buffer feeds the pipeline.
#[derive(Debug)]
pub struct VertexArray {
    layout: wgpu::VertexBufferLayout<'static>,
    _tracked: Tracked,
}

impl VertexArray {
    pub fn layout(&self) -> &wgpu::VertexBufferLayout<'static> {
        &self.layout
    }
}

/**
 * Immutable indexed triangle geometry living on the GPU.
 *
 * The vertex array, vertex buffer and index buffer are created together in
 * `new` and released together when the mesh is dropped.
 */
#[derive(Debug)]
pub struct GpuMesh {
    pub name: String,
    vertex_array: VertexArray,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    vertex_count: u32,
    _tracked_buffers: [Tracked; 2],
}

impl GpuMesh {
    pub fn new(gpu: &Gpu, name: &str, data: &MeshData) -> Self {
        let vertex_array = VertexArray {
            layout: PositionVertex::desc(),
            _tracked: gpu.ledger.track(ResourceKind::VertexArray),
        };

        // No COPY_DST: the contents are never written again after upload.
        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&buffer_label(name, "Vertex")),
                contents: bytemuck::cast_slice(data.positions()),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&buffer_label(name, "Index")),
                contents: bytemuck::cast_slice(data.indices()),
                usage: wgpu::BufferUsages::INDEX,
            });

        log::debug!(
            "uploaded mesh {:?}: {} vertices, {} triangles",
            name,
            data.vertex_count(),
            data.triangle_count()
        );

        Self {
            name: name.to_string(),
            vertex_array,
            vertex_buffer,
            index_buffer,
            index_count: data.index_count() as u32,
            vertex_count: data.vertex_count() as u32,
            _tracked_buffers: [
                gpu.ledger.track(ResourceKind::VertexBuffer),
                gpu.ledger.track(ResourceKind::IndexBuffer),
            ],
        }
    }

    pub fn layout(&self) -> &wgpu::VertexBufferLayout<'static> {
        self.vertex_array.layout()
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Issue one indexed triangle-list draw over every stored index.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

fn buffer_label(name: &str, kind: &str) -> String {
    format!("{} {} Buffer", name, kind)
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::buffer_label;

    #[test]
    fn labels_carry_the_plain_mesh_name() {
        assert_eq!(buffer_label("cube", "Vertex"), "cube Vertex Buffer");
        assert_eq!(buffer_label("cube", "Index"), "cube Index Buffer");
    }
}
