//! CPU-side geometry and vertex layouts.
//!
//! [`MeshData`] is the validated input of a [`GpuMesh`](crate::resources::mesh::GpuMesh):
//! a flat position list with three floats per vertex and a triangle index list.

use crate::error::MeshError;

/// Something that can describe its own vertex buffer layout to a pipeline.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// A bare position vertex. No normals, UVs or colours.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PositionVertex {
    pub position: [f32; 3],
}

/**
 * stride: three tightly packed f32 (12 bytes)
 *
 * Single attribute at location 0, which is where the vertex shader reads its
 * position from.
 */
impl Vertex for PositionVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PositionVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    positions: Vec<f32>,
    indices: Vec<u32>,
}

impl MeshData {
    /// Validate a position list and a triangle index list.
    ///
    /// Positions must come in whole xyz triples, indices in whole triangles,
    /// neither may be empty and every index must reference an existing vertex.
    pub fn new(positions: Vec<f32>, indices: Vec<u32>) -> Result<Self, MeshError> {
        if positions.is_empty() || indices.is_empty() {
            return Err(MeshError::Empty);
        }
        if positions.len() % 3 != 0 {
            return Err(MeshError::RaggedPositions {
                len: positions.len(),
            });
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::RaggedIndices { len: indices.len() });
        }
        let vertex_count = positions.len() / 3;
        if let Some((at, &index)) = indices
            .iter()
            .enumerate()
            .find(|(_, i)| **i as usize >= vertex_count)
        {
            return Err(MeshError::IndexOutOfRange {
                at,
                index,
                vertex_count,
            });
        }
        Ok(Self { positions, indices })
    }

    /// The unit cube centred on the origin: 8 corners, 12 triangles.
    pub fn cube() -> Self {
        #[rustfmt::skip]
        let positions = vec![
            // front
            -0.5, -0.5,  0.5, // 0: bottom-left
             0.5, -0.5,  0.5, // 1: bottom-right
             0.5,  0.5,  0.5, // 2: top-right
            -0.5,  0.5,  0.5, // 3: top-left
            // back
            -0.5, -0.5, -0.5, // 4: bottom-left
             0.5, -0.5, -0.5, // 5: bottom-right
             0.5,  0.5, -0.5, // 6: top-right
            -0.5,  0.5, -0.5, // 7: top-left
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 1, 2,  2, 3, 0, // front
            1, 5, 6,  6, 2, 1, // right
            5, 4, 7,  7, 6, 5, // back
            4, 0, 3,  3, 7, 4, // left
            3, 2, 6,  6, 7, 3, // top
            0, 1, 5,  5, 4, 0, // bottom
        ];
        Self { positions, indices }
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
