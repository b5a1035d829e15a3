use wgpu::util::DeviceExt;
use wgpu::VertexAttribute;

use crate::helpers::geometry::GeometryData;

/// Interleaved vertex as uploaded to the GPU: `[x, y, z, nx, ny, nz]`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    pub const ATTRIBUTES: [VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn array_stride() -> wgpu::BufferAddress {
        std::mem::size_of::<Vertex>() as wgpu::BufferAddress
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::array_stride(),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Interleaves the position and normal streams, keeping vertex order.
pub fn pack_vertices(geometry: &GeometryData) -> Vec<Vertex> {
    let positions = geometry.positions();
    let normals = geometry.normals();
    debug_assert_eq!(positions.len(), normals.len());

    positions
        .chunks_exact(3)
        .zip(normals.chunks_exact(3))
        .map(|(p, n)| Vertex {
            position: [p[0], p[1], p[2]],
            normal: [n[0], n[1], n[2]],
        })
        .collect()
}

pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn new(device: &wgpu::Device, vertices: &[Vertex], indices: &[u32], label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vertex buffer")),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} index buffer")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }
}

/// Mesh state owned by a single drawable.
///
/// The GPU copy is created lazily by [`MeshBuffers::upload`] and dropped
/// whenever the CPU side is replaced.
pub struct MeshBuffers {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    gpu: Option<GpuMesh>,
}

impl MeshBuffers {
    pub fn from_geometry(geometry: &GeometryData) -> Self {
        Self {
            vertices: pack_vertices(geometry),
            indices: geometry.indices.clone(),
            gpu: None,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// The interleaved buffer as flat floats, stride 6.
    pub fn interleaved(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn gpu(&self) -> Option<&GpuMesh> {
        self.gpu.as_ref()
    }

    pub fn is_uploaded(&self) -> bool {
        self.gpu.is_some()
    }

    pub fn upload(&mut self, device: &wgpu::Device, label: &str) {
        if self.gpu.is_none() {
            log::debug!(
                "Uploading {label}: {} vertices, {} indices",
                self.vertices.len(),
                self.indices.len()
            );
            self.gpu = Some(GpuMesh::new(device, &self.vertices, &self.indices, label));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::geometry::{GeometryFactory, UvSphereParams};

    #[test]
    fn layout_matches_position_normal_stride() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[1].format, wgpu::VertexFormat::Float32x3);
    }

    #[test]
    fn packing_interleaves_in_vertex_order() {
        let geometry = UvSphereParams::new(2.0, 4, 2).generate().unwrap();
        let mesh = MeshBuffers::from_geometry(&geometry);

        assert_eq!(mesh.interleaved().len(), geometry.vertex_count() * 6);
        for i in 0..geometry.vertex_count() {
            let packed = &mesh.interleaved()[i * 6..i * 6 + 6];
            assert_eq!(&packed[..3], &geometry.positions()[i * 3..i * 3 + 3]);
            assert_eq!(&packed[3..], &geometry.normals()[i * 3..i * 3 + 3]);
        }
        assert!(!mesh.is_uploaded());
    }
}
