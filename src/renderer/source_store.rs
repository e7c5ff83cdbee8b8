//! Immutable GPU copies of the source mesh
//!
//! Uploaded once per session and only ever bound read-only.

use bytemuck::Pod;
use wgpu::util::DeviceExt;

/// Source vertex and index buffers
pub struct SourceGeometry {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    vertex_count: u32,
    triangle_count: u32,
}

impl SourceGeometry {
    /// Upload `vertices` and `indices`, each buffer sized exactly
    /// element count x stride
    pub fn upload<V: Pod>(device: &wgpu::Device, label: &str, vertices: &[V], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Source Vertices", label)),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Source Triangles", label)),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::STORAGE,
        });

        log::debug!(
            "[SourceGeometry] Uploaded {} vertices ({} bytes each) and {} indices for {}",
            vertices.len(),
            std::mem::size_of::<V>(),
            indices.len(),
            label
        );

        Self {
            vertices: vertex_buffer,
            indices: index_buffer,
            vertex_count: vertices.len() as u32,
            triangle_count: (indices.len() / 3) as u32,
        }
    }

    pub fn vertices(&self) -> &wgpu::Buffer {
        &self.vertices
    }

    pub fn indices(&self) -> &wgpu::Buffer {
        &self.indices
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn triangle_count(&self) -> u32 {
        self.triangle_count
    }

    /// Free the GPU memory now instead of on drop
    pub fn release(self) {
        self.vertices.destroy();
        self.indices.destroy();
    }
}
