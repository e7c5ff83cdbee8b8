//! Records shared between Rust and WGSL
//!
//! All of these are plain `#[repr(C)]` data with layouts checked at compile
//! time against the WGSL declarations in `src/shaders`.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Indirect draw arguments
/// This matches wgpu's DrawIndirect command layout
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct IndirectArgs {
    /// Number of vertices to draw
    pub vertex_count: u32,

    /// Number of instances to draw
    pub instance_count: u32,

    /// First vertex index
    pub first_vertex: u32,

    /// First instance index
    pub first_instance: u32,
}

impl IndirectArgs {
    /// Seed record: no vertices, one instance, zero offsets
    pub const SEED: Self = Self {
        vertex_count: 0,
        instance_count: 1,
        first_vertex: 0,
        first_instance: 0,
    };
}

/// Per-frame uniform for the synthesis kernels
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SynthesisParams {
    /// Object to world transform, column major
    pub local_to_world: [[f32; 4]; 4],

    /// Number of triangles in the source mesh
    pub num_source_triangles: u32,

    /// Append buffer capacity in records
    pub capacity: u32,

    /// Pyramid: pulsed apex height. Grass: blade height
    pub scale: f32,

    /// Grass: blade width. Unused by pyramids
    pub width: f32,
}

impl SynthesisParams {
    pub fn new(local_to_world: &Mat4, num_source_triangles: u32, capacity: u32) -> Self {
        Self {
            local_to_world: local_to_world.to_cols_array_2d(),
            num_source_triangles,
            capacity,
            scale: 0.0,
            width: 0.0,
        }
    }

    pub fn local_to_world(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.local_to_world)
    }
}

/// Uniform for the record-to-vertex conversion kernel
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct ConversionParams {
    /// Vertices the shading stage expands each appended record into
    pub vertices_per_record: u32,

    /// Append buffer capacity in records; the copied count is clamped to it
    pub capacity: u32,

    pub _padding: [u32; 2],
}

// Compile-time layout validation
const _: [(); 16] = [(); std::mem::size_of::<IndirectArgs>()];
const _: [(); 80] = [(); std::mem::size_of::<SynthesisParams>()];
const _: [(); 16] = [(); std::mem::size_of::<ConversionParams>()];
