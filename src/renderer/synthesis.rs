//! Geometry synthesis: the variant seam and the compute dispatch
//!
//! A variant decides what gets emitted per source triangle. The stage here
//! only binds buffers, sizes the dispatch from the kernel's reflected
//! workgroup width and records the dispatch.

use super::append_buffer::AppendBuffer;
use super::draw::ShadingProgram;
use super::source_store::SourceGeometry;
use crate::config::RendererConfig;
use crate::error::{Result, SynthesisError};
use crate::gpu::{CompiledKernel, SynthesisParams};
use crate::mesh::SourceMesh;
use bytemuck::Pod;
use glam::Mat4;

/// One kind of procedural geometry
pub trait SynthesisVariant: 'static {
    type Settings: Copy + std::fmt::Debug;
    type SourceVertex: Pod;
    type DrawTriangle: Pod + std::fmt::Debug;

    const LABEL: &'static str;

    /// Output triangles appended per source triangle
    const TRIANGLES_PER_SOURCE: u32;

    /// Vertices the shading stage draws per appended record
    const VERTICES_PER_RECORD: u32;

    fn kernel_source() -> &'static str;

    fn shading_source() -> &'static str;

    fn shading_program() -> ShadingProgram {
        ShadingProgram::new(format!("{} Shading", Self::LABEL), Self::shading_source())
    }

    fn settings(config: &RendererConfig) -> Self::Settings;

    fn source_vertices(mesh: &SourceMesh) -> Result<Vec<Self::SourceVertex>>;

    /// Margin the mesh bounds grow by to contain the generated geometry
    fn bounds_margin(settings: &Self::Settings) -> f32;

    /// Kernel uniform for one frame
    fn frame_params(
        settings: &Self::Settings,
        local_to_world: &Mat4,
        elapsed_seconds: f32,
        num_source_triangles: u32,
        capacity: u32,
    ) -> SynthesisParams;

    fn casts_shadows(settings: &Self::Settings) -> bool;

    /// CPU mirror of the kernel, in the order a single thread would append
    fn reference_synthesize(mesh: &SourceMesh, params: &SynthesisParams) -> Vec<Self::DrawTriangle>;
}

/// Worst-case record count for `triangles` source triangles
pub fn output_capacity<V: SynthesisVariant>(triangles: u32) -> Result<u32> {
    triangles
        .checked_mul(V::TRIANGLES_PER_SOURCE)
        .ok_or(SynthesisError::CapacityExceedsDeviceLimit {
            required: triangles as u64 * V::TRIANGLES_PER_SOURCE as u64,
            limit: u32::MAX as u64,
        })
}

/// Compute pipeline and bindings for one session's synthesis kernel
pub struct SynthesisStage {
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    params_buffer: wgpu::Buffer,
    dispatch_size: u32,
    thread_group_width: u32,
}

impl SynthesisStage {
    pub fn new<T: Pod>(
        device: &wgpu::Device,
        kernel: &CompiledKernel,
        source: &SourceGeometry,
        output: &AppendBuffer<T>,
    ) -> Result<Self> {
        let thread_group_width = kernel.thread_group_width();
        let dispatch_size = kernel.dispatch_size(source.triangle_count());

        let limit = device.limits().max_compute_workgroups_per_dimension;
        if dispatch_size > limit {
            log::error!(
                "[SynthesisStage] '{}' needs {} workgroups for {} triangles, limit {}",
                kernel.label(),
                dispatch_size,
                source.triangle_count(),
                limit
            );
            return Err(SynthesisError::DispatchTooLarge {
                workgroups: dispatch_size,
                limit,
            });
        }

        let bind_group_layout = crate::create_bind_group_layout!(
            device,
            "Synthesis Bind Group Layout",
            0 => compute: buffer(storage_read),  // Source vertices
            1 => compute: buffer(storage_read),  // Source triangles
            2 => compute: buffer(storage),       // Draw triangles
            3 => compute: buffer(storage),       // Append counter
            4 => compute: buffer(uniform)        // Synthesis parameters
        );

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Synthesis Parameters"),
            size: std::mem::size_of::<SynthesisParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Bindings are rebuilt with every stage, never carried over from a previous session
        let bind_group = crate::create_bind_group!(
            device,
            "Synthesis Bind Group",
            &bind_group_layout,
            0 => source.vertices().as_entire_binding(),
            1 => source.indices().as_entire_binding(),
            2 => output.records().as_entire_binding(),
            3 => output.counter().as_entire_binding(),
            4 => params_buffer.as_entire_binding()
        );

        let pipeline = kernel.create_pipeline(device, &bind_group_layout);

        Ok(Self {
            pipeline,
            bind_group,
            params_buffer,
            dispatch_size,
            thread_group_width,
        })
    }

    pub fn write_params(&self, queue: &wgpu::Queue, params: &SynthesisParams) {
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(params));
    }

    pub fn dispatch(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Geometry Synthesis Pass"),
            timestamp_writes: None,
        });

        compute_pass.set_pipeline(&self.pipeline);
        compute_pass.set_bind_group(0, &self.bind_group, &[]);
        compute_pass.dispatch_workgroups(self.dispatch_size, 1, 1);
    }

    pub fn dispatch_size(&self) -> u32 {
        self.dispatch_size
    }

    pub fn thread_group_width(&self) -> u32 {
        self.thread_group_width
    }

    pub fn release(self) {
        self.params_buffer.destroy();
    }
}
