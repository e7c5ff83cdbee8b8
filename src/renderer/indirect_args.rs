//! Indirect argument derivation
//!
//! The append counter is copied into the first word of the argument record
//! and a one-thread conversion pass turns the record count into a vertex
//! count. No value ever goes back to the host.

use super::append_buffer::AppendBuffer;
use crate::error::Result;
use crate::gpu::{CompiledKernel, ConversionParams, IndirectArgs};
use bytemuck::Pod;
use wgpu::util::DeviceExt;

/// Built-in conversion kernel
pub const TRI_TO_VERT_KERNEL: &str = include_str!("../shaders/tri_to_vert.wgsl");

pub struct ArgumentDeriver {
    args: wgpu::Buffer,
    params_buffer: wgpu::Buffer,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    dispatch_size: u32,
}

impl ArgumentDeriver {
    pub fn new(
        device: &wgpu::Device,
        kernel: &CompiledKernel,
        capacity: u32,
        vertices_per_record: u32,
    ) -> Result<Self> {
        let args = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Indirect Args Buffer"),
            contents: bytemuck::bytes_of(&IndirectArgs::SEED),
            usage: wgpu::BufferUsages::INDIRECT
                | wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
        });

        let params = ConversionParams {
            vertices_per_record,
            capacity,
            _padding: [0; 2],
        };
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Conversion Parameters"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group_layout = crate::create_bind_group_layout!(
            device,
            "Conversion Bind Group Layout",
            0 => compute: buffer(storage),  // Indirect args
            1 => compute: buffer(uniform)   // Conversion parameters
        );

        let bind_group = crate::create_bind_group!(
            device,
            "Conversion Bind Group",
            &bind_group_layout,
            0 => args.as_entire_binding(),
            1 => params_buffer.as_entire_binding()
        );

        let pipeline = kernel.create_pipeline(device, &bind_group_layout);

        Ok(Self {
            args,
            params_buffer,
            pipeline,
            bind_group,
            // The record is a single element
            dispatch_size: kernel.dispatch_size(1),
        })
    }

    /// Record the count copy and the conversion pass
    pub fn derive<T: Pod>(&self, encoder: &mut wgpu::CommandEncoder, source: &AppendBuffer<T>) {
        source.copy_count_to(encoder, &self.args, 0);

        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Tri To Vert Pass"),
            timestamp_writes: None,
        });
        compute_pass.set_pipeline(&self.pipeline);
        compute_pass.set_bind_group(0, &self.bind_group, &[]);
        compute_pass.dispatch_workgroups(self.dispatch_size, 1, 1);
    }

    pub fn args(&self) -> &wgpu::Buffer {
        &self.args
    }

    pub fn release(self) {
        self.args.destroy();
        self.params_buffer.destroy();
    }
}

/// CPU mirror of the conversion kernel
pub fn convert_count(records: u32, capacity: u32, vertices_per_record: u32) -> IndirectArgs {
    IndirectArgs {
        vertex_count: records.min(capacity) * vertices_per_record,
        ..IndirectArgs::SEED
    }
}
