//! Blocking GPU buffer readback for tests and diagnostics
//!
//! This stalls until the GPU has finished all submitted work. It is never used
//! on the frame path.

use crate::error::{Result, SynthesisError};
use bytemuck::Pod;

/// Copy `count` elements of `T` starting at byte `offset` back to the host
pub fn read_buffer<T: Pod>(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    buffer: &wgpu::Buffer,
    offset: wgpu::BufferAddress,
    count: usize,
) -> Result<Vec<T>> {
    let size = (std::mem::size_of::<T>() * count) as wgpu::BufferAddress;
    if size == 0 {
        return Ok(Vec::new());
    }

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Staging Buffer"),
        size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Readback Encoder"),
    });
    encoder.copy_buffer_to_buffer(buffer, offset, &staging, 0, size);
    queue.submit(std::iter::once(encoder.finish()));

    let slice = staging.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    device.poll(wgpu::Maintain::Wait);

    receiver
        .recv()
        .map_err(|e| SynthesisError::Readback(e.to_string()))?
        .map_err(|e| SynthesisError::Readback(e.to_string()))?;

    let values = {
        let data = slice.get_mapped_range();
        bytemuck::cast_slice::<u8, T>(&data).to_vec()
    };
    staging.unmap();
    staging.destroy();

    Ok(values)
}
