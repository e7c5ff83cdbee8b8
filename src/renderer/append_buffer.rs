//! Append buffer: a record array plus an atomic element counter
//!
//! The synthesis kernel reserves slots with `atomicAdd` on the counter and
//! writes records into the reserved slots. The host's only per-frame
//! mutation is resetting the counter, which is recorded into the command
//! stream ahead of the dispatch.

use crate::error::{Result, SynthesisError};
use bytemuck::Pod;
use std::marker::PhantomData;

/// Size in bytes of the atomic counter
pub const COUNTER_SIZE: u64 = std::mem::size_of::<u32>() as u64;

/// Bytes needed to hold `capacity` records of `stride` bytes
pub fn required_bytes(capacity: u32, stride: u64) -> u64 {
    capacity as u64 * stride
}

/// Fail unless `required` bytes fit in one storage binding on this device
pub fn check_capacity(required: u64, limits: &wgpu::Limits) -> Result<()> {
    let limit = (limits.max_storage_buffer_binding_size as u64).min(limits.max_buffer_size);
    if required > limit {
        log::error!(
            "[AppendBuffer] Required {} bytes exceeds device limit {}",
            required,
            limit
        );
        return Err(SynthesisError::CapacityExceedsDeviceLimit { required, limit });
    }
    Ok(())
}

pub struct AppendBuffer<T> {
    records: wgpu::Buffer,
    counter: wgpu::Buffer,
    capacity: u32,
    _record: PhantomData<T>,
}

impl<T: Pod> AppendBuffer<T> {
    pub fn stride() -> u64 {
        std::mem::size_of::<T>() as u64
    }

    /// Allocate storage for exactly `capacity` records
    pub fn new(device: &wgpu::Device, label: &str, capacity: u32) -> Result<Self> {
        let size = required_bytes(capacity.max(1), Self::stride());
        check_capacity(size, &device.limits())?;

        let records = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{} Draw Triangles", label)),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let counter = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{} Append Counter", label)),
            size: COUNTER_SIZE,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::debug!(
            "[AppendBuffer] {} capacity {} records ({} bytes)",
            label,
            capacity,
            size
        );

        Ok(Self {
            records,
            counter,
            capacity,
            _record: PhantomData,
        })
    }

    /// Reset the live count to zero
    pub fn clear(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.clear_buffer(&self.counter, 0, None);
    }

    /// Copy the live count into `dst` at `dst_offset`, GPU side
    pub fn copy_count_to(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        dst: &wgpu::Buffer,
        dst_offset: wgpu::BufferAddress,
    ) {
        encoder.copy_buffer_to_buffer(&self.counter, 0, dst, dst_offset, COUNTER_SIZE);
    }

    pub fn records(&self) -> &wgpu::Buffer {
        &self.records
    }

    pub fn counter(&self) -> &wgpu::Buffer {
        &self.counter
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn release(self) {
        self.records.destroy();
        self.counter.destroy();
    }
}
