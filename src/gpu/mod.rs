//! GPU plumbing shared by the pipeline stages
//!
//! Kernel compilation with workgroup reflection, WGSL-compatible records,
//! bind group macros and headless device setup.

pub mod bind_group_macros;
pub mod context;
pub mod kernel;
pub mod types;

pub use context::GpuContext;
pub use kernel::{covering_dispatch, reflect_workgroup_size, CompiledKernel, KERNEL_ENTRY_POINT};
pub use types::{ConversionParams, IndirectArgs, SynthesisParams};
