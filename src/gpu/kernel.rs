//! Compiled compute kernels
//!
//! WGSL is parsed and validated with naga before the module is handed to
//! wgpu. The parsed module is also where the thread-group width comes from:
//! it is read off the entry point's `@workgroup_size`, so the Rust side never
//! repeats the number.

use crate::error::{Result, SynthesisError};

/// Entry point every compute kernel in this crate exposes
pub const KERNEL_ENTRY_POINT: &str = "main";

/// Parse and validate a WGSL source
pub fn validate_wgsl(label: &str, source: &str) -> Result<naga::Module> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| {
        log::error!("[Kernel] Failed to parse '{}'", label);
        SynthesisError::ShaderCompilation {
            shader: label.to_string(),
            error: e.emit_to_string(source),
        }
    })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator.validate(&module).map_err(|e| {
        log::error!("[Kernel] Validation failed for '{}'", label);
        SynthesisError::ShaderCompilation {
            shader: label.to_string(),
            error: e.into_inner().to_string(),
        }
    })?;

    Ok(module)
}

/// Check that `module` has an entry point `name` for `stage`
pub fn require_entry_point(
    label: &str,
    module: &naga::Module,
    name: &str,
    stage: naga::ShaderStage,
) -> Result<()> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.name == name && ep.stage == stage)
        .map(|_| ())
        .ok_or_else(|| SynthesisError::MissingEntryPoint {
            shader: label.to_string(),
            entry_point: name.to_string(),
        })
}

/// Workgroup size declared by compute entry point `entry_point`
pub fn reflect_workgroup_size(label: &str, source: &str, entry_point: &str) -> Result<[u32; 3]> {
    let module = validate_wgsl(label, source)?;
    workgroup_size_of(label, &module, entry_point)
}

fn workgroup_size_of(label: &str, module: &naga::Module, entry_point: &str) -> Result<[u32; 3]> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.name == entry_point && ep.stage == naga::ShaderStage::Compute)
        .map(|ep| ep.workgroup_size)
        .ok_or_else(|| SynthesisError::MissingEntryPoint {
            shader: label.to_string(),
            entry_point: entry_point.to_string(),
        })
}

/// Smallest number of groups of `group_width` threads covering `items`
pub fn covering_dispatch(items: u32, group_width: u32) -> u32 {
    items.div_ceil(group_width.max(1))
}

/// A compute kernel ready to be bound into pipelines
pub struct CompiledKernel {
    label: String,
    module: wgpu::ShaderModule,
    workgroup_size: [u32; 3],
}

impl CompiledKernel {
    /// Validate, reflect and compile a kernel with a `main` compute entry point
    pub fn compile(device: &wgpu::Device, label: &str, source: &str) -> Result<Self> {
        let parsed = validate_wgsl(label, source)?;
        let workgroup_size = workgroup_size_of(label, &parsed, KERNEL_ENTRY_POINT)?;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        log::debug!(
            "[Kernel] Compiled '{}' with workgroup size {:?}",
            label,
            workgroup_size
        );

        Ok(Self {
            label: label.to_string(),
            module,
            workgroup_size,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Threads per group along x, as declared by the kernel
    pub fn thread_group_width(&self) -> u32 {
        self.workgroup_size[0]
    }

    /// Groups needed so that every one of `items` gets one thread
    pub fn dispatch_size(&self, items: u32) -> u32 {
        covering_dispatch(items, self.thread_group_width())
    }

    pub fn create_pipeline(
        &self,
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::ComputePipeline {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} Pipeline Layout", self.label)),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

        device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(&format!("{} Pipeline", self.label)),
            layout: Some(&layout),
            module: &self.module,
            entry_point: KERNEL_ENTRY_POINT,
        })
    }
}
