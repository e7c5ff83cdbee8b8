//! Macros for bind group boilerplate
//!
//! Writable storage buffers may not be visible to the vertex stage, so the
//! layout macro takes the shader stages per entry.

/// Create a bind group from `binding => resource` pairs
///
/// # Example
/// ```ignore
/// let bind_group = create_bind_group!(
///     device,
///     "Synthesis Bind Group",
///     layout,
///     0 => source_vertices.as_entire_binding(),
///     1 => source_indices.as_entire_binding(),
/// );
/// ```
#[macro_export]
macro_rules! create_bind_group {
    ($device:expr, $label:expr, $layout:expr, $($binding:expr => $resource:expr),+ $(,)?) => {
        $device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some($label),
            layout: $layout,
            entries: &[
                $(
                    wgpu::BindGroupEntry {
                        binding: $binding,
                        resource: $resource,
                    },
                )+
            ],
        })
    };
}

/// Create a bind group layout of buffer entries
///
/// # Example
/// ```ignore
/// let layout = create_bind_group_layout!(
///     device,
///     "Synthesis Layout",
///     0 => compute: buffer(storage_read),
///     1 => compute: buffer(storage),
///     2 => vertex: buffer(storage_read),
///     3 => all: buffer(uniform),
/// );
/// ```
#[macro_export]
macro_rules! create_bind_group_layout {
    (@stage compute) => { wgpu::ShaderStages::COMPUTE };
    (@stage vertex) => { wgpu::ShaderStages::VERTEX };
    (@stage vertex_fragment) => { wgpu::ShaderStages::VERTEX_FRAGMENT };
    (@stage all) => { wgpu::ShaderStages::COMPUTE | wgpu::ShaderStages::VERTEX_FRAGMENT };

    (@resource_type buffer(storage)) => {
        wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: false },
            has_dynamic_offset: false,
            min_binding_size: None,
        }
    };

    (@resource_type buffer(storage_read)) => {
        wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size: None,
        }
    };

    (@resource_type buffer(uniform)) => {
        wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        }
    };

    ($device:expr, $label:expr, $($binding:expr => $stage:ident: $resource_type:ident($($args:tt)*)),+ $(,)?) => {
        $device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some($label),
            entries: &[
                $(
                    wgpu::BindGroupLayoutEntry {
                        binding: $binding,
                        visibility: $crate::create_bind_group_layout!(@stage $stage),
                        ty: $crate::create_bind_group_layout!(@resource_type $resource_type($($args)*)),
                        count: None,
                    },
                )+
            ],
        })
    };
}
