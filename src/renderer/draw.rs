//! Indirect procedural draw
//!
//! One non-indexed draw per frame whose vertex count the GPU reads from the
//! argument record. The host only decides whether to issue it, by testing the
//! world-space bounds against the view frustum.

use crate::bounds::{Aabb, Frustum};
use crate::error::Result;
use crate::gpu::kernel::{require_entry_point, validate_wgsl};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use std::borrow::Cow;

/// Depth format of shadow maps the shadow pipeline renders into
pub const SHADOW_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Camera data the shading programs read from group 1
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new(view_proj: &Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
        }
    }
}

/// Layout matching the `camera` uniform of the built-in shading programs
pub fn create_camera_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    crate::create_bind_group_layout!(
        device,
        "Camera Bind Group Layout",
        0 => vertex: buffer(uniform)
    )
}

/// Vertex/fragment program that reads the synthesized triangles
///
/// Group 0 binding 0 is the read-only draw triangle buffer. Group 1 is the
/// host's camera bind group.
#[derive(Debug, Clone)]
pub struct ShadingProgram {
    pub label: String,
    pub source: Cow<'static, str>,
    pub vertex_entry: String,
    pub fragment_entry: String,
    pub cull_mode: Option<wgpu::Face>,
}

impl ShadingProgram {
    pub fn new(label: impl Into<String>, source: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
            vertex_entry: "vs_main".to_string(),
            fragment_entry: "fs_main".to_string(),
            cull_mode: Some(wgpu::Face::Back),
        }
    }

    pub fn double_sided(mut self) -> Self {
        self.cull_mode = None;
        self
    }
}

/// Where the draw lands
pub struct DrawTarget<'a> {
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub camera_layout: &'a wgpu::BindGroupLayout,
}

pub struct DrawIssuer {
    pipeline: wgpu::RenderPipeline,
    shadow_pipeline: Option<wgpu::RenderPipeline>,
    bind_group: wgpu::BindGroup,
    world_bounds: Aabb,
    frustum_culling: bool,
}

impl DrawIssuer {
    pub fn new(
        device: &wgpu::Device,
        program: &ShadingProgram,
        target: &DrawTarget<'_>,
        draw_buffer: &wgpu::Buffer,
        cast_shadows: bool,
        frustum_culling: bool,
    ) -> Result<Self> {
        let parsed = validate_wgsl(&program.label, &program.source)?;
        require_entry_point(&program.label, &parsed, &program.vertex_entry, naga::ShaderStage::Vertex)?;
        require_entry_point(&program.label, &parsed, &program.fragment_entry, naga::ShaderStage::Fragment)?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&program.label),
            source: wgpu::ShaderSource::Wgsl(program.source.clone()),
        });

        let draw_layout = crate::create_bind_group_layout!(
            device,
            "Draw Triangles Layout",
            0 => vertex: buffer(storage_read)
        );

        let bind_group = crate::create_bind_group!(
            device,
            "Draw Triangles Bind Group",
            &draw_layout,
            0 => draw_buffer.as_entire_binding()
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Procedural Draw Pipeline Layout"),
            bind_group_layouts: &[&draw_layout, target.camera_layout],
            push_constant_ranges: &[],
        });

        let primitive = wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: program.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        };

        let depth_state = |format: wgpu::TextureFormat| wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{} Pipeline", program.label)),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: &program.vertex_entry,
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: &program.fragment_entry,
                targets: &[Some(wgpu::ColorTargetState {
                    format: target.color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive,
            depth_stencil: target.depth_format.map(depth_state),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let shadow_pipeline = cast_shadows.then(|| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("{} Shadow Pipeline", program.label)),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: &program.vertex_entry,
                    buffers: &[],
                },
                fragment: None,
                primitive,
                depth_stencil: Some(wgpu::DepthStencilState {
                    bias: wgpu::DepthBiasState {
                        constant: 2,
                        slope_scale: 2.0,
                        clamp: 0.0,
                    },
                    ..depth_state(SHADOW_DEPTH_FORMAT)
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            })
        });

        Ok(Self {
            pipeline,
            shadow_pipeline,
            bind_group,
            world_bounds: Aabb::new(glam::Vec3::ZERO, glam::Vec3::ZERO),
            frustum_culling,
        })
    }

    /// Recompute world bounds for this frame's transform
    pub fn update_bounds(&mut self, local_bounds: &Aabb, local_to_world: &Mat4) -> Aabb {
        self.world_bounds = local_bounds.transformed(local_to_world);
        self.world_bounds
    }

    pub fn world_bounds(&self) -> Aabb {
        self.world_bounds
    }

    pub fn casts_shadows(&self) -> bool {
        self.shadow_pipeline.is_some()
    }

    pub fn is_visible(&self, frustum: Option<&Frustum>) -> bool {
        match frustum {
            Some(frustum) if self.frustum_culling => frustum.intersects_aabb(&self.world_bounds),
            _ => true,
        }
    }

    /// Record the indirect draw unless the bounds are culled.
    /// Returns whether a draw was recorded.
    pub fn draw<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        camera_bind_group: &'a wgpu::BindGroup,
        indirect_args: &'a wgpu::Buffer,
        frustum: Option<&Frustum>,
    ) -> bool {
        if !self.is_visible(frustum) {
            log::debug!("[DrawIssuer] Culled, bounds {:?}", self.world_bounds);
            return false;
        }

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_bind_group(1, camera_bind_group, &[]);
        render_pass.draw_indirect(indirect_args, 0);
        true
    }

    /// Record the same draw into a depth-only shadow pass
    pub fn draw_shadow<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        light_bind_group: &'a wgpu::BindGroup,
        indirect_args: &'a wgpu::Buffer,
        light_frustum: Option<&Frustum>,
    ) -> bool {
        let Some(shadow_pipeline) = &self.shadow_pipeline else {
            return false;
        };
        if !self.is_visible(light_frustum) {
            return false;
        }

        render_pass.set_pipeline(shadow_pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_bind_group(1, light_bind_group, &[]);
        render_pass.draw_indirect(indirect_args, 0);
        true
    }
}
