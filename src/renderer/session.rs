//! Per-mesh procedural renderer session
//!
//! The host decides when to call `initialize`, `teardown` and
//! `advance_frame`. Everything the GPU pipeline allocates lives in one
//! `SessionResources` value, so a session is either fully built or holds
//! nothing.

use super::append_buffer::AppendBuffer;
use super::draw::{DrawIssuer, DrawTarget, ShadingProgram};
use super::indirect_args::{ArgumentDeriver, TRI_TO_VERT_KERNEL};
use super::readback::read_buffer;
use super::source_store::SourceGeometry;
use super::synthesis::{output_capacity, SynthesisStage, SynthesisVariant};
use crate::bounds::{Aabb, Frustum};
use crate::config::RendererConfig;
use crate::error::{gpu_operation_error, KernelStage, Result, SynthesisError};
use crate::gpu::{CompiledKernel, GpuContext, IndirectArgs};
use crate::mesh::SourceMesh;
use glam::Mat4;
use std::borrow::Cow;
use std::sync::Arc;

/// Formats and camera layout the session's draw pipelines are built for
#[derive(Clone)]
pub struct SessionTarget {
    pub color_format: wgpu::TextureFormat,
    pub depth_format: Option<wgpu::TextureFormat>,
    pub camera_layout: Arc<wgpu::BindGroupLayout>,
    pub frustum_culling: bool,
}

impl SessionTarget {
    pub fn from_config(config: &RendererConfig, camera_layout: Arc<wgpu::BindGroupLayout>) -> Result<Self> {
        Ok(Self {
            color_format: config.render.color_format()?,
            depth_format: config.render.depth_format()?,
            camera_layout,
            frustum_culling: config.render.frustum_culling,
        })
    }
}

/// Per-frame inputs supplied by the host
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs {
    pub local_to_world: Mat4,
    pub elapsed_seconds: f32,
    /// Rebuild the session before this frame so edited inputs take effect
    pub continuous_resynthesis: bool,
}

impl FrameInputs {
    pub fn new(local_to_world: Mat4, elapsed_seconds: f32) -> Self {
        Self {
            local_to_world,
            elapsed_seconds,
            continuous_resynthesis: false,
        }
    }
}

/// What one `advance_frame` recorded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub source_triangles: u32,
    pub capacity: u32,
    pub dispatch_size: u32,
    pub world_bounds: Aabb,
    pub reinitialized: bool,
}

struct SessionResources<V: SynthesisVariant> {
    source: SourceGeometry,
    output: AppendBuffer<V::DrawTriangle>,
    synthesis: SynthesisStage,
    arguments: ArgumentDeriver,
    draw: DrawIssuer,
    local_bounds: Aabb,
}

impl<V: SynthesisVariant> SessionResources<V> {
    fn release(self) {
        self.source.release();
        self.output.release();
        self.arguments.release();
        self.synthesis.release();
    }
}

pub struct ProceduralRenderer<V: SynthesisVariant> {
    context: GpuContext,
    target: SessionTarget,
    settings: V::Settings,
    source_mesh: Option<SourceMesh>,
    synthesis_kernel: Option<Cow<'static, str>>,
    conversion_kernel: Option<Cow<'static, str>>,
    shading_program: Option<ShadingProgram>,
    resources: Option<SessionResources<V>>,
}

impl<V: SynthesisVariant> ProceduralRenderer<V> {
    /// A session with no mesh, kernels or shading program yet
    pub fn new(context: GpuContext, target: SessionTarget, settings: V::Settings) -> Self {
        Self {
            context,
            target,
            settings,
            source_mesh: None,
            synthesis_kernel: None,
            conversion_kernel: None,
            shading_program: None,
            resources: None,
        }
    }

    /// A session using the variant's built-in kernels and shading program
    pub fn with_builtin_programs(context: GpuContext, target: SessionTarget, settings: V::Settings) -> Self {
        Self::new(context, target, settings)
            .with_synthesis_kernel(V::kernel_source())
            .with_conversion_kernel(TRI_TO_VERT_KERNEL)
            .with_shading_program(V::shading_program())
    }

    pub fn from_config(
        context: GpuContext,
        config: &RendererConfig,
        camera_layout: Arc<wgpu::BindGroupLayout>,
    ) -> Result<Self> {
        config.validate()?;
        let target = SessionTarget::from_config(config, camera_layout)?;
        Ok(Self::with_builtin_programs(context, target, V::settings(config)))
    }

    pub fn with_source_mesh(mut self, mesh: SourceMesh) -> Self {
        self.source_mesh = Some(mesh);
        self
    }

    pub fn with_synthesis_kernel(mut self, source: impl Into<Cow<'static, str>>) -> Self {
        self.synthesis_kernel = Some(source.into());
        self
    }

    pub fn with_conversion_kernel(mut self, source: impl Into<Cow<'static, str>>) -> Self {
        self.conversion_kernel = Some(source.into());
        self
    }

    pub fn with_shading_program(mut self, program: ShadingProgram) -> Self {
        self.shading_program = Some(program);
        self
    }

    /// Replace the source mesh. Takes effect on the next `initialize`.
    pub fn set_source_mesh(&mut self, mesh: Option<SourceMesh>) {
        self.source_mesh = mesh;
    }

    /// Replace the settings. Takes effect on the next `initialize`.
    pub fn set_settings(&mut self, settings: V::Settings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> &V::Settings {
        &self.settings
    }

    pub fn source_mesh(&self) -> Option<&SourceMesh> {
        self.source_mesh.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.resources.is_some()
    }

    /// Build every GPU resource for the current inputs
    ///
    /// A live session is torn down first, so buffers are always released
    /// before their replacements are allocated and every binding is rebuilt.
    pub fn initialize(&mut self) -> Result<()> {
        if self.resources.is_some() {
            log::info!("[ProceduralRenderer] {} re-initializing", V::LABEL);
            self.teardown();
        }

        let device = self.context.device.clone();
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let built = self.build_resources();
        let scope_error = pollster::block_on(device.pop_error_scope());

        let resources = built?;
        if let Some(error) = scope_error {
            log::error!("[ProceduralRenderer] {} setup rejected by the device: {}", V::LABEL, error);
            resources.release();
            return Err(gpu_operation_error("initialize", error));
        }

        log::info!(
            "[ProceduralRenderer] {} initialized: {} source vertices, {} source triangles, capacity {}, {} workgroups of {}",
            V::LABEL,
            resources.source.vertex_count(),
            resources.source.triangle_count(),
            resources.output.capacity(),
            resources.synthesis.dispatch_size(),
            resources.synthesis.thread_group_width()
        );

        self.resources = Some(resources);
        Ok(())
    }

    fn build_resources(&self) -> Result<SessionResources<V>> {
        let mesh = self.source_mesh.as_ref().ok_or_else(|| {
            log::error!("[ProceduralRenderer] {} has no source mesh", V::LABEL);
            SynthesisError::MissingSourceMesh
        })?;
        let synthesis_source = self.synthesis_kernel.as_deref().ok_or_else(|| {
            log::error!("[ProceduralRenderer] {} has no synthesis kernel", V::LABEL);
            SynthesisError::MissingKernel {
                stage: KernelStage::Synthesis,
            }
        })?;
        let conversion_source = self.conversion_kernel.as_deref().ok_or_else(|| {
            log::error!("[ProceduralRenderer] {} has no conversion kernel", V::LABEL);
            SynthesisError::MissingKernel {
                stage: KernelStage::ArgumentConversion,
            }
        })?;
        let program = self.shading_program.as_ref().ok_or_else(|| {
            log::error!("[ProceduralRenderer] {} has no shading program", V::LABEL);
            SynthesisError::MissingShadingProgram
        })?;

        let device = &self.context.device;
        let triangle_count = mesh.triangle_count();
        let capacity = output_capacity::<V>(triangle_count)?;

        let synthesis_kernel =
            CompiledKernel::compile(device, &format!("{} Synthesis", V::LABEL), synthesis_source)?;
        let conversion_kernel =
            CompiledKernel::compile(device, &format!("{} Tri To Vert", V::LABEL), conversion_source)?;

        let vertices = V::source_vertices(mesh)?;
        let output = AppendBuffer::<V::DrawTriangle>::new(device, V::LABEL, capacity)?;
        let source = SourceGeometry::upload(device, V::LABEL, &vertices, mesh.indices());
        let synthesis = SynthesisStage::new(device, &synthesis_kernel, &source, &output)?;
        let arguments = ArgumentDeriver::new(device, &conversion_kernel, capacity, V::VERTICES_PER_RECORD)?;

        let draw_target = DrawTarget {
            color_format: self.target.color_format,
            depth_format: self.target.depth_format,
            camera_layout: &self.target.camera_layout,
        };
        let draw = DrawIssuer::new(
            device,
            program,
            &draw_target,
            output.records(),
            V::casts_shadows(&self.settings),
            self.target.frustum_culling,
        )?;

        let local_bounds = mesh.bounds().expanded(V::bounds_margin(&self.settings));

        Ok(SessionResources {
            source,
            output,
            synthesis,
            arguments,
            draw,
            local_bounds,
        })
    }

    /// Release all GPU buffers. Does nothing on an uninitialized session.
    pub fn teardown(&mut self) {
        if let Some(resources) = self.resources.take() {
            resources.release();
            log::info!("[ProceduralRenderer] {} torn down", V::LABEL);
        }
    }

    /// Record this frame's clear, synthesis and argument derivation into `encoder`
    ///
    /// The kernel parameters are written through the queue, so each
    /// `advance_frame` should be followed by submitting `encoder` before the
    /// next one.
    pub fn advance_frame(&mut self, encoder: &mut wgpu::CommandEncoder, inputs: &FrameInputs) -> Result<FrameStats> {
        if inputs.continuous_resynthesis {
            self.initialize()?;
        }

        let Some(resources) = self.resources.as_mut() else {
            log::warn!("[ProceduralRenderer] {} frame advanced before initialize", V::LABEL);
            return Err(SynthesisError::NotInitialized {
                operation: "advance a frame",
            });
        };

        let world_bounds = resources
            .draw
            .update_bounds(&resources.local_bounds, &inputs.local_to_world);

        let source_triangles = resources.source.triangle_count();
        let capacity = resources.output.capacity();
        let params = V::frame_params(
            &self.settings,
            &inputs.local_to_world,
            inputs.elapsed_seconds,
            source_triangles,
            capacity,
        );
        resources.synthesis.write_params(&self.context.queue, &params);

        resources.output.clear(encoder);
        resources.synthesis.dispatch(encoder);
        resources.arguments.derive(encoder, &resources.output);

        log::debug!(
            "[ProceduralRenderer] {} frame at t={:.3}: {} workgroups, bounds {:?}",
            V::LABEL,
            inputs.elapsed_seconds,
            resources.synthesis.dispatch_size(),
            world_bounds
        );

        Ok(FrameStats {
            source_triangles,
            capacity,
            dispatch_size: resources.synthesis.dispatch_size(),
            world_bounds,
            reinitialized: inputs.continuous_resynthesis,
        })
    }

    /// Record the indirect draw. Returns `false` when the bounds were culled.
    pub fn draw<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        camera_bind_group: &'a wgpu::BindGroup,
        frustum: Option<&Frustum>,
    ) -> Result<bool> {
        let resources = self.resources("draw")?;
        Ok(resources
            .draw
            .draw(render_pass, camera_bind_group, resources.arguments.args(), frustum))
    }

    /// Record the draw into a shadow pass if this session casts shadows
    pub fn draw_shadow<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        light_bind_group: &'a wgpu::BindGroup,
        light_frustum: Option<&Frustum>,
    ) -> Result<bool> {
        let resources = self.resources("draw shadows")?;
        Ok(resources.draw.draw_shadow(
            render_pass,
            light_bind_group,
            resources.arguments.args(),
            light_frustum,
        ))
    }

    pub fn casts_shadows(&self) -> bool {
        self.resources
            .as_ref()
            .map_or(false, |r| r.draw.casts_shadows())
    }

    pub fn capacity(&self) -> Option<u32> {
        self.resources.as_ref().map(|r| r.output.capacity())
    }

    pub fn dispatch_size(&self) -> Option<u32> {
        self.resources.as_ref().map(|r| r.synthesis.dispatch_size())
    }

    pub fn thread_group_width(&self) -> Option<u32> {
        self.resources.as_ref().map(|r| r.synthesis.thread_group_width())
    }

    pub fn local_bounds(&self) -> Option<Aabb> {
        self.resources.as_ref().map(|r| r.local_bounds)
    }

    pub fn world_bounds(&self) -> Option<Aabb> {
        self.resources.as_ref().map(|r| r.draw.world_bounds())
    }

    pub fn draw_buffer(&self) -> Option<&wgpu::Buffer> {
        self.resources.as_ref().map(|r| r.output.records())
    }

    pub fn indirect_args_buffer(&self) -> Option<&wgpu::Buffer> {
        self.resources.as_ref().map(|r| r.arguments.args())
    }

    /// Blocking read of the append counter, for tests and diagnostics
    pub fn read_append_count(&self) -> Result<u32> {
        let resources = self.resources("read the append count")?;
        let values = read_buffer::<u32>(
            &self.context.device,
            &self.context.queue,
            resources.output.counter(),
            0,
            1,
        )?;
        values
            .first()
            .copied()
            .ok_or_else(|| SynthesisError::Readback("empty counter readback".to_string()))
    }

    /// Blocking read of the indirect argument record
    pub fn read_indirect_args(&self) -> Result<IndirectArgs> {
        let resources = self.resources("read the indirect args")?;
        let values = read_buffer::<IndirectArgs>(
            &self.context.device,
            &self.context.queue,
            resources.arguments.args(),
            0,
            1,
        )?;
        values
            .first()
            .copied()
            .ok_or_else(|| SynthesisError::Readback("empty argument readback".to_string()))
    }

    /// Blocking read of the first `count` appended records
    pub fn read_draw_triangles(&self, count: u32) -> Result<Vec<V::DrawTriangle>> {
        let resources = self.resources("read the draw triangles")?;
        read_buffer(
            &self.context.device,
            &self.context.queue,
            resources.output.records(),
            0,
            count.min(resources.output.capacity()) as usize,
        )
    }

    fn resources(&self, operation: &'static str) -> Result<&SessionResources<V>> {
        self.resources
            .as_ref()
            .ok_or(SynthesisError::NotInitialized { operation })
    }
}

impl<V: SynthesisVariant> Drop for ProceduralRenderer<V> {
    fn drop(&mut self) {
        self.teardown();
    }
}
