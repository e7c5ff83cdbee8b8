//! Offscreen run of the procedural pipeline
//!
//! Usage: `procedural_headless [pyramid|grass] [frames] [config.toml]`

use anyhow::{bail, Context, Result};
use glam::{Mat4, Vec3};
use spur_engine::renderer::{create_camera_layout, CameraUniform};
use spur_engine::{
    Frustum, FrameInputs, GpuContext, Grass, ProceduralRenderer, Pyramid, RendererConfig, SourceMesh,
    SynthesisVariant,
};
use std::sync::Arc;
use wgpu::util::DeviceExt;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 360;
const FRAME_SECONDS: f32 = 1.0 / 60.0;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut args = std::env::args().skip(1);
    let variant = args.next().unwrap_or_else(|| "pyramid".to_string());
    let frames: u32 = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("invalid frame count '{}'", raw))?,
        None => 120,
    };
    let config = match args.next() {
        Some(path) => RendererConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => RendererConfig::default(),
    };

    let Some(context) = GpuContext::headless_blocking() else {
        log::warn!("No GPU adapter available, nothing to render");
        return Ok(());
    };

    match variant.as_str() {
        "pyramid" => run::<Pyramid>(context, &config, frames),
        "grass" => run::<Grass>(context, &config, frames),
        other => bail!("unknown variant '{}', expected 'pyramid' or 'grass'", other),
    }
}

fn run<V: SynthesisVariant>(context: GpuContext, config: &RendererConfig, frames: u32) -> Result<()> {
    let device = context.device.clone();
    let queue = context.queue.clone();

    let camera_layout = Arc::new(create_camera_layout(&device));
    let view_proj = Mat4::perspective_rh(
        45f32.to_radians(),
        WIDTH as f32 / HEIGHT as f32,
        0.1,
        100.0,
    ) * Mat4::look_at_rh(Vec3::new(0.0, 8.0, 12.0), Vec3::ZERO, Vec3::Y);
    let frustum = Frustum::from_view_projection(&view_proj);

    let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Camera Buffer"),
        contents: bytemuck::bytes_of(&CameraUniform::new(&view_proj)),
        usage: wgpu::BufferUsages::UNIFORM,
    });
    let camera_bind_group = spur_engine::create_bind_group!(
        device,
        "Camera Bind Group",
        &camera_layout,
        0 => camera_buffer.as_entire_binding()
    );

    let color_format = config.render.color_format()?;
    let depth_format = config.render.depth_format()?;
    let color_view = create_target(&device, "Offscreen Color", color_format);
    let depth_view = depth_format.map(|format| create_target(&device, "Offscreen Depth", format));

    let mut renderer = ProceduralRenderer::<V>::from_config(context, config, camera_layout)?
        .with_source_mesh(SourceMesh::plane(10.0, 16));
    renderer.initialize()?;

    for frame in 0..frames {
        let elapsed = frame as f32 * FRAME_SECONDS;
        let transform = Mat4::from_rotation_y(elapsed * 0.25);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });
        let stats = renderer.advance_frame(&mut encoder, &FrameInputs::new(transform, elapsed))?;

        let drawn = {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Procedural Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.2,
                            b: 0.3,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: depth_view.as_ref().map(|view| {
                    wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            renderer.draw(&mut render_pass, &camera_bind_group, Some(&frustum))?
        };

        queue.submit(std::iter::once(encoder.finish()));

        if frame % 30 == 0 || frame + 1 == frames {
            let args = renderer.read_indirect_args()?;
            log::info!(
                "[{}] frame {}: {} vertices from {} source triangles, {} workgroups, drawn={}",
                V::LABEL,
                frame,
                args.vertex_count,
                stats.source_triangles,
                stats.dispatch_size,
                drawn
            );
        }
    }

    renderer.teardown();
    Ok(())
}

fn create_target(device: &wgpu::Device, label: &str, format: wgpu::TextureFormat) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: WIDTH,
            height: HEIGHT,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
