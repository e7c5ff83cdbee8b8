/// GPU Pipeline Tests
///
/// Runs the synthesis, argument derivation and draw stages on a real device
/// and checks the buffers they leave behind against the CPU reference kernels.
use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spur_engine::renderer::{create_camera_layout, output_capacity, CameraUniform, SHADOW_DEPTH_FORMAT};
use spur_engine::{
    Aabb, FrameInputs, FrameStats, Frustum, GpuContext, Grass, GrassSettings, IndirectArgs, KernelStage,
    ProceduralRenderer, Pyramid, PyramidSettings, SessionTarget, SourceMesh, SynthesisError,
    SynthesisVariant,
};
use std::sync::Arc;
use wgpu::util::DeviceExt;

/// Tolerance for floating point comparisons
const FLOAT_TOLERANCE: f32 = 0.0001;

const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Initialize GPU context for tests
fn init_gpu() -> Option<GpuContext> {
    let _ = env_logger::builder().is_test(true).try_init();
    let context = GpuContext::headless_blocking();
    if context.is_none() {
        println!("Skipping GPU test - no GPU available");
    }
    context
}

fn target(context: &GpuContext) -> SessionTarget {
    SessionTarget {
        color_format: TARGET_FORMAT,
        depth_format: None,
        camera_layout: Arc::new(create_camera_layout(&context.device)),
        frustum_culling: true,
    }
}

fn session<V: SynthesisVariant>(
    context: &GpuContext,
    settings: V::Settings,
    mesh: SourceMesh,
) -> ProceduralRenderer<V> {
    ProceduralRenderer::with_builtin_programs(context.clone(), target(context), settings).with_source_mesh(mesh)
}

fn run_frame<V: SynthesisVariant>(
    context: &GpuContext,
    renderer: &mut ProceduralRenderer<V>,
    inputs: FrameInputs,
) -> FrameStats {
    let mut encoder = context
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Test Frame Encoder"),
        });
    let stats = renderer
        .advance_frame(&mut encoder, &inputs)
        .expect("frame should advance");
    context.queue.submit(std::iter::once(encoder.finish()));
    stats
}

fn floats<T: bytemuck::Pod>(record: &T) -> &[f32] {
    bytemuck::cast_slice(std::slice::from_ref(record))
}

/// Every reference record has a matching GPU record. Append order across
/// threads is not deterministic, so matching ignores order.
fn assert_same_records<T: bytemuck::Pod + std::fmt::Debug>(gpu: &[T], reference: &[T]) {
    assert_eq!(gpu.len(), reference.len(), "record count mismatch");

    let mut unmatched: Vec<&T> = gpu.iter().collect();
    for expected in reference {
        let position = unmatched.iter().position(|candidate| {
            floats(*candidate)
                .iter()
                .zip(floats(expected))
                .all(|(a, b)| (a - b).abs() < FLOAT_TOLERANCE)
        });
        match position {
            Some(i) => {
                unmatched.swap_remove(i);
            }
            None => panic!("no GPU record matches reference {:?}", expected),
        }
    }
}

fn random_mesh(rng: &mut StdRng) -> SourceMesh {
    let vertex_count = rng.gen_range(3..64u32);
    let positions = (0..vertex_count)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
            )
        })
        .collect();
    let triangles = rng.gen_range(1..200u32);
    let indices = (0..triangles * 3)
        .map(|_| rng.gen_range(0..vertex_count))
        .collect();
    SourceMesh::new(positions, indices).expect("random mesh is valid")
}

#[test]
fn test_pyramid_appends_three_records_per_triangle() {
    let Some(context) = init_gpu() else { return };

    let mesh = SourceMesh::plane(2.0, 4);
    let triangles = mesh.triangle_count();
    let mut renderer = session::<Pyramid>(&context, PyramidSettings::default(), mesh);
    renderer.initialize().unwrap();

    run_frame(&context, &mut renderer, FrameInputs::new(Mat4::IDENTITY, 0.5));

    assert_eq!(renderer.read_append_count().unwrap(), triangles * 3);
    assert_eq!(
        renderer.read_indirect_args().unwrap(),
        IndirectArgs {
            vertex_count: triangles * 9,
            instance_count: 1,
            first_vertex: 0,
            first_instance: 0,
        }
    );
}

#[test]
fn test_grass_appends_one_record_per_triangle() {
    let Some(context) = init_gpu() else { return };

    let mesh = SourceMesh::plane(2.0, 5);
    let triangles = mesh.triangle_count();
    let mut renderer = session::<Grass>(&context, GrassSettings::default(), mesh);
    renderer.initialize().unwrap();

    run_frame(&context, &mut renderer, FrameInputs::new(Mat4::IDENTITY, 0.0));

    assert_eq!(renderer.read_append_count().unwrap(), triangles);
    let args = renderer.read_indirect_args().unwrap();
    assert_eq!(args.vertex_count, triangles * 3);
    assert_eq!(
        (args.instance_count, args.first_vertex, args.first_instance),
        (1, 0, 0)
    );
}

#[test]
fn test_single_triangle_flat_pyramid() {
    let Some(context) = init_gpu() else { return };

    let settings = PyramidSettings {
        height: 1.0,
        animation_frequency: 0.0,
        cast_shadows: true,
    };
    let mut renderer = session::<Pyramid>(&context, settings, SourceMesh::single_triangle());
    renderer.initialize().unwrap();
    run_frame(&context, &mut renderer, FrameInputs::new(Mat4::IDENTITY, 2.0));

    let records = renderer.read_draw_triangles(3).unwrap();
    assert_eq!(renderer.read_append_count().unwrap(), 3);

    let apex = Vec3::from(records[0].vertices[2].position);
    assert!(apex.abs_diff_eq(Vec3::new(1.0 / 3.0, 0.0, 1.0 / 3.0), FLOAT_TOLERANCE));
    for record in &records {
        assert!(Vec3::from(record.vertices[2].position).abs_diff_eq(apex, FLOAT_TOLERANCE));
    }
}

#[test]
fn test_single_triangle_grass_blade_on_centroid() {
    let Some(context) = init_gpu() else { return };

    let mut renderer = session::<Grass>(&context, GrassSettings::default(), SourceMesh::single_triangle());
    renderer.initialize().unwrap();
    run_frame(&context, &mut renderer, FrameInputs::new(Mat4::IDENTITY, 0.0));

    assert_eq!(renderer.read_append_count().unwrap(), 1);
    let blade = renderer.read_draw_triangles(1).unwrap()[0];
    assert!(blade
        .anchor()
        .abs_diff_eq(Vec3::new(1.0 / 3.0, 0.0, 1.0 / 3.0), FLOAT_TOLERANCE));
}

#[test]
fn test_gpu_output_matches_reference() {
    let Some(context) = init_gpu() else { return };

    let transform = Mat4::from_scale_rotation_translation(
        Vec3::splat(1.5),
        glam::Quat::from_rotation_y(0.7),
        Vec3::new(2.0, -1.0, 3.0),
    );
    let inputs = FrameInputs::new(transform, 1.25);

    let mesh = SourceMesh::plane(3.0, 3);
    let triangles = mesh.triangle_count();

    let pyramid_settings = PyramidSettings::default();
    let mut pyramids = session::<Pyramid>(&context, pyramid_settings, mesh.clone());
    pyramids.initialize().unwrap();
    run_frame(&context, &mut pyramids, inputs);

    let capacity = pyramids.capacity().unwrap();
    let params = Pyramid::frame_params(&pyramid_settings, &transform, 1.25, triangles, capacity);
    assert_same_records(
        &pyramids.read_draw_triangles(capacity).unwrap(),
        &Pyramid::reference_synthesize(&mesh, &params),
    );

    let grass_settings = GrassSettings::default();
    let mut grass = session::<Grass>(&context, grass_settings, mesh.clone());
    grass.initialize().unwrap();
    run_frame(&context, &mut grass, inputs);

    let capacity = grass.capacity().unwrap();
    let params = Grass::frame_params(&grass_settings, &transform, 1.25, triangles, capacity);
    assert_same_records(
        &grass.read_draw_triangles(capacity).unwrap(),
        &Grass::reference_synthesize(&mesh, &params),
    );
}

#[test]
fn test_counter_cleared_between_frames() {
    let Some(context) = init_gpu() else { return };

    let mesh = SourceMesh::plane(1.0, 2);
    let triangles = mesh.triangle_count();
    let settings = PyramidSettings {
        height: 1.0,
        animation_frequency: 1.0,
        cast_shadows: false,
    };
    let mut renderer = session::<Pyramid>(&context, settings, mesh);
    renderer.initialize().unwrap();

    // Frame one raises the apexes, frame two flattens them again
    run_frame(
        &context,
        &mut renderer,
        FrameInputs::new(Mat4::IDENTITY, std::f32::consts::FRAC_PI_2),
    );
    run_frame(&context, &mut renderer, FrameInputs::new(Mat4::IDENTITY, 0.0));

    assert_eq!(renderer.read_append_count().unwrap(), triangles * 3);
    assert_eq!(renderer.read_indirect_args().unwrap().vertex_count, triangles * 9);

    let records = renderer.read_draw_triangles(triangles * 3).unwrap();
    for record in &records {
        assert!(
            record.vertices.iter().all(|v| v.position[1].abs() < FLOAT_TOLERANCE),
            "stale raised apex in {:?}",
            record
        );
    }
}

#[test]
fn test_reinitialize_with_different_mesh_size() {
    let Some(context) = init_gpu() else { return };

    let mut renderer = session::<Pyramid>(&context, PyramidSettings::default(), SourceMesh::plane(1.0, 1));
    renderer.initialize().unwrap();
    assert_eq!(renderer.capacity(), Some(6));
    run_frame(&context, &mut renderer, FrameInputs::new(Mat4::IDENTITY, 0.0));

    renderer.set_source_mesh(Some(SourceMesh::plane(1.0, 3)));
    renderer.initialize().unwrap();
    assert_eq!(renderer.capacity(), Some(54));

    run_frame(&context, &mut renderer, FrameInputs::new(Mat4::IDENTITY, 0.0));
    assert_eq!(renderer.read_append_count().unwrap(), 54);
    assert_eq!(renderer.read_indirect_args().unwrap().vertex_count, 162);
}

#[test]
fn test_continuous_resynthesis_picks_up_new_settings() {
    let Some(context) = init_gpu() else { return };

    let mut renderer = session::<Grass>(&context, GrassSettings::default(), SourceMesh::single_triangle());
    renderer.initialize().unwrap();

    renderer.set_settings(GrassSettings {
        blade_height: 3.0,
        ..GrassSettings::default()
    });
    let stats = run_frame(
        &context,
        &mut renderer,
        FrameInputs {
            continuous_resynthesis: true,
            ..FrameInputs::new(Mat4::IDENTITY, 0.0)
        },
    );
    assert!(stats.reinitialized);

    let blade = renderer.read_draw_triangles(1).unwrap()[0];
    assert!((blade.vertices[2].position[1] - 3.0).abs() < FLOAT_TOLERANCE);

    // The rebuilt bounds follow the taller blade
    let bounds = renderer.local_bounds().unwrap();
    for corner in blade.vertices {
        let p = Vec3::from(corner.position);
        assert!(bounds.contains_point(p), "blade corner {p:?} escapes {bounds:?}");
    }
}

#[test]
fn test_random_meshes_fill_exactly_to_capacity() {
    let Some(context) = init_gpu() else { return };
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..8 {
        let mesh = random_mesh(&mut rng);
        let triangles = mesh.triangle_count();

        let mut renderer = session::<Pyramid>(&context, PyramidSettings::default(), mesh);
        renderer.initialize().unwrap();
        run_frame(
            &context,
            &mut renderer,
            FrameInputs::new(Mat4::IDENTITY, rng.gen_range(0.0..10.0)),
        );

        assert_eq!(renderer.capacity(), Some(output_capacity::<Pyramid>(triangles).unwrap()));
        assert_eq!(renderer.read_append_count().unwrap(), triangles * 3);

        let width = renderer.thread_group_width().unwrap();
        let groups = renderer.dispatch_size().unwrap();
        assert!(groups * width >= triangles);
        assert!((groups - 1) * width < triangles);
    }
}

#[test]
fn test_missing_inputs_fail_initialize() {
    let Some(context) = init_gpu() else { return };

    let mut empty = ProceduralRenderer::<Pyramid>::new(context.clone(), target(&context), PyramidSettings::default());
    assert!(matches!(empty.initialize(), Err(SynthesisError::MissingSourceMesh)));

    let mut no_kernels = ProceduralRenderer::<Pyramid>::new(context.clone(), target(&context), PyramidSettings::default())
        .with_source_mesh(SourceMesh::single_triangle());
    assert!(matches!(
        no_kernels.initialize(),
        Err(SynthesisError::MissingKernel {
            stage: KernelStage::Synthesis
        })
    ));

    let mut no_conversion = no_kernels.with_synthesis_kernel(Pyramid::kernel_source());
    assert!(matches!(
        no_conversion.initialize(),
        Err(SynthesisError::MissingKernel {
            stage: KernelStage::ArgumentConversion
        })
    ));

    let mut no_program = no_conversion.with_conversion_kernel(spur_engine::renderer::TRI_TO_VERT_KERNEL);
    assert!(matches!(
        no_program.initialize(),
        Err(SynthesisError::MissingShadingProgram)
    ));
    assert!(!no_program.is_initialized());
}

#[test]
fn test_broken_kernel_is_rejected_at_setup() {
    let Some(context) = init_gpu() else { return };

    let mut renderer = session::<Grass>(&context, GrassSettings::default(), SourceMesh::single_triangle())
        .with_synthesis_kernel("@compute @workgroup_size(8) fn not_main() {}");
    assert!(matches!(
        renderer.initialize(),
        Err(SynthesisError::MissingEntryPoint { .. })
    ));

    let mut renderer = session::<Grass>(&context, GrassSettings::default(), SourceMesh::single_triangle())
        .with_synthesis_kernel("fn main( {");
    assert!(matches!(
        renderer.initialize(),
        Err(SynthesisError::ShaderCompilation { .. })
    ));
}

#[test]
fn test_frame_and_readback_require_initialize() {
    let Some(context) = init_gpu() else { return };

    let mut renderer = session::<Pyramid>(&context, PyramidSettings::default(), SourceMesh::single_triangle());
    let mut encoder = context
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    assert!(matches!(
        renderer.advance_frame(&mut encoder, &FrameInputs::new(Mat4::IDENTITY, 0.0)),
        Err(SynthesisError::NotInitialized { .. })
    ));

    renderer.initialize().unwrap();
    renderer.teardown();
    renderer.teardown();
    assert!(!renderer.is_initialized());
    assert!(matches!(
        renderer.read_append_count(),
        Err(SynthesisError::NotInitialized { .. })
    ));
}

#[test]
fn test_draw_is_culled_outside_frustum() {
    let Some(context) = init_gpu() else { return };
    let device = &context.device;

    let layout = Arc::new(create_camera_layout(device));
    let view_proj = Mat4::perspective_rh(1.0, 1.0, 0.1, 50.0)
        * Mat4::look_at_rh(Vec3::new(0.0, 5.0, 10.0), Vec3::ZERO, Vec3::Y);
    let frustum = Frustum::from_view_projection(&view_proj);

    let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Test Camera"),
        contents: bytemuck::bytes_of(&CameraUniform::new(&view_proj)),
        usage: wgpu::BufferUsages::UNIFORM,
    });
    let camera_bind_group = spur_engine::create_bind_group!(
        device,
        "Test Camera Bind Group",
        &layout,
        0 => camera_buffer.as_entire_binding()
    );

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Test Target"),
        size: wgpu::Extent3d {
            width: 64,
            height: 64,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let target = SessionTarget {
        color_format: TARGET_FORMAT,
        depth_format: None,
        camera_layout: layout,
        frustum_culling: true,
    };
    let mut renderer = ProceduralRenderer::<Pyramid>::with_builtin_programs(
        context.clone(),
        target,
        PyramidSettings::default(),
    )
    .with_source_mesh(SourceMesh::plane(2.0, 2));
    renderer.initialize().unwrap();

    for (offset, expect_drawn) in [(Vec3::ZERO, true), (Vec3::new(0.0, 0.0, 500.0), false)] {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        renderer
            .advance_frame(&mut encoder, &FrameInputs::new(Mat4::from_translation(offset), 0.0))
            .unwrap();

        let drawn = {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Test Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            renderer.draw(&mut pass, &camera_bind_group, Some(&frustum)).unwrap()
        };
        context.queue.submit(std::iter::once(encoder.finish()));

        assert_eq!(drawn, expect_drawn, "offset {:?}", offset);
    }
}

/// Grass-layout kernel that reserves two slots per source triangle
const DOUBLE_APPEND_KERNEL: &str = r#"
struct DrawVertex {
    position: array<f32, 3>,
    height: f32,
}

struct DrawTriangle {
    normal: array<f32, 3>,
    vertices: array<DrawVertex, 3>,
}

struct SynthesisParams {
    local_to_world: mat4x4<f32>,
    num_source_triangles: u32,
    capacity: u32,
    scale: f32,
    width: f32,
}

@group(0) @binding(2) var<storage, read_write> draw_triangles: array<DrawTriangle>;
@group(0) @binding(3) var<storage, read_write> draw_count: atomic<u32>;
@group(0) @binding(4) var<uniform> params: SynthesisParams;

@compute @workgroup_size(64, 1, 1)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    if (id.x >= params.num_source_triangles) {
        return;
    }
    for (var i = 0u; i < 2u; i = i + 1u) {
        let slot = atomicAdd(&draw_count, 1u);
        if (slot < params.capacity) {
            draw_triangles[slot].normal = array<f32, 3>(f32(id.x), 0.0, 0.0);
        }
    }
}
"#;

#[test]
fn test_overflowing_kernel_is_clamped_to_capacity() {
    let Some(context) = init_gpu() else { return };

    let mesh = SourceMesh::plane(1.0, 2);
    let triangles = mesh.triangle_count();
    let mut renderer = session::<Grass>(&context, GrassSettings::default(), mesh)
        .with_synthesis_kernel(DOUBLE_APPEND_KERNEL);
    renderer.initialize().unwrap();
    assert_eq!(renderer.capacity(), Some(triangles));

    run_frame(&context, &mut renderer, FrameInputs::new(Mat4::IDENTITY, 0.0));

    // Every reservation is counted, but the draw only covers what fits
    assert_eq!(renderer.read_append_count().unwrap(), triangles * 2);
    let args = renderer.read_indirect_args().unwrap();
    assert_eq!(args.vertex_count, triangles * 3);
    assert_eq!(
        (args.instance_count, args.first_vertex, args.first_instance),
        (1, 0, 0)
    );

    let records = renderer.read_draw_triangles(triangles).unwrap();
    assert!(records.iter().all(|r| r.normal[0] < triangles as f32));
}

#[test]
fn test_shadow_draw_follows_cast_shadows() {
    let Some(context) = init_gpu() else { return };
    let device = &context.device;

    let layout = Arc::new(create_camera_layout(device));
    let light_view_proj = Mat4::orthographic_rh(-5.0, 5.0, -5.0, 5.0, 0.1, 30.0)
        * Mat4::look_at_rh(Vec3::new(0.0, 10.0, 0.1), Vec3::ZERO, Vec3::Y);
    let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Test Light"),
        contents: bytemuck::bytes_of(&CameraUniform::new(&light_view_proj)),
        usage: wgpu::BufferUsages::UNIFORM,
    });
    let light_bind_group = spur_engine::create_bind_group!(
        device,
        "Test Light Bind Group",
        &layout,
        0 => light_buffer.as_entire_binding()
    );

    let shadow_map = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Test Shadow Map"),
        size: wgpu::Extent3d {
            width: 128,
            height: 128,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: SHADOW_DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let shadow_view = shadow_map.create_view(&wgpu::TextureViewDescriptor::default());

    let target = SessionTarget {
        color_format: TARGET_FORMAT,
        depth_format: None,
        camera_layout: layout,
        frustum_culling: true,
    };
    let mut pyramids = ProceduralRenderer::<Pyramid>::with_builtin_programs(
        context.clone(),
        target.clone(),
        PyramidSettings::default(),
    )
    .with_source_mesh(SourceMesh::plane(2.0, 2));
    let mut grass = ProceduralRenderer::<Grass>::with_builtin_programs(context.clone(), target, GrassSettings::default())
        .with_source_mesh(SourceMesh::plane(2.0, 2));
    pyramids.initialize().unwrap();
    grass.initialize().unwrap();

    assert!(pyramids.casts_shadows());
    assert!(!grass.casts_shadows());

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    let inputs = FrameInputs::new(Mat4::IDENTITY, 0.3);
    pyramids.advance_frame(&mut encoder, &inputs).unwrap();
    grass.advance_frame(&mut encoder, &inputs).unwrap();

    let light_frustum = Frustum::from_view_projection(&light_view_proj);
    let (pyramid_drawn, grass_drawn) = {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Test Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &shadow_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        let pyramid_drawn = pyramids
            .draw_shadow(&mut pass, &light_bind_group, Some(&light_frustum))
            .unwrap();
        let grass_drawn = grass
            .draw_shadow(&mut pass, &light_bind_group, Some(&light_frustum))
            .unwrap();
        (pyramid_drawn, grass_drawn)
    };
    context.queue.submit(std::iter::once(encoder.finish()));
    device.poll(wgpu::Maintain::Wait);

    assert!(pyramid_drawn);
    assert!(!grass_drawn);
}

#[test]
fn test_session_uses_host_supplied_bounds() {
    let Some(context) = init_gpu() else { return };

    let supplied = Aabb::new(Vec3::new(0.0, 1.0, 0.0), Vec3::splat(10.0));
    let mesh = SourceMesh::single_triangle().with_bounds(supplied);
    let mut renderer = session::<Pyramid>(&context, PyramidSettings::default(), mesh);
    renderer.initialize().unwrap();

    // Grown by the pyramid height on every axis
    assert_eq!(renderer.local_bounds(), Some(supplied.expanded(1.0)));

    let offset = Vec3::new(3.0, 0.0, -2.0);
    let stats = run_frame(
        &context,
        &mut renderer,
        FrameInputs::new(Mat4::from_translation(offset), 0.0),
    );
    assert!(stats.world_bounds.center.abs_diff_eq(supplied.center + offset, FLOAT_TOLERANCE));
    assert!(stats.world_bounds.extents.abs_diff_eq(Vec3::splat(11.0), FLOAT_TOLERANCE));
}
