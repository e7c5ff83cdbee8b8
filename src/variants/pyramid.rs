//! Pyramids extruded from every source triangle
//!
//! The apex sits above the triangle's centroid at `height * sin(frequency * t)`
//! along the face normal, so the pyramids pulse in and out every frame.

use crate::config::{PyramidSettings, RendererConfig};
use crate::error::Result;
use crate::gpu::SynthesisParams;
use crate::mesh::SourceMesh;
use crate::renderer::synthesis::SynthesisVariant;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

pub const PYRAMID_SYNTHESIS_KERNEL: &str = include_str!("../shaders/pyramid_synthesis.wgsl");
pub const PYRAMID_SHADING_PROGRAM: &str = include_str!("../shaders/pyramid_draw.wgsl");

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PyramidSourceVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PyramidDrawVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// One emitted face: its normal and three corners
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PyramidDrawTriangle {
    pub normal: [f32; 3],
    pub vertices: [PyramidDrawVertex; 3],
}

const _: [(); 20] = [(); std::mem::size_of::<PyramidSourceVertex>()];
const _: [(); 72] = [(); std::mem::size_of::<PyramidDrawTriangle>()];

/// Apex offset for a given time
pub fn pulsed_height(height: f32, frequency: f32, elapsed_seconds: f32) -> f32 {
    height * (frequency * elapsed_seconds).sin()
}

pub struct Pyramid;

impl SynthesisVariant for Pyramid {
    type Settings = PyramidSettings;
    type SourceVertex = PyramidSourceVertex;
    type DrawTriangle = PyramidDrawTriangle;

    const LABEL: &'static str = "Pyramid";
    const TRIANGLES_PER_SOURCE: u32 = 3;
    const VERTICES_PER_RECORD: u32 = 3;

    fn kernel_source() -> &'static str {
        PYRAMID_SYNTHESIS_KERNEL
    }

    fn shading_source() -> &'static str {
        PYRAMID_SHADING_PROGRAM
    }

    fn settings(config: &RendererConfig) -> Self::Settings {
        config.pyramid
    }

    fn source_vertices(mesh: &SourceMesh) -> Result<Vec<Self::SourceVertex>> {
        let uvs = mesh.uvs();
        if uvs.is_none() {
            log::debug!("[Pyramid] Source mesh has no uvs, using zeros");
        }

        Ok(mesh
            .positions()
            .iter()
            .enumerate()
            .map(|(i, p)| PyramidSourceVertex {
                position: p.to_array(),
                uv: uvs.map_or([0.0; 2], |uvs| uvs[i].to_array()),
            })
            .collect())
    }

    fn bounds_margin(settings: &Self::Settings) -> f32 {
        settings.height.abs()
    }

    fn frame_params(
        settings: &Self::Settings,
        local_to_world: &Mat4,
        elapsed_seconds: f32,
        num_source_triangles: u32,
        capacity: u32,
    ) -> SynthesisParams {
        SynthesisParams {
            scale: pulsed_height(settings.height, settings.animation_frequency, elapsed_seconds),
            ..SynthesisParams::new(local_to_world, num_source_triangles, capacity)
        }
    }

    fn casts_shadows(settings: &Self::Settings) -> bool {
        settings.cast_shadows
    }

    fn reference_synthesize(mesh: &SourceMesh, params: &SynthesisParams) -> Vec<PyramidDrawTriangle> {
        let transform = params.local_to_world();
        let uvs = mesh.uvs();
        let indices = mesh.indices();

        let corner = |index: u32| -> (Vec3, Vec2) {
            let position = transform.transform_point3(mesh.positions()[index as usize]);
            let uv = uvs.map_or(Vec2::ZERO, |uvs| uvs[index as usize]);
            (position, uv)
        };

        let mut out = Vec::with_capacity(indices.len());
        for tri in indices.chunks_exact(3).take(params.num_source_triangles as usize) {
            let a = corner(tri[0]);
            let b = corner(tri[1]);
            let c = corner(tri[2]);

            let normal = face_normal(a.0, b.0, c.0);
            let apex = (
                (a.0 + b.0 + c.0) / 3.0 + normal * params.scale,
                (a.1 + b.1 + c.1) / 3.0,
            );

            for (p, q) in [(a, b), (b, c), (c, a)] {
                if out.len() >= params.capacity as usize {
                    return out;
                }
                out.push(PyramidDrawTriangle {
                    normal: face_normal(p.0, q.0, apex.0).to_array(),
                    vertices: [draw_vertex(p), draw_vertex(q), draw_vertex(apex)],
                });
            }
        }
        out
    }
}

fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let n = (b - a).cross(c - a);
    if n.length() > 1e-12 {
        n.normalize()
    } else {
        Vec3::ZERO
    }
}

fn draw_vertex((position, uv): (Vec3, Vec2)) -> PyramidDrawVertex {
    PyramidDrawVertex {
        position: position.to_array(),
        uv: uv.to_array(),
    }
}
