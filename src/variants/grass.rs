//! One grass blade per source triangle
//!
//! The blade's base is centered on the triangle centroid and spans the blade
//! width along the triangle's first edge. The tip rises along the face normal.

use crate::config::{GrassSettings, RendererConfig};
use crate::error::Result;
use crate::gpu::SynthesisParams;
use crate::mesh::SourceMesh;
use crate::renderer::draw::ShadingProgram;
use crate::renderer::synthesis::SynthesisVariant;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

pub const GRASS_SYNTHESIS_KERNEL: &str = include_str!("../shaders/grass_synthesis.wgsl");
pub const GRASS_SHADING_PROGRAM: &str = include_str!("../shaders/grass_draw.wgsl");

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GrassSourceVertex {
    pub position: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GrassDrawVertex {
    pub position: [f32; 3],
    /// 0 at the root, 1 at the tip
    pub height: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GrassDrawTriangle {
    pub normal: [f32; 3],
    pub vertices: [GrassDrawVertex; 3],
}

const _: [(); 12] = [(); std::mem::size_of::<GrassSourceVertex>()];
const _: [(); 60] = [(); std::mem::size_of::<GrassDrawTriangle>()];

impl GrassDrawTriangle {
    /// Midpoint of the blade's base edge
    pub fn anchor(&self) -> Vec3 {
        (Vec3::from(self.vertices[0].position) + Vec3::from(self.vertices[1].position)) * 0.5
    }
}

pub struct Grass;

impl SynthesisVariant for Grass {
    type Settings = GrassSettings;
    type SourceVertex = GrassSourceVertex;
    type DrawTriangle = GrassDrawTriangle;

    const LABEL: &'static str = "Grass";
    const TRIANGLES_PER_SOURCE: u32 = 1;
    const VERTICES_PER_RECORD: u32 = 3;

    fn kernel_source() -> &'static str {
        GRASS_SYNTHESIS_KERNEL
    }

    fn shading_source() -> &'static str {
        GRASS_SHADING_PROGRAM
    }

    // Blades are seen from both sides
    fn shading_program() -> ShadingProgram {
        ShadingProgram::new("Grass Shading", GRASS_SHADING_PROGRAM).double_sided()
    }

    fn settings(config: &RendererConfig) -> Self::Settings {
        config.grass
    }

    fn source_vertices(mesh: &SourceMesh) -> Result<Vec<Self::SourceVertex>> {
        Ok(mesh
            .positions()
            .iter()
            .map(|p| GrassSourceVertex {
                position: p.to_array(),
            })
            .collect())
    }

    /// Never smaller than the blade itself, whichever way it leans
    fn bounds_margin(settings: &Self::Settings) -> f32 {
        settings
            .bounds_margin
            .max(settings.blade_height)
            .max(settings.blade_width * 0.5)
    }

    fn frame_params(
        settings: &Self::Settings,
        local_to_world: &Mat4,
        _elapsed_seconds: f32,
        num_source_triangles: u32,
        capacity: u32,
    ) -> SynthesisParams {
        SynthesisParams {
            scale: settings.blade_height,
            width: settings.blade_width,
            ..SynthesisParams::new(local_to_world, num_source_triangles, capacity)
        }
    }

    fn casts_shadows(settings: &Self::Settings) -> bool {
        settings.cast_shadows
    }

    fn reference_synthesize(mesh: &SourceMesh, params: &SynthesisParams) -> Vec<GrassDrawTriangle> {
        let transform = params.local_to_world();
        let limit = params.num_source_triangles.min(params.capacity);

        (0..limit.min(mesh.triangle_count()))
            .map(|t| {
                let [a, b, c] = mesh.triangle(t).map(|p| transform.transform_point3(p));

                let normal = safe_normalize((b - a).cross(c - a));
                let tangent = safe_normalize(b - a);
                let centroid = (a + b + c) / 3.0;

                let half_width = tangent * (params.width * 0.5);
                let left = centroid - half_width;
                let right = centroid + half_width;
                let tip = centroid + normal * params.scale;

                GrassDrawTriangle {
                    normal: safe_normalize((right - left).cross(tip - left)).to_array(),
                    vertices: [
                        GrassDrawVertex {
                            position: left.to_array(),
                            height: 0.0,
                        },
                        GrassDrawVertex {
                            position: right.to_array(),
                            height: 0.0,
                        },
                        GrassDrawVertex {
                            position: tip.to_array(),
                            height: 1.0,
                        },
                    ],
                }
            })
            .collect()
    }
}

fn safe_normalize(v: Vec3) -> Vec3 {
    if v.length() > 1e-12 {
        v.normalize()
    } else {
        Vec3::ZERO
    }
}
