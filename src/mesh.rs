//! Source mesh data handed in by the host
//!
//! The mesh is validated once here so the synthesis kernel can index the
//! vertex buffer without bounds checks.

use crate::bounds::Aabb;
use crate::error::{invalid_mesh, Result};
use glam::{Vec2, Vec3};

/// Triangle mesh that geometry is synthesized from
#[derive(Debug, Clone)]
pub struct SourceMesh {
    positions: Vec<Vec3>,
    uvs: Option<Vec<Vec2>>,
    indices: Vec<u32>,
    bounds: Aabb,
}

impl SourceMesh {
    /// Build a mesh from positions and a flat triangle index list
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Result<Self> {
        if indices.len() % 3 != 0 {
            return Err(invalid_mesh(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            )));
        }
        if indices.is_empty() {
            return Err(invalid_mesh("mesh has no triangles"));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(invalid_mesh(format!(
                "index {} out of range for {} vertices",
                bad,
                positions.len()
            )));
        }

        let bounds = Aabb::from_points(&positions).ok_or_else(|| invalid_mesh("mesh has no vertices"))?;

        Ok(Self {
            positions,
            uvs: None,
            indices,
            bounds,
        })
    }

    /// Attach per-vertex texture coordinates
    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Result<Self> {
        if uvs.len() != self.positions.len() {
            return Err(invalid_mesh(format!(
                "{} uvs for {} vertices",
                uvs.len(),
                self.positions.len()
            )));
        }
        self.uvs = Some(uvs);
        Ok(self)
    }

    /// Replace the computed local bounds
    pub fn with_bounds(mut self, bounds: Aabb) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn uvs(&self) -> Option<&[Vec2]> {
        self.uvs.as_deref()
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn vertex_count(&self) -> u32 {
        self.positions.len() as u32
    }

    pub fn triangle_count(&self) -> u32 {
        (self.indices.len() / 3) as u32
    }

    /// Corner positions of triangle `index`
    pub fn triangle(&self, index: u32) -> [Vec3; 3] {
        let base = index as usize * 3;
        [
            self.positions[self.indices[base] as usize],
            self.positions[self.indices[base + 1] as usize],
            self.positions[self.indices[base + 2] as usize],
        ]
    }

    /// One counter-clockwise triangle in the XZ plane, facing +Y
    pub fn single_triangle() -> Self {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
        ];
        let uvs = vec![Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0)];

        Self {
            bounds: Aabb::from_min_max(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0)),
            positions,
            uvs: Some(uvs),
            indices: vec![0, 1, 2],
        }
    }

    /// Square plane in XZ centered on the origin with `subdivisions` quads per side
    pub fn plane(size: f32, subdivisions: u32) -> Self {
        let cells = subdivisions.max(1);
        let step = size / cells as f32;
        let half = size * 0.5;

        let mut positions = Vec::with_capacity(((cells + 1) * (cells + 1)) as usize);
        let mut uvs = Vec::with_capacity(positions.capacity());
        for z in 0..=cells {
            for x in 0..=cells {
                positions.push(Vec3::new(x as f32 * step - half, 0.0, z as f32 * step - half));
                uvs.push(Vec2::new(x as f32 / cells as f32, z as f32 / cells as f32));
            }
        }

        let row = cells + 1;
        let mut indices = Vec::with_capacity((cells * cells * 6) as usize);
        for z in 0..cells {
            for x in 0..cells {
                let i = z * row + x;
                indices.extend_from_slice(&[i, i + row, i + 1, i + 1, i + row, i + row + 1]);
            }
        }

        Self {
            bounds: Aabb::new(Vec3::ZERO, Vec3::new(half, 0.0, half)),
            positions,
            uvs: Some(uvs),
            indices,
        }
    }
}
