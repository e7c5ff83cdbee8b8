pub mod bounds;
pub mod config;
pub mod error;
pub mod gpu;
pub mod mesh;
pub mod renderer;
pub mod variants;

pub use bounds::{Aabb, Frustum, Plane};
pub use config::{GrassSettings, PyramidSettings, RenderSettings, RendererConfig};
pub use error::{KernelStage, Result, SynthesisError};
pub use gpu::{GpuContext, IndirectArgs, SynthesisParams};
pub use mesh::SourceMesh;
pub use renderer::{FrameInputs, FrameStats, ProceduralRenderer, SessionTarget, ShadingProgram, SynthesisVariant};
pub use variants::{Grass, Pyramid};

/// Renderer for pyramids extruded from every triangle of a mesh
pub type PyramidRenderer = ProceduralRenderer<Pyramid>;

/// Renderer for one grass blade per triangle of a mesh
pub type GrassRenderer = ProceduralRenderer<Grass>;
