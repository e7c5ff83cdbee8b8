//! The generate-then-draw pipeline
//!
//! Per frame: clear the append counter, run the synthesis kernel, derive the
//! indirect arguments on the GPU, then issue one indirect draw.

pub mod append_buffer;
pub mod draw;
pub mod indirect_args;
pub mod readback;
pub mod session;
pub mod source_store;
pub mod synthesis;

pub use append_buffer::{check_capacity, required_bytes, AppendBuffer, COUNTER_SIZE};
pub use draw::{create_camera_layout, CameraUniform, DrawIssuer, DrawTarget, ShadingProgram, SHADOW_DEPTH_FORMAT};
pub use indirect_args::{convert_count, ArgumentDeriver, TRI_TO_VERT_KERNEL};
pub use readback::read_buffer;
pub use session::{FrameInputs, FrameStats, ProceduralRenderer, SessionTarget};
pub use source_store::SourceGeometry;
pub use synthesis::{output_capacity, SynthesisStage, SynthesisVariant};
