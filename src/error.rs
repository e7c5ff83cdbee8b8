//! Error taxonomy for the procedural geometry pipeline
//!
//! Setup failures are reported before anything is dispatched. Nothing here is
//! retried: a failed GPU operation ends the session.

use thiserror::Error;

/// Pipeline stage a kernel belongs to, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelStage {
    Synthesis,
    ArgumentConversion,
}

impl std::fmt::Display for KernelStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelStage::Synthesis => write!(f, "synthesis"),
            KernelStage::ArgumentConversion => write!(f, "argument conversion"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("No source mesh was supplied")]
    MissingSourceMesh,

    #[error("No {stage} kernel was supplied")]
    MissingKernel { stage: KernelStage },

    #[error("No shading program was supplied")]
    MissingShadingProgram,

    #[error("Invalid source mesh: {reason}")]
    InvalidMesh { reason: String },

    #[error("Shader compilation failed: {shader}: {error}")]
    ShaderCompilation { shader: String, error: String },

    #[error("Shader '{shader}' has no compute entry point '{entry_point}'")]
    MissingEntryPoint { shader: String, entry_point: String },

    #[error("Append buffer needs {required} bytes but the device allows {limit}")]
    CapacityExceedsDeviceLimit { required: u64, limit: u64 },

    #[error("Dispatch of {workgroups} workgroups exceeds the device limit of {limit}")]
    DispatchTooLarge { workgroups: u32, limit: u32 },

    #[error("Session is not initialized: cannot {operation}")]
    NotInitialized { operation: &'static str },

    #[error("GPU operation '{operation}' failed: {error}")]
    GpuOperationFailed { operation: String, error: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Buffer readback failed: {0}")]
    Readback(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SynthesisError>;

/// Create a GPU operation error
pub fn gpu_operation_error(operation: &str, error: impl std::fmt::Display) -> SynthesisError {
    SynthesisError::GpuOperationFailed {
        operation: operation.to_string(),
        error: error.to_string(),
    }
}

/// Create a mesh validation error
pub fn invalid_mesh(reason: impl Into<String>) -> SynthesisError {
    SynthesisError::InvalidMesh {
        reason: reason.into(),
    }
}
