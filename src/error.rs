//! Error types shared across the engine.
//!
//! Fatal setup failures surface as [`ContextError`]. Shader problems are
//! [`ShaderError`] values whose `Display` output is the console diagnostic,
//! uniform lookups fail with [`UniformError`] and rejected geometry with
//! [`MeshError`].

use thiserror::Error;

use crate::pipelines::compile::ShaderStage;

/// Failure while bringing up the window or the GPU. Always fatal.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("could not create the event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("window could not be created: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("surface could not be created: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("graphics device could not be created: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("the surface is not supported by the selected adapter")]
    UnsupportedSurface,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShaderError {
    #[error("ERROR::SHADER::{stage}::COMPILATION_FAILED\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("ERROR::PROGRAM::LINKING_FAILED\n{log}")]
    Link { log: String },
}

impl ShaderError {
    /// The stage that failed to compile, `None` for link failures.
    pub fn stage(&self) -> Option<ShaderStage> {
        match self {
            Self::Compile { stage, .. } => Some(*stage),
            Self::Link { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UniformError {
    #[error("no uniform named `{name}` in the program")]
    NotFound { name: String },
    #[error("uniform `{name}` is a {found}, not a {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("mesh has no vertices or no indices")]
    Empty,
    #[error("{len} position components do not form whole xyz vertices")]
    RaggedPositions { len: usize },
    #[error("{len} indices do not form whole triangles")]
    RaggedIndices { len: usize },
    #[error("index {index} at position {at} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        at: usize,
        index: u32,
        vertex_count: usize,
    },
}
