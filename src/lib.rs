//! voxel-ngin
//!
//! The skeleton of a voxel-terrain engine. For now it renders a single
//! spinning cube through two thin GPU wrappers: a shader program that owns a
//! compiled pipeline and its uniforms, and a mesh that owns a vertex/index
//! buffer pair. Both release their GPU objects when dropped.
//!
//! High-level modules
//! - `camera`: camera, projection and spin used to build the MVP transform
//! - `context`: GPU device/queue and the window surface
//! - `data_structures`: CPU-side geometry and textures
//! - `error`: error types for setup, shaders, uniforms and meshes
//! - `flow`: lifecycle state machine and the winit event loop
//! - `input`: keyboard state polling
//! - `pipelines`: shader compilation, linking and pipeline creation
//! - `resources`: GPU meshes and resource accounting
//! - `scene`: the cube demo scene
//! - `settings`: start-up configuration
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod input;
pub mod pipelines;
pub mod resources;
pub mod scene;
pub mod settings;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use context::{Context, Gpu};
pub use pipelines::program::ShaderProgram;
pub use resources::mesh::GpuMesh;
pub use settings::Settings;
pub use wgpu;
