//! Shader programs and the render pipelines built from them.
//!
//! - `compile` turns GLSL sources into validated stages and links them
//! - `uniform` holds the reflected uniform locations of a linked program
//! - `program` owns the GPU side: pipeline, uniform buffers, bind groups
//! - `basic` is the pipeline descriptor shared by all programs

pub mod basic;
pub mod compile;
pub mod program;
pub mod uniform;

/// Vertex stage of the cube: transforms positions by the `mvp` uniform.
pub const CUBE_VERTEX_SHADER: &str = include_str!("cube.vert");
/// Fragment stage of the cube: a constant orange.
pub const CUBE_FRAGMENT_SHADER: &str = include_str!("cube.frag");
