//! Engine data structures: geometry and textures.
//!
//! - `mesh` contains validated CPU-side geometry and vertex layouts
//! - `texture` contains the depth texture wrapper

pub mod mesh;
pub mod texture;
