//! Start-up configuration.
//!
//! Every tunable the engine reads lives in [`Settings`]. The binary runs with
//! [`Settings::default`], which reproduces the spinning-cube demo.

use cgmath::{Deg, Point3, Vector3};

#[derive(Debug, Clone)]
pub struct Settings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    pub clear_colour: wgpu::Color,
    /// Camera translation per frame and held key, in world units.
    pub move_step: f32,
    /// Cube rotation per frame, in radians.
    pub spin_step: f32,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub camera_start: Vector3<f32>,
    /// Quit on its own once this many frames were presented. `None` runs
    /// until the window is closed.
    pub quit_after_frames: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "Voxel Engine".to_string(),
            width: 800,
            height: 600,
            resizable: false,
            // dark teal
            clear_colour: wgpu::Color {
                r: 0.2,
                g: 0.3,
                b: 0.3,
                a: 1.0,
            },
            move_step: 0.01,
            spin_step: 0.0025,
            fovy: Deg(60.0),
            znear: 0.01,
            zfar: 100.0,
            eye: Point3::new(2.0, 2.0, 2.0),
            target: Point3::new(0.0, 0.0, 0.0),
            camera_start: Vector3::new(0.0, 0.0, -5.0),
            quit_after_frames: None,
        }
    }
}
