//! Camera, projection and the cube's spin.
//!
//! All motion here advances by a fixed amount per frame. Nothing is scaled by
//! elapsed time, so movement speed follows the frame rate.

use cgmath::{Matrix4, Point3, Rad, Vector3, perspective};
use winit::keyboard::KeyCode;

use crate::{input::KeyState, settings::Settings};

/// cgmath produces OpenGL clip space (z in -1..1); wgpu expects z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// A free-moving camera that pans a fixed look-at view.
///
/// `position` is integrated from the keyboard. The view looks from `eye` at
/// `target`, both shifted by how far `position` has moved from where it
/// started, so the first frame shows exactly the unshifted look-at.
///
/// Moving only pans the view. The viewing direction never changes.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vector3<f32>,
    start: Vector3<f32>,
    eye: Point3<f32>,
    target: Point3<f32>,
}

impl Camera {
    pub fn new(position: Vector3<f32>, eye: Point3<f32>, target: Point3<f32>) -> Self {
        Self {
            position,
            start: position,
            eye,
            target,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.camera_start, settings.eye, settings.target)
    }

    /// Move by `step` along every axis whose key is held.
    ///
    /// W/S drive +Z/-Z, D/A drive +X/-X, Space/Left-Shift drive +Y/-Y.
    pub fn integrate(&mut self, keys: &KeyState, step: f32) {
        self.position.x += keys.axis(KeyCode::KeyD, KeyCode::KeyA) * step;
        self.position.y += keys.axis(KeyCode::Space, KeyCode::ShiftLeft) * step;
        self.position.z += keys.axis(KeyCode::KeyW, KeyCode::KeyS) * step;
    }

    pub fn pan(&self) -> Vector3<f32> {
        self.position - self.start
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        let pan = self.pan();
        Matrix4::look_at_rh(self.eye + pan, self.target + pan, Vector3::unit_y())
    }
}

#[derive(Debug, Clone)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Rotation of the model about the vertical axis.
#[derive(Debug, Clone, Copy)]
pub struct Spin {
    angle: Rad<f32>,
    step: Rad<f32>,
}

impl Spin {
    pub fn new(step: Rad<f32>) -> Self {
        Self {
            angle: Rad(0.0),
            step,
        }
    }

    pub fn angle(&self) -> Rad<f32> {
        self.angle
    }

    pub fn advance(&mut self) {
        self.angle += self.step;
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_angle_y(self.angle)
    }
}

/// `projection · view · model`, ready for the `mvp` uniform.
pub fn model_view_projection(projection: &Projection, camera: &Camera, spin: &Spin) -> Matrix4<f32> {
    projection.calc_matrix() * camera.calc_matrix() * spin.model_matrix()
}
