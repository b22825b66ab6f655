//! The demo scene: one orange cube spinning in front of a movable camera.

use cgmath::{Matrix4, Rad};

use crate::{
    camera::{self, Camera, Projection, Spin},
    context::{Context, Gpu},
    data_structures::{mesh::MeshData, texture::Texture},
    input::KeyState,
    pipelines::{
        CUBE_FRAGMENT_SHADER, CUBE_VERTEX_SHADER,
        basic::PipelineTarget,
        program::ShaderProgram,
    },
    resources::mesh::GpuMesh,
    settings::Settings,
};

/// Name of the transform uniform in the cube's vertex stage.
pub const MVP_UNIFORM: &str = "mvp";

#[derive(Debug)]
pub struct CubeScene {
    pub camera: Camera,
    pub projection: Projection,
    pub spin: Spin,
    move_step: f32,
    shader: ShaderProgram,
    mesh: GpuMesh,
}

impl CubeScene {
    pub fn new(ctx: &Context, settings: &Settings) -> Self {
        let target = PipelineTarget {
            color_format: ctx.color_format(),
            depth_format: Some(Texture::DEPTH_FORMAT),
        };
        let (width, height) = ctx.size();
        Self::with_target(&ctx.gpu, target, width, height, settings)
    }

    /// Build the scene for an arbitrary render target, e.g. an offscreen texture.
    pub fn with_target(
        gpu: &Gpu,
        target: PipelineTarget,
        width: u32,
        height: u32,
        settings: &Settings,
    ) -> Self {
        let mesh = GpuMesh::new(gpu, "cube", &MeshData::cube());
        let shader = ShaderProgram::new(
            gpu,
            target,
            &[mesh.layout().clone()],
            CUBE_VERTEX_SHADER,
            CUBE_FRAGMENT_SHADER,
        );
        Self {
            camera: Camera::from_settings(settings),
            projection: Projection::new(
                width,
                height,
                settings.fovy,
                settings.znear,
                settings.zfar,
            ),
            spin: Spin::new(Rad(settings.spin_step)),
            move_step: settings.move_step,
            shader,
            mesh,
        }
    }

    /// The current `projection · view · model` transform.
    pub fn mvp(&self) -> Matrix4<f32> {
        camera::model_view_projection(&self.projection, &self.camera, &self.spin)
    }

    /// Move the camera by whatever keys are held. Runs before drawing.
    pub fn update(&mut self, keys: &KeyState) {
        self.camera.integrate(keys, self.move_step);
    }

    /// Advance the spin. Runs after the frame is presented, so the first
    /// frame is drawn unrotated.
    pub fn finish_frame(&mut self) {
        self.spin.advance();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    /// Bind the shader, upload the transform, and draw the cube.
    pub fn draw(&self, queue: &wgpu::Queue, render_pass: &mut wgpu::RenderPass<'_>) {
        if !self.shader.activate(render_pass) {
            return;
        }
        if let Err(e) = self.shader.set_matrix4(queue, MVP_UNIFORM, &self.mvp()) {
            log::trace!("{}", e);
        }
        self.mesh.draw(render_pass);
    }

    pub fn shader(&self) -> &ShaderProgram {
        &self.shader
    }

    pub fn mesh(&self) -> &GpuMesh {
        &self.mesh
    }
}
