#[cfg(feature = "integration-tests")]
use cgmath::{Matrix4, SquareMatrix};
#[cfg(feature = "integration-tests")]
use voxel_ngin::{
    GpuMesh, ShaderProgram,
    data_structures::mesh::{MeshData, PositionVertex, Vertex},
    error::{ShaderError, UniformError},
    pipelines::{CUBE_FRAGMENT_SHADER, CUBE_VERTEX_SHADER},
    resources::ledger::ResourceKind,
    scene::{CubeScene, MVP_UNIFORM},
    settings::Settings,
};

#[cfg(feature = "integration-tests")]
use crate::common::test_utils::{
    BROKEN_VERTEX, SECOND_GROUP_VERTEX, UNFED_FRAGMENT, VALID_FRAGMENT, VALID_VERTEX, gpu_or_skip,
    offscreen_target, render_offscreen,
};

mod common;

#[cfg(feature = "integration-tests")]
#[tokio::test]
async fn mesh_releases_everything_it_allocates() {
    let Some(gpu) = gpu_or_skip().await else {
        return;
    };
    let ledger = gpu.ledger().clone();

    let mesh = GpuMesh::new(&gpu, "cube", &MeshData::cube());
    assert_eq!(mesh.index_count(), 36);
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(ledger.total_live(), 3);
    drop(mesh);

    for kind in [
        ResourceKind::VertexArray,
        ResourceKind::VertexBuffer,
        ResourceKind::IndexBuffer,
    ] {
        assert_eq!(ledger.allocated(kind), 1, "{}", kind);
        assert_eq!(ledger.released(kind), 1, "{}", kind);
    }
    assert_eq!(ledger.allocated(ResourceKind::Program), 0);
    assert_eq!(ledger.total_live(), 0);
}

#[cfg(feature = "integration-tests")]
#[tokio::test]
async fn cube_program_accepts_its_transform() {
    let Some(gpu) = gpu_or_skip().await else {
        return;
    };

    let program = ShaderProgram::try_new(
        &gpu,
        offscreen_target(),
        &[PositionVertex::desc()],
        CUBE_VERTEX_SHADER,
        CUBE_FRAGMENT_SHADER,
    )
    .unwrap();

    assert!(program.is_linked());
    assert!(program.handle().get() > 0);
    assert!(
        program
            .set_matrix4(&gpu.queue, MVP_UNIFORM, &Matrix4::identity())
            .is_ok()
    );
    assert_eq!(
        program.set_float(&gpu.queue, "u_time", 1.0),
        Err(UniformError::NotFound {
            name: "u_time".to_string()
        })
    );
    assert!(matches!(
        program.set_float(&gpu.queue, MVP_UNIFORM, 1.0),
        Err(UniformError::TypeMismatch { .. })
    ));

    drop(program);
    assert_eq!(gpu.ledger().live(ResourceKind::Program), 0);
}

#[cfg(feature = "integration-tests")]
#[tokio::test]
async fn broken_program_still_gets_a_handle() {
    let Some(gpu) = gpu_or_skip().await else {
        return;
    };

    let program = ShaderProgram::new(
        &gpu,
        offscreen_target(),
        &[PositionVertex::desc()],
        BROKEN_VERTEX,
        CUBE_FRAGMENT_SHADER,
    );

    assert!(!program.is_linked());
    assert!(program.handle().get() > 0);
    assert!(program.diagnostics()[0].to_string().contains("VERTEX"));
    assert!(program.uniforms().is_empty());
    assert!(
        program
            .set_matrix4(&gpu.queue, MVP_UNIFORM, &Matrix4::identity())
            .is_err()
    );
    assert_eq!(gpu.ledger().live(ResourceKind::Program), 1);
}

#[cfg(feature = "integration-tests")]
#[tokio::test]
async fn link_failure_is_returned_by_try_new() {
    let Some(gpu) = gpu_or_skip().await else {
        return;
    };

    let err = ShaderProgram::try_new(
        &gpu,
        offscreen_target(),
        &[PositionVertex::desc()],
        CUBE_VERTEX_SHADER,
        UNFED_FRAGMENT,
    )
    .unwrap_err();

    assert!(matches!(err, ShaderError::Link { .. }));
    // nothing was created for the rejected program
    assert_eq!(gpu.ledger().allocated(ResourceKind::Program), 0);
}

#[cfg(feature = "integration-tests")]
#[tokio::test]
async fn cube_scene_draws_offscreen() {
    let Some(gpu) = gpu_or_skip().await else {
        return;
    };
    let settings = Settings::default();

    let mut scene = CubeScene::with_target(&gpu, offscreen_target(), 64, 64, &settings);
    assert!(scene.shader().is_linked());
    assert_eq!(scene.mesh().index_count(), 36);

    render_offscreen(&gpu, offscreen_target(), |pass| scene.draw(&gpu.queue, pass));
    scene.finish_frame();
    assert_eq!(scene.spin.angle().0, settings.spin_step);

    drop(scene);
    assert_eq!(gpu.ledger().total_live(), 0);
}

#[cfg(feature = "integration-tests")]
#[tokio::test]
async fn link_failure_through_new_keeps_a_handle() {
    let Some(gpu) = gpu_or_skip().await else {
        return;
    };

    let program = ShaderProgram::new(
        &gpu,
        offscreen_target(),
        &[PositionVertex::desc()],
        CUBE_VERTEX_SHADER,
        UNFED_FRAGMENT,
    );

    assert!(!program.is_linked());
    assert!(program.handle().get() > 0);
    assert!(matches!(
        program.diagnostics(),
        [ShaderError::Link { .. }]
    ));
    assert_eq!(gpu.ledger().live(ResourceKind::Program), 1);

    drop(program);
    assert_eq!(gpu.ledger().live(ResourceKind::Program), 0);
}

#[cfg(feature = "integration-tests")]
#[tokio::test]
async fn float_uniform_is_written() {
    let Some(gpu) = gpu_or_skip().await else {
        return;
    };

    let program = ShaderProgram::try_new(
        &gpu,
        offscreen_target(),
        &[PositionVertex::desc()],
        VALID_VERTEX,
        VALID_FRAGMENT,
    )
    .unwrap();

    assert_eq!(program.set_float(&gpu.queue, "brightness", 0.5), Ok(()));
    assert_eq!(
        program.set_matrix4(&gpu.queue, MVP_UNIFORM, &Matrix4::identity()),
        Ok(())
    );
    gpu.queue.submit(std::iter::empty());
}

#[cfg(feature = "integration-tests")]
#[tokio::test]
async fn uniforms_in_a_later_group_still_draw() {
    let Some(gpu) = gpu_or_skip().await else {
        return;
    };
    let mesh = GpuMesh::new(&gpu, "cube", &MeshData::cube());

    let program = ShaderProgram::try_new(
        &gpu,
        offscreen_target(),
        &[mesh.layout().clone()],
        SECOND_GROUP_VERTEX,
        CUBE_FRAGMENT_SHADER,
    )
    .unwrap();

    let mvp = program.uniforms().locate(MVP_UNIFORM).unwrap();
    assert_eq!((mvp.group, mvp.binding), (1, 0));
    // group 0 is empty but still bound
    assert_eq!(program.bind_group_count(), 2);

    program
        .set_matrix4(&gpu.queue, MVP_UNIFORM, &Matrix4::identity())
        .unwrap();
    render_offscreen(&gpu, offscreen_target(), |pass| {
        assert!(program.activate(pass));
        mesh.draw(pass);
    });
}
