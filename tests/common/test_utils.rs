#![allow(dead_code)]

use voxel_ngin::{
    data_structures::texture::Texture,
    pipelines::basic::PipelineTarget,
};

pub(crate) const VALID_VERTEX: &str = r#"#version 450
layout(location = 0) in vec3 a_pos;
layout(location = 0) out vec3 v_color;

layout(set = 0, binding = 0) uniform Transform {
    mat4 mvp;
    float brightness;
};

void main() {
    v_color = a_pos * brightness;
    gl_Position = mvp * vec4(a_pos, 1.0);
}
"#;

pub(crate) const VALID_FRAGMENT: &str = r#"#version 450
layout(location = 0) in vec3 v_color;
layout(location = 0) out vec4 frag_color;

void main() {
    frag_color = vec4(v_color, 1.0);
}
"#;

/// Missing an operand.
pub(crate) const BROKEN_VERTEX: &str = r#"#version 450
layout(location = 0) in vec3 a_pos;

void main() {
    gl_Position = vec4(a_pos, ) * ;
}
"#;

/// Calls a function that does not exist.
pub(crate) const BROKEN_FRAGMENT: &str = r#"#version 450
layout(location = 0) out vec4 frag_color;

void main() {
    frag_color = no_such_function(1.0);
}
"#;

/// Compiles fine but reads a varying no vertex stage in these tests writes.
pub(crate) const UNFED_FRAGMENT: &str = r#"#version 450
layout(location = 0) in vec3 v_normal;
layout(location = 0) out vec4 frag_color;

void main() {
    frag_color = vec4(v_normal, 1.0);
}
"#;

pub(crate) fn offscreen_target() -> PipelineTarget {
    PipelineTarget {
        color_format: wgpu::TextureFormat::Rgba8Unorm,
        depth_format: Some(Texture::DEPTH_FORMAT),
    }
}

/// `None` when the machine has no usable adapter.
#[cfg(feature = "integration-tests")]
pub(crate) async fn gpu_or_skip() -> Option<voxel_ngin::Gpu> {
    match voxel_ngin::Gpu::headless().await {
        Ok(gpu) => Some(gpu),
        Err(e) => {
            eprintln!("skipping, no GPU available: {}", e);
            None
        }
    }
}

/// Reads its only uniform from bind group 1, leaving group 0 unused.
pub(crate) const SECOND_GROUP_VERTEX: &str = r#"#version 450
layout(location = 0) in vec3 a_pos;

layout(set = 1, binding = 0) uniform Transform {
    mat4 mvp;
};

void main() {
    gl_Position = mvp * vec4(a_pos, 1.0);
}
"#;

/// Record one pass into fresh colour and depth targets and submit it.
///
/// wgpu's default error handler panics on validation errors, so a draw the
/// device rejects fails the calling test.
#[cfg(feature = "integration-tests")]
pub(crate) fn render_offscreen(
    gpu: &voxel_ngin::Gpu,
    target: PipelineTarget,
    record: impl FnOnce(&mut wgpu::RenderPass<'_>),
) {
    let size = wgpu::Extent3d {
        width: 64,
        height: 64,
        depth_or_array_layers: 1,
    };
    let color = gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("offscreen colour"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: target.color_format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
    let depth = Texture::create_depth_texture(&gpu.device, [size.width, size.height], "offscreen depth");

    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("offscreen pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });
        record(&mut render_pass);
    }
    gpu.queue.submit(std::iter::once(encoder.finish()));
}
