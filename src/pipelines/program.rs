//! [`ShaderProgram`]: a compiled and linked vertex/fragment pair on the GPU.

use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    fmt,
    num::NonZeroU32,
    sync::atomic::{AtomicU32, Ordering},
};

use cgmath::Matrix4;

use crate::{
    context::Gpu,
    error::{ShaderError, UniformError},
    pipelines::{
        basic::{PipelineTarget, ShaderEntry, mk_render_pipeline},
        compile::{CompiledStage, ProgramBuild},
        uniform::{UniformBlock, UniformKind, UniformTable},
    },
    resources::ledger::{ResourceKind, Tracked},
};

static NEXT_HANDLE: AtomicU32 = AtomicU32::new(1);

/// Process-unique, never-zero program id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(NonZeroU32);

impl ProgramHandle {
    fn next() -> Self {
        let id = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
        Self(NonZeroU32::new(id).unwrap_or(NonZeroU32::MIN))
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for ProgramHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "program#{}", self.0)
    }
}

/// A vertex/fragment program and the uniform buffers it reads.
///
/// A program whose stages failed to compile or link still exists and keeps
/// its handle and diagnostics, but has no pipeline: [`activate`](Self::activate)
/// refuses to bind it and every uniform lookup misses.
pub struct ShaderProgram {
    handle: ProgramHandle,
    pipeline: Option<wgpu::RenderPipeline>,
    uniforms: UniformTable,
    buffers: HashMap<(u32, u32), wgpu::Buffer>,
    bind_groups: Vec<(u32, wgpu::BindGroup)>,
    diagnostics: Vec<ShaderError>,
    _tracked: Tracked,
}

impl fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("handle", &self.handle)
            .field("linked", &self.is_linked())
            .field("uniforms", &self.uniforms)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

impl ShaderProgram {
    /// Compile and link, logging every diagnostic instead of failing.
    pub fn new(
        gpu: &Gpu,
        target: PipelineTarget,
        vertex_layouts: &[wgpu::VertexBufferLayout<'_>],
        vertex_source: &str,
        fragment_source: &str,
    ) -> Self {
        let build = ProgramBuild::compile(vertex_source, fragment_source)
            .with_vertex_layouts(vertex_layouts);
        for diagnostic in build.diagnostics() {
            log::error!("{}", diagnostic);
        }
        Self::from_build(gpu, target, vertex_layouts, build)
    }

    /// Compile and link, returning the first diagnostic as an error.
    pub fn try_new(
        gpu: &Gpu,
        target: PipelineTarget,
        vertex_layouts: &[wgpu::VertexBufferLayout<'_>],
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, ShaderError> {
        let build = ProgramBuild::compile(vertex_source, fragment_source)
            .with_vertex_layouts(vertex_layouts);
        if let Some(first) = build.diagnostics().first() {
            return Err(first.clone());
        }
        Ok(Self::from_build(gpu, target, vertex_layouts, build))
    }

    fn from_build(
        gpu: &Gpu,
        target: PipelineTarget,
        vertex_layouts: &[wgpu::VertexBufferLayout<'_>],
        build: ProgramBuild,
    ) -> Self {
        let handle = ProgramHandle::next();
        let _tracked = gpu.ledger.track(ResourceKind::Program);

        let Some((vertex, fragment)) = build.linked_stages() else {
            log::warn!("{} has no usable pipeline", handle);
            return Self {
                handle,
                pipeline: None,
                uniforms: UniformTable::default(),
                buffers: HashMap::new(),
                bind_groups: Vec::new(),
                diagnostics: build.diagnostics().to_vec(),
                _tracked,
            };
        };

        let device = &gpu.device;
        let bindings = UniformBindings::new(device, build.uniforms());
        let layout_refs: Vec<Option<&wgpu::BindGroupLayout>> = bindings.layouts.iter().map(Some).collect();
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Program Pipeline Layout"),
            bind_group_layouts: &layout_refs,
            immediate_size: 0,
        });

        let vertex_module = create_module(device, vertex);
        let fragment_module = create_module(device, fragment);
        let pipeline = mk_render_pipeline(
            device,
            &pipeline_layout,
            target,
            vertex_layouts,
            ShaderEntry {
                module: &vertex_module,
                entry_point: vertex.entry_point(),
            },
            ShaderEntry {
                module: &fragment_module,
                entry_point: fragment.entry_point(),
            },
        );
        log::debug!(
            "linked {} with {} uniform(s)",
            handle,
            build.uniforms().len()
        );

        Self {
            handle,
            pipeline: Some(pipeline),
            uniforms: build.uniforms().clone(),
            buffers: bindings.buffers,
            bind_groups: bindings.groups,
            diagnostics: build.diagnostics().to_vec(),
            _tracked,
        }
    }

    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    pub fn is_linked(&self) -> bool {
        self.pipeline.is_some()
    }

    pub fn diagnostics(&self) -> &[ShaderError] {
        &self.diagnostics
    }

    pub fn uniforms(&self) -> &UniformTable {
        &self.uniforms
    }

    /// Number of bind groups [`activate`](Self::activate) sets.
    pub fn bind_group_count(&self) -> usize {
        self.bind_groups.len()
    }

    /// Make this program the one subsequent draws on `render_pass` use.
    ///
    /// Returns `false`, leaving the pass untouched, if the program never linked.
    pub fn activate(&self, render_pass: &mut wgpu::RenderPass<'_>) -> bool {
        let Some(pipeline) = &self.pipeline else {
            return false;
        };
        render_pass.set_pipeline(pipeline);
        for (group, bind_group) in &self.bind_groups {
            render_pass.set_bind_group(*group, bind_group, &[]);
        }
        true
    }

    pub fn set_float(&self, queue: &wgpu::Queue, name: &str, value: f32) -> Result<(), UniformError> {
        self.write(queue, name, UniformKind::Float, bytemuck::bytes_of(&value))
    }

    pub fn set_matrix4(
        &self,
        queue: &wgpu::Queue,
        name: &str,
        value: &Matrix4<f32>,
    ) -> Result<(), UniformError> {
        let columns: [[f32; 4]; 4] = (*value).into();
        self.write(queue, name, UniformKind::Matrix4, bytemuck::bytes_of(&columns))
    }

    // A miss returns before anything reaches the queue.
    fn write(
        &self,
        queue: &wgpu::Queue,
        name: &str,
        kind: UniformKind,
        bytes: &[u8],
    ) -> Result<(), UniformError> {
        let slot = self.uniforms.locate_as(name, kind)?;
        if let Some(buffer) = self.buffers.get(&(slot.group, slot.binding)) {
            queue.write_buffer(buffer, slot.offset as wgpu::BufferAddress, bytes);
        }
        Ok(())
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        for buffer in self.buffers.values() {
            buffer.destroy();
        }
    }
}

fn create_module(device: &wgpu::Device, stage: &CompiledStage) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{} shader", stage.stage())),
        source: wgpu::ShaderSource::Naga(Cow::Owned(stage.module().clone())),
    })
}

/// One bind group layout and one bind group per group index up to the highest
/// used one, and a buffer per uniform block.
struct UniformBindings {
    layouts: Vec<wgpu::BindGroupLayout>,
    buffers: HashMap<(u32, u32), wgpu::Buffer>,
    groups: Vec<(u32, wgpu::BindGroup)>,
}

impl UniformBindings {
    fn new(device: &wgpu::Device, uniforms: &UniformTable) -> Self {
        let mut by_group: BTreeMap<u32, Vec<UniformBlock>> = BTreeMap::new();
        for block in uniforms.blocks() {
            by_group.entry(block.group).or_default().push(block);
        }
        let group_count = by_group.keys().next_back().map_or(0, |last| last + 1);

        let mut layouts = Vec::new();
        let mut buffers = HashMap::new();
        let mut groups = Vec::new();
        for group in 0..group_count {
            let blocks = by_group.get(&group).map(Vec::as_slice).unwrap_or_default();
            let entries: Vec<wgpu::BindGroupLayoutEntry> = blocks
                .iter()
                .map(|block| wgpu::BindGroupLayoutEntry {
                    binding: block.binding,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(block.size as u64),
                    },
                    count: None,
                })
                .collect();
            let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("uniform_bind_group_layout"),
                entries: &entries,
            });

            for block in blocks {
                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!(
                        "Uniform Buffer (group {}, binding {})",
                        block.group, block.binding
                    )),
                    size: block.size as wgpu::BufferAddress,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                buffers.insert((block.group, block.binding), buffer);
            }

            // Every index up to the highest group must be set before a draw,
            // so gaps get an empty bind group.
            let bind_entries: Vec<wgpu::BindGroupEntry> = blocks
                .iter()
                .filter_map(|block| {
                    buffers
                        .get(&(block.group, block.binding))
                        .map(|buffer| wgpu::BindGroupEntry {
                            binding: block.binding,
                            resource: buffer.as_entire_binding(),
                        })
                })
                .collect();
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("uniform_bind_group"),
                layout: &layout,
                entries: &bind_entries,
            });
            groups.push((group, bind_group));
            layouts.push(layout);
        }

        Self {
            layouts,
            buffers,
            groups,
        }
    }
}
