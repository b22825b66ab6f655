//! Shader compilation and linking, without touching the GPU.
//!
//! Each GLSL stage is parsed and validated by naga ("compiling"). Two compiled
//! stages are then checked against each other and against the vertex buffer
//! layouts that will feed them ("linking"). The result is a [`ProgramBuild`]
//! that holds either the linked stages and their uniform table or the
//! diagnostics explaining why not.

use std::{collections::BTreeMap, fmt};

use wgpu::naga;

use crate::{
    error::ShaderError,
    pipelines::uniform::{UniformBlock, UniformKind, UniformSlot, UniformTable},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn naga(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("VERTEX"),
            Self::Fragment => f.write_str("FRAGMENT"),
        }
    }
}

/// A parsed and validated shader stage.
#[derive(Debug, Clone)]
pub struct CompiledStage {
    stage: ShaderStage,
    module: naga::Module,
    entry_point: String,
}

impl CompiledStage {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn module(&self) -> &naga::Module {
        &self.module
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    fn entry(&self) -> Option<&naga::EntryPoint> {
        self.module
            .entry_points
            .iter()
            .find(|ep| ep.name == self.entry_point)
    }

    /// Location-bound inputs of the entry point.
    pub fn inputs(&self) -> BTreeMap<u32, naga::TypeInner> {
        let mut locations = BTreeMap::new();
        if let Some(entry) = self.entry() {
            for argument in &entry.function.arguments {
                collect_locations(
                    &self.module,
                    argument.ty,
                    argument.binding.as_ref(),
                    &mut locations,
                );
            }
        }
        locations
    }

    /// Location-bound outputs of the entry point. Built-ins are skipped.
    pub fn outputs(&self) -> BTreeMap<u32, naga::TypeInner> {
        let mut locations = BTreeMap::new();
        if let Some(result) = self.entry().and_then(|e| e.function.result.as_ref()) {
            collect_locations(
                &self.module,
                result.ty,
                result.binding.as_ref(),
                &mut locations,
            );
        }
        locations
    }

    fn reflect_uniforms(&self, table: &mut UniformTable) -> Result<(), String> {
        let module = &self.module;
        for (_, var) in module.global_variables.iter() {
            if var.space != naga::AddressSpace::Uniform {
                continue;
            }
            let Some(binding) = &var.binding else {
                continue;
            };
            let ty = &module.types[var.ty];
            table.insert_block(UniformBlock {
                group: binding.group,
                binding: binding.binding,
                size: ty.inner.size(module.to_ctx()),
            })?;
            match &ty.inner {
                // Members of a uniform block are addressed by their own names.
                naga::TypeInner::Struct { members, .. } => {
                    for member in members {
                        let Some(name) = &member.name else { continue };
                        table.insert_slot(
                            name,
                            UniformSlot {
                                group: binding.group,
                                binding: binding.binding,
                                offset: member.offset,
                                kind: UniformKind::of(&module.types[member.ty].inner),
                            },
                        )?;
                    }
                }
                inner => {
                    if let Some(name) = &var.name {
                        table.insert_slot(
                            name,
                            UniformSlot {
                                group: binding.group,
                                binding: binding.binding,
                                offset: 0,
                                kind: UniformKind::of(inner),
                            },
                        )?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut BTreeMap<u32, naga::TypeInner>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            out.insert(*location, module.types[ty].inner.clone());
        }
        Some(_) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

pub fn compile_stage(stage: ShaderStage, source: &str) -> Result<CompiledStage, ShaderError> {
    let options = naga::front::glsl::Options::from(stage.naga());
    let module = naga::front::glsl::Frontend::default()
        .parse(&options, source)
        .map_err(|e| ShaderError::Compile {
            stage,
            log: e.emit_to_string(source),
        })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    )
    .validate(&module)
    .map_err(|e| ShaderError::Compile {
        stage,
        log: e.emit_to_string(source),
    })?;

    let entry_point = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage.naga())
        .map(|ep| ep.name.clone())
        .ok_or_else(|| ShaderError::Compile {
            stage,
            log: format!("no {} entry point", stage),
        })?;

    Ok(CompiledStage {
        stage,
        module,
        entry_point,
    })
}

/// Match the vertex outputs to the fragment inputs and merge the uniforms of
/// both stages into one table.
pub fn link(vertex: &CompiledStage, fragment: &CompiledStage) -> Result<UniformTable, ShaderError> {
    let link_error = |log: String| ShaderError::Link { log };

    if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
        return Err(link_error(format!(
            "expected a VERTEX and a FRAGMENT stage, got {} and {}",
            vertex.stage, fragment.stage
        )));
    }

    let produced = vertex.outputs();
    for (location, wanted) in fragment.inputs() {
        match produced.get(&location) {
            None => {
                return Err(link_error(format!(
                    "fragment input at location {} is not written by the vertex stage",
                    location
                )));
            }
            Some(written) if *written != wanted => {
                return Err(link_error(format!(
                    "location {} is written as {:?} but read as {:?}",
                    location, written, wanted
                )));
            }
            Some(_) => {}
        }
    }

    let mut uniforms = UniformTable::default();
    vertex.reflect_uniforms(&mut uniforms).map_err(link_error)?;
    fragment.reflect_uniforms(&mut uniforms).map_err(link_error)?;
    Ok(uniforms)
}

/// Every vertex input must be fed by an attribute of matching format.
pub fn check_vertex_layouts(
    vertex: &CompiledStage,
    layouts: &[wgpu::VertexBufferLayout<'_>],
) -> Result<(), ShaderError> {
    for (location, wanted) in vertex.inputs() {
        let attribute = layouts
            .iter()
            .flat_map(|layout| layout.attributes.iter())
            .find(|attribute| attribute.shader_location == location);
        match attribute {
            None => {
                return Err(ShaderError::Link {
                    log: format!(
                        "vertex input at location {} is not fed by any vertex buffer attribute",
                        location
                    ),
                });
            }
            Some(attribute) if !format_matches(&wanted, attribute.format) => {
                return Err(ShaderError::Link {
                    log: format!(
                        "vertex input at location {} is {:?} but the buffer supplies {:?}",
                        location, wanted, attribute.format
                    ),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

// Only float formats are checked, everything else is left to wgpu.
fn format_matches(inner: &naga::TypeInner, format: wgpu::VertexFormat) -> bool {
    let vector = |size| naga::TypeInner::Vector {
        size,
        scalar: naga::Scalar::F32,
    };
    let expected = match format {
        wgpu::VertexFormat::Float32 => naga::TypeInner::Scalar(naga::Scalar::F32),
        wgpu::VertexFormat::Float32x2 => vector(naga::VectorSize::Bi),
        wgpu::VertexFormat::Float32x3 => vector(naga::VectorSize::Tri),
        wgpu::VertexFormat::Float32x4 => vector(naga::VectorSize::Quad),
        _ => return true,
    };
    *inner == expected
}

/// Outcome of compiling and linking a vertex/fragment pair.
#[derive(Debug, Clone)]
pub struct ProgramBuild {
    vertex: Option<CompiledStage>,
    fragment: Option<CompiledStage>,
    uniforms: UniformTable,
    linked: bool,
    diagnostics: Vec<ShaderError>,
}

impl ProgramBuild {
    /// Compile both stages and link them if both compiled. Never fails:
    /// problems end up in [`diagnostics`](Self::diagnostics).
    pub fn compile(vertex_source: &str, fragment_source: &str) -> Self {
        let mut diagnostics = Vec::new();
        let vertex = compile_stage(ShaderStage::Vertex, vertex_source)
            .map_err(|e| diagnostics.push(e))
            .ok();
        let fragment = compile_stage(ShaderStage::Fragment, fragment_source)
            .map_err(|e| diagnostics.push(e))
            .ok();

        let mut uniforms = UniformTable::default();
        let mut linked = false;
        match (&vertex, &fragment) {
            (Some(v), Some(f)) => match link(v, f) {
                Ok(table) => {
                    uniforms = table;
                    linked = true;
                }
                Err(e) => diagnostics.push(e),
            },
            // A program missing a stage never links.
            _ => diagnostics.push(ShaderError::Link {
                log: "cannot link a program with a stage that failed to compile".to_string(),
            }),
        }

        Self {
            vertex,
            fragment,
            uniforms,
            linked,
            diagnostics,
        }
    }

    /// Additionally require the given buffer layouts to feed the vertex stage.
    pub fn with_vertex_layouts(mut self, layouts: &[wgpu::VertexBufferLayout<'_>]) -> Self {
        if let (true, Some(vertex)) = (self.linked, &self.vertex) {
            if let Err(e) = check_vertex_layouts(vertex, layouts) {
                self.linked = false;
                self.uniforms = UniformTable::default();
                self.diagnostics.push(e);
            }
        }
        self
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Both stages, if the program linked.
    pub fn linked_stages(&self) -> Option<(&CompiledStage, &CompiledStage)> {
        match (self.linked, &self.vertex, &self.fragment) {
            (true, Some(v), Some(f)) => Some((v, f)),
            _ => None,
        }
    }

    pub fn uniforms(&self) -> &UniformTable {
        &self.uniforms
    }

    pub fn diagnostics(&self) -> &[ShaderError] {
        &self.diagnostics
    }
}
