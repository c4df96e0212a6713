//! Whole-program assembly.

use crate::caps::ShaderCaps;
use crate::fragment::FragmentShaderBuilder;
use crate::processor::{FragmentStageContext, Pipeline, ProcessorId, VertexStageContext};
use crate::types::{Dim, ShaderStages, ShaderType};
use crate::uniform::{UniformHandler, PROJECTION_NAME};
use crate::varying::{Interpolation, VaryingHandler};
use crate::vertex::VertexShaderBuilder;

/// One vertex attribute of the built program.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttributeBinding {
  pub name: String,
  pub location: u32,
}

/// Where a registered uniform ended up.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UniformSlot {
  /// Byte offset into the per-draw uniform block.
  BlockOffset(u32),

  /// Binding slot in the sampler descriptor set.
  Sampler(u32),

  /// Binding slot in the input-attachment descriptor set.
  InputAttachment(u32),
}

/// One uniform of the built program, keyed by the raw name its step registered.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UniformBinding {
  pub raw_name: String,
  pub visibility: ShaderStages,
  pub slot: UniformSlot,
}

/// One varying of the built program.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaryingBinding {
  pub name: String,
  pub interpolation: Interpolation,
}

/// Everything the GPU side needs to feed the built program.
///
/// Attribute locations must be mirrored into the vertex-input state, block offsets into the
/// uniform upload path, and sampler slots into the descriptor bindings.
#[derive(Clone, Debug)]
pub struct BindingTable {
  pub attributes: Vec<AttributeBinding>,
  pub uniforms: Vec<UniformBinding>,
  pub varyings: Vec<VaryingBinding>,

  /// Total size of the per-draw uniform block, in bytes.
  pub uniform_block_size: u32,
}

/// A finished program: two stage sources plus the binding table.
#[derive(Clone, Debug)]
pub struct BuiltProgram {
  pub vertex_source: String,
  pub fragment_source: String,
  pub bindings: BindingTable,
}

/// Drives one build session from a [`Pipeline`] to a [`BuiltProgram`].
///
/// A session owns its trackers and stage builders outright; nothing is shared between sessions,
/// so any number of them may run concurrently.
pub struct ProgramBuilder {
  caps: ShaderCaps,
  vertex: VertexShaderBuilder,
  fragment: FragmentShaderBuilder,
  uniforms: UniformHandler,
  varyings: VaryingHandler,
}

impl ProgramBuilder {
  pub fn new(caps: ShaderCaps) -> Self {
    ProgramBuilder {
      caps,
      vertex: VertexShaderBuilder::new(),
      fragment: FragmentShaderBuilder::new(caps.dual_source_blending),
      uniforms: UniformHandler::new(caps),
      varyings: VaryingHandler::new(),
    }
  }

  pub fn caps(&self) -> ShaderCaps {
    self.caps
  }

  /// Assemble the pipeline into a program, consuming the session.
  ///
  /// The geometry step runs first and its clip-space epilogue closes the vertex body; fragment
  /// steps run in pipeline order, the blend step last. Uniform block offsets freeze when the
  /// first stage finalizes.
  pub fn build(self, pipeline: Pipeline) -> BuiltProgram {
    let ProgramBuilder {
      caps,
      mut vertex,
      mut fragment,
      mut uniforms,
      mut varyings,
    } = self;
    let Pipeline {
      geometry,
      fragments,
      blend,
    } = pipeline;

    // every program carries the projection builtin
    uniforms.add_uniform(
      None,
      ShaderStages::VERTEX,
      ShaderType::Float(Dim::D4),
      PROJECTION_NAME,
    );

    let geometry_name = geometry.name().to_owned();
    let device_position = geometry.device_position().clone();
    assert!(
      matches!(
        device_position.ty(),
        ShaderType::Float(Dim::D2) | ShaderType::Float(Dim::D3)
      ),
      "geometry step {} must produce a vec2 or vec3 position",
      geometry_name
    );

    vertex.add_attributes(geometry.per_vertex_attributes());
    vertex.add_attributes(geometry.per_instance_attributes());

    let mut next_id = 0;
    {
      let mut ctx = VertexStageContext {
        vertex: &mut vertex,
        uniforms: &mut uniforms,
        varyings: &mut varyings,
        owner: ProcessorId::new(next_id),
      };
      geometry.run(&mut ctx);
    }
    vertex.emit_position_transform(&device_position);

    let fragment_step_count = fragments.len();
    for step in fragments {
      next_id += 1;
      let mut ctx = FragmentStageContext {
        fragment: &mut fragment,
        uniforms: &mut uniforms,
        varyings: &mut varyings,
        owner: ProcessorId::new(next_id),
      };
      step.run(&mut ctx);
    }

    if let Some(step) = blend {
      next_id += 1;
      let mut ctx = FragmentStageContext {
        fragment: &mut fragment,
        uniforms: &mut uniforms,
        varyings: &mut varyings,
        owner: ProcessorId::new(next_id),
      };
      step.run(&mut ctx);
    }

    // fragment first; the first finalization freezes the block layout
    fragment.finalize(&mut uniforms, &varyings);
    vertex.finalize(&mut uniforms, &varyings);

    let header = format!("#version {} core\n\n", caps.glsl_version);
    let vertex_source = vertex.assemble(&header);
    let fragment_source = fragment.assemble(&header);

    let mut bindings = BindingTable {
      attributes: vertex
        .attribute_locations()
        .iter()
        .map(|(name, location)| AttributeBinding {
          name: name.clone(),
          location: *location,
        })
        .collect(),
      uniforms: Vec::new(),
      varyings: varyings
        .varyings()
        .iter()
        .map(|v| VaryingBinding {
          name: v.vs_out().name().to_owned(),
          interpolation: v.interpolation(),
        })
        .collect(),
      uniform_block_size: uniforms.block_size(),
    };

    for info in uniforms.uniforms() {
      bindings.uniforms.push(UniformBinding {
        raw_name: info.raw_name().to_owned(),
        visibility: info.visibility(),
        slot: UniformSlot::BlockOffset(info.offset()),
      });
    }
    for sampler in uniforms.samplers() {
      bindings.uniforms.push(UniformBinding {
        raw_name: sampler.raw_name().to_owned(),
        visibility: ShaderStages::FRAGMENT,
        slot: UniformSlot::Sampler(sampler.binding()),
      });
    }
    for sampler in uniforms.input_samplers() {
      bindings.uniforms.push(UniformBinding {
        raw_name: sampler.raw_name().to_owned(),
        visibility: ShaderStages::FRAGMENT,
        slot: UniformSlot::InputAttachment(sampler.binding()),
      });
    }

    tracing::debug!(
      geometry = %geometry_name,
      fragment_steps = fragment_step_count,
      uniform_block_size = bindings.uniform_block_size,
      "assembled shader program"
    );

    BuiltProgram {
      vertex_source,
      fragment_source,
      bindings,
    }
  }
}
