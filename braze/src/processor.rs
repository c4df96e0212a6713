//! Composable pipeline steps a program is assembled from.
//!
//! A draw pipeline is a closed composition: exactly one geometry step, any number of fragment
//! steps applied in order, and an optional blend step. Each step contributes code through an
//! `emit` closure run once against the stage it targets; the closure receives the step's
//! [`ProcessorId`] and registers its uniforms under it, which keeps independent steps from
//! colliding on raw names.

use crate::fragment::FragmentShaderBuilder;
use crate::uniform::UniformHandler;
use crate::var::ShaderVar;
use crate::varying::VaryingHandler;
use crate::vertex::VertexShaderBuilder;

/// Opaque per-session identity of one pipeline step.
///
/// Used as the owner token for uniform registration and lookup. Ids are assigned by the program
/// builder in step order and are only meaningful within their session.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ProcessorId(u32);

impl ProcessorId {
  pub fn new(raw: u32) -> Self {
    ProcessorId(raw)
  }

  pub fn raw(self) -> u32 {
    self.0
  }
}

/// What a geometry step's `emit` closure works against.
pub struct VertexStageContext<'a> {
  pub vertex: &'a mut VertexShaderBuilder,
  pub uniforms: &'a mut UniformHandler,
  pub varyings: &'a mut VaryingHandler,

  /// The emitting step's identity; register uniforms under it.
  pub owner: ProcessorId,
}

/// What a fragment or blend step's `emit` closure works against.
pub struct FragmentStageContext<'a> {
  pub fragment: &'a mut FragmentShaderBuilder,
  pub uniforms: &'a mut UniformHandler,
  pub varyings: &'a mut VaryingHandler,

  /// The emitting step's identity; register uniforms under it.
  pub owner: ProcessorId,
}

/// The step that turns vertex data into a device-space position.
pub struct GeometryStep {
  name: String,
  per_vertex_attributes: Vec<ShaderVar>,
  per_instance_attributes: Vec<ShaderVar>,
  device_position: ShaderVar,
  emit: Box<dyn FnOnce(&mut VertexStageContext)>,
}

impl GeometryStep {
  /// Create a geometry step.
  ///
  /// `device_position` names the variable the `emit` closure assigns the device-space position
  /// to; the program builder appends the clip-space epilogue reading it. It must be a `vec2` or
  /// `vec3`.
  pub fn new(
    name: impl Into<String>,
    per_vertex_attributes: Vec<ShaderVar>,
    per_instance_attributes: Vec<ShaderVar>,
    device_position: ShaderVar,
    emit: impl FnOnce(&mut VertexStageContext) + 'static,
  ) -> Self {
    GeometryStep {
      name: name.into(),
      per_vertex_attributes,
      per_instance_attributes,
      device_position,
      emit: Box::new(emit),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn per_vertex_attributes(&self) -> &[ShaderVar] {
    &self.per_vertex_attributes
  }

  pub fn per_instance_attributes(&self) -> &[ShaderVar] {
    &self.per_instance_attributes
  }

  pub fn device_position(&self) -> &ShaderVar {
    &self.device_position
  }

  pub(crate) fn run(self, ctx: &mut VertexStageContext) {
    (self.emit)(ctx);
  }
}

/// A step transforming the fragment color, applied in pipeline order.
pub struct FragmentStep {
  name: String,
  emit: Box<dyn FnOnce(&mut FragmentStageContext)>,
}

impl FragmentStep {
  pub fn new(
    name: impl Into<String>,
    emit: impl FnOnce(&mut FragmentStageContext) + 'static,
  ) -> Self {
    FragmentStep {
      name: name.into(),
      emit: Box::new(emit),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub(crate) fn run(self, ctx: &mut FragmentStageContext) {
    (self.emit)(ctx);
  }
}

/// The final step writing the color outputs; may opt into dual-source blending.
pub struct BlendStep {
  name: String,
  emit: Box<dyn FnOnce(&mut FragmentStageContext)>,
}

impl BlendStep {
  pub fn new(
    name: impl Into<String>,
    emit: impl FnOnce(&mut FragmentStageContext) + 'static,
  ) -> Self {
    BlendStep {
      name: name.into(),
      emit: Box::new(emit),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub(crate) fn run(self, ctx: &mut FragmentStageContext) {
    (self.emit)(ctx);
  }
}

/// One complete draw pipeline, consumed by a program build.
pub struct Pipeline {
  pub geometry: GeometryStep,
  pub fragments: Vec<FragmentStep>,

  /// When absent, the last fragment step's result is written to the primary output as-is by
  /// whichever step assigned it.
  pub blend: Option<BlendStep>,
}
