//! Uniform and sampler registration, name mangling and block layout resolution.

use std::fmt::Write as _;

use crate::caps::ShaderCaps;
use crate::error::ShaderError;
use crate::layout;
use crate::processor::ProcessorId;
use crate::swizzle::Swizzle;
use crate::types::{ArrayCount, BlockLayout, ShaderStages, ShaderType};
use crate::var::{ShaderVar, TypeModifier};

/// Names starting with this prefix are shared engine builtins and are never mangled.
pub const NO_MANGLE_PREFIX: &str = "SV_";

/// The builtin clip-space projection uniform every program carries.
pub const PROJECTION_NAME: &str = "SV_Projection";

/// Name of the single per-draw uniform block.
pub const UNIFORM_BLOCK_NAME: &str = "UniformBlock";

/// Descriptor set holding the per-draw uniform block.
pub const MAIN_DESC_SET: u32 = 0;

/// Descriptor set holding the texture samplers.
pub const SAMPLER_DESC_SET: u32 = 1;

/// Descriptor set holding input attachments.
pub const INPUT_DESC_SET: u32 = 2;

/// Binding of the uniform block within [`MAIN_DESC_SET`].
pub const UNIFORM_BINDING: u32 = 0;

/// First binding slot of [`INPUT_DESC_SET`]; input attachments bind sequentially from here.
pub const INPUT_BINDING: u32 = 0;

/// Soft size budget for the per-draw uniform block, in bytes.
///
/// Exceeding it still produces a correct program; it is logged because per-draw data this large
/// usually belongs in a storage buffer instead.
pub const PER_DRAW_BLOCK_BUDGET: u32 = 128;

/// Refers to one registered block uniform.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct UniformHandle(u32);

impl UniformHandle {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// Refers to one registered texture or input-attachment sampler.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SamplerHandle(u32);

impl SamplerHandle {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// One registered block uniform.
#[derive(Debug)]
pub struct UniformInfo {
  var: ShaderVar,
  raw_name: String,
  visibility: ShaderStages,
  owner: Option<ProcessorId>,
  offset: u32,
}

impl UniformInfo {
  pub fn var(&self) -> &ShaderVar {
    &self.var
  }

  /// The pre-mangling name the owning step registered.
  pub fn raw_name(&self) -> &str {
    &self.raw_name
  }

  pub fn visibility(&self) -> ShaderStages {
    self.visibility
  }

  pub fn owner(&self) -> Option<ProcessorId> {
    self.owner
  }

  /// Byte offset within the uniform block. Meaningful once offsets are resolved.
  pub fn offset(&self) -> u32 {
    self.offset
  }
}

/// One registered sampler.
#[derive(Debug)]
pub struct SamplerInfo {
  var: ShaderVar,
  raw_name: String,
  swizzle: Swizzle,
  binding: u32,
}

impl SamplerInfo {
  pub fn var(&self) -> &ShaderVar {
    &self.var
  }

  pub fn raw_name(&self) -> &str {
    &self.raw_name
  }

  /// The channel permutation to apply when sampling the bound texture.
  pub fn swizzle(&self) -> Swizzle {
    self.swizzle
  }

  /// Binding slot within the sampler descriptor set.
  pub fn binding(&self) -> u32 {
    self.binding
  }
}

/// Tracks every uniform and sampler of one build session.
///
/// Registration happens while the pipeline steps emit their code; offsets are resolved lazily the
/// first time declarations are emitted or the block size is queried, and are frozen from then on.
#[derive(Debug)]
pub struct UniformHandler {
  caps: ShaderCaps,
  uniforms: Vec<UniformInfo>,
  samplers: Vec<SamplerInfo>,
  input_samplers: Vec<SamplerInfo>,
  block_size: u32,
  finished: bool,
}

impl UniformHandler {
  pub fn new(caps: ShaderCaps) -> Self {
    UniformHandler {
      caps,
      uniforms: Vec::new(),
      samplers: Vec::new(),
      input_samplers: Vec::new(),
      block_size: 0,
      finished: false,
    }
  }

  /// Register a non-array uniform inside the per-draw block.
  ///
  /// See [`UniformHandler::add_uniform_array`].
  pub fn add_uniform(
    &mut self,
    owner: Option<ProcessorId>,
    visibility: ShaderStages,
    ty: ShaderType,
    raw_name: &str,
  ) -> UniformHandle {
    self.add_uniform_array(owner, visibility, ty, raw_name, ArrayCount::NonArray)
  }

  /// Register a uniform inside the per-draw block and return a handle to it.
  ///
  /// Names carrying [`NO_MANGLE_PREFIX`] are emitted verbatim and deduplicated: re-registering
  /// the same builtin merges the visibility masks and returns the original handle. Every other
  /// name is suffixed with its registration ordinal, so steps can reuse raw names freely.
  ///
  /// # Panics
  ///
  /// Panics if `raw_name` is empty, `visibility` is empty, offsets have already been resolved,
  /// `array_count` is unsized, or `ty` cannot live inside a uniform block (use
  /// [`UniformHandler::add_sampler`] for opaque types).
  pub fn add_uniform_array(
    &mut self,
    owner: Option<ProcessorId>,
    visibility: ShaderStages,
    ty: ShaderType,
    raw_name: &str,
    array_count: ArrayCount,
  ) -> UniformHandle {
    assert!(!self.finished, "uniform block layout already resolved");
    assert!(!raw_name.is_empty(), "uniforms cannot be unnamed");
    assert!(!visibility.is_empty(), "uniforms need at least one visible stage");
    assert!(
      ty.can_be_uniform_value(),
      "type {} cannot live inside a uniform block",
      ty
    );
    assert!(
      array_count != ArrayCount::Unsized,
      "block uniforms need a fixed size, {} cannot be unsized",
      raw_name
    );

    if raw_name.starts_with(NO_MANGLE_PREFIX) {
      // builtins are shared across owners; only the visibility accumulates
      if let Some(i) = self.uniforms.iter().position(|u| u.raw_name == raw_name) {
        let existing = &mut self.uniforms[i];
        assert!(
          existing.var.ty() == ty && existing.var.array_count() == array_count,
          "builtin {} re-registered with a different type",
          raw_name
        );
        existing.visibility |= visibility;
        return UniformHandle(i as u32);
      }
    }

    let index = self.uniforms.len() as u32;
    let name = if raw_name.starts_with(NO_MANGLE_PREFIX) {
      raw_name.to_owned()
    } else {
      format!("{}_{}", raw_name, index)
    };

    self.uniforms.push(UniformInfo {
      var: ShaderVar::new_array(name, ty, TypeModifier::None, array_count),
      raw_name: raw_name.to_owned(),
      visibility,
      owner,
      offset: 0,
    });

    UniformHandle(index)
  }

  /// The declared variable behind `handle`.
  pub fn uniform_variable(&self, handle: UniformHandle) -> Result<&ShaderVar, ShaderError> {
    self
      .uniforms
      .get(handle.index())
      .map(|u| &u.var)
      .ok_or(ShaderError::InvalidHandle {
        handle: handle.0,
        count: self.uniforms.len() as u32,
      })
  }

  /// Find the most recent uniform `owner` registered under `raw_name`.
  ///
  /// The scan runs newest-first, so a step that registers the same raw name twice sees the later
  /// registration shadow the earlier one.
  pub fn lookup(&self, owner: Option<ProcessorId>, raw_name: &str) -> Option<UniformHandle> {
    self
      .uniforms
      .iter()
      .rposition(|u| u.owner == owner && u.raw_name == raw_name)
      .map(|i| UniformHandle(i as u32))
  }

  /// Make the most recent uniform `owner` registered under `raw_name` visible from the vertex
  /// stage too.
  ///
  /// Returns `None` when no such uniform exists, which callers treat as the value having been
  /// folded into the generated code rather than registered.
  pub fn promote_to_vertex_visibility(
    &mut self,
    owner: Option<ProcessorId>,
    raw_name: &str,
  ) -> Option<UniformHandle> {
    let handle = self.lookup(owner, raw_name)?;
    self.uniforms[handle.index()].visibility |= ShaderStages::VERTEX;
    Some(handle)
  }

  /// Register a combined texture sampler, visible from the fragment stage.
  ///
  /// Sampler slots are handed out sequentially within [`SAMPLER_DESC_SET`], in registration
  /// order.
  ///
  /// # Panics
  ///
  /// Panics if `raw_name` is empty.
  pub fn add_sampler(&mut self, swizzle: Swizzle, raw_name: &str) -> SamplerHandle {
    assert!(!raw_name.is_empty(), "samplers cannot be unnamed");

    let index = self.samplers.len() as u32;
    let name = format!("{}_{}", raw_name, index);
    let mut var = ShaderVar::new(name, ShaderType::Sampler2D, TypeModifier::Uniform);
    if self.caps.use_uniform_binding {
      var.add_layout_qualifier(format!("set = {}", SAMPLER_DESC_SET));
      var.add_layout_qualifier(format!("binding = {}", index));
    }

    self.samplers.push(SamplerInfo {
      var,
      raw_name: raw_name.to_owned(),
      swizzle,
      binding: index,
    });

    SamplerHandle(index)
  }

  /// Register an input attachment, visible from the fragment stage.
  ///
  /// Like texture samplers, input attachments take sequential binding slots within their own
  /// descriptor set, in registration order. Fails with [`ShaderError::Unsupported`] when the
  /// target has no input attachments.
  pub fn add_input_sampler(
    &mut self,
    swizzle: Swizzle,
    raw_name: &str,
  ) -> Result<SamplerHandle, ShaderError> {
    if !self.caps.input_attachments {
      return Err(ShaderError::Unsupported(
        "input attachments need a descriptor-set backend",
      ));
    }
    assert!(!raw_name.is_empty(), "samplers cannot be unnamed");

    let index = self.input_samplers.len() as u32;
    let binding = INPUT_BINDING + index;
    let name = format!("{}_{}", raw_name, index);
    let mut var = ShaderVar::new(name, ShaderType::SubpassInput, TypeModifier::Uniform);
    var.add_layout_qualifier(format!("input_attachment_index = {}", index));
    var.add_layout_qualifier(format!("set = {}", INPUT_DESC_SET));
    var.add_layout_qualifier(format!("binding = {}", binding));

    self.input_samplers.push(SamplerInfo {
      var,
      raw_name: raw_name.to_owned(),
      swizzle,
      binding,
    });

    Ok(SamplerHandle(index))
  }

  /// The declared variable behind a sampler handle.
  pub fn sampler_variable(&self, handle: SamplerHandle) -> Result<&ShaderVar, ShaderError> {
    self
      .samplers
      .get(handle.index())
      .map(|s| &s.var)
      .ok_or(ShaderError::InvalidHandle {
        handle: handle.0,
        count: self.samplers.len() as u32,
      })
  }

  /// The swizzle recorded for a sampler handle.
  pub fn sampler_swizzle(&self, handle: SamplerHandle) -> Result<Swizzle, ShaderError> {
    self
      .samplers
      .get(handle.index())
      .map(|s| s.swizzle)
      .ok_or(ShaderError::InvalidHandle {
        handle: handle.0,
        count: self.samplers.len() as u32,
      })
  }

  /// Resolve block offsets in registration order. Idempotent.
  fn resolve_offsets(&mut self) {
    if self.finished {
      return;
    }
    self.finished = true;

    let layout = self.caps.block_layout;
    let mut offset = 0;

    for info in &mut self.uniforms {
      let ty = info.var.ty();
      let array_count = info.var.array_count();
      let aligned = layout::aligned_offset(offset, ty, array_count, layout);
      info.offset = aligned;
      offset = aligned + layout::aligned_stride(ty, array_count, layout);

      if self.caps.use_block_member_offset {
        info.var.add_layout_qualifier(format!("offset = {}", aligned));
      }
    }

    self.block_size = offset;

    if self.block_size > PER_DRAW_BLOCK_BUDGET {
      tracing::warn!(
        block_size = self.block_size,
        budget = PER_DRAW_BLOCK_BUDGET,
        "per-draw uniform block exceeds its size budget"
      );
    }
  }

  /// Total size in bytes of the per-draw uniform block. Freezes the layout.
  pub fn block_size(&mut self) -> u32 {
    self.resolve_offsets();
    self.block_size
  }

  /// Emit the uniform declarations visible from `visibility` into `out`.
  ///
  /// The block definition always lists every member, whichever stage it is emitted into, so the
  /// two stages see byte-identical block text and the program links; `visibility` only decides
  /// whether the block (and, for the fragment stage, the samplers) appears at all. The first
  /// call freezes the block layout.
  pub fn append_uniform_decls(&mut self, visibility: ShaderStages, out: &mut String) {
    self.resolve_offsets();

    let block_visible = self
      .uniforms
      .iter()
      .any(|u| u.visibility.intersects(visibility));

    if block_visible {
      let layout_name = match self.caps.block_layout {
        BlockLayout::Std140 => "std140",
        BlockLayout::Std430 => "std430",
      };
      if self.caps.use_uniform_binding {
        let _ = writeln!(
          out,
          "layout({}, set = {}, binding = {}) uniform {} {{",
          layout_name, MAIN_DESC_SET, UNIFORM_BINDING, UNIFORM_BLOCK_NAME
        );
      } else {
        let _ = writeln!(out, "layout({}) uniform {} {{", layout_name, UNIFORM_BLOCK_NAME);
      }

      for info in &self.uniforms {
        out.push_str("  ");
        let _ = info.var.write_decl(out);
        out.push_str(";\n");
      }

      out.push_str("};\n");
    }

    if visibility.contains(ShaderStages::FRAGMENT) {
      for sampler in self.samplers.iter().chain(self.input_samplers.iter()) {
        let _ = sampler.var.write_decl(out);
        out.push_str(";\n");
      }
    }
  }

  pub fn uniforms(&self) -> &[UniformInfo] {
    &self.uniforms
  }

  pub fn samplers(&self) -> &[SamplerInfo] {
    &self.samplers
  }

  pub fn input_samplers(&self) -> &[SamplerInfo] {
    &self.input_samplers
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::Dim;

  fn handler() -> UniformHandler {
    UniformHandler::new(ShaderCaps::default())
  }

  #[test]
  fn mangled_names_are_deterministic() {
    let mut uniforms = handler();
    let owner = Some(ProcessorId::new(0));

    let a = uniforms.add_uniform(owner, ShaderStages::FRAGMENT, ShaderType::Float(Dim::D4), "u_Color");
    let b = uniforms.add_uniform(owner, ShaderStages::FRAGMENT, ShaderType::Float(Dim::D4), "u_Color");

    assert_ne!(a, b);
    assert_eq!(uniforms.uniform_variable(a).unwrap().name(), "u_Color_0");
    assert_eq!(uniforms.uniform_variable(b).unwrap().name(), "u_Color_1");
  }

  #[test]
  fn lookup_returns_most_recent() {
    let mut uniforms = handler();
    let owner = Some(ProcessorId::new(3));

    uniforms.add_uniform(owner, ShaderStages::FRAGMENT, ShaderType::Float(Dim::Scalar), "u_Radius");
    let newer = uniforms.add_uniform(owner, ShaderStages::FRAGMENT, ShaderType::Float(Dim::Scalar), "u_Radius");

    assert_eq!(uniforms.lookup(owner, "u_Radius"), Some(newer));
    assert_eq!(uniforms.lookup(owner, "u_Missing"), None);
    assert_eq!(uniforms.lookup(Some(ProcessorId::new(4)), "u_Radius"), None);
  }

  #[test]
  fn builtins_deduplicate_and_merge_visibility() {
    let mut uniforms = handler();

    let a = uniforms.add_uniform(None, ShaderStages::VERTEX, ShaderType::Float(Dim::D4), PROJECTION_NAME);
    let b = uniforms.add_uniform(
      Some(ProcessorId::new(0)),
      ShaderStages::FRAGMENT,
      ShaderType::Float(Dim::D4),
      PROJECTION_NAME,
    );

    assert_eq!(a, b);
    assert_eq!(uniforms.uniform_variable(a).unwrap().name(), PROJECTION_NAME);
    assert_eq!(
      uniforms.uniforms()[a.index()].visibility(),
      ShaderStages::VERTEX | ShaderStages::FRAGMENT
    );
  }

  #[test]
  fn promote_to_vertex_visibility_sets_the_bit() {
    let mut uniforms = handler();
    let owner = Some(ProcessorId::new(1));

    let handle = uniforms.add_uniform(owner, ShaderStages::FRAGMENT, ShaderType::Float(Dim::D2), "u_Scale");
    assert_eq!(uniforms.promote_to_vertex_visibility(owner, "u_Scale"), Some(handle));
    assert!(uniforms.uniforms()[handle.index()]
      .visibility()
      .contains(ShaderStages::VERTEX | ShaderStages::FRAGMENT));

    assert_eq!(uniforms.promote_to_vertex_visibility(owner, "u_Constant"), None);
  }

  #[test]
  fn offsets_follow_registration_order() {
    let mut uniforms = handler();
    let owner = Some(ProcessorId::new(0));

    let a = uniforms.add_uniform(owner, ShaderStages::VERTEX, ShaderType::Float(Dim::Scalar), "u_A");
    let b = uniforms.add_uniform(owner, ShaderStages::VERTEX, ShaderType::Float(Dim::D3), "u_B");
    let c = uniforms.add_uniform(owner, ShaderStages::VERTEX, ShaderType::Float(Dim::Scalar), "u_C");

    assert_eq!(uniforms.block_size(), 32);
    assert_eq!(uniforms.uniforms()[a.index()].offset(), 0);
    assert_eq!(uniforms.uniforms()[b.index()].offset(), 16);
    assert_eq!(uniforms.uniforms()[c.index()].offset(), 28);
  }

  #[test]
  fn emission_is_idempotent_and_stage_identical() {
    let mut uniforms = handler();

    uniforms.add_uniform(None, ShaderStages::VERTEX, ShaderType::Float(Dim::D4), PROJECTION_NAME);
    uniforms.add_uniform(
      Some(ProcessorId::new(0)),
      ShaderStages::FRAGMENT,
      ShaderType::Float(Dim::D4),
      "u_Color",
    );

    let mut vertex = String::new();
    uniforms.append_uniform_decls(ShaderStages::VERTEX, &mut vertex);
    let mut vertex_again = String::new();
    uniforms.append_uniform_decls(ShaderStages::VERTEX, &mut vertex_again);
    assert_eq!(vertex, vertex_again);

    // the fragment stage additionally gets samplers, but the block text is shared
    let mut fragment = String::new();
    uniforms.append_uniform_decls(ShaderStages::FRAGMENT, &mut fragment);
    assert_eq!(vertex, fragment);
    assert!(vertex.contains("layout(offset = 0) vec4 SV_Projection;"));
    assert!(vertex.contains("layout(offset = 16) vec4 u_Color_1;"));
  }

  #[test]
  fn samplers_are_fragment_only() {
    let mut uniforms = handler();
    let handle = uniforms.add_sampler(Swizzle::RGBA, "u_Image");
    assert_eq!(uniforms.sampler_swizzle(handle).unwrap(), Swizzle::RGBA);

    let mut vertex = String::new();
    uniforms.append_uniform_decls(ShaderStages::VERTEX, &mut vertex);
    assert!(vertex.is_empty());

    let mut fragment = String::new();
    uniforms.append_uniform_decls(ShaderStages::FRAGMENT, &mut fragment);
    assert_eq!(
      fragment,
      "layout(set = 1, binding = 0) uniform sampler2D u_Image_0;\n"
    );
  }

  #[test]
  fn input_samplers_need_backend_support() {
    let mut uniforms = handler();
    assert!(matches!(
      uniforms.add_input_sampler(Swizzle::RGBA, "u_DstColor"),
      Err(ShaderError::Unsupported(_))
    ));

    let caps = ShaderCaps {
      input_attachments: true,
      ..ShaderCaps::default()
    };
    let mut uniforms = UniformHandler::new(caps);
    let handle = uniforms.add_input_sampler(Swizzle::RGBA, "u_DstColor").unwrap();
    assert_eq!(handle.index(), 0);

    let mut fragment = String::new();
    uniforms.append_uniform_decls(ShaderStages::FRAGMENT, &mut fragment);
    assert_eq!(
      fragment,
      "layout(input_attachment_index = 0, set = 2, binding = 0) uniform subpassInput u_DstColor_0;\n"
    );
  }

  #[test]
  fn input_samplers_take_sequential_bindings() {
    let caps = ShaderCaps {
      input_attachments: true,
      ..ShaderCaps::default()
    };
    let mut uniforms = UniformHandler::new(caps);
    let a = uniforms.add_input_sampler(Swizzle::RGBA, "u_DstA").unwrap();
    let b = uniforms.add_input_sampler(Swizzle::RGBA, "u_DstB").unwrap();
    assert_ne!(a, b);

    let bindings: Vec<u32> = uniforms.input_samplers().iter().map(|s| s.binding()).collect();
    assert_eq!(bindings, vec![0, 1]);

    let mut fragment = String::new();
    uniforms.append_uniform_decls(ShaderStages::FRAGMENT, &mut fragment);
    assert_eq!(
      fragment,
      "layout(input_attachment_index = 0, set = 2, binding = 0) uniform subpassInput u_DstA_0;\n\
       layout(input_attachment_index = 1, set = 2, binding = 1) uniform subpassInput u_DstB_1;\n"
    );
  }

  #[test]
  #[should_panic(expected = "cannot be unsized")]
  fn unsized_block_uniforms_are_rejected() {
    let mut uniforms = handler();
    uniforms.add_uniform_array(
      Some(ProcessorId::new(0)),
      ShaderStages::FRAGMENT,
      ShaderType::Float(Dim::D4),
      "u_Colors",
      ArrayCount::Unsized,
    );
  }

  #[test]
  fn stale_handles_are_rejected() {
    let mut uniforms = handler();
    let foreign = {
      let mut other = handler();
      other.add_uniform(None, ShaderStages::VERTEX, ShaderType::Float(Dim::D4), PROJECTION_NAME);
      other.add_uniform(
        Some(ProcessorId::new(0)),
        ShaderStages::VERTEX,
        ShaderType::Float(Dim::Scalar),
        "u_T",
      )
    };

    assert!(matches!(
      uniforms.uniform_variable(foreign),
      Err(ShaderError::InvalidHandle { handle: 1, count: 0 })
    ));
  }
}
