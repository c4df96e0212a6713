//! Fragment stage text builder.

use std::ops::{Deref, DerefMut};

use crate::builder::ShaderBuilder;
use crate::types::{Dim, ShaderStages, ShaderType};
use crate::uniform::UniformHandler;
use crate::var::{ShaderVar, TypeModifier};
use crate::varying::VaryingHandler;

/// Name of the primary color output.
pub const PRIMARY_COLOR_OUTPUT_NAME: &str = "FragColor0";

/// Name of the secondary color output used for dual-source blending.
pub const SECONDARY_COLOR_OUTPUT_NAME: &str = "FragColor1";

/// Builds the fragment stage of one program.
///
/// Wraps a [`ShaderBuilder`] and adds the color outputs: the primary output always exists, the
/// secondary one only when a blend step opts into dual-source blending.
#[derive(Debug)]
pub struct FragmentShaderBuilder {
  builder: ShaderBuilder,
  dual_source_supported: bool,
  secondary_output: bool,
}

impl FragmentShaderBuilder {
  pub fn new(dual_source_supported: bool) -> Self {
    FragmentShaderBuilder {
      builder: ShaderBuilder::new(),
      dual_source_supported,
      secondary_output: false,
    }
  }

  /// Declare the secondary color output for dual-source blending.
  ///
  /// # Panics
  ///
  /// Panics if the target does not support dual-source blending, or on a second call.
  pub fn enable_secondary_output(&mut self) {
    assert!(
      self.dual_source_supported,
      "target has no dual-source blending"
    );
    assert!(!self.secondary_output, "secondary output already enabled");
    self.secondary_output = true;
  }

  pub fn has_secondary_output(&self) -> bool {
    self.secondary_output
  }

  /// Close the stage: emit every fragment-visible declaration and the color outputs.
  ///
  /// Both outputs live at location 0; dual-source blending distinguishes them by index.
  ///
  /// # Panics
  ///
  /// Panics if the stage was already finalized.
  pub fn finalize(&mut self, uniforms: &mut UniformHandler, varyings: &VaryingHandler) {
    uniforms.append_uniform_decls(ShaderStages::FRAGMENT, self.builder.uniform_decls_mut());
    varyings.write_fragment_decls(self.builder.input_decls_mut());

    let mut primary = ShaderVar::new(
      PRIMARY_COLOR_OUTPUT_NAME,
      ShaderType::Float(Dim::D4),
      TypeModifier::Out,
    );
    primary.add_layout_qualifier("location = 0");
    primary.add_layout_qualifier("index = 0");
    self.builder.declare_output(&primary);

    if self.secondary_output {
      let mut secondary = ShaderVar::new(
        SECONDARY_COLOR_OUTPUT_NAME,
        ShaderType::Float(Dim::D4),
        TypeModifier::Out,
      );
      secondary.add_layout_qualifier("location = 0");
      secondary.add_layout_qualifier("index = 1");
      self.builder.declare_output(&secondary);
    }

    self.builder.finish();
  }

  pub(crate) fn assemble(&self, header: &str) -> String {
    self.builder.assemble(header)
  }
}

impl Deref for FragmentShaderBuilder {
  type Target = ShaderBuilder;

  fn deref(&self) -> &Self::Target {
    &self.builder
  }
}

impl DerefMut for FragmentShaderBuilder {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.builder
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::caps::ShaderCaps;

  fn finalize(fragment: &mut FragmentShaderBuilder) {
    let mut uniforms = UniformHandler::new(ShaderCaps::default());
    let varyings = VaryingHandler::new();
    fragment.finalize(&mut uniforms, &varyings);
  }

  #[test]
  fn primary_output_is_always_declared() {
    let mut fragment = FragmentShaderBuilder::new(true);
    finalize(&mut fragment);
    assert!(fragment
      .assemble("")
      .contains("layout(location = 0, index = 0) out vec4 FragColor0;"));
  }

  #[test]
  fn dual_source_outputs_share_the_location() {
    let mut fragment = FragmentShaderBuilder::new(true);
    fragment.enable_secondary_output();
    finalize(&mut fragment);

    let src = fragment.assemble("");
    assert!(src.contains("layout(location = 0, index = 0) out vec4 FragColor0;"));
    assert!(src.contains("layout(location = 0, index = 1) out vec4 FragColor1;"));
  }

  #[test]
  #[should_panic(expected = "already enabled")]
  fn secondary_output_is_one_shot() {
    let mut fragment = FragmentShaderBuilder::new(true);
    fragment.enable_secondary_output();
    fragment.enable_secondary_output();
  }

  #[test]
  #[should_panic(expected = "no dual-source blending")]
  fn secondary_output_needs_support() {
    let mut fragment = FragmentShaderBuilder::new(false);
    fragment.enable_secondary_output();
  }
}
