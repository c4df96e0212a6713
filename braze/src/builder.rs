//! Stage-agnostic shader text accumulation.

use std::fmt::{self, Write as _};

use crate::var::ShaderVar;

/// Where a build session's text accumulation currently stands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum BuildPhase {
  /// Code and declarations may still be appended.
  Open,

  /// The stage has been finalized; further appends are a bug.
  Finalized,
}

/// Accumulates the text of one shader stage.
///
/// A [`ShaderBuilder`] keeps four separate regions so that declarations can be appended in any
/// order relative to body code and still end up in their proper place: uniform declarations, then
/// stage inputs, then stage outputs, then the body of `main`. [`ShaderBuilder::assemble`]
/// concatenates them under the caller's version header.
///
/// The builder is one-shot: once [`ShaderBuilder::finish`] runs, every mutating operation panics.
#[derive(Debug)]
pub struct ShaderBuilder {
  uniform_decls: String,
  input_decls: String,
  output_decls: String,
  code: String,
  phase: BuildPhase,
}

impl ShaderBuilder {
  pub fn new() -> Self {
    ShaderBuilder {
      uniform_decls: String::new(),
      input_decls: String::new(),
      output_decls: String::new(),
      code: String::new(),
      phase: BuildPhase::Open,
    }
  }

  fn check_open(&self) {
    assert!(
      self.phase == BuildPhase::Open,
      "shader stage already finalized"
    );
  }

  /// Append literal code to the body of `main`.
  ///
  /// # Panics
  ///
  /// Panics if the stage is already finalized.
  pub fn append_code(&mut self, code: &str) {
    self.check_open();
    self.code.push_str(code);
  }

  /// Append formatted code to the body of `main`.
  ///
  /// # Panics
  ///
  /// Panics if the stage is already finalized.
  pub fn write_code(&mut self, args: fmt::Arguments) {
    self.check_open();
    // writing into a String cannot fail
    let _ = self.code.write_fmt(args);
  }

  /// Append `var`'s declaration to the uniform region.
  pub fn declare_uniform(&mut self, var: &ShaderVar) {
    self.check_open();
    let _ = var.write_decl(&mut self.uniform_decls);
    self.uniform_decls.push_str(";\n");
  }

  /// Append `var`'s declaration to the stage-input region.
  pub fn declare_input(&mut self, var: &ShaderVar) {
    self.check_open();
    let _ = var.write_decl(&mut self.input_decls);
    self.input_decls.push_str(";\n");
  }

  /// Append `var`'s declaration to the stage-output region.
  pub fn declare_output(&mut self, var: &ShaderVar) {
    self.check_open();
    let _ = var.write_decl(&mut self.output_decls);
    self.output_decls.push_str(";\n");
  }

  pub(crate) fn uniform_decls_mut(&mut self) -> &mut String {
    self.check_open();
    &mut self.uniform_decls
  }

  pub(crate) fn input_decls_mut(&mut self) -> &mut String {
    self.check_open();
    &mut self.input_decls
  }

  pub(crate) fn output_decls_mut(&mut self) -> &mut String {
    self.check_open();
    &mut self.output_decls
  }

  /// Close the stage for further appends.
  ///
  /// # Panics
  ///
  /// Panics if the stage was already finalized.
  pub(crate) fn finish(&mut self) {
    self.check_open();
    self.phase = BuildPhase::Finalized;
  }

  /// Concatenate the regions into the final stage source.
  ///
  /// `header` goes first verbatim (the `#version` directive and anything else the target
  /// prepends); the body region is wrapped in `void main()`.
  pub(crate) fn assemble(&self, header: &str) -> String {
    let mut out = String::with_capacity(
      header.len()
        + self.uniform_decls.len()
        + self.input_decls.len()
        + self.output_decls.len()
        + self.code.len()
        + 32,
    );

    out.push_str(header);
    out.push_str(&self.uniform_decls);
    out.push_str(&self.input_decls);
    out.push_str(&self.output_decls);
    out.push_str("\nvoid main() {\n");
    out.push_str(&self.code);
    out.push_str("}\n");

    out
  }
}

impl Default for ShaderBuilder {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{Dim, ShaderType};
  use crate::var::TypeModifier;

  #[test]
  fn regions_assemble_in_order() {
    let mut builder = ShaderBuilder::new();

    builder.append_code("  f_Color = vec4(1.0);\n");
    builder.declare_output(&ShaderVar::new(
      "f_Color",
      ShaderType::Float(Dim::D4),
      TypeModifier::Out,
    ));
    builder.declare_input(&ShaderVar::new(
      "a_Pos",
      ShaderType::Float(Dim::D2),
      TypeModifier::In,
    ));
    builder.finish();

    let src = builder.assemble("#version 450 core\n\n");
    assert_eq!(
      src,
      "#version 450 core\n\n\
       in vec2 a_Pos;\n\
       out vec4 f_Color;\n\
       \nvoid main() {\n  f_Color = vec4(1.0);\n}\n"
    );
  }

  #[test]
  fn write_code_formats() {
    let mut builder = ShaderBuilder::new();
    builder.write_code(format_args!("  float x = {:.1};\n", 2.0));
    builder.finish();
    assert!(builder.assemble("").contains("float x = 2.0;"));
  }

  #[test]
  #[should_panic(expected = "already finalized")]
  fn append_after_finish_panics() {
    let mut builder = ShaderBuilder::new();
    builder.finish();
    builder.append_code("// too late\n");
  }
}
