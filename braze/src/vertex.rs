//! Vertex stage text builder.

use std::ops::{Deref, DerefMut};

use crate::builder::ShaderBuilder;
use crate::types::ShaderStages;
use crate::uniform::{UniformHandler, PROJECTION_NAME};
use crate::var::{ShaderVar, TypeModifier};
use crate::varying::VaryingHandler;

/// Builds the vertex stage of one program.
///
/// Wraps a [`ShaderBuilder`] and adds what only the vertex stage has: the vertex input attributes
/// with their location assignment, and the fixed clip-space position epilogue.
#[derive(Debug)]
pub struct VertexShaderBuilder {
  builder: ShaderBuilder,
  attributes: Vec<ShaderVar>,
  locations: Vec<(String, u32)>,
}

impl VertexShaderBuilder {
  pub fn new() -> Self {
    VertexShaderBuilder {
      builder: ShaderBuilder::new(),
      attributes: Vec::new(),
      locations: Vec::new(),
    }
  }

  /// Append vertex input attributes, in list order.
  ///
  /// Locations are assigned at finalization, per-vertex attributes before per-instance ones,
  /// each advancing by the slot count of its type.
  ///
  /// # Panics
  ///
  /// Panics if an attribute is not declared with [`TypeModifier::In`].
  pub fn add_attributes(&mut self, attributes: &[ShaderVar]) {
    for attribute in attributes {
      assert!(
        attribute.type_modifier() == TypeModifier::In,
        "vertex attribute {} must be declared as an input",
        attribute.name()
      );
      self.attributes.push(attribute.clone());
    }
  }

  /// Emit the clip-space transform from the device-space position `pos`.
  ///
  /// A 2-component position maps onto the plane w = 1; a 3-component position carries its
  /// perspective weight in the third channel. The projection vector is the [`PROJECTION_NAME`]
  /// builtin.
  ///
  /// # Panics
  ///
  /// Panics if `pos` is not a 2 or 3 component float vector.
  pub fn emit_position_transform(&mut self, pos: &ShaderVar) {
    use crate::types::{Dim, ShaderType};

    match pos.ty() {
      ShaderType::Float(Dim::D2) => {
        self.builder.write_code(format_args!(
          "  gl_Position = vec4({0}.xy * {1}.xz + {1}.yw, 0.0, 1.0);\n",
          pos.name(),
          PROJECTION_NAME
        ));
      }
      ShaderType::Float(Dim::D3) => {
        self.builder.write_code(format_args!(
          "  gl_Position = vec4({0}.xy * {1}.xz + {0}.zz * {1}.yw, 0.0, {0}.z);\n",
          pos.name(),
          PROJECTION_NAME
        ));
      }
      other => panic!("cannot emit a position transform for a {} position", other),
    }
  }

  /// Close the stage: assign attribute locations, then emit every vertex-visible declaration.
  ///
  /// # Panics
  ///
  /// Panics if the stage was already finalized.
  pub fn finalize(&mut self, uniforms: &mut UniformHandler, varyings: &VaryingHandler) {
    uniforms.append_uniform_decls(ShaderStages::VERTEX, self.builder.uniform_decls_mut());

    let mut location = 0;
    for attribute in &self.attributes {
      let mut var = attribute.clone();
      var.add_layout_qualifier(format!("location = {}", location));
      self.locations.push((var.name().to_owned(), location));
      location += var.ty().locations();

      let _ = var.write_decl(self.builder.input_decls_mut());
      self.builder.input_decls_mut().push_str(";\n");
    }

    varyings.write_vertex_decls(self.builder.output_decls_mut());
    self.builder.finish();
  }

  /// The name-to-location table assigned at finalization.
  ///
  /// This must agree with the vertex-input state configured on the GPU side.
  pub fn attribute_locations(&self) -> &[(String, u32)] {
    &self.locations
  }

  pub(crate) fn assemble(&self, header: &str) -> String {
    self.builder.assemble(header)
  }
}

impl Default for VertexShaderBuilder {
  fn default() -> Self {
    Self::new()
  }
}

impl Deref for VertexShaderBuilder {
  type Target = ShaderBuilder;

  fn deref(&self) -> &Self::Target {
    &self.builder
  }
}

impl DerefMut for VertexShaderBuilder {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.builder
  }
}
