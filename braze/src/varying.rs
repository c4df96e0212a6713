//! Stage-boundary varying registration.

use crate::types::ShaderType;
use crate::var::{ShaderVar, TypeModifier};

/// How a varying is interpolated across the primitive.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Interpolation {
  /// Perspective-correct interpolation, the default.
  Smooth,

  /// No interpolation; the provoking vertex's value is used.
  Flat,

  /// Linear interpolation in screen space.
  NoPerspective,
}

impl Interpolation {
  fn qualifier(self) -> &'static str {
    match self {
      Interpolation::Smooth => "",
      Interpolation::Flat => "flat",
      Interpolation::NoPerspective => "noperspective",
    }
  }
}

/// A matched pair of variables crossing the vertex/fragment boundary.
#[derive(Debug)]
pub struct Varying {
  vs_out: ShaderVar,
  fs_in: ShaderVar,
  interpolation: Interpolation,
}

impl Varying {
  /// The vertex-stage `out` side.
  pub fn vs_out(&self) -> &ShaderVar {
    &self.vs_out
  }

  /// The fragment-stage `in` side.
  pub fn fs_in(&self) -> &ShaderVar {
    &self.fs_in
  }

  pub fn interpolation(&self) -> Interpolation {
    self.interpolation
  }
}

/// Tracks the varyings of one build session.
///
/// Both sides of every varying are created by the same registration, so the declarations the two
/// stages see can never disagree on name or type.
#[derive(Debug, Default)]
pub struct VaryingHandler {
  varyings: Vec<Varying>,
}

impl VaryingHandler {
  pub fn new() -> Self {
    VaryingHandler::default()
  }

  /// Register a varying, creating the vertex `out` and the fragment `in` side atomically.
  ///
  /// Integer-based types cannot be interpolated and are forced to [`Interpolation::Flat`]
  /// whatever `interpolation` says. Registering a name that already exists with the same type is
  /// a no-op returning the existing pair's name.
  ///
  /// # Panics
  ///
  /// Panics if `name` is empty, or if `name` was already registered with a different type.
  pub fn add_varying(
    &mut self,
    name: &str,
    ty: ShaderType,
    interpolation: Interpolation,
  ) -> &Varying {
    assert!(!name.is_empty(), "varyings cannot be unnamed");

    if let Some(i) = self.varyings.iter().position(|v| v.vs_out.name() == name) {
      assert!(
        self.varyings[i].vs_out.ty() == ty,
        "varying {} re-registered as {} (was {})",
        name,
        ty,
        self.varyings[i].vs_out.ty()
      );
      return &self.varyings[i];
    }

    let interpolation = if ty.is_integer_based() {
      Interpolation::Flat
    } else {
      interpolation
    };

    let mut vs_out = ShaderVar::new(name, ty, TypeModifier::Out);
    let mut fs_in = ShaderVar::new(name, ty, TypeModifier::In);
    let qualifier = interpolation.qualifier();
    if !qualifier.is_empty() {
      vs_out.set_extra_modifiers(qualifier);
      fs_in.set_extra_modifiers(qualifier);
    }

    self.varyings.push(Varying {
      vs_out,
      fs_in,
      interpolation,
    });
    self.varyings.last().unwrap()
  }

  /// Emit the vertex-stage side of every varying, in registration order.
  pub fn write_vertex_decls(&self, out: &mut String) {
    for varying in &self.varyings {
      let _ = varying.vs_out.write_decl(out);
      out.push_str(";\n");
    }
  }

  /// Emit the fragment-stage side of every varying, in registration order.
  pub fn write_fragment_decls(&self, out: &mut String) {
    for varying in &self.varyings {
      let _ = varying.fs_in.write_decl(out);
      out.push_str(";\n");
    }
  }

  pub fn varyings(&self) -> &[Varying] {
    &self.varyings
  }
}
