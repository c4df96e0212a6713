//! Shader variable descriptors.

use std::fmt;

use crate::types::{ArrayCount, ShaderType};

/// The storage qualifier a [`ShaderVar`] is declared with.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TypeModifier {
  /// A plain variable, e.g. a uniform block member.
  None,

  /// A stage input.
  In,

  /// A stage output.
  Out,

  /// A standalone uniform, e.g. an opaque sampler.
  Uniform,
}

impl TypeModifier {
  fn keyword(self) -> &'static str {
    match self {
      TypeModifier::None => "",
      TypeModifier::In => "in",
      TypeModifier::Out => "out",
      TypeModifier::Uniform => "uniform",
    }
  }
}

/// A single declared shading language variable.
///
/// A [`ShaderVar`] is a pure value: name, type, storage qualifier, array dimension and layout
/// qualifiers. It is constructed once by whichever component declares it and owned exclusively by
/// that component's collection; its only behavior is emitting its own declaration text via
/// [`ShaderVar::write_decl`]. Layout qualifiers may still be appended while the declaring
/// component is being built, but a variable is never mutated after that.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ShaderVar {
  name: String,
  ty: ShaderType,
  type_modifier: TypeModifier,
  array_count: ArrayCount,
  layout_qualifiers: Vec<String>,
  extra_modifiers: String,
}

impl ShaderVar {
  /// Create a new non-array variable.
  pub fn new(name: impl Into<String>, ty: ShaderType, type_modifier: TypeModifier) -> Self {
    Self::new_array(name, ty, type_modifier, ArrayCount::NonArray)
  }

  /// Create a new variable with an explicit array dimension.
  ///
  /// # Panics
  ///
  /// Panics if `name` is empty or `array_count` is `Sized(0)`.
  pub fn new_array(
    name: impl Into<String>,
    ty: ShaderType,
    type_modifier: TypeModifier,
    array_count: ArrayCount,
  ) -> Self {
    let name = name.into();
    assert!(!name.is_empty(), "shader variables cannot be unnamed");
    if let ArrayCount::Sized(n) = array_count {
      assert!(n >= 1, "sized arrays hold at least one element");
    }

    Self {
      name,
      ty,
      type_modifier,
      array_count,
      layout_qualifiers: Vec::new(),
      extra_modifiers: String::new(),
    }
  }

  /// The final (post-mangling) name used in emitted text.
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn ty(&self) -> ShaderType {
    self.ty
  }

  pub fn type_modifier(&self) -> TypeModifier {
    self.type_modifier
  }

  pub fn array_count(&self) -> ArrayCount {
    self.array_count
  }

  pub fn is_array(&self) -> bool {
    self.array_count != ArrayCount::NonArray
  }

  /// Append a layout qualifier fragment, e.g. `offset = 16` or `location = 0`.
  ///
  /// Qualifiers are emitted comma-separated inside a single `layout(…)` in append order.
  pub fn add_layout_qualifier(&mut self, qualifier: impl Into<String>) {
    self.layout_qualifiers.push(qualifier.into());
  }

  /// Set extra modifier text emitted between the layout qualifiers and the storage qualifier,
  /// e.g. an interpolation qualifier.
  pub fn set_extra_modifiers(&mut self, modifiers: impl Into<String>) {
    self.extra_modifiers = modifiers.into();
  }

  /// Write this variable's declaration, without the terminating `;`.
  pub fn write_decl(&self, f: &mut impl fmt::Write) -> fmt::Result {
    if !self.layout_qualifiers.is_empty() {
      f.write_str("layout(")?;
      f.write_str(&self.layout_qualifiers[0])?;
      for qualifier in &self.layout_qualifiers[1..] {
        write!(f, ", {}", qualifier)?;
      }
      f.write_str(") ")?;
    }

    if !self.extra_modifiers.is_empty() {
      write!(f, "{} ", self.extra_modifiers)?;
    }

    let keyword = self.type_modifier.keyword();
    if !keyword.is_empty() {
      write!(f, "{} ", keyword)?;
    }

    write!(f, "{} {}", self.ty, self.name)?;

    match self.array_count {
      ArrayCount::NonArray => Ok(()),
      ArrayCount::Sized(n) => write!(f, "[{}]", n),
      ArrayCount::Unsized => f.write_str("[]"),
    }
  }
}
