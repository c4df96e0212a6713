//! Shading language type model.

use std::fmt;

/// Dimension of a scalar or vector type.
///
/// Primitive types currently can have one of four dimensions:
///
/// - [`Dim::Scalar`]: designates a scalar value.
/// - [`Dim::D2`]: designates a 2D vector.
/// - [`Dim::D3`]: designates a 3D vector.
/// - [`Dim::D4`]: designates a 4D vector.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Dim {
  /// Scalar value.
  Scalar,

  /// 2D vector.
  D2,

  /// 3D vector.
  D3,

  /// 4D vector.
  D4,
}

impl Dim {
  /// Number of components.
  pub fn components(self) -> u32 {
    match self {
      Dim::Scalar => 1,
      Dim::D2 => 2,
      Dim::D3 => 3,
      Dim::D4 => 4,
    }
  }
}

/// Matrix dimension.
///
/// Only squared, single-precision floating matrices are supported, as those are the only matrix
/// shapes with defined uniform block layout rules in this crate.
///
/// > Note: matrices are expressed in column-major.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MatrixDim {
  /// Squared 2 dimension.
  D22,

  /// Squared 3 dimension.
  D33,

  /// Squared 4 dimension.
  D44,
}

impl MatrixDim {
  /// Number of columns.
  pub fn columns(self) -> u32 {
    match self {
      MatrixDim::D22 => 2,
      MatrixDim::D33 => 3,
      MatrixDim::D44 => 4,
    }
  }
}

/// A shading language data type.
///
/// This is the closed set of types a [`ShaderVar`](crate::var::ShaderVar) can carry. Transparent
/// types ([`ShaderType::Bool`], [`ShaderType::Int`], [`ShaderType::UInt`], [`ShaderType::Float`]
/// and [`ShaderType::Matrix`]) have a defined memory footprint inside a uniform block; opaque
/// types (samplers, textures, subpass inputs) and [`ShaderType::Void`] do not.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ShaderType {
  /// A boolean scalar or vector.
  Bool(Dim),

  /// An integral scalar or vector.
  Int(Dim),

  /// An unsigned integral scalar or vector.
  UInt(Dim),

  /// A floating scalar or vector.
  Float(Dim),

  /// A squared floating matrix.
  Matrix(MatrixDim),

  /// A combined texture + sampler, 2D flavor.
  Sampler2D,

  /// A sampled texture without sampler state.
  Texture2D,

  /// Pure sampler state.
  Sampler,

  /// An input attachment (subpass input), available on descriptor-set backends only.
  SubpassInput,

  /// No value; only valid as a function return type.
  Void,
}

impl ShaderType {
  /// Whether this type is a combined texture/sampler type.
  ///
  /// Such types go through sampler registration and are rejected by the block-uniform
  /// registration path.
  pub fn is_combined_sampler(self) -> bool {
    matches!(self, ShaderType::Sampler2D)
  }

  /// Whether a value of this type can live inside a uniform block.
  pub fn can_be_uniform_value(self) -> bool {
    matches!(
      self,
      ShaderType::Bool(_)
        | ShaderType::Int(_)
        | ShaderType::UInt(_)
        | ShaderType::Float(_)
        | ShaderType::Matrix(_)
    )
  }

  /// Whether this type is backed by integer hardware registers.
  ///
  /// Integer-based varyings must be flat-interpolated.
  pub fn is_integer_based(self) -> bool {
    matches!(
      self,
      ShaderType::Bool(_) | ShaderType::Int(_) | ShaderType::UInt(_)
    )
  }

  /// Number of vertex input locations a value of this type occupies.
  ///
  /// Matrices take one location per column; every other transparent type takes one. This must
  /// agree with the vertex-input-state configuration derived from the same attribute list on the
  /// GPU side.
  pub fn locations(self) -> u32 {
    match self {
      ShaderType::Matrix(dim) => dim.columns(),
      _ => 1,
    }
  }
}

impl fmt::Display for ShaderType {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let name = match *self {
      // booleans
      ShaderType::Bool(Dim::Scalar) => "bool",
      ShaderType::Bool(Dim::D2) => "bvec2",
      ShaderType::Bool(Dim::D3) => "bvec3",
      ShaderType::Bool(Dim::D4) => "bvec4",

      // ints
      ShaderType::Int(Dim::Scalar) => "int",
      ShaderType::Int(Dim::D2) => "ivec2",
      ShaderType::Int(Dim::D3) => "ivec3",
      ShaderType::Int(Dim::D4) => "ivec4",

      // uints
      ShaderType::UInt(Dim::Scalar) => "uint",
      ShaderType::UInt(Dim::D2) => "uvec2",
      ShaderType::UInt(Dim::D3) => "uvec3",
      ShaderType::UInt(Dim::D4) => "uvec4",

      // floats
      ShaderType::Float(Dim::Scalar) => "float",
      ShaderType::Float(Dim::D2) => "vec2",
      ShaderType::Float(Dim::D3) => "vec3",
      ShaderType::Float(Dim::D4) => "vec4",

      // matrices
      ShaderType::Matrix(MatrixDim::D22) => "mat2",
      ShaderType::Matrix(MatrixDim::D33) => "mat3",
      ShaderType::Matrix(MatrixDim::D44) => "mat4",

      // opaque types
      ShaderType::Sampler2D => "sampler2D",
      ShaderType::Texture2D => "texture2D",
      ShaderType::Sampler => "sampler",
      ShaderType::SubpassInput => "subpassInput",
      ShaderType::Void => "void",
    };

    f.write_str(name)
  }
}

/// Array dimension of a declared variable.
///
/// A non-array variable never emits `[]`; an [`ArrayCount::Unsized`] variable emits `[]` and is
/// only meaningful for interface blocks whose size is implied elsewhere.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ArrayCount {
  /// Not an array.
  NonArray,

  /// An array with the given number of elements, at least 1.
  Sized(u32),

  /// An unsized array.
  Unsized,
}

/// Uniform block layout conventions.
///
/// [`BlockLayout::Std140`] pads array elements and small types up to 16-byte multiples;
/// [`BlockLayout::Std430`] packs them tightly. The convention is selected once per build session
/// and must be threaded consistently into every layout computation of that session.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BlockLayout {
  /// Padded-to-16 convention, the only one accepted for uniform buffers on GL backends.
  Std140,

  /// Tight convention, usable for storage buffers and push constants.
  Std430,
}

bitflags::bitflags! {
  /// The shader stages a uniform is visible from.
  #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
  pub struct ShaderStages: u32 {
    /// Visible from the vertex stage.
    const VERTEX = 1 << 0;

    /// Visible from the fragment stage.
    const FRAGMENT = 1 << 1;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn glsl_names() {
    assert_eq!(ShaderType::Float(Dim::D3).to_string(), "vec3");
    assert_eq!(ShaderType::UInt(Dim::Scalar).to_string(), "uint");
    assert_eq!(ShaderType::Matrix(MatrixDim::D44).to_string(), "mat4");
    assert_eq!(ShaderType::Sampler2D.to_string(), "sampler2D");
  }

  #[test]
  fn location_slots() {
    assert_eq!(ShaderType::Float(Dim::D4).locations(), 1);
    assert_eq!(ShaderType::Matrix(MatrixDim::D22).locations(), 2);
    assert_eq!(ShaderType::Matrix(MatrixDim::D44).locations(), 4);
  }

  #[test]
  fn integer_types_are_flagged() {
    assert!(ShaderType::Int(Dim::D2).is_integer_based());
    assert!(ShaderType::Bool(Dim::Scalar).is_integer_based());
    assert!(!ShaderType::Float(Dim::D2).is_integer_based());
    assert!(!ShaderType::Matrix(MatrixDim::D33).is_integer_based());
  }
}
