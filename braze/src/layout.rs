//! Uniform block layout arithmetic.
//!
//! These functions reproduce the target GPU API's std140/std430 packing rules exactly. The same
//! offsets computed here are used by the data-upload path to write the uniform buffer, so any
//! deviation silently corrupts every member that follows the first misplaced one.

use crate::types::{ArrayCount, BlockLayout, Dim, MatrixDim, ShaderType};

/// Returns the base alignment mask in bytes a value of `ty` requires inside a uniform block.
///
/// `non_array` is true for a single scalar or vector, false for an array of them: under
/// [`BlockLayout::Std140`], scalars and 2-component vectors are promoted to 16-byte alignment
/// when they are array elements. A 2x2 matrix is special-cased to 8-byte alignment under
/// [`BlockLayout::Std430`], as an array of `vec2` columns.
///
/// # Panics
///
/// Panics when `ty` has no defined memory footprint (void and the opaque sampler/texture types).
pub fn alignment_mask(ty: ShaderType, non_array: bool, layout: BlockLayout) -> u32 {
  match ty {
    ShaderType::Bool(Dim::Scalar)
    | ShaderType::Int(Dim::Scalar)
    | ShaderType::UInt(Dim::Scalar)
    | ShaderType::Float(Dim::Scalar) => {
      // N - 1
      if layout == BlockLayout::Std430 || non_array {
        0x3
      } else {
        0xF
      }
    }

    ShaderType::Bool(Dim::D2)
    | ShaderType::Int(Dim::D2)
    | ShaderType::UInt(Dim::D2)
    | ShaderType::Float(Dim::D2) => {
      // 2N - 1
      if layout == BlockLayout::Std430 || non_array {
        0x7
      } else {
        0xF
      }
    }

    ShaderType::Bool(Dim::D3)
    | ShaderType::Bool(Dim::D4)
    | ShaderType::Int(Dim::D3)
    | ShaderType::Int(Dim::D4)
    | ShaderType::UInt(Dim::D3)
    | ShaderType::UInt(Dim::D4)
    | ShaderType::Float(Dim::D3)
    | ShaderType::Float(Dim::D4)
    | ShaderType::Matrix(MatrixDim::D33)
    | ShaderType::Matrix(MatrixDim::D44) => 0xF, // 4N - 1

    ShaderType::Matrix(MatrixDim::D22) => {
      // as an array of vec2
      if layout == BlockLayout::Std430 {
        0x7
      } else {
        0xF
      }
    }

    // This query is only valid for types with a memory representation.
    ShaderType::Sampler2D
    | ShaderType::Texture2D
    | ShaderType::Sampler
    | ShaderType::SubpassInput
    | ShaderType::Void => panic!("type {} has no uniform block layout", ty),
  }
}

/// Returns the size in bytes one element of `ty` takes up inside a uniform block.
///
/// This includes paddings between components, but not the padding at the end of the element; use
/// [`aligned_stride`] for the array element stride. 3x3 and 4x4 matrices are always stored as 3
/// or 4 columns padded to 16 bytes each.
///
/// # Panics
///
/// Panics when `ty` has no defined memory footprint (void and the opaque sampler/texture types).
pub fn size_of(ty: ShaderType, layout: BlockLayout) -> u32 {
  match ty {
    ShaderType::Bool(dim) | ShaderType::Int(dim) | ShaderType::UInt(dim) | ShaderType::Float(dim) => {
      4 * dim.components()
    }

    ShaderType::Matrix(MatrixDim::D22) => {
      // two vec2 columns, padded to a vec4 under std140
      if layout == BlockLayout::Std430 {
        8
      } else {
        16
      }
    }
    ShaderType::Matrix(MatrixDim::D33) => 3 * 16,
    ShaderType::Matrix(MatrixDim::D44) => 4 * 16,

    ShaderType::Sampler2D
    | ShaderType::Texture2D
    | ShaderType::Sampler
    | ShaderType::SubpassInput
    | ShaderType::Void => panic!("type {} has no uniform block layout", ty),
  }
}

/// Given the current offset into the uniform block, returns the offset the next member of type
/// `ty` must start at, honoring all alignment requirements.
///
/// Use the aligned offset plus [`aligned_stride`] to get the offset past the end of the new
/// member.
pub fn aligned_offset(offset: u32, ty: ShaderType, array_count: ArrayCount, layout: BlockLayout) -> u32 {
  if let ArrayCount::Sized(n) = array_count {
    debug_assert!(n >= 1);
  }
  let mask = alignment_mask(ty, array_count == ArrayCount::NonArray, layout);
  (offset + mask) & !mask
}

/// Returns the total stride in bytes a member of type `ty` takes up inside a uniform block.
///
/// For a non-array this equals [`size_of`]. For arrays, [`BlockLayout::Std430`] uses the tight
/// element size, while [`BlockLayout::Std140`] rounds every element up to a 16-byte multiple
/// regardless of the underlying type.
///
/// # Panics
///
/// Panics when `ty` has no defined memory footprint, or when `array_count` is
/// [`ArrayCount::Unsized`] (unsized arrays have no block stride).
pub fn aligned_stride(ty: ShaderType, array_count: ArrayCount, layout: BlockLayout) -> u32 {
  match array_count {
    ArrayCount::NonArray => size_of(ty, layout),

    ArrayCount::Sized(n) => {
      debug_assert!(n >= 1);
      let element_size = if layout == BlockLayout::Std430 {
        size_of(ty, BlockLayout::Std430)
      } else {
        // std140, round up to vec4; sizes above 16 are already multiples of 16
        size_of(ty, BlockLayout::Std140).max(16)
      };
      debug_assert!(layout == BlockLayout::Std430 || element_size & 0xF == 0);
      element_size * n
    }

    ArrayCount::Unsized => panic!("unsized arrays have no uniform block stride"),
  }
}
