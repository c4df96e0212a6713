//! Target-dependent shader generation capabilities.

use crate::types::BlockLayout;

/// What the target graphics API supports, as far as shader generation cares.
///
/// A [`ShaderCaps`] is selected once per build session and never mutated afterwards; every
/// decision the builders make that varies by backend goes through it.
#[derive(Clone, Copy, Debug)]
pub struct ShaderCaps {
  /// The `#version` directive value, e.g. `450`.
  pub glsl_version: u32,

  /// Packing convention for the per-draw uniform block.
  pub block_layout: BlockLayout,

  /// Whether uniform blocks and samplers carry explicit `binding = N` qualifiers.
  ///
  /// Off for targets that bind by name reflection after linking.
  pub use_uniform_binding: bool,

  /// Whether block members carry explicit `offset = N` qualifiers.
  pub use_block_member_offset: bool,

  /// Whether the target exposes input attachments (descriptor-set backends only).
  pub input_attachments: bool,

  /// Whether the target supports dual-source blending.
  pub dual_source_blending: bool,
}

impl Default for ShaderCaps {
  fn default() -> Self {
    ShaderCaps {
      glsl_version: 450,
      block_layout: BlockLayout::Std140,
      use_uniform_binding: true,
      use_block_member_offset: true,
      input_attachments: false,
      dual_source_blending: true,
    }
  }
}
