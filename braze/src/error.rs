//! Recoverable shader assembly errors.

use thiserror::Error;

/// Errors a build session can signal to the caller.
///
/// Only conditions the caller can reasonably react to are represented here; violating a
/// registration precondition (empty names, opaque types in a uniform block, re-entrant
/// finalization) is a bug in the calling code and panics instead.
#[derive(Debug, Error)]
pub enum ShaderError {
  /// A handle from another build session, or from a later registration than the session has.
  #[error("invalid handle {handle} (session has {count} registrations)")]
  InvalidHandle { handle: u32, count: u32 },

  /// The requested feature is not available under the session's capabilities.
  #[error("unsupported: {0}")]
  Unsupported(&'static str),
}
