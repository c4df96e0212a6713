//! Braze, deterministic assembly of linkable GPU shader programs.
//!
//! This crate is the shader-program assembly layer of a retained-mode rendering engine. Given a
//! pipeline of abstract geometry and fragment processing steps, it generates a complete pair of
//! shader sources (vertex + fragment stages), assigns a binary-exact memory layout to the uniform
//! data shared between the stages, and binds the interface variables crossing the stage boundary
//! with matching names, types and locations.
//!
//! # Motivation
//!
//! In typical engines, shader programs for composable draw pipelines cannot be hard-coded: the set
//! of uniforms, samplers and varyings a draw needs depends on which processing steps are composed
//! into it. The pieces that make such generated programs *correct* are not the text itself but the
//! bookkeeping around it:
//!
//! - The uniform block layout (std140/std430-style alignment, padding and array strides) must
//!   match, bit for bit, the layout the data-upload path assumes; any deviation corrupts every
//!   value that follows the first misplaced member.
//! - Varyings must be declared on both sides of the stage boundary with agreeing names and types,
//!   or the program will not link.
//! - Vertex attribute locations must mirror the vertex-input state configured on the GPU side,
//!   including multi-slot types such as matrices.
//! - Uniform names requested by independent steps must not collide, while lookups by the
//!   requesting step must still resolve.
//!
//! [`program::ProgramBuilder`] owns one build session: a [`uniform::UniformHandler`] and a
//! [`varying::VaryingHandler`] shared by a [`vertex::VertexShaderBuilder`] and a
//! [`fragment::FragmentShaderBuilder`]. Each session is independently constructed and consumed.
//! There is no global state, so independent sessions may run concurrently on different threads.
//!
//! # Determinism
//!
//! Everything the builder produces (mangled names, block offsets, sampler slots, attribute
//! locations, the source text itself) is a pure function of the registration order and the
//! [`caps::ShaderCaps`] selected for the session. Building the same pipeline twice yields
//! byte-identical sources and binding tables.

pub mod builder;
pub mod caps;
pub mod error;
pub mod fragment;
pub mod layout;
pub mod processor;
pub mod program;
pub mod swizzle;
pub mod types;
pub mod uniform;
pub mod var;
pub mod varying;
pub mod vertex;
