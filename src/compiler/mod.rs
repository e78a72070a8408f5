//! Compiler Module
//!
//! Building blocks used by [`crate::codegen::Compiler`].
//!
//! ## Architecture
//! - `runtime`: Fixed assembly the generated program links against (preamble,
//!   entry trampoline, floor division helper, character output)
//! - `generators`: Per-node code generation for expressions and statements

pub mod generators;
pub mod runtime;
