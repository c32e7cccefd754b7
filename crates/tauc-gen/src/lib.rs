//! Emits C source from a parsed `tau` module: one pass for the header,
//! one for the body, sharing a single [`emitter::EmitContext`] so
//! name qualification sees the same scope bindings across both.

pub mod emitter;
pub mod error;

pub use emitter::{EmitContext, EmitModule};
pub use error::{EmitError, EmitResult};
