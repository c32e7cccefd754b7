//! Type registry, operator resolution tables, and lexical scope: the
//! shared mutable context grammar actions and the emitter both read and
//! write while turning a `tau` AST into typed, name-qualified C.
//!
//! Everything here is owned by one compilation. There's no cross-module
//! type sharing and no concurrent access to guard against — see the
//! crate-level note in `tauc-util` for why.

pub mod operators;
pub mod scope;
pub mod types;

pub use operators::{
    allowed_binary_operators, allowed_unary_operators, resolve_binary, resolve_unary,
    AllowedBinaryOperator, AllowedUnaryOperator, OperatorId,
};
pub use scope::{ItemInfo, Scope};
pub use types::{
    FieldDef, TypeDescriptor, TypeError, TypeId, TypeRegistry, TypeResult,
    UNTYPED_FLOAT_LITERAL, UNTYPED_INTEGER_LITERAL,
};
