//! Error types for C emission.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("no binary operator overload for {op} using ({left}, {right})")]
    NoBinaryOperator { op: String, left: String, right: String },

    #[error("no unary operator overload for {op} using {operand}")]
    NoUnaryOperator { op: String, operand: String },

    #[error("write failed: {0}")]
    Io(#[from] std::fmt::Error),
}

pub type EmitResult<T> = std::result::Result<T, EmitError>;
