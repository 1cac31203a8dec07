use thiserror::Error;

use crate::element::ElementType;

/// Errors produced by type operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypeError {
    #[error("unknown element type: {0}")]
    UnknownElementType(String),

    #[error("type mismatch: expected {expected}, got {actual}")]
    Mismatch {
        expected: ElementType,
        actual: String,
    },

    #[error("row width mismatch: expected {expected}, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("literal {literal} does not fit in {target}")]
    OutOfRange { literal: String, target: ElementType },

    #[error("invalid member spec: {0}")]
    InvalidSpec(String),

    #[error("invalid member name {name:?}: {reason}")]
    InvalidMember { name: String, reason: String },

    #[error("duplicate member: {0}")]
    DuplicateMember(String),

    #[error("not supported: {0}")]
    Unsupported(String),
}
