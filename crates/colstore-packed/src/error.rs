//! Error types for the packed store crate.

use colstore_store::StoreError;
use colstore_types::TypeError;

/// Errors that can occur during packed store operations.
#[derive(Debug, thiserror::Error)]
pub enum PackedError {
    /// Reference 0 is reserved and never holds an entry.
    #[error("the null reference has no entry")]
    NullRef,

    /// No entry exists for the reference.
    #[error("reference {0:016x} not found")]
    UnknownRef(u64),

    /// The field is not declared, or not visible through this entry view.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// The field was declared read-only.
    #[error("field is read-only: {0}")]
    ReadOnlyField(String),

    /// A field declaration was rejected at construction.
    #[error("invalid field '{name}': {reason}")]
    InvalidField { name: String, reason: String },

    /// Every pool handle of a sparse or list field is live.
    #[error("field '{0}' has no free pool handles")]
    PoolExhausted(String),

    /// Underlying store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<TypeError> for PackedError {
    fn from(err: TypeError) -> Self {
        Self::Store(StoreError::from(err))
    }
}

/// Convenience alias for packed store results.
pub type PackedResult<T> = Result<T, PackedError>;
