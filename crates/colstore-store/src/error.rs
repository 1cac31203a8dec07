use colstore_types::TypeError;

/// Errors from store operations.
///
/// Every error is a usage error surfaced synchronously by the call that
/// triggered it. A failed write leaves all stored values untouched.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Invalid capacity or malformed member declaration at construction.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The member name is not declared in the store's layout.
    #[error("unknown member: {0}")]
    UnknownMember(String),

    /// The index is outside the currently addressable range.
    #[error("index {index} out of range for member '{member}' (addressable: {bound})")]
    IndexOutOfRange {
        member: String,
        index: usize,
        bound: usize,
    },

    /// Slicing and negative indexing are not part of the store interface.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// The written value does not match the member's element type or width.
    #[error("member '{member}': {source}")]
    Type {
        member: String,
        #[source]
        source: TypeError,
    },

    /// A fixed-capacity store has issued every index.
    #[error("store is full (capacity {capacity})")]
    Full { capacity: usize },

    /// `set_member`/`get_member` was called before any index was issued.
    #[error("no index has been issued yet")]
    NoActiveIndex,
}

/// Construction-time type errors are configuration errors; unsupported
/// index requests keep their own category.
impl From<TypeError> for StoreError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::Unsupported(what) => Self::NotSupported(what),
            other => Self::Configuration(other.to_string()),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
