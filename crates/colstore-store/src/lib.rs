//! Columnar stores for colstore.
//!
//! A store replaces one object per record with one preallocated column per
//! named member, trading per-record mutability for a much smaller memory
//! footprint. Every member is indexable from `0` to the store's current
//! capacity.
//!
//! # Store Variants
//!
//! All variants implement the [`Store`] trait:
//!
//! - [`StaticStore`] -- fixed capacity set at construction
//! - [`DynamicStore`] -- grows by appending fixed-capacity segments to a
//!   [`SegmentChain`]; members are accessed through [`MemberProxy`] /
//!   [`MemberProxyMut`], which hide the segment boundaries
//!
//! # Design Rules
//!
//! 1. Capacity of a column never changes after allocation.
//! 2. Dynamic stores grow only on write; reads never allocate.
//! 3. Segments are appended, never removed or reordered.
//! 4. Unwritten slots read as the member's fill value.
//! 5. A rejected write leaves every stored value untouched.
//! 6. Negative indices and slices are rejected with
//!    [`StoreError::NotSupported`].

pub mod chain;
pub mod column;
pub mod config;
pub mod dynamic;
pub mod error;
pub mod proxy;
pub mod static_store;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use chain::SegmentChain;
pub use column::{Column, ColumnIter};
pub use config::StoreConfig;
pub use dynamic::{DynamicStore, DEFAULT_LOG2_SEGMENT_CAPACITY, DEFAULT_SEGMENT_CAPACITY};
pub use error::{StoreError, StoreResult};
pub use proxy::{MemberProxy, MemberProxyMut};
pub use static_store::StaticStore;
pub use traits::{Member, MemberMut, Store};
