//! Packed store: a reference-keyed map whose entries live in columns.
//!
//! A nested map of records is convenient but costs an allocation per record
//! and per field. A [`PackedStore`] keeps the map interface while storing
//! each field in a column of a [`DynamicStore`](colstore_store::DynamicStore),
//! so the per-entry overhead is one `(reference, index)` pair.
//!
//! # Key Types
//!
//! - [`PackedStore`] -- the reference to entry map
//! - [`Entry`] / [`EntryMut`] -- views of one entry's fields
//! - [`FieldSpec`] -- storage spec, [`FieldKind`] and read-only flag
//! - [`FieldUsage`] -- per-field read and write counts
//! - [`PackedConfig`] -- TOML-facing declaration of a store

pub mod entry;
pub mod error;
pub mod field;
mod pool;
mod storage;
pub mod store;

pub use entry::{Entry, EntryMut};
pub use error::{PackedError, PackedResult};
pub use field::{FieldKind, FieldSpec, FieldUsage, PackedConfig, DEFAULT_LOG2_ALLOCATION};
pub use store::{PackedStore, MODIFIED_FIELD, NULL_REF, RESERVED_PREFIX};
