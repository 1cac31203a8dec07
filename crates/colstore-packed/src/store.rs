//! The reference-keyed packed store.
//!
//! Entries are addressed by a non-zero `u64` reference. Each reference maps
//! to one index of an underlying [`DynamicStore`](colstore_store::DynamicStore);
//! the entry's fields are the store's members at that index. Index 0 is
//! claimed at construction so that reference 0 can stand for "no entry".
//!
//! # Layout
//!
//! Read-only fields come first, then writable fields, then the hidden
//! `__modified__` flag. Field names starting with `__` are reserved.
//!
//! # Usage
//!
//! Reads through entry views and writes through inserts and updates are
//! counted per field. Dropping the store logs a warning for every field
//! that was never touched, and for every writable field that was never
//! written.

use std::collections::BTreeMap;
use std::fmt;

use colstore_store::Store;
use colstore_types::Value;
use tracing::{debug, warn};

use crate::entry::{Entry, EntryMut};
use crate::error::{PackedError, PackedResult};
use crate::field::{FieldSpec, FieldUsage};
use crate::storage::{Field, Storage};

/// The reference that never has an entry.
pub const NULL_REF: u64 = 0;

/// Prefix reserved for hidden bookkeeping fields.
pub const RESERVED_PREFIX: &str = "__";

/// Hidden per-entry flag: set once an entry is written after insertion.
pub const MODIFIED_FIELD: &str = "__modified__";

/// Dict-like map from reference to a columnar entry.
pub struct PackedStore {
    storage: Storage,
    refs: BTreeMap<u64, usize>,
}

impl PackedStore {
    /// Create an empty packed store.
    ///
    /// Storage grows `2^log2_allocation` entries at a time.
    pub fn new<I, S>(fields: I, log2_allocation: u32) -> PackedResult<Self>
    where
        I: IntoIterator<Item = (S, FieldSpec)>,
        S: Into<String>,
    {
        let storage = Storage::new(fields, log2_allocation)?;
        debug!(
            read_only = storage.read_only(),
            fields = storage.fields().len(),
            log2_allocation,
            "created packed store"
        );
        Ok(Self {
            storage,
            refs: BTreeMap::new(),
        })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Returns `true` if the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Returns `true` if `reference` has an entry. Never true for [`NULL_REF`].
    pub fn contains(&self, reference: u64) -> bool {
        reference != NULL_REF && self.refs.contains_key(&reference)
    }

    /// Every field name, read-only fields first.
    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.storage.fields().iter().map(Field::name)
    }

    /// Read-only field names.
    pub fn read_only_fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.storage.fields()[..self.storage.read_only()]
            .iter()
            .map(Field::name)
    }

    /// Writable field names.
    pub fn writable_fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.storage.fields()[self.storage.read_only()..]
            .iter()
            .map(Field::name)
    }

    /// Entries per allocation.
    pub fn segment_capacity(&self) -> usize {
        self.storage.columns().segment_capacity()
    }

    /// Slots allocated per field, including the reserved null slot.
    pub fn capacity(&self) -> usize {
        self.storage.columns().capacity()
    }

    /// Heap bytes held by the field columns and value pools.
    pub fn heap_bytes(&self) -> usize {
        self.storage.heap_bytes()
    }

    /// Read and write counts of `field`.
    pub fn usage(&self, field: &str) -> Option<FieldUsage> {
        let position = self.storage.position(field)?;
        Some(self.storage.fields()[position].usage())
    }

    /// Insert or update the entry for `reference`.
    ///
    /// A new reference takes the next free index and starts unmodified; an
    /// existing one is overwritten in place and marked modified. Fields not
    /// named in `values` keep their current (or default) value. Unknown
    /// field names are skipped. Returns `true` if the entry was created.
    pub fn insert<I, S>(&mut self, reference: u64, values: I) -> PackedResult<bool>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        if reference == NULL_REF {
            return Err(PackedError::NullRef);
        }

        let mut writes = Vec::new();
        for (name, value) in values {
            let name = name.as_ref();
            match self.storage.position(name) {
                Some(position) => {
                    self.storage.check(position, &value)?;
                    writes.push((position, value));
                }
                None => debug!(reference, field = name, "skipping unknown field"),
            }
        }

        let (index, created) = match self.refs.get(&reference) {
            Some(&index) => (index, false),
            None => {
                let index = self.storage.allocate()?;
                self.refs.insert(reference, index);
                debug!(reference, index, "allocated entry");
                (index, true)
            }
        };

        self.storage.set_modified(index, !created)?;
        for (position, value) in writes {
            self.storage.write(position, index, value)?;
        }
        Ok(created)
    }

    /// Shared view of the entry for `reference`.
    pub fn get(&self, reference: u64) -> PackedResult<Entry<'_>> {
        let index = self.index_of(reference)?;
        Ok(Entry::new(&self.storage, reference, index, 0))
    }

    /// Exclusive view of the entry for `reference`.
    pub fn get_mut(&mut self, reference: u64) -> PackedResult<EntryMut<'_>> {
        let index = self.index_of(reference)?;
        Ok(EntryMut::new(&mut self.storage, reference, index))
    }

    /// References in ascending order.
    pub fn refs(&self) -> impl Iterator<Item = u64> + '_ {
        self.refs.keys().copied()
    }

    /// Every entry, in reference order.
    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> + '_ {
        self.refs
            .iter()
            .map(move |(&reference, &index)| Entry::new(&self.storage, reference, index, 0))
    }

    /// Entries written since insertion.
    ///
    /// With `all_fields` unset the returned views expose only writable fields.
    pub fn modified(&self, all_fields: bool) -> impl Iterator<Item = Entry<'_>> + '_ {
        let first = if all_fields { 0 } else { self.storage.read_only() };
        self.refs
            .iter()
            .filter(move |&(_, &index)| matches!(self.storage.is_modified(index), Ok(true)))
            .map(move |(&reference, &index)| Entry::new(&self.storage, reference, index, first))
    }

    fn index_of(&self, reference: u64) -> PackedResult<usize> {
        if reference == NULL_REF {
            return Err(PackedError::NullRef);
        }
        self.refs
            .get(&reference)
            .copied()
            .ok_or(PackedError::UnknownRef(reference))
    }
}

impl Drop for PackedStore {
    fn drop(&mut self) {
        for field in self.storage.fields() {
            let usage = field.usage();
            if usage.reads + usage.writes == 0 {
                warn!(field = field.name(), "field was neither read nor written");
            }
            if !field.is_read_only() && usage.writes == 0 {
                warn!(field = field.name(), "writable field was never written");
            }
            if let Some(live) = field.pooled_values() {
                debug!(
                    field = field.name(),
                    live,
                    slots = self.capacity(),
                    "pooled field utilisation"
                );
            }
        }
    }
}

impl fmt::Debug for PackedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackedStore")
            .field("fields", &self.fields().collect::<Vec<_>>())
            .field("read_only", &self.storage.read_only())
            .field("entries", &self.refs.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
