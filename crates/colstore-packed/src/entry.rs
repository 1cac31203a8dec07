//! Dict-like views of one packed store entry.
//!
//! An entry is not a copy: every read and write goes straight to the
//! entry's slot in the underlying columns and pools.

use std::fmt;

use colstore_types::Value;

use crate::error::{PackedError, PackedResult};
use crate::storage::{Field, Storage};

/// Shared view of one entry.
///
/// A view exposes either every field or only the writable ones (see
/// [`PackedStore::modified`](crate::PackedStore::modified)).
#[derive(Clone, Copy)]
pub struct Entry<'a> {
    storage: &'a Storage,
    reference: u64,
    index: usize,
    first: usize,
}

impl<'a> Entry<'a> {
    /// A view of the fields from position `first` onwards.
    pub(crate) fn new(storage: &'a Storage, reference: u64, index: usize, first: usize) -> Self {
        Self {
            storage,
            reference,
            index,
            first,
        }
    }

    /// The entry's reference.
    pub fn reference(&self) -> u64 {
        self.reference
    }

    /// Read a visible field.
    pub fn get(&self, field: &str) -> PackedResult<Value> {
        let position = self.position(field)?;
        self.storage.read(position, self.index)
    }

    /// Returns `true` if `field` is visible through this view.
    pub fn contains(&self, field: &str) -> bool {
        self.position(field).is_ok()
    }

    /// Visible field names, read-only fields first.
    pub fn fields(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.visible().iter().map(Field::name)
    }

    /// Visible field values, in [`fields`](Self::fields) order.
    pub fn values(&self) -> PackedResult<Vec<Value>> {
        (self.first..self.storage.fields().len())
            .map(|position| self.storage.read(position, self.index))
            .collect()
    }

    /// Visible `(field, value)` pairs.
    pub fn items(&self) -> PackedResult<Vec<(&'a str, Value)>> {
        let storage = self.storage;
        self.visible()
            .iter()
            .zip(self.first..)
            .map(|(field, position)| Ok((field.name(), storage.read(position, self.index)?)))
            .collect()
    }

    /// Returns `true` if the entry was written after its first insertion.
    pub fn is_modified(&self) -> PackedResult<bool> {
        self.storage.is_modified(self.index)
    }

    fn visible(&self) -> &'a [Field] {
        let storage = self.storage;
        &storage.fields()[self.first..]
    }

    fn position(&self, field: &str) -> PackedResult<usize> {
        self.storage
            .position(field)
            .filter(|&position| position >= self.first)
            .ok_or_else(|| PackedError::UnknownField(field.to_string()))
    }
}

impl fmt::Debug for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("reference", &format_args!("{:016x}", self.reference))
            .field("index", &self.index)
            .field("fields", &self.fields().collect::<Vec<_>>())
            .finish()
    }
}

/// Exclusive view of one entry. Every successful write marks it modified.
pub struct EntryMut<'a> {
    storage: &'a mut Storage,
    reference: u64,
    index: usize,
}

impl<'a> EntryMut<'a> {
    pub(crate) fn new(storage: &'a mut Storage, reference: u64, index: usize) -> Self {
        Self {
            storage,
            reference,
            index,
        }
    }

    /// Downgrade to a shared view of every field.
    pub fn as_entry(&self) -> Entry<'_> {
        Entry::new(self.storage, self.reference, self.index, 0)
    }

    /// The entry's reference.
    pub fn reference(&self) -> u64 {
        self.reference
    }

    /// Read any field.
    pub fn get(&self, field: &str) -> PackedResult<Value> {
        self.as_entry().get(field)
    }

    /// Write a writable field.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> PackedResult<()> {
        let value = value.into();
        let position = self.storage.writable_position(field)?;
        self.storage.check(position, &value)?;
        self.storage.write(position, self.index, value)?;
        self.storage.set_modified(self.index, true)
    }

    /// Write several fields. Nothing is written unless every pair is valid.
    pub fn update<I, S>(&mut self, values: I) -> PackedResult<()>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        let mut writes = Vec::new();
        for (field, value) in values {
            let position = self.storage.writable_position(field.as_ref())?;
            self.storage.check(position, &value)?;
            writes.push((position, value));
        }
        if writes.is_empty() {
            return Ok(());
        }
        for (position, value) in writes {
            self.storage.write(position, self.index, value)?;
        }
        self.storage.set_modified(self.index, true)
    }
}

impl fmt::Debug for EntryMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryMut")
            .field("reference", &format_args!("{:016x}", self.reference))
            .field("index", &self.index)
            .finish()
    }
}
