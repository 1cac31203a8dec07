//! Columns, value pools and usage counters behind a packed store.
//!
//! Every field owns one member of a [`DynamicStore`]. Dense fields keep
//! their values in that member directly. Sparse and list fields keep a `u32`
//! pool handle there instead, with handle 0 standing for the field's default.

use std::iter;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use colstore_store::{DynamicStore, Member, MemberMut, Store, StoreError};
use colstore_types::{ElementType, Layout, MemberSpec, TypeError, Value};

use crate::error::{PackedError, PackedResult};
use crate::field::{FieldKind, FieldSpec, FieldUsage};
use crate::pool::ValuePool;
use crate::store::{MODIFIED_FIELD, RESERVED_PREFIX};

pub(crate) struct Field {
    name: Arc<str>,
    spec: FieldSpec,
    default: Value,
    pool: Option<ValuePool>,
    reads: AtomicUsize,
    writes: usize,
}

impl Field {
    fn new(name: String, spec: FieldSpec) -> PackedResult<Self> {
        let invalid = |reason: &str| PackedError::InvalidField {
            name: name.clone(),
            reason: reason.to_string(),
        };
        let (default, pool) = match spec.kind {
            FieldKind::Dense => (spec.member.slot_default()?, None),
            FieldKind::Sparse => (spec.member.slot_default()?, Some(ValuePool::new())),
            FieldKind::List => {
                if spec.member.width != 1 {
                    return Err(invalid("list fields have no fixed width"));
                }
                if spec.member.default.is_some() {
                    return Err(invalid("list fields default to an empty row"));
                }
                (Value::Row(Vec::new()), Some(ValuePool::new()))
            }
        };
        Ok(Self {
            name: name.into(),
            spec,
            default,
            pool,
            reads: AtomicUsize::new(0),
            writes: 0,
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn is_read_only(&self) -> bool {
        self.spec.read_only
    }

    pub(crate) fn usage(&self) -> FieldUsage {
        FieldUsage {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes,
        }
    }

    /// Live pool values, for pooled fields.
    pub(crate) fn pooled_values(&self) -> Option<usize> {
        self.pool.as_ref().map(ValuePool::len)
    }

    fn column_spec(&self) -> MemberSpec {
        match self.pool {
            Some(_) => MemberSpec::new(ElementType::U32),
            None => self.spec.member,
        }
    }
}

pub(crate) struct Storage {
    columns: DynamicStore,
    fields: Vec<Field>,
    read_only: usize,
}

impl Storage {
    /// Lay out read-only fields, then writable fields, then the hidden
    /// modified flag, and claim index 0 for the null reference.
    pub(crate) fn new<I, S>(fields: I, log2_allocation: u32) -> PackedResult<Self>
    where
        I: IntoIterator<Item = (S, FieldSpec)>,
        S: Into<String>,
    {
        let mut read_only = Vec::new();
        let mut writable = Vec::new();
        for (name, spec) in fields {
            let name: String = name.into();
            if name.starts_with(RESERVED_PREFIX) {
                return Err(PackedError::InvalidField {
                    name,
                    reason: format!("names starting with `{RESERVED_PREFIX}` are reserved"),
                });
            }
            let field = Field::new(name, spec)?;
            if spec.read_only {
                read_only.push(field);
            } else {
                writable.push(field);
            }
        }
        let read_only_count = read_only.len();
        let mut fields = read_only;
        fields.extend(writable);

        let modified = (MODIFIED_FIELD.to_string(), MemberSpec::new(ElementType::Bool));
        let layout = Layout::new(
            fields
                .iter()
                .map(|field| (field.name.to_string(), field.column_spec()))
                .chain(iter::once(modified)),
        )?;
        let mut columns = DynamicStore::with_log2_segment_capacity(log2_allocation, layout)?;
        columns.next_index()?;
        Ok(Self {
            columns,
            fields,
            read_only: read_only_count,
        })
    }

    pub(crate) fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub(crate) fn read_only(&self) -> usize {
        self.read_only
    }

    pub(crate) fn columns(&self) -> &DynamicStore {
        &self.columns
    }

    pub(crate) fn heap_bytes(&self) -> usize {
        let pooled: usize = self
            .fields
            .iter()
            .filter_map(|field| field.pool.as_ref())
            .map(ValuePool::heap_bytes)
            .sum();
        self.columns.heap_bytes() + pooled
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| &*field.name == name)
    }

    /// Position of a field that may be written after insertion.
    pub(crate) fn writable_position(&self, name: &str) -> PackedResult<usize> {
        let position = self
            .position(name)
            .ok_or_else(|| PackedError::UnknownField(name.to_string()))?;
        if position < self.read_only {
            return Err(PackedError::ReadOnlyField(name.to_string()));
        }
        Ok(position)
    }

    /// Check `value` against the field at `position` without storing it.
    pub(crate) fn check(&self, position: usize, value: &Value) -> PackedResult<()> {
        let field = &self.fields[position];
        let spec = field.spec.member;
        let checked = match field.spec.kind {
            FieldKind::Dense | FieldKind::Sparse => value.check(spec.element_type, spec.width),
            FieldKind::List => match value {
                Value::Row(items) => items
                    .iter()
                    .try_for_each(|item| item.check(spec.element_type, 1)),
                other => Err(TypeError::Mismatch {
                    expected: spec.element_type,
                    actual: other.to_string(),
                }),
            },
        };
        checked.map_err(|source| StoreError::Type {
            member: field.name.to_string(),
            source,
        })?;
        Ok(())
    }

    pub(crate) fn read(&self, position: usize, index: usize) -> PackedResult<Value> {
        let field = &self.fields[position];
        field.reads.fetch_add(1, Ordering::Relaxed);
        let stored = self.columns.member(&field.name)?.get(index)?;
        match &field.pool {
            None => Ok(stored),
            Some(pool) => {
                let handle = u32::try_from(stored)?;
                Ok(pool
                    .get(handle)
                    .cloned()
                    .unwrap_or_else(|| field.default.clone()))
            }
        }
    }

    /// Store a value that already passed [`check`](Self::check).
    ///
    /// Writing a pooled field's default frees its pool slot.
    pub(crate) fn write(&mut self, position: usize, index: usize, value: Value) -> PackedResult<()> {
        let field = &mut self.fields[position];
        field.writes += 1;
        let Some(pool) = field.pool.as_mut() else {
            self.columns.member_mut(&field.name)?.set(index, value)?;
            return Ok(());
        };

        let handle = u32::try_from(self.columns.member(&field.name)?.get(index)?)?;
        let next = if value == field.default {
            pool.release(handle);
            0
        } else if pool.get(handle).is_some() {
            pool.replace(handle, value);
            handle
        } else {
            pool.insert(value)
                .ok_or_else(|| PackedError::PoolExhausted(field.name.to_string()))?
        };
        if next != handle {
            self.columns
                .member_mut(&field.name)?
                .set(index, Value::U32(next))?;
        }
        Ok(())
    }

    /// Claim the next free index.
    pub(crate) fn allocate(&mut self) -> PackedResult<usize> {
        Ok(self.columns.next_index()?)
    }

    pub(crate) fn set_modified(&mut self, index: usize, modified: bool) -> PackedResult<()> {
        self.columns
            .member_mut(MODIFIED_FIELD)?
            .set(index, Value::Bool(modified))?;
        Ok(())
    }

    pub(crate) fn is_modified(&self, index: usize) -> PackedResult<bool> {
        Ok(self.columns.member(MODIFIED_FIELD)?.get(index)? == Value::Bool(true))
    }
}
