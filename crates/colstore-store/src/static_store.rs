use std::fmt;
use std::sync::Arc;

use colstore_types::{Layout, MemberSpec};
use tracing::debug;

use crate::column::Column;
use crate::error::{StoreError, StoreResult};
use crate::traits::Store;

/// Fixed-capacity columnar store.
///
/// One preallocated [`Column`] of exactly `capacity` slots per declared
/// member. The capacity is fixed at construction and never changes; the
/// whole store is dropped as a unit.
#[derive(Clone)]
pub struct StaticStore {
    layout: Arc<Layout>,
    capacity: usize,
    columns: Vec<Column>,
    issued: usize,
    last: Option<usize>,
}

impl StaticStore {
    /// Create a store of `capacity` slots per member of `layout`.
    ///
    /// Fails with [`StoreError::Configuration`] when `capacity` is zero or
    /// its columns cannot be allocated.
    pub fn new(capacity: usize, layout: impl Into<Arc<Layout>>) -> StoreResult<Self> {
        if capacity == 0 {
            return Err(StoreError::Configuration(
                "capacity must be greater than zero".into(),
            ));
        }
        let store = Self::allocate(capacity, layout.into())?;
        debug!(
            capacity,
            members = store.layout.len(),
            "allocated static store"
        );
        Ok(store)
    }

    /// Create a store from `(name, spec)` member declarations.
    ///
    /// Malformed specs and invalid or duplicate names fail with
    /// [`StoreError::Configuration`].
    pub fn with_members<I, S>(capacity: usize, members: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = (S, MemberSpec)>,
        S: Into<String>,
    {
        Self::new(capacity, Layout::new(members)?)
    }

    /// Allocate without validating the capacity.
    pub(crate) fn allocate(capacity: usize, layout: Arc<Layout>) -> StoreResult<Self> {
        let columns = layout
            .members()
            .iter()
            .map(|def| Column::allocate(def, capacity))
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(Self {
            layout,
            capacity,
            columns,
            issued: 0,
            last: None,
        })
    }

    /// A store with the same layout and capacity and freshly filled columns.
    pub fn clone_empty(&self) -> StoreResult<Self> {
        Self::allocate(self.capacity, Arc::clone(&self.layout))
    }

    /// The column backing `name`.
    pub fn column(&self, name: &str) -> StoreResult<&Column> {
        let pos = self.position(name)?;
        Ok(&self.columns[pos])
    }

    /// The column backing `name`, mutably.
    pub fn column_mut(&mut self, name: &str) -> StoreResult<&mut Column> {
        let pos = self.position(name)?;
        Ok(&mut self.columns[pos])
    }

    /// All columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn column_at(&self, position: usize) -> Option<&Column> {
        self.columns.get(position)
    }

    pub(crate) fn column_at_mut(&mut self, position: usize) -> Option<&mut Column> {
        self.columns.get_mut(position)
    }

    /// The shared layout handle.
    pub fn shared_layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    fn position(&self, name: &str) -> StoreResult<usize> {
        self.layout
            .position(name)
            .ok_or_else(|| StoreError::UnknownMember(name.to_string()))
    }
}

impl Store for StaticStore {
    type Member<'a> = &'a Column;
    type MemberMut<'a> = &'a mut Column;

    fn layout(&self) -> &Layout {
        &self.layout
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn member(&self, name: &str) -> StoreResult<Self::Member<'_>> {
        self.column(name)
    }

    fn member_mut(&mut self, name: &str) -> StoreResult<Self::MemberMut<'_>> {
        self.column_mut(name)
    }

    fn next_index(&mut self) -> StoreResult<usize> {
        if self.issued >= self.capacity {
            return Err(StoreError::Full {
                capacity: self.capacity,
            });
        }
        let index = self.issued;
        self.issued += 1;
        self.last = Some(index);
        Ok(index)
    }

    fn last_index(&self) -> Option<usize> {
        self.last
    }

    fn len(&self) -> usize {
        self.issued
    }

    fn space(&self) -> usize {
        self.capacity - self.issued
    }

    fn heap_bytes(&self) -> usize {
        self.columns.iter().map(Column::heap_bytes).sum()
    }
}

impl fmt::Debug for StaticStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticStore")
            .field("capacity", &self.capacity)
            .field("members", &self.layout.names().collect::<Vec<_>>())
            .field("issued", &self.issued)
            .finish()
    }
}
