use colstore_types::{ElementType, Layout, Selector, Value};

use crate::error::{StoreError, StoreResult};

/// Read access to one named member of a store.
///
/// A member is indexable from `0` to `len() - 1`. Whether it is backed by a
/// single [`Column`](crate::Column) or spread over the segments of a
/// [`DynamicStore`](crate::DynamicStore) is invisible through this trait.
pub trait Member {
    /// Member name.
    fn name(&self) -> &str;

    /// Element type of every scalar in the member.
    fn element_type(&self) -> ElementType;

    /// Scalars per slot.
    fn width(&self) -> usize;

    /// Current addressable upper bound (exclusive).
    fn len(&self) -> usize;

    /// Returns `true` if no slot is addressable.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read slot `index`.
    ///
    /// Fails with [`StoreError::IndexOutOfRange`] when `index >= len()`.
    fn get(&self, index: usize) -> StoreResult<Value>;

    /// Iterate every addressable slot in ascending order.
    ///
    /// Each call starts a fresh pass from index 0.
    fn iter(&self) -> Box<dyn Iterator<Item = Value> + '_>;

    /// Read through a [`Selector`]. Negative indices and slices fail with
    /// [`StoreError::NotSupported`].
    fn get_at(&self, selector: impl Into<Selector>) -> StoreResult<Value>
    where
        Self: Sized,
    {
        let index = selector.into().resolve()?;
        self.get(index)
    }

    /// Collect every slot.
    fn to_vec(&self) -> Vec<Value> {
        self.iter().collect()
    }
}

/// Write access to one named member of a store.
pub trait MemberMut: Member {
    /// Write slot `index`.
    fn set(&mut self, index: usize, value: Value) -> StoreResult<()>;

    /// Write through a [`Selector`]. Negative indices and slices fail with
    /// [`StoreError::NotSupported`].
    fn set_at(&mut self, selector: impl Into<Selector>, value: impl Into<Value>) -> StoreResult<()>
    where
        Self: Sized,
    {
        let index = selector.into().resolve()?;
        self.set(index, value.into())
    }
}

impl<M: Member + ?Sized> Member for &M {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn element_type(&self) -> ElementType {
        (**self).element_type()
    }

    fn width(&self) -> usize {
        (**self).width()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, index: usize) -> StoreResult<Value> {
        (**self).get(index)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = Value> + '_> {
        (**self).iter()
    }
}

impl<M: Member + ?Sized> Member for &mut M {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn element_type(&self) -> ElementType {
        (**self).element_type()
    }

    fn width(&self) -> usize {
        (**self).width()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, index: usize) -> StoreResult<Value> {
        (**self).get(index)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = Value> + '_> {
        (**self).iter()
    }
}

impl<M: MemberMut + ?Sized> MemberMut for &mut M {
    fn set(&mut self, index: usize, value: Value) -> StoreResult<()> {
        (**self).set(index, value)
    }
}

/// Dictionary-like columnar container.
///
/// Implemented by [`StaticStore`](crate::StaticStore) and
/// [`DynamicStore`](crate::DynamicStore). Callers written against this trait
/// work with either.
///
/// Besides raw indexed access, every store keeps an allocation cursor:
/// [`next_index`](Store::next_index) hands out entry indices in ascending
/// order and [`set_member`](Store::set_member) writes at the most recently
/// issued one.
pub trait Store {
    /// Shared view of a member.
    type Member<'a>: Member
    where
        Self: 'a;

    /// Exclusive view of a member.
    type MemberMut<'a>: MemberMut
    where
        Self: 'a;

    /// Declared members.
    fn layout(&self) -> &Layout;

    /// Currently addressable slots per member.
    fn capacity(&self) -> usize;

    /// Access a member by name. Fails with [`StoreError::UnknownMember`] if
    /// `name` is not declared.
    fn member(&self, name: &str) -> StoreResult<Self::Member<'_>>;

    /// Mutably access a member by name.
    fn member_mut(&mut self, name: &str) -> StoreResult<Self::MemberMut<'_>>;

    /// Member names in declaration order.
    fn member_names(&self) -> Vec<&str> {
        self.layout().names().collect()
    }

    /// Issue the next entry index.
    fn next_index(&mut self) -> StoreResult<usize>;

    /// The index most recently returned by [`next_index`](Store::next_index).
    fn last_index(&self) -> Option<usize>;

    /// Number of indices issued so far.
    fn len(&self) -> usize;

    /// Returns `true` if no index has been issued.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indices that can still be issued.
    fn space(&self) -> usize;

    /// Bytes held by all member buffers.
    fn heap_bytes(&self) -> usize;

    /// Write `value` to `name` at [`last_index`](Store::last_index).
    fn set_member(&mut self, name: &str, value: impl Into<Value>) -> StoreResult<()>
    where
        Self: Sized,
    {
        let index = self.last_index().ok_or(StoreError::NoActiveIndex)?;
        self.member_mut(name)?.set(index, value.into())
    }

    /// Read `name` at [`last_index`](Store::last_index).
    fn get_member(&self, name: &str) -> StoreResult<Value> {
        let index = self.last_index().ok_or(StoreError::NoActiveIndex)?;
        self.member(name)?.get(index)
    }
}
