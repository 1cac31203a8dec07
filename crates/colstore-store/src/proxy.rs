//! Member views over a segment chain.
//!
//! A proxy is bound to a chain and a member position only. Every call
//! re-derives `(segment, local index)` from the chain as it is at that
//! moment, so a proxy never observes a stale segment count.

use colstore_types::{ElementType, MemberDef, Value};

use crate::chain::SegmentChain;
use crate::column::Column;
use crate::error::{StoreError, StoreResult};
use crate::traits::{Member, MemberMut};

fn def(chain: &SegmentChain, slot: usize) -> &MemberDef {
    // Proxies are only built for positions resolved against this layout.
    &chain.layout().members()[slot]
}

fn read(chain: &SegmentChain, slot: usize, index: usize) -> StoreResult<Value> {
    let bound = chain.capacity();
    let out_of_range = || StoreError::IndexOutOfRange {
        member: def(chain, slot).name.to_string(),
        index,
        bound,
    };
    if index >= bound {
        return Err(out_of_range());
    }
    let (ordinal, local) = chain.locate(index);
    chain
        .segment(ordinal)
        .and_then(|segment| segment.column_at(slot))
        .ok_or_else(out_of_range)?
        .get(local)
}

fn iterate(chain: &SegmentChain, slot: usize) -> Box<dyn Iterator<Item = Value> + '_> {
    Box::new(
        chain
            .segments()
            .iter()
            .filter_map(move |segment| segment.column_at(slot))
            .flat_map(Column::iter),
    )
}

/// Shared view of one member of a [`DynamicStore`](crate::DynamicStore).
///
/// Indexable over `0..segment_count × segment_capacity`. Reads past the
/// allocated range fail; they never allocate.
#[derive(Clone, Copy)]
pub struct MemberProxy<'a> {
    chain: &'a SegmentChain,
    slot: usize,
}

impl<'a> MemberProxy<'a> {
    pub(crate) fn new(chain: &'a SegmentChain, slot: usize) -> Self {
        Self { chain, slot }
    }
}

impl Member for MemberProxy<'_> {
    fn name(&self) -> &str {
        &def(self.chain, self.slot).name
    }

    fn element_type(&self) -> ElementType {
        def(self.chain, self.slot).spec.element_type
    }

    fn width(&self) -> usize {
        def(self.chain, self.slot).spec.width
    }

    fn len(&self) -> usize {
        self.chain.capacity()
    }

    fn get(&self, index: usize) -> StoreResult<Value> {
        read(self.chain, self.slot, index)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = Value> + '_> {
        iterate(self.chain, self.slot)
    }
}

impl std::fmt::Debug for MemberProxy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberProxy")
            .field("member", &self.name())
            .field("len", &self.len())
            .finish()
    }
}

/// Exclusive view of one member of a [`DynamicStore`](crate::DynamicStore).
///
/// Writing at or past the addressable range is the growth trigger: exactly
/// enough segments are appended for the index to become addressable before
/// the value is stored.
pub struct MemberProxyMut<'a> {
    chain: &'a mut SegmentChain,
    slot: usize,
}

impl<'a> MemberProxyMut<'a> {
    pub(crate) fn new(chain: &'a mut SegmentChain, slot: usize) -> Self {
        Self { chain, slot }
    }

    /// Downgrade to a shared view.
    pub fn as_proxy(&self) -> MemberProxy<'_> {
        MemberProxy::new(self.chain, self.slot)
    }
}

impl Member for MemberProxyMut<'_> {
    fn name(&self) -> &str {
        &def(self.chain, self.slot).name
    }

    fn element_type(&self) -> ElementType {
        def(self.chain, self.slot).spec.element_type
    }

    fn width(&self) -> usize {
        def(self.chain, self.slot).spec.width
    }

    fn len(&self) -> usize {
        self.chain.capacity()
    }

    fn get(&self, index: usize) -> StoreResult<Value> {
        read(self.chain, self.slot, index)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = Value> + '_> {
        iterate(self.chain, self.slot)
    }
}

impl MemberMut for MemberProxyMut<'_> {
    fn set(&mut self, index: usize, value: Value) -> StoreResult<()> {
        let member = def(self.chain, self.slot);
        value
            .check(member.spec.element_type, member.spec.width)
            .map_err(|source| StoreError::Type {
                member: member.name.to_string(),
                source,
            })?;

        self.chain.grow_to_cover(index)?;
        let bound = self.chain.capacity();
        let (ordinal, local) = self.chain.locate(index);
        let slot = self.slot;
        match self
            .chain
            .segment_mut(ordinal)
            .and_then(|segment| segment.column_at_mut(slot))
        {
            Some(column) => column.set(local, value),
            None => Err(StoreError::IndexOutOfRange {
                member: def(self.chain, slot).name.to_string(),
                index,
                bound,
            }),
        }
    }
}

impl std::fmt::Debug for MemberProxyMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberProxyMut")
            .field("member", &self.name())
            .field("len", &self.len())
            .finish()
    }
}
