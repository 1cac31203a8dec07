use std::fmt;
use std::sync::Arc;

use colstore_types::{Layout, MemberSpec};
use tracing::debug;

use crate::chain::SegmentChain;
use crate::error::{StoreError, StoreResult};
use crate::proxy::{MemberProxy, MemberProxyMut};
use crate::static_store::StaticStore;
use crate::traits::Store;

/// log2 of the default segment capacity.
pub const DEFAULT_LOG2_SEGMENT_CAPACITY: u32 = 11;

/// Default slots per member in each segment.
pub const DEFAULT_SEGMENT_CAPACITY: usize = 1 << DEFAULT_LOG2_SEGMENT_CAPACITY;

/// Growable columnar store built from a chain of fixed-capacity segments.
///
/// Behaves like a [`StaticStore`] of `segment_count × segment_capacity`
/// slots. No segment exists until the first write; writing at or beyond the
/// addressable range appends exactly enough segments to cover the index.
/// Reads never allocate.
#[derive(Clone)]
pub struct DynamicStore {
    chain: SegmentChain,
    issued: usize,
    last: Option<usize>,
}

impl DynamicStore {
    /// Create an empty store whose segments hold `segment_capacity` slots per
    /// member of `layout`.
    ///
    /// Fails with [`StoreError::Configuration`] when `segment_capacity` is
    /// zero.
    pub fn new(segment_capacity: usize, layout: impl Into<Arc<Layout>>) -> StoreResult<Self> {
        let chain = SegmentChain::new(segment_capacity, layout.into())?;
        debug!(
            segment_capacity,
            members = chain.layout().len(),
            "created dynamic store"
        );
        Ok(Self {
            chain,
            issued: 0,
            last: None,
        })
    }

    /// Create a store from `(name, spec)` member declarations.
    pub fn with_members<I, S>(segment_capacity: usize, members: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = (S, MemberSpec)>,
        S: Into<String>,
    {
        Self::new(segment_capacity, Layout::new(members)?)
    }

    /// Create a store with `2^log2` slots per segment.
    pub fn with_log2_segment_capacity(log2: u32, layout: impl Into<Arc<Layout>>) -> StoreResult<Self> {
        let segment_capacity = 1usize.checked_shl(log2).filter(|c| *c > 0).ok_or_else(|| {
            StoreError::Configuration(format!("log2 segment capacity {log2} exceeds the address space"))
        })?;
        Self::new(segment_capacity, layout)
    }

    /// Create a store with [`DEFAULT_SEGMENT_CAPACITY`].
    pub fn with_default_segments(layout: impl Into<Arc<Layout>>) -> StoreResult<Self> {
        Self::new(DEFAULT_SEGMENT_CAPACITY, layout)
    }

    /// Number of allocated segments.
    pub fn segment_count(&self) -> usize {
        self.chain.len()
    }

    /// Slots per member in each segment.
    pub fn segment_capacity(&self) -> usize {
        self.chain.segment_capacity()
    }

    /// The segment at `ordinal`.
    pub fn segment(&self, ordinal: usize) -> Option<&StaticStore> {
        self.chain.segment(ordinal)
    }

    fn position(&self, name: &str) -> StoreResult<usize> {
        self.chain
            .layout()
            .position(name)
            .ok_or_else(|| StoreError::UnknownMember(name.to_string()))
    }
}

impl Store for DynamicStore {
    type Member<'a> = MemberProxy<'a>;
    type MemberMut<'a> = MemberProxyMut<'a>;

    fn layout(&self) -> &Layout {
        self.chain.layout()
    }

    fn capacity(&self) -> usize {
        self.chain.capacity()
    }

    fn member(&self, name: &str) -> StoreResult<Self::Member<'_>> {
        let slot = self.position(name)?;
        Ok(MemberProxy::new(&self.chain, slot))
    }

    fn member_mut(&mut self, name: &str) -> StoreResult<Self::MemberMut<'_>> {
        let slot = self.position(name)?;
        Ok(MemberProxyMut::new(&mut self.chain, slot))
    }

    fn next_index(&mut self) -> StoreResult<usize> {
        let index = self.issued;
        if index >= self.chain.capacity() {
            self.chain.grow_to_cover(index)?;
        }
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
        usize::MAX
    }

    fn heap_bytes(&self) -> usize {
        self.chain.segments().iter().map(Store::heap_bytes).sum()
    }
}

impl fmt::Debug for DynamicStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicStore")
            .field("segment_capacity", &self.chain.segment_capacity())
            .field("segment_count", &self.chain.len())
            .field("members", &self.chain.layout().names().collect::<Vec<_>>())
            .field("issued", &self.issued)
            .finish()
    }
}
