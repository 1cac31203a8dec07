//! Append-only chain of equal-capacity segments.
//!
//! Segments live in an arena (`Vec<StaticStore>`) addressed by ordinal, so
//! locating the segment for a logical index is a single division rather
//! than a walk along forward links.
//!
//! # Invariants
//!
//! - Every segment has exactly `segment_capacity` slots per member.
//! - Every segment shares the chain's layout.
//! - Segments are only ever appended; none is removed or reordered.

use std::sync::Arc;

use colstore_types::Layout;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::static_store::StaticStore;

/// Split a logical index into `(segment ordinal, local index)`.
pub fn locate(index: usize, segment_capacity: usize) -> (usize, usize) {
    (index / segment_capacity, index % segment_capacity)
}

/// Ordered, append-only sequence of [`StaticStore`] segments.
#[derive(Clone, Debug)]
pub struct SegmentChain {
    layout: Arc<Layout>,
    segment_capacity: usize,
    segments: Vec<StaticStore>,
}

impl SegmentChain {
    /// Create an empty chain. No segment is allocated until
    /// [`grow_to_cover`](Self::grow_to_cover) or [`append`](Self::append).
    pub fn new(segment_capacity: usize, layout: Arc<Layout>) -> StoreResult<Self> {
        if segment_capacity == 0 {
            return Err(StoreError::Configuration(
                "segment capacity must be greater than zero".into(),
            ));
        }
        Ok(Self {
            layout,
            segment_capacity,
            segments: Vec::new(),
        })
    }

    /// Number of allocated segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if no segment has been allocated.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Slots per member in each segment.
    pub fn segment_capacity(&self) -> usize {
        self.segment_capacity
    }

    /// Addressable slots per member across all segments.
    pub fn capacity(&self) -> usize {
        self.segments.len().saturating_mul(self.segment_capacity)
    }

    /// The shared member layout.
    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    /// Split a logical index into `(segment ordinal, local index)`.
    pub fn locate(&self, index: usize) -> (usize, usize) {
        locate(index, self.segment_capacity)
    }

    /// The segment at `ordinal`.
    pub fn segment(&self, ordinal: usize) -> Option<&StaticStore> {
        self.segments.get(ordinal)
    }

    /// The segment at `ordinal`, mutably.
    pub fn segment_mut(&mut self, ordinal: usize) -> Option<&mut StaticStore> {
        self.segments.get_mut(ordinal)
    }

    /// All segments in chain order.
    pub fn segments(&self) -> &[StaticStore] {
        &self.segments
    }

    /// Append one freshly filled segment and return its ordinal.
    ///
    /// The chain is unchanged if the segment cannot be allocated.
    pub fn append(&mut self) -> StoreResult<usize> {
        let ordinal = self.segments.len();
        let segment = match self.segments.first() {
            Some(head) => head.clone_empty()?,
            None => StaticStore::allocate(self.segment_capacity, Arc::clone(&self.layout))?,
        };
        self.segments.push(segment);
        debug!(
            ordinal,
            segment_capacity = self.segment_capacity,
            "appended segment"
        );
        Ok(ordinal)
    }

    /// Append exactly as many segments as needed for `index` to become
    /// addressable. Returns the number of segments appended.
    pub fn grow_to_cover(&mut self, index: usize) -> StoreResult<usize> {
        let (ordinal, _) = self.locate(index);
        let mut appended = 0;
        while self.segments.len() <= ordinal {
            self.append()?;
            appended += 1;
        }
        Ok(appended)
    }
}
