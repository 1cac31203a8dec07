use std::fmt;
use std::ops::Range;

use crate::error::TypeError;

/// An index request against a store member.
///
/// Only non-negative single positions address a slot. Negative positions
/// and ranges are representable so that callers translating from other
/// indexing conventions get a clear [`TypeError::Unsupported`] rather than a
/// silently coerced position.
///
/// Unsigned positions keep their full `usize` value; they are never clamped
/// into the signed variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selector {
    /// A signed single position.
    Index(i64),
    /// A signed half-open range of positions.
    Range { start: i64, end: i64 },
    /// An unsigned single position.
    Position(usize),
    /// An unsigned half-open range of positions.
    PositionRange { start: usize, end: usize },
}

impl Selector {
    /// Resolve to a slot position.
    pub fn resolve(self) -> Result<usize, TypeError> {
        match self {
            Self::Index(i) if i >= 0 => {
                usize::try_from(i).map_err(|_| TypeError::Unsupported(format!("index {i} exceeds the address space")))
            }
            Self::Index(i) => Err(TypeError::Unsupported(format!("negative index {i}"))),
            Self::Position(i) => Ok(i),
            Self::Range { .. } | Self::PositionRange { .. } => {
                Err(TypeError::Unsupported(format!("slice {self}")))
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "[{i}]"),
            Self::Range { start, end } => write!(f, "[{start}..{end}]"),
            Self::Position(i) => write!(f, "[{i}]"),
            Self::PositionRange { start, end } => write!(f, "[{start}..{end}]"),
        }
    }
}

impl From<usize> for Selector {
    fn from(i: usize) -> Self {
        Self::Position(i)
    }
}

impl From<i64> for Selector {
    fn from(i: i64) -> Self {
        Self::Index(i)
    }
}

impl From<i32> for Selector {
    fn from(i: i32) -> Self {
        Self::Index(i64::from(i))
    }
}

impl From<Range<usize>> for Selector {
    fn from(r: Range<usize>) -> Self {
        Self::PositionRange {
            start: r.start,
            end: r.end,
        }
    }
}

impl From<Range<i64>> for Selector {
    fn from(r: Range<i64>) -> Self {
        Self::Range {
            start: r.start,
            end: r.end,
        }
    }
}
