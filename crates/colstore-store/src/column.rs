//! The fixed-capacity column primitive.
//!
//! A [`Column`] is a preallocated, densely packed buffer of one element type
//! holding `len × width` scalars. It never grows: the slot count is fixed
//! when the column is allocated and every scalar starts as the member's fill
//! value.

use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

use colstore_types::{ElementType, MemberDef, TypeError, Value};

use crate::error::{StoreError, StoreResult};
use crate::traits::{Member, MemberMut};

/// Typed backing storage for a column.
#[derive(Clone, PartialEq)]
enum Buffer {
    Bool(Vec<bool>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U32(Vec<u32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

/// A vector of `len` copies of `fill`, without aborting on allocation failure.
fn repeat<T: Clone>(fill: T, len: usize) -> Result<Vec<T>, String> {
    let mut items = Vec::new();
    items
        .try_reserve_exact(len)
        .map_err(|e| format!("cannot allocate {len} elements: {e}"))?;
    items.resize(len, fill);
    Ok(items)
}

impl Buffer {
    fn filled(fill: &Value, len: usize) -> Result<Self, String> {
        let buffer = match *fill {
            Value::Bool(x) => Self::Bool(repeat(x, len)?),
            Value::I16(x) => Self::I16(repeat(x, len)?),
            Value::I32(x) => Self::I32(repeat(x, len)?),
            Value::I64(x) => Self::I64(repeat(x, len)?),
            Value::U32(x) => Self::U32(repeat(x, len)?),
            Value::F32(x) => Self::F32(repeat(x, len)?),
            Value::F64(x) => Self::F64(repeat(x, len)?),
            Value::Row(_) => return Err("fill value must be a scalar".into()),
        };
        Ok(buffer)
    }

    fn scalar(&self, pos: usize) -> Value {
        match self {
            Self::Bool(v) => Value::Bool(v[pos]),
            Self::I16(v) => Value::I16(v[pos]),
            Self::I32(v) => Value::I32(v[pos]),
            Self::I64(v) => Value::I64(v[pos]),
            Self::U32(v) => Value::U32(v[pos]),
            Self::F32(v) => Value::F32(v[pos]),
            Self::F64(v) => Value::F64(v[pos]),
        }
    }

    fn put(&mut self, pos: usize, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (Self::Bool(v), Value::Bool(x)) => v[pos] = *x,
            (Self::I16(v), Value::I16(x)) => v[pos] = *x,
            (Self::I32(v), Value::I32(x)) => v[pos] = *x,
            (Self::I64(v), Value::I64(x)) => v[pos] = *x,
            (Self::U32(v), Value::U32(x)) => v[pos] = *x,
            (Self::F32(v), Value::F32(x)) => v[pos] = *x,
            (Self::F64(v), Value::F64(x)) => v[pos] = *x,
            (buffer, other) => {
                return Err(TypeError::Mismatch {
                    expected: buffer.element_type(),
                    actual: other.to_string(),
                })
            }
        }
        Ok(())
    }

    fn element_type(&self) -> ElementType {
        match self {
            Self::Bool(_) => ElementType::Bool,
            Self::I16(_) => ElementType::I16,
            Self::I32(_) => ElementType::I32,
            Self::I64(_) => ElementType::I64,
            Self::U32(_) => ElementType::U32,
            Self::F32(_) => ElementType::F32,
            Self::F64(_) => ElementType::F64,
        }
    }

    fn heap_bytes(&self) -> usize {
        match self {
            Self::Bool(v) => v.capacity() * std::mem::size_of::<bool>(),
            Self::I16(v) => v.capacity() * std::mem::size_of::<i16>(),
            Self::I32(v) => v.capacity() * std::mem::size_of::<i32>(),
            Self::I64(v) => v.capacity() * std::mem::size_of::<i64>(),
            Self::U32(v) => v.capacity() * std::mem::size_of::<u32>(),
            Self::F32(v) => v.capacity() * std::mem::size_of::<f32>(),
            Self::F64(v) => v.capacity() * std::mem::size_of::<f64>(),
        }
    }
}

/// A fixed-capacity, homogeneous column of `len` slots.
#[derive(Clone, PartialEq)]
pub struct Column {
    name: Arc<str>,
    width: usize,
    len: usize,
    buffer: Buffer,
}

impl Column {
    /// Allocate a column of `len` slots for `def`, every scalar set to the
    /// member's fill value.
    ///
    /// Fails with [`StoreError::Configuration`] when the fill value does not
    /// match the element type, or when `len × width` scalars cannot be
    /// allocated.
    pub fn allocate(def: &MemberDef, len: usize) -> StoreResult<Self> {
        let configuration = |reason: String| {
            StoreError::Configuration(format!("member '{}': {reason}", def.name))
        };
        def.fill
            .check(def.spec.element_type, 1)
            .map_err(|e| configuration(format!("bad fill value: {e}")))?;
        let width = def.spec.width.max(1);
        let scalars = len.checked_mul(width).ok_or_else(|| {
            configuration(format!("{len} slots of width {width} exceed the address space"))
        })?;
        let buffer = Buffer::filled(&def.fill, scalars).map_err(configuration)?;
        Ok(Self {
            name: Arc::clone(&def.name),
            width,
            len,
            buffer,
        })
    }

    /// Read slot `index`.
    pub fn get(&self, index: usize) -> StoreResult<Value> {
        self.bounds_check(index)?;
        Ok(self.value_at(index))
    }

    /// Write slot `index`.
    ///
    /// The value is checked against the element type and width before any
    /// scalar is modified.
    pub fn set(&mut self, index: usize, value: Value) -> StoreResult<()> {
        self.bounds_check(index)?;
        self.check(&value)?;
        let base = index * self.width;
        let result = match &value {
            Value::Row(items) => items
                .iter()
                .enumerate()
                .try_for_each(|(k, item)| self.buffer.put(base + k, item)),
            scalar => self.buffer.put(base, scalar),
        };
        result.map_err(|source| self.type_error(source))
    }

    /// Check that `value` can be written to a slot of this column.
    pub fn check(&self, value: &Value) -> StoreResult<()> {
        value
            .check(self.buffer.element_type(), self.width)
            .map_err(|source| self.type_error(source))
    }

    /// Iterate over every slot in ascending order.
    pub fn iter(&self) -> ColumnIter<'_> {
        ColumnIter {
            column: self,
            next: 0,
        }
    }

    /// Bytes held by the backing buffer.
    pub fn heap_bytes(&self) -> usize {
        self.buffer.heap_bytes()
    }

    /// Read a slot known to be in range.
    fn value_at(&self, index: usize) -> Value {
        if self.width == 1 {
            return self.buffer.scalar(index);
        }
        let base = index * self.width;
        Value::Row((base..base + self.width).map(|pos| self.buffer.scalar(pos)).collect())
    }

    fn bounds_check(&self, index: usize) -> StoreResult<()> {
        if index >= self.len {
            return Err(StoreError::IndexOutOfRange {
                member: self.name.to_string(),
                index,
                bound: self.len,
            });
        }
        Ok(())
    }

    fn type_error(&self, source: TypeError) -> StoreError {
        StoreError::Type {
            member: self.name.to_string(),
            source,
        }
    }
}

impl Member for Column {
    fn name(&self) -> &str {
        &self.name
    }

    fn element_type(&self) -> ElementType {
        self.buffer.element_type()
    }

    fn width(&self) -> usize {
        self.width
    }

    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, index: usize) -> StoreResult<Value> {
        Column::get(self, index)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = Value> + '_> {
        Box::new(Column::iter(self))
    }
}

impl MemberMut for Column {
    fn set(&mut self, index: usize, value: Value) -> StoreResult<()> {
        Column::set(self, index, value)
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("element_type", &self.buffer.element_type())
            .field("width", &self.width)
            .field("len", &self.len)
            .finish()
    }
}

impl<'a> IntoIterator for &'a Column {
    type Item = Value;
    type IntoIter = ColumnIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator over the slots of a [`Column`].
#[derive(Clone, Debug)]
pub struct ColumnIter<'a> {
    column: &'a Column,
    next: usize,
}

impl Iterator for ColumnIter<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.next >= self.column.len {
            return None;
        }
        let value = self.column.value_at(self.next);
        self.next += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.column.len - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ColumnIter<'_> {}

impl FusedIterator for ColumnIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use colstore_types::{Layout, Literal, MemberSpec};

    fn column(spec: MemberSpec, len: usize) -> Column {
        let layout = Layout::new([("m", spec)]).unwrap();
        Column::allocate(layout.member(0).unwrap(), len).unwrap()
    }

    // -----------------------------------------------------------------------
    // Allocation
    // -----------------------------------------------------------------------

    #[test]
    fn preallocated_with_fill() {
        let col = column(MemberSpec::new(ElementType::I32).with_default(Literal::Int(-1)), 5);
        assert_eq!(col.len(), 5);
        assert!(col.iter().all(|v| v == Value::I32(-1)));
    }

    #[test]
    fn zero_fill_when_no_default() {
        let col = column(MemberSpec::new(ElementType::F64), 3);
        assert_eq!(col.get(2).unwrap(), Value::F64(0.0));
    }

    #[test]
    fn mismatched_fill_is_rejected() {
        let def = MemberDef {
            name: Arc::from("m"),
            spec: MemberSpec::new(ElementType::I32),
            fill: Value::F64(1.0),
        };
        assert!(matches!(
            Column::allocate(&def, 4),
            Err(StoreError::Configuration(_))
        ));
        let row_fill = MemberDef {
            fill: Value::from(vec![1i32, 2]),
            ..def
        };
        assert!(matches!(
            Column::allocate(&row_fill, 4),
            Err(StoreError::Configuration(_))
        ));
    }

    #[test]
    fn oversized_allocation_is_rejected() {
        let layout = Layout::new([
            ("wide", MemberSpec::new(ElementType::I64).with_width(4)),
            ("narrow", MemberSpec::new(ElementType::I64)),
        ])
        .unwrap();
        let huge = 1usize << (usize::BITS - 2);
        assert!(matches!(
            Column::allocate(layout.member(0).unwrap(), huge),
            Err(StoreError::Configuration(_))
        ));
        assert!(matches!(
            Column::allocate(layout.member(1).unwrap(), huge),
            Err(StoreError::Configuration(_))
        ));
    }

    #[test]
    fn heap_bytes_matches_layout() {
        let col = column(MemberSpec::new(ElementType::I64).with_width(4), 10);
        assert!(col.heap_bytes() >= 10 * 4 * 8);
    }

    // -----------------------------------------------------------------------
    // Get / set
    // -----------------------------------------------------------------------

    #[test]
    fn set_then_get() {
        let mut col = column(MemberSpec::new(ElementType::U32), 4);
        col.set(3, Value::U32(9)).unwrap();
        assert_eq!(col.get(3).unwrap(), Value::U32(9));
        assert_eq!(col.get(2).unwrap(), Value::U32(0));
    }

    #[test]
    fn out_of_range() {
        let mut col = column(MemberSpec::new(ElementType::I16), 2);
        assert!(matches!(
            col.get(2),
            Err(StoreError::IndexOutOfRange { index: 2, bound: 2, .. })
        ));
        assert!(matches!(
            col.set(7, Value::I16(1)),
            Err(StoreError::IndexOutOfRange { index: 7, .. })
        ));
    }

    #[test]
    fn wrong_type_leaves_column_untouched() {
        let mut col = column(MemberSpec::new(ElementType::I64), 2);
        let err = col.set(0, Value::F64(1.5)).unwrap_err();
        assert!(matches!(err, StoreError::Type { .. }));
        assert_eq!(col.get(0).unwrap(), Value::I64(0));
    }

    #[test]
    fn rows() {
        let mut col = column(MemberSpec::new(ElementType::I64).with_width(3), 2);
        col.set(1, Value::from(vec![1i64, 2, 3])).unwrap();
        assert_eq!(col.get(1).unwrap(), Value::from(vec![1i64, 2, 3]));
        assert_eq!(col.get(0).unwrap(), Value::from(vec![0i64, 0, 0]));

        let err = col.set(0, Value::from(vec![1i64, 2])).unwrap_err();
        assert!(matches!(err, StoreError::Type { .. }));
        let mixed = Value::Row(vec![Value::I64(1), Value::I64(2), Value::Bool(true)]);
        assert!(col.set(0, mixed).is_err());
        assert_eq!(col.get(0).unwrap(), Value::from(vec![0i64, 0, 0]));
    }

    // -----------------------------------------------------------------------
    // Iteration
    // -----------------------------------------------------------------------

    #[test]
    fn iteration_is_ordered_and_restartable() {
        let mut col = column(MemberSpec::new(ElementType::I32), 4);
        for i in 0..4 {
            col.set(i, Value::I32(i as i32 * 10)).unwrap();
        }
        let first: Vec<Value> = col.iter().collect();
        let second: Vec<Value> = (&col).into_iter().collect();
        assert_eq!(first, vec![Value::I32(0), Value::I32(10), Value::I32(20), Value::I32(30)]);
        assert_eq!(first, second);
        assert_eq!(col.iter().len(), 4);
    }

    #[test]
    fn debug_omits_data() {
        let col = column(MemberSpec::new(ElementType::Bool), 1);
        let debug = format!("{col:?}");
        assert!(debug.contains("Column"));
        assert!(debug.contains("Bool"));
    }
}
