//! Shared value pool behind sparse and list fields.
//!
//! A pooled field stores a `u32` handle per entry. Handle 0 means "unset";
//! every other handle names a live value in the pool. Released handles are
//! reused before the pool grows.

use std::mem;

use colstore_types::Value;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValuePool {
    values: Vec<Option<Value>>,
    free: Vec<u32>,
}

impl ValuePool {
    pub(crate) fn new() -> Self {
        Self {
            values: vec![None],
            free: Vec::new(),
        }
    }

    /// The value behind `handle`, if it is live.
    pub(crate) fn get(&self, handle: u32) -> Option<&Value> {
        self.values.get(handle as usize).and_then(Option::as_ref)
    }

    /// Store `value` and return its handle. `None` once every `u32` handle
    /// is live.
    pub(crate) fn insert(&mut self, value: Value) -> Option<u32> {
        if let Some(handle) = self.free.pop() {
            self.values[handle as usize] = Some(value);
            return Some(handle);
        }
        let handle = u32::try_from(self.values.len()).ok()?;
        self.values.push(Some(value));
        Some(handle)
    }

    /// Overwrite the live value behind `handle`.
    pub(crate) fn replace(&mut self, handle: u32, value: Value) {
        if let Some(slot) = self.values.get_mut(handle as usize) {
            if slot.is_some() {
                *slot = Some(value);
            }
        }
    }

    /// Free `handle` for reuse. Handle 0 and dead handles are ignored.
    pub(crate) fn release(&mut self, handle: u32) {
        if handle == 0 {
            return;
        }
        if let Some(slot) = self.values.get_mut(handle as usize) {
            if slot.take().is_some() {
                self.free.push(handle);
            }
        }
    }

    /// Number of live values.
    pub(crate) fn len(&self) -> usize {
        self.values.len() - 1 - self.free.len()
    }

    pub(crate) fn heap_bytes(&self) -> usize {
        let rows: usize = self
            .values
            .iter()
            .flatten()
            .map(|value| match value {
                Value::Row(items) => items.capacity() * mem::size_of::<Value>(),
                _ => 0,
            })
            .sum();
        self.values.capacity() * mem::size_of::<Option<Value>>()
            + self.free.capacity() * mem::size_of::<u32>()
            + rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_zero_is_never_issued() {
        let mut pool = ValuePool::new();
        assert_eq!(pool.insert(Value::I64(5)), Some(1));
        assert_eq!(pool.get(0), None);
        assert_eq!(pool.get(1), Some(&Value::I64(5)));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn released_handles_are_reused() {
        let mut pool = ValuePool::new();
        let a = pool.insert(Value::I32(1)).unwrap();
        let b = pool.insert(Value::I32(2)).unwrap();
        pool.release(a);
        assert_eq!(pool.get(a), None);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.insert(Value::I32(3)), Some(a));
        assert_eq!(pool.get(b), Some(&Value::I32(2)));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn release_is_idempotent() {
        let mut pool = ValuePool::new();
        let a = pool.insert(Value::Bool(true)).unwrap();
        pool.release(a);
        pool.release(a);
        pool.release(0);
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.insert(Value::Bool(false)), Some(a));
        assert_eq!(pool.insert(Value::Bool(false)), Some(a + 1));
    }

    #[test]
    fn replace_only_touches_live_values() {
        let mut pool = ValuePool::new();
        let a = pool.insert(Value::F64(1.0)).unwrap();
        pool.replace(a, Value::F64(2.0));
        assert_eq!(pool.get(a), Some(&Value::F64(2.0)));
        pool.replace(9, Value::F64(3.0));
        assert_eq!(pool.get(9), None);
        assert_eq!(pool.len(), 1);
    }
}
