//! Chunk lifecycle for the appender.
//!
//! Owns the one native chunk being filled, the row cursor within it, and
//! the exclusive right to (re)bind column bindings onto it. Bindings are
//! only ever valid between a [`ChunkState::begin`] and the next
//! `begin`/`take`; both transitions go through this type, so a stale view
//! cannot survive a chunk hand-off.

use quiver_vector::{DataChunk, LogicalType};

use crate::binding::VectorBinding;

#[derive(Debug)]
pub(crate) struct ChunkState {
    /// Boxed so bound vectors keep a stable address while the state moves.
    chunk: Option<Box<DataChunk>>,
    row: usize,
    capacity: usize,
}

impl ChunkState {
    pub(crate) const fn new(capacity: usize) -> Self {
        Self {
            chunk: None,
            row: 0,
            capacity,
        }
    }

    /// Engine-defined row capacity of each chunk.
    pub(crate) const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Row index the next value lands in.
    pub(crate) const fn row(&self) -> usize {
        self.row
    }

    /// Whether a chunk is currently open.
    pub(crate) const fn is_open(&self) -> bool {
        self.chunk.is_some()
    }

    /// Whether the current row is the chunk's last.
    pub(crate) const fn at_capacity(&self) -> bool {
        self.row >= self.capacity
    }

    /// Advance the row cursor. Returns the new row count.
    pub(crate) const fn advance_row(&mut self) -> usize {
        self.row += 1;
        self.row
    }

    /// Allocate a chunk for `types` and rebind every binding onto it.
    ///
    /// No-op if a chunk is already open. `types` and `bindings` must
    /// correspond index-for-index.
    ///
    /// # Panics
    ///
    /// Panics if `types.len() != bindings.len()`.
    pub(crate) fn begin(&mut self, types: &[LogicalType], bindings: &mut [VectorBinding]) {
        assert_eq!(
            types.len(),
            bindings.len(),
            "column types and bindings must correspond"
        );
        if self.chunk.is_some() {
            return;
        }
        tracing::trace!(columns = types.len(), capacity = self.capacity, "allocated chunk");
        let mut chunk = Box::new(DataChunk::new(types, self.capacity));
        for (index, binding) in bindings.iter_mut().enumerate() {
            binding.bind(chunk.vector_mut(index));
        }
        self.chunk = Some(chunk);
        self.row = 0;
    }

    /// Close the open chunk: unbind every binding, stamp the logical row
    /// count and hand the chunk out. Returns `None` if no chunk is open.
    pub(crate) fn take(&mut self, bindings: &mut [VectorBinding]) -> Option<Box<DataChunk>> {
        let mut chunk = self.chunk.take()?;
        for binding in bindings.iter_mut() {
            binding.unbind();
        }
        chunk.set_size(self.row);
        self.row = 0;
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptor;
    use quiver_vector::{TypeTag, Value};

    fn bindings_for(types: &[LogicalType]) -> Vec<VectorBinding> {
        types
            .iter()
            .map(|ty| {
                VectorBinding::new(TypeDescriptor::resolve(ty).expect("supported type"))
            })
            .collect()
    }

    #[test]
    fn test_begin_is_idempotent() {
        let types = [LogicalType::primitive(TypeTag::Integer)];
        let mut bindings = bindings_for(&types);
        let mut state = ChunkState::new(8);

        state.begin(&types, &mut bindings);
        bindings[0].data().write::<i32>(0, 11);
        state.advance_row();

        // A second begin keeps the open chunk and its contents.
        state.begin(&types, &mut bindings);
        assert_eq!(state.row(), 1);
        let chunk = state.take(&mut bindings).expect("chunk open");
        assert_eq!(chunk.size(), 1);
        assert_eq!(chunk.vector(0).value_at(0), Value::Int32(11));
    }

    #[test]
    fn test_take_resets_state() {
        let types = [LogicalType::primitive(TypeTag::Integer)];
        let mut bindings = bindings_for(&types);
        let mut state = ChunkState::new(4);

        assert!(state.take(&mut bindings).is_none());
        state.begin(&types, &mut bindings);
        state.advance_row();
        state.advance_row();
        let chunk = state.take(&mut bindings).expect("chunk open");
        assert_eq!(chunk.size(), 2);
        assert!(!state.is_open());
        assert_eq!(state.row(), 0);
    }

    #[test]
    fn test_at_capacity() {
        let types = [LogicalType::primitive(TypeTag::Integer)];
        let mut bindings = bindings_for(&types);
        let mut state = ChunkState::new(2);
        state.begin(&types, &mut bindings);
        assert!(!state.at_capacity());
        state.advance_row();
        state.advance_row();
        assert!(state.at_capacity());
    }
}
