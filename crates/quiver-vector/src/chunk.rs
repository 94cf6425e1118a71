//! Fixed-capacity data chunks.

use crate::types::LogicalType;
use crate::value::Value;
use crate::vector::Vector;

/// Default engine vector capacity, in rows.
pub const DEFAULT_VECTOR_CAPACITY: usize = 2048;

/// One unit of bulk-load data: a fixed-capacity vector per column.
///
/// A chunk is allocated against a column type list, filled in place through
/// its vectors' raw payload pointers, stamped with its logical row count and
/// handed to an appender handle. The logical [`size`](Self::size) may be
/// anything up to the capacity; rows past it are ignored by the consumer.
#[derive(Debug)]
pub struct DataChunk {
    columns: Vec<Vector>,
    capacity: usize,
    size: usize,
}

impl DataChunk {
    /// Allocate a chunk with one vector per entry of `types`.
    #[must_use]
    pub fn new(types: &[LogicalType], capacity: usize) -> Self {
        Self {
            columns: types.iter().map(|ty| Vector::new(ty, capacity)).collect(),
            capacity,
            size: 0,
        }
    }

    /// Number of column vectors.
    #[must_use]
    pub const fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Row capacity shared by every column vector.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Logical row count, as set by [`Self::set_size`].
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Stamp the logical row count before handing the chunk off.
    ///
    /// # Panics
    ///
    /// Panics if `size` exceeds the chunk capacity.
    pub fn set_size(&mut self, size: usize) {
        assert!(size <= self.capacity, "chunk size exceeds capacity");
        self.size = size;
    }

    /// Column vector at `index`.
    #[must_use]
    pub fn vector(&self, index: usize) -> &Vector {
        &self.columns[index]
    }

    /// Column vector at `index`, writable.
    #[must_use]
    pub fn vector_mut(&mut self, index: usize) -> &mut Vector {
        &mut self.columns[index]
    }

    /// Decode row `row` across all columns.
    #[must_use]
    pub fn row_values(&self, row: usize) -> Vec<Value> {
        self.columns.iter().map(|v| v.value_at(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeTag;

    #[test]
    fn test_chunk_allocation() {
        let types = [
            LogicalType::primitive(TypeTag::Integer),
            LogicalType::primitive(TypeTag::Varchar),
        ];
        let chunk = DataChunk::new(&types, 16);
        assert_eq!(chunk.column_count(), 2);
        assert_eq!(chunk.capacity(), 16);
        assert_eq!(chunk.size(), 0);
    }

    #[test]
    fn test_set_size() {
        let types = [LogicalType::primitive(TypeTag::Integer)];
        let mut chunk = DataChunk::new(&types, 16);
        chunk.set_size(7);
        assert_eq!(chunk.size(), 7);
    }

    #[test]
    #[should_panic(expected = "exceeds capacity")]
    fn test_set_size_over_capacity_panics() {
        let types = [LogicalType::primitive(TypeTag::Integer)];
        let mut chunk = DataChunk::new(&types, 16);
        chunk.set_size(17);
    }
}
