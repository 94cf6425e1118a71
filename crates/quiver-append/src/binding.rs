//! Per-column bindings into the current chunk's vector memory.
//!
//! A [`VectorBinding`] pairs a column's [`TypeDescriptor`] with raw,
//! bounds-checked views into the chunk that is currently being filled: the
//! payload pointer, the lazily created validity bitmap and, for lists, the
//! child vector's payload. Bindings are rebound every time a chunk is
//! allocated and unbound before it is handed off; a view must never be used
//! outside the lifetime of its owning chunk. All raw-pointer access in the
//! crate is confined to this module.

use std::ptr::NonNull;

use quiver_vector::Vector;

use crate::descriptor::TypeDescriptor;

/// Bounds-checked typed view over a vector's fixed-width payload buffer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawData {
    ptr: NonNull<u8>,
    rows: usize,
}

impl RawData {
    fn from_vector(vector: &mut Vector) -> Self {
        Self {
            ptr: vector.data_ptr(),
            rows: vector.capacity(),
        }
    }

    /// Write one fixed-width value at `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row` is outside the chunk's row range.
    pub(crate) fn write<T: Copy>(&mut self, row: usize, value: T) {
        assert!(row < self.rows, "row {row} outside chunk capacity");
        // SAFETY: the pointer covers `rows` values of the column's payload
        // width, `row` is in range (asserted above), and the owning chunk is
        // alive for as long as this binding is bound.
        unsafe {
            self.ptr.cast::<T>().as_ptr().add(row).write_unaligned(value);
        }
    }

    /// Bulk-write `values` starting at element offset `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + values.len()` exceeds the view's element range.
    pub(crate) fn write_slice<T: Copy>(&mut self, offset: usize, values: &[T]) {
        assert!(
            offset + values.len() <= self.rows,
            "slice write outside reserved child range"
        );
        // SAFETY: range checked above; source and destination cannot overlap
        // because the source is caller-owned input, not vector memory.
        unsafe {
            std::ptr::copy_nonoverlapping(
                values.as_ptr(),
                self.ptr.cast::<T>().as_ptr().add(offset),
                values.len(),
            );
        }
    }

    /// Write an already-encoded fixed-width payload at `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    pub(crate) fn write_bytes(&mut self, row: usize, bytes: &[u8]) {
        assert!(row < self.rows, "row {row} outside chunk capacity");
        // SAFETY: as in `write`; the destination slot is `bytes.len()` wide
        // by construction (the caller encodes exactly one payload).
        unsafe {
            std::ptr::copy_nonoverlapping(
                bytes.as_ptr(),
                self.ptr.as_ptr().add(row * bytes.len()),
                bytes.len(),
            );
        }
    }
}

/// Bounds-checked view over a validity bitmap.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ValidityView {
    ptr: NonNull<u64>,
    rows: usize,
}

impl ValidityView {
    /// Clear `row`'s bit, marking the value NULL.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of range.
    pub(crate) fn set_row_invalid(&mut self, row: usize) {
        assert!(row < self.rows, "row {row} outside chunk capacity");
        // SAFETY: the bitmap holds ceil(rows / 64) words and row / 64 is in
        // range; the owning vector is alive while the binding is bound.
        unsafe {
            let word = self.ptr.as_ptr().add(row / 64);
            *word &= !(1u64 << (row % 64));
        }
    }
}

/// One output column's descriptor plus its views into the current chunk.
#[derive(Debug)]
pub(crate) struct VectorBinding {
    descriptor: TypeDescriptor,
    /// Handle to the column's vector inside the current chunk. `None`
    /// whenever no chunk is open.
    vector: Option<NonNull<Vector>>,
    data: Option<RawData>,
    /// Created lazily by the first NULL written into this chunk.
    validity: Option<ValidityView>,
    /// List child payload view. Refreshed after every reserve, which may
    /// reallocate the child buffer.
    child_data: Option<RawData>,
}

impl VectorBinding {
    pub(crate) const fn new(descriptor: TypeDescriptor) -> Self {
        Self {
            descriptor,
            vector: None,
            data: None,
            validity: None,
            child_data: None,
        }
    }

    pub(crate) const fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Consume the binding, returning its descriptor.
    pub(crate) fn into_descriptor(self) -> TypeDescriptor {
        self.descriptor
    }

    /// Rebind onto a freshly allocated chunk's column vector.
    ///
    /// Clears the cached validity view: a new chunk starts all-valid and
    /// the bitmap is recreated lazily on the first null write.
    ///
    /// # Safety contract (enforced by the caller, the chunk state)
    ///
    /// `vector` must stay at a stable address and outlive every use of this
    /// binding until [`Self::unbind`] is called. The chunk state guarantees
    /// this by keeping the chunk boxed in place and unbinding all bindings
    /// before the chunk is handed off or dropped.
    pub(crate) fn bind(&mut self, vector: &mut Vector) {
        self.data = Some(RawData::from_vector(vector));
        self.validity = None;
        self.child_data = if matches!(self.descriptor, TypeDescriptor::List(_)) {
            Some(RawData::from_vector(vector.list_child_mut()))
        } else {
            None
        };
        self.vector = Some(NonNull::from(vector));
    }

    /// Drop all views; the binding holds only its descriptor afterwards.
    pub(crate) fn unbind(&mut self) {
        self.vector = None;
        self.data = None;
        self.validity = None;
        self.child_data = None;
    }

    fn vector_mut(&mut self) -> &mut Vector {
        let ptr = self.vector.expect("binding is bound to a chunk");
        // SAFETY: bound vectors stay at a stable address until unbind (see
        // `bind`); the returned borrow is tied to `&mut self`, so no second
        // mutable path to the vector exists while it is alive.
        unsafe { &mut *ptr.as_ptr() }
    }

    /// Payload view of the column vector.
    ///
    /// # Panics
    ///
    /// Panics if the binding is not bound; writes only happen with an open
    /// chunk.
    pub(crate) fn data(&mut self) -> &mut RawData {
        self.data.as_mut().expect("binding is bound to a chunk")
    }

    /// Mark `row` NULL, creating the validity bitmap on first use.
    pub(crate) fn set_null(&mut self, row: usize) {
        if self.validity.is_none() {
            let rows = self.vector_mut().capacity();
            let ptr = self.vector_mut().ensure_validity();
            self.validity = Some(ValidityView { ptr, rows });
        }
        self.validity
            .as_mut()
            .expect("validity created above")
            .set_row_invalid(row);
    }

    /// Store a variable-length payload at `row`.
    pub(crate) fn assign_string(&mut self, row: usize, bytes: &[u8]) {
        self.vector_mut().assign_string_element(row, bytes);
    }

    /// Current logical element count of the list child.
    pub(crate) fn list_size(&mut self) -> usize {
        self.vector_mut().list_size()
    }

    /// Publish the list child's new logical element count.
    pub(crate) fn set_list_size(&mut self, size: usize) {
        self.vector_mut().set_list_size(size);
    }

    /// Ensure the list child can hold `required` elements and refresh the
    /// cached child view (reserve may reallocate the child buffer).
    pub(crate) fn list_reserve(&mut self, required: usize) {
        let vector = self.vector_mut();
        vector.list_reserve(required);
        let child = RawData::from_vector(vector.list_child_mut());
        self.child_data = Some(child);
    }

    /// Payload view of the list child vector.
    ///
    /// # Panics
    ///
    /// Panics if the binding is not bound or not a list column.
    pub(crate) fn child_data(&mut self) -> &mut RawData {
        self.child_data
            .as_mut()
            .expect("list binding is bound to a chunk")
    }

    /// Store a variable-length payload at child element `index`.
    pub(crate) fn assign_child_string(&mut self, index: usize, bytes: &[u8]) {
        self.vector_mut()
            .list_child_mut()
            .assign_string_element(index, bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiver_vector::{LogicalType, TypeTag, Value};

    fn bound(ty: &LogicalType, capacity: usize) -> (Box<Vector>, VectorBinding) {
        let descriptor = TypeDescriptor::resolve(ty).expect("supported type");
        let mut vector = Box::new(Vector::new(ty, capacity));
        let mut binding = VectorBinding::new(descriptor);
        binding.bind(&mut vector);
        (vector, binding)
    }

    #[test]
    fn test_write_through_binding() {
        let ty = LogicalType::primitive(TypeTag::BigInt);
        let (vector, mut binding) = bound(&ty, 4);
        binding.data().write::<i64>(3, -9);
        binding.unbind();
        assert_eq!(vector.value_at(3), Value::Int64(-9));
    }

    #[test]
    #[should_panic(expected = "outside chunk capacity")]
    fn test_out_of_bounds_write_panics() {
        let ty = LogicalType::primitive(TypeTag::Integer);
        let (_vector, mut binding) = bound(&ty, 4);
        binding.data().write::<i32>(4, 1);
    }

    #[test]
    fn test_lazy_validity() {
        let ty = LogicalType::primitive(TypeTag::Integer);
        let (vector, mut binding) = bound(&ty, 4);
        binding.set_null(2);
        binding.unbind();
        assert_eq!(vector.value_at(2), Value::Null);
        assert_eq!(vector.value_at(1), Value::Int32(0));
    }

    #[test]
    fn test_rebind_clears_validity() {
        let ty = LogicalType::primitive(TypeTag::Integer);
        let (vector, mut binding) = bound(&ty, 4);
        binding.set_null(0);
        binding.unbind();

        let mut fresh = Box::new(Vector::new(&ty, 4));
        binding.bind(&mut fresh);
        binding.data().write::<i32>(0, 5);
        binding.unbind();
        assert_eq!(fresh.value_at(0), Value::Int32(5));
        // The first chunk's null is untouched by the rebind.
        assert_eq!(vector.value_at(0), Value::Null);
    }

    #[test]
    fn test_child_view_refresh_after_reserve() {
        let ty = LogicalType::list(LogicalType::primitive(TypeTag::SmallInt));
        let (vector, mut binding) = bound(&ty, 2);
        binding.list_reserve(64);
        binding.child_data().write_slice::<i16>(0, &[7, 8, 9]);
        binding.set_list_size(3);
        binding.unbind();
        assert_eq!(vector.list_child().value_at(2), Value::Int16(9));
        assert_eq!(vector.list_size(), 3);
    }
}
