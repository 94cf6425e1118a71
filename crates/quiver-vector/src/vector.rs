//! Columnar vector memory.
//!
//! A [`Vector`] owns one column's worth of a chunk: a fixed-width payload
//! buffer addressed by raw pointer, a lazily allocated validity bitmap, an
//! out-of-line slot table for variable-length payloads, and (for lists) a
//! growable child vector. Writers above this crate obtain the raw payload
//! pointer once per chunk and write through it; everything variable-length
//! or structural goes through the narrow methods here.

use std::ptr::NonNull;

use crate::types::{LogicalType, TypeTag};
use crate::value::{Interval, Value};

/// One list row's view into the shared child vector.
///
/// Lives in the list vector's payload buffer, one entry per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct ListEntry {
    /// First element's offset in the child vector.
    pub offset: u64,
    /// Number of elements.
    pub length: u64,
}

/// Number of validity bits per bitmap word.
const VALIDITY_WORD_BITS: usize = 64;

/// One column buffer of a data chunk.
#[derive(Debug)]
pub struct Vector {
    ty: LogicalType,
    capacity: usize,
    /// Fixed-width payload, `capacity * payload_width` bytes. Empty for
    /// variable-length vectors, whose payload lives in `varlen`.
    data: Box<[u8]>,
    /// All rows are valid until the first null forces allocation.
    validity: Option<Box<[u64]>>,
    varlen: Vec<Vec<u8>>,
    child: Option<Box<Vector>>,
    /// Logical element count of the child vector. Only meaningful for lists.
    list_size: usize,
}

impl Vector {
    /// Allocate a zeroed vector for `capacity` rows of type `ty`.
    #[must_use]
    pub fn new(ty: &LogicalType, capacity: usize) -> Self {
        let data = ty
            .payload_width()
            .map_or_else(Box::default, |width| vec![0u8; capacity * width].into());
        let varlen = if ty.payload_width().is_none() {
            vec![Vec::new(); capacity]
        } else {
            Vec::new()
        };
        let child = ty
            .list_child()
            .map(|child_ty| Box::new(Self::new(child_ty, capacity)));
        Self {
            ty: ty.clone(),
            capacity,
            data,
            validity: None,
            varlen,
            child,
            list_size: 0,
        }
    }

    /// The column type this vector was allocated for.
    #[must_use]
    pub const fn logical_type(&self) -> &LogicalType {
        &self.ty
    }

    /// Row capacity of the payload buffer.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Raw pointer to the fixed-width payload buffer.
    ///
    /// Valid until the vector is dropped or its child storage is regrown;
    /// callers are expected to re-fetch after any [`Self::list_reserve`] on
    /// an ancestor. Variable-length vectors have no payload buffer and
    /// return a dangling (but well-aligned, non-null) pointer that must not
    /// be dereferenced.
    #[must_use]
    pub fn data_ptr(&mut self) -> NonNull<u8> {
        // as_mut_ptr on an empty boxed slice yields a dangling non-null.
        NonNull::new(self.data.as_mut_ptr()).unwrap_or(NonNull::dangling())
    }

    /// Current validity bitmap, if one has been allocated.
    #[must_use]
    pub fn validity_ptr(&mut self) -> Option<NonNull<u64>> {
        self.validity
            .as_mut()
            .and_then(|words| NonNull::new(words.as_mut_ptr()))
    }

    /// Allocate the validity bitmap if absent (all rows valid) and return it.
    ///
    /// Word `i` covers rows `[64 * i, 64 * (i + 1))`, one bit per row, set
    /// meaning valid.
    pub fn ensure_validity(&mut self) -> NonNull<u64> {
        if self.validity.is_none() {
            let words = self.capacity.div_ceil(VALIDITY_WORD_BITS);
            self.validity = Some(vec![u64::MAX; words].into());
        }
        self.validity_ptr().expect("validity allocated above")
    }

    /// Whether `row` is valid. Rows are valid until explicitly cleared.
    #[must_use]
    pub fn is_row_valid(&self, row: usize) -> bool {
        self.validity.as_ref().is_none_or(|words| {
            words[row / VALIDITY_WORD_BITS] & (1u64 << (row % VALIDITY_WORD_BITS)) != 0
        })
    }

    /// Store a variable-length payload for `row`.
    ///
    /// # Panics
    ///
    /// Panics if this vector is not variable-length or `row` is out of
    /// bounds; both are contract violations by the writer.
    pub fn assign_string_element(&mut self, row: usize, bytes: &[u8]) {
        assert!(
            self.ty.payload_width().is_none(),
            "assign_string_element on fixed-width vector"
        );
        self.varlen[row] = bytes.to_vec();
    }

    /// Variable-length payload previously stored for `row`.
    #[must_use]
    pub fn varlen_at(&self, row: usize) -> &[u8] {
        &self.varlen[row]
    }

    /// Child vector of a list.
    ///
    /// # Panics
    ///
    /// Panics if this vector is not a list.
    #[must_use]
    pub fn list_child_mut(&mut self) -> &mut Self {
        self.child.as_deref_mut().expect("list vector has a child")
    }

    /// Child vector of a list (shared).
    ///
    /// # Panics
    ///
    /// Panics if this vector is not a list.
    #[must_use]
    pub fn list_child(&self) -> &Self {
        self.child.as_deref().expect("list vector has a child")
    }

    /// Logical element count of the list's child vector.
    #[must_use]
    pub const fn list_size(&self) -> usize {
        self.list_size
    }

    /// Set the logical element count of the list's child vector.
    pub const fn set_list_size(&mut self, size: usize) {
        self.list_size = size;
    }

    /// Grow the child vector's storage to hold at least `required` elements.
    ///
    /// May reallocate the child payload buffer; any raw pointer previously
    /// obtained from the child is invalidated.
    pub fn list_reserve(&mut self, required: usize) {
        let child = self.child.as_deref_mut().expect("list vector has a child");
        child.grow(required);
    }

    fn grow(&mut self, required: usize) {
        if required <= self.capacity {
            return;
        }
        // Doubling keeps amortized copies linear across repeated appends.
        let new_capacity = required.max(self.capacity * 2);
        if let Some(width) = self.ty.payload_width() {
            let mut data = vec![0u8; new_capacity * width];
            data[..self.data.len()].copy_from_slice(&self.data);
            self.data = data.into();
        } else {
            self.varlen.resize(new_capacity, Vec::new());
        }
        if let Some(old) = self.validity.take() {
            let words = new_capacity.div_ceil(VALIDITY_WORD_BITS);
            let mut grown = vec![u64::MAX; words];
            grown[..old.len()].copy_from_slice(&old);
            self.validity = Some(grown.into());
        }
        if let Some(child) = self.child.as_deref_mut() {
            child.grow(new_capacity);
        }
        self.capacity = new_capacity;
    }

    fn payload_at(&self, row: usize, width: usize) -> &[u8] {
        &self.data[row * width..(row + 1) * width]
    }

    fn read_ne<const N: usize>(&self, row: usize) -> [u8; N] {
        self.payload_at(row, N).try_into().expect("exact width")
    }

    /// Decode the cell at `row` into a [`Value`].
    ///
    /// This is the read side's mirror of the writer: the backend calls it
    /// when materializing an appended chunk, and tests use it to verify
    /// stored bits.
    #[must_use]
    pub fn value_at(&self, row: usize) -> Value {
        if !self.is_row_valid(row) {
            return Value::Null;
        }
        match self.ty.type_tag() {
            TypeTag::Boolean => Value::Boolean(self.data[row] != 0),
            TypeTag::TinyInt => Value::Int8(i8::from_ne_bytes(self.read_ne(row))),
            TypeTag::SmallInt => Value::Int16(i16::from_ne_bytes(self.read_ne(row))),
            TypeTag::Integer => Value::Int32(i32::from_ne_bytes(self.read_ne(row))),
            TypeTag::BigInt => Value::Int64(i64::from_ne_bytes(self.read_ne(row))),
            TypeTag::HugeInt => Value::Int128(i128::from_ne_bytes(self.read_ne(row))),
            TypeTag::UTinyInt => Value::UInt8(self.data[row]),
            TypeTag::USmallInt => Value::UInt16(u16::from_ne_bytes(self.read_ne(row))),
            TypeTag::UInteger => Value::UInt32(u32::from_ne_bytes(self.read_ne(row))),
            TypeTag::UBigInt => Value::UInt64(u64::from_ne_bytes(self.read_ne(row))),
            TypeTag::UHugeInt => Value::UInt128(u128::from_ne_bytes(self.read_ne(row))),
            TypeTag::Float => Value::Float32(f32::from_ne_bytes(self.read_ne(row))),
            TypeTag::Double => Value::Float64(f64::from_ne_bytes(self.read_ne(row))),
            TypeTag::Date => Value::Date(i32::from_ne_bytes(self.read_ne(row))),
            TypeTag::Time => Value::Time(i64::from_ne_bytes(self.read_ne(row))),
            TypeTag::Timestamp | TypeTag::TimestampTz => {
                Value::Timestamp(i64::from_ne_bytes(self.read_ne(row)))
            }
            TypeTag::Interval => Value::Interval(Interval::from_bytes(self.read_ne(row))),
            TypeTag::Uuid => Value::Uuid(i128::from_ne_bytes(self.read_ne(row))),
            TypeTag::Varchar => {
                Value::Text(String::from_utf8_lossy(&self.varlen[row]).into_owned())
            }
            TypeTag::Blob => Value::Blob(self.varlen[row].clone()),
            TypeTag::Bit => Value::Bit(self.varlen[row].clone()),
            TypeTag::Decimal => self.decode_decimal(row),
            TypeTag::Enum => self.decode_enum(row),
            TypeTag::List => self.decode_list(row),
        }
    }

    fn decode_decimal(&self, row: usize) -> Value {
        let storage = self
            .ty
            .decimal_internal_tag()
            .expect("decimal type has internal storage");
        let unscaled = match storage {
            TypeTag::SmallInt => i128::from(i16::from_ne_bytes(self.read_ne(row))),
            TypeTag::Integer => i128::from(i32::from_ne_bytes(self.read_ne(row))),
            TypeTag::BigInt => i128::from(i64::from_ne_bytes(self.read_ne(row))),
            _ => i128::from_ne_bytes(self.read_ne(row)),
        };
        Value::Decimal(unscaled)
    }

    fn decode_enum(&self, row: usize) -> Value {
        let storage = self
            .ty
            .enum_internal_tag()
            .expect("enum type has internal storage");
        let code = match storage {
            TypeTag::UTinyInt => u64::from(self.data[row]),
            TypeTag::USmallInt => u64::from(u16::from_ne_bytes(self.read_ne(row))),
            TypeTag::UInteger => u64::from(u32::from_ne_bytes(self.read_ne(row))),
            _ => u64::from_ne_bytes(self.read_ne(row)),
        };
        Value::Enum(self.ty.enum_value(code).unwrap_or_default().to_owned())
    }

    fn decode_list(&self, row: usize) -> Value {
        let entry = ListEntry {
            offset: u64::from_ne_bytes(self.payload_at(row, 16)[..8].try_into().expect("u64")),
            length: u64::from_ne_bytes(self.payload_at(row, 16)[8..].try_into().expect("u64")),
        };
        let child = self.list_child();
        let start = usize::try_from(entry.offset).expect("offset fits usize");
        let len = usize::try_from(entry.length).expect("length fits usize");
        Value::List((start..start + len).map(|i| child.value_at(i)).collect())
    }
}
