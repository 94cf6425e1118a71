//! Input values accepted by the appender.
//!
//! The appender does not inspect open-ended host types; callers hand it a
//! [`Datum`], a closed tagged variant, which makes the coercion matrix a
//! total function over two closed enumerations (input shape × column type).
//! List columns take a [`SliceDatum`], a homogeneous typed sequence whose
//! element type must match the column's element type exactly.

/// One positional input value.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Datum {
    /// SQL NULL: clears the row's validity bit, writes nothing else.
    Null,
    /// Boolean input; binds only to `boolean` columns.
    Bool(bool),
    /// Integer input; binds to integer, float, temporal and decimal columns,
    /// range-checked against the target width.
    Int(i64),
    /// Floating input; binds to float, integer and decimal columns.
    Float(f64),
    /// Byte-sequence input: text, blobs, bit strings, canonical UUID text
    /// (36 bytes), raw UUID payloads (16 bytes) and interval payloads
    /// (16 bytes).
    Bytes(Vec<u8>),
    /// Homogeneous sequence input for list columns.
    List(SliceDatum),
}

impl Datum {
    /// Shape name used in mismatch diagnostics.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
        }
    }
}

impl From<bool> for Datum {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Datum {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Datum {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Datum {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Self::Bytes(v.as_bytes().to_vec())
    }
}

impl From<String> for Datum {
    fn from(v: String) -> Self {
        Self::Bytes(v.into_bytes())
    }
}

impl From<Vec<u8>> for Datum {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<SliceDatum> for Datum {
    fn from(v: SliceDatum) -> Self {
        Self::List(v)
    }
}

impl<T> From<Option<T>> for Datum
where
    T: Into<Self>,
{
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// A homogeneous sequence bound to one list-column row.
///
/// Fixed-width variants are bulk-copied into the child vector; text and blob
/// elements are assigned one at a time (they are variable-length). The
/// element type must match the column's element type exactly; there is no
/// implicit widening inside sequences.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SliceDatum {
    /// Elements for a `boolean[]` column.
    Bool(Vec<bool>),
    /// Elements for a `tinyint[]` column.
    Int8(Vec<i8>),
    /// Elements for a `smallint[]` column.
    Int16(Vec<i16>),
    /// Elements for an `integer[]` column.
    Int32(Vec<i32>),
    /// Elements for a `bigint[]` column.
    Int64(Vec<i64>),
    /// Elements for a `utinyint[]` column.
    UInt8(Vec<u8>),
    /// Elements for a `usmallint[]` column.
    UInt16(Vec<u16>),
    /// Elements for a `uinteger[]` column.
    UInt32(Vec<u32>),
    /// Elements for a `ubigint[]` column.
    UInt64(Vec<u64>),
    /// Elements for a `float[]` column.
    Float32(Vec<f32>),
    /// Elements for a `double[]` column.
    Float64(Vec<f64>),
    /// Elements for a `varchar[]` column.
    Text(Vec<String>),
    /// Elements for a `blob[]` column.
    Blob(Vec<Vec<u8>>),
}

impl SliceDatum {
    /// Number of elements in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Int8(v) => v.len(),
            Self::Int16(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::UInt8(v) => v.len(),
            Self::UInt16(v) => v.len(),
            Self::UInt32(v) => v.len(),
            Self::UInt64(v) => v.len(),
            Self::Float32(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Text(v) => v.len(),
            Self::Blob(v) => v.len(),
        }
    }

    /// Whether the sequence is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element shape name used in mismatch diagnostics.
    #[must_use]
    pub const fn element_shape(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int8(_) => "tinyint",
            Self::Int16(_) => "smallint",
            Self::Int32(_) => "integer",
            Self::Int64(_) => "bigint",
            Self::UInt8(_) => "utinyint",
            Self::UInt16(_) => "usmallint",
            Self::UInt32(_) => "uinteger",
            Self::UInt64(_) => "ubigint",
            Self::Float32(_) => "float",
            Self::Float64(_) => "double",
            Self::Text(_) => "varchar",
            Self::Blob(_) => "blob",
        }
    }
}

macro_rules! slice_from {
    ($($elem:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$elem>> for SliceDatum {
                fn from(v: Vec<$elem>) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

slice_from! {
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    String => Text,
}
