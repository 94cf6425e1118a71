//! Materialized row values.
//!
//! [`Value`] is what the backend hands back from a table scan: one decoded
//! cell per column, already lifted out of vector memory. The appender layer
//! never constructs these; they exist for the read side and for verifying
//! round-trips in tests.

/// An `interval` payload: months, days and microseconds, stored as a
/// 16-byte triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Interval {
    /// Whole months component.
    pub months: i32,
    /// Whole days component.
    pub days: i32,
    /// Sub-day component in microseconds.
    pub micros: i64,
}

impl Interval {
    /// Encode as the engine's in-memory 16-byte layout (native byte order).
    #[must_use]
    pub fn to_bytes(self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..4].copy_from_slice(&self.months.to_ne_bytes());
        out[4..8].copy_from_slice(&self.days.to_ne_bytes());
        out[8..].copy_from_slice(&self.micros.to_ne_bytes());
        out
    }

    /// Decode from the engine's in-memory 16-byte layout.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self {
            months: i32::from_ne_bytes(bytes[..4].try_into().expect("4-byte slice")),
            days: i32::from_ne_bytes(bytes[4..8].try_into().expect("4-byte slice")),
            micros: i64::from_ne_bytes(bytes[8..].try_into().expect("8-byte slice")),
        }
    }
}

/// One decoded cell.
///
/// Integer-backed temporal types keep their raw representation (days since
/// epoch, microseconds); `Uuid` holds the stored signed 128-bit payload
/// exactly as it sits in vector memory; `Decimal` holds the unscaled
/// storage integer sign-extended to 128 bits.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// SQL NULL.
    Null,
    /// `boolean`
    Boolean(bool),
    /// `tinyint`
    Int8(i8),
    /// `smallint`
    Int16(i16),
    /// `integer`
    Int32(i32),
    /// `bigint`
    Int64(i64),
    /// `hugeint`
    Int128(i128),
    /// `utinyint`
    UInt8(u8),
    /// `usmallint`
    UInt16(u16),
    /// `uinteger`
    UInt32(u32),
    /// `ubigint`
    UInt64(u64),
    /// `uhugeint`
    UInt128(u128),
    /// `float`
    Float32(f32),
    /// `double`
    Float64(f64),
    /// `date`: days since epoch
    Date(i32),
    /// `time`: microseconds since midnight
    Time(i64),
    /// `timestamp` / `timestamp with time zone`: microseconds since epoch
    Timestamp(i64),
    /// `interval`
    Interval(Interval),
    /// `uuid`: stored signed payload
    Uuid(i128),
    /// `varchar`
    Text(String),
    /// `blob`
    Blob(Vec<u8>),
    /// `bit`
    Bit(Vec<u8>),
    /// `decimal`: unscaled storage integer
    Decimal(i128),
    /// `enum`: decoded dictionary text
    Enum(String),
    /// `list`
    List(Vec<Value>),
}

impl Value {
    /// Whether this cell is NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}
