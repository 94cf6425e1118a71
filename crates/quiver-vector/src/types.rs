//! Logical column types and the engine's type-introspection rules.
//!
//! A [`LogicalType`] is the engine-owned description of a column's SQL type.
//! The appender layer never constructs vector memory from anything else: the
//! payload width of a vector, the internal storage of a decimal and the
//! dictionary width of an enum are all decided here, by the engine, and only
//! read back through the accessors on this type.

use std::fmt;
use std::sync::Arc;

/// Identifier for every column type the engine understands.
///
/// This is the value returned by type introspection on a [`LogicalType`];
/// parameterized types (decimal, enum, list) carry their parameters on the
/// logical type itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TypeTag {
    /// `boolean`
    Boolean,
    /// `tinyint`: signed 8-bit
    TinyInt,
    /// `smallint`: signed 16-bit
    SmallInt,
    /// `integer`: signed 32-bit
    Integer,
    /// `bigint`: signed 64-bit
    BigInt,
    /// `hugeint`: signed 128-bit
    HugeInt,
    /// `utinyint`: unsigned 8-bit
    UTinyInt,
    /// `usmallint`: unsigned 16-bit
    USmallInt,
    /// `uinteger`: unsigned 32-bit
    UInteger,
    /// `ubigint`: unsigned 64-bit
    UBigInt,
    /// `uhugeint`: unsigned 128-bit
    UHugeInt,
    /// `float`: 32-bit IEEE 754
    Float,
    /// `double`: 64-bit IEEE 754
    Double,
    /// `date`: days since epoch, 32-bit
    Date,
    /// `time`: microseconds since midnight, 64-bit
    Time,
    /// `timestamp`: microseconds since epoch, 64-bit
    Timestamp,
    /// `timestamp with time zone`: same representation as `timestamp`
    TimestampTz,
    /// `interval`: months/days/microseconds triple, 16 bytes
    Interval,
    /// `uuid`: 128-bit, stored in the engine's signed representation
    Uuid,
    /// `varchar`: variable-length text
    Varchar,
    /// `blob`: variable-length bytes
    Blob,
    /// `bit`: variable-length bit string
    Bit,
    /// `decimal(width, scale)`: fixed point over integer storage
    Decimal,
    /// `enum`: dictionary-encoded text
    Enum,
    /// `list` of a scalar element type
    List,
}

impl TypeTag {
    /// Fixed payload width in bytes of one row's value, or `None` for
    /// variable-length and nested tags (varchar, blob, bit, enum, list).
    ///
    /// Decimal has no width of its own; its storage is chosen per column by
    /// [`LogicalType::decimal_internal_tag`].
    #[must_use]
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Boolean | Self::TinyInt | Self::UTinyInt => Some(1),
            Self::SmallInt | Self::USmallInt => Some(2),
            Self::Integer | Self::UInteger | Self::Float | Self::Date => Some(4),
            Self::BigInt
            | Self::UBigInt
            | Self::Double
            | Self::Time
            | Self::Timestamp
            | Self::TimestampTz => Some(8),
            Self::HugeInt | Self::UHugeInt | Self::Uuid | Self::Interval => Some(16),
            Self::Varchar | Self::Blob | Self::Bit | Self::Decimal | Self::Enum | Self::List => {
                None
            }
        }
    }

    /// SQL name of the tag, as used in diagnostics.
    #[must_use]
    pub const fn sql_name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::TinyInt => "tinyint",
            Self::SmallInt => "smallint",
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::HugeInt => "hugeint",
            Self::UTinyInt => "utinyint",
            Self::USmallInt => "usmallint",
            Self::UInteger => "uinteger",
            Self::UBigInt => "ubigint",
            Self::UHugeInt => "uhugeint",
            Self::Float => "float",
            Self::Double => "double",
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::TimestampTz => "timestamp with time zone",
            Self::Interval => "interval",
            Self::Uuid => "uuid",
            Self::Varchar => "varchar",
            Self::Blob => "blob",
            Self::Bit => "bit",
            Self::Decimal => "decimal",
            Self::Enum => "enum",
            Self::List => "list",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// Engine-owned descriptor of a column's SQL type.
///
/// Cheap to clone: parameterized payloads are either small or behind an
/// `Arc`. Equality compares structurally, including type parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalType {
    kind: TypeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TypeKind {
    Primitive(TypeTag),
    Decimal { width: u8, scale: u8 },
    Enum(Arc<[String]>),
    List(Box<LogicalType>),
}

impl LogicalType {
    /// Logical type for a non-parameterized primitive tag.
    ///
    /// # Panics
    ///
    /// Panics if `tag` is `Decimal`, `Enum` or `List`; those carry parameters
    /// and have dedicated constructors.
    #[must_use]
    pub fn primitive(tag: TypeTag) -> Self {
        assert!(
            !matches!(tag, TypeTag::Decimal | TypeTag::Enum | TypeTag::List),
            "{tag} requires a parameterized constructor"
        );
        Self {
            kind: TypeKind::Primitive(tag),
        }
    }

    /// `decimal(width, scale)`.
    ///
    /// # Panics
    ///
    /// Panics if `width` is 0 or above 38, or if `scale > width`.
    #[must_use]
    pub fn decimal(width: u8, scale: u8) -> Self {
        assert!((1..=38).contains(&width), "decimal width out of range");
        assert!(scale <= width, "decimal scale exceeds width");
        Self {
            kind: TypeKind::Decimal { width, scale },
        }
    }

    /// Dictionary-encoded enum over the given values, in dictionary order.
    ///
    /// # Panics
    ///
    /// Panics if `values` is empty.
    #[must_use]
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Arc<[String]> = values.into_iter().map(Into::into).collect();
        assert!(!values.is_empty(), "enum requires at least one value");
        Self {
            kind: TypeKind::Enum(values),
        }
    }

    /// List of `child` elements.
    #[must_use]
    pub fn list(child: Self) -> Self {
        Self {
            kind: TypeKind::List(Box::new(child)),
        }
    }

    /// The tag identifying this type.
    #[must_use]
    pub const fn type_tag(&self) -> TypeTag {
        match &self.kind {
            TypeKind::Primitive(tag) => *tag,
            TypeKind::Decimal { .. } => TypeTag::Decimal,
            TypeKind::Enum(_) => TypeTag::Enum,
            TypeKind::List(_) => TypeTag::List,
        }
    }

    /// Element type of a list, or `None` for non-list types.
    #[must_use]
    pub fn list_child(&self) -> Option<&Self> {
        match &self.kind {
            TypeKind::List(child) => Some(child),
            _ => None,
        }
    }

    /// Declared decimal width, or `None` for non-decimal types.
    #[must_use]
    pub const fn decimal_width(&self) -> Option<u8> {
        match self.kind {
            TypeKind::Decimal { width, .. } => Some(width),
            _ => None,
        }
    }

    /// Declared decimal scale, or `None` for non-decimal types.
    #[must_use]
    pub const fn decimal_scale(&self) -> Option<u8> {
        match self.kind {
            TypeKind::Decimal { scale, .. } => Some(scale),
            _ => None,
        }
    }

    /// Internal integer storage for a decimal column, chosen by the engine
    /// from the declared width.
    #[must_use]
    pub const fn decimal_internal_tag(&self) -> Option<TypeTag> {
        match self.kind {
            TypeKind::Decimal { width, .. } => Some(match width {
                0..=4 => TypeTag::SmallInt,
                5..=9 => TypeTag::Integer,
                10..=18 => TypeTag::BigInt,
                _ => TypeTag::HugeInt,
            }),
            _ => None,
        }
    }

    /// Internal unsigned storage for an enum column, chosen by the engine
    /// from the dictionary size.
    #[must_use]
    pub fn enum_internal_tag(&self) -> Option<TypeTag> {
        match &self.kind {
            TypeKind::Enum(values) => Some(match values.len() as u64 {
                0..=0x100 => TypeTag::UTinyInt,
                0x101..=0x1_0000 => TypeTag::USmallInt,
                0x1_0001..=0x1_0000_0000 => TypeTag::UInteger,
                _ => TypeTag::UBigInt,
            }),
            _ => None,
        }
    }

    /// Dictionary text for an enum code, or `None` for non-enum types and
    /// out-of-dictionary codes.
    #[must_use]
    pub fn enum_value(&self, code: u64) -> Option<&str> {
        match &self.kind {
            TypeKind::Enum(values) => values.get(usize::try_from(code).ok()?).map(String::as_str),
            _ => None,
        }
    }

    /// Number of dictionary entries of an enum, or `None` otherwise.
    #[must_use]
    pub fn enum_dictionary_size(&self) -> Option<usize> {
        match &self.kind {
            TypeKind::Enum(values) => Some(values.len()),
            _ => None,
        }
    }

    /// Fixed payload width in bytes of one row in a vector of this type.
    ///
    /// Variable-length types (varchar, blob, bit) store their payload out of
    /// line and report `None`; decimal, enum and list report the width of
    /// their internal representation (storage integer, dictionary code,
    /// list entry).
    #[must_use]
    pub fn payload_width(&self) -> Option<usize> {
        match &self.kind {
            TypeKind::Primitive(tag) => tag.fixed_width(),
            TypeKind::Decimal { .. } => self
                .decimal_internal_tag()
                .and_then(TypeTag::fixed_width),
            TypeKind::Enum(_) => self.enum_internal_tag().and_then(TypeTag::fixed_width),
            // One ListEntry { offset: u64, length: u64 } per row.
            TypeKind::List(_) => Some(16),
        }
    }

    /// SQL rendering of the type, as used in diagnostics.
    #[must_use]
    pub fn sql_name(&self) -> String {
        match &self.kind {
            TypeKind::Primitive(tag) => tag.sql_name().to_owned(),
            TypeKind::Decimal { width, scale } => format!("decimal({width},{scale})"),
            TypeKind::Enum(_) => "enum".to_owned(),
            TypeKind::List(child) => format!("{}[]", child.sql_name()),
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql_name())
    }
}
