//! Typed column descriptors resolved from engine logical types.
//!
//! Resolution happens once, at appender construction, and fixes everything
//! the write path needs to know about a column: its tag, a decimal's
//! width/scale and internal storage, an enum's dictionary handle and
//! storage width, a list's element descriptor. Nothing here touches vector
//! memory; descriptors are pure metadata.

use std::collections::HashMap;

use quiver_vector::{LogicalType, TypeTag};

use crate::error::{AppendError, Result};

/// Internal integer storage of a decimal column.
///
/// The engine chooses the narrowest storage that fits the declared width;
/// range checks are against the storage bounds, so a scaled value that
/// overflows the storage fails even when the declared width would seem to
/// allow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalStorage {
    /// 16-bit storage, widths 1–4.
    Int16,
    /// 32-bit storage, widths 5–9.
    Int32,
    /// 64-bit storage, widths 10–18.
    Int64,
    /// 128-bit storage, widths 19–38.
    Int128,
}

impl DecimalStorage {
    /// Inclusive bounds of the storage integer.
    #[must_use]
    pub const fn bounds(self) -> (i128, i128) {
        match self {
            Self::Int16 => (i16::MIN as i128, i16::MAX as i128),
            Self::Int32 => (i32::MIN as i128, i32::MAX as i128),
            Self::Int64 => (i64::MIN as i128, i64::MAX as i128),
            Self::Int128 => (i128::MIN, i128::MAX),
        }
    }

    /// Storage width in bytes.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Int16 => 2,
            Self::Int32 => 4,
            Self::Int64 => 8,
            Self::Int128 => 16,
        }
    }

    fn from_tag(tag: TypeTag) -> Option<Self> {
        match tag {
            TypeTag::SmallInt => Some(Self::Int16),
            TypeTag::Integer => Some(Self::Int32),
            TypeTag::BigInt => Some(Self::Int64),
            TypeTag::HugeInt => Some(Self::Int128),
            _ => None,
        }
    }
}

/// Resolved decimal column metadata. Width and scale are fixed at
/// resolution time and never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalDescriptor {
    width: u8,
    scale: u8,
    storage: DecimalStorage,
}

impl DecimalDescriptor {
    /// Declared width.
    #[must_use]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Declared scale.
    #[must_use]
    pub const fn scale(&self) -> u8 {
        self.scale
    }

    /// Internal integer storage.
    #[must_use]
    pub const fn storage(&self) -> DecimalStorage {
        self.storage
    }

    /// SQL rendering, `decimal(width,scale)`.
    #[must_use]
    pub fn sql_name(&self) -> String {
        format!("decimal({},{})", self.width, self.scale)
    }
}

/// Resolved enum column metadata.
///
/// Retains an owned handle to the logical type for dictionary lookups and
/// caches decoded strings on first use; resolution itself never walks the
/// dictionary. The appender rejects enum columns at construction, but the
/// descriptor is shared with read-side code that does decode.
#[derive(Debug, Clone)]
pub struct EnumDescriptor {
    storage: TypeTag,
    ty: LogicalType,
    decoded: HashMap<u64, String>,
}

impl EnumDescriptor {
    /// Internal unsigned storage tag (one of the `UTinyInt`..`UBigInt`).
    #[must_use]
    pub const fn storage(&self) -> TypeTag {
        self.storage
    }

    /// Dictionary text for `code`, decoding and caching it on first use.
    pub fn decode(&mut self, code: u64) -> Result<&str> {
        if !self.decoded.contains_key(&code) {
            let text = self.ty.enum_value(code).ok_or_else(|| {
                AppendError::bind_type_mismatch("enum", "out-of-dictionary code")
            })?;
            self.decoded.insert(code, text.to_owned());
        }
        Ok(self.decoded.get(&code).expect("inserted above"))
    }

    /// Number of codes decoded so far.
    #[must_use]
    pub fn decoded_len(&self) -> usize {
        self.decoded.len()
    }
}

/// Typed descriptor of one output column.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum TypeDescriptor {
    /// A primitive type identified by its tag alone.
    Simple(TypeTag),
    /// A fixed-point decimal.
    Decimal(DecimalDescriptor),
    /// A dictionary-encoded enum.
    Enum(EnumDescriptor),
    /// A list of a scalar (never list) element.
    List(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Resolve an engine logical type into a typed descriptor.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` if the type has no appender mapping; the
    /// only such shape in the current engine type system is a nested list.
    pub fn resolve(ty: &LogicalType) -> Result<Self> {
        match ty.type_tag() {
            TypeTag::List => {
                let child_ty = ty.list_child().expect("list type has a child");
                if child_ty.type_tag() == TypeTag::List {
                    return Err(AppendError::unsupported_type(ty.sql_name()));
                }
                Ok(Self::List(Box::new(Self::resolve(child_ty)?)))
            }
            TypeTag::Enum => Ok(Self::Enum(EnumDescriptor {
                storage: ty.enum_internal_tag().expect("enum type has storage"),
                ty: ty.clone(),
                decoded: HashMap::new(),
            })),
            TypeTag::Decimal => {
                let internal = ty
                    .decimal_internal_tag()
                    .expect("decimal type has storage");
                Ok(Self::Decimal(DecimalDescriptor {
                    width: ty.decimal_width().expect("decimal type has width"),
                    scale: ty.decimal_scale().expect("decimal type has scale"),
                    storage: DecimalStorage::from_tag(internal)
                        .expect("engine storage tag is an integer width"),
                }))
            }
            tag => Ok(Self::Simple(tag)),
        }
    }

    /// Whether this descriptor or a list child is an enum.
    #[must_use]
    pub fn contains_enum(&self) -> bool {
        match self {
            Self::Enum(_) => true,
            Self::List(child) => child.contains_enum(),
            Self::Simple(_) | Self::Decimal(_) => false,
        }
    }

    /// SQL rendering of the column type, as used in diagnostics.
    #[must_use]
    pub fn sql_name(&self) -> String {
        match self {
            Self::Simple(tag) => tag.sql_name().to_owned(),
            Self::Decimal(desc) => desc.sql_name(),
            Self::Enum(_) => "enum".to_owned(),
            Self::List(child) => format!("{}[]", child.sql_name()),
        }
    }
}
