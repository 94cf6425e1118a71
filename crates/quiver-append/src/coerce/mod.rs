//! Per-value conversion and validation.
//!
//! This is where an input [`Datum`] meets a resolved column descriptor:
//! integer range checks against the target width, implicit integer⇄float
//! coercion, fixed-point decimal scaling, UUID text/binary encoding, and
//! the variable-length and list paths. The coercion matrix is total over
//! the two closed enumerations; every unsupported pairing produces a
//! `BindTypeMismatch` naming the SQL type and the received shape.

pub(crate) mod list;

use num_traits::ToPrimitive;
use num_traits::cast::cast;

use quiver_vector::TypeTag;

use crate::binding::VectorBinding;
use crate::datum::Datum;
use crate::descriptor::{DecimalDescriptor, DecimalStorage, TypeDescriptor};
use crate::error::{AppendError, Result, mismatch_for_tag, out_of_range_for_tag};

/// Write one value into `binding` at `row`, coercing and validating per the
/// column's descriptor.
pub(crate) fn write_value(binding: &mut VectorBinding, row: usize, datum: &Datum) -> Result<()> {
    if matches!(datum, Datum::Null) {
        binding.set_null(row);
        return Ok(());
    }
    match binding.descriptor().clone() {
        TypeDescriptor::Simple(tag) => write_simple(binding, row, tag, datum),
        TypeDescriptor::Decimal(desc) => write_decimal(binding, row, &desc, datum),
        // Construction rejects enum columns; reaching here means the caller
        // bypassed it, which only a bug inside this crate could do.
        TypeDescriptor::Enum(_) => Err(AppendError::bind_type_mismatch("enum", datum.shape())),
        TypeDescriptor::List(_) => match datum {
            Datum::List(slice) => list::append_slice(binding, row, slice),
            other => Err(AppendError::bind_type_mismatch(
                binding.descriptor().sql_name(),
                other.shape(),
            )),
        },
    }
}

fn write_simple(
    binding: &mut VectorBinding,
    row: usize,
    tag: TypeTag,
    datum: &Datum,
) -> Result<()> {
    match tag {
        TypeTag::Boolean => match datum {
            Datum::Bool(b) => {
                binding.data().write::<u8>(row, u8::from(*b));
                Ok(())
            }
            other => Err(mismatch_for_tag(tag, other.shape())),
        },
        TypeTag::TinyInt => write_numeric::<i8>(binding, row, tag, datum),
        TypeTag::SmallInt => write_numeric::<i16>(binding, row, tag, datum),
        TypeTag::Integer | TypeTag::Date => write_numeric::<i32>(binding, row, tag, datum),
        TypeTag::BigInt | TypeTag::Time | TypeTag::Timestamp | TypeTag::TimestampTz => {
            write_numeric::<i64>(binding, row, tag, datum)
        }
        TypeTag::HugeInt => write_numeric::<i128>(binding, row, tag, datum),
        TypeTag::UTinyInt => write_numeric::<u8>(binding, row, tag, datum),
        TypeTag::USmallInt => write_numeric::<u16>(binding, row, tag, datum),
        TypeTag::UInteger => write_numeric::<u32>(binding, row, tag, datum),
        TypeTag::UBigInt => write_numeric::<u64>(binding, row, tag, datum),
        TypeTag::UHugeInt => write_numeric::<u128>(binding, row, tag, datum),
        TypeTag::Float => write_numeric::<f32>(binding, row, tag, datum),
        TypeTag::Double => write_numeric::<f64>(binding, row, tag, datum),
        TypeTag::Interval => match datum {
            Datum::Bytes(bytes) if bytes.len() == 16 => {
                binding.data().write_bytes(row, bytes);
                Ok(())
            }
            other => Err(mismatch_for_tag(tag, other.shape())),
        },
        TypeTag::Uuid => match datum {
            Datum::Bytes(bytes) => write_uuid(binding, row, bytes),
            other => Err(mismatch_for_tag(tag, other.shape())),
        },
        TypeTag::Varchar | TypeTag::Blob | TypeTag::Bit => match datum {
            Datum::Bytes(bytes) => {
                binding.assign_string(row, bytes);
                Ok(())
            }
            other => Err(mismatch_for_tag(tag, other.shape())),
        },
        // Parameterized tags (decimal, enum, list) never reach the simple
        // path; resolution maps them to their own descriptor variants. The
        // wildcard also covers future variants of the non-exhaustive tag.
        _ => Err(mismatch_for_tag(tag, datum.shape())),
    }
}

/// Numeric write with implicit integer⇄float coercion.
///
/// Integer input into a narrower target validates against the target's
/// `[MIN, MAX]`; float input into an integer target truncates toward zero
/// before the same check. Any non-numeric shape is a mismatch.
fn write_numeric<T: Copy + 'static>(
    binding: &mut VectorBinding,
    row: usize,
    tag: TypeTag,
    datum: &Datum,
) -> Result<()>
where
    T: num_traits::NumCast,
{
    let value: T = match datum {
        Datum::Int(v) => cast(*v).ok_or_else(|| out_of_range_for_tag(tag))?,
        Datum::Float(v) => cast(*v).ok_or_else(|| out_of_range_for_tag(tag))?,
        other => return Err(mismatch_for_tag(tag, other.shape())),
    };
    binding.data().write(row, value);
    Ok(())
}

fn write_decimal(
    binding: &mut VectorBinding,
    row: usize,
    desc: &DecimalDescriptor,
    datum: &Datum,
) -> Result<()> {
    let (min, max) = desc.storage().bounds();
    let unscaled: i128 = match datum {
        Datum::Int(v) => i128::from(*v),
        Datum::Float(v) => {
            // Scale first, then range-check: a value whose scaled magnitude
            // overflows the storage fails even if the unscaled value fit.
            let scaled = (v * pow10(desc.scale())).trunc();
            scaled
                .to_i128()
                .ok_or_else(|| AppendError::out_of_range(desc.sql_name()))?
        }
        other => {
            return Err(AppendError::bind_type_mismatch(
                desc.sql_name(),
                other.shape(),
            ));
        }
    };
    if unscaled < min || unscaled > max {
        return Err(AppendError::out_of_range(desc.sql_name()));
    }
    match desc.storage() {
        DecimalStorage::Int16 => binding.data().write::<i16>(row, unscaled as i16),
        DecimalStorage::Int32 => binding.data().write::<i32>(row, unscaled as i32),
        DecimalStorage::Int64 => binding.data().write::<i64>(row, unscaled as i64),
        DecimalStorage::Int128 => binding.data().write::<i128>(row, unscaled),
    }
    Ok(())
}

/// `10^scale` as f64: repeated multiplication for the common small scales,
/// `powi` beyond.
fn pow10(scale: u8) -> f64 {
    if scale <= 10 {
        let mut p = 1.0f64;
        let mut i = 0;
        while i < scale {
            p *= 10.0;
            i += 1;
        }
        p
    } else {
        10f64.powi(i32::from(scale))
    }
}

/// Hex digit values, `-1` for non-hex bytes.
static HEX_NIBBLE: [i8; 256] = {
    let mut table = [-1i8; 256];
    let mut i = 0u8;
    while i < 10 {
        table[(b'0' + i) as usize] = i as i8;
        i += 1;
    }
    let mut i = 0u8;
    while i < 6 {
        table[(b'a' + i) as usize] = 10 + i as i8;
        table[(b'A' + i) as usize] = 10 + i as i8;
        i += 1;
    }
    table
};

/// Byte offsets of the hyphens in canonical UUID text.
const UUID_HYPHENS: [usize; 4] = [8, 13, 18, 23];

/// Length of canonical hyphenated UUID text.
const UUID_TEXT_LEN: usize = 36;

/// Decode 16-byte binary or 36-byte canonical text into the engine's
/// signed 128-bit storage representation.
///
/// The decoded big-endian integer is XORed with the sign bit, mapping the
/// unsigned UUID space onto signed 128-bit storage in order-preserving
/// fashion.
fn write_uuid(binding: &mut VectorBinding, row: usize, bytes: &[u8]) -> Result<()> {
    let raw: u128 = match bytes.len() {
        16 => u128::from_be_bytes(bytes.try_into().expect("length checked")),
        UUID_TEXT_LEN => parse_canonical_uuid(bytes)?,
        n => {
            return Err(AppendError::invalid_uuid(format!(
                "expected 16 binary bytes or 36 text bytes, got {n}"
            )));
        }
    };
    let stored = (raw ^ (1u128 << 127)) as i128;
    binding.data().write(row, stored);
    Ok(())
}

fn parse_canonical_uuid(text: &[u8]) -> Result<u128> {
    debug_assert_eq!(text.len(), UUID_TEXT_LEN);
    let mut acc = 0u128;
    for (index, &byte) in text.iter().enumerate() {
        if UUID_HYPHENS.contains(&index) {
            if byte != b'-' {
                return Err(AppendError::invalid_uuid(format!(
                    "expected '-' at offset {index}"
                )));
            }
            continue;
        }
        let nibble = HEX_NIBBLE[byte as usize];
        if nibble < 0 {
            return Err(AppendError::invalid_uuid(format!(
                "invalid hex digit at offset {index}"
            )));
        }
        acc = (acc << 4) | u128::from(nibble as u8);
    }
    Ok(acc)
}
