//! List-column append path.
//!
//! Each appended sequence becomes one `{offset, length}` entry in the list
//! vector's payload and a run of elements in the shared child vector. The
//! entry is written first, then the child's logical size is published, then
//! capacity is reserved (which may reallocate the child buffer and refresh
//! the cached view), and only then are the elements copied in.

use quiver_vector::{ListEntry, TypeTag};

use crate::binding::{RawData, VectorBinding};
use crate::datum::SliceDatum;
use crate::descriptor::TypeDescriptor;
use crate::error::{AppendError, Result};

/// Append one homogeneous sequence to a list column at `row`.
///
/// The sequence's element type must match the column's element type
/// exactly; there is no implicit widening inside sequences.
pub(crate) fn append_slice(
    binding: &mut VectorBinding,
    row: usize,
    slice: &SliceDatum,
) -> Result<()> {
    let element_tag = match binding.descriptor() {
        TypeDescriptor::List(child) => match child.as_ref() {
            TypeDescriptor::Simple(tag) => *tag,
            // Enum elements are rejected at construction; decimal elements
            // have no sequence variant, so they mismatch here.
            other => {
                return Err(AppendError::bind_type_mismatch(
                    format!("{}[]", other.sql_name()),
                    format!("{} sequence", slice.element_shape()),
                ));
            }
        },
        other => {
            return Err(AppendError::bind_type_mismatch(
                other.sql_name(),
                "list",
            ));
        }
    };

    if element_tag != sequence_tag(slice) {
        return Err(AppendError::bind_type_mismatch(
            format!("{}[]", element_tag.sql_name()),
            format!("{} sequence", slice.element_shape()),
        ));
    }

    let offset = binding.list_size();
    let length = slice.len();
    binding.data().write(
        row,
        ListEntry {
            offset: offset as u64,
            length: length as u64,
        },
    );
    binding.set_list_size(offset + length);
    if length == 0 {
        return Ok(());
    }
    binding.list_reserve(offset + length);

    match slice {
        SliceDatum::Bool(values) => {
            // Booleans are stored one byte per element.
            let bytes: Vec<u8> = values.iter().copied().map(u8::from).collect();
            binding.child_data().write_slice(offset, &bytes);
        }
        SliceDatum::Int8(values) => copy_fixed(binding.child_data(), offset, values),
        SliceDatum::Int16(values) => copy_fixed(binding.child_data(), offset, values),
        SliceDatum::Int32(values) => copy_fixed(binding.child_data(), offset, values),
        SliceDatum::Int64(values) => copy_fixed(binding.child_data(), offset, values),
        SliceDatum::UInt8(values) => copy_fixed(binding.child_data(), offset, values),
        SliceDatum::UInt16(values) => copy_fixed(binding.child_data(), offset, values),
        SliceDatum::UInt32(values) => copy_fixed(binding.child_data(), offset, values),
        SliceDatum::UInt64(values) => copy_fixed(binding.child_data(), offset, values),
        SliceDatum::Float32(values) => copy_fixed(binding.child_data(), offset, values),
        SliceDatum::Float64(values) => copy_fixed(binding.child_data(), offset, values),
        SliceDatum::Text(values) => {
            for (index, text) in values.iter().enumerate() {
                binding.assign_child_string(offset + index, text.as_bytes());
            }
        }
        SliceDatum::Blob(values) => {
            for (index, blob) in values.iter().enumerate() {
                binding.assign_child_string(offset + index, blob);
            }
        }
    }
    Ok(())
}

fn copy_fixed<T: Copy>(data: &mut RawData, offset: usize, values: &[T]) {
    data.write_slice(offset, values);
}

/// The exact element tag a sequence variant binds to.
const fn sequence_tag(slice: &SliceDatum) -> TypeTag {
    match slice {
        SliceDatum::Bool(_) => TypeTag::Boolean,
        SliceDatum::Int8(_) => TypeTag::TinyInt,
        SliceDatum::Int16(_) => TypeTag::SmallInt,
        SliceDatum::Int32(_) => TypeTag::Integer,
        SliceDatum::Int64(_) => TypeTag::BigInt,
        SliceDatum::UInt8(_) => TypeTag::UTinyInt,
        SliceDatum::UInt16(_) => TypeTag::USmallInt,
        SliceDatum::UInt32(_) => TypeTag::UInteger,
        SliceDatum::UInt64(_) => TypeTag::UBigInt,
        SliceDatum::Float32(_) => TypeTag::Float,
        SliceDatum::Float64(_) => TypeTag::Double,
        SliceDatum::Text(_) => TypeTag::Varchar,
        SliceDatum::Blob(_) => TypeTag::Blob,
    }
}
