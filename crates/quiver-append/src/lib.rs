//! Row-oriented bulk ingestion over columnar chunk memory.
//!
//! This crate provides [`Appender`], a row writer bound to one table of a
//! [`quiver_vector::Database`]. Values are coerced and validated per column
//! (integer range checks, fixed-point decimal scaling, UUID text/binary
//! encoding, homogeneous list sequences) and written straight into
//! fixed-capacity data chunks, which are handed to the engine implicitly as
//! they fill.
//!
//! # Example
//!
//! ```
//! use quiver_append::Appender;
//! use quiver_vector::{Database, LogicalType, TypeTag};
//!
//! # fn main() -> quiver_append::Result<()> {
//! let db = Database::new();
//! db.create_table(
//!     "people",
//!     [
//!         ("id", LogicalType::primitive(TypeTag::Integer)),
//!         ("name", LogicalType::primitive(TypeTag::Varchar)),
//!     ],
//! )
//! .map_err(quiver_append::AppendError::from)?;
//!
//! let mut appender = Appender::new(db.appender("people").unwrap())?;
//! appender.append_row([quiver_append::Datum::from(1i64), "ada".into()])?;
//! appender.close()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

mod appender;
mod binding;
mod chunk;
mod coerce;
mod datum;
mod descriptor;
mod error;

pub use appender::Appender;
pub use datum::{Datum, SliceDatum};
pub use descriptor::{DecimalDescriptor, DecimalStorage, EnumDescriptor, TypeDescriptor};
pub use error::{AppendError, Result};
