//! Columnar vector memory and a minimal in-process storage backend.
//!
//! This crate is the engine-facing half of quiver's bulk-load path. It
//! defines the narrow vector interface the appender writes through
//! (logical types, fixed-capacity data chunks, raw payload pointers, lazily
//! allocated validity bitmaps, list child vectors, out-of-line string
//! storage) and backs it with an in-memory table catalog so the whole
//! stack runs without a native engine underneath.
//!
//! The write path deliberately mirrors a C-style vector API: a chunk is
//! allocated against the table's column types, filled in place, stamped
//! with its logical row count and handed to a [`TableAppender`]. The
//! higher-level row/value marshalling lives in the `quiver-append` crate.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod chunk;
pub mod database;
pub mod error;
pub mod types;
pub mod value;
pub mod vector;

// Re-export main types for convenience
pub use chunk::{DEFAULT_VECTOR_CAPACITY, DataChunk};
pub use database::{Database, EngineConfig, TableAppender};
pub use error::{EngineError, Result};
pub use types::{LogicalType, TypeTag};
pub use value::{Interval, Value};
pub use vector::{ListEntry, Vector};
