//! Row-oriented bulk appender.
//!
//! [`Appender`] wraps an engine [`TableAppender`] handle with a row-at-a-time
//! writing surface: values land directly in columnar chunk memory through
//! cached bindings, and a full chunk is handed to the engine implicitly, so
//! callers never see the chunk boundary. Construction resolves every column
//! descriptor up front; the write path does no type resolution.

use tracing::{debug, warn};

use quiver_vector::{LogicalType, TableAppender};

use crate::binding::VectorBinding;
use crate::chunk::ChunkState;
use crate::coerce;
use crate::datum::Datum;
use crate::descriptor::TypeDescriptor;
use crate::error::{AppendError, Result};

/// Row writer over an engine appender handle.
///
/// Values are staged into a fixed-capacity chunk and shipped to the engine
/// whenever the chunk fills, on [`Self::flush`], and on [`Self::close`].
/// Dropping an appender without closing discards any unflushed rows.
#[derive(Debug)]
pub struct Appender {
    handle: TableAppender,
    types: Vec<LogicalType>,
    bindings: Vec<VectorBinding>,
    chunk: ChunkState,
    last_error: Option<String>,
}

impl Appender {
    /// Build an appender over an engine handle, resolving every column's
    /// descriptor.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedType` if any column type has no appender
    /// mapping, and `CannotAppendToEnum` if any column is an enum or a
    /// list of enums. Both are fatal; no appender is constructed.
    pub fn new(handle: TableAppender) -> Result<Self> {
        let types: Vec<LogicalType> = (0..handle.column_count())
            .map(|index| handle.column_type(index))
            .collect();
        let mut bindings = Vec::with_capacity(types.len());
        for (column, ty) in types.iter().enumerate() {
            let descriptor = TypeDescriptor::resolve(ty)?;
            if descriptor.contains_enum() {
                return Err(AppendError::cannot_append_to_enum(column));
            }
            bindings.push(VectorBinding::new(descriptor));
        }
        debug!(
            columns = types.len(),
            capacity = handle.vector_capacity(),
            "opened appender"
        );
        Ok(Self {
            chunk: ChunkState::new(handle.vector_capacity()),
            handle,
            types,
            bindings,
            last_error: None,
        })
    }

    /// Number of columns being appended.
    #[must_use]
    pub const fn column_count(&self) -> usize {
        self.types.len()
    }

    /// Logical type of column `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn column_type(&self, index: usize) -> &LogicalType {
        &self.types[index]
    }

    /// Row capacity of each staged chunk.
    #[must_use]
    pub const fn vector_capacity(&self) -> usize {
        self.chunk.capacity()
    }

    /// Diagnostic text of the most recent failure, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start a row. Idempotent; [`Self::append_value`] starts one
    /// implicitly, so calling this is never required.
    pub fn begin_row(&mut self) {
        self.chunk.begin(&self.types, &mut self.bindings);
    }

    /// Write `value` into `column` of the current row.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` for an out-of-range column and the
    /// value-level errors (`BindTypeMismatch`, `OutOfRange`, `InvalidUuid`)
    /// from coercion. All leave the appender usable; the failed column can
    /// be retried.
    pub fn append_value(&mut self, column: usize, value: impl Into<Datum>) -> Result<()> {
        if column >= self.bindings.len() {
            return self.record(Err(AppendError::schema_mismatch(
                self.bindings.len(),
                column + 1,
            )));
        }
        self.chunk.begin(&self.types, &mut self.bindings);
        let row = self.chunk.row();
        let datum = value.into();
        let result = coerce::write_value(&mut self.bindings[column], row, &datum);
        self.record(result)
    }

    /// Finish the current row, shipping the chunk to the engine if it is
    /// now full.
    ///
    /// # Errors
    ///
    /// Returns `AppendFailed` if the implicit flush is rejected by the
    /// engine.
    pub fn end_row(&mut self) -> Result<()> {
        self.chunk.begin(&self.types, &mut self.bindings);
        self.chunk.advance_row();
        if self.chunk.at_capacity() {
            self.flush()?;
        }
        Ok(())
    }

    /// Append one complete row.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if `values` does not have one entry per
    /// column, plus everything [`Self::append_value`] and
    /// [`Self::end_row`] can return.
    pub fn append_row<I, V>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Datum>,
    {
        let values: Vec<Datum> = values.into_iter().map(Into::into).collect();
        if values.len() != self.column_count() {
            return self.record(Err(AppendError::schema_mismatch(
                self.column_count(),
                values.len(),
            )));
        }
        self.begin_row();
        for (column, datum) in values.iter().enumerate() {
            self.append_value(column, datum.clone())?;
        }
        self.end_row()
    }

    /// Ship all staged rows to the engine and publish them.
    ///
    /// A no-op when nothing is staged. On engine rejection the staged rows
    /// are discarded, the engine's diagnostic is retained in
    /// [`Self::last_error`], and the appender accepts fresh rows.
    ///
    /// # Errors
    ///
    /// Returns `AppendFailed` carrying the engine's diagnostic text.
    pub fn flush(&mut self) -> Result<()> {
        let Some(chunk) = self.chunk.take(&mut self.bindings) else {
            return Ok(());
        };
        if chunk.size() == 0 {
            return Ok(());
        }
        let shipped = chunk.size();
        let result = self
            .handle
            .append_chunk(&chunk)
            .and_then(|()| self.handle.flush())
            .map_err(AppendError::from);
        if result.is_ok() {
            debug!(rows = shipped, "flushed rows");
        }
        self.record(result)
    }

    /// Flush and release the appender.
    ///
    /// # Errors
    ///
    /// Returns `AppendFailed` if the final flush is rejected; the staged
    /// rows are lost either way.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }

    fn record<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.last_error = Some(err.to_string());
        }
        result
    }
}

impl Drop for Appender {
    fn drop(&mut self) {
        // `close` and `flush` leave no open chunk, so this only fires when
        // the appender is dropped mid-write.
        if self.chunk.is_open() && self.chunk.row() > 0 {
            warn!(rows = self.chunk.row(), "appender dropped with unflushed rows");
            self.chunk.take(&mut self.bindings);
        }
    }
}
