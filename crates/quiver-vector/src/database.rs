//! Minimal in-process storage backend.
//!
//! Just enough engine to stand behind the bulk appender: a named-table
//! catalog, per-table appender handles that accept data chunks, and an
//! ordered scan for reading results back. There is no SQL surface, planner
//! or persistence here; rows live in memory in insertion order.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::chunk::{DEFAULT_VECTOR_CAPACITY, DataChunk};
use crate::error::{EngineError, Result};
use crate::types::{LogicalType, TypeTag};
use crate::value::Value;
use crate::vector::Vector;

/// Backend configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Row capacity of every vector and data chunk.
    ///
    /// This is the unit of bulk transfer between the appender and the
    /// backend. Default: 2048 rows.
    pub vector_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vector_capacity: DEFAULT_VECTOR_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Configuration with the given vector capacity.
    #[must_use]
    pub const fn with_vector_capacity(vector_capacity: usize) -> Self {
        Self { vector_capacity }
    }
}

#[derive(Debug)]
struct Table {
    name: String,
    columns: Vec<(String, LogicalType)>,
    rows: Vec<Vec<Value>>,
}

type SharedTable = Arc<RwLock<Table>>;

/// In-memory table catalog.
///
/// Cloning shares the catalog; tables created through one handle are visible
/// through every clone. Individual [`TableAppender`]s are single-threaded,
/// but independent appenders on the same table may run concurrently.
#[derive(Debug, Clone, Default)]
pub struct Database {
    tables: Arc<RwLock<HashMap<String, SharedTable>>>,
    config: EngineConfig,
}

impl Database {
    /// Catalog with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the given configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            tables: Arc::default(),
            config,
        }
    }

    /// Engine-defined vector capacity.
    #[must_use]
    pub const fn vector_capacity(&self) -> usize {
        self.config.vector_capacity
    }

    /// Create a table with the given columns, in declaration order.
    pub fn create_table<I, S>(&self, name: &str, columns: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, LogicalType)>,
        S: Into<String>,
    {
        let mut tables = self.tables.write();
        if tables.contains_key(name) {
            return Err(EngineError::TableExists(name.to_owned()));
        }
        let columns: Vec<(String, LogicalType)> = columns
            .into_iter()
            .map(|(n, ty)| (n.into(), ty))
            .collect();
        debug!(table = name, columns = columns.len(), "created table");
        tables.insert(
            name.to_owned(),
            Arc::new(RwLock::new(Table {
                name: name.to_owned(),
                columns,
                rows: Vec::new(),
            })),
        );
        Ok(())
    }

    /// Open an appender handle bound to `table`.
    pub fn appender(&self, table: &str) -> Result<TableAppender> {
        let tables = self.tables.read();
        let shared = tables
            .get(table)
            .ok_or_else(|| EngineError::UnknownTable(table.to_owned()))?;
        let types = shared
            .read()
            .columns
            .iter()
            .map(|(_, ty)| ty.clone())
            .collect();
        Ok(TableAppender {
            table: Arc::clone(shared),
            types,
            vector_capacity: self.config.vector_capacity,
            pending: Vec::new(),
            error: None,
        })
    }

    /// All rows of `table` in insertion order.
    pub fn scan(&self, table: &str) -> Result<Vec<Vec<Value>>> {
        let tables = self.tables.read();
        let shared = tables
            .get(table)
            .ok_or_else(|| EngineError::UnknownTable(table.to_owned()))?;
        Ok(shared.read().rows.clone())
    }

    /// Number of rows currently visible in `table`.
    pub fn row_count(&self, table: &str) -> Result<usize> {
        let tables = self.tables.read();
        let shared = tables
            .get(table)
            .ok_or_else(|| EngineError::UnknownTable(table.to_owned()))?;
        Ok(shared.read().rows.len())
    }
}

/// Engine-side appender handle, bound to one table.
///
/// Accepts whole data chunks, validates them against the table's column
/// list, and buffers the materialized rows until [`Self::flush`]. The most
/// recent failure's text is retained and readable via
/// [`Self::error_message`], mirroring a status-plus-diagnostic C interface.
#[derive(Debug)]
pub struct TableAppender {
    table: SharedTable,
    types: Vec<LogicalType>,
    vector_capacity: usize,
    pending: Vec<Vec<Value>>,
    error: Option<String>,
}

impl TableAppender {
    /// Number of columns of the target table.
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
    pub fn column_type(&self, index: usize) -> LogicalType {
        self.types[index].clone()
    }

    /// Row capacity chunks for this appender should be allocated with.
    #[must_use]
    pub const fn vector_capacity(&self) -> usize {
        self.vector_capacity
    }

    /// Validate `chunk` against the table and buffer its first
    /// [`DataChunk::size`] rows.
    pub fn append_chunk(&mut self, chunk: &DataChunk) -> Result<()> {
        self.checked(|this| {
            if chunk.column_count() != this.types.len() {
                let table = this.table.read().name.clone();
                return Err(EngineError::ColumnMismatch {
                    table,
                    message: format!(
                        "expected {} columns, chunk has {}",
                        this.types.len(),
                        chunk.column_count()
                    ),
                });
            }
            for (index, ty) in this.types.iter().enumerate() {
                let vector = chunk.vector(index);
                if vector.logical_type() != ty {
                    let table = this.table.read().name.clone();
                    return Err(EngineError::ColumnMismatch {
                        table,
                        message: format!(
                            "column {index} is {}, chunk vector is {}",
                            ty,
                            vector.logical_type()
                        ),
                    });
                }
                validate_payload(vector, chunk.size(), index)?;
            }
            trace!(rows = chunk.size(), "buffered chunk");
            this.pending
                .extend((0..chunk.size()).map(|row| chunk.row_values(row)));
            Ok(())
        })
    }

    /// Publish buffered rows to the table.
    pub fn flush(&mut self) -> Result<()> {
        let rows = std::mem::take(&mut self.pending);
        if rows.is_empty() {
            return Ok(());
        }
        let mut table = self.table.write();
        debug!(table = %table.name, rows = rows.len(), "flushed appender");
        table.rows.extend(rows);
        Ok(())
    }

    /// Diagnostic text of the most recent failed operation, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn checked(&mut self, op: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        match op(self) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}

/// Reject payloads that violate the column type's encoding rules.
///
/// Varchar payloads must be valid UTF-8; list columns are checked through
/// their child vectors over the used element range.
fn validate_payload(vector: &Vector, rows: usize, column: usize) -> Result<()> {
    match vector.logical_type().type_tag() {
        TypeTag::Varchar => {
            for row in 0..rows {
                if vector.is_row_valid(row) && std::str::from_utf8(vector.varlen_at(row)).is_err()
                {
                    return Err(EngineError::InvalidData {
                        column,
                        message: format!("row {row} is not valid utf-8"),
                    });
                }
            }
            Ok(())
        }
        TypeTag::List => validate_payload(vector.list_child(), vector.list_size(), column),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_int_table() -> (Database, TableAppender) {
        let db = Database::with_config(EngineConfig::with_vector_capacity(8));
        db.create_table("t", [("v", LogicalType::primitive(TypeTag::Integer))])
            .expect("fresh table");
        let appender = db.appender("t").expect("table exists");
        (db, appender)
    }

    #[test]
    fn test_create_table_twice_fails() {
        let db = Database::new();
        db.create_table("t", [("v", LogicalType::primitive(TypeTag::Integer))])
            .expect("fresh table");
        let err = db
            .create_table("t", [("v", LogicalType::primitive(TypeTag::Integer))])
            .expect_err("duplicate table");
        assert!(matches!(err, EngineError::TableExists(_)));
    }

    #[test]
    fn test_unknown_table() {
        let db = Database::new();
        assert!(matches!(
            db.appender("missing"),
            Err(EngineError::UnknownTable(_))
        ));
        assert!(matches!(
            db.scan("missing"),
            Err(EngineError::UnknownTable(_))
        ));
    }

    #[test]
    fn test_append_chunk_and_flush() {
        let (db, mut appender) = one_int_table();
        assert_eq!(appender.column_count(), 1);
        assert_eq!(appender.vector_capacity(), 8);

        let mut chunk = DataChunk::new(&[appender.column_type(0)], 8);
        let data = chunk.vector_mut(0).data_ptr();
        // SAFETY: rows 0..3 are within the 8-row i32 payload buffer.
        unsafe {
            for row in 0..3 {
                data.cast::<i32>().as_ptr().add(row).write_unaligned(row as i32 * 10);
            }
        }
        chunk.set_size(3);

        appender.append_chunk(&chunk).expect("valid chunk");
        assert_eq!(db.row_count("t").expect("table exists"), 0);
        appender.flush().expect("flush");
        assert_eq!(
            db.scan("t").expect("table exists"),
            vec![
                vec![Value::Int32(0)],
                vec![Value::Int32(10)],
                vec![Value::Int32(20)],
            ]
        );
    }

    #[test]
    fn test_append_chunk_arity_mismatch() {
        let (_db, mut appender) = one_int_table();
        let chunk = DataChunk::new(
            &[
                LogicalType::primitive(TypeTag::Integer),
                LogicalType::primitive(TypeTag::Integer),
            ],
            8,
        );
        let err = appender.append_chunk(&chunk).expect_err("arity mismatch");
        assert!(matches!(err, EngineError::ColumnMismatch { .. }));
        assert!(
            appender
                .error_message()
                .expect("diagnostic retained")
                .contains("expected 1 columns")
        );
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let db = Database::with_config(EngineConfig::with_vector_capacity(8));
        db.create_table("s", [("v", LogicalType::primitive(TypeTag::Varchar))])
            .expect("fresh table");
        let mut appender = db.appender("s").expect("table exists");

        let mut chunk = DataChunk::new(&[appender.column_type(0)], 8);
        chunk.vector_mut(0).assign_string_element(0, &[0xff, 0xfe]);
        chunk.set_size(1);

        let err = appender.append_chunk(&chunk).expect_err("bad utf-8");
        assert!(matches!(err, EngineError::InvalidData { .. }));
        assert!(db.scan("s").expect("table exists").is_empty());
    }
}
