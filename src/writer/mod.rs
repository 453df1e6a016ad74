//! Output codecs: SQL INSERT statements and PostgreSQL COPY blocks.
//!
//! Both codecs share the DDL preamble ([`ddl::write_ddl`]) and buffer their
//! output through [`StatementWriter`].

mod copy;
pub mod ddl;
pub mod escape;
mod sql;

pub use copy::CopyWriter;
pub use escape::{
    escape_copy, escape_identifier, escape_string, format_copy_value, format_value, quote_string,
};
pub use sql::SqlWriter;

use crate::schema::Schema;
use crate::value::{Row, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, BufWriter, Write};
use std::str::FromStr;

pub const WRITER_BUFFER_SIZE: usize = 256 * 1024;
pub const STMT_BUFFER_COUNT: usize = 100;
/// Rows per multi-value INSERT when batching without an explicit size
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Minimal output capability: the schema DDL.
pub trait Writer {
    fn write_schema(&mut self, schema: &Schema) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

/// Writer emitting rows as INSERT statements
pub trait RowWriter: Writer {
    fn write_insert(&mut self, table: &str, columns: &[String], row: &[Value]) -> io::Result<()>;

    /// One multi-value INSERT for all of `rows`; nothing is written when empty.
    fn write_batch_insert(
        &mut self,
        table: &str,
        columns: &[String],
        rows: &[Row],
    ) -> io::Result<()>;
}

/// Writer emitting rows as `COPY ... FROM stdin` blocks
pub trait CopyRowWriter: Writer {
    fn write_copy_header(&mut self, table: &str, columns: &[String]) -> io::Result<()>;
    fn write_copy_row(&mut self, row: &[Value]) -> io::Result<()>;
    fn write_copy_footer(&mut self) -> io::Result<()>;
}

/// Output format selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Sql,
    Copy,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Sql => "sql",
            OutputFormat::Copy => "copy",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sql" | "insert" => Ok(OutputFormat::Sql),
            "copy" => Ok(OutputFormat::Copy),
            _ => Err(format!("Unknown format: {}. Valid options: sql, copy", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Buffered line-oriented sink, flushed every [`STMT_BUFFER_COUNT`] statements.
pub struct StatementWriter<W: Write> {
    writer: BufWriter<W>,
    write_count: usize,
    max_stmt_buffer: usize,
}

impl<W: Write> StatementWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(WRITER_BUFFER_SIZE, inner),
            write_count: 0,
            max_stmt_buffer: STMT_BUFFER_COUNT,
        }
    }

    /// Write `stmt` followed by a newline.
    pub fn write_statement(&mut self, stmt: &[u8]) -> io::Result<()> {
        self.writer.write_all(stmt)?;
        self.writer.write_all(b"\n")?;

        self.write_count += 1;
        if self.write_count >= self.max_stmt_buffer {
            self.write_count = 0;
            self.writer.flush()?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.write_count = 0;
        self.writer.flush()
    }

    /// Flush and return the underlying sink.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: Write> Write for StatementWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        StatementWriter::flush(self)
    }
}

/// `table (a, b, c)` with identifiers escaped
pub(crate) fn table_with_columns(table: &str, columns: &[String]) -> Vec<u8> {
    let mut out = Vec::with_capacity(64);
    out.extend_from_slice(escape_identifier(table).as_bytes());
    out.extend_from_slice(b" (");
    for (i, col) in columns.iter().enumerate() {
        if i > 0 {
            out.extend_from_slice(b", ");
        }
        out.extend_from_slice(escape_identifier(col).as_bytes());
    }
    out.push(b')');
    out
}
