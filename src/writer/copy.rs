use super::ddl::write_ddl;
use super::escape::format_copy_value;
use super::{table_with_columns, CopyRowWriter, StatementWriter, Writer};
use crate::schema::Schema;
use crate::value::Value;
use std::io::{self, Write};

/// Emits DDL followed by one `COPY ... FROM stdin` block per table.
pub struct CopyWriter<W: Write> {
    out: StatementWriter<W>,
}

impl<W: Write> CopyWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            out: StatementWriter::new(inner),
        }
    }

    pub fn into_inner(self) -> io::Result<W> {
        self.out.into_inner()
    }
}

impl<W: Write> Writer for CopyWriter<W> {
    fn write_schema(&mut self, schema: &Schema) -> io::Result<()> {
        write_ddl(&mut self.out, schema)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl<W: Write> CopyRowWriter for CopyWriter<W> {
    fn write_copy_header(&mut self, table: &str, columns: &[String]) -> io::Result<()> {
        let mut stmt = Vec::with_capacity(64);
        stmt.extend_from_slice(b"COPY ");
        stmt.extend_from_slice(&table_with_columns(table, columns));
        stmt.extend_from_slice(b" FROM stdin;");
        self.out.write_statement(&stmt)
    }

    fn write_copy_row(&mut self, row: &[Value]) -> io::Result<()> {
        let mut line = Vec::with_capacity(row.len() * 16);
        for (i, value) in row.iter().enumerate() {
            if i > 0 {
                line.push(b'\t');
            }
            line.extend_from_slice(format_copy_value(value).as_bytes());
        }
        self.out.write_statement(&line)
    }

    fn write_copy_footer(&mut self) -> io::Result<()> {
        self.out.write_statement(b"\\.")?;
        self.out.write_all(b"\n")
    }
}
