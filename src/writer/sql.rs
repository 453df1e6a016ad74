use super::ddl::write_ddl;
use super::escape::format_value;
use super::{table_with_columns, RowWriter, StatementWriter, Writer};
use crate::schema::Schema;
use crate::value::{Row, Value};
use std::io::{self, Write};

/// Emits DDL followed by `INSERT` statements.
///
/// A blank line separates the statements of consecutive tables.
pub struct SqlWriter<W: Write> {
    out: StatementWriter<W>,
    current_table: Option<String>,
}

impl<W: Write> SqlWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            out: StatementWriter::new(inner),
            current_table: None,
        }
    }

    pub fn into_inner(self) -> io::Result<W> {
        self.out.into_inner()
    }

    fn enter_table(&mut self, table: &str) -> io::Result<()> {
        if self.current_table.as_deref() != Some(table) {
            if self.current_table.is_some() {
                self.out.write_all(b"\n")?;
            }
            self.current_table = Some(table.to_string());
        }
        Ok(())
    }
}

fn insert_header(table: &str, columns: &[String]) -> Vec<u8> {
    let mut stmt = Vec::with_capacity(128);
    stmt.extend_from_slice(b"INSERT INTO ");
    stmt.extend_from_slice(&table_with_columns(table, columns));
    stmt.extend_from_slice(b" VALUES");
    stmt
}

fn push_tuple(stmt: &mut Vec<u8>, row: &[Value]) {
    stmt.push(b'(');
    for (i, value) in row.iter().enumerate() {
        if i > 0 {
            stmt.extend_from_slice(b", ");
        }
        stmt.extend_from_slice(format_value(value).as_bytes());
    }
    stmt.push(b')');
}

impl<W: Write> Writer for SqlWriter<W> {
    fn write_schema(&mut self, schema: &Schema) -> io::Result<()> {
        write_ddl(&mut self.out, schema)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl<W: Write> RowWriter for SqlWriter<W> {
    fn write_insert(&mut self, table: &str, columns: &[String], row: &[Value]) -> io::Result<()> {
        self.enter_table(table)?;
        let mut stmt = insert_header(table, columns);
        stmt.push(b' ');
        push_tuple(&mut stmt, row);
        stmt.push(b';');
        self.out.write_statement(&stmt)
    }

    fn write_batch_insert(
        &mut self,
        table: &str,
        columns: &[String],
        rows: &[Row],
    ) -> io::Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.enter_table(table)?;
        let mut stmt = insert_header(table, columns);
        for (i, row) in rows.iter().enumerate() {
            stmt.extend_from_slice(if i == 0 { &b"\n    "[..] } else { &b",\n    "[..] });
            push_tuple(&mut stmt, row);
        }
        stmt.push(b';');
        self.out.write_statement(&stmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols() -> Vec<String> {
        vec!["id".to_string(), "email".to_string(), "active".to_string()]
    }

    fn finish(w: SqlWriter<Vec<u8>>) -> String {
        String::from_utf8(w.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_single_insert() {
        let mut w = SqlWriter::new(Vec::new());
        w.write_insert(
            "users",
            &cols(),
            &[Value::Int(1), Value::from("o'neil@example.com"), Value::Bool(true)],
        )
        .unwrap();
        assert_eq!(
            finish(w),
            "INSERT INTO users (id, email, active) VALUES (1, 'o''neil@example.com', TRUE);\n"
        );
    }

    #[test]
    fn test_batch_insert() {
        let mut w = SqlWriter::new(Vec::new());
        let rows = vec![
            vec![Value::Int(1), Value::from("a@x.io"), Value::Bool(true)],
            vec![Value::Int(2), Value::Null, Value::Bool(false)],
        ];
        w.write_batch_insert("users", &cols(), &rows).unwrap();
        w.write_batch_insert("users", &cols(), &[]).unwrap();
        assert_eq!(
            finish(w),
            "INSERT INTO users (id, email, active) VALUES\n    (1, 'a@x.io', TRUE),\n    (2, NULL, FALSE);\n"
        );
    }

    #[test]
    fn test_tables_separated_by_blank_line() {
        let mut w = SqlWriter::new(Vec::new());
        let one = vec!["id".to_string()];
        w.write_insert("a", &one, &[Value::Int(1)]).unwrap();
        w.write_insert("a", &one, &[Value::Int(2)]).unwrap();
        w.write_insert("b", &one, &[Value::Int(1)]).unwrap();
        assert_eq!(
            finish(w),
            "INSERT INTO a (id) VALUES (1);\nINSERT INTO a (id) VALUES (2);\n\nINSERT INTO b (id) VALUES (1);\n"
        );
    }

    #[test]
    fn test_schema_preamble() {
        let mut w = SqlWriter::new(Vec::new());
        w.write_schema(&Schema::new("shop")).unwrap();
        assert!(finish(w).starts_with("CREATE DATABASE shop;\n\\c shop\n"));
    }
}
