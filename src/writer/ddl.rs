//! Schema DDL shared by both output formats.

use super::escape::{escape_identifier, quote_string};
use crate::schema::{Column, Schema, Sequence, Table};
use std::io::{self, Write};

/// Emit the database preamble and DDL for every table in generation order.
pub fn write_ddl<W: Write>(out: &mut W, schema: &Schema) -> io::Result<()> {
    let db = escape_identifier(&schema.database.name);
    writeln!(out, "CREATE DATABASE {};", db)?;
    writeln!(out, "\\c {}", db)?;
    writeln!(out)?;
    writeln!(
        out,
        "SET client_encoding = {};",
        quote_string(&schema.database.encoding)
    )?;
    writeln!(out)?;

    if !schema.extensions.is_empty() {
        for ext in &schema.extensions {
            writeln!(
                out,
                "CREATE EXTENSION IF NOT EXISTS \"{}\";",
                ext.replace('"', "\"\"")
            )?;
        }
        writeln!(out)?;
    }

    let enums: Vec<_> = schema
        .custom_types
        .iter()
        .filter(|(_, t)| t.is_enum())
        .collect();
    if !enums.is_empty() {
        for (name, ty) in enums {
            let labels: Vec<String> = ty.values.iter().map(|v| quote_string(v)).collect();
            writeln!(
                out,
                "CREATE TYPE {} AS ENUM ({});",
                escape_identifier(name),
                labels.join(", ")
            )?;
        }
        writeln!(out)?;
    }

    if !schema.sequences.is_empty() {
        for (name, seq) in &schema.sequences {
            out.write_all(&create_sequence(name, seq))?;
        }
        writeln!(out)?;
    }

    for name in schema.generation_order() {
        if let Some(table) = schema.table(&name) {
            out.write_all(&create_table(table))?;
        }
    }
    Ok(())
}

fn create_sequence(name: &str, seq: &Sequence) -> Vec<u8> {
    let mut stmt = format!(
        "CREATE SEQUENCE {} START WITH {} INCREMENT BY {}",
        escape_identifier(name),
        seq.start,
        seq.increment
    );
    if let Some(min) = seq.min_value {
        stmt.push_str(&format!(" MINVALUE {}", min));
    }
    if let Some(max) = seq.max_value {
        stmt.push_str(&format!(" MAXVALUE {}", max));
    }
    if seq.cycle {
        stmt.push_str(" CYCLE");
    }
    stmt.push_str(";\n");
    stmt.into_bytes()
}

fn column_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| escape_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn column_definition(column: &Column, inline_pk: bool) -> String {
    let mut def = format!("    {} {}", escape_identifier(&column.name), column.type_name);
    if inline_pk {
        def.push_str(" PRIMARY KEY");
    } else if !column.nullable {
        def.push_str(" NOT NULL");
    }
    if let Some(default) = column.default_sql() {
        def.push_str(" DEFAULT ");
        def.push_str(&default);
    }
    if column.unique && !inline_pk {
        def.push_str(" UNIQUE");
    }
    def
}

/// `CREATE TABLE` plus the table's indexes and column comments.
pub fn create_table(table: &Table) -> Vec<u8> {
    let pk = table.primary_key_columns();
    let single_pk = if pk.len() == 1 { Some(pk[0]) } else { None };

    let mut lines: Vec<String> = table
        .columns
        .iter()
        .map(|c| column_definition(c, single_pk == Some(c.name.as_str())))
        .collect();

    if pk.len() > 1 {
        let cols: Vec<String> = pk.iter().map(|c| c.to_string()).collect();
        lines.push(format!("    PRIMARY KEY ({})", column_list(&cols)));
    }
    for uc in &table.unique_constraints {
        let constraint = match uc.name {
            Some(ref name) => format!("CONSTRAINT {} ", escape_identifier(name)),
            None => String::new(),
        };
        lines.push(format!("    {}UNIQUE ({})", constraint, column_list(&uc.columns)));
    }
    for check in &table.check_constraints {
        let constraint = match check.name {
            Some(ref name) => format!("CONSTRAINT {} ", escape_identifier(name)),
            None => String::new(),
        };
        lines.push(format!("    {}CHECK ({})", constraint, check.expression));
    }

    let table_ident = escape_identifier(&table.name);
    let mut out = Vec::with_capacity(256);
    out.extend_from_slice(b"CREATE TABLE ");
    out.extend_from_slice(table_ident.as_bytes());
    out.extend_from_slice(b" (\n");
    out.extend_from_slice(lines.join(",\n").as_bytes());
    out.extend_from_slice(b"\n);\n");

    for index in &table.indexes {
        let name = match index.name {
            Some(ref name) => name.clone(),
            None => format!("{}_{}_idx", table.name, index.columns.join("_")),
        };
        out.extend_from_slice(if index.unique {
            b"CREATE UNIQUE INDEX ".as_slice()
        } else {
            b"CREATE INDEX ".as_slice()
        });
        out.extend_from_slice(escape_identifier(&name).as_bytes());
        out.extend_from_slice(b" ON ");
        out.extend_from_slice(table_ident.as_bytes());
        if let Some(ref method) = index.method {
            out.extend_from_slice(b" USING ");
            out.extend_from_slice(method.as_bytes());
        }
        out.extend_from_slice(b" (");
        out.extend_from_slice(column_list(&index.columns).as_bytes());
        out.extend_from_slice(b");\n");
    }

    for column in &table.columns {
        if let Some(ref comment) = column.comment {
            out.extend_from_slice(
                format!(
                    "COMMENT ON COLUMN {}.{} IS {};\n",
                    table_ident,
                    escape_identifier(&column.name),
                    quote_string(comment)
                )
                .as_bytes(),
            );
        }
    }

    out.push(b'\n');
    out
}
