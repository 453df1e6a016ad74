//! PostgreSQL type families.
//!
//! Column types are free-form PostgreSQL type strings (`varchar(255)`,
//! `timestamp with time zone`, `numeric(10,2)`, `int[]`). Validation and
//! generator selection only care about the family a type belongs to, so the
//! parameter suffix is stripped and the remaining base name is looked up.

use std::fmt;

/// Broad family of a PostgreSQL column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFamily {
    /// serial, bigserial, smallserial
    Serial,
    /// smallint, integer, bigint
    Integer,
    /// real, double precision, numeric, decimal
    Float,
    /// char, varchar, text
    Character,
    Boolean,
    /// date, time, timestamp, interval
    DateTime,
    /// bytea
    Binary,
    Uuid,
    /// json, jsonb
    Json,
    /// inet, cidr, macaddr
    Network,
    /// point, line, polygon, ...
    Geometric,
    Money,
    Xml,
}

impl TypeFamily {
    /// Resolve a type string to its family, or `None` for unknown types.
    pub fn from_pg_type(type_str: &str) -> Option<Self> {
        let base = base_type(type_str);
        let family = match base.as_str() {
            "serial" | "serial4" | "bigserial" | "serial8" | "smallserial" | "serial2" => {
                TypeFamily::Serial
            }
            "smallint" | "int2" | "integer" | "int" | "int4" | "bigint" | "int8" => {
                TypeFamily::Integer
            }
            "real" | "float4" | "double precision" | "float8" | "float" | "numeric"
            | "decimal" => TypeFamily::Float,
            "char" | "character" | "varchar" | "character varying" | "text" | "bpchar"
            | "citext" | "name" => TypeFamily::Character,
            "boolean" | "bool" => TypeFamily::Boolean,
            "date" | "time" | "timetz" | "time with time zone" | "time without time zone"
            | "timestamp" | "timestamptz" | "timestamp with time zone"
            | "timestamp without time zone" | "interval" => TypeFamily::DateTime,
            "bytea" => TypeFamily::Binary,
            "uuid" => TypeFamily::Uuid,
            "json" | "jsonb" => TypeFamily::Json,
            "inet" | "cidr" | "macaddr" | "macaddr8" => TypeFamily::Network,
            "point" | "line" | "lseg" | "box" | "path" | "polygon" | "circle" => {
                TypeFamily::Geometric
            }
            "money" => TypeFamily::Money,
            "xml" => TypeFamily::Xml,
            _ => return None,
        };
        Some(family)
    }

    /// Name of the basic generator used for columns of this family
    /// when neither configuration nor semantic detection applies.
    pub fn default_generator(self, base: &str) -> &'static str {
        match self {
            TypeFamily::Serial => "serial",
            TypeFamily::Integer => "integer",
            TypeFamily::Boolean => "boolean",
            TypeFamily::DateTime => "timestamp",
            TypeFamily::Character if base == "text" => "text",
            _ => "varchar",
        }
    }

    /// True for families whose values are textual in a dump.
    pub fn is_textual(self) -> bool {
        matches!(self, TypeFamily::Character)
    }
}

impl fmt::Display for TypeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeFamily::Serial => "serial",
            TypeFamily::Integer => "integer",
            TypeFamily::Float => "floating-point",
            TypeFamily::Character => "character",
            TypeFamily::Boolean => "boolean",
            TypeFamily::DateTime => "date/time",
            TypeFamily::Binary => "binary",
            TypeFamily::Uuid => "uuid",
            TypeFamily::Json => "json",
            TypeFamily::Network => "network",
            TypeFamily::Geometric => "geometric",
            TypeFamily::Money => "money",
            TypeFamily::Xml => "xml",
        };
        write!(f, "{}", name)
    }
}

/// Lowercased base type with parameters and array suffixes removed.
///
/// `VARCHAR(255)` → `varchar`, `timestamp(3) with time zone` →
/// `timestamp with time zone`, `int[]` → `int`.
pub fn base_type(type_str: &str) -> String {
    let lower = type_str.trim().to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut depth = 0usize;
    for c in lower.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '[' | ']' => {}
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The first numeric parameter of a type, e.g. `255` for `varchar(255)`.
pub fn type_length(type_str: &str) -> Option<usize> {
    let open = type_str.find('(')?;
    let close = type_str[open..].find(')')? + open;
    type_str[open + 1..close]
        .split(',')
        .next()
        .and_then(|s| s.trim().parse().ok())
}
