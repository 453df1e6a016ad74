//! Fluent builders producing pgsynth schema documents as JSON.

use serde_json::{json, Map, Value};

/// Builds a complete schema document
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    database: String,
    tables: Map<String, Value>,
    custom_types: Map<String, Value>,
    extensions: Vec<String>,
}

impl SchemaBuilder {
    pub fn new(database: &str) -> Self {
        Self {
            database: database.to_string(),
            tables: Map::new(),
            custom_types: Map::new(),
            extensions: Vec::new(),
        }
    }

    pub fn table(mut self, table: TableBuilder) -> Self {
        let (name, body) = table.build();
        self.tables.insert(name, body);
        self
    }

    pub fn enum_type(mut self, name: &str, labels: &[&str]) -> Self {
        self.custom_types
            .insert(name.to_string(), json!({ "type": "enum", "values": labels }));
        self
    }

    pub fn extension(mut self, name: &str) -> Self {
        self.extensions.push(name.to_string());
        self
    }

    pub fn build(self) -> Value {
        let mut doc = Map::new();
        doc.insert("version".into(), json!("1.0"));
        doc.insert(
            "database".into(),
            json!({ "name": self.database, "encoding": "UTF8", "locale": "en_US.UTF-8" }),
        );
        doc.insert("tables".into(), Value::Object(self.tables));
        if !self.custom_types.is_empty() {
            doc.insert("custom_types".into(), Value::Object(self.custom_types));
        }
        if !self.extensions.is_empty() {
            doc.insert("extensions".into(), json!(self.extensions));
        }
        Value::Object(doc)
    }
}

/// Builds one table definition
#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    row_count: u64,
    columns: Vec<Value>,
    primary_key: Vec<String>,
    foreign_keys: Vec<Value>,
    unique_constraints: Vec<Value>,
    indexes: Vec<Value>,
}

impl TableBuilder {
    pub fn new(name: &str, row_count: u64) -> Self {
        Self {
            name: name.to_string(),
            row_count,
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
            unique_constraints: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnBuilder) -> Self {
        self.columns.push(column.build());
        self
    }

    /// Composite primary key
    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn foreign_key(mut self, column: &str, table: &str, referenced: &str) -> Self {
        self.foreign_keys.push(json!({
            "columns": [column],
            "referenced_table": table,
            "referenced_columns": [referenced],
            "on_delete": "CASCADE",
        }));
        self
    }

    pub fn unique(mut self, name: &str, columns: &[&str]) -> Self {
        self.unique_constraints
            .push(json!({ "name": name, "columns": columns }));
        self
    }

    pub fn index(mut self, columns: &[&str]) -> Self {
        self.indexes.push(json!({ "columns": columns }));
        self
    }

    fn build(self) -> (String, Value) {
        let mut body = Map::new();
        body.insert("columns".into(), Value::Array(self.columns));
        if !self.primary_key.is_empty() {
            body.insert("primary_key".into(), json!(self.primary_key));
        }
        if !self.foreign_keys.is_empty() {
            body.insert("foreign_keys".into(), Value::Array(self.foreign_keys));
        }
        if !self.unique_constraints.is_empty() {
            body.insert(
                "unique_constraints".into(),
                Value::Array(self.unique_constraints),
            );
        }
        if !self.indexes.is_empty() {
            body.insert("indexes".into(), Value::Array(self.indexes));
        }
        body.insert("row_count".into(), json!(self.row_count));
        (self.name, Value::Object(body))
    }
}

/// Builds one column definition
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    fields: Map<String, Value>,
}

impl ColumnBuilder {
    pub fn new(name: &str, type_name: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("name".into(), json!(name));
        fields.insert("type".into(), json!(type_name));
        Self { fields }
    }

    fn set(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn nullable(self) -> Self {
        self.set("nullable", json!(true))
    }

    pub fn unique(self) -> Self {
        self.set("unique", json!(true))
    }

    pub fn primary_key(self) -> Self {
        self.set("primary_key", json!(true))
    }

    /// SQL default expression, emitted verbatim
    pub fn default_sql(self, expr: &str) -> Self {
        self.set("default", json!(expr))
    }

    pub fn comment(self, text: &str) -> Self {
        self.set("comment", json!(text))
    }

    /// Generator configuration; must contain a `type` key.
    pub fn config(self, config: Value) -> Self {
        self.set("generator_config", config)
    }

    fn build(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Shorthand for [`ColumnBuilder::new`]
pub fn col(name: &str, type_name: &str) -> ColumnBuilder {
    ColumnBuilder::new(name, type_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_document() {
        let doc = SchemaBuilder::new("demo")
            .enum_type("mood", &["happy", "sad"])
            .table(
                TableBuilder::new("people", 5)
                    .column(col("id", "serial").primary_key())
                    .column(col("mood", "mood").nullable()),
            )
            .build();

        assert_eq!(doc["version"], "1.0");
        assert_eq!(doc["database"]["name"], "demo");
        assert_eq!(doc["tables"]["people"]["row_count"], 5);
        assert_eq!(doc["tables"]["people"]["columns"][0]["primary_key"], true);
        assert_eq!(doc["custom_types"]["mood"]["values"][1], "sad");
        assert!(doc.get("extensions").is_none());
    }

    #[test]
    fn test_foreign_key_shape() {
        let (_, body) = TableBuilder::new("orders", 1)
            .column(col("user_id", "integer"))
            .foreign_key("user_id", "users", "id")
            .build();
        assert_eq!(body["foreign_keys"][0]["referenced_table"], "users");
        assert_eq!(body["foreign_keys"][0]["columns"][0], "user_id");
    }
}
