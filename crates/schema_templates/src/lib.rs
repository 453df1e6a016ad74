//! Pre-built schema documents for pgsynth.
//!
//! Each template is a complete schema document (the same JSON shape
//! `pgsynth generate` accepts), built with [`SchemaBuilder`].
//!
//! # Example
//!
//! ```rust
//! let doc = schema_templates::get("blog").unwrap();
//! assert_eq!(doc["database"]["name"], "blog");
//! ```

pub mod builder;

pub use builder::{col, ColumnBuilder, SchemaBuilder, TableBuilder};

use serde_json::{json, Value};

/// A named template
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub name: &'static str,
    pub description: &'static str,
    build: fn() -> Value,
}

impl Template {
    pub fn build(&self) -> Value {
        (self.build)()
    }
}

pub const TEMPLATES: &[Template] = &[
    Template {
        name: "blog",
        description: "Authors, posts, tags and threaded comments",
        build: blog,
    },
    Template {
        name: "ecommerce",
        description: "Customers, products, orders and order items",
        build: ecommerce,
    },
    Template {
        name: "saas",
        description: "Organizations, users, subscriptions and usage events",
        build: saas,
    },
];

/// Template names in alphabetical order
pub fn names() -> Vec<&'static str> {
    TEMPLATES.iter().map(|t| t.name).collect()
}

/// Build the template called `name` (case-insensitive).
pub fn get(name: &str) -> Option<Value> {
    TEMPLATES
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .map(Template::build)
}

pub fn ecommerce() -> Value {
    SchemaBuilder::new("ecommerce")
        .enum_type("order_status", &["pending", "paid", "shipped", "delivered", "cancelled"])
        .table(
            TableBuilder::new("customers", 100)
                .column(col("id", "serial").primary_key())
                .column(col("first_name", "varchar(50)"))
                .column(col("last_name", "varchar(50)"))
                .column(col("email", "varchar(255)").unique())
                .column(col("phone", "varchar(30)").nullable())
                .column(col("city", "varchar(100)").nullable())
                .column(col("country", "varchar(100)").nullable())
                .column(col("created_at", "timestamp").default_sql("now()")),
        )
        .table(
            TableBuilder::new("categories", 10)
                .column(col("id", "serial").primary_key())
                .column(col("name", "varchar(100)"))
                .column(col("slug", "varchar(100)").unique().config(json!({
                    "type": "pattern",
                    "pattern": "[a-z]{4,10}(-[a-z]{3,8})?",
                }))),
        )
        .table(
            TableBuilder::new("products", 200)
                .column(col("id", "serial").primary_key())
                .column(col("category_id", "integer"))
                .column(col("sku", "varchar(20)").unique().config(json!({
                    "type": "pattern",
                    "pattern": "[A-Z]{3}-[0-9]{5}",
                })))
                .column(col("title", "varchar(200)"))
                .column(col("description", "text").nullable())
                .column(col("price", "numeric(10,2)").config(json!({
                    "type": "normal",
                    "mean": 49.99,
                    "std_dev": 20.0,
                    "min": 0.99,
                })))
                .column(col("stock", "integer").config(json!({
                    "type": "range",
                    "min": 0,
                    "max": 500,
                })))
                .foreign_key("category_id", "categories", "id")
                .index(&["category_id"]),
        )
        .table(
            TableBuilder::new("orders", 500)
                .column(col("id", "serial").primary_key())
                .column(col("customer_id", "integer"))
                .column(col("order_number", "varchar(30)").unique().config(json!({
                    "type": "template",
                    "template": "ORD-{{year}}-{{seq:6}}",
                })))
                .column(col("status", "order_status"))
                .column(col("placed_at", "timestamp").config(json!({
                    "type": "time_series",
                    "interval": "2h",
                    "pattern": "daily_peak",
                })))
                .foreign_key("customer_id", "customers", "id")
                .index(&["customer_id"]),
        )
        .table(
            TableBuilder::new("order_items", 1500)
                .column(col("order_id", "integer"))
                .column(col("line_no", "integer").config(json!({
                    "type": "range",
                    "min": 1,
                    "max": 5,
                })))
                .column(col("product_id", "integer"))
                .column(col("quantity", "integer").config(json!({
                    "type": "poisson",
                    "lambda": 2.0,
                })))
                .primary_key(&["order_id", "line_no", "product_id"])
                .foreign_key("order_id", "orders", "id")
                .foreign_key("product_id", "products", "id"),
        )
        .build()
}

pub fn saas() -> Value {
    SchemaBuilder::new("saas")
        .extension("pgcrypto")
        .table(
            TableBuilder::new("organizations", 20)
                .column(col("id", "serial").primary_key())
                .column(col("name", "varchar(120)"))
                .column(col("plan", "varchar(20)").config(json!({
                    "type": "weighted_enum",
                    "weights": { "free": 0.6, "pro": 0.3, "enterprise": 0.1 },
                })))
                .column(col("created_at", "timestamptz")),
        )
        .table(
            TableBuilder::new("users", 200)
                .column(col("id", "serial").primary_key())
                .column(col("organization_id", "integer"))
                .column(col("email", "varchar(255)").unique())
                .column(col("full_name", "varchar(120)"))
                .column(col("role", "varchar(20)").config(json!({
                    "type": "weighted_enum",
                    "values": ["member", "admin", "owner"],
                    "weights": [8, 3, 1],
                })))
                .column(col("is_active", "boolean"))
                .column(col("updated_at", "timestamp").nullable())
                .foreign_key("organization_id", "organizations", "id"),
        )
        .table(
            TableBuilder::new("subscriptions", 20)
                .column(col("id", "serial").primary_key())
                .column(col("organization_id", "integer").unique())
                .column(col("seats", "integer").config(json!({
                    "type": "zipf",
                    "alpha": 1.8,
                    "min": 1,
                    "max": 250,
                })))
                .column(col("renews_at", "timestamp").config(json!({
                    "type": "time_series",
                    "start": "2025-01-01 00:00:00",
                    "end": "2025-12-31 23:59:59",
                    "pattern": "uniform",
                    "interval": "7d",
                })))
                .foreign_key("organization_id", "organizations", "id"),
        )
        .table(
            TableBuilder::new("events", 2000)
                .column(col("id", "bigserial").primary_key())
                .column(col("user_id", "integer"))
                .column(col("kind", "varchar(30)").config(json!({
                    "type": "weighted",
                    "weights": { "login": 5, "page_view": 12, "export": 1, "invite": 1 },
                })))
                .column(col("duration_ms", "integer").config(json!({
                    "type": "normal",
                    "mean": 850,
                    "std_dev": 300,
                    "min": 0,
                })))
                .column(col("occurred_at", "timestamp").config(json!({
                    "type": "time_series",
                    "interval": "15m",
                    "pattern": "business_hours",
                })))
                .foreign_key("user_id", "users", "id")
                .index(&["user_id", "occurred_at"]),
        )
        .build()
}

pub fn blog() -> Value {
    SchemaBuilder::new("blog")
        .table(
            TableBuilder::new("authors", 10)
                .column(col("id", "serial").primary_key())
                .column(col("name", "varchar(100)"))
                .column(col("email", "varchar(255)").unique())
                .column(col("bio", "text").nullable().comment("Shown on the author page")),
        )
        .table(
            TableBuilder::new("posts", 100)
                .column(col("id", "serial").primary_key())
                .column(col("author_id", "integer"))
                .column(col("title", "varchar(200)"))
                .column(col("slug", "varchar(120)").unique().config(json!({
                    "type": "template",
                    "template": "post-{{seq}}-{{rand:6}}",
                })))
                .column(col("body", "text"))
                .column(col("published", "boolean"))
                .column(col("created_at", "timestamp"))
                .column(col("updated_at", "timestamp").nullable())
                .foreign_key("author_id", "authors", "id"),
        )
        .table(
            TableBuilder::new("tags", 15)
                .column(col("id", "serial").primary_key())
                .column(col("label", "varchar(40)").unique().config(json!({
                    "type": "pattern",
                    "pattern": "[a-z]{3,12}",
                }))),
        )
        .table(
            TableBuilder::new("post_tags", 250)
                .column(col("post_id", "integer"))
                .column(col("tag_id", "integer"))
                .foreign_key("post_id", "posts", "id")
                .foreign_key("tag_id", "tags", "id")
                .unique("post_tags_pair", &["post_id", "tag_id"]),
        )
        .table(
            TableBuilder::new("comments", 500)
                .column(col("id", "serial").primary_key())
                .column(col("post_id", "integer"))
                .column(col("parent_id", "integer").nullable())
                .column(col("author_email", "varchar(255)"))
                .column(col("body", "text"))
                .column(col("created_at", "timestamp"))
                .foreign_key("post_id", "posts", "id")
                .foreign_key("parent_id", "comments", "id"),
        )
        .build()
}
