//! Deterministic synthetic PostgreSQL dump generator.
//!
//! A [`schema::Schema`] document is validated, then fed through the
//! [`pipeline::Pipeline`], which produces rows with the generators of
//! [`generator`] and writes them through a [`writer`] as INSERT or COPY.

pub mod cache;
pub mod compression;
pub mod config;
pub mod context;
pub mod error;
pub mod generator;
pub mod json_schema;
pub mod pipeline;
pub mod schema;
pub mod validate;
pub mod value;
pub mod worker;
pub mod writer;
