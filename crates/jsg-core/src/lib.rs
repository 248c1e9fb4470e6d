pub mod closure;
pub mod config;
pub mod error;
pub mod parse;
pub mod pointer;
pub mod validate;
pub mod writer;

/// A parsed OpenAPI document. Objects keep their document key order.
pub type Document = serde_json::Value;

pub use closure::{
    BuildOptions, SchemaDialect, StandaloneSchema, build_all, build_schema, schema_names,
};
