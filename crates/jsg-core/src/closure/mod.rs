pub mod build;
pub mod expand;
pub mod refs;

pub use build::{
    BuildOptions, SchemaComponents, SchemaDialect, StandaloneSchema, build_all, build_schema,
    schema_names,
};
pub use expand::{Closure, expand};
pub use refs::{PathSegment, RefSite, SchemaRef, find_refs, schema_refs};
