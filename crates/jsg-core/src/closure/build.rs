use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::expand::expand;
use super::refs::{SchemaRef, schema_refs};
use crate::Document;
use crate::error::ClosureError;

/// The JSON Schema dialect advertised in the `$schema` keyword.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaDialect {
    #[default]
    #[serde(rename = "draft-04")]
    Draft04,
    #[serde(rename = "draft-07")]
    Draft07,
    #[serde(rename = "2019-09")]
    Draft201909,
    #[serde(rename = "2020-12")]
    Draft202012,
}

impl SchemaDialect {
    pub const ALL: [SchemaDialect; 4] = [
        SchemaDialect::Draft04,
        SchemaDialect::Draft07,
        SchemaDialect::Draft201909,
        SchemaDialect::Draft202012,
    ];

    pub fn uri(self) -> &'static str {
        match self {
            SchemaDialect::Draft04 => "http://json-schema.org/draft-04/schema#",
            SchemaDialect::Draft07 => "http://json-schema.org/draft-07/schema#",
            SchemaDialect::Draft201909 => "https://json-schema.org/draft/2019-09/schema",
            SchemaDialect::Draft202012 => "https://json-schema.org/draft/2020-12/schema",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaDialect::Draft04 => "draft-04",
            SchemaDialect::Draft07 => "draft-07",
            SchemaDialect::Draft201909 => "2019-09",
            SchemaDialect::Draft202012 => "2020-12",
        }
    }
}

impl fmt::Display for SchemaDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|d| d.as_str()).collect();
                format!("unknown dialect '{}', expected one of: {}", s, known.join(", "))
            })
    }
}

/// Options for [`build_schema`].
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub dialect: SchemaDialect,
}

/// A closed JSON Schema document: the root definition plus everything it
/// references, under `components.schemas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandaloneSchema {
    #[serde(rename = "$schema")]
    pub dialect: String,

    #[serde(rename = "$ref")]
    pub root_ref: String,

    pub components: SchemaComponents,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaComponents {
    pub schemas: IndexMap<String, Value>,
}

impl StandaloneSchema {
    /// Render with two-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// The `components.schemas` mapping of `document`, if there is one.
fn schema_map(document: &Document) -> Option<&serde_json::Map<String, Value>> {
    document
        .get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(Value::as_object)
}

/// Names of all schemas under `components.schemas`, in document order.
pub fn schema_names(document: &Document) -> Vec<String> {
    schema_map(document)
        .map(|schemas| schemas.keys().cloned().collect())
        .unwrap_or_default()
}

/// Build the standalone schema for `root_name`.
///
/// The output holds the root definition first, followed by every schema
/// reachable from it through `$ref`, and nothing else.
pub fn build_schema(
    document: &Document,
    root_name: &str,
    options: &BuildOptions,
) -> Result<StandaloneSchema, ClosureError> {
    let root_node = schema_map(document)
        .and_then(|schemas| schemas.get(root_name))
        .ok_or_else(|| ClosureError::SchemaNotFound(root_name.to_string()))?;
    let root = SchemaRef::new(root_name);

    let initial = schema_refs(root_node, &root)?;
    let closure = expand(document, &root, initial)?;

    let mut schemas = IndexMap::with_capacity(closure.len() + 1);
    schemas.insert(root_name.to_string(), root_node.clone());
    for (schema_ref, node) in closure {
        schemas.insert(schema_ref.name().to_string(), node.clone());
    }

    info!(
        "built {} with {} referenced schema(s)",
        root_name,
        schemas.len() - 1
    );

    Ok(StandaloneSchema {
        dialect: options.dialect.uri().to_string(),
        root_ref: root.to_string(),
        components: SchemaComponents { schemas },
    })
}

/// Build one standalone schema per name. Stops at the first failure.
pub fn build_all<S: AsRef<str>>(
    document: &Document,
    names: &[S],
    options: &BuildOptions,
) -> Result<IndexMap<String, StandaloneSchema>, ClosureError> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            build_schema(document, name, options).map(|schema| (name.to_string(), schema))
        })
        .collect()
}
