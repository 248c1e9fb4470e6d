use std::fmt;

use serde_json::Value;

use crate::error::{ClosureError, PointerError};
use crate::pointer::JsonPointer;

const COMPONENTS: &str = "components";
const SCHEMAS: &str = "schemas";

/// A reference to a named entry of `components.schemas`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaRef {
    name: String,
}

impl SchemaRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Parse a `$ref` value of the form `#/components/schemas/<Name>`.
    ///
    /// Returns `None` for anything else, including pointers that reach
    /// into a schema (`#/components/schemas/Pet/properties/id`).
    pub fn parse(value: &str) -> Option<Self> {
        let pointer = JsonPointer::parse(value).ok()?;
        match pointer.segments() {
            [components, schemas, name] if components == COMPONENTS && schemas == SCHEMAS => {
                Some(Self::new(name.clone()))
            }
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pointer(&self) -> JsonPointer {
        JsonPointer::from_segments([COMPONENTS, SCHEMAS, self.name.as_str()])
    }

    pub fn resolve<'a>(&self, document: &'a Value) -> Result<&'a Value, PointerError> {
        self.pointer().resolve(document)
    }
}

impl fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.pointer().fmt(f)
    }
}

/// One step on the way from a scanned value down to a `$ref`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    Key(&'a str),
    Index(usize),
}

/// A `$ref` occurrence found by [`find_refs`].
#[derive(Debug, Clone, PartialEq)]
pub struct RefSite<'a> {
    /// The value stored under the `$ref` key.
    pub value: &'a Value,
    /// Path from the scanned value to the `$ref` key, inclusive.
    pub location: Vec<PathSegment<'a>>,
}

impl<'a> RefSite<'a> {
    /// The pointer string, when the `$ref` value is a string.
    pub fn pointer(&self) -> Option<&'a str> {
        self.value.as_str()
    }

    /// Absolute location of the `$ref` key, given where the scanned value lives.
    pub fn location_from(&self, base: &JsonPointer) -> JsonPointer {
        let mut pointer = base.clone();
        for segment in &self.location {
            match segment {
                PathSegment::Key(key) => pointer.push(*key),
                PathSegment::Index(i) => pointer.push(i.to_string()),
            }
        }
        pointer
    }
}

/// Collect every `$ref` occurrence in `value`, depth-first, pre-order.
///
/// Object keys are visited in document order and array elements by index.
/// The value under a `$ref` key is reported and then still descended into.
/// Duplicates are kept.
pub fn find_refs(value: &Value) -> Vec<RefSite<'_>> {
    let mut sites = Vec::new();
    let mut path = Vec::new();
    walk(value, &mut path, &mut sites);
    sites
}

fn walk<'a>(value: &'a Value, path: &mut Vec<PathSegment<'a>>, sites: &mut Vec<RefSite<'a>>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                path.push(PathSegment::Key(key));
                if key == "$ref" {
                    sites.push(RefSite {
                        value: child,
                        location: path.clone(),
                    });
                }
                walk(child, path, sites);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                path.push(PathSegment::Index(i));
                walk(item, path, sites);
                path.pop();
            }
        }
        _ => {}
    }
}

/// Scan the definition of `owner` and turn every `$ref` into a [`SchemaRef`].
///
/// A `$ref` that is not a string, or not of the form
/// `#/components/schemas/<Name>`, is a `ClosureError::MalformedRef`.
pub fn schema_refs(node: &Value, owner: &SchemaRef) -> Result<Vec<SchemaRef>, ClosureError> {
    find_refs(node)
        .into_iter()
        .map(|site| {
            site.pointer()
                .and_then(SchemaRef::parse)
                .ok_or_else(|| ClosureError::MalformedRef {
                    value: site.value.to_string(),
                    referenced_by: owner.name().to_string(),
                    location: site.location_from(&owner.pointer()).to_string(),
                })
        })
        .collect()
}
