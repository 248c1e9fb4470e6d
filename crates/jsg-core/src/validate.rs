use std::fmt;
use std::sync::LazyLock;

use jsonschema::Validator;
use log::{debug, error};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::Document;
use crate::closure::find_refs;
use crate::pointer::JsonPointer;

/// OpenAPI 3.0 document schema (2021-09-28), draft-04.
const OPENAPI_30_SCHEMA: &str = include_str!("../schemas/openapi-3.0.json");

static OPENAPI_30: LazyLock<Result<Validator, String>> = LazyLock::new(|| {
    let schema: Value = serde_json::from_str(OPENAPI_30_SCHEMA).map_err(|e| e.to_string())?;
    jsonschema::validator_for(&schema).map_err(|e| e.to_string())
});

/// Info object, the part of it the pre-check cares about.
#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Info {
    title: String,
    version: String,
}

/// A single structural problem found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Fragment pointer to the offending value.
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Outcome of [`validate_document`], with a short summary of what was found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub openapi: Option<String>,
    pub title: Option<String>,
    pub version: Option<String>,
    pub path_count: usize,
    pub schema_count: usize,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    fn push(&mut self, path: impl fmt::Display, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: path.to_string(),
            message: message.into(),
        });
    }
}

/// Pre-check of an OpenAPI 3.x document.
///
/// `3.0.x` documents are validated against the OpenAPI 3.0 document schema.
/// Later 3.x versions get a structural check of the mandatory fields and of
/// the shape the schema builder relies on. In both cases every local
/// reference inside `components.schemas` must resolve.
pub fn validate_document(document: &Document) -> ValidationReport {
    let mut report = ValidationReport::default();

    let Some(root) = document.as_object() else {
        report.push(JsonPointer::root(), "document must be a mapping");
        return report;
    };
    summarize(root, &mut report);

    match root.get("openapi") {
        Some(Value::String(version)) => match minor_version(version) {
            Some(0) => check_document_schema(document, &mut report),
            Some(_) => check_structure(root, &mut report),
            None => {
                report.push(
                    "#/openapi",
                    format!("unsupported OpenAPI version {version:?}, expected 3.x"),
                );
                check_structure(root, &mut report);
            }
        },
        Some(_) => {
            report.push("#/openapi", "must be a string");
            check_structure(root, &mut report);
        }
        None => {
            report.push("#/openapi", "is required");
            check_structure(root, &mut report);
        }
    }

    if let Some(schemas) = root
        .get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(Value::as_object)
    {
        check_schema_refs(document, schemas, &mut report);
    }

    report
}

/// Minor version of a `3.<minor>.<patch>[-suffix]` version string.
fn minor_version(version: &str) -> Option<u32> {
    let rest = version.strip_prefix("3.")?;
    let (minor, patch) = rest.split_once('.')?;
    let patch = patch.split_once('-').map_or(patch, |(patch, _)| patch);
    if !is_digits(minor) || !is_digits(patch) {
        return None;
    }
    minor.parse().ok()
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn summarize(root: &Map<String, Value>, report: &mut ValidationReport) {
    report.openapi = root.get("openapi").and_then(Value::as_str).map(str::to_string);
    if let Some(Ok(info)) = root.get("info").map(Info::deserialize) {
        report.title = Some(info.title);
        report.version = Some(info.version);
    }
    report.path_count = root.get("paths").and_then(Value::as_object).map_or(0, Map::len);
    report.schema_count = root
        .get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(Value::as_object)
        .map_or(0, Map::len);
}

fn check_document_schema(document: &Document, report: &mut ValidationReport) {
    let validator = match &*OPENAPI_30 {
        Ok(validator) => validator,
        Err(e) => {
            error!("OpenAPI 3.0 document schema failed to load: {e}");
            report.push(JsonPointer::root(), format!("document schema unavailable: {e}"));
            return;
        }
    };
    for e in validator.iter_errors(document) {
        debug!("document schema violation at {}: {e}", e.instance_path);
        report.push(format!("#{}", e.instance_path), e.to_string());
    }
}

fn check_structure(root: &Map<String, Value>, report: &mut ValidationReport) {
    match root.get("info").map(Info::deserialize) {
        Some(Ok(_)) => {}
        Some(Err(e)) => report.push("#/info", e.to_string()),
        None => report.push("#/info", "is required"),
    }

    if let Some(paths) = root.get("paths") {
        check_paths(paths, report);
    }

    if let Some(components) = root.get("components") {
        check_components(components, report);
    }
}

fn check_paths(paths: &Value, report: &mut ValidationReport) {
    let Some(paths) = paths.as_object() else {
        report.push("#/paths", "must be a mapping");
        return;
    };
    for key in paths.keys() {
        if !key.starts_with('/') {
            report.push(
                JsonPointer::from_segments(["paths", key.as_str()]),
                "path must start with '/'",
            );
        }
    }
}

fn check_components(components: &Value, report: &mut ValidationReport) {
    let Some(components) = components.as_object() else {
        report.push("#/components", "must be a mapping");
        return;
    };
    let Some(schemas) = components.get("schemas") else {
        return;
    };
    let Some(schemas) = schemas.as_object() else {
        report.push("#/components/schemas", "must be a mapping");
        return;
    };
    for (name, schema) in schemas {
        if !schema.is_object() && !schema.is_boolean() {
            report.push(
                JsonPointer::from_segments(["components", "schemas", name.as_str()]),
                "schema must be an object or a boolean",
            );
        }
    }
}

fn check_schema_refs(
    document: &Document,
    schemas: &Map<String, Value>,
    report: &mut ValidationReport,
) {
    for (name, schema) in schemas {
        let base = JsonPointer::from_segments(["components", "schemas", name.as_str()]);
        for site in find_refs(schema) {
            // External references are out of reach; skip them.
            let Some(target) = site.pointer().filter(|p| p.starts_with('#')) else {
                continue;
            };
            let resolved = JsonPointer::parse(target).and_then(|p| p.resolve(document).map(|_| ()));
            if let Err(e) = resolved {
                report.push(site.location_from(&base), format!("unresolved reference: {e}"));
            }
        }
    }
}
