use std::fs;
use std::path::Path;

use serde_json::{Map, Number, Value};
use serde_yaml_ng::Value as YamlValue;

use crate::Document;
use crate::error::ParseError;
use crate::pointer::JsonPointer;

/// Parse an OpenAPI document from YAML.
///
/// YAML allows non-string mapping keys (`200:` under `responses`); scalar
/// keys are converted to their string form. Merge keys (`<<`) are applied.
pub fn from_yaml(input: &str) -> Result<Document, ParseError> {
    let mut value: YamlValue = serde_yaml_ng::from_str(input)?;
    value.apply_merge()?;
    let mut location = Vec::new();
    yaml_to_json(value, &mut location)
}

/// Parse an OpenAPI document from JSON.
pub fn from_json(input: &str) -> Result<Document, ParseError> {
    Ok(serde_json::from_str(input)?)
}

/// Read and parse a document, choosing the format from the extension.
/// Anything other than `.json` is read as YAML.
pub fn from_path(path: &Path) -> Result<Document, ParseError> {
    let content = fs::read_to_string(path).map_err(|source| ParseError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => from_json(&content),
        _ => from_yaml(&content),
    }
}

fn yaml_to_json(value: YamlValue, location: &mut Vec<String>) -> Result<Value, ParseError> {
    Ok(match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                match n.as_f64().and_then(Number::from_f64) {
                    Some(f) => Value::Number(f),
                    None => return Err(unsupported(location, format!("non-finite number {n}"))),
                }
            }
        }
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                location.push(i.to_string());
                out.push(yaml_to_json(item, location)?);
                location.pop();
            }
            Value::Array(out)
        }
        YamlValue::Mapping(mapping) => {
            let mut out = Map::with_capacity(mapping.len());
            for (key, item) in mapping {
                let key = key_to_string(key, location)?;
                location.push(key.clone());
                let item = yaml_to_json(item, location)?;
                location.pop();
                out.insert(key, item);
            }
            Value::Object(out)
        }
        // Tags carry no meaning for schemas.
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value, location)?,
    })
}

fn key_to_string(key: YamlValue, location: &[String]) -> Result<String, ParseError> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        YamlValue::Tagged(tagged) => key_to_string(tagged.value, location),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => Err(unsupported(
            location,
            "mapping keys must be scalars".to_string(),
        )),
    }
}

fn unsupported(location: &[String], reason: String) -> ParseError {
    ParseError::UnsupportedValue {
        location: JsonPointer::from_segments(location.iter().map(String::as_str)).to_string(),
        reason,
    }
}
