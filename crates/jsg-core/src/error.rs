use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported value at {location}: {reason}")]
    UnsupportedValue { location: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointerError {
    #[error("invalid pointer {pointer:?}: {reason}")]
    Syntax { pointer: String, reason: String },

    #[error("pointer {pointer:?} not found: no value at segment {segment:?}")]
    NotFound { pointer: String, segment: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClosureError {
    #[error("schema not found in components.schemas: {0}")]
    SchemaNotFound(String),

    #[error("dangling reference {pointer} in schema {referenced_by}")]
    DanglingRef {
        pointer: String,
        referenced_by: String,
    },

    #[error("malformed reference {value} at {location} in schema {referenced_by}")]
    MalformedRef {
        value: String,
        referenced_by: String,
        location: String,
    },
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schema name {0:?} cannot be used as a file name")]
    InvalidFileName(String),

    #[error("failed to serialize schema: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
}
