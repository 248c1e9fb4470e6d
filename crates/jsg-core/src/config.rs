use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::closure::SchemaDialect;
use crate::error::ConfigError;

/// Top-level project configuration loaded from `.jsg.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JsgConfig {
    /// OpenAPI document to read when `--input` is not given.
    pub input: String,
    /// Directory that receives `<name>.json` files.
    pub output: String,
    pub dialect: SchemaDialect,
    /// Schemas generated when none are named on the command line.
    pub schemas: Vec<String>,
    /// Run the structural pre-check before generating.
    pub validate: bool,
}

impl Default for JsgConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "generated_schemas".to_string(),
            dialect: SchemaDialect::default(),
            schemas: Vec::new(),
            validate: true,
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".jsg.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<JsgConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: JsgConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# jsg configuration
input: openapi.yaml
output: generated_schemas
dialect: draft-04     # draft-04 | draft-07 | 2019-09 | 2020-12

# Schemas generated when none are passed with --schema.
schemas: []
  # - Pet
  # - Order

validate: true        # structural OpenAPI 3 pre-check before generating
"#
}
