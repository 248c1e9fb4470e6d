use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::debug;
use tempfile::{Builder, NamedTempFile};

use crate::closure::StandaloneSchema;
use crate::error::WriteError;

/// File name used for a schema: `<name>.json`.
///
/// Names that would escape the output directory or are not usable as a
/// single path component are rejected.
pub fn schema_file_name(name: &str) -> Result<String, WriteError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(WriteError::InvalidFileName(name.to_string()));
    }
    Ok(format!("{name}.json"))
}

/// Write `schema` to `<output_dir>/<name>.json` as two-space-indented JSON.
///
/// The directory is created if needed. Content goes to a temporary file in
/// the same directory that is then renamed over the target, so a failed
/// write leaves no partial file behind.
pub fn write_schema(
    output_dir: &Path,
    name: &str,
    schema: &StandaloneSchema,
) -> Result<PathBuf, WriteError> {
    let path = output_dir.join(schema_file_name(name)?);
    let content = render(schema)?;
    create_output_dir(output_dir)?;
    let staged = stage(output_dir, &path, &content)?;
    persist(staged, path)
}

/// Write a batch of schemas, one `<name>.json` file each.
///
/// Every file name is checked and every file is staged in the output
/// directory before the first one is moved into place, so an invalid name
/// or a failed write leaves the directory as it was.
pub fn write_schemas(
    output_dir: &Path,
    schemas: &IndexMap<String, StandaloneSchema>,
) -> Result<Vec<PathBuf>, WriteError> {
    let mut rendered = Vec::with_capacity(schemas.len());
    for (name, schema) in schemas {
        rendered.push((output_dir.join(schema_file_name(name)?), render(schema)?));
    }

    create_output_dir(output_dir)?;

    let mut staged = Vec::with_capacity(rendered.len());
    for (path, content) in rendered {
        staged.push((stage(output_dir, &path, &content)?, path));
    }

    staged
        .into_iter()
        .map(|(tmp, path)| persist(tmp, path))
        .collect()
}

fn render(schema: &StandaloneSchema) -> Result<String, WriteError> {
    let mut content = schema.to_json_pretty()?;
    content.push('\n');
    Ok(content)
}

fn create_output_dir(output_dir: &Path) -> Result<(), WriteError> {
    fs::create_dir_all(output_dir).map_err(|source| WriteError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })
}

/// Temporary file next to `path` holding `content`.
fn stage(output_dir: &Path, path: &Path, content: &str) -> Result<NamedTempFile, WriteError> {
    let write_err = |source| WriteError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut builder = Builder::new();
    builder.prefix(".jsg-");
    // Temp files default to 0600; ask for what a plain create gets after umask.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }

    let mut tmp = builder.tempfile_in(output_dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    Ok(tmp)
}

fn persist(tmp: NamedTempFile, path: PathBuf) -> Result<PathBuf, WriteError> {
    match tmp.persist(&path) {
        Ok(_) => {
            debug!("wrote {}", path.display());
            Ok(path)
        }
        Err(e) => Err(WriteError::Write {
            path,
            source: e.error,
        }),
    }
}
