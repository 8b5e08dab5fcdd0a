use crate::domain::models::AgentPolicy;
use std::path::{Path, PathBuf};

/// A named JSON document that can be written to a dump directory.
pub trait DumpableObject {
    fn name(&self) -> &str;
    fn json(&self) -> &str;
}

impl DumpableObject for AgentPolicy {
    fn name(&self) -> &str {
        AgentPolicy::name(self)
    }

    fn json(&self) -> &str {
        AgentPolicy::json(self)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum WriteError {
    #[error("invalid object name: {0:?}")]
    InvalidName(String),
    #[error("object is not valid JSON")]
    Format(#[source] serde_json::Error),
    #[error("could not write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub trait ObjectWriter {
    fn write_object(&self, dir: &Path, object: &dyn DumpableObject) -> Result<(), WriteError>;
}

/// Writes each object to `<dir>/<name>.json`, pretty-printed.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFileWriter;

impl ObjectWriter for JsonFileWriter {
    fn write_object(&self, dir: &Path, object: &dyn DumpableObject) -> Result<(), WriteError> {
        let path = object_path(dir, object.name())?;
        let body = pretty_json(object.json())?;
        std::fs::create_dir_all(dir).map_err(|source| WriteError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        std::fs::write(&path, body).map_err(|source| WriteError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "wrote object");
        Ok(())
    }
}

pub fn object_path(dir: &Path, name: &str) -> Result<PathBuf, WriteError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(WriteError::InvalidName(name.to_string()));
    }
    Ok(dir.join(format!("{}.json", name)))
}

// Numbers keep their source text (serde_json `arbitrary_precision`) and keys
// keep their order (`preserve_order`).
fn pretty_json(raw: &str) -> Result<String, WriteError> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(WriteError::Format)?;
    let mut out = serde_json::to_string_pretty(&value).map_err(WriteError::Format)?;
    out.push('\n');
    Ok(out)
}
