use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::generator::{index_file, GeneratorOptions};
use crate::model::names::{split_qualified, Namer};
use crate::model::schema::SchemaModel;

/// Persistence failures, carrying the offending path or stem.
#[derive(Debug, Error)]
pub enum WriteError {
    /// A generated file stem would escape the output directory.
    #[error("invalid file stem `{stem}`: {reason}")]
    InvalidStem {
        /// The rejected stem.
        stem: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// The output directory could not be created.
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// A generated file could not be written.
    #[error("failed to write {path}: {source}")]
    WriteFile {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Write one source file per table plus the aggregate index module.
///
/// Returns the written paths. File stems are validated before anything is
/// created, so a hostile table name cannot place files outside `output_dir`.
pub fn write_output(
    output_dir: &Path,
    text: &BTreeMap<String, String>,
    model: &SchemaModel,
    options: &GeneratorOptions,
    namer: &Namer<'_>,
) -> Result<Vec<PathBuf>, WriteError> {
    let extension = options.dialect.extension();

    let mut files = Vec::new();
    for (table, source) in text {
        let (_, local) = split_qualified(table);
        let stem = namer.file_stem(local);
        validate_stem(&stem)?;
        files.push((format!("{stem}.{extension}"), source.clone()));
    }
    files.push((
        format!("index.{extension}"),
        index_file::render_index_file(model, options, namer),
    ));

    std::fs::create_dir_all(output_dir).map_err(|source| WriteError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    for (name, source) in files {
        let path = output_dir.join(name);
        std::fs::write(&path, source).map_err(|source| WriteError::WriteFile {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }
    Ok(written)
}

fn validate_stem(stem: &str) -> Result<(), WriteError> {
    if stem.trim().is_empty() {
        return Err(WriteError::InvalidStem {
            stem: stem.to_string(),
            reason: "file stems must not be empty",
        });
    }
    let candidate = Path::new(stem);
    if candidate.is_absolute() {
        return Err(WriteError::InvalidStem {
            stem: stem.to_string(),
            reason: "absolute paths are not allowed",
        });
    }
    if candidate.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    }) {
        return Err(WriteError::InvalidStem {
            stem: stem.to_string(),
            reason: "traversal segments are not allowed",
        });
    }
    if stem.contains('/') || stem.contains('\\') {
        return Err(WriteError::InvalidStem {
            stem: stem.to_string(),
            reason: "path separators are not allowed",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_stem_rejects_unsafe_names() {
        assert!(validate_stem("orders").is_ok());
        assert!(validate_stem("").is_err());
        assert!(validate_stem("  ").is_err());
        assert!(validate_stem("../escape").is_err());
        assert!(validate_stem("nested/orders").is_err());
        assert!(validate_stem("/etc/passwd").is_err());
    }
}
