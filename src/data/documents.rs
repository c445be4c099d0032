//! Document-name sets used to restrict gold and predictions to one corpus.

use std::{collections::HashSet, path::Path};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::{
    entity::Entity,
    error::{EvalError, Result},
};

/// Upper-cased stems of every `*.pdf`/`*.PDF` file directly under `dir`.
pub fn filenames_from_dir(dir: &Path) -> Result<HashSet<String>> {
    let mut filenames = HashSet::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(dir).to_path_buf();
            EvalError::io(path, err.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        let Some(stem) = name
            .strip_suffix(".pdf")
            .or_else(|| name.strip_suffix(".PDF"))
        else {
            warn!(filename = %name, "invalid filename, skipping");
            continue;
        };
        if !filenames.insert(stem.to_uppercase()) {
            warn!(filename = %name, "duplicate filename, skipping");
        }
    }
    info!(dir = %dir.display(), documents = filenames.len(), "listed pdf documents");
    Ok(filenames)
}

/// Upper-cased first column of a headerless filename CSV.
pub fn filenames_from_file(path: &Path) -> Result<HashSet<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut filenames = HashSet::new();
    for result in reader.records() {
        match result {
            Ok(record) => {
                if let Some(name) = record.get(0).map(str::trim).filter(|n| !n.is_empty()) {
                    filenames.insert(name.to_uppercase());
                }
            }
            Err(err) => warn!(source = %path.display(), %err, "unreadable filename row, skipping"),
        }
    }
    info!(source = %path.display(), documents = filenames.len(), "loaded filename list");
    Ok(filenames)
}

/// Resolve a document list from either a PDF directory or a filename CSV.
pub fn load_documents(path: &Path) -> Result<HashSet<String>> {
    if path.is_dir() {
        filenames_from_dir(path)
    } else {
        filenames_from_file(path)
    }
}

pub fn documents_of<'a, I>(entities: I) -> HashSet<String>
where
    I: IntoIterator<Item = &'a Entity>,
{
    entities.into_iter().map(|e| e.document.clone()).collect()
}
