//! Removal of locale files with no reference counterpart

use crate::L10nError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// List every `*.xliff` under `root`, as paths relative to `root`.
fn xliff_files(root: &Path) -> BTreeSet<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| {
            e.file_type().is_file() && e.path().extension().is_some_and(|ext| ext == "xliff")
        })
        .filter_map(|e| e.path().strip_prefix(root).ok().map(Path::to_path_buf))
        .collect()
}

/// Remove every locale XLIFF file whose relative path does not exist in
/// the reference locale. Returns the removed paths, relative to the base
/// folder, in sorted order.
///
/// A reference locale with no XLIFF files at all is fatal: it would mean
/// deleting every translation in the tree.
pub fn prune_obsolete(base_path: &Path, reference: &str) -> Result<Vec<PathBuf>, L10nError> {
    let reference_files = xliff_files(&base_path.join(reference));
    if reference_files.is_empty() {
        return Err(L10nError::NoXliffFiles(base_path.join(reference)));
    }

    let entries = std::fs::read_dir(base_path).map_err(|e| L10nError::io(base_path, e))?;
    let mut locales = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| L10nError::io(base_path, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.path().is_dir() && name != reference && !name.starts_with('.') {
            locales.push(name);
        }
    }
    locales.sort();

    let mut removed = Vec::new();
    for locale in locales {
        let locale_path = base_path.join(&locale);
        for rel in xliff_files(&locale_path) {
            if !reference_files.contains(&rel) {
                let full = locale_path.join(&rel);
                std::fs::remove_file(&full).map_err(|e| L10nError::io(&full, e))?;
                removed.push(Path::new(&locale).join(rel));
            }
        }
    }

    Ok(removed)
}
