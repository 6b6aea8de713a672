use std::path::{Path, PathBuf};

use crate::error::Result;

/// Extension of corpus documents.
const DOCUMENT_EXTENSION: &str = "json";

/// List the corpus documents directly inside `dir`.
///
/// The corpus is flat: subdirectories are not descended into. Hidden files
/// (names starting with `.`) are skipped. Results are sorted by path so
/// that duplicate ids resolve the same way on every scan.
pub fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();

        if name.starts_with('.') {
            continue;
        }

        let path = entry.path();
        // Follows symlinks, so linked documents are picked up too.
        if path.is_file() && is_document(&path) {
            results.push(path);
        }
    }

    results.sort();
    Ok(results)
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == DOCUMENT_EXTENSION)
}
