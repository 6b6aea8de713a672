use std::path::Path;

/// Resolve the id a document is indexed under.
///
/// The id declared in the document's `info` section wins. Documents without
/// one (or with an empty one) fall back to the file name minus `.json`.
pub fn resolve_shader_id(declared: Option<&str>, path: &Path) -> String {
    if let Some(id) = declared.map(str::trim)
        && !id.is_empty()
    {
        return id.to_string();
    }

    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Parse one line of a requires association file.
///
/// Lines look like `shader_id` or `folder/shader_id`; only the last path
/// segment is the id. Blank lines and `---` separators yield `None`.
///
/// # Examples
///
/// ```
/// use shaderdex::shader_id::id_from_association_line;
///
/// assert_eq!(id_from_association_line("shaders/XsBSRd\n"), Some("XsBSRd"));
/// assert_eq!(id_from_association_line("--- sound"), None);
/// ```
pub fn id_from_association_line(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with("---") {
        return None;
    }
    let id = line.rsplit('/').next().unwrap_or(line);
    (!id.is_empty()).then_some(id)
}
