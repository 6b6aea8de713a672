use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    document::{self, string_field, string_list},
    shader_id::resolve_shader_id,
};

/// Indexed metadata for one shader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderRecord {
    pub id: String,
    /// Backing JSON document.
    pub filepath: PathBuf,
    pub name: String,
    pub username: String,
    pub description: String,
    /// Unique, in order of first insertion.
    pub tags: Vec<String>,
    /// As stored in `info.requires` when the index was built.
    pub requires: BTreeSet<String>,
}

/// Every indexed shader, keyed by id.
pub type ShaderIndex = BTreeMap<String, ShaderRecord>;

impl ShaderRecord {
    /// Extract a record from a parsed corpus document.
    ///
    /// Returns `None` unless the document is an object with an `info`
    /// object.
    pub fn from_document(document: &Value, path: &Path) -> Option<Self> {
        let info = document::info(document)?;
        let declared = info.get("id").and_then(Value::as_str);

        let mut record = Self {
            id: resolve_shader_id(declared, path),
            filepath: path.to_path_buf(),
            name: string_field(info, "name"),
            username: string_field(info, "username"),
            description: string_field(info, "description"),
            tags: Vec::new(),
            requires: string_list(info, "requires").into_iter().collect(),
        };
        for tag in string_list(info, "tags") {
            record.push_tag(tag);
        }
        Some(record)
    }

    /// Append `tag` unless it is already present.
    pub fn push_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }
}
