use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    capability::Capability,
    document,
    record::{ShaderIndex, ShaderRecord},
    requires_file::RequiresFiles,
    tags::TagMapping,
    text_util::{DESCRIPTION_PREVIEW_CHARS, contains_lowercase, truncate_chars},
};

/// Search predicates. Every predicate that is set must hold.
///
/// Text filters are case-insensitive substring matches; empty strings
/// count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub tags: Option<String>,
    pub name: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub requires: BTreeSet<Capability>,
}

impl Query {
    /// True when no predicate is set.
    pub fn is_empty(&self) -> bool {
        [&self.tags, &self.name, &self.author, &self.description]
            .into_iter()
            .all(|f| active(f).is_none())
            && self.requires.is_empty()
    }
}

fn active(filter: &Option<String>) -> Option<String> {
    filter
        .as_deref()
        .filter(|f| !f.is_empty())
        .map(str::to_lowercase)
}

#[derive(Debug, Clone, Copy)]
enum TextField {
    Name,
    Username,
    Description,
}

impl TextField {
    fn of(self, record: &ShaderRecord) -> &str {
        match self {
            TextField::Name => &record.name,
            TextField::Username => &record.username,
            TextField::Description => &record.description,
        }
    }
}

/// Evaluates queries over one loaded index and tag mapping.
///
/// Requires files are read lazily and memoized for the engine's lifetime.
#[derive(Debug)]
pub struct QueryEngine {
    index: ShaderIndex,
    tags: TagMapping,
    requires: RequiresFiles,
}

impl QueryEngine {
    pub fn new(
        index: ShaderIndex,
        tags: TagMapping,
        requires: RequiresFiles,
    ) -> Self {
        Self {
            index,
            tags,
            requires,
        }
    }

    /// Records matching every predicate of `query`, in no particular order.
    /// An empty query matches nothing.
    pub fn search(&mut self, query: &Query) -> Vec<ShaderRecord> {
        if query.is_empty() {
            return Vec::new();
        }

        let mut matching: HashSet<&str> =
            self.index.keys().map(String::as_str).collect();

        if let Some(tag) = active(&query.tags) {
            let hits: HashSet<&str> = self
                .index
                .values()
                .filter(|r| self.tag_matches(r, &tag))
                .map(|r| r.id.as_str())
                .collect();
            matching.retain(|id| hits.contains(id));
        }

        let text_fields = [
            (&query.name, TextField::Name),
            (&query.author, TextField::Username),
            (&query.description, TextField::Description),
        ];
        for (filter, field) in text_fields {
            if let Some(needle) = active(filter) {
                matching.retain(|id| {
                    contains_lowercase(field.of(&self.index[*id]), &needle)
                });
            }
        }

        let mut ids: Vec<String> =
            matching.into_iter().map(str::to_string).collect();

        if !query.requires.is_empty() {
            ids.retain(|id| self.capabilities_match(id, &query.requires));
        }

        ids.into_iter()
            .filter_map(|id| self.index.get(&id).cloned())
            .collect()
    }

    /// The record's own tags plus the mapped tags starting with `tag`.
    fn tag_matches(&self, record: &ShaderRecord, tag: &str) -> bool {
        record
            .tags
            .iter()
            .map(String::as_str)
            .chain(self.tags.tags_for(&record.id, tag))
            .any(|t| contains_lowercase(t, tag))
    }

    /// Every requested capability is listed in its requires files or in the
    /// document's current `info.requires`.
    ///
    /// The document is re-read on every call rather than trusting the
    /// indexed copy, since the mutator rewrites `requires` on disk without
    /// touching the cache.
    fn capabilities_match(
        &mut self,
        id: &str,
        wanted: &BTreeSet<Capability>,
    ) -> bool {
        let Some(record) = self.index.get(id) else {
            return false;
        };
        let stored = document::stored_requires(&record.filepath);

        wanted.iter().all(|cap| {
            self.requires.contains(cap.name(), id)
                || stored.iter().any(|r| r == cap.inferred_tag())
        })
    }

    /// Records whose name, author, or description contains `text`. Empty
    /// text matches everything. Sorted like [`QueryEngine::list_all`].
    pub fn quick_search(&self, text: &str) -> Vec<ShaderRecord> {
        let needle = text.trim().to_lowercase();
        let mut records: Vec<ShaderRecord> = self
            .index
            .values()
            .filter(|r| {
                needle.is_empty()
                    || contains_lowercase(&r.name, &needle)
                    || contains_lowercase(&r.username, &needle)
                    || contains_lowercase(&r.description, &needle)
            })
            .cloned()
            .collect();
        sort_for_listing(&mut records);
        records
    }

    /// Every record, sorted by lowercase name, then id.
    pub fn list_all(&self) -> Vec<ShaderRecord> {
        let mut records: Vec<ShaderRecord> =
            self.index.values().cloned().collect();
        sort_for_listing(&mut records);
        records
    }
}

pub fn sort_for_listing(records: &mut [ShaderRecord]) {
    records.sort_by_cached_key(|r| (r.name.to_lowercase(), r.id.clone()));
}

/// Format results for human-readable terminal output.
pub fn format_human(results: &[ShaderRecord]) {
    if results.is_empty() {
        println!("No shaders found matching the criteria.");
        return;
    }

    let rule = "-".repeat(80);
    println!("Found {} matching shaders:", results.len());
    println!("{rule}");
    for r in results {
        let tags = if r.tags.is_empty() {
            "None".to_string()
        } else {
            r.tags.join(", ")
        };
        println!("ID: {}", r.id);
        println!("Name: {}", r.name);
        println!("Author: {}", r.username);
        println!("Tags: {tags}");
        println!(
            "Description: {}",
            truncate_chars(&r.description, DESCRIPTION_PREVIEW_CHARS)
        );
        println!("File: {}", r.filepath.display());
        println!("{rule}");
    }
}

/// Format results as a JSON array.
pub fn format_json(results: &[ShaderRecord]) -> crate::error::Result<()> {
    println!("{}", serde_json::to_string_pretty(results)?);
    Ok(())
}
