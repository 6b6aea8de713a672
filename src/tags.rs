use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    cache::{CacheSlot, CacheStore},
    layout::CorpusLayout,
};

/// Tag name to the ids of shaders carrying it, from `search_results/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagMapping(BTreeMap<String, BTreeSet<String>>);

impl TagMapping {
    /// Set the ids for `tag`, replacing any previous set.
    pub fn insert(&mut self, tag: impl Into<String>, ids: BTreeSet<String>) {
        self.0.insert(tag.into(), ids);
    }

    pub fn get(&self, tag: &str) -> Option<&BTreeSet<String>> {
        self.0.get(tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.0.iter()
    }

    /// Tags listing `shader_id` whose name starts with `prefix`, ignoring
    /// case.
    pub fn tags_for<'a>(
        &'a self,
        shader_id: &'a str,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        let prefix = prefix.to_lowercase();
        self.0.iter().filter_map(move |(tag, ids)| {
            (ids.contains(shader_id) && tag.to_lowercase().starts_with(&prefix))
                .then_some(tag.as_str())
        })
    }
}

impl FromIterator<(String, BTreeSet<String>)> for TagMapping {
    fn from_iter<I: IntoIterator<Item = (String, BTreeSet<String>)>>(
        iter: I,
    ) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Read every tag file of every archive.
///
/// Files that cannot be read are skipped with a warning. When two archives
/// carry the same tag, the later archive's list wins.
pub fn scan_tag_files(layout: &CorpusLayout) -> TagMapping {
    let mut mapping = TagMapping::default();

    for dir in layout.search_results_dirs() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                tracing::warn!("could not list {}: {e}", dir.display());
                continue;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let tag = entry.file_name().to_string_lossy().into_owned();
            match read_tag_file(&path) {
                Ok(ids) => mapping.insert(tag, ids),
                Err(e) => {
                    tracing::warn!(
                        "could not read tag file {}: {e}",
                        path.display()
                    );
                }
            }
        }
    }

    mapping
}

fn read_tag_file(path: &Path) -> std::io::Result<BTreeSet<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// The tag mapping, from the cache when allowed and present, otherwise
/// scanned and written back to the cache.
pub fn load_or_build(
    layout: &CorpusLayout,
    cache: &CacheStore,
    force_rebuild: bool,
) -> TagMapping {
    if !force_rebuild
        && let Some(mapping) = cache.load::<TagMapping>(CacheSlot::TagCache)
    {
        tracing::debug!("loaded {} tags from cache", mapping.len());
        return mapping;
    }

    let mapping = scan_tag_files(layout);
    tracing::info!("loaded {} tag files", mapping.len());

    if let Err(e) = cache.store(CacheSlot::TagCache, &mapping) {
        tracing::warn!("could not save tag cache: {e}");
    }
    mapping
}
