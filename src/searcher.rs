//! The library entry point tying the loaders, the index and the mutator
//! together over one corpus layout and one cache store.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::{
    cache::{CacheSlot, CacheStore},
    document,
    indexer::{self, IndexBuild},
    layout::CorpusLayout,
    mutator::{self, MutationReport},
    record::{ShaderIndex, ShaderRecord},
    requires_file::RequiresFiles,
    search::{Query, QueryEngine},
    tags::{self, TagMapping},
    walker,
};

/// Cache and corpus statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub cache_path: PathBuf,
    pub persistent: bool,
    pub tag_slot: bool,
    pub index_slot: bool,
    /// Shaders in the cached index, if it decodes.
    pub indexed_shaders: Option<usize>,
    /// Tags in the cached tag mapping, if it decodes.
    pub tags: Option<usize>,
    pub corpus_documents: usize,
}

#[derive(Debug)]
pub struct ShaderSearcher {
    layout: CorpusLayout,
    cache: CacheStore,
    progress: bool,
}

impl ShaderSearcher {
    pub fn new(layout: CorpusLayout, cache: CacheStore) -> Self {
        Self {
            layout,
            cache,
            progress: false,
        }
    }

    /// Show a progress bar while scanning the corpus.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn load_tags(&self, force_rebuild: bool) -> TagMapping {
        tags::load_or_build(&self.layout, &self.cache, force_rebuild)
    }

    pub fn load_index(&self, force_rebuild: bool) -> IndexBuild {
        indexer::load_or_build(
            &self.layout,
            &self.cache,
            force_rebuild,
            self.progress,
        )
    }

    /// A query engine over freshly loaded tags and index.
    pub fn engine(&self, force_rebuild: bool) -> QueryEngine {
        let tags = self.load_tags(force_rebuild);
        let index = self.load_index(force_rebuild).index;
        QueryEngine::new(index, tags, RequiresFiles::new(self.layout.clone()))
    }

    /// Records matching `query`. An empty query returns nothing without
    /// touching the cache or the corpus.
    pub fn search(
        &self,
        query: &Query,
        force_rebuild: bool,
    ) -> Vec<ShaderRecord> {
        if query.is_empty() {
            tracing::debug!("no search criteria given");
            return Vec::new();
        }
        self.engine(force_rebuild).search(query)
    }

    pub fn list_all(&self, force_rebuild: bool) -> Vec<ShaderRecord> {
        self.engine(force_rebuild).list_all()
    }

    /// Rebuild the tag mapping and the index from disk, replacing both
    /// cache slots.
    pub fn rebuild_index(&self) -> ShaderIndex {
        self.load_tags(true);
        self.load_index(true).index
    }

    /// Write mapped tags and inferred requirements into the corpus.
    ///
    /// The cached index is not refreshed; run [`Self::rebuild_index`]
    /// afterwards to see the new tags in text results.
    pub fn apply_inferred_metadata(&self) -> MutationReport {
        let tags = self.load_tags(false);
        mutator::apply(&self.layout, &tags)
    }

    /// The full document of an indexed shader, re-read from disk.
    pub fn shader(&self, id: &str) -> Option<Value> {
        let index = self.load_index(false).index;
        let record = index.get(id)?;
        match document::read_document(&record.filepath) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!(
                    "could not read {}: {e}",
                    record.filepath.display()
                );
                None
            }
        }
    }

    pub fn status(&self) -> Status {
        let corpus_documents =
            walker::discover_documents(self.layout.json_dir())
                .map(|files| files.len())
                .unwrap_or(0);

        Status {
            cache_path: self.cache.path().to_path_buf(),
            persistent: self.cache.is_persistent(),
            tag_slot: self.cache.contains(CacheSlot::TagCache),
            index_slot: self.cache.contains(CacheSlot::ShaderIndex),
            indexed_shaders: self
                .cache
                .load::<ShaderIndex>(CacheSlot::ShaderIndex)
                .map(|index| index.len()),
            tags: self
                .cache
                .load::<TagMapping>(CacheSlot::TagCache)
                .map(|mapping| mapping.len()),
            corpus_documents,
        }
    }
}
