use std::path::{Path, PathBuf};

use kdam::{BarExt, tqdm};

use crate::{
    cache::{CacheSlot, CacheStore},
    document,
    error::Result,
    layout::CorpusLayout,
    record::{ShaderIndex, ShaderRecord},
    walker,
};

/// Where an index handed out by [`load_or_build`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    Cache,
    Scan { files: usize },
}

#[derive(Debug, Clone)]
pub struct IndexBuild {
    pub index: ShaderIndex,
    pub source: IndexSource,
}

/// Parse one corpus document into a record.
///
/// `Ok(None)` means the file is valid JSON but not a shader document.
fn read_record(path: &Path) -> Result<Option<ShaderRecord>> {
    let document = document::read_document(path)?;
    Ok(ShaderRecord::from_document(&document, path))
}

/// Build an index from the given documents, skipping any that fail.
///
/// When two documents declare the same id, the later path wins.
pub fn build_index(files: &[PathBuf], progress: bool) -> ShaderIndex {
    let mut index = ShaderIndex::new();
    let mut bar = progress
        .then(|| tqdm!(total = files.len(), desc = "Indexing shaders"));

    for path in files {
        match read_record(path) {
            Ok(Some(record)) => {
                index.insert(record.id.clone(), record);
            }
            Ok(None) => {
                tracing::debug!("skipping {}: no info section", path.display());
            }
            Err(e) => {
                tracing::debug!("skipping {}: {e}", path.display());
            }
        }
        if let Some(bar) = bar.as_mut() {
            let _ = bar.update(1);
        }
    }

    if let Some(bar) = bar.as_mut() {
        let _ = bar.refresh();
    }

    index
}

/// The shader index, from the cache when allowed and present, otherwise
/// scanned from the corpus and written back to the cache.
pub fn load_or_build(
    layout: &CorpusLayout,
    cache: &CacheStore,
    force_rebuild: bool,
    progress: bool,
) -> IndexBuild {
    if !force_rebuild
        && let Some(index) = cache.load::<ShaderIndex>(CacheSlot::ShaderIndex)
    {
        tracing::debug!("loaded {} shaders from cache", index.len());
        return IndexBuild {
            index,
            source: IndexSource::Cache,
        };
    }

    let files = match walker::discover_documents(layout.json_dir()) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!(
                "could not list corpus {}: {e}",
                layout.json_dir().display()
            );
            Vec::new()
        }
    };

    tracing::info!("building shader index from {} files", files.len());
    let index = build_index(&files, progress);
    tracing::info!("index built with {} shaders", index.len());

    if let Err(e) = cache.store(CacheSlot::ShaderIndex, &index) {
        tracing::warn!("could not save shader index cache: {e}");
    }

    IndexBuild {
        index,
        source: IndexSource::Scan { files: files.len() },
    }
}
