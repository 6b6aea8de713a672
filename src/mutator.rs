//! Writes merged tags and inferred requirements back into the corpus.
//!
//! This is the only module that modifies corpus documents. Every document
//! is handled on its own: a failure is logged and the pass moves on.

use std::path::Path;

use serde::Serialize;

use crate::{
    document,
    error::Result,
    layout::CorpusLayout,
    requirements::{RenderPass, infer_requirements},
    tags::TagMapping,
    walker,
};

/// Number of document writes performed by each pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MutationReport {
    pub tags_updated: usize,
    pub requires_updated: usize,
}

/// Add `tag` to a document's `info.tags`. Returns whether it was written.
fn tag_document(path: &Path, tag: &str) -> Result<bool> {
    let mut doc = document::read_document(path)?;
    let Some(info) = document::info_mut(&mut doc) else {
        return Ok(false);
    };

    if document::append_unique(info, "tags", [tag])? == 0 {
        return Ok(false);
    }
    document::write_document(path, &doc)?;
    Ok(true)
}

/// Merge inferred requirements into a document's `info.requires`.
/// Returns whether it was written.
fn infer_document(path: &Path) -> Result<bool> {
    let mut doc = document::read_document(path)?;
    if document::info(&doc).is_none() {
        return Ok(false);
    }
    let Some(passes) = doc.as_object().and_then(|o| o.get("renderpass"))
    else {
        return Ok(false);
    };
    let passes: Vec<RenderPass> = serde_json::from_value(passes.clone())?;
    let required = infer_requirements(&passes);

    let Some(info) = document::info_mut(&mut doc) else {
        return Ok(false);
    };
    // Creates an empty `requires` even when nothing was inferred; the
    // document is only rewritten when entries were appended.
    if document::append_unique(info, "requires", required)? == 0 {
        return Ok(false);
    }
    document::write_document(path, &doc)?;
    Ok(true)
}

/// Append every tag of `mapping` to the documents it lists.
///
/// Ids without a corpus document are ignored. Each document write counts
/// once, so a document gaining two tags counts twice.
pub fn apply_tags(layout: &CorpusLayout, mapping: &TagMapping) -> usize {
    let mut updated = 0;

    for (tag, ids) in mapping.iter() {
        for id in ids {
            let path = layout.document_path(id);
            if !path.is_file() {
                continue;
            }
            match tag_document(&path, tag) {
                Ok(true) => updated += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(
                        "could not add tag {tag} to {}: {e}",
                        path.display()
                    );
                }
            }
        }
    }

    updated
}

/// Infer requirements for every corpus document with a render-pass
/// section and record the new ones.
pub fn apply_requirements(layout: &CorpusLayout) -> usize {
    let files = match walker::discover_documents(layout.json_dir()) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!(
                "could not list corpus {}: {e}",
                layout.json_dir().display()
            );
            return 0;
        }
    };

    let mut updated = 0;
    for path in &files {
        match infer_document(path) {
            Ok(true) => updated += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::error!(
                    "could not infer requirements for {}: {e}",
                    path.display()
                );
            }
        }
    }

    updated
}

/// Run both passes: tags first, then requirements.
pub fn apply(layout: &CorpusLayout, mapping: &TagMapping) -> MutationReport {
    let tags_updated = apply_tags(layout, mapping);
    tracing::info!("updated {tags_updated} documents with tag information");

    let requires_updated = apply_requirements(layout);
    tracing::info!(
        "updated {requires_updated} documents with requires information"
    );

    MutationReport {
        tags_updated,
        requires_updated,
    }
}
