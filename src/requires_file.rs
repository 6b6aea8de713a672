use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use crate::{layout::CorpusLayout, shader_id::id_from_association_line};

/// Memoized reader for `requires_<capability>.txt` association files.
///
/// Each capability is read from disk at most once per instance; later
/// lookups are served from memory even if the files change.
#[derive(Debug)]
pub struct RequiresFiles {
    layout: CorpusLayout,
    loaded: HashMap<String, HashSet<String>>,
}

impl RequiresFiles {
    pub fn new(layout: CorpusLayout) -> Self {
        Self {
            layout,
            loaded: HashMap::new(),
        }
    }

    /// Ids listed for `capability` across every archive.
    pub fn load(&mut self, capability: &str) -> &HashSet<String> {
        if !self.loaded.contains_key(capability) {
            let ids = self.read_all(capability);
            self.loaded.insert(capability.to_string(), ids);
        }
        &self.loaded[capability]
    }

    pub fn contains(&mut self, capability: &str, shader_id: &str) -> bool {
        self.load(capability).contains(shader_id)
    }

    fn read_all(&self, capability: &str) -> HashSet<String> {
        let mut ids = HashSet::new();
        for path in self.layout.requires_files(capability) {
            if let Err(e) = read_requires_file(&path, &mut ids)
                && e.kind() != std::io::ErrorKind::NotFound
            {
                tracing::warn!("could not read {}: {e}", path.display());
            }
        }
        tracing::debug!("{} shaders listed as requiring {capability}", ids.len());
        ids
    }
}

fn read_requires_file(
    path: &Path,
    ids: &mut HashSet<String>,
) -> std::io::Result<()> {
    let content = std::fs::read_to_string(path)?;
    ids.extend(
        content
            .lines()
            .filter_map(id_from_association_line)
            .map(str::to_string),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, CorpusLayout) {
        let tmp = tempfile::tempdir().unwrap();
        let first = tmp.path().join("first");
        let second = tmp.path().join("second");
        std::fs::create_dir_all(&first).unwrap();
        std::fs::create_dir_all(&second).unwrap();

        std::fs::write(
            first.join("requires_sound.txt"),
            "--- shaders using sound\nshaders_071121/XsBSRd\n\nMs2SD1\n",
        )
        .unwrap();
        std::fs::write(second.join("requires_sound.txt"), "4dX3Rr\n").unwrap();

        let layout = CorpusLayout::new(tmp.path().join("json"), vec![first, second]);
        (tmp, layout)
    }

    #[test]
    fn unions_archives_and_strips_paths() {
        let (_tmp, layout) = setup();
        let mut files = RequiresFiles::new(layout);

        let ids = files.load("sound");
        assert_eq!(ids.len(), 3);
        assert!(ids.contains("XsBSRd"));
        assert!(ids.contains("Ms2SD1"));
        assert!(ids.contains("4dX3Rr"));
        assert!(!ids.iter().any(|id| id.starts_with("---")));
    }

    #[test]
    fn missing_files_contribute_nothing() {
        let (_tmp, layout) = setup();
        let mut files = RequiresFiles::new(layout);

        assert!(files.load("webcam").is_empty());
        assert!(!files.contains("webcam", "XsBSRd"));
    }

    #[test]
    fn unreadable_file_contributes_nothing() {
        let (tmp, layout) = setup();
        std::fs::write(
            tmp.path().join("first/requires_sound.txt"),
            b"XsBSRd\n\xff\xfe\n",
        )
        .unwrap();
        let mut files = RequiresFiles::new(layout);

        let ids = files.load("sound");
        assert_eq!(ids.len(), 1);
        assert!(ids.contains("4dX3Rr"));
        assert!(!ids.contains("XsBSRd"));
    }

    #[test]
    fn memoized_per_capability() {
        let (tmp, layout) = setup();
        let mut files = RequiresFiles::new(layout);
        assert!(files.contains("sound", "4dX3Rr"));

        std::fs::remove_file(tmp.path().join("second/requires_sound.txt"))
            .unwrap();
        std::fs::write(
            tmp.path().join("first/requires_cubemap.txt"),
            "XsBSRd\n",
        )
        .unwrap();

        assert!(files.contains("sound", "4dX3Rr"));
        assert!(files.contains("cubemap", "XsBSRd"));
    }

    #[test]
    fn fresh_instance_rereads() {
        let (tmp, layout) = setup();
        RequiresFiles::new(layout.clone()).load("sound");

        std::fs::remove_file(tmp.path().join("second/requires_sound.txt"))
            .unwrap();
        let mut files = RequiresFiles::new(layout);
        assert!(!files.contains("sound", "4dX3Rr"));
    }
}
