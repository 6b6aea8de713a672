use std::path::{Path, PathBuf};

/// Corpus directory used when nothing else is configured.
pub const DEFAULT_JSON_DIR: &str = "json";

/// Archive directories used when nothing else is configured.
pub const DEFAULT_ARCHIVES: &[&str] = &["shaders_071121", "shaders_270321"];

/// Where the corpus documents and the association files live on disk.
///
/// The corpus directory holds one `<id>.json` document per shader. Each
/// archive directory may hold a `search_results/` directory of tag files
/// and any number of `requires_<capability>.txt` files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusLayout {
    json_dir: PathBuf,
    archives: Vec<PathBuf>,
}

impl CorpusLayout {
    pub fn new(json_dir: impl Into<PathBuf>, archives: Vec<PathBuf>) -> Self {
        Self {
            json_dir: json_dir.into(),
            archives,
        }
    }

    pub fn json_dir(&self) -> &Path {
        &self.json_dir
    }

    pub fn archives(&self) -> &[PathBuf] {
        &self.archives
    }

    /// Path of the document backing `shader_id`, whether or not it exists.
    pub fn document_path(&self, shader_id: &str) -> PathBuf {
        self.json_dir.join(format!("{shader_id}.json"))
    }

    /// `search_results/` directories, one per archive, in archive order.
    pub fn search_results_dirs(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.archives.iter().map(|a| a.join("search_results"))
    }

    /// `requires_<capability>.txt` files, one per archive, in archive order.
    pub fn requires_files<'a>(
        &'a self,
        capability: &'a str,
    ) -> impl Iterator<Item = PathBuf> + 'a {
        self.archives
            .iter()
            .map(move |a| a.join(format!("requires_{capability}.txt")))
    }
}

impl Default for CorpusLayout {
    fn default() -> Self {
        Self::new(
            DEFAULT_JSON_DIR,
            DEFAULT_ARCHIVES.iter().map(PathBuf::from).collect(),
        )
    }
}
