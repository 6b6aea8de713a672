use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Directory holding shaderdex's own state (currently just the cache).
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Pick where the cache lives: `explicit` if given, else
    /// `SHADERDEX_DATA_DIR`, else `$XDG_DATA_HOME/shaderdex`. The directory
    /// is created when missing.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let root = if let Some(path) = explicit {
            path.to_path_buf()
        } else if let Ok(val) = std::env::var("SHADERDEX_DATA_DIR") {
            PathBuf::from(val)
        } else {
            xdg::BaseDirectories::with_prefix("shaderdex")
                .get_data_home()
                .ok_or_else(|| {
                    Error::Config(
                        "could not determine XDG data home directory".into(),
                    )
                })?
        };

        std::fs::create_dir_all(&root)
            .map_err(|_| Error::DataDir(root.clone()))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The single container holding every cache slot.
    pub fn cache_db(&self) -> PathBuf {
        self.root.join("cache.redb")
    }
}
