// packbuild-common/src/cache.rs
// Named cache subdirectory lifecycle, shared by the dependency index,
// the version-format resolver and the acquisition backends.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{PackbuildError, Result};

/// Manages named subtrees under `<work root>/cache`. Each consumer only
/// ever touches its own named subtree.
pub struct CacheLayout {
    cache_dir: PathBuf,
}

impl CacheLayout {
    pub fn new(config: &Config) -> Result<Self> {
        let cache_dir = config.cache_dir();
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir)?;
        }
        Ok(Self { cache_dir })
    }

    pub fn root(&self) -> &Path {
        &self.cache_dir
    }

    /// Ensure a named cache subdirectory exists and return its path.
    /// A plain file occupying the path is removed and the path recreated
    /// as a directory. With `clean` set, any existing tree is removed
    /// first.
    pub fn acquire(&self, name: &str, clean: bool) -> Result<PathBuf> {
        let path = self.cache_dir.join(name);

        if clean {
            self.clean(name)?;
        } else if path.exists() && !path.is_dir() {
            tracing::warn!(
                "Cache subdirectory '{}' is occupied by a file. Removing.",
                path.display()
            );
            fs::remove_file(&path)?;
        }

        if !path.exists() {
            fs::create_dir_all(&path)?;
        }

        Ok(path)
    }

    /// Recursively remove a named cache subtree. Absence is not an error.
    pub fn clean(&self, name: &str) -> Result<()> {
        let path = self.cache_dir.join(name);
        if path.is_dir() {
            fs::remove_dir_all(&path).map_err(|e| {
                PackbuildError::Cache(format!("Unable to remove '{}': {e}", path.display()))
            })?;
        } else if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Clear every named cache subtree.
    pub fn clean_all(&self) -> Result<()> {
        for entry in fs::read_dir(&self.cache_dir)? {
            let entry = entry?;
            self.clean(&entry.file_name().to_string_lossy())?;
        }
        Ok(())
    }
}
