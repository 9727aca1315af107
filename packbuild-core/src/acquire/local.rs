// packbuild-core/src/acquire/local.rs
use std::fs;
use std::path::{Path, PathBuf};

use packbuild_common::error::{PackbuildError, Result};
use tracing::debug;

use super::files::{copy_tree, extract_zip};

/// Materialize a local dependency: a directory subtree is copied verbatim,
/// a zip archive is extracted (optionally from a root inside the archive).
pub fn acquire(
    name: &str,
    path: &Path,
    archive_root: Option<&Path>,
    project_root: &Path,
    work: &Path,
) -> Result<PathBuf> {
    let source = if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    };

    if !source.exists() {
        return Err(PackbuildError::SourceUnavailable(format!(
            "Local source '{}' for dependency '{name}' does not exist",
            source.display()
        )));
    }

    let files = work.join("files");
    if source.is_dir() {
        debug!("Copying local directory {} for '{}'", source.display(), name);
        fs::create_dir_all(&files)?;
        copy_tree(&source, &files)?;
    } else {
        debug!("Extracting local archive {} for '{}'", source.display(), name);
        extract_zip(&source, &files, archive_root)?;
    }

    Ok(files)
}
