// packbuild-core/src/acquire/files.rs
// Shared file handling for acquisition backends: archive extraction with
// an optional inner root, directory copies, pack metadata validation.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use packbuild_common::error::{PackbuildError, Result};
use tracing::{debug, warn};
use zip::read::ZipArchive;

/// Every acquired dependency must carry this file at its root.
pub const PACK_METADATA_FILE: &str = "pack.mcmeta";

/// Extract a zip archive into `dest`. With `archive_root` set, only
/// entries below that path inside the archive are extracted, re-rooted at
/// `dest`. Entries that would land outside `dest` are skipped.
pub fn extract_zip(archive_path: &Path, dest: &Path, archive_root: Option<&Path>) -> Result<()> {
    debug!(
        "Extracting {} into {} (root: {:?})",
        archive_path.display(),
        dest.display(),
        archive_root
    );
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| PackbuildError::Generic(format!(
            "Failed to read archive {}: {e}",
            archive_path.display()
        )))?;

    fs::create_dir_all(dest)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| {
            PackbuildError::Generic(format!(
                "Error reading entry {i} of {}: {e}",
                archive_path.display()
            ))
        })?;
        if entry.is_dir() {
            continue;
        }

        let Some(entry_path) = entry.enclosed_name() else {
            warn!(
                "Skipping archive entry '{}' as it would be placed outside the dependency directory",
                entry.name()
            );
            continue;
        };

        let relative = match archive_root {
            Some(root) => match entry_path.strip_prefix(root) {
                Ok(stripped) => stripped.to_path_buf(),
                // Entry lives outside the configured archive root.
                Err(_) => continue,
            },
            None => entry_path.clone(),
        };
        if relative.as_os_str().is_empty() || !is_clean_relative(&relative) {
            warn!(
                "Skipping archive entry '{}' as it would be placed outside the dependency directory",
                entry.name()
            );
            continue;
        }

        let file_destination = dest.join(&relative);
        if let Some(parent) = file_destination.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&file_destination)?;
        io::copy(&mut entry, &mut out)?;
    }

    Ok(())
}

fn is_clean_relative(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_)))
}

/// Copy the contents of `src` into `dest` (which must exist).
pub fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    let mut options = fs_extra::dir::CopyOptions::new();
    options.content_only = true;
    fs_extra::dir::copy(src, dest, &options).map_err(|e| {
        PackbuildError::Generic(format!(
            "Failed to copy '{}' to '{}': {e}",
            src.display(),
            dest.display()
        ))
    })?;
    Ok(())
}

/// Verify that an acquired file tree carries the pack metadata file at its
/// root.
pub fn validate_pack_root(dir: &Path, dependency_name: &str) -> Result<PathBuf> {
    let metadata = dir.join(PACK_METADATA_FILE);
    if metadata.is_file() {
        Ok(metadata)
    } else {
        Err(PackbuildError::SourceUnavailable(format!(
            "Dependency '{dependency_name}' is missing {PACK_METADATA_FILE}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use super::*;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut writer = ZipWriter::new(file);
        for (name, contents) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn extracts_whole_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("pack.zip");
        write_zip(
            &archive,
            &[("pack.mcmeta", "{}"), ("data/fn/tick.json", "{}")],
        );

        let dest = dir.path().join("out");
        extract_zip(&archive, &dest, None).unwrap();
        assert!(dest.join("pack.mcmeta").is_file());
        assert!(dest.join("data/fn/tick.json").is_file());
    }

    #[test]
    fn archive_root_rebases_entries() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("pack.zip");
        write_zip(
            &archive,
            &[
                ("inner/pack.mcmeta", "{}"),
                ("inner/data/a.json", "{}"),
                ("stray.txt", "ignored"),
            ],
        );

        let dest = dir.path().join("out");
        extract_zip(&archive, &dest, Some(Path::new("inner"))).unwrap();
        assert!(dest.join("pack.mcmeta").is_file());
        assert!(dest.join("data/a.json").is_file());
        assert!(!dest.join("stray.txt").exists());
        assert!(!dest.join("inner").exists());
    }

    #[test]
    fn escaping_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("evil.zip");
        write_zip(&archive, &[("../evil.txt", "nope"), ("ok.txt", "fine")]);

        let dest = dir.path().join("deep").join("out");
        extract_zip(&archive, &dest, None).unwrap();
        assert!(dest.join("ok.txt").is_file());
        assert!(!dir.path().join("deep").join("evil.txt").exists());
        assert!(!dir.path().join("evil.txt").exists());
    }

    #[test]
    fn pack_root_validation() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate_pack_root(dir.path(), "lib").unwrap_err();
        assert!(matches!(err, PackbuildError::SourceUnavailable(_)));

        fs::write(dir.path().join(PACK_METADATA_FILE), "{}").unwrap();
        validate_pack_root(dir.path(), "lib").unwrap();
    }

    #[test]
    fn copy_tree_copies_contents() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("pack.mcmeta"), "{}").unwrap();
        fs::write(src.join("sub/file.txt"), "x").unwrap();

        let dest = dir.path().join("dest");
        fs::create_dir_all(&dest).unwrap();
        copy_tree(&src, &dest).unwrap();
        assert!(dest.join("pack.mcmeta").is_file());
        assert!(dest.join("sub/file.txt").is_file());
    }
}
