// packbuild-core/src/compat.rs
// Compatibility check between an acquired pack and the project, based on
// the pack metadata file's format declaration.

use std::fs;
use std::path::Path;

use packbuild_common::error::{PackbuildError, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct PackMetadata {
    pack: PackSection,
}

#[derive(Debug, Deserialize)]
struct PackSection {
    pack_format: u32,
    #[serde(default)]
    supported_formats: Option<SupportedFormats>,
}

/// The three accepted shapes of the `supported_formats` property.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SupportedFormats {
    Single(u32),
    Pair(u32, u32),
    Range {
        min_inclusive: u32,
        max_inclusive: u32,
    },
}

impl SupportedFormats {
    fn bounds(&self) -> (u32, u32) {
        match *self {
            SupportedFormats::Single(v) => (v, v),
            SupportedFormats::Pair(min, max) => (min, max),
            SupportedFormats::Range {
                min_inclusive,
                max_inclusive,
            } => (min_inclusive, max_inclusive),
        }
    }
}

/// Validate that the pack whose metadata file lives at `pack_metadata` is
/// compatible with the project's format code. Malformed metadata is a
/// validation error; a well-formed but incompatible declaration is an
/// `IncompatibleVersion`.
pub fn pack_format_compatible(
    project_format: u32,
    pack_metadata: &Path,
    subject: &str,
) -> Result<()> {
    let text = fs::read_to_string(pack_metadata).map_err(|e| {
        PackbuildError::ValidationError(format!(
            "{subject}: pack metadata at '{}' not readable: {e}",
            pack_metadata.display()
        ))
    })?;
    let metadata: PackMetadata = serde_json::from_str(&text).map_err(|e| {
        PackbuildError::ValidationError(format!(
            "{subject}: pack metadata at '{}' is invalid: {e}",
            pack_metadata.display()
        ))
    })?;

    let declared = metadata.pack.pack_format;
    let supported = metadata.pack.supported_formats.map(|s| s.bounds());

    // A supported range that excludes the pack's own format is a broken
    // declaration.
    if let Some((min, max)) = supported {
        if !(min <= declared && declared <= max) {
            return Err(PackbuildError::ValidationError(format!(
                "{subject}: 'supported_formats' [{min}, {max}] does not contain the \
                 declared 'pack_format' {declared}"
            )));
        }
    }

    let compatible = match supported {
        Some((min, max)) => min <= project_format && project_format <= max,
        None => project_format == declared,
    };

    if compatible {
        Ok(())
    } else {
        let supports = match supported {
            Some((min, max)) => format!("formats {min} to {max}"),
            None => format!("format {declared}"),
        };
        Err(PackbuildError::IncompatibleVersion(format!(
            "{subject}: supports pack {supports}, making it incompatible with the \
             project's pack format {project_format}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_meta(dir: &Path, json: &str) -> std::path::PathBuf {
        let path = dir.join("pack.mcmeta");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn exact_format_matches() {
        let dir = tempfile::tempdir().unwrap();
        let meta = write_meta(dir.path(), r#"{"pack": {"pack_format": 48}}"#);
        pack_format_compatible(48, &meta, "dep 'lib'").unwrap();
        let err = pack_format_compatible(47, &meta, "dep 'lib'").unwrap_err();
        assert!(matches!(err, PackbuildError::IncompatibleVersion(_)));
    }

    #[test]
    fn supported_range_pair_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        let meta = write_meta(
            dir.path(),
            r#"{"pack": {"pack_format": 48, "supported_formats": [45, 50]}}"#,
        );
        pack_format_compatible(45, &meta, "dep").unwrap();
        pack_format_compatible(50, &meta, "dep").unwrap();
        assert!(pack_format_compatible(44, &meta, "dep").is_err());
    }

    #[test]
    fn supported_range_object_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        let meta = write_meta(
            dir.path(),
            r#"{"pack": {"pack_format": 34,
                "supported_formats": {"min_inclusive": 30, "max_inclusive": 36}}}"#,
        );
        pack_format_compatible(36, &meta, "dep").unwrap();
        assert!(pack_format_compatible(37, &meta, "dep").is_err());
    }

    #[test]
    fn single_supported_format_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        let meta = write_meta(
            dir.path(),
            r#"{"pack": {"pack_format": 34, "supported_formats": 34}}"#,
        );
        pack_format_compatible(34, &meta, "dep").unwrap();
        assert!(pack_format_compatible(35, &meta, "dep").is_err());
    }

    #[test]
    fn range_excluding_own_format_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let meta = write_meta(
            dir.path(),
            r#"{"pack": {"pack_format": 60, "supported_formats": [45, 50]}}"#,
        );
        let err = pack_format_compatible(48, &meta, "dep").unwrap_err();
        assert!(matches!(err, PackbuildError::ValidationError(_)));
    }

    #[test]
    fn malformed_metadata_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let meta = write_meta(dir.path(), r#"{"no_pack_property": true}"#);
        let err = pack_format_compatible(48, &meta, "dep").unwrap_err();
        assert!(matches!(err, PackbuildError::ValidationError(_)));
    }
}
