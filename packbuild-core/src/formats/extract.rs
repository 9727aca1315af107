// packbuild-core/src/formats/extract.rs
// Live extraction of one version's pack format from the upstream launcher
// metadata: locate the version in the manifest, download its client
// archive and read the embedded version document.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use packbuild_common::error::{PackbuildError, Result};
use packbuild_net::{download_to, fetch_json};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use zip::ZipArchive;

use super::FormatEntry;

const CLIENT_ARCHIVE_NAME: &str = "client.jar";
const VERSION_DOCUMENT_NAME: &str = "version.json";

#[derive(Debug, Deserialize)]
struct VersionManifest {
    versions: Vec<ManifestVersion>,
}

#[derive(Debug, Deserialize)]
struct ManifestVersion {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct VersionDetail {
    downloads: VersionDownloads,
}

#[derive(Debug, Deserialize)]
struct VersionDownloads {
    client: DownloadTarget,
}

#[derive(Debug, Deserialize)]
struct DownloadTarget {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ClientVersionDocument {
    pack_version: FormatEntry,
}

/// Extract the format entry for one version. `work` is a scratch
/// directory the client archive is downloaded into.
pub async fn extract_format(
    client: &Client,
    manifest_url: &str,
    version_name: &str,
    work: &Path,
) -> Result<FormatEntry> {
    let manifest: VersionManifest = fetch_json(client, manifest_url).await?;
    let version = manifest
        .versions
        .iter()
        .find(|v| v.id == version_name)
        .ok_or_else(|| {
            PackbuildError::DatasetUnresolvable(format!(
                "Version '{version_name}' is not listed in the version manifest"
            ))
        })?;

    debug!("Fetching version detail for '{}' from {}", version.id, version.url);
    let detail: VersionDetail = fetch_json(client, &version.url).await?;

    let archive_path = work.join(CLIENT_ARCHIVE_NAME);
    download_to(client, &detail.downloads.client.url, &archive_path, None).await?;

    read_pack_version(&archive_path)
}

/// Read the `pack_version` field of the version document embedded in a
/// client archive.
fn read_pack_version(archive_path: &Path) -> Result<FormatEntry> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| {
        PackbuildError::ValidationError(format!(
            "Client archive at '{}' is not a readable zip: {e}",
            archive_path.display()
        ))
    })?;

    let mut entry = archive.by_name(VERSION_DOCUMENT_NAME).map_err(|e| {
        PackbuildError::DatasetUnresolvable(format!(
            "Client archive at '{}' has no {VERSION_DOCUMENT_NAME}: {e}",
            archive_path.display()
        ))
    })?;
    let mut text = String::new();
    entry.read_to_string(&mut text)?;

    let document: ClientVersionDocument = serde_json::from_str(&text).map_err(|e| {
        PackbuildError::DatasetUnresolvable(format!(
            "Embedded {VERSION_DOCUMENT_NAME} is invalid: {e}"
        ))
    })?;
    Ok(document.pack_version)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use super::*;

    fn client_archive(dir: &Path, version_json: Option<&str>) -> std::path::PathBuf {
        let path = dir.join("client.jar");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        let options = SimpleFileOptions::default();
        if let Some(json) = version_json {
            writer.start_file("version.json", options).unwrap();
            writer.write_all(json.as_bytes()).unwrap();
        }
        writer.start_file("other.txt", options).unwrap();
        writer.write_all(b"filler").unwrap();
        writer.finish().unwrap();
        path
    }

    #[test]
    fn reads_single_code_document() {
        let dir = tempfile::tempdir().unwrap();
        let archive = client_archive(
            dir.path(),
            Some(r#"{"name": "1.16.5", "pack_version": 6}"#),
        );
        assert_eq!(
            read_pack_version(&archive).unwrap(),
            FormatEntry::Single(6)
        );
    }

    #[test]
    fn reads_per_kind_document() {
        let dir = tempfile::tempdir().unwrap();
        let archive = client_archive(
            dir.path(),
            Some(r#"{"name": "1.21", "pack_version": {"data": 48, "resource": 34}}"#),
        );
        assert_eq!(
            read_pack_version(&archive).unwrap(),
            FormatEntry::PerKind {
                data: 48,
                resource: 34
            }
        );
    }

    #[test]
    fn archive_without_version_document_is_unresolvable() {
        let dir = tempfile::tempdir().unwrap();
        let archive = client_archive(dir.path(), None);
        let err = read_pack_version(&archive).unwrap_err();
        assert!(matches!(err, PackbuildError::DatasetUnresolvable(_)));
    }
}
