// packbuild-core/src/acquire/url.rs
use std::path::{Path, PathBuf};

use packbuild_common::error::Result;
use packbuild_net::download_to;
use reqwest::Client;
use tracing::debug;

use super::files::extract_zip;

/// Materialize a remote-archive dependency: download to a temporary
/// location inside `work`, verify the optional checksum, extract, discard
/// the download along with the rest of `work` once the files are moved
/// into place.
pub async fn acquire(
    name: &str,
    url: &str,
    root: Option<&Path>,
    sha256: Option<&str>,
    client: &Client,
    work: &Path,
) -> Result<PathBuf> {
    debug!("Downloading dependency '{}' from {}", name, url);
    let archive = work.join("download.zip");
    download_to(client, url, &archive, sha256).await?;

    let files = work.join("files");
    extract_zip(&archive, &files, root)?;
    Ok(files)
}
