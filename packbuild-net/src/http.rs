// packbuild-net/src/http.rs
use std::fs;
use std::path::{Path, PathBuf};

use packbuild_common::config::{CONNECT_TIMEOUT, DOWNLOAD_TIMEOUT};
use packbuild_common::error::{PackbuildError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::fs::File as TokioFile;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::validation::{validate_url, verify_checksum};

const USER_AGENT_STRING: &str = "packbuild (Rust; +https://github.com/packbuild/packbuild)";

pub fn build_http_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STRING));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| PackbuildError::HttpError(format!("Failed to build HTTP client: {e}")))
}

/// Download `url` into `final_path`, verifying an optional SHA256 checksum.
/// Bytes land in a hidden temporary sibling first and are renamed into
/// place only after verification, so `final_path` never holds a partial or
/// corrupt download.
pub async fn download_to(
    client: &Client,
    url: &str,
    final_path: &Path,
    sha256_expected: Option<&str>,
) -> Result<PathBuf> {
    validate_url(url)?;

    let temp_filename = format!(
        ".{}.download",
        final_path.file_name().unwrap_or_default().to_string_lossy()
    );
    let temp_path = final_path.with_file_name(temp_filename);
    debug!("Downloading {} to temporary path {}", url, temp_path.display());
    if temp_path.exists() {
        fs::remove_file(&temp_path)?;
    }

    let response = client.get(url).send().await.map_err(|e| {
        PackbuildError::HttpError(format!("HTTP request failed for {url}: {e}"))
    })?;
    let status = response.status();
    debug!("Received HTTP status: {} for {}", status, url);

    if !status.is_success() {
        let name = final_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        return match status {
            StatusCode::NOT_FOUND => Err(PackbuildError::DownloadError(
                name,
                url.to_string(),
                "Resource not found (404)".to_string(),
            )),
            StatusCode::FORBIDDEN => Err(PackbuildError::DownloadError(
                name,
                url.to_string(),
                "Access forbidden (403)".to_string(),
            )),
            _ => Err(PackbuildError::HttpError(format!(
                "HTTP error {status} for URL {url}"
            ))),
        };
    }

    let mut temp_file = TokioFile::create(&temp_path).await?;
    let content = response.bytes().await.map_err(|e| {
        PackbuildError::HttpError(format!("Failed to read response body bytes: {e}"))
    })?;
    temp_file.write_all(&content).await?;
    drop(temp_file);

    if let Some(expected) = sha256_expected {
        if let Err(e) = verify_checksum(&temp_path, expected) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        debug!("Checksum verified for {}", temp_path.display());
    } else {
        debug!("No checksum provided for {}, skipping verification", url);
    }

    fs::rename(&temp_path, final_path)?;
    Ok(final_path.to_path_buf())
}

/// Fetch and deserialize a JSON document.
pub async fn fetch_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T> {
    validate_url(url)?;
    debug!("Fetching JSON from {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| PackbuildError::HttpError(format!("HTTP request failed for {url}: {e}")))?;
    let status = response.status();
    if !status.is_success() {
        return Err(PackbuildError::Api(format!(
            "HTTP error {status} for URL {url}"
        )));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| PackbuildError::Api(format!("Invalid JSON payload from {url}: {e}")))
}
