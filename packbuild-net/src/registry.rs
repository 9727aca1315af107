// packbuild-net/src/registry.rs
// Modrinth-style registry client: version listing and the selection
// policy for floating dependencies.

use chrono::{DateTime, Utc};
use packbuild_common::error::{PackbuildError, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::http::fetch_json;

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryFile {
    pub url: String,
    pub filename: String,
    #[serde(default)]
    pub primary: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryVersion {
    pub id: String,
    pub project_id: String,
    pub version_number: String,
    #[serde(default)]
    pub game_versions: Vec<String>,
    pub date_published: DateTime<Utc>,
    #[serde(default)]
    pub files: Vec<RegistryFile>,
}

impl RegistryVersion {
    /// The file to download for this version: the one flagged primary, or
    /// the first listed one.
    pub fn primary_file(&self) -> Result<&RegistryFile> {
        self.files
            .iter()
            .find(|f| f.primary)
            .or_else(|| self.files.first())
            .ok_or_else(|| {
                PackbuildError::Api(format!(
                    "Registry version '{}' of project '{}' lists no files",
                    self.id, self.project_id
                ))
            })
    }
}

/// List all published versions of a registry project.
pub async fn list_versions(
    client: &Client,
    api_base: &str,
    project_id: &str,
) -> Result<Vec<RegistryVersion>> {
    let url = format!("{api_base}/project/{project_id}/version");
    fetch_json(client, &url).await
}

/// Fetch a single pinned version by its id.
pub async fn get_version(
    client: &Client,
    api_base: &str,
    version_id: &str,
) -> Result<RegistryVersion> {
    let url = format!("{api_base}/version/{version_id}");
    fetch_json(client, &url).await
}

/// Pick the version to acquire for a floating dependency: among versions
/// declaring compatibility with the project's target version, the most
/// recently published wins; publish-date ties fall back to the highest
/// version id in lexical order.
pub fn select_version(
    versions: Vec<RegistryVersion>,
    target_version: &str,
) -> Option<RegistryVersion> {
    let selected = versions
        .into_iter()
        .filter(|v| v.game_versions.iter().any(|g| g == target_version))
        .max_by(|a, b| {
            a.date_published
                .cmp(&b.date_published)
                .then_with(|| a.id.cmp(&b.id))
        });
    if let Some(v) = &selected {
        debug!(
            "Selected registry version '{}' ({}) published {}",
            v.version_number, v.id, v.date_published
        );
    }
    selected
}
