// packbuild-core/src/acquire/registry.rs
use std::path::{Path, PathBuf};

use packbuild_common::error::{PackbuildError, Result};
use packbuild_net::registry::{get_version, list_versions, select_version, RegistryVersion};
use reqwest::Client;
use tracing::debug;

use super::url;

/// Materialize a registry dependency. A pinned version id is fetched
/// directly; a floating dependency is resolved against the project's
/// target version name, then the selected primary file goes through the
/// remote-archive path. The registry serves sha1/sha512 digests only, so
/// no sha256 verification applies here.
#[allow(clippy::too_many_arguments)]
pub async fn acquire(
    name: &str,
    project_id: &str,
    version_id: Option<&str>,
    target_version: Option<&str>,
    api_base: &str,
    client: &Client,
    work: &Path,
) -> Result<PathBuf> {
    let version = resolve_version(name, project_id, version_id, target_version, api_base, client)
        .await?;
    debug!(
        "Registry dependency '{}' resolved to version '{}' ({})",
        name, version.version_number, version.id
    );

    let file = version.primary_file()?;
    url::acquire(name, &file.url, None, None, client, work).await
}

async fn resolve_version(
    name: &str,
    project_id: &str,
    version_id: Option<&str>,
    target_version: Option<&str>,
    api_base: &str,
    client: &Client,
) -> Result<RegistryVersion> {
    if let Some(id) = version_id {
        return get_version(client, api_base, id).await;
    }

    let target = target_version.ok_or_else(|| {
        PackbuildError::Config(format!(
            "Registry dependency '{name}' floats on the project's target version, \
             but the project's pack format was not set from a version name"
        ))
    })?;

    let versions = list_versions(client, api_base, project_id).await?;
    select_version(versions, target).ok_or_else(|| {
        PackbuildError::NotFound(format!(
            "Registry project '{project_id}' has no version compatible with '{target}'"
        ))
    })
}
