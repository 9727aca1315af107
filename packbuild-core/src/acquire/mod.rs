// packbuild-core/src/acquire/mod.rs
// Acquisition backends, one per source kind, dispatched over the closed
// set of source-parameter variants.

pub mod files;
pub mod git;
pub mod local;
pub mod registry;
pub mod url;

use std::path::{Path, PathBuf};
use std::time::Duration;

use packbuild_common::error::{PackbuildError, Result};
use packbuild_common::model::{ConfiguredDependency, PackKind, SourceParams};
use packbuild_common::Config;
use reqwest::Client;

pub use files::{validate_pack_root, PACK_METADATA_FILE};

/// The project-side version context acquisition and compatibility checks
/// run against.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub pack_kind: PackKind,
    /// Target version name, when the pack format was set from one.
    pub version_name: Option<String>,
    /// The project's resolved pack format code.
    pub format_code: Option<u32>,
}

/// Everything a backend needs to materialize one dependency.
#[derive(Clone)]
pub struct AcquireContext {
    pub config: Config,
    pub client: Client,
    pub project: ProjectContext,
}

/// Materialize `dep` inside the (clean, dedicated) `work` directory and
/// return the path of the produced file tree. The tree is validated to
/// carry the pack metadata file before it is handed back.
pub async fn acquire(
    dep: &ConfiguredDependency,
    ctx: &AcquireContext,
    work: &Path,
) -> Result<PathBuf> {
    let files = match &dep.source {
        SourceParams::Local { path, archive_root } => local::acquire(
            &dep.name,
            path,
            archive_root.as_deref(),
            ctx.config.project_root(),
            work,
        )?,
        SourceParams::Url { url, root, sha256 } => {
            url::acquire(
                &dep.name,
                url,
                root.as_deref(),
                sha256.as_deref(),
                &ctx.client,
                work,
            )
            .await?
        }
        SourceParams::Git {
            url,
            root,
            checkout,
        } => {
            let name = dep.name.clone();
            let url = url.clone();
            let root = root.clone();
            let checkout = checkout.clone();
            let work = work.to_path_buf();
            let label = format!("Clone of '{url}' for dependency '{name}'");
            run_blocking_with_timeout(ctx.config.git_timeout, label, move || {
                git::acquire(&name, &url, root.as_deref(), checkout.as_deref(), &work)
            })
            .await?
        }
        SourceParams::Modrinth {
            project_id,
            version_id,
        } => {
            registry::acquire(
                &dep.name,
                project_id,
                version_id.as_deref(),
                ctx.project.version_name.as_deref(),
                &ctx.config.registry_api_base,
                &ctx.client,
                work,
            )
            .await?
        }
    };

    validate_pack_root(&files, &dep.name)?;
    Ok(files)
}

/// Run a blocking acquisition step under a time bound. A non-responding
/// remote fails only this dependency instead of stalling the run; the
/// blocked task is left to finish in the background.
async fn run_blocking_with_timeout<T, F>(limit: Duration, label: String, task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(task);
    match tokio::time::timeout(limit, handle).await {
        Ok(joined) => {
            joined.map_err(|e| PackbuildError::Generic(format!("{label} failed: {e}")))?
        }
        Err(_) => Err(PackbuildError::SourceUnavailable(format!(
            "{label} did not complete within {}s",
            limit.as_secs()
        ))),
    }
}
