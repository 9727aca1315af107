// packbuild-core/src/orchestrate.rs
// Drives one dependency-resolution run: reconcile against the index,
// acquire whatever is missing concurrently into staging, check version
// compatibility, then move the staged trees into managed storage and
// commit the index. The index is only committed when every acquisition
// succeeded, so a failed run leaves the previous state untouched.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use packbuild_common::error::{PackbuildError, Result};
use packbuild_common::model::{ConfiguredDependency, DeploymentMode};
use packbuild_common::{CacheLayout, Config};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::acquire::{self, AcquireContext, ProjectContext, PACK_METADATA_FILE};
use crate::compat;
use crate::index::DependencyIndex;

const STAGING_SUBTREE: &str = "staging";

/// A dependency whose files are present in managed storage after a
/// successful run.
#[derive(Debug, Clone)]
pub struct ReadyDependency {
    pub name: String,
    pub path: PathBuf,
    pub deployment: DeploymentMode,
}

/// Per-dependency variables for the templating step.
impl packbuild_common::VariableProvider for ReadyDependency {
    fn provides(&self, name: &str) -> Option<String> {
        match name {
            "name" => Some(self.name.clone()),
            "path" => Some(self.path.display().to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ResolveOutcome {
    pub ready: Vec<ReadyDependency>,
    /// Per-dependency acquisition or compatibility failures. Non-empty
    /// means the index was not committed.
    pub failures: Vec<(String, PackbuildError)>,
}

impl ResolveOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Resolve all configured dependencies for this run.
pub async fn resolve_dependencies(
    config: &Config,
    project: &ProjectContext,
    configured: &[ConfiguredDependency],
) -> Result<ResolveOutcome> {
    let mut index = DependencyIndex::load(config)?;
    index.normalize()?;
    let pending = index.reconcile(configured, config.project_root())?.pending;

    if pending.is_empty() {
        debug!("All {} dependencies are already acquired", configured.len());
    } else {
        info!(
            "Acquiring {} of {} dependencies",
            pending.len(),
            configured.len()
        );
    }

    let mut failures: Vec<(String, PackbuildError)> = Vec::new();

    if !pending.is_empty() {
        let cache = CacheLayout::new(config)?;
        let staging_root = cache.acquire(STAGING_SUBTREE, true)?;
        let ctx = AcquireContext {
            config: config.clone(),
            client: packbuild_net::http::build_http_client()?,
            project: project.clone(),
        };
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_acquisitions.max(1)));

        let mut tasks = JoinSet::new();
        for dep in pending {
            let work = staging_root.join(&dep.name);
            fs::create_dir_all(&work)?;
            let ctx = ctx.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return (
                            dep.name.clone(),
                            Err(PackbuildError::Generic(format!(
                                "Acquisition scheduling failed: {e}"
                            ))),
                        )
                    }
                };
                let result = acquire_one(&dep, &ctx, &work).await;
                (dep.name, result)
            });
        }

        let mut staged: Vec<(String, PathBuf)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (name, result) = joined
                .map_err(|e| PackbuildError::Generic(format!("Acquisition task failed: {e}")))?;
            match result {
                Ok(files) => staged.push((name, files)),
                Err(e) => {
                    error!("Failed to acquire dependency '{name}': {e}");
                    failures.push((name, e));
                }
            }
        }

        if failures.is_empty() {
            // Moves are sequential and happen only once every acquisition
            // has succeeded.
            for (name, files) in staged {
                let target = config.dependencies_dir().join(&name);
                if target.exists() {
                    fs::remove_dir_all(&target)?;
                }
                fs::rename(&files, &target)?;
                debug!("Dependency '{name}' installed at {}", target.display());
            }
            cache.clean(STAGING_SUBTREE)?;
        }
    }

    if !failures.is_empty() {
        return Ok(ResolveOutcome {
            ready: Vec::new(),
            failures,
        });
    }

    index.commit(configured, config.project_root())?;

    let ready = configured
        .iter()
        .map(|dep| ReadyDependency {
            name: dep.name.clone(),
            path: config.dependencies_dir().join(&dep.name),
            deployment: dep.deployment,
        })
        .collect();
    Ok(ResolveOutcome {
        ready,
        failures: Vec::new(),
    })
}

async fn acquire_one(
    dep: &ConfiguredDependency,
    ctx: &AcquireContext,
    work: &std::path::Path,
) -> Result<PathBuf> {
    let files = acquire::acquire(dep, ctx, work).await?;

    if dep.version_check {
        let code = ctx.project.format_code.ok_or_else(|| {
            PackbuildError::Config(format!(
                "Dependency '{}' requests a version check, but the project's pack \
                 format could not be determined",
                dep.name
            ))
        })?;
        compat::pack_format_compatible(
            code,
            &files.join(PACK_METADATA_FILE),
            &format!("Dependency '{}'", dep.name),
        )?;
    }

    Ok(files)
}
