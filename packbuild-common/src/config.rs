// packbuild-common/src/config.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

/// Name of the tool's working directory inside the project root.
const WORK_DIR_NAME: &str = ".packbuild";
/// Trusted remote location of the precomputed version-format dataset.
const DEFAULT_DATASET_URL: &str =
    "https://codeberg.org/helmo2019/buildmc/raw/branch/main/version_meta_data.json";
const DEFAULT_REGISTRY_API_BASE: &str = "https://api.modrinth.com/v2";
/// Mojang launcher version manifest, the live data source for the
/// version-format extractor.
const DEFAULT_VERSION_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";

pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Tool configuration. The project root is always explicit; nothing in the
/// codebase consults the process working directory after this is built.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_root: PathBuf,
    pub dataset_url: String,
    pub registry_api_base: String,
    pub version_manifest_url: String,
    /// Upper bound on concurrently running acquisitions.
    pub max_concurrent_acquisitions: usize,
    /// Upper bound on one repository clone/checkout. Repository fetches
    /// run outside the HTTP client, so its timeouts do not cover them.
    pub git_timeout: Duration,
}

impl Config {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        debug!("Project root set to: {}", project_root.display());
        Self {
            project_root,
            dataset_url: DEFAULT_DATASET_URL.to_string(),
            registry_api_base: DEFAULT_REGISTRY_API_BASE.to_string(),
            version_manifest_url: DEFAULT_VERSION_MANIFEST_URL.to_string(),
            max_concurrent_acquisitions: 4,
            git_timeout: DOWNLOAD_TIMEOUT,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// `<project root>/.packbuild`
    pub fn work_root(&self) -> PathBuf {
        self.project_root.join(WORK_DIR_NAME)
    }

    /// Storage root for acquired dependency directories.
    pub fn dependencies_dir(&self) -> PathBuf {
        self.work_root().join("dependencies")
    }

    pub fn index_file(&self) -> PathBuf {
        self.dependencies_dir().join("index.json")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.work_root().join("cache")
    }

    pub fn manifest_file(&self) -> PathBuf {
        self.project_root.join("packbuild.toml")
    }
}
