// packbuild-common/src/model/dependency.rs
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which kind of pack a project builds. Determines which column of the
/// version-format dataset applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackKind {
    Data,
    Resource,
}

impl PackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackKind::Data => "data",
            PackKind::Resource => "resource",
        }
    }

    /// Lowest format code that is valid for this pack kind.
    pub fn min_format(&self) -> u32 {
        match self {
            PackKind::Data => 4,
            PackKind::Resource => 1,
        }
    }
}

impl std::fmt::Display for PackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an acquired dependency is deployed alongside the project by the
/// packaging step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    Bundle,
    Ship,
    Link,
    #[default]
    None,
}

/// Source parameters for one dependency, as declared in the project
/// manifest. The `source` key selects the acquisition backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum SourceParams {
    /// A directory subtree or a zip archive on the local filesystem.
    Local {
        path: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        archive_root: Option<PathBuf>,
    },
    /// A zip archive downloaded over HTTP(S).
    Url {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        root: Option<PathBuf>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sha256: Option<String>,
    },
    /// A version-control checkout.
    Git {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        root: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checkout: Option<String>,
    },
    /// A project on the Modrinth registry, either pinned to a version id
    /// or floating (resolved against the project's target version).
    Modrinth {
        project_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version_id: Option<String>,
    },
}

impl SourceParams {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceParams::Local { .. } => "local",
            SourceParams::Url { .. } => "url",
            SourceParams::Git { .. } => "git",
            SourceParams::Modrinth { .. } => "modrinth",
        }
    }
}

/// One dependency declared for the current build run. Exists in memory
/// only; the persisted counterpart is the index entry.
#[derive(Debug, Clone)]
pub struct ConfiguredDependency {
    pub name: String,
    pub deployment: DeploymentMode,
    pub version_check: bool,
    pub source: SourceParams,
}
