// packbuild-common/src/manifest.rs
// Parses packbuild.toml, the declarative project configuration that
// supplies the set of configured dependencies for one build run.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{PackbuildError, Result};
use crate::model::{ConfiguredDependency, DeploymentMode, PackKind, SourceParams};
use crate::variables::VariableProvider;

/// A version identifier as written in the manifest: either a literal
/// format code or a version name to be resolved through the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FormatSpec {
    Code(u32),
    VersionName(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    pub name: String,
    pub version: String,
    pub pack_kind: PackKind,
    pub pack_format: FormatSpec,
}

#[derive(Debug, Clone, Deserialize)]
struct DependencySection {
    #[serde(flatten)]
    source: SourceParams,
    #[serde(default)]
    deployment: DeploymentMode,
    #[serde(default)]
    version_check: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct RawManifest {
    project: ProjectSection,
    #[serde(default)]
    variables: BTreeMap<String, String>,
    // BTreeMap keeps dependency iteration order stable across runs.
    #[serde(default)]
    dependencies: BTreeMap<String, DependencySection>,
}

/// The parsed project manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub project: ProjectSection,
    pub variables: BTreeMap<String, String>,
    pub dependencies: Vec<ConfiguredDependency>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading project manifest from {}", path.display());
        let text = fs::read_to_string(path).map_err(|e| {
            PackbuildError::Manifest(format!("Unable to read '{}': {e}", path.display()))
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let raw: RawManifest = toml::from_str(text)
            .map_err(|e| PackbuildError::Manifest(format!("Invalid manifest: {e}")))?;

        let dependencies = raw
            .dependencies
            .into_iter()
            .map(|(name, section)| ConfiguredDependency {
                name,
                deployment: section.deployment,
                version_check: section.version_check,
                source: section.source,
            })
            .collect();

        Ok(Self {
            project: raw.project,
            variables: raw.variables,
            dependencies,
        })
    }
}

/// Project-wide variables for the templating step: the built-in
/// `project/...` names first, then the manifest's `[variables]` table.
impl VariableProvider for Manifest {
    fn provides(&self, name: &str) -> Option<String> {
        match name {
            "project/name" => Some(self.project.name.clone()),
            "project/version" => Some(self.project.version.clone()),
            "project/pack_kind" => Some(self.project.pack_kind.to_string()),
            _ => self.variables.get(name).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
        [project]
        name = "example"
        version = "0.4.0"
        pack_kind = "data"
        pack_format = "1.20.4"

        [variables]
        author = "someone"

        [dependencies.lib]
        source = "local"
        path = "../lib"
        deployment = "bundle"
        version_check = true

        [dependencies.remote]
        source = "url"
        url = "https://example.com/pack.zip"
        sha256 = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef"

        [dependencies.repo]
        source = "git"
        url = "https://example.com/repo.git"
        checkout = "deadbeef"
        root = "pack"
    "#;

    #[test]
    fn parses_project_and_dependencies() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        assert_eq!(manifest.project.name, "example");
        assert_eq!(manifest.project.pack_kind, PackKind::Data);
        assert_eq!(
            manifest.project.pack_format,
            FormatSpec::VersionName("1.20.4".into())
        );
        assert_eq!(manifest.dependencies.len(), 3);

        let lib = &manifest.dependencies[0];
        assert_eq!(lib.name, "lib");
        assert_eq!(lib.deployment, DeploymentMode::Bundle);
        assert!(lib.version_check);
        assert!(matches!(lib.source, SourceParams::Local { .. }));

        let remote = &manifest.dependencies[1];
        assert_eq!(remote.deployment, DeploymentMode::None);
        assert!(!remote.version_check);
        match &remote.source {
            SourceParams::Url { sha256, root, .. } => {
                assert!(sha256.is_some());
                assert!(root.is_none());
            }
            other => panic!("expected url source, got {other:?}"),
        }
    }

    #[test]
    fn literal_pack_format_is_accepted() {
        let manifest = Manifest::parse(
            r#"
            [project]
            name = "example"
            version = "1.0"
            pack_kind = "resource"
            pack_format = 34
        "#,
        )
        .unwrap();
        assert_eq!(manifest.project.pack_format, FormatSpec::Code(34));
    }

    #[test]
    fn unknown_source_kind_is_rejected() {
        let err = Manifest::parse(
            r#"
            [project]
            name = "example"
            version = "1.0"
            pack_kind = "data"
            pack_format = 48

            [dependencies.bad]
            source = "ftp"
            url = "ftp://example.com"
        "#,
        )
        .unwrap_err();
        assert!(matches!(err, PackbuildError::Manifest(_)));
    }

    #[test]
    fn provides_builtin_and_declared_variables() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        assert_eq!(manifest.provides("project/name").as_deref(), Some("example"));
        assert_eq!(manifest.provides("project/pack_kind").as_deref(), Some("data"));
        assert_eq!(manifest.provides("author").as_deref(), Some("someone"));
        assert_eq!(manifest.provides("missing"), None);
    }

    #[test]
    fn variables_default_to_empty() {
        let manifest = Manifest::parse(
            r#"
            [project]
            name = "example"
            version = "1.0"
            pack_kind = "data"
            pack_format = 48
        "#,
        )
        .unwrap();
        assert!(manifest.variables.is_empty());
        assert!(manifest.dependencies.is_empty());
    }
}
