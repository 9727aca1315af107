// packbuild-common/src/model/identity.rs
// The identity codec: a canonical, structurally comparable fingerprint of
// a dependency's source parameters. Computing an identity performs no I/O,
// so it is total and deterministic; paths are normalized lexically.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::dependency::SourceParams;

/// Canonical fingerprint of a dependency's source parameters. Two
/// configured dependencies with matching identities are the same logical
/// dependency regardless of their configured names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Identity {
    Local {
        path_absolute: PathBuf,
        path_relative: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        archive_root: Option<PathBuf>,
    },
    Url {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        root: Option<PathBuf>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sha256: Option<String>,
    },
    Git {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        root: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checkout: Option<String>,
    },
    Modrinth {
        project_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version_id: Option<String>,
    },
}

impl Identity {
    /// Whether two identities refer to the same logical dependency. This
    /// is structural equality for every kind except `local`, where a match
    /// on either the absolute or the relative path suffices (the project
    /// tree may have been moved between runs).
    pub fn matches(&self, other: &Identity) -> bool {
        match (self, other) {
            (
                Identity::Local {
                    path_absolute: a_abs,
                    path_relative: a_rel,
                    archive_root: a_root,
                },
                Identity::Local {
                    path_absolute: b_abs,
                    path_relative: b_rel,
                    archive_root: b_root,
                },
            ) => (a_abs == b_abs || a_rel == b_rel) && a_root == b_root,
            _ => self == other,
        }
    }
}

impl SourceParams {
    /// Derive the identity for these source parameters. Pure: equal inputs
    /// always yield structurally equal identities, and differing optional
    /// fields yield unequal ones.
    pub fn identity(&self, project_root: &Path) -> Identity {
        match self {
            SourceParams::Local { path, archive_root } => {
                let absolute = lexical_absolute(path, project_root);
                Identity::Local {
                    path_relative: lexical_relative(&absolute, &lexical_absolute(
                        Path::new(""),
                        project_root,
                    )),
                    path_absolute: absolute,
                    archive_root: archive_root.clone(),
                }
            }
            SourceParams::Url { url, root, sha256 } => Identity::Url {
                url: url.clone(),
                root: root.clone(),
                sha256: sha256.clone(),
            },
            SourceParams::Git {
                url,
                root,
                checkout,
            } => Identity::Git {
                url: url.clone(),
                root: root.clone(),
                checkout: checkout.clone(),
            },
            SourceParams::Modrinth {
                project_id,
                version_id,
            } => Identity::Modrinth {
                project_id: project_id.clone(),
                version_id: version_id.clone(),
            },
        }
    }
}

/// Join `path` onto `base` if it is relative, then normalize `.` and `..`
/// components lexically (without touching the filesystem).
fn lexical_absolute(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Express `path` relative to `base`, walking up with `..` where the two
/// diverge. Both inputs must already be normalized absolute paths.
fn lexical_relative(path: &Path, base: &Path) -> PathBuf {
    let mut path_components = path.components().peekable();
    let mut base_components = base.components().peekable();

    while let (Some(p), Some(b)) = (path_components.peek(), base_components.peek()) {
        if p == b {
            path_components.next();
            base_components.next();
        } else {
            break;
        }
    }

    let mut relative = PathBuf::new();
    for _ in base_components {
        relative.push("..");
    }
    for component in path_components {
        relative.push(component.as_os_str());
    }
    relative
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(path: &str, archive_root: Option<&str>) -> SourceParams {
        SourceParams::Local {
            path: PathBuf::from(path),
            archive_root: archive_root.map(PathBuf::from),
        }
    }

    #[test]
    fn identity_is_deterministic() {
        let root = Path::new("/home/user/project");
        let params = local("../libs/pack", None);
        assert_eq!(params.identity(root), params.identity(root));
    }

    #[test]
    fn local_identity_normalizes_paths() {
        let root = Path::new("/home/user/project");
        let identity = local("./packs/../libs/pack", None).identity(root);
        match identity {
            Identity::Local {
                path_absolute,
                path_relative,
                ..
            } => {
                assert_eq!(path_absolute, PathBuf::from("/home/user/project/libs/pack"));
                assert_eq!(path_relative, PathBuf::from("libs/pack"));
            }
            other => panic!("expected local identity, got {other:?}"),
        }
    }

    #[test]
    fn local_relative_path_walks_upward() {
        let root = Path::new("/home/user/project");
        let identity = local("/home/user/shared/pack", None).identity(root);
        match identity {
            Identity::Local { path_relative, .. } => {
                assert_eq!(path_relative, PathBuf::from("../shared/pack"));
            }
            other => panic!("expected local identity, got {other:?}"),
        }
    }

    #[test]
    fn local_matches_on_either_path() {
        let moved_root = Path::new("/mnt/elsewhere/project");
        let root = Path::new("/home/user/project");
        // Same relative location, different absolute location.
        let a = local("libs/pack", None).identity(root);
        let b = local("libs/pack", None).identity(moved_root);
        assert!(a.matches(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn local_archive_root_is_significant() {
        let root = Path::new("/home/user/project");
        let a = local("libs/pack.zip", None).identity(root);
        let b = local("libs/pack.zip", Some("inner")).identity(root);
        assert!(!a.matches(&b));
    }

    #[test]
    fn url_optional_checksum_is_significant() {
        let with = SourceParams::Url {
            url: "https://example.com/pack.zip".into(),
            root: None,
            sha256: Some("ab".repeat(32)),
        };
        let without = SourceParams::Url {
            url: "https://example.com/pack.zip".into(),
            root: None,
            sha256: None,
        };
        let root = Path::new("/p");
        assert!(!with.identity(root).matches(&without.identity(root)));
        assert!(with.identity(root).matches(&with.identity(root)));
    }

    #[test]
    fn kinds_never_match_each_other() {
        let root = Path::new("/p");
        let a = local("pack", None).identity(root);
        let b = SourceParams::Git {
            url: "https://example.com/repo.git".into(),
            root: None,
            checkout: None,
        }
        .identity(root);
        assert!(!a.matches(&b));
    }

    #[test]
    fn identity_round_trips_through_json() {
        let root = Path::new("/home/user/project");
        let identity = SourceParams::Git {
            url: "https://example.com/repo.git".into(),
            root: Some("pack".into()),
            checkout: Some("0123abc".into()),
        }
        .identity(root);
        let json = serde_json::to_string(&identity).unwrap();
        let parsed: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(identity, parsed);
        assert!(json.contains("\"type\":\"git\""));
    }
}
