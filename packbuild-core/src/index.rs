// packbuild-core/src/index.rs
// The persistent ledger mapping declared dependencies to acquired-file
// directories, and the two-phase reconciliation algorithm that keeps the
// ledger, the on-disk directories and the current run's configuration
// aligned without losing or duplicating acquired content.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use packbuild_common::error::{PackbuildError, Result};
use packbuild_common::model::{ConfiguredDependency, Identity};
use packbuild_common::Config;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Marker file at the root of every dependency directory, holding exactly
/// the directory's uuid.
pub const UUID_MARKER_FILE: &str = ".packbuild_dependency_uuid";
const INDEX_FILE_NAME: &str = "index.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    pub identity: Identity,
    pub uuid: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexDocument {
    dependencies: Vec<IndexEntry>,
}

/// Result of Phase B: which configured dependencies still need a fresh
/// acquisition.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub pending: Vec<ConfiguredDependency>,
}

pub struct DependencyIndex {
    managed_path: PathBuf,
    entries: Vec<IndexEntry>,
}

impl DependencyIndex {
    /// Open the index for a project, creating the dependency storage root
    /// if needed. An unreadable or missing index file yields an empty
    /// ledger; directory consistency is restored by [`normalize`].
    ///
    /// [`normalize`]: DependencyIndex::normalize
    pub fn load(config: &Config) -> Result<Self> {
        let managed_path = config.dependencies_dir();
        fs::create_dir_all(&managed_path)?;

        let index_file = managed_path.join(INDEX_FILE_NAME);
        let entries = match fs::read_to_string(&index_file) {
            Ok(text) => match serde_json::from_str::<IndexDocument>(&text) {
                Ok(document) => document.dependencies,
                Err(e) => {
                    warn!("Index file {} is invalid ({e}); starting empty", index_file.display());
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        Ok(Self {
            managed_path,
            entries,
        })
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn dependency_dir(&self, name: &str) -> PathBuf {
        self.managed_path.join(name)
    }

    /// Phase A: make the on-disk state self-consistent before it is
    /// compared against this run's configuration. Every dependency
    /// directory's marker is read into a one-to-one uuid map; directories
    /// with unreadable markers are deleted, entries without a directory
    /// and directories without an entry are dropped as orphans, and each
    /// surviving directory is renamed to its entry's name. Two directories
    /// claiming the same uuid cannot be told apart and abort the run.
    pub fn normalize(&mut self) -> Result<()> {
        let mut uuid_to_dir: HashMap<String, PathBuf> = HashMap::new();

        for dir_entry in fs::read_dir(&self.managed_path)? {
            let path = dir_entry?.path();
            if !path.is_dir() {
                continue;
            }

            match fs::read_to_string(path.join(UUID_MARKER_FILE)) {
                Ok(uuid) => {
                    let uuid = uuid.trim().to_string();
                    if let Some(existing) = uuid_to_dir.get(&uuid) {
                        return Err(PackbuildError::CorruptIndexState(format!(
                            "Directories '{}' and '{}' claim the same uuid {uuid}",
                            existing.display(),
                            path.display()
                        )));
                    }
                    uuid_to_dir.insert(uuid, path);
                }
                Err(_) => {
                    warn!(
                        "Unable to read uuid marker in dependency files of '{}'. Deleting.",
                        path.file_name().unwrap_or_default().to_string_lossy()
                    );
                    fs::remove_dir_all(&path)?;
                }
            }
        }

        // A duplicated uuid between two ledger rows leaves at most one of
        // them backed by a directory; later rows are dropped.
        let mut seen = HashSet::new();
        self.entries.retain(|entry| {
            if seen.insert(entry.uuid.clone()) {
                true
            } else {
                warn!("Removing duplicate index entry '{}' ({})", entry.name, entry.uuid);
                false
            }
        });

        self.entries.retain(|entry| {
            if uuid_to_dir.contains_key(&entry.uuid) {
                true
            } else {
                warn!("Removing orphaned index entry '{}' ({})", entry.name, entry.uuid);
                false
            }
        });

        let mut renames: Vec<(PathBuf, String)> = Vec::new();
        for entry in &self.entries {
            // Retained entries always have a directory.
            if let Some(dir) = uuid_to_dir.remove(&entry.uuid) {
                let named_correctly = dir
                    .file_name()
                    .is_some_and(|n| n.to_string_lossy() == entry.name.as_str());
                if !named_correctly {
                    renames.push((dir, entry.name.clone()));
                }
            }
        }

        // Only directories with no associated entry are left in the map.
        for (uuid, dir) in uuid_to_dir {
            warn!(
                "Removing orphaned dependency files '{}' ({uuid})",
                dir.file_name().unwrap_or_default().to_string_lossy()
            );
            fs::remove_dir_all(&dir)?;
        }

        self.apply_renames(renames)
    }

    /// Phase B: map this run's configured dependencies onto index entries.
    /// Exact matches (name and identity) first; leftovers are then matched
    /// by identity alone and treated as renames when the match is
    /// unambiguous. Still-unmatched entries are deleted with their
    /// directories, still-unmatched configured dependencies are returned
    /// for fresh acquisition.
    pub fn reconcile(
        &mut self,
        configured: &[ConfiguredDependency],
        project_root: &Path,
    ) -> Result<ReconcileOutcome> {
        let identities: Vec<Identity> = configured
            .iter()
            .map(|dep| dep.source.identity(project_root))
            .collect();

        let mut unmatched_deps: Vec<usize> = (0..configured.len()).collect();
        let mut unmatched_entries: Vec<usize> = (0..self.entries.len()).collect();

        // Exact matches require no further action.
        unmatched_deps.retain(|&i| {
            let position = unmatched_entries.iter().position(|&j| {
                self.entries[j].name == configured[i].name
                    && self.entries[j].identity.matches(&identities[i])
            });
            match position {
                Some(p) => {
                    debug!("Dependency '{}' is already acquired", configured[i].name);
                    unmatched_entries.remove(p);
                    false
                }
                None => true,
            }
        });

        // Identity-only matching between the leftovers: an unambiguous
        // match is a rename. More than one candidate means we would be
        // guessing, so both sides are left unmatched instead.
        let mut rename_pairs: Vec<(usize, usize)> = Vec::new();
        let mut claimed: HashSet<usize> = HashSet::new();
        for &j in &unmatched_entries {
            let candidates: Vec<usize> = unmatched_deps
                .iter()
                .copied()
                .filter(|&i| !claimed.contains(&i) && self.entries[j].identity.matches(&identities[i]))
                .collect();
            match candidates[..] {
                [single] => {
                    claimed.insert(single);
                    rename_pairs.push((j, single));
                }
                [] => {}
                _ => {
                    let report = PackbuildError::AmbiguousIdentity(format!(
                        "Identity of index entry '{}' matches {} configured dependencies",
                        self.entries[j].name,
                        candidates.len()
                    ));
                    info!("{report}; leaving all of them unmatched");
                }
            }
        }

        let renamed_entries: HashSet<usize> = rename_pairs.iter().map(|&(j, _)| j).collect();
        unmatched_entries.retain(|j| !renamed_entries.contains(j));
        unmatched_deps.retain(|i| !claimed.contains(i));

        // Delete stale entries before renames are applied so a rename can
        // take over a name a stale directory still occupies.
        let mut removed_uuids: HashSet<String> = HashSet::new();
        for &j in &unmatched_entries {
            let entry = &self.entries[j];
            warn!("Removing unused dependency '{}'", entry.name);
            let dir = self.managed_path.join(&entry.name);
            if dir.is_dir() {
                fs::remove_dir_all(&dir)?;
            }
            removed_uuids.insert(entry.uuid.clone());
        }

        let mut renames: Vec<(PathBuf, String)> = Vec::new();
        for &(j, i) in &rename_pairs {
            let entry = &mut self.entries[j];
            let new_name = configured[i].name.clone();
            debug!("Renaming dependency '{}' to '{}'", entry.name, new_name);
            renames.push((self.managed_path.join(&entry.name), new_name.clone()));
            entry.name = new_name;
            entry.identity = identities[i].clone();
        }
        self.entries.retain(|entry| !removed_uuids.contains(&entry.uuid));
        self.apply_renames(renames)?;

        Ok(ReconcileOutcome {
            pending: unmatched_deps
                .into_iter()
                .map(|i| configured[i].clone())
                .collect(),
        })
    }

    /// Persist the ledger for the given (fully acquired) configuration.
    /// Matched entries keep their uuid, fresh acquisitions are minted one;
    /// every marker file is rewritten and the index document replaces the
    /// previous one atomically, so a failed run never leaves a partially
    /// updated index behind.
    pub fn commit(
        &mut self,
        configured: &[ConfiguredDependency],
        project_root: &Path,
    ) -> Result<()> {
        let mut dependencies = Vec::with_capacity(configured.len());

        for dep in configured {
            let dir = self.managed_path.join(&dep.name);
            if !dir.is_dir() {
                return Err(PackbuildError::CorruptIndexState(format!(
                    "Dependency directory for '{}' is missing at commit time",
                    dep.name
                )));
            }

            let uuid = self
                .entries
                .iter()
                .find(|entry| entry.name == dep.name)
                .map(|entry| entry.uuid.clone())
                .unwrap_or_else(|| Uuid::new_v4().to_string());

            fs::write(dir.join(UUID_MARKER_FILE), &uuid)?;
            dependencies.push(IndexEntry {
                name: dep.name.clone(),
                identity: dep.source.identity(project_root),
                uuid,
            });
        }

        let document = IndexDocument {
            dependencies: dependencies.clone(),
        };
        let json = serde_json::to_string_pretty(&document)?;
        let temp_path = self.managed_path.join(".index.json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, self.managed_path.join(INDEX_FILE_NAME))?;

        self.entries = dependencies;
        Ok(())
    }

    /// Apply directory renames through unique temporary names, so swapped
    /// names never collide mid-way.
    fn apply_renames(&self, renames: Vec<(PathBuf, String)>) -> Result<()> {
        let mut staged = Vec::with_capacity(renames.len());
        for (from, final_name) in renames {
            let temp = self
                .managed_path
                .join(format!(".rename_{}", Uuid::new_v4()));
            fs::rename(&from, &temp)?;
            staged.push((temp, final_name));
        }
        for (temp, final_name) in staged {
            fs::rename(&temp, self.managed_path.join(final_name))?;
        }
        Ok(())
    }
}
