// packbuild-core/src/formats/mod.rs
// Version-name to pack-format resolution, backed by a cached dataset with
// a remote precomputed copy and a live extractor as refresh fallbacks.

pub mod extract;

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use packbuild_common::error::{PackbuildError, Result};
use packbuild_common::model::PackKind;
use packbuild_common::{CacheLayout, Config};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use packbuild_net::fetch_json;

/// Named cache subtree holding the dataset artifact.
pub const DATASET_SUBTREE: &str = "version_meta";
const DATASET_FILE_NAME: &str = "pack_formats.json";
const EXTRACT_SUBTREE: &str = "download";

/// One dataset row: either a single format code shared by both pack
/// kinds, or one code per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormatEntry {
    Single(u32),
    PerKind { data: u32, resource: u32 },
}

impl FormatEntry {
    pub fn code(&self, kind: PackKind) -> u32 {
        match *self {
            FormatEntry::Single(code) => code,
            FormatEntry::PerKind { data, resource } => match kind {
                PackKind::Data => data,
                PackKind::Resource => resource,
            },
        }
    }
}

/// The persisted dataset artifact: version name to format entry, plus an
/// alias table mapping alternate spellings to canonical version names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatDataset {
    #[serde(default)]
    pub data: BTreeMap<String, FormatEntry>,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// Aliases that are always understood, independent of the cached dataset.
/// Mojang's manifest names a few versions in ways nobody types.
fn builtin_alias(version: &str) -> Option<&'static str> {
    Some(match version {
        "1.14.2-pre4" => "1.14.2 Pre-Release 4",
        "1.14.2-pre3" => "1.14.2 Pre-Release 3",
        "1.14.2-pre2" => "1.14.2 Pre-Release 2",
        "1.14.2-pre1" => "1.14.2 Pre-Release 1",
        "1.14.1-pre2" => "1.14.1 Pre-Release 2",
        "1.14.1-pre1" => "1.14.1 Pre-Release 1",
        "1.14-pre5" => "1.14 Pre-Release 5",
        "1.14-pre4" => "1.14 Pre-Release 4",
        "1.14-pre3" => "1.14 Pre-Release 3",
        "1.14-pre2" => "1.14 Pre-Release 2",
        "1.14-pre1" => "1.14 Pre-Release 1",
        "potato_update" => "24w14potato",
        "vote_update" => "23w13a_or_b",
        "one_block_at_a_time" => "22w13oneblockatatime",
        "infinite" => "20w14infinite",
        "3d_shareware" => "3D Shareware v1.34",
        _ => return None,
    })
}

pub struct FormatResolver {
    config: Config,
    client: Client,
    dataset_path: PathBuf,
    dataset: FormatDataset,
}

impl FormatResolver {
    pub fn new(config: &Config, client: Client) -> Result<Self> {
        let cache = CacheLayout::new(config)?;
        let dataset_path = cache.acquire(DATASET_SUBTREE, false)?.join(DATASET_FILE_NAME);

        let dataset = match fs::read_to_string(&dataset_path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(dataset) => dataset,
                Err(e) => {
                    warn!(
                        "Cached dataset at {} is invalid ({e}); starting empty",
                        dataset_path.display()
                    );
                    FormatDataset::default()
                }
            },
            Err(_) => FormatDataset::default(),
        };

        Ok(Self {
            config: config.clone(),
            client,
            dataset_path,
            dataset,
        })
    }

    /// Resolve a version name to the format code for the given pack kind.
    /// Lookup order: exact dataset key, dataset alias, builtin alias; on a
    /// miss the dataset is refreshed once and the lookup retried.
    pub async fn resolve(&mut self, version: &str, kind: PackKind) -> Result<u32> {
        if let Some(code) = self.lookup(version, kind) {
            debug!("Pack format for '{version}' ({kind}): {code} (cached)");
            return Ok(code);
        }

        info!("No cached pack format for '{version}'; refreshing the dataset");
        self.refresh(version).await?;

        match self.lookup(version, kind) {
            Some(code) => {
                debug!("Pack format for '{version}' ({kind}): {code}");
                Ok(code)
            }
            None => Err(PackbuildError::DatasetUnresolvable(format!(
                "No pack format known for version '{version}'. Is it spelled correctly?"
            ))),
        }
    }

    fn canonical_name(&self, version: &str) -> String {
        if self.dataset.data.contains_key(version) {
            version.to_string()
        } else if let Some(alias) = self.dataset.aliases.get(version) {
            alias.clone()
        } else if let Some(alias) = builtin_alias(version) {
            alias.to_string()
        } else {
            version.to_string()
        }
    }

    fn lookup(&self, version: &str, kind: PackKind) -> Option<u32> {
        let canonical = self.canonical_name(version);
        self.dataset.data.get(&canonical).map(|entry| entry.code(kind))
    }

    /// Replace the cached dataset. The trusted precomputed copy is
    /// preferred; if it cannot be fetched or still lacks the requested
    /// version, the live extractor fills in that one version.
    async fn refresh(&mut self, version: &str) -> Result<()> {
        match fetch_json::<FormatDataset>(&self.client, &self.config.dataset_url).await {
            Ok(dataset) => {
                self.dataset = dataset;
                self.persist()?;
            }
            Err(e) => {
                warn!("Unable to download the precomputed dataset: {e}");
            }
        }

        let canonical = self.canonical_name(version);
        if self.dataset.data.contains_key(&canonical) {
            return Ok(());
        }

        info!("Extracting pack format for '{canonical}' from the live data source");
        let work = CacheLayout::new(&self.config)?.acquire(EXTRACT_SUBTREE, false)?;
        let entry = extract::extract_format(
            &self.client,
            &self.config.version_manifest_url,
            &canonical,
            &work,
        )
        .await?;
        self.dataset.data.insert(canonical, entry);
        self.persist()?;
        Ok(())
    }

    /// Write the dataset to a temporary sibling and rename it into place,
    /// so readers never observe a partially written artifact.
    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.dataset)?;
        let temp_path = self.dataset_path.with_file_name(".pack_formats.json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.dataset_path)?;
        Ok(())
    }
}
