//! File-system repository for mapping configurations.
//!
//! Each resource type is stored as one pretty-printed JSON file named
//! `{ResourceType}.json`, wrapping the configuration with a save timestamp,
//! an optional description and a format version. The repository only moves
//! configurations between disk and memory; registering them with an engine
//! is up to the caller.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use fhirmap_model::MappingConfiguration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ConfigurationRepository {
    base_dir: PathBuf,
}

/// Summary of one stored configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingMetadata {
    pub resource_type: String,
    pub profile: Option<String>,
    pub file_path: PathBuf,
    pub field_count: usize,
    pub saved_at: Option<String>,
}

/// A configuration together with repository metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMappingConfiguration {
    #[serde(flatten)]
    pub configuration: MappingConfiguration,
    /// RFC 3339 timestamp of the last save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl StoredMappingConfiguration {
    pub fn new(configuration: MappingConfiguration) -> Self {
        Self {
            configuration,
            saved_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
            description: None,
            version: default_version(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl ConfigurationRepository {
    /// Opens a repository rooted at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).with_context(|| {
            format!(
                "Failed to create configuration repository: {}",
                base_dir.display()
            )
        })?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Saves a configuration, replacing any earlier file for its resource type.
    pub fn save(&self, configuration: &MappingConfiguration) -> Result<PathBuf> {
        self.save_stored(&StoredMappingConfiguration::new(configuration.clone()))
    }

    pub fn save_stored(&self, stored: &StoredMappingConfiguration) -> Result<PathBuf> {
        let resource_type = &stored.configuration.resource_type;
        let path = self.path_for(resource_type);
        let json = serde_json::to_string_pretty(stored)
            .with_context(|| format!("Failed to serialize {resource_type} configuration"))?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {}", path.display()))?;
        info!(
            resource_type = %resource_type,
            path = %path.display(),
            fields = stored.configuration.field_mappings.len(),
            "saved mapping configuration"
        );
        Ok(path)
    }

    /// Loads the configuration for `resource_type`, if one is stored.
    pub fn load(&self, resource_type: &str) -> Result<Option<MappingConfiguration>> {
        Ok(self
            .load_stored(resource_type)?
            .map(|stored| stored.configuration))
    }

    pub fn load_stored(&self, resource_type: &str) -> Result<Option<StoredMappingConfiguration>> {
        let path = self.path_for(resource_type);
        if !path.exists() {
            debug!(resource_type, "no stored configuration");
            return Ok(None);
        }
        read_stored(&path).map(Some)
    }

    /// Loads every readable configuration, keyed by resource type.
    ///
    /// Files that fail to parse are skipped with a warning.
    pub fn load_all(&self) -> Result<BTreeMap<String, MappingConfiguration>> {
        let mut configurations = BTreeMap::new();
        for path in self.json_files()? {
            match read_stored(&path) {
                Ok(stored) => {
                    configurations.insert(
                        stored.configuration.resource_type.clone(),
                        stored.configuration,
                    );
                }
                Err(err) => warn!(path = %path.display(), error = %err, "skipping configuration"),
            }
        }
        Ok(configurations)
    }

    /// Metadata for every readable configuration, sorted by resource type.
    pub fn list(&self) -> Result<Vec<MappingMetadata>> {
        let mut metadata = Vec::new();
        for path in self.json_files()? {
            let Ok(stored) = read_stored(&path) else {
                continue;
            };
            metadata.push(MappingMetadata {
                resource_type: stored.configuration.resource_type.clone(),
                profile: stored.configuration.profile.clone(),
                field_count: stored.configuration.field_mappings.len(),
                saved_at: stored.saved_at,
                file_path: path,
            });
        }
        metadata.sort_by(|a, b| a.resource_type.cmp(&b.resource_type));
        Ok(metadata)
    }

    /// Deletes the stored configuration; returns whether a file was removed.
    pub fn delete(&self, resource_type: &str) -> Result<bool> {
        let path = self.path_for(resource_type);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete configuration: {}", path.display()))?;
        info!(resource_type, "deleted mapping configuration");
        Ok(true)
    }

    pub fn exists(&self, resource_type: &str) -> bool {
        self.path_for(resource_type).exists()
    }

    fn path_for(&self, resource_type: &str) -> PathBuf {
        self.base_dir.join(configuration_filename(resource_type))
    }

    fn json_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.base_dir)
            .with_context(|| format!("Failed to read repository: {}", self.base_dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

fn read_stored(path: &Path) -> Result<StoredMappingConfiguration> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse configuration from {}", path.display()))
}

/// File name for a resource type; characters other than ASCII letters and
/// digits become `_`.
fn configuration_filename(resource_type: &str) -> String {
    let stem: String = resource_type
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{stem}.json")
}
